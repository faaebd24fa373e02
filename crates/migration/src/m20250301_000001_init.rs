//! Initial schema.
//!
//! - `members`: people of the organization
//! - `rights`: entitlement categories
//! - `dues`: due templates (amount + limit date)
//! - `right_dues`: which dues a right entails
//! - `member_rights`: rights held by members
//! - `due_obligations`: dues owed by members, with their cached status
//! - `payments`: payments against an obligation
//! - `income_entries` / `expense_entries`: the cash ledger
//! - `ledger_totals`: single-row income/expense aggregate
//!
//! Foreign keys carry no storage-level cascades; the engine deletes
//! children explicitly.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Members {
    Table,
    Id,
    NationalId,
    Name,
    Address,
    Phone,
    Email,
    Role,
    Status,
}

#[derive(Iden)]
enum Rights {
    Table,
    Id,
    Name,
    NameNorm,
    Active,
}

#[derive(Iden)]
enum Dues {
    Table,
    Id,
    Description,
    DescriptionNorm,
    AmountMinor,
    LimitDate,
}

#[derive(Iden)]
enum RightDues {
    Table,
    RightId,
    DueId,
}

#[derive(Iden)]
enum MemberRights {
    Table,
    MemberId,
    RightId,
    StartDate,
    EndDate,
}

#[derive(Iden)]
enum DueObligations {
    Table,
    MemberId,
    DueId,
    AssignedOn,
    Status,
    OriginRightId,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    MemberId,
    DueId,
    PaidOn,
    AmountMinor,
    Status,
}

#[derive(Iden)]
enum IncomeEntries {
    Table,
    Id,
    ReceivedOn,
    AmountMinor,
    Source,
    Notes,
    PaymentId,
}

#[derive(Iden)]
enum ExpenseEntries {
    Table,
    Id,
    SpentOn,
    AmountMinor,
    Description,
}

#[derive(Iden)]
enum LedgerTotals {
    Table,
    Id,
    TotalIncomeMinor,
    TotalExpenseMinor,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Members::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Members::NationalId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Members::Name).string().not_null())
                    .col(ColumnDef::new(Members::Address).string())
                    .col(ColumnDef::new(Members::Phone).string())
                    .col(ColumnDef::new(Members::Email).string())
                    .col(ColumnDef::new(Members::Role).string())
                    .col(
                        ColumnDef::new(Members::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL roles do not collide.
        manager
            .create_index(
                Index::create()
                    .name("idx-members-role-unique")
                    .table(Members::Table)
                    .col(Members::Role)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Rights and dues
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Rights::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rights::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Rights::Name).string().not_null())
                    .col(
                        ColumnDef::new(Rights::NameNorm)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Rights::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Dues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dues::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Dues::Description).string().not_null())
                    .col(
                        ColumnDef::new(Dues::DescriptionNorm)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Dues::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Dues::LimitDate).date().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RightDues::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RightDues::RightId).string().not_null())
                    .col(ColumnDef::new(RightDues::DueId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(RightDues::RightId)
                            .col(RightDues::DueId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-right_dues-right_id")
                            .from(RightDues::Table, RightDues::RightId)
                            .to(Rights::Table, Rights::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-right_dues-due_id")
                            .from(RightDues::Table, RightDues::DueId)
                            .to(Dues::Table, Dues::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Assignments and obligations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MemberRights::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MemberRights::MemberId).string().not_null())
                    .col(ColumnDef::new(MemberRights::RightId).string().not_null())
                    .col(ColumnDef::new(MemberRights::StartDate).date().not_null())
                    .col(ColumnDef::new(MemberRights::EndDate).date())
                    .primary_key(
                        Index::create()
                            .col(MemberRights::MemberId)
                            .col(MemberRights::RightId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-member_rights-member_id")
                            .from(MemberRights::Table, MemberRights::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-member_rights-right_id")
                            .from(MemberRights::Table, MemberRights::RightId)
                            .to(Rights::Table, Rights::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DueObligations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DueObligations::MemberId).string().not_null())
                    .col(ColumnDef::new(DueObligations::DueId).string().not_null())
                    .col(ColumnDef::new(DueObligations::AssignedOn).date().not_null())
                    .col(
                        ColumnDef::new(DueObligations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    // Not a foreign key: the origin survives the right's deletion
                    // until the engine re-attributes or clears it.
                    .col(ColumnDef::new(DueObligations::OriginRightId).string())
                    .primary_key(
                        Index::create()
                            .col(DueObligations::MemberId)
                            .col(DueObligations::DueId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-due_obligations-member_id")
                            .from(DueObligations::Table, DueObligations::MemberId)
                            .to(Members::Table, Members::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-due_obligations-due_id")
                            .from(DueObligations::Table, DueObligations::DueId)
                            .to(Dues::Table, Dues::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-due_obligations-due_id")
                    .table(DueObligations::Table)
                    .col(DueObligations::DueId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-due_obligations-origin_right_id")
                    .table(DueObligations::Table)
                    .col(DueObligations::OriginRightId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Payments::MemberId).string().not_null())
                    .col(ColumnDef::new(Payments::DueId).string().not_null())
                    .col(ColumnDef::new(Payments::PaidOn).date().not_null())
                    .col(ColumnDef::new(Payments::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::Status)
                            .string()
                            .not_null()
                            .default("registered"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-obligation")
                            .from_tbl(Payments::Table)
                            .from_col(Payments::MemberId)
                            .from_col(Payments::DueId)
                            .to_tbl(DueObligations::Table)
                            .to_col(DueObligations::MemberId)
                            .to_col(DueObligations::DueId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-member_id-due_id")
                    .table(Payments::Table)
                    .col(Payments::MemberId)
                    .col(Payments::DueId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(IncomeEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncomeEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IncomeEntries::ReceivedOn).date().not_null())
                    .col(
                        ColumnDef::new(IncomeEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IncomeEntries::Source).string())
                    .col(ColumnDef::new(IncomeEntries::Notes).string())
                    .col(ColumnDef::new(IncomeEntries::PaymentId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_entries-payment_id")
                            .from(IncomeEntries::Table, IncomeEntries::PaymentId)
                            .to(Payments::Table, Payments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-income_entries-payment_id")
                    .table(IncomeEntries::Table)
                    .col(IncomeEntries::PaymentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseEntries::SpentOn).date().not_null())
                    .col(
                        ColumnDef::new(ExpenseEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseEntries::Description).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_entries-spent_on-description-unique")
                    .table(ExpenseEntries::Table)
                    .col(ExpenseEntries::SpentOn)
                    .col(ExpenseEntries::Description)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerTotals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerTotals::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerTotals::TotalIncomeMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LedgerTotals::TotalExpenseMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(LedgerTotals::Table)
            .columns([
                LedgerTotals::Id,
                LedgerTotals::TotalIncomeMinor,
                LedgerTotals::TotalExpenseMinor,
            ])
            .values_panic([1.into(), 0i64.into(), 0i64.into()])
            .to_owned();
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first.
        manager
            .drop_table(Table::drop().table(LedgerTotals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IncomeEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DueObligations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MemberRights::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RightDues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rights::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        Ok(())
    }
}
