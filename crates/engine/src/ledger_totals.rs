//! Materialized ledger aggregate (single row).
//!
//! Updated in the same DB transaction as every income/expense insert or
//! delete; rebuilt from the entry tables by
//! [`Engine::recompute_ledger`](crate::Engine::recompute_ledger).

use sea_orm::entity::prelude::*;

/// Primary key of the only row.
pub const LEDGER_ROW_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_totals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
