use sea_orm::{ActiveValue, DatabaseConnection, DatabaseTransaction, QueryFilter, prelude::*};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    EngineError, LedgerTotals, Money, ObligationStatus, ResultEngine, dues, ledger_totals,
    members as member_rows, obligations, payments as payment_rows, rights,
};

mod catalog;
mod entitlements;
mod ledger;
mod members;
mod payments;

pub use catalog::RightRemoval;
pub use entitlements::Assignment;
pub use ledger::LedgerRecompute;
pub use payments::PaymentReceipt;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    /// Held for the whole DB transaction of every write that checks and then
    /// moves the ledger aggregate or a paid total.
    ledger_gate: Mutex<()>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) async fn require_member(
        &self,
        db_tx: &DatabaseTransaction,
        member_id: Uuid,
    ) -> ResultEngine<member_rows::Model> {
        member_rows::Entity::find_by_id(member_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("member".to_string()))
    }

    pub(crate) async fn require_right(
        &self,
        db_tx: &DatabaseTransaction,
        right_id: Uuid,
    ) -> ResultEngine<rights::Model> {
        rights::Entity::find_by_id(right_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("right".to_string()))
    }

    pub(crate) async fn require_due(
        &self,
        db_tx: &DatabaseTransaction,
        due_id: Uuid,
    ) -> ResultEngine<dues::Model> {
        dues::Entity::find_by_id(due_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("due".to_string()))
    }

    pub(crate) async fn require_obligation(
        &self,
        db_tx: &DatabaseTransaction,
        member_id: Uuid,
        due_id: Uuid,
    ) -> ResultEngine<obligations::Model> {
        find_obligation(db_tx, member_id, due_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("obligation".to_string()))
    }
}

async fn find_obligation(
    db_tx: &DatabaseTransaction,
    member_id: Uuid,
    due_id: Uuid,
) -> ResultEngine<Option<obligations::Model>> {
    Ok(
        obligations::Entity::find_by_id((member_id.to_string(), due_id.to_string()))
            .one(db_tx)
            .await?,
    )
}

/// Amounts of every payment on the obligation `(member_id, due_id)`.
async fn payment_amounts(
    db_tx: &DatabaseTransaction,
    member_id: &str,
    due_id: &str,
) -> ResultEngine<Vec<Money>> {
    let rows = payment_rows::Entity::find()
        .filter(payment_rows::Column::MemberId.eq(member_id))
        .filter(payment_rows::Column::DueId.eq(due_id))
        .all(db_tx)
        .await?;
    Ok(rows.iter().map(|p| Money::new(p.amount_minor)).collect())
}

/// Rewrite the cached status of `obligation` from its payments.
///
/// Returns `true` when the stored value changed.
async fn sync_obligation_status(
    db_tx: &DatabaseTransaction,
    obligation: obligations::Model,
    due_amount: Money,
) -> ResultEngine<bool> {
    let paid: Money = payment_amounts(db_tx, &obligation.member_id, &obligation.due_id)
        .await?
        .iter()
        .sum();
    let status = ObligationStatus::derive(paid, due_amount);
    if obligation.status == status.as_str() {
        return Ok(false);
    }
    let mut active: obligations::ActiveModel = obligation.into();
    active.status = ActiveValue::Set(status.as_str().to_string());
    active.update(db_tx).await?;
    Ok(true)
}

/// Current ledger aggregate. A missing row reads as an empty ledger.
async fn load_totals(db_tx: &DatabaseTransaction) -> ResultEngine<LedgerTotals> {
    let row = ledger_totals::Entity::find_by_id(ledger_totals::LEDGER_ROW_ID)
        .one(db_tx)
        .await?;
    Ok(row.map_or_else(LedgerTotals::default, |row| {
        LedgerTotals::new(
            Money::new(row.total_income_minor),
            Money::new(row.total_expense_minor),
        )
    }))
}

async fn store_totals(db_tx: &DatabaseTransaction, totals: LedgerTotals) -> ResultEngine<()> {
    let exists = ledger_totals::Entity::find_by_id(ledger_totals::LEDGER_ROW_ID)
        .one(db_tx)
        .await?
        .is_some();
    let model = ledger_totals::ActiveModel {
        id: ActiveValue::Set(ledger_totals::LEDGER_ROW_ID),
        total_income_minor: ActiveValue::Set(totals.total_income.cents()),
        total_expense_minor: ActiveValue::Set(totals.total_expense.cents()),
    };
    if exists {
        model.update(db_tx).await?;
    } else {
        model.insert(db_tx).await?;
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            ledger_gate: Mutex::new(()),
        })
    }
}
