use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseCmd, ExpenseEntry, ExpenseUpdate, IncomeCmd, IncomeEntry, IncomeUpdate,
    LedgerTotals, Money, ResultEngine, Violations, dues, expenses, incomes, obligations,
    util::{normalize_optional_text, parse_date, parse_positive_amount, required_text},
};

use super::{Engine, load_totals, store_totals, sync_obligation_status, with_tx};

/// Outcome of [`Engine::recompute_ledger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerRecompute {
    /// Totals rebuilt from the entry tables.
    pub totals: LedgerTotals,
    /// Aggregate row as it was before the rebuild.
    pub previous: LedgerTotals,
    /// Obligations whose cached status did not match their payments.
    pub statuses_corrected: usize,
}

fn parse_entry_date(value: Option<&str>) -> ResultEngine<NaiveDate> {
    let value = required_text(value, "date")?;
    parse_date(&value, "date")
}

impl Engine {
    /// Record manual income.
    pub async fn record_income(&self, cmd: IncomeCmd) -> ResultEngine<IncomeEntry> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let mut violations = Violations::new();
            let amount = violations.take(parse_positive_amount(&cmd.amount, "amount"));
            let received_on = violations.take(parse_entry_date(cmd.received_on.as_deref()));
            let source = violations.take(required_text(cmd.source.as_deref(), "source"));
            let ((amount, received_on), source) = violations
                .finish(amount.zip(received_on).zip(source))
                .inspect_err(|err| warn!(error = %err, "income rejected"))?;

            let entry = IncomeEntry {
                id: Uuid::new_v4(),
                received_on,
                amount,
                source: Some(source),
                notes: normalize_optional_text(cmd.notes.as_deref()),
                payment_id: None,
            };
            incomes::ActiveModel::from(&entry).insert(&db_tx).await?;
            let totals = load_totals(&db_tx).await?;
            store_totals(&db_tx, totals.with_income(amount)?).await?;
            info!(income_id = %entry.id, amount = %amount, "income recorded");
            Ok(entry)
        })
    }

    /// Delete a manual income entry.
    ///
    /// Entries mirroring a payment go away only with
    /// [`delete_payment`](Engine::delete_payment).
    pub async fn delete_income(&self, income_id: Uuid) -> ResultEngine<()> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let model = find_income(&db_tx, income_id).await?;
            if model.payment_id.is_some() {
                return Err(EngineError::InvalidField(
                    "income generated by a payment is removed with the payment".to_string(),
                ));
            }
            let amount = Money::new(model.amount_minor);
            let totals = load_totals(&db_tx).await?;
            totals.ensure_can_withdraw(amount).inspect_err(|err| {
                warn!(%income_id, error = %err, "income deletion rejected");
            })?;
            model.delete(&db_tx).await?;
            store_totals(&db_tx, totals.without_income(amount)).await?;
            info!(%income_id, amount = %amount, "income deleted");
            Ok(())
        })
    }

    /// Record an expense if available funds cover it.
    ///
    /// The funds check and the insert run under the ledger gate, so two
    /// concurrent expenses can never both spend the same balance.
    pub async fn record_expense(&self, cmd: ExpenseCmd) -> ResultEngine<ExpenseEntry> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let mut violations = Violations::new();
            let amount = violations.take(parse_positive_amount(&cmd.amount, "amount"));
            let spent_on = violations.take(parse_entry_date(cmd.spent_on.as_deref()));
            let description =
                violations.take(required_text(cmd.description.as_deref(), "description"));

            if let (Some(spent_on), Some(description)) = (&spent_on, &description) {
                let duplicate = expenses::Entity::find()
                    .filter(expenses::Column::SpentOn.eq(*spent_on))
                    .filter(expenses::Column::Description.eq(description.as_str()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                violations.check(duplicate, || {
                    EngineError::DuplicateEntry(format!(
                        "expense '{description}' on {spent_on} already exists"
                    ))
                });
            }
            let totals = load_totals(&db_tx).await?;
            if let Some(amount) = amount {
                violations.take(totals.ensure_can_withdraw(amount));
            }

            let ((amount, spent_on), description) = violations
                .finish(amount.zip(spent_on).zip(description))
                .inspect_err(|err| warn!(error = %err, "expense rejected"))?;

            let entry = ExpenseEntry {
                id: Uuid::new_v4(),
                spent_on,
                amount,
                description,
            };
            expenses::ActiveModel::from(&entry).insert(&db_tx).await?;
            store_totals(&db_tx, totals.with_expense(amount)?).await?;
            info!(expense_id = %entry.id, amount = %amount, "expense recorded");
            Ok(entry)
        })
    }

    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let model = find_expense(&db_tx, expense_id).await?;
            let amount = Money::new(model.amount_minor);
            model.delete(&db_tx).await?;
            let totals = load_totals(&db_tx).await?;
            store_totals(&db_tx, totals.without_expense(amount)).await?;
            info!(%expense_id, amount = %amount, "expense deleted");
            Ok(())
        })
    }

    /// Edit a manual income entry.
    ///
    /// Lowering the amount withdraws the difference, so it must be covered
    /// by available funds.
    pub async fn update_income(
        &self,
        income_id: Uuid,
        cmd: IncomeUpdate,
    ) -> ResultEngine<IncomeEntry> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let model = find_income(&db_tx, income_id).await?;
            if model.payment_id.is_some() {
                return Err(EngineError::InvalidField(
                    "income generated by a payment cannot be edited".to_string(),
                ));
            }
            let previous = Money::new(model.amount_minor);

            let mut violations = Violations::new();
            let amount = match cmd.amount.as_deref() {
                Some(value) => violations.take(parse_positive_amount(value, "amount")),
                None => Some(previous),
            };
            let received_on = match cmd.received_on.as_deref() {
                Some(value) => violations.take(parse_date(value, "date")),
                None => Some(model.received_on),
            };
            let source = match cmd.source.as_deref() {
                Some(value) => violations.take(required_text(Some(value), "source")).map(Some),
                None => Some(model.source.clone()),
            };
            let totals = load_totals(&db_tx).await?;
            if let Some(amount) = amount.filter(|amount| *amount < previous) {
                violations.take(totals.ensure_can_withdraw(previous - amount));
            }
            let ((amount, received_on), source) = violations
                .finish(amount.zip(received_on).zip(source))
                .inspect_err(|err| warn!(%income_id, error = %err, "income update rejected"))?;

            let notes = match cmd.notes.as_deref() {
                Some(value) => normalize_optional_text(Some(value)),
                None => model.notes.clone(),
            };
            let mut active: incomes::ActiveModel = model.into();
            active.received_on = ActiveValue::Set(received_on);
            active.amount_minor = ActiveValue::Set(amount.cents());
            active.source = ActiveValue::Set(source);
            active.notes = ActiveValue::Set(notes);
            let entry = IncomeEntry::try_from(active.update(&db_tx).await?)?;

            store_totals(&db_tx, totals.without_income(previous).with_income(amount)?).await?;
            info!(%income_id, previous = %previous, amount = %amount, "income updated");
            Ok(entry)
        })
    }

    /// Edit an expense entry.
    ///
    /// Raising the amount spends the difference and goes through the funds
    /// guard; the `(date, description)` pair stays unique.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        cmd: ExpenseUpdate,
    ) -> ResultEngine<ExpenseEntry> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let model = find_expense(&db_tx, expense_id).await?;
            let previous = Money::new(model.amount_minor);

            let mut violations = Violations::new();
            let amount = match cmd.amount.as_deref() {
                Some(value) => violations.take(parse_positive_amount(value, "amount")),
                None => Some(previous),
            };
            let spent_on = match cmd.spent_on.as_deref() {
                Some(value) => violations.take(parse_date(value, "date")),
                None => Some(model.spent_on),
            };
            let description = match cmd.description.as_deref() {
                Some(value) => violations.take(required_text(Some(value), "description")),
                None => Some(model.description.clone()),
            };

            if let (Some(spent_on), Some(description)) = (&spent_on, &description) {
                let duplicate = expenses::Entity::find()
                    .filter(expenses::Column::Id.ne(model.id.clone()))
                    .filter(expenses::Column::SpentOn.eq(*spent_on))
                    .filter(expenses::Column::Description.eq(description.as_str()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                violations.check(duplicate, || {
                    EngineError::DuplicateEntry(format!(
                        "expense '{description}' on {spent_on} already exists"
                    ))
                });
            }
            let totals = load_totals(&db_tx).await?;
            if let Some(amount) = amount.filter(|amount| *amount > previous) {
                violations.take(totals.ensure_can_withdraw(amount - previous));
            }
            let ((amount, spent_on), description) = violations
                .finish(amount.zip(spent_on).zip(description))
                .inspect_err(|err| warn!(%expense_id, error = %err, "expense update rejected"))?;

            let mut active: expenses::ActiveModel = model.into();
            active.spent_on = ActiveValue::Set(spent_on);
            active.amount_minor = ActiveValue::Set(amount.cents());
            active.description = ActiveValue::Set(description);
            let entry = ExpenseEntry::try_from(active.update(&db_tx).await?)?;

            store_totals(&db_tx, totals.without_expense(previous).with_expense(amount)?).await?;
            info!(%expense_id, previous = %previous, amount = %amount, "expense updated");
            Ok(entry)
        })
    }

    pub async fn income(&self, income_id: Uuid) -> ResultEngine<IncomeEntry> {
        with_tx!(self, |db_tx| {
            let model = find_income(&db_tx, income_id).await?;
            IncomeEntry::try_from(model)
        })
    }

    /// Income entries, newest first.
    pub async fn incomes(&self) -> ResultEngine<Vec<IncomeEntry>> {
        with_tx!(self, |db_tx| {
            incomes::Entity::find()
                .order_by_desc(incomes::Column::ReceivedOn)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(IncomeEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<ExpenseEntry> {
        with_tx!(self, |db_tx| {
            let model = find_expense(&db_tx, expense_id).await?;
            ExpenseEntry::try_from(model)
        })
    }

    /// Expense entries, newest first.
    pub async fn expenses(&self) -> ResultEngine<Vec<ExpenseEntry>> {
        with_tx!(self, |db_tx| {
            expenses::Entity::find()
                .order_by_desc(expenses::Column::SpentOn)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ExpenseEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Organization totals from the ledger aggregate.
    pub async fn totals(&self) -> ResultEngine<LedgerTotals> {
        with_tx!(self, |db_tx| load_totals(&db_tx).await)
    }

    /// Rebuild the ledger aggregate from the entry tables and re-derive every
    /// obligation status from its payments.
    pub async fn recompute_ledger(&self) -> ResultEngine<LedgerRecompute> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let previous = load_totals(&db_tx).await?;
            let income: Vec<Money> = incomes::Entity::find()
                .all(&db_tx)
                .await?
                .iter()
                .map(|e| Money::new(e.amount_minor))
                .collect();
            let expense: Vec<Money> = expenses::Entity::find()
                .all(&db_tx)
                .await?
                .iter()
                .map(|e| Money::new(e.amount_minor))
                .collect();
            let totals = LedgerTotals::from_entries(&income, &expense);
            store_totals(&db_tx, totals).await?;

            let mut statuses_corrected = 0;
            for due in dues::Entity::find().all(&db_tx).await? {
                let amount = Money::new(due.amount_minor);
                let owed = obligations::Entity::find()
                    .filter(obligations::Column::DueId.eq(due.id.clone()))
                    .all(&db_tx)
                    .await?;
                for obligation in owed {
                    if sync_obligation_status(&db_tx, obligation, amount).await? {
                        statuses_corrected += 1;
                    }
                }
            }

            if previous != totals || statuses_corrected > 0 {
                warn!(
                    previous_income = %previous.total_income,
                    previous_expense = %previous.total_expense,
                    income = %totals.total_income,
                    expense = %totals.total_expense,
                    statuses_corrected,
                    "ledger drift corrected"
                );
            } else {
                info!(available = %totals.available(), "ledger verified");
            }
            Ok(LedgerRecompute {
                totals,
                previous,
                statuses_corrected,
            })
        })
    }
}

async fn find_income(db_tx: &DatabaseTransaction, income_id: Uuid) -> ResultEngine<incomes::Model> {
    incomes::Entity::find_by_id(income_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("income".to_string()))
}

async fn find_expense(
    db_tx: &DatabaseTransaction,
    expense_id: Uuid,
) -> ResultEngine<expenses::Model> {
    expenses::Entity::find_by_id(expense_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("expense".to_string()))
}
