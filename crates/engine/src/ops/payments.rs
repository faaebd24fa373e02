use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    EngineError, IncomeEntry, Money, ObligationBalance, Payment, PaymentCmd,
    ResultEngine, Violations, incomes, obligations, payment_violations, payments,
    util::{parse_date, parse_positive_amount},
};

use super::{
    Engine, load_totals, payment_amounts, store_totals, sync_obligation_status, with_tx,
};

/// `source` of every income entry mirroring a payment.
pub(crate) const PAYMENT_SOURCE: &str = "payment";

/// Outcome of [`Engine::record_payment`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub payment: Payment,
    /// The income entry mirroring the payment.
    pub income_id: Uuid,
    /// Balance of the obligation after the payment.
    pub balance: ObligationBalance,
}

impl Engine {
    /// Record a payment against the obligation `(member_id, due_id)`.
    ///
    /// The payment may not push the paid total past the due amount. The
    /// payment, the obligation status and the mirrored income entry are
    /// written in one DB transaction.
    pub async fn record_payment(&self, cmd: PaymentCmd) -> ResultEngine<PaymentReceipt> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let member_id = cmd.member_id.to_string();
            let due_id = cmd.due_id.to_string();
            let mut violations = Violations::new();

            let due = violations.take(self.require_due(&db_tx, cmd.due_id).await);
            let obligation = match &due {
                Some(_) => violations.take(
                    self.require_obligation(&db_tx, cmd.member_id, cmd.due_id)
                        .await,
                ),
                None => None,
            };
            let amount = violations.take(parse_positive_amount(&cmd.amount, "amount"));
            let paid_on = violations.take(parse_date(&cmd.paid_on, "date"));

            let mut prior = Vec::new();
            if let (Some(due), Some(_)) = (&due, &obligation) {
                prior = payment_amounts(&db_tx, &member_id, &due_id).await?;
                let paid_so_far: Money = prior.iter().sum();
                if let Some(err) =
                    payment_violations(Money::new(due.amount_minor), paid_so_far, amount)
                {
                    violations.push(err);
                }
            }

            let (((due, obligation), amount), paid_on) = violations
                .finish(due.zip(obligation).zip(amount).zip(paid_on))
                .inspect_err(|err| {
                    warn!(%member_id, %due_id, error = %err, "payment rejected");
                })?;

            let payment = Payment::new(cmd.member_id, cmd.due_id, paid_on, amount);
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;

            prior.push(amount);
            let balance = ObligationBalance::compute(Money::new(due.amount_minor), &prior);
            if obligation.status != balance.status.as_str() {
                let mut active: obligations::ActiveModel = obligation.into();
                active.status = ActiveValue::Set(balance.status.as_str().to_string());
                active.update(&db_tx).await?;
            }

            let income = IncomeEntry {
                id: Uuid::new_v4(),
                received_on: paid_on,
                amount,
                source: Some(PAYMENT_SOURCE.to_string()),
                notes: Some(due.description.clone()),
                payment_id: Some(payment.id),
            };
            incomes::ActiveModel::from(&income).insert(&db_tx).await?;

            let totals = load_totals(&db_tx).await?;
            store_totals(&db_tx, totals.with_income(amount)?).await?;

            info!(
                payment_id = %payment.id,
                %member_id,
                %due_id,
                amount = %amount,
                status = balance.status.as_str(),
                "payment recorded"
            );
            Ok(PaymentReceipt {
                payment,
                income_id: income.id,
                balance,
            })
        })
    }

    /// Balance of the obligation `(member_id, due_id)`, computed from its
    /// payments rather than read from the cached status.
    pub async fn obligation_status(
        &self,
        member_id: Uuid,
        due_id: Uuid,
    ) -> ResultEngine<ObligationBalance> {
        with_tx!(self, |db_tx| {
            let due = self.require_due(&db_tx, due_id).await?;
            let obligation = self.require_obligation(&db_tx, member_id, due_id).await?;
            let paid =
                payment_amounts(&db_tx, &obligation.member_id, &obligation.due_id).await?;
            Ok(ObligationBalance::compute(
                Money::new(due.amount_minor),
                &paid,
            ))
        })
    }

    /// Delete a payment together with its mirrored income entry and return
    /// the balance of the obligation afterwards.
    ///
    /// Rejected with `InsufficientFunds` when the income already funded
    /// expenses.
    pub async fn delete_payment(&self, payment_id: Uuid) -> ResultEngine<ObligationBalance> {
        let _gate = self.ledger_gate.lock().await;
        with_tx!(self, |db_tx| {
            let model = payments::Entity::find_by_id(payment_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("payment".to_string()))?;
            let payment = Payment::try_from(model.clone())?;

            let mirrored = incomes::Entity::find()
                .filter(incomes::Column::PaymentId.eq(payment_id.to_string()))
                .all(&db_tx)
                .await?;
            let removed: Money = mirrored.iter().map(|i| Money::new(i.amount_minor)).sum();
            let totals = load_totals(&db_tx).await?;
            totals.ensure_can_withdraw(removed).inspect_err(|err| {
                warn!(%payment_id, error = %err, "payment deletion rejected");
            })?;

            incomes::Entity::delete_many()
                .filter(incomes::Column::PaymentId.eq(payment_id.to_string()))
                .exec(&db_tx)
                .await?;
            model.delete(&db_tx).await?;
            store_totals(&db_tx, totals.without_income(removed)).await?;

            let due = self.require_due(&db_tx, payment.due_id).await?;
            let obligation = self
                .require_obligation(&db_tx, payment.member_id, payment.due_id)
                .await?;
            let due_amount = Money::new(due.amount_minor);
            let paid =
                payment_amounts(&db_tx, &obligation.member_id, &obligation.due_id).await?;
            let balance = ObligationBalance::compute(due_amount, &paid);
            sync_obligation_status(&db_tx, obligation, due_amount).await?;

            info!(%payment_id, amount = %payment.amount, "payment deleted");
            Ok(balance)
        })
    }

    pub async fn payment(&self, payment_id: Uuid) -> ResultEngine<Payment> {
        with_tx!(self, |db_tx| {
            let model = payments::Entity::find_by_id(payment_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("payment".to_string()))?;
            Payment::try_from(model)
        })
    }

    /// Payments on one obligation, oldest first.
    pub async fn payments_of_obligation(
        &self,
        member_id: Uuid,
        due_id: Uuid,
    ) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            self.require_obligation(&db_tx, member_id, due_id).await?;
            payments::Entity::find()
                .filter(payments::Column::MemberId.eq(member_id.to_string()))
                .filter(payments::Column::DueId.eq(due_id.to_string()))
                .order_by_asc(payments::Column::PaidOn)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Payment::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Every payment, newest first.
    pub async fn payments(&self) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            payments::Entity::find()
                .order_by_desc(payments::Column::PaidOn)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Payment::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
