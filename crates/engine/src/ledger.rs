//! Ledger arithmetic.
//!
//! Pure functions deriving obligation balances and organization funds from
//! raw amounts. Nothing in here touches the database, so the same rules are
//! used to validate a write, to answer a status query and to rebuild cached
//! state in [`Engine::recompute_ledger`](crate::Engine::recompute_ledger).

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

/// Payment status of a due obligation.
///
/// Always derived from payments: `Completed` iff the paid total reaches the
/// due amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    Completed,
}

impl ObligationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Status implied by `paid` against a due of `amount`.
    #[must_use]
    pub fn derive(paid: Money, amount: Money) -> Self {
        if paid >= amount {
            Self::Completed
        } else {
            Self::Pending
        }
    }
}

impl TryFrom<&str> for ObligationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::InvalidField(format!(
                "invalid obligation status: {other}"
            ))),
        }
    }
}

/// Sum of payment amounts.
pub fn total_paid<'a>(payments: impl IntoIterator<Item = &'a Money>) -> Money {
    payments.into_iter().sum()
}

/// What is still owed on a due of `amount` after `paid`. Never negative.
#[must_use]
pub fn remaining(amount: Money, paid: Money) -> Money {
    (amount - paid).max(Money::ZERO)
}

/// Balance of one obligation, computed fresh from its payments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObligationBalance {
    pub amount_due: Money,
    pub amount_paid: Money,
    pub amount_remaining: Money,
    pub status: ObligationStatus,
}

impl ObligationBalance {
    pub fn compute<'a>(amount_due: Money, payments: impl IntoIterator<Item = &'a Money>) -> Self {
        let amount_paid = total_paid(payments);
        Self {
            amount_due,
            amount_paid,
            amount_remaining: remaining(amount_due, amount_paid),
            status: ObligationStatus::derive(amount_paid, amount_due),
        }
    }
}

/// Violations a new payment of `amount` would cause on an obligation that
/// already received `paid_so_far` against `amount_due`.
///
/// `amount` is `None` when it failed to parse; only the settled check runs
/// then.
pub fn payment_violations(
    amount_due: Money,
    paid_so_far: Money,
    amount: Option<Money>,
) -> Option<EngineError> {
    if paid_so_far >= amount_due {
        return Some(EngineError::AlreadySettled);
    }
    match amount {
        Some(amount)
            if amount.is_positive()
                && paid_so_far
                    .checked_add(amount)
                    .is_none_or(|total| total > amount_due) =>
        {
            Some(EngineError::ExceedsBalance {
                remaining: remaining(amount_due, paid_so_far),
            })
        }
        _ => None,
    }
}

/// Organization-wide cumulative income and expense.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub total_income: Money,
    pub total_expense: Money,
}

impl LedgerTotals {
    pub fn new(total_income: Money, total_expense: Money) -> Self {
        Self {
            total_income,
            total_expense,
        }
    }

    /// Full scan of both entry tables.
    pub fn from_entries<'a>(
        incomes: impl IntoIterator<Item = &'a Money>,
        expenses: impl IntoIterator<Item = &'a Money>,
    ) -> Self {
        Self {
            total_income: incomes.into_iter().sum(),
            total_expense: expenses.into_iter().sum(),
        }
    }

    /// `total_income - total_expense`.
    #[must_use]
    pub fn available(&self) -> Money {
        self.total_income - self.total_expense
    }

    /// Fails with `InsufficientFunds` unless `amount` can leave the ledger
    /// without making available funds negative.
    pub fn ensure_can_withdraw(&self, amount: Money) -> Result<(), EngineError> {
        let available = self.available();
        if amount > available {
            return Err(EngineError::InsufficientFunds {
                available,
                requested: amount,
                shortfall: amount - available,
            });
        }
        Ok(())
    }

    /// Fails with `InvalidAmount` if the total would leave the `i64` range.
    pub fn with_income(self, amount: Money) -> Result<Self, EngineError> {
        Ok(Self {
            total_income: grow(self.total_income, amount)?,
            ..self
        })
    }

    #[must_use]
    pub fn without_income(self, amount: Money) -> Self {
        Self {
            total_income: self.total_income - amount,
            ..self
        }
    }

    pub fn with_expense(self, amount: Money) -> Result<Self, EngineError> {
        Ok(Self {
            total_expense: grow(self.total_expense, amount)?,
            ..self
        })
    }

    #[must_use]
    pub fn without_expense(self, amount: Money) -> Self {
        Self {
            total_expense: self.total_expense - amount,
            ..self
        }
    }
}

fn grow(total: Money, amount: Money) -> Result<Money, EngineError> {
    total
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("ledger total out of range".to_string()))
}
