//! Membership, dues and cash-ledger engine.
//!
//! Keeps four facts consistent across every write: which dues a member owes
//! because of which right, what has been paid on each of them, the status
//! derived from those payments and the organization's available funds.

pub use cascade::{CascadeIndex, ObligationFact, RightRemovalPlan, plan_right_removal};
pub use commands::{
    AssignRightCmd, DueNew, DueUpdate, ExpenseCmd, ExpenseUpdate, IncomeCmd, IncomeUpdate,
    MemberNew, MemberUpdate, PaymentCmd,
};
pub use dues::Due;
pub use error::{EngineError, ErrorKind, Violations};
pub use expenses::ExpenseEntry;
pub use incomes::IncomeEntry;
pub use ledger::{
    LedgerTotals, ObligationBalance, ObligationStatus, payment_violations, remaining, total_paid,
};
pub use member_rights::MemberRight;
pub use members::{Member, MemberStatus, Role};
pub use money::Money;
pub use obligations::Obligation;
pub use ops::{Assignment, Engine, EngineBuilder, LedgerRecompute, PaymentReceipt, RightRemoval};
pub use payments::Payment;
pub use rights::Right;

mod cascade;
mod commands;
mod dues;
mod error;
mod expenses;
mod incomes;
mod ledger;
mod ledger_totals;
mod member_rights;
mod members;
mod money;
mod obligations;
mod ops;
mod payments;
mod right_dues;
mod rights;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
