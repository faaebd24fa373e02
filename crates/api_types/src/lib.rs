//! JSON bodies of the HTTP API.
//!
//! Amounts travel as decimal strings with two fractional digits (`"12.50"`)
//! and dates as `YYYY-MM-DD`. Request bodies keep both as plain strings: the
//! engine validates them and reports every malformed field at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod member {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub national_id: String,
        pub name: String,
        pub address: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        /// One of `president`, `vice_president`, `secretary`, `treasurer`,
        /// `vocal_i`, `vocal_ii`, `vocal_iii`.
        pub role: Option<String>,
    }

    /// Partial update; absent fields are kept, `""` clears an optional one.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MemberUpdate {
        pub national_id: Option<String>,
        pub name: Option<String>,
        pub address: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub role: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Member {
        pub id: Uuid,
        pub national_id: String,
        pub name: String,
        pub address: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub role: Option<String>,
        /// `active` or `inactive`.
        pub status: String,
    }
}

pub mod right {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RightNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RightUpdate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Right {
        pub id: Uuid,
        pub name: String,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RightRemoval {
        pub right_id: Uuid,
        pub links_removed: usize,
        pub assignments_removed: usize,
        pub obligations_removed: usize,
        pub obligations_reattributed: usize,
        pub obligations_kept: usize,
    }
}

pub mod due {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DueNew {
        pub description: String,
        pub amount: String,
        pub limit_date: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DueUpdate {
        pub description: Option<String>,
        pub amount: Option<String>,
        pub limit_date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Due {
        pub id: Uuid,
        pub description: String,
        pub amount: String,
        pub limit_date: NaiveDate,
    }
}

pub mod assignment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignRight {
        pub member_id: Uuid,
        pub right_id: Uuid,
        pub start_date: String,
        pub end_date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignmentRange {
        pub start_date: String,
        pub end_date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberRight {
        pub member_id: Uuid,
        pub right_id: Uuid,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Assignment {
        pub assignment: MemberRight,
        /// Dues obligated by the assignment.
        pub created: Vec<Uuid>,
        /// Dues the member already owed.
        pub skipped: Vec<Uuid>,
    }
}

pub mod obligation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssignDue {
        pub member_id: Uuid,
        pub due_id: Uuid,
        pub date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Obligation {
        pub member_id: Uuid,
        pub due_id: Uuid,
        pub assigned_on: NaiveDate,
        /// `pending` or `completed`.
        pub status: String,
        pub origin_right_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ObligationBalance {
        pub amount_due: String,
        pub amount_paid: String,
        pub amount_remaining: String,
        pub status: String,
    }
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub member_id: Uuid,
        pub due_id: Uuid,
        pub date: String,
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Payment {
        pub id: Uuid,
        pub member_id: Uuid,
        pub due_id: Uuid,
        pub paid_on: NaiveDate,
        pub amount: String,
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentReceipt {
        pub payment: Payment,
        pub income_id: Uuid,
        pub balance: super::obligation::ObligationBalance,
    }
}

pub mod income {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub date: Option<String>,
        pub amount: String,
        pub source: Option<String>,
        pub notes: Option<String>,
    }

    /// Partial update of a manual entry; `""` clears `notes`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeUpdate {
        pub date: Option<String>,
        pub amount: Option<String>,
        pub source: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Income {
        pub id: Uuid,
        pub received_on: NaiveDate,
        pub amount: String,
        pub source: Option<String>,
        pub notes: Option<String>,
        pub payment_id: Option<Uuid>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub date: Option<String>,
        pub amount: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub date: Option<String>,
        pub amount: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Expense {
        pub id: Uuid,
        pub spent_on: NaiveDate,
        pub amount: String,
        pub description: String,
    }
}

pub mod funds {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Funds {
        pub total_income: String,
        pub total_expense: String,
        pub available: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Recompute {
        pub funds: Funds,
        pub statuses_corrected: usize,
    }
}

pub mod error {
    use super::*;

    /// Body of every non-2xx response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        /// Classification, e.g. `insufficient_funds`.
        pub kind: String,
        /// One human-readable message per violation.
        pub errors: Vec<String>,
    }
}
