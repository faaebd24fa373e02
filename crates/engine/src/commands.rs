//! Command structs for engine write operations.
//!
//! Dates and amounts are carried as the raw strings received at the boundary:
//! the engine parses them itself so every malformed field is reported together
//! with the other violations of the same request.

use uuid::Uuid;

/// Register a new member.
#[derive(Clone, Debug, Default)]
pub struct MemberNew {
    pub national_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl MemberNew {
    #[must_use]
    pub fn new(national_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            national_id: national_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Partial update of a member. `None` keeps the stored value.
///
/// For the optional contact fields and `role`, an empty string clears the
/// stored value.
#[derive(Clone, Debug, Default)]
pub struct MemberUpdate {
    pub national_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl MemberUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Create a due template.
#[derive(Clone, Debug)]
pub struct DueNew {
    pub description: String,
    pub amount: String,
    pub limit_date: String,
}

impl DueNew {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        limit_date: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            limit_date: limit_date.into(),
        }
    }
}

/// Partial update of a due template.
#[derive(Clone, Debug, Default)]
pub struct DueUpdate {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub limit_date: Option<String>,
}

impl DueUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    #[must_use]
    pub fn limit_date(mut self, limit_date: impl Into<String>) -> Self {
        self.limit_date = Some(limit_date.into());
        self
    }
}

/// Assign a right to a member, or change the range of an assignment.
#[derive(Clone, Debug)]
pub struct AssignRightCmd {
    pub member_id: Uuid,
    pub right_id: Uuid,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl AssignRightCmd {
    #[must_use]
    pub fn new(member_id: Uuid, right_id: Uuid, start_date: impl Into<String>) -> Self {
        Self {
            member_id,
            right_id,
            start_date: start_date.into(),
            end_date: None,
        }
    }

    #[must_use]
    pub fn end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }
}

/// Record a payment against the obligation `(member_id, due_id)`.
#[derive(Clone, Debug)]
pub struct PaymentCmd {
    pub member_id: Uuid,
    pub due_id: Uuid,
    pub paid_on: String,
    pub amount: String,
}

impl PaymentCmd {
    #[must_use]
    pub fn new(
        member_id: Uuid,
        due_id: Uuid,
        paid_on: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            member_id,
            due_id,
            paid_on: paid_on.into(),
            amount: amount.into(),
        }
    }
}

/// Record manual income.
#[derive(Clone, Debug, Default)]
pub struct IncomeCmd {
    pub received_on: Option<String>,
    pub amount: String,
    pub source: Option<String>,
    pub notes: Option<String>,
}

impl IncomeCmd {
    #[must_use]
    pub fn new(
        received_on: impl Into<String>,
        amount: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            received_on: Some(received_on.into()),
            amount: amount.into(),
            source: Some(source.into()),
            notes: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Record an expense.
#[derive(Clone, Debug, Default)]
pub struct ExpenseCmd {
    pub spent_on: Option<String>,
    pub amount: String,
    pub description: Option<String>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        spent_on: impl Into<String>,
        amount: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            spent_on: Some(spent_on.into()),
            amount: amount.into(),
            description: Some(description.into()),
        }
    }
}

/// Partial update of a manual income entry. `None` keeps the stored value;
/// an empty `notes` clears it.
#[derive(Clone, Debug, Default)]
pub struct IncomeUpdate {
    pub received_on: Option<String>,
    pub amount: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

impl IncomeUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn received_on(mut self, received_on: impl Into<String>) -> Self {
        self.received_on = Some(received_on.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of an expense entry.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub spent_on: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
}

impl ExpenseUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn spent_on(mut self, spent_on: impl Into<String>) -> Self {
        self.spent_on = Some(spent_on.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
