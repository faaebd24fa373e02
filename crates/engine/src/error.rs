//! The module contains the errors the engine can return.
//!
//! Every variant but [`Rejected`] and [`Database`] is a single validation
//! failure. Operations that check several conditions collect every failure
//! with [`Violations`] and report them together as [`Rejected`].
//!
//! [`Rejected`]: EngineError::Rejected
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

use crate::Money;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Duplicate link: {0}")]
    DuplicateLink(String),
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),
    #[error("Inactive: {0}")]
    Inactive(String),
    #[error("In use: {0}")]
    InUse(String),
    #[error("Obligation already settled")]
    AlreadySettled,
    #[error("Amount exceeds the remaining balance of {remaining}")]
    ExceedsBalance { remaining: Money },
    #[error("Insufficient funds: available {available}, requested {requested}, shortfall {shortfall}")]
    InsufficientFunds {
        available: Money,
        requested: Money,
        shortfall: Money,
    },
    #[error("{}", join_messages(.0))]
    Rejected(Vec<EngineError>),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Classification of an [`EngineError`], used by the boundary layer to pick a
/// transport status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidRange,
    InvalidAmount,
    InvalidField,
    MissingField,
    DuplicateLink,
    DuplicateEntry,
    Inactive,
    InUse,
    AlreadySettled,
    ExceedsBalance,
    InsufficientFunds,
    Database,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidRange => "invalid_range",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidField => "invalid_field",
            Self::MissingField => "missing_field",
            Self::DuplicateLink => "duplicate_link",
            Self::DuplicateEntry => "duplicate_entry",
            Self::Inactive => "inactive",
            Self::InUse => "in_use",
            Self::AlreadySettled => "already_settled",
            Self::ExceedsBalance => "exceeds_balance",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Database => "database",
        }
    }
}

impl EngineError {
    /// Classification of this error.
    ///
    /// A [`Rejected`](EngineError::Rejected) list is classified by its first
    /// violation; checks are ordered so a missing referent comes first.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidRange(_) => ErrorKind::InvalidRange,
            Self::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Self::InvalidField(_) => ErrorKind::InvalidField,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::DuplicateLink(_) => ErrorKind::DuplicateLink,
            Self::DuplicateEntry(_) => ErrorKind::DuplicateEntry,
            Self::Inactive(_) => ErrorKind::Inactive,
            Self::InUse(_) => ErrorKind::InUse,
            Self::AlreadySettled => ErrorKind::AlreadySettled,
            Self::ExceedsBalance { .. } => ErrorKind::ExceedsBalance,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::Rejected(errors) => errors
                .first()
                .map_or(ErrorKind::InvalidField, EngineError::kind),
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Human-readable messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Rejected(errors) => errors.iter().flat_map(EngineError::messages).collect(),
            other => vec![other.to_string()],
        }
    }

    /// Returns `true` if this error, or any collected violation, has `kind`.
    pub fn contains(&self, kind: ErrorKind) -> bool {
        match self {
            Self::Rejected(errors) => errors.iter().any(|e| e.contains(kind)),
            other => other.kind() == kind,
        }
    }
}

fn join_messages(errors: &[EngineError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::DuplicateLink(a), Self::DuplicateLink(b)) => a == b,
            (Self::DuplicateEntry(a), Self::DuplicateEntry(b)) => a == b,
            (Self::Inactive(a), Self::Inactive(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::AlreadySettled, Self::AlreadySettled) => true,
            (Self::ExceedsBalance { remaining: a }, Self::ExceedsBalance { remaining: b }) => {
                a == b
            }
            (
                Self::InsufficientFunds {
                    available: a1,
                    requested: r1,
                    shortfall: s1,
                },
                Self::InsufficientFunds {
                    available: a2,
                    requested: r2,
                    shortfall: s2,
                },
            ) => a1 == a2 && r1 == r2 && s1 == s2,
            (Self::Rejected(a), Self::Rejected(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Accumulates validation failures so an operation can report all of them at
/// once.
#[derive(Debug, Default)]
pub struct Violations(Vec<EngineError>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: EngineError) {
        self.0.push(err);
    }

    /// Records `err` when `failed` holds.
    pub fn check(&mut self, failed: bool, err: impl FnOnce() -> EngineError) {
        if failed {
            self.0.push(err());
        }
    }

    /// Unwraps a fallible parse, recording the error and returning `None`.
    pub fn take<T>(&mut self, result: Result<T, EngineError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.0.push(err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok` when nothing was recorded, the lone error for one failure,
    /// [`EngineError::Rejected`] otherwise.
    pub fn into_result(mut self) -> Result<(), EngineError> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(EngineError::Rejected(self.0)),
        }
    }

    /// Like [`into_result`](Self::into_result), yielding `value` on success.
    ///
    /// `value` is the combination of every parsed part; it is `None` only if a
    /// violation was recorded for one of them.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, EngineError> {
        self.into_result()?;
        value.ok_or_else(|| EngineError::InvalidField("incomplete input".to_string()))
    }
}
