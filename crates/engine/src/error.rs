//! The module contains the errors the engine can throw.
//!
//! Validation errors always carry the offending member id or amount so the
//! caller can surface a specific message instead of a generic failure.

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The split kind string on a record is unknown, or a record's participant
    /// shape does not match its kind.
    #[error("invalid split kind: {0}")]
    InvalidSplitKind(String),
    /// A non-settlement record has no participants.
    #[error("expense {expense} has an empty participant set")]
    EmptyParticipantSet { expense: Uuid },
    /// The balances of a group do not sum to zero. This is a caller/data bug;
    /// the engine refuses to produce a skewed result.
    #[error("balances for group {group} do not sum to zero (residue: {residue_cents} cents)")]
    UnbalancedLedger { group: Uuid, residue_cents: i64 },
    /// A balance fold left the representable range of integer cents.
    #[error("balance overflow while aggregating group {group}")]
    BalanceOverflow { group: Uuid },
    /// A member tried to settle a debt with themselves.
    #[error("member {member} cannot settle with themselves")]
    SelfSettlement { member: Uuid },
    /// A settlement amount was zero or negative.
    #[error("settlement amount must be > 0, got {0} cents")]
    NonPositiveAmount(i64),
    /// The paying member does not currently owe anything.
    #[error("member {member} has no debt to settle (balance: {balance_cents} cents)")]
    NoDebt { member: Uuid, balance_cents: i64 },
    /// The receiving member is not currently owed anything.
    #[error("member {member} is not owed any money (balance: {balance_cents} cents)")]
    NotOwed { member: Uuid, balance_cents: i64 },
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidSplitKind(a), Self::InvalidSplitKind(b)) => a == b,
            (Self::EmptyParticipantSet { expense: a }, Self::EmptyParticipantSet { expense: b }) => {
                a == b
            }
            (
                Self::UnbalancedLedger {
                    group: a,
                    residue_cents: ra,
                },
                Self::UnbalancedLedger {
                    group: b,
                    residue_cents: rb,
                },
            ) => a == b && ra == rb,
            (Self::BalanceOverflow { group: a }, Self::BalanceOverflow { group: b }) => a == b,
            (Self::SelfSettlement { member: a }, Self::SelfSettlement { member: b }) => a == b,
            (Self::NonPositiveAmount(a), Self::NonPositiveAmount(b)) => a == b,
            (
                Self::NoDebt {
                    member: a,
                    balance_cents: ba,
                },
                Self::NoDebt {
                    member: b,
                    balance_cents: bb,
                },
            ) => a == b && ba == bb,
            (
                Self::NotOwed {
                    member: a,
                    balance_cents: ba,
                },
                Self::NotOwed {
                    member: b,
                    balance_cents: bb,
                },
            ) => a == b && ba == bb,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
