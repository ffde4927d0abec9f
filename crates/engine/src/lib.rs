//! Shared-expense ledger engine.
//!
//! The core is a set of pure functions over an in-memory snapshot of a
//! group's expense history:
//!
//! - [`compute_shares`] derives per-member obligations from one record
//! - [`aggregate`] folds the full history into net balances
//! - [`simplify`] reduces balances to a minimal payment plan
//! - [`validate_settlement`] pre-checks a manual payment
//!
//! [`Engine`] wraps these with SQLite-backed operations (create/update/delete
//! expenses, record settlements) that always recompute balances from the full
//! record set instead of mutating cached values, so concurrent reads can
//! never observe a corrupted partial sum.

pub use balances::{BalanceSheet, MemberBalance, aggregate};
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, SplitKind};
pub use groups::Group;
pub use members::Member;
pub use money::MoneyCents;
pub use ops::{
    Engine, EngineBuilder, ExpensePatch, GroupView, NewExpense, ParticipantInput,
    RecordedSettlement,
};
pub use settlement::{SettlementCheck, validate_settlement};
pub use shares::{Share, ShareSpec};
pub use simplify::{PlannedPayment, simplify};
pub use split::{MemberShare, compute_shares};

mod balances;
mod currency;
mod error;
pub mod expenses;
pub mod groups;
pub mod members;
mod money;
mod ops;
mod settlement;
pub mod shares;
mod simplify;
mod split;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
