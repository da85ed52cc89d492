//! Numa Types - Canonical domain types for the voice-first finance assistant
//!
//! This crate has zero dependencies on other Numa crates. It defines:
//!
//! - Identity types (`UserId`, `TransactionId`)
//! - `Amount`, a positive, single-currency monetary value
//! - The closed category taxonomy (spec §4.2)
//! - `User` and `Transaction`, the two persisted entities (spec §3)
//! - `IntentRecord` and friends, the transient output of the classifier

pub mod amount;
pub mod document;
pub mod error;
pub mod ids;
pub mod intent;
pub mod taxonomy;
pub mod transaction;
pub mod user;

pub use amount::Amount;
pub use document::DocumentData;
pub use error::{Result, TypesError};
pub use ids::{TransactionId, UserId};
pub use intent::{Entities, Intent, IntentRecord, Period, SteerKind};
pub use taxonomy::Category;
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::User;
