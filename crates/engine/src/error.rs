//! The module contains the errors the engine can throw.
//!
//! The taxonomy matters to callers:
//!
//! - [`Validation`] rejects bad input before anything is written.
//! - [`NotFound`] means a referenced record does not exist.
//! - [`Conflict`] means another writer already changed the record; reload
//!   and retry.
//! - [`Database`] wraps storage failures so callers can tell them apart
//!   from business errors.
//!
//! [`Validation`]: EngineError::Validation
//! [`NotFound`]: EngineError::NotFound
//! [`Conflict`]: EngineError::Conflict
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// A best-effort step that failed after the core disposition write
/// committed.
///
/// Warnings are surfaced to the caller for visibility and logged; the
/// committed state is never rolled back because of one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaleWarning {
    /// The cash-ledger entry for the sale proceeds could not be written.
    Ledger(String),
    /// The compliance report entry could not be scheduled.
    Compliance(String),
    /// The MV2459 document could not be produced.
    Document(String),
}

impl std::fmt::Display for SaleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger(msg) => write!(f, "cash ledger entry failed: {msg}"),
            Self::Compliance(msg) => write!(f, "compliance scheduling failed: {msg}"),
            Self::Document(msg) => write!(f, "document rendering failed: {msg}"),
        }
    }
}
