//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent
//! invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

/// Require a non-negative amount for a labeled monetary field.
pub(crate) fn require_non_negative(amount_cents: i64, label: &str) -> ResultEngine<()> {
    if amount_cents < 0 {
        return Err(EngineError::Validation(format!(
            "{label} must not be negative"
        )));
    }
    Ok(())
}
