//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`OperationFailed`] thrown when a gateway call is rejected. It is the
//!   only error that reaches the remote side; every other variant is raised
//!   locally before any call is made.
//! - [`KeyNotFound`] thrown when a record id is not in the store.
//! - [`NotVisible`] thrown when a record exists but the current filter hides
//!   it, so it cannot be selected or edited.
//!
//!  [`OperationFailed`]: EngineError::OperationFailed
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`NotVisible`]: EngineError::NotVisible
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Record {0} is not in the visible statement")]
    NotVisible(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("No edit in progress")]
    NoActiveEdit,
    #[error("Edit in progress is for record {active}, not {requested}")]
    EditMismatch { active: String, requested: String },
    #[error("Export failed: {0}")]
    Export(String),
}

impl EngineError {
    /// Returns `true` when the error came back from the remote datastore.
    pub fn is_operation_failed(&self) -> bool {
        matches!(self, Self::OperationFailed(_))
    }
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_operation_failed() {
        let err = EngineError::OperationFailed("network down".to_string());
        assert_eq!(err.to_string(), "Operation failed: network down");
        assert!(err.is_operation_failed());
    }

    #[test]
    fn display_edit_mismatch() {
        let err = EngineError::EditMismatch {
            active: "7".to_string(),
            requested: "9".to_string(),
        };
        assert_eq!(err.to_string(), "Edit in progress is for record 7, not 9");
        assert!(!err.is_operation_failed());
    }
}
