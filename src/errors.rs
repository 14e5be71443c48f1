use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("invalid input: {field} ({reason})")]
    InvalidInput {
        field: String,
        reason: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid early payment mode: {mode}")]
    InvalidEarlyPaymentMode {
        mode: String,
    },

    #[error("schedule did not converge after {iterations} months: remaining balance {remaining_balance}")]
    NonConvergent {
        iterations: u32,
        remaining_balance: Money,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl LoanError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Serialization {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
