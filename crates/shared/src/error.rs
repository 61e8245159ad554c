use thiserror::Error;

use crate::domain::FormField;

/// Raised when form values cannot be encoded into a prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("{field} is required")]
    Missing { field: FormField },
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: FormField, value: String },
}

impl ContractError {
    pub fn field(&self) -> FormField {
        match self {
            ContractError::Missing { field } | ContractError::NotANumber { field, .. } => *field,
        }
    }
}
