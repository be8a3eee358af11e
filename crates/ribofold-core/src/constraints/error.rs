use thiserror::Error;

use super::container::VariantKind;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConstraintError {
    #[error("Constraint value count {actual} does not match sequence length {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Operation '{operation}' requires {required:?} storage, but the container holds {active:?}")]
    VariantMismatch {
        operation: &'static str,
        required: VariantKind,
        active: VariantKind,
    },
}
