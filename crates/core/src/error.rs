use thiserror::Error;

/// Errors raised while parsing or validating story domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid visibility: {0}")]
    InvalidVisibility(String),

    #[error("Invalid importance: {0}")]
    InvalidImportance(String),

    #[error("Invalid plot thread status: {0}")]
    InvalidThreadStatus(String),

    #[error("Invalid involvement: {0}")]
    InvalidInvolvement(String),

    #[error("Invalid entity kind: {0}")]
    InvalidEntityKind(String),

    #[error("Invalid character aspect: {0}")]
    InvalidCharacterAspect(String),
}
