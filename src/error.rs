use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by the game-result store and player registry.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        LedgerError::NotFound(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound(_))
    }
}
