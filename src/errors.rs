//! Error types for the BichoRP ledger engine.

/// Root error type for all ledger operations.
///
/// User-input failures (`InvalidAmount`, `InsufficientBalance`,
/// `UserNotFound`, `InvalidPassword`, `DuplicateUsername`) always leave the
/// ledger untouched; `RegistryViolation` indicates malformed reference data
/// and aborts the operation that detected it.
#[derive(Debug, thiserror::Error)]
pub enum BichoError {
    #[error("Invalid bet amount: {0}")]
    InvalidAmount(i64),

    #[error("Insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: i64, amount: i64 },

    #[error("Unknown animal id: {0}")]
    UnknownAnimal(u32),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("No user is logged in")]
    NotLoggedIn,

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Animal registry violation: {0}")]
    RegistryViolation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] crate::config::ConfigValidationError),
}

/// Convenience alias used across the crate.
pub type BichoResult<T> = Result<T, BichoError>;
