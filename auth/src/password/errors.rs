use thiserror::Error;

/// Error type for hashing operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Hash verification failed: {0}")]
    VerificationFailed(String),
}
