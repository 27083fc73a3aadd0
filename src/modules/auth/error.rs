use crate::modules::storage::StorageError;

/// Failures surfaced by the credential store
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A required field was empty
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },
    /// The email does not look like local-part@domain.tld
    #[error("Invalid email: {email}")]
    Format { email: String },
    /// The email is already registered (case-insensitive)
    #[error("Email already registered: {email}")]
    Conflict { email: String },
    /// Unknown email or wrong password; deliberately not told apart
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
