pub mod error;
pub mod password;
pub mod session;
pub mod store;
pub mod user_interface;

// Re-export the main types and functions
pub use error::AuthError;
pub use password::{Base64Obscurer, PasswordObscurer, Sha256Obscurer};
pub use session::{SessionRecord, SessionTracker};
pub use store::{CredentialStore, PublicUser, User};
pub use user_interface::{
    handle_login, handle_logout, handle_registration, remembered_email, FormError, LoginForm,
    RegistrationForm,
};
