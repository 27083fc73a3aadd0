// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{admin, auth, config, storage, utils};

// Re-export commonly used types
pub use modules::auth::error::AuthError;
pub use modules::auth::password::{Base64Obscurer, PasswordObscurer, Sha256Obscurer};
pub use modules::auth::session::{SessionRecord, SessionTracker};
pub use modules::auth::store::{CredentialStore, PublicUser, User};
pub use modules::config::{AuthConfig, ObscurerKind};
pub use modules::storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};

// Storage slot keys
pub const USERS_KEY: &str = "users";
pub const CURRENT_USER_KEY: &str = "currentUser";
pub const REMEMBERED_EMAIL_KEY: &str = "rememberedEmail";

// Constants
pub const DEFAULT_STORE_FILE: &str = "neonfolio.json";
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const USER_ID_PREFIX: &str = "u_";

// Seeded admin account for local testing
pub const ADMIN_ID: &str = "admin_1";
pub const ADMIN_NAME: &str = "Admin";
pub const ADMIN_EMAIL: &str = "admin@neonfolio.test";
pub const ADMIN_PASSWORD: &str = "Admin123!";
