use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};

/// Strategy used to obscure passwords before they are persisted.
///
/// Neither implementation is a real credential hash: there is no salt and no
/// key stretching.
pub trait PasswordObscurer {
    /// Short name used in configuration and logs
    fn name(&self) -> &'static str;

    /// Deterministic transform of the plaintext password
    fn obscure(&self, password: &str) -> String;

    /// Recompute the transform and compare it with the stored value
    fn matches(&self, password: &str, stored: &str) -> bool {
        self.obscure(password) == stored
    }
}

/// Reversible base64 encoding of the UTF-8 bytes
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Obscurer;

impl PasswordObscurer for Base64Obscurer {
    fn name(&self) -> &'static str {
        "base64"
    }

    fn obscure(&self, password: &str) -> String {
        BASE64.encode(password.as_bytes())
    }
}

/// Lowercase hex SHA-256 digest
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Obscurer;

impl PasswordObscurer for Sha256Obscurer {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn obscure(&self, password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }
}
