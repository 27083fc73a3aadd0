use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::AuthError;
use super::password::PasswordObscurer;
use crate::modules::storage::{KeyValueStorage, StorageError};
use crate::modules::utils::text::{is_valid_email, slugify};
use crate::modules::utils::time::current_timestamp_millis;
use crate::{USERS_KEY, USER_ID_PREFIX};

/// A registered user as persisted in the `users` slot
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String, // As entered; compared case-insensitively
    #[serde(rename = "password", alias = "pwdHash")]
    pub password_obscured: String,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub slug: String,
}

impl User {
    /// Public projection without the obscured password
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

/// `createdAt` is an RFC 3339 string, or epoch milliseconds in older records
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedAt {
    Rfc3339(DateTime<Utc>),
    Millis(#[serde(with = "chrono::serde::ts_milliseconds")] DateTime<Utc>),
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CreatedAt::deserialize(deserializer)? {
        CreatedAt::Rfc3339(timestamp) | CreatedAt::Millis(timestamp) => timestamp,
    })
}

/// What callers outside the store get to see of a user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// User records kept in a key-value slot, scanned linearly
pub struct CredentialStore<'a> {
    storage: &'a dyn KeyValueStorage,
    obscurer: Box<dyn PasswordObscurer>,
}

impl<'a> CredentialStore<'a> {
    pub fn new(storage: &'a dyn KeyValueStorage, obscurer: Box<dyn PasswordObscurer>) -> Self {
        Self { storage, obscurer }
    }

    pub fn obscurer(&self) -> &dyn PasswordObscurer {
        self.obscurer.as_ref()
    }

    /// Raw records in the `users` slot.
    ///
    /// A missing slot, or one that is not a JSON array, reads as empty.
    fn load_records(&self) -> Vec<Value> {
        let Some(data) = self.storage.get(USERS_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(e) => {
                warn!("Stored users are corrupt, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn save_records(&self, records: &[Value]) -> Result<(), StorageError> {
        let data = serde_json::to_string(records)?;
        self.storage.set(USERS_KEY, &data)
    }

    /// Number of stored records, including ones that cannot be read as users
    pub fn record_count(&self) -> usize {
        self.load_records().len()
    }

    /// All readable users. Records that do not parse are skipped, not dropped.
    pub fn list_users(&self) -> Vec<User> {
        self.load_records()
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Skipping unreadable user record #{}: {}", index, e);
                    None
                }
            })
            .collect()
    }

    /// Replace the whole user collection
    pub fn save_users(&self, users: &[User]) -> Result<(), StorageError> {
        let data = serde_json::to_string(users)?;
        self.storage.set(USERS_KEY, &data)
    }

    /// Append one user, keeping every existing record as stored
    pub fn append_user(&self, user: &User) -> Result<usize, StorageError> {
        let mut records = self.load_records();
        records.push(serde_json::to_value(user)?);
        self.save_records(&records)?;
        Ok(records.len())
    }

    /// Case-insensitive exact match on the full address
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.list_users().into_iter().find(|u| u.has_email(email))
    }

    pub fn find_by_id(&self, id: &str) -> Option<User> {
        self.list_users().into_iter().find(|u| u.id == id)
    }

    /// Register a new user. Nothing is written unless every check passes.
    pub fn create(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        if name.is_empty() {
            return Err(AuthError::Validation { field: "name" });
        }
        if email.is_empty() {
            return Err(AuthError::Validation { field: "email" });
        }
        if password.is_empty() {
            return Err(AuthError::Validation { field: "password" });
        }
        if !is_valid_email(email) {
            return Err(AuthError::Format {
                email: email.to_string(),
            });
        }

        // Unreadable records still reserve their email and id
        let records = self.load_records();
        if records
            .iter()
            .filter_map(|r| r.get("email").and_then(Value::as_str))
            .any(|stored| stored.to_lowercase() == email.to_lowercase())
        {
            return Err(AuthError::Conflict {
                email: email.to_string(),
            });
        }

        let user = User {
            id: generate_user_id(&records),
            name: name.to_string(),
            email: email.to_string(),
            password_obscured: self.obscurer.obscure(password),
            created_at: Utc::now(),
            slug: slugify(name),
        };

        let stored = self.append_user(&user)?;
        info!("Created user {} ({} records stored)", user.id, stored);
        Ok(user)
    }

    /// Check credentials and return the public projection on a match.
    ///
    /// An unknown email and a wrong password both yield `None`.
    pub fn verify(&self, email: &str, password: &str) -> Option<PublicUser> {
        let user = self.find_by_email(email)?;
        if !self.obscurer.matches(password, &user.password_obscured) {
            return None;
        }
        Some(user.public())
    }

    /// Like [`verify`](Self::verify), with a miss reported as an error
    pub fn authenticate(&self, email: &str, password: &str) -> Result<PublicUser, AuthError> {
        match self.verify(email, password) {
            Some(user) => Ok(user),
            None => {
                debug!("Authentication failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

/// `u_<millis>_<suffix>`, regenerated until it collides with nobody
fn generate_user_id(existing: &[Value]) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let suffix: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let id = format!("{}{}_{}", USER_ID_PREFIX, current_timestamp_millis(), suffix);
        if !existing
            .iter()
            .any(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str()))
        {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::password::{Base64Obscurer, Sha256Obscurer};
    use crate::modules::storage::MemoryStorage;

    fn setup_test_store(storage: &MemoryStorage) -> CredentialStore<'_> {
        CredentialStore::new(storage, Box::new(Sha256Obscurer))
    }

    #[test]
    fn test_user_creation() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);

        let user = store.create("Ada Lovelace", "ada@example.com", "secret1").unwrap();
        assert!(user.id.starts_with("u_"));
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.slug, "ada-lovelace");
        assert_eq!(user.password_obscured, Sha256Obscurer.obscure("secret1"));

        let users = store.list_users();
        assert_eq!(users, vec![user]);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);

        assert!(matches!(
            store.create("", "a@x.com", "pw123456"),
            Err(AuthError::Validation { field: "name" })
        ));
        assert!(matches!(
            store.create("A", "", "pw123456"),
            Err(AuthError::Validation { field: "email" })
        ));
        assert!(matches!(
            store.create("A", "a@x.com", ""),
            Err(AuthError::Validation { field: "password" })
        ));
        assert!(store.list_users().is_empty());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);

        assert!(matches!(
            store.create("A", "nodomain", "pw123456"),
            Err(AuthError::Format { .. })
        ));
        assert!(store.list_users().is_empty());
        assert_eq!(storage.get(USERS_KEY), None);
    }

    #[test]
    fn test_duplicate_email_rejected_case_insensitively() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);

        store.create("A", "a@x.com", "pw123456").unwrap();
        let result = store.create("B", "A@X.COM", "other-password");
        assert!(matches!(result, Err(AuthError::Conflict { .. })));
        assert_eq!(store.list_users().len(), 1);
    }

    #[test]
    fn test_find_by_email_ignores_case() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);

        let created = store.create("A", "a@x.com", "pw123456").unwrap();
        assert_eq!(store.find_by_email("A@X.COM"), Some(created.clone()));
        assert_eq!(store.find_by_id(&created.id), Some(created));
        assert_eq!(store.find_by_email("b@x.com"), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);

        let first = store.create("A", "a@x.com", "pw123456").unwrap();
        let second = store.create("B", "b@x.com", "pw123456").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_verify() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);
        let user = store.create("Ada", "ada@example.com", "secret1").unwrap();

        let public = store.verify("ada@example.com", "secret1").unwrap();
        assert_eq!(public.id, user.id);
        assert_eq!(public.name, user.name);
        assert_eq!(public.email, user.email);

        // The projection never carries the obscured password
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json.as_object().unwrap().len(), 3);

        assert_eq!(store.verify("ADA@example.com", "secret1"), Some(public));
        assert_eq!(store.verify("ada@example.com", "secret2"), None);
        assert_eq!(store.verify("nobody@example.com", "secret1"), None);
    }

    #[test]
    fn test_authenticate_hides_failure_reason() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);
        store.create("Ada", "ada@example.com", "secret1").unwrap();

        let unknown = store.authenticate("nobody@example.com", "secret1").unwrap_err();
        let mismatch = store.authenticate("ada@example.com", "wrong").unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(mismatch, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), mismatch.to_string());
    }

    #[test]
    fn test_corrupt_users_slot_reads_empty() {
        let storage = MemoryStorage::new();
        storage.set(USERS_KEY, "{ definitely not a list").unwrap();
        let store = setup_test_store(&storage);

        assert!(store.list_users().is_empty());
        assert_eq!(store.verify("a@x.com", "pw123456"), None);
    }

    #[test]
    fn test_persisted_record_shape() {
        let storage = MemoryStorage::new();
        let store = CredentialStore::new(&storage, Box::new(Base64Obscurer));
        store.create("A", "a@x.com", "Admin123!").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&storage.get(USERS_KEY).unwrap()).unwrap();
        let record = &raw[0];
        assert_eq!(record["password"], "QWRtaW4xMjMh");
        assert!(record.get("createdAt").is_some());
        assert!(record.get("passwordObscured").is_none());
    }

    #[test]
    fn test_records_without_slug_still_load() {
        let storage = MemoryStorage::new();
        storage
            .set(
                USERS_KEY,
                r#"[{"id":"admin_1","name":"Admin","email":"admin@neonfolio.test","password":"QWRtaW4xMjMh","createdAt":"2024-01-01T00:00:00.000Z"}]"#,
            )
            .unwrap();
        let store = CredentialStore::new(&storage, Box::new(Base64Obscurer));

        let users = store.list_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].slug, "");
        assert!(store.verify("admin@neonfolio.test", "Admin123!").is_some());
    }

    #[test]
    fn test_unreadable_record_is_skipped_not_erased() {
        let storage = MemoryStorage::new();
        let ada_hash = Sha256Obscurer.obscure("secret1");
        storage
            .set(
                USERS_KEY,
                &format!(
                    r#"[{{"id":"u_1","name":"Ada","email":"ada@x.com","password":"{}","createdAt":"2024-01-01T00:00:00Z"}},
                        {{"id":"u_2","name":"Bob","email":"bob@x.com","createdAt":"2024-01-02T00:00:00Z"}}]"#,
                    ada_hash
                ),
            )
            .unwrap();
        let store = setup_test_store(&storage);

        // Bob has no password, so only Ada is readable
        let users = store.list_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "ada@x.com");
        assert_eq!(store.record_count(), 2);
        assert!(store.verify("ada@x.com", "secret1").is_some());

        store.create("Eve", "eve@x.com", "secret2").unwrap();
        let emails: Vec<String> = store.list_users().into_iter().map(|u| u.email).collect();
        assert_eq!(emails, vec!["ada@x.com", "eve@x.com"]);
        assert_eq!(store.record_count(), 3);
        assert!(storage.get(USERS_KEY).unwrap().contains("bob@x.com"));

        // The unreadable record still owns its email
        assert!(matches!(
            store.create("Bob", "BOB@x.com", "secret3"),
            Err(AuthError::Conflict { .. })
        ));
    }

    #[test]
    fn test_epoch_millis_and_pwd_hash_records_load() {
        let storage = MemoryStorage::new();
        storage
            .set(
                USERS_KEY,
                &format!(
                    r#"[{{"id":"k3j9x","email":"ada@x.com","name":"Ada","pwdHash":"{}","slug":"ada","createdAt":1700000000000}}]"#,
                    Sha256Obscurer.obscure("secret1")
                ),
            )
            .unwrap();
        let store = setup_test_store(&storage);

        let user = store.find_by_email("ADA@x.com").unwrap();
        assert_eq!(user.created_at.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(user.slug, "ada");
        assert_eq!(store.verify("ada@x.com", "secret1").map(|u| u.id), Some("k3j9x".to_string()));

        // Rewritten records use the RFC 3339 form
        store.create("Eve", "eve@x.com", "secret2").unwrap();
        assert_eq!(store.list_users().len(), 2);
    }

    #[test]
    fn test_save_users_replaces_collection() {
        let storage = MemoryStorage::new();
        let store = setup_test_store(&storage);
        let ada = store.create("Ada", "ada@x.com", "secret1").unwrap();
        store.create("Eve", "eve@x.com", "secret2").unwrap();

        store.save_users(&[ada.clone()]).unwrap();
        assert_eq!(store.list_users(), vec![ada]);
        assert_eq!(store.record_count(), 1);
    }
}
