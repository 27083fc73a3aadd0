use chrono::Utc;
use log::info;

use crate::modules::auth::{AuthError, CredentialStore, User};
use crate::modules::utils::text::slugify;
use crate::{ADMIN_EMAIL, ADMIN_ID, ADMIN_NAME, ADMIN_PASSWORD};

/// Seed the default admin account when no users are stored.
///
/// Stored records that cannot be read as users still count as existing users.
/// A corrupt user slot reads as empty, so it is replaced by the admin record.
/// Returns the seeded user, or `None` when users already exist.
pub fn seed_admin_if_needed(store: &CredentialStore<'_>) -> Result<Option<User>, AuthError> {
    if store.record_count() > 0 {
        return Ok(None);
    }

    let admin = User {
        id: ADMIN_ID.to_string(),
        name: ADMIN_NAME.to_string(),
        email: ADMIN_EMAIL.to_string(),
        password_obscured: store.obscurer().obscure(ADMIN_PASSWORD),
        created_at: Utc::now(),
        slug: slugify(ADMIN_NAME),
    };

    store.append_user(&admin)?;
    info!(
        "Seeded admin user ({} / {}) using {} obscuring",
        ADMIN_EMAIL,
        ADMIN_PASSWORD,
        store.obscurer().name()
    );
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::password::{Base64Obscurer, Sha256Obscurer};
    use crate::modules::storage::{KeyValueStorage, MemoryStorage};
    use crate::USERS_KEY;

    #[test]
    fn test_seeds_empty_store() {
        let storage = MemoryStorage::new();
        let store = CredentialStore::new(&storage, Box::new(Base64Obscurer));

        let admin = seed_admin_if_needed(&store).unwrap().unwrap();
        assert_eq!(admin.id, "admin_1");
        assert_eq!(admin.password_obscured, "QWRtaW4xMjMh");

        let public = store.verify("ADMIN@neonfolio.test", "Admin123!").unwrap();
        assert_eq!(public.id, "admin_1");
        assert_eq!(public.name, "Admin");
    }

    #[test]
    fn test_leaves_existing_users_alone() {
        let storage = MemoryStorage::new();
        let store = CredentialStore::new(&storage, Box::new(Sha256Obscurer));
        store.create("Ada", "ada@example.com", "secret1").unwrap();

        assert!(seed_admin_if_needed(&store).unwrap().is_none());
        assert_eq!(store.list_users().len(), 1);
        assert!(store.find_by_email(ADMIN_EMAIL).is_none());
    }

    #[test]
    fn test_seeding_twice_adds_one_admin() {
        let storage = MemoryStorage::new();
        let store = CredentialStore::new(&storage, Box::new(Sha256Obscurer));

        assert!(seed_admin_if_needed(&store).unwrap().is_some());
        assert!(seed_admin_if_needed(&store).unwrap().is_none());
        assert_eq!(store.list_users().len(), 1);
    }

    #[test]
    fn test_unreadable_records_block_seeding() {
        let storage = MemoryStorage::new();
        storage
            .set(USERS_KEY, r#"[{"id":"u_1","email":"ada@example.com"}]"#)
            .unwrap();
        let store = CredentialStore::new(&storage, Box::new(Sha256Obscurer));
        assert!(store.list_users().is_empty());

        assert!(seed_admin_if_needed(&store).unwrap().is_none());
        assert_eq!(store.record_count(), 1);
        assert!(storage.get(USERS_KEY).unwrap().contains("ada@example.com"));
    }

    #[test]
    fn test_replaces_corrupt_user_slot() {
        let storage = MemoryStorage::new();
        storage.set(USERS_KEY, "[{broken").unwrap();
        let store = CredentialStore::new(&storage, Box::new(Sha256Obscurer));

        assert!(seed_admin_if_needed(&store).unwrap().is_some());
        assert_eq!(store.list_users().len(), 1);
    }
}
