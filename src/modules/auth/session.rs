use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::store::{CredentialStore, PublicUser};
use crate::modules::storage::{KeyValueStorage, StorageError};
use crate::CURRENT_USER_KEY;

/// The persisted session value.
///
/// Written as the public projection; the bare `{ "userId": ... }` form is
/// accepted on read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SessionRecord {
    Profile(PublicUser),
    Reference {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

impl SessionRecord {
    pub fn user_id(&self) -> &str {
        match self {
            SessionRecord::Profile(user) => &user.id,
            SessionRecord::Reference { user_id } => user_id,
        }
    }

    /// Email of the session user, when the full projection was stored
    pub fn email(&self) -> Option<&str> {
        match self {
            SessionRecord::Profile(user) => Some(&user.email),
            SessionRecord::Reference { .. } => None,
        }
    }
}

/// Tracks the single "logged in" user of this storage
pub struct SessionTracker<'a> {
    storage: &'a dyn KeyValueStorage,
}

impl<'a> SessionTracker<'a> {
    pub fn new(storage: &'a dyn KeyValueStorage) -> Self {
        Self { storage }
    }

    /// Persist `user` as the active session; `None` leaves the session untouched
    pub fn set_current(&self, user: Option<&PublicUser>) -> Result<(), StorageError> {
        let Some(user) = user else {
            return Ok(());
        };
        let data = serde_json::to_string(&SessionRecord::Profile(user.clone()))?;
        self.storage.set(CURRENT_USER_KEY, &data)?;
        debug!("Session set for user {}", user.id);
        Ok(())
    }

    /// The stored session, or `None` if unset or unreadable
    pub fn get_current(&self) -> Option<SessionRecord> {
        let data = self.storage.get(CURRENT_USER_KEY)?;
        match serde_json::from_str(&data) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Stored session is corrupt, ignoring it: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(CURRENT_USER_KEY)
    }

    /// Look the session's user up in `store`; a dangling reference yields `None`
    pub fn resolve(&self, store: &CredentialStore<'_>) -> Option<PublicUser> {
        let record = self.get_current()?;
        let user = store.find_by_id(record.user_id());
        if user.is_none() {
            debug!("Session references unknown user {}", record.user_id());
        }
        user.map(|u| u.public())
    }
}
