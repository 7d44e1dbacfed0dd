//! The cached session used for bearer authentication.
//!
//! # Design
//! There is no process-wide "current user". A `SessionStore` is built once
//! and handed to whoever needs it (the dispatcher, the account service);
//! they all observe the same backing storage.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::TokenCache;
use crate::error::StoreError;

/// Well-known storage key holding the serialised session.
pub const USER_KEY: &str = "user";

/// The signed-in user as returned by `account/authenticate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub token: String,
}

#[derive(Clone)]
pub struct SessionStore {
    cache: TokenCache,
}

impl SessionStore {
    pub fn new(cache: TokenCache) -> Self {
        Self { cache }
    }

    pub fn current(&self) -> Result<Option<Session>, StoreError> {
        if !self.cache.contains_key(USER_KEY)? {
            return Ok(None);
        }
        self.cache.get(USER_KEY)
    }

    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.cache.set(USER_KEY, session)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.cache.remove(USER_KEY)
    }
}
