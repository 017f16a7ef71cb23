//! Session context for the platform API.
//!
//! One explicit session object with an init/teardown lifecycle: created
//! by a successful login, torn down on logout or the first 401 from the
//! backend. The REST client reads the bearer token through the manager;
//! nothing else touches the token. A session store port persists the
//! context across processes (the desk analog of browser local storage).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

use crate::domain::error::QuantdeskError;
use crate::domain::platform::UserInfo;
use crate::ports::session_port::SessionStorePort;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, user: UserInfo) -> Self {
        Self {
            token,
            user,
            created_at: Utc::now(),
        }
    }
}

pub struct SessionManager {
    store: Arc<dyn SessionStorePort + Send + Sync>,
    current: RwLock<Option<Session>>,
}

impl SessionManager {
    /// Start with whatever the store has cached from a previous process.
    pub fn new(store: Arc<dyn SessionStorePort + Send + Sync>) -> Self {
        let cached = store.load().unwrap_or_default();
        Self {
            store,
            current: RwLock::new(cached),
        }
    }

    /// Install a freshly created session and persist it.
    pub fn install(&self, session: Session) -> Result<(), QuantdeskError> {
        self.store.save(&session)?;
        *self.current.write().expect("session lock poisoned") = Some(session);
        Ok(())
    }

    /// Tear the session down: forget it in memory and clear the cache.
    /// Used for logout and for 401 responses.
    pub fn teardown(&self) -> Result<(), QuantdeskError> {
        *self.current.write().expect("session lock poisoned") = None;
        self.store.clear()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.current
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub fn is_active(&self) -> bool {
        self.current
            .read()
            .expect("session lock poisoned")
            .is_some()
    }
}
