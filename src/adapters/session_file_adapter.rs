//! JSON file session store.
//!
//! One session per desk, cached as a single JSON document. Writes
//! replace the whole file; a missing file just means no session.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::QuantdeskError;
use crate::domain::session::Session;
use crate::ports::session_port::SessionStorePort;

pub struct SessionFileAdapter {
    path: PathBuf,
}

impl SessionFileAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStorePort for SessionFileAdapter {
    fn load(&self) -> Result<Option<Session>, QuantdeskError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(QuantdeskError::SessionStore {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                })
            }
        };

        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            // A corrupt cache is the same as no cache; the user logs in again.
            Err(_) => Ok(None),
        }
    }

    fn save(&self, session: &Session) -> Result<(), QuantdeskError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| QuantdeskError::SessionStore {
                reason: format!("failed to create {}: {}", parent.display(), e),
            })?;
        }
        let content =
            serde_json::to_string_pretty(session).map_err(|e| QuantdeskError::SessionStore {
                reason: e.to_string(),
            })?;
        fs::write(&self.path, content).map_err(|e| QuantdeskError::SessionStore {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }

    fn clear(&self) -> Result<(), QuantdeskError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(QuantdeskError::SessionStore {
                reason: format!("failed to remove {}: {}", self.path.display(), e),
            }),
        }
    }
}
