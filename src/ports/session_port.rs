//! Session persistence port trait.

use crate::domain::error::QuantdeskError;
use crate::domain::session::Session;

/// Single-slot session cache. Writes overwrite; there is exactly one
/// session per desk.
pub trait SessionStorePort {
    fn load(&self) -> Result<Option<Session>, QuantdeskError>;
    fn save(&self, session: &Session) -> Result<(), QuantdeskError>;
    fn clear(&self) -> Result<(), QuantdeskError>;
}
