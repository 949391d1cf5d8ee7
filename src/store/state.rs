use anyhow::Result;

use crate::domain::email::EmailState;
use crate::store::repo::KeyValueStore;

/// Key under which the current address record is kept.
pub const STATE_KEY: &str = "emailState";

/// Saves and restores the `{ email, timestamp }` record.
pub struct StateStore {
    kv: Box<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn save(&self, address: &str, issued_at: i64) -> Result<()> {
        let state = EmailState::new(address, issued_at);
        self.kv.set(STATE_KEY, &serde_json::to_string(&state)?)
    }

    /// `None` when nothing is saved or the record cannot be read.
    pub fn load(&self) -> Option<EmailState> {
        let raw = match self.kv.get(STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("could not read saved address state: {e:#}");
                return None;
            }
        };
        match serde_json::from_str::<EmailState>(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("ignoring corrupt saved address state: {e}");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.kv.remove(STATE_KEY)
    }
}
