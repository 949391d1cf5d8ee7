use anyhow::Result;
use notify_rust::Notification;

use crate::domain::email::MessageCard;
use crate::mail::decoders::snippet;

/// Desktop notifications for newly arrived messages.
pub struct Notifier {
    appname: String,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            appname: "rs_tempmail".to_string(),
        }
    }

    pub fn notify_message(&self, card: &MessageCard) -> Result<()> {
        Notification::new()
            .appname(&self.appname)
            .summary(&format!("{}: {}", card.from, card.subject))
            .body(&snippet(&card.body, 140))
            .show()?;
        Ok(())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
