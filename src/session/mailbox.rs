use std::sync::Arc;

use crate::domain::email::{Message, MessageCard};
use crate::error::ClientError;
use crate::session::render::{EMPTY_INBOX_TEXT, FETCH_ERROR_TEXT, InboxContent, Renderer};
use crate::session::{Session, SessionEvent};

impl<R: Renderer> Session<R> {
    /// Fetches now, then every poll interval. Replaces any running poll.
    pub fn start_polling(&mut self) {
        self.poll_timer.cancel();
        let Some(address) = self.current.clone() else {
            return;
        };

        self.fetch_once();
        self.poll_timer
            .arm_repeating(self.config.poll_interval, self.events.clone(), move || {
                SessionEvent::PollTick {
                    address: address.clone(),
                }
            });
    }

    /// Lists messages for the current address once. The result arrives as
    /// [`SessionEvent::Fetched`]; nothing happens without a current address.
    pub fn fetch_once(&mut self) {
        let Some(address) = self.current.clone() else {
            return;
        };
        // The server keys mailboxes by lowercase address
        let lookup = address.to_lowercase();

        let api = Arc::clone(&self.api);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = api.list_messages(&lookup).await;
            let _ = tx.send(SessionEvent::Fetched { address, result });
        });
    }

    pub fn stop_polling(&mut self) {
        self.poll_timer.cancel();
    }

    pub(super) fn on_fetched(&mut self, address: &str, result: Result<Vec<Message>, ClientError>) {
        if !self.is_current(address) {
            log::debug!("discarding listing for {address}, no longer current");
            return;
        }

        let messages = match result {
            Ok(messages) => messages,
            Err(e) => {
                // Count stays as it was
                log::error!("{e}");
                self.renderer.render_inbox(InboxContent::Notice(FETCH_ERROR_TEXT));
                return;
            }
        };

        self.message_count = messages.len();
        self.renderer.render_count(messages.len());

        if messages.is_empty() {
            self.renderer.render_inbox(InboxContent::Notice(EMPTY_INBOX_TEXT));
        } else {
            let cards: Vec<MessageCard> = messages.iter().map(MessageCard::from_message).collect();
            if let Some(seen) = self.seen
                && cards.len() > seen
            {
                self.renderer.announce_new(&cards[..cards.len() - seen]);
            }
            self.renderer.render_inbox(InboxContent::Messages(cards));
        }
        self.seen = Some(messages.len());
    }
}
