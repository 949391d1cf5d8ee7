use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientError;
use crate::session::render::{AddressStatus, EMPTY_INBOX_TEXT, InboxContent, Renderer};
use crate::session::{Session, SessionEvent};

impl<R: Renderer> Session<R> {
    /// Adopts the saved address if it is younger than the rotation period.
    ///
    /// On success polling starts and rotation is armed for the remainder of the
    /// period. Missing, corrupt or expired state returns `false` and changes nothing.
    pub fn restore(&mut self) -> bool {
        let Some(state) = self.store.load() else {
            return false;
        };
        if state.email.trim().is_empty() {
            log::warn!("saved address state has an empty address; ignoring it");
            return false;
        }

        let period = i64::try_from(self.config.rotation_period.as_millis()).unwrap_or(i64::MAX);
        // A record stamped in the future counts as issued just now
        let age = state.age_ms(self.clock.now_ms()).max(0);
        if age >= period {
            log::info!("saved address {} expired {} ms ago", state.email, age - period);
            return false;
        }

        log::info!("restored address {} ({} ms old)", state.email, age);
        self.renderer.render_address(AddressStatus::Ready(&state.email));
        self.current = Some(state.email);
        self.message_count = 0;
        self.seen = None;

        self.start_polling();
        let remaining = u64::try_from(period - age).unwrap_or(0);
        self.arm_rotation(Duration::from_millis(remaining));
        true
    }

    /// Requests a new address. The outcome arrives later as [`SessionEvent::Generated`].
    ///
    /// Ignored while a request is already in flight.
    pub fn generate(&mut self) {
        if self.generating {
            log::debug!("address request already in flight");
            return;
        }
        self.generating = true;
        self.renderer.render_address(AddressStatus::Generating);

        let api = Arc::clone(&self.api);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = api.issue_address().await;
            let _ = tx.send(SessionEvent::Generated(result));
        });
    }

    pub(super) fn on_generated(&mut self, result: Result<String, ClientError>) {
        self.generating = false;

        let address = match result {
            Ok(address) if !address.trim().is_empty() => address,
            Ok(_) => {
                self.generation_failed(ClientError::Generation("empty address".into()));
                return;
            }
            Err(e) => {
                self.generation_failed(e);
                return;
            }
        };

        log::info!("new address {address}");
        if let Err(e) = self.store.save(&address, self.clock.now_ms()) {
            log::warn!("could not save address state: {e:#}");
        }

        self.renderer.render_address(AddressStatus::Ready(&address));
        self.current = Some(address);

        self.message_count = 0;
        self.seen = Some(0);
        self.renderer.render_count(0);
        self.renderer.render_inbox(InboxContent::Notice(EMPTY_INBOX_TEXT));

        self.start_polling();
        self.arm_rotation(self.config.rotation_period);
    }

    // The previous address, if any, stays current and keeps polling.
    fn generation_failed(&mut self, e: ClientError) {
        log::error!("{e}");
        self.renderer.render_address(AddressStatus::Failed);
    }

    fn arm_rotation(&mut self, delay: Duration) {
        self.rotation_epoch += 1;
        self.rotation_delay = Some(delay);
        self.rotation_timer.arm_once(
            delay,
            self.events.clone(),
            SessionEvent::RotationDue {
                epoch: self.rotation_epoch,
            },
        );
        log::debug!("rotation #{} armed in {:?}", self.rotation_epoch, delay);
    }
}
