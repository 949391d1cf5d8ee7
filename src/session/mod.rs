//! The polling session: current address, its rotation, and the inbox poll.
//!
//! Everything runs on one task. Network calls and timers are spawned, and report
//! back through the [`SessionEvent`] channel returned by [`Session::new`]; the
//! owner feeds those events to [`Session::handle`] one at a time.

mod lifecycle;
mod mailbox;
pub mod render;
pub mod timer;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::config::Config;
use crate::domain::email::Message;
use crate::error::ClientError;
use crate::mail::api_client::MailApi;
use crate::session::render::Renderer;
use crate::session::timer::Timer;
use crate::store::state::StateStore;

pub const POLL_INTERVAL: Duration = Duration::from_millis(30_000);
pub const ROTATION_PERIOD: Duration = Duration::from_millis(3_600_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    pub rotation_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            rotation_period: ROTATION_PERIOD,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            poll_interval: cfg.poll_interval(),
            rotation_period: cfg.rotation_period(),
        }
    }
}

/// Wall clock in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    PollTick {
        address: String,
    },
    RotationDue {
        epoch: u64,
    },
    Generated(Result<String, ClientError>),
    Fetched {
        address: String,
        result: Result<Vec<Message>, ClientError>,
    },
}

pub struct Session<R: Renderer> {
    api: Arc<dyn MailApi>,
    store: StateStore,
    renderer: R,
    clock: Box<dyn Clock>,
    config: SessionConfig,
    events: UnboundedSender<SessionEvent>,

    current: Option<String>,
    message_count: usize,
    // Listing size last shown for the current address; None right after a restore
    seen: Option<usize>,
    generating: bool,

    poll_timer: Timer,
    rotation_timer: Timer,
    rotation_epoch: u64,
    rotation_delay: Option<Duration>,
}

impl<R: Renderer> Session<R> {
    pub fn new(
        api: Arc<dyn MailApi>,
        store: StateStore,
        renderer: R,
        clock: Box<dyn Clock>,
        config: SessionConfig,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = unbounded_channel();
        let session = Self {
            api,
            store,
            renderer,
            clock,
            config,
            events,
            current: None,
            message_count: 0,
            seen: None,
            generating: false,
            poll_timer: Timer::new(),
            rotation_timer: Timer::new(),
            rotation_epoch: 0,
            rotation_delay: None,
        };
        (session, rx)
    }

    /// Applies one event produced by a timer or a finished request.
    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::PollTick { address } => {
                if self.is_current(&address) {
                    self.fetch_once();
                } else {
                    log::debug!("dropping poll tick for stale address {address}");
                }
            }
            SessionEvent::RotationDue { epoch } => {
                if epoch == self.rotation_epoch {
                    log::info!("address rotation due");
                    self.generate();
                } else {
                    log::debug!("dropping superseded rotation #{epoch}");
                }
            }
            SessionEvent::Generated(result) => self.on_generated(result),
            SessionEvent::Fetched { address, result } => self.on_fetched(&address, result),
        }
    }

    /// Cancels both timers. The session stays usable; a later `generate` re-arms them.
    pub fn shutdown(&mut self) {
        self.poll_timer.cancel();
        self.rotation_timer.cancel();
        self.rotation_delay = None;
    }

    pub fn current_address(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_polling(&self) -> bool {
        self.poll_timer.is_armed()
    }

    /// Delay the rotation timer was last armed with, if it is armed.
    pub fn rotation_delay(&self) -> Option<Duration> {
        self.rotation_delay.filter(|_| self.rotation_timer.is_armed())
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn is_current(&self, address: &str) -> bool {
        self.current.as_deref() == Some(address)
    }
}
