use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A cancellable scheduled task that posts events into a channel.
///
/// Arming always cancels whatever was armed before, and dropping the timer
/// cancels it, so at most one task exists per `Timer`.
#[derive(Debug, Default)]
pub struct Timer {
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts `event` once after `delay`.
    pub fn arm_once<E>(&mut self, delay: Duration, tx: UnboundedSender<E>, event: E)
    where
        E: Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        }));
    }

    /// Posts `make()` every `period`, first one `period` from now.
    pub fn arm_repeating<E, F>(&mut self, period: Duration, tx: UnboundedSender<E>, make: F)
    where
        E: Send + 'static,
        F: Fn() -> E + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            // A period too long to schedule never ticks
            let Some(first) = Instant::now().checked_add(period) else {
                std::future::pending::<()>().await;
                return;
            };
            let mut ticks = tokio::time::interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(make()).is_err() {
                    break;
                }
            }
        }));
    }

    /// Safe to call when nothing is armed.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
