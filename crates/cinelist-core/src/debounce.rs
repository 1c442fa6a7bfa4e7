//! Restartable single-shot timer.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Delivers a message after a quiet period, unless rescheduled or cancelled.
///
/// Only one timer is pending at a time; scheduling aborts the previous one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    ticket: u64,
    handle: JoinHandle<()>,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Sends `message` on `tx` once the delay elapses.
    pub fn schedule<M: Send + 'static>(&mut self, ticket: u64, tx: UnboundedSender<M>, message: M) {
        self.cancel();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver is closed once the owner is torn down.
            let _ = tx.send(message);
        });
        self.pending = Some(Pending { ticket, handle });
    }

    /// Aborts the pending timer. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some_and(|pending| {
            pending.handle.abort();
            true
        })
    }

    /// Marks the timer with `ticket` as fired.
    ///
    /// Returns `false` when `ticket` is not the pending timer, i.e. the
    /// message raced with a reschedule or cancel and must be ignored.
    pub fn complete(&mut self, ticket: u64) -> bool {
        self.pending
            .take_if(|pending| pending.ticket == ticket)
            .is_some()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
