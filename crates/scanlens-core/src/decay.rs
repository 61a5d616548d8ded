use std::time::Duration;

use kanal::AsyncSender;
use scanlens_types::ScanRegion;
use tokio::task::JoinHandle;

struct Pending {
    token: u64,
    region: ScanRegion,
    task: JoinHandle<()>,
}

/// Debounced clear of the displayed scan region.
///
/// Only one region is ever pending. Expiry is delivered as an event on the
/// owner's channel and has to be confirmed with [`DecayTimer::expire`], which
/// ignores tokens from timers that were re-armed or cancelled in between.
pub struct DecayTimer<E> {
    delay: Duration,
    events: AsyncSender<E>,
    on_expire: fn(u64) -> E,
    next_token: u64,
    pending: Option<Pending>,
}

impl<E: Send + 'static> DecayTimer<E> {
    pub fn new(delay: Duration, events: AsyncSender<E>, on_expire: fn(u64) -> E) -> Self {
        Self {
            delay,
            events,
            on_expire,
            next_token: 0,
            pending: None,
        }
    }

    /// Store `region` and restart the delay, replacing any pending region
    pub fn arm(&mut self, region: ScanRegion) -> u64 {
        self.cancel();

        self.next_token += 1;
        let token = self.next_token;
        let event = (self.on_expire)(token);
        let events = self.events.clone();
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(event).await.is_err() {
                tracing::trace!("[DECAY] owner gone, dropping expiry {token}");
            }
        });

        self.pending = Some(Pending {
            token,
            region,
            task,
        });
        token
    }

    /// Drop the pending region without emitting an expiry
    pub fn cancel(&mut self) -> Option<ScanRegion> {
        let pending = self.pending.take()?;
        pending.task.abort();
        Some(pending.region)
    }

    /// Confirm an expiry. Returns the cleared region, or `None` for a stale token.
    pub fn expire(&mut self, token: u64) -> Option<ScanRegion> {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.token == token)
        {
            return self.pending.take().map(|pending| pending.region);
        }

        tracing::debug!("[DECAY] ignoring stale expiry {token}");
        None
    }

    pub fn region(&self) -> Option<&ScanRegion> {
        self.pending.as_ref().map(|pending| &pending.region)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<E> Drop for DecayTimer<E> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}
