//! Broadcast channel with latest-value replay
//!
//! The pipeline's output channels need two behaviors at once:
//! fan-out to every live subscriber, and immediate delivery of the most
//! recent emission to anyone subscribing late. `tokio::sync::broadcast`
//! gives the first; a latest-value slot bolted alongside gives the
//! second.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Buffered emissions per subscriber before a slow subscriber starts
/// skipping. Skipped values are dropped, not errors.
const RELAY_CAPACITY: usize = 16;

/// Broadcast channel that remembers its most recent emission.
///
/// `emit` never fails, never blocks, and tolerates zero subscribers.
/// New subscribers receive the stored latest value first (if one
/// exists), then live emissions.
#[derive(Debug)]
pub struct Relay<T: Clone> {
    latest: Mutex<Option<T>>,
    tx: broadcast::Sender<T>,
}

impl<T: Clone> Relay<T> {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(RELAY_CAPACITY);
        Self {
            latest: Mutex::new(None),
            tx,
        }
    }

    /// Store `value` as the latest emission and fan it out to all live
    /// subscribers.
    pub fn emit(&self, value: T) {
        let mut latest = self.lock_latest();
        *latest = Some(value.clone());
        // send only fails with zero live subscribers, which is fine
        let _ = self.tx.send(value);
    }

    /// The most recent emission, if any.
    pub fn latest(&self) -> Option<T> {
        self.lock_latest().clone()
    }

    /// Subscribe to this relay.
    ///
    /// The latest slot and the broadcast handoff happen under one lock,
    /// so an emit racing with subscribe is observed exactly once —
    /// either as the replayed value or as a live one.
    pub fn subscribe(&self) -> RelaySubscription<T> {
        let latest = self.lock_latest();
        RelaySubscription {
            replay: latest.clone(),
            rx: self.tx.subscribe(),
        }
    }

    fn lock_latest(&self) -> MutexGuard<'_, Option<T>> {
        // a poisoned lock still holds a coherent Option<T>
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for Relay<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of a `Relay` subscription.
pub struct RelaySubscription<T: Clone> {
    replay: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> RelaySubscription<T> {
    /// Receive the next value: the replayed latest first, then live
    /// emissions. Returns `None` once the relay has been dropped and
    /// all buffered values are consumed.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive without waiting. Returns `None` when nothing is pending.
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.rx.try_recv() {
                Ok(value) => return Some(value),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
