//! In-memory fan-out bus for tests/dev.

use std::sync::{Mutex, mpsc};
use std::time::Duration;

use crate::notification::StockChanged;
use crate::sink::NotificationSink;

/// One consumer's view of the stock-change stream.
///
/// Every subscriber sees every change published after it subscribed; earlier
/// changes are gone. Meant to be drained by a single consumer thread.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<StockChanged>,
}

impl Subscription {
    /// Block until the next notification is available.
    pub fn recv(&self) -> Result<StockChanged, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a notification without blocking.
    pub fn try_recv(&self) -> Result<StockChanged, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a notification.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<StockChanged, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

#[derive(Debug)]
pub enum InMemoryBusError {
    /// A panicked publisher poisoned the subscriber list.
    Poisoned,
}

/// Channel-backed [`NotificationSink`] that fans each stock change out to
/// every live subscriber.
///
/// Purely synchronous and process-local; the delivery contract is the weak
/// one the ledger needs (best effort, consumers tolerate duplicates), which
/// keeps it honest as a stand-in for an external queue in tests and dev.
#[derive(Debug, Default)]
pub struct InMemoryNotificationBus {
    subscribers: Mutex<Vec<mpsc::Sender<StockChanged>>>,
}

impl InMemoryNotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // A poisoned subscriber list still yields a (deaf) subscription
        // rather than a panic in the consumer.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription { receiver: rx }
    }
}

impl NotificationSink for InMemoryNotificationBus {
    type Error = InMemoryBusError;

    fn publish(&self, notification: StockChanged) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryBusError::Poisoned)?;

        // Hung-up receivers are pruned on the way through.
        subs.retain(|tx| tx.send(notification).is_ok());

        Ok(())
    }
}
