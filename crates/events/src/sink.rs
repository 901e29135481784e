//! Notification publishing abstraction.

use std::sync::Arc;

use crate::notification::StockChanged;

/// Consumes stock-change notifications.
///
/// The contract is **fire-and-forget**: a failing sink must never fail the
/// mutation that raised the notification. `publish()` may still return an
/// error so implementations can surface delivery problems; the ledger logs
/// and swallows it.
///
/// Implementations must be safe to share across threads; the ledger publishes
/// from whatever task performed the mutation.
pub trait NotificationSink: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, notification: StockChanged) -> Result<(), Self::Error>;
}

impl<S> NotificationSink for &S
where
    S: NotificationSink + ?Sized,
{
    type Error = S::Error;

    fn publish(&self, notification: StockChanged) -> Result<(), Self::Error> {
        (**self).publish(notification)
    }
}

impl<S> NotificationSink for Arc<S>
where
    S: NotificationSink + ?Sized,
{
    type Error = S::Error;

    fn publish(&self, notification: StockChanged) -> Result<(), Self::Error> {
        (**self).publish(notification)
    }
}

/// Sink that logs every stock change via `tracing`.
///
/// Useful as a default consumer in dev deployments; mirrors the behavior of
/// an audit listener that only observes changes.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for TracingSink {
    type Error = core::convert::Infallible;

    fn publish(&self, notification: StockChanged) -> Result<(), Self::Error> {
        tracing::info!(
            product_id = %notification.product_id,
            previous_quantity = notification.previous_quantity,
            new_quantity = notification.new_quantity,
            "stock changed"
        );
        Ok(())
    }
}
