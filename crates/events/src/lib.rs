//! `stockpilot-events` — stock-change notifications.
//!
//! Delivery contract: fire-and-forget, at-least-once acceptable, and never
//! escalated back into the mutation that raised the notification.

pub mod in_memory_bus;
pub mod notification;
pub mod sink;

pub use in_memory_bus::{InMemoryNotificationBus, Subscription};
pub use notification::StockChanged;
pub use sink::{NotificationSink, TracingSink};
