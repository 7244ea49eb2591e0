//! Outbound events for front-ends rendering a pity ledger.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`LedgerEvent`]: envelope for state changes and notifications.

pub mod bus;

pub use bus::{EventBus, LedgerEvent, LedgerEventKind};
