//! # Event subscribers for the displayboard runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Coordinator listener ── emit(&Event) ──► SubscriberSet
//!                                              │
//!                                    ┌─────────┼─────────┐
//!                                    ▼         ▼         ▼
//!                                LogWriter   Custom     ...
//! ```
//!
//! The subscriber set is the runtime's injected logger: the core publishes events
//! and subscribers decide what to record.

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
