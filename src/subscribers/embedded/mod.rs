//! # Built-in subscribers
//!
//! - [`LogWriter`]: forwards events to `tracing` in a human-readable form.

mod log;

pub use log::LogWriter;
