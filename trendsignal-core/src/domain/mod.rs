//! Domain types for trendsignal

pub mod bar;
pub mod instrument;

pub use bar::{validate_series, Bar, BarError};
pub use instrument::{InstrumentClass, InstrumentError, Timeframe};

/// Security identifier (WKN, ticker, ...)
pub type SecurityId = String;
