//! trendsignal core: domain types, indicators, configuration tables and the
//! trend signal classifier.
//!
//! - Domain types (bars, instrument class, timeframe)
//! - Wilder ATR / ADX, EMA and supertrend indicators
//! - Per-(timeframe, instrument class) indicator bundles
//! - `classify`: bar history in, one `TrendSignal` out

pub mod classifier;
pub mod config;
pub mod domain;
pub mod indicators;
pub mod signals;

pub use classifier::{classify, ClassifyError};
pub use config::{ConfigError, IndicatorConfig};
pub use domain::{Bar, BarError, InstrumentClass, SecurityId, Timeframe};
pub use signals::{Confidence, SignalAction, SignalMetrics, TrendDirection, TrendSignal};
