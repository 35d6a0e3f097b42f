//! trendsignal runner: multi-day confirmation of classifier signals.
//!
//! This crate builds on `trendsignal-core` to provide:
//! - Per-security signal log with trading-day attribution and retention
//! - Confirmation tracker (`record`, `summary`, `cleanup_old_signals`)
//! - Atomic JSON file store behind the `SignalStore` seam
//! - TOML confirmation settings
//! - CSV bar loading

pub mod bars_csv;
pub mod confirmation;
pub mod settings;
pub mod signal_log;
pub mod store;

pub use bars_csv::{load_bars_csv, read_bars, LoadError};
pub use confirmation::{
    is_weekend, required_days, trading_day, ConfirmationTracker, ExecutionRecommendation,
    ExecutionStatus, Persistence,
};
pub use settings::{ConfirmationSettings, SettingsError};
pub use signal_log::{SignalBook, SignalLog, SignalLogEntry};
pub use store::{JsonFileStore, MemoryStore, SignalStore, StoreError};
