//! Multi-day signal confirmation.
//!
//! A classifier verdict only becomes actionable once the same action has been
//! logged on enough consecutive trading days. The tracker owns the signal book
//! for the lifetime of the process: it is loaded once from the store at
//! construction and written back after every mutating call.
//!
//! Time is always passed in. Evaluations before the market close are test
//! runs: they are answered but never logged and never execute, unless the
//! caller forces persistence.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::settings::ConfirmationSettings;
use crate::signal_log::{SignalBook, SignalLog, SignalLogEntry};
use crate::store::SignalStore;
use trendsignal_core::{Confidence, InstrumentClass, SecurityId, SignalAction};

/// What happened to the durable copy during one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Persistence {
    /// Nothing changed that needed saving.
    Skipped,
    Saved,
    /// The save failed; the in-memory book is still up to date.
    Failed(String),
}

/// Answer to one `record` call. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecommendation {
    pub should_execute: bool,
    pub consecutive_days: u32,
    pub required_days: u32,
    pub will_persist: bool,
    pub reason: String,
    pub persistence: Persistence,
}

/// One row of the execution summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub security_id: SecurityId,
    pub action: SignalAction,
    pub consecutive_days: u32,
    pub required_days: u32,
    pub should_execute: bool,
    pub latest_date: NaiveDate,
}

/// Trading day a signal evaluated at `now` is attributed to.
///
/// Saturday and Sunday map back to Friday.
pub fn trading_day(now: NaiveDateTime) -> NaiveDate {
    let date = now.date();
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

pub fn is_weekend(now: NaiveDateTime) -> bool {
    matches!(now.date().weekday(), Weekday::Sat | Weekday::Sun)
}

/// Consecutive days an action must be logged before it executes.
///
/// STRONG_SELL acts after one day; otherwise warrants need two, stocks three.
pub fn required_days(action: SignalAction, instrument: InstrumentClass) -> u32 {
    match (action, instrument) {
        (SignalAction::StrongSell, _) => 1,
        (_, InstrumentClass::Warrant) => 2,
        (_, InstrumentClass::Stock) => 3,
    }
}

/// Why a call did not persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    BeforeClose,
    WeekendDuplicate,
    AlreadyRecorded(NaiveDate),
    /// The trading day precedes the newest logged entry.
    Stale { day: NaiveDate, latest: NaiveDate },
}

pub struct ConfirmationTracker<S: SignalStore> {
    store: S,
    book: SignalBook,
    market_close: NaiveTime,
    retention_days: usize,
}

impl<S: SignalStore> ConfirmationTracker<S> {
    /// Load the book from `store`.
    ///
    /// An unreadable or corrupt store is treated as "no history yet".
    pub fn new(store: S, settings: &ConfirmationSettings) -> Self {
        let book = match store.load() {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(error = %e, "could not load signal history, starting empty");
                SignalBook::new()
            }
        };
        tracing::debug!(securities = book.len(), "signal history loaded");
        Self {
            store,
            book,
            market_close: settings.market_close,
            retention_days: settings.retention_days.max(1),
        }
    }

    pub fn is_after_market_close(&self, now: NaiveDateTime) -> bool {
        now.time() >= self.market_close
    }

    pub fn book(&self) -> &SignalBook {
        &self.book
    }

    pub fn log(&self, security_id: &str) -> Option<&SignalLog> {
        self.book.get(security_id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consecutive logged entries for `security_id` equal to `action`.
    pub fn consecutive_count(&self, security_id: &str, action: SignalAction) -> u32 {
        self.log(security_id)
            .map_or(0, |log| log.consecutive_count(action))
    }

    /// Feed one classification into the log and decide whether to execute.
    pub fn record(
        &mut self,
        security_id: &str,
        action: SignalAction,
        confidence: Confidence,
        instrument: InstrumentClass,
        force_persist: bool,
        now: NaiveDateTime,
    ) -> ExecutionRecommendation {
        let day = trading_day(now);
        let eligible = force_persist || self.is_after_market_close(now);
        let retention = self.retention_days;

        let log = self.book.entry(security_id.to_string()).or_default();
        let reclassified = log.instrument_type != instrument;
        log.instrument_type = instrument;

        let latest = log.latest().map(|e| e.date);
        let skip = if !eligible {
            Some(Skip::BeforeClose)
        } else if log.has_entry_for(day) {
            Some(if is_weekend(now) {
                Skip::WeekendDuplicate
            } else {
                Skip::AlreadyRecorded(day)
            })
        } else {
            match latest {
                Some(latest) if latest > day => Some(Skip::Stale { day, latest }),
                _ => None,
            }
        };
        let will_persist = skip.is_none();

        if will_persist {
            log.push(
                SignalLogEntry {
                    date: day,
                    action,
                    confidence,
                },
                retention,
            );
            tracing::info!(security_id, %action, date = %day, "signal logged");
        }

        let consecutive_days = log.consecutive_count(action);
        let required = required_days(action, instrument);
        let should_execute =
            consecutive_days >= required && action.is_actionable() && will_persist;

        let persistence = if will_persist || (eligible && reclassified) {
            self.save()
        } else {
            Persistence::Skipped
        };

        let reason = build_reason(skip, action, consecutive_days, required, should_execute);
        tracing::debug!(
            security_id,
            %action,
            consecutive_days,
            required,
            will_persist,
            should_execute,
            "confirmation evaluated"
        );

        ExecutionRecommendation {
            should_execute,
            consecutive_days,
            required_days: required,
            will_persist,
            reason,
            persistence,
        }
    }

    /// Every security whose latest entry is actionable, with its current
    /// confirmation state. Read-only.
    pub fn summary(&self) -> Vec<ExecutionStatus> {
        self.book
            .iter()
            .filter_map(|(id, log)| {
                let latest = log.latest()?;
                if !latest.action.is_actionable() {
                    return None;
                }
                let consecutive_days = log.consecutive_count(latest.action);
                let required = required_days(latest.action, log.instrument_type);
                Some(ExecutionStatus {
                    security_id: id.clone(),
                    action: latest.action,
                    consecutive_days,
                    required_days: required,
                    should_execute: consecutive_days >= required,
                    latest_date: latest.date,
                })
            })
            .collect()
    }

    /// Trim every log to its newest `days_to_keep` entries and save.
    ///
    /// `None` uses the configured retention.
    pub fn cleanup_old_signals(&mut self, days_to_keep: Option<usize>) -> Persistence {
        let keep = days_to_keep.unwrap_or(self.retention_days);
        let dropped: usize = self
            .book
            .values_mut()
            .map(|log| log.truncate_to(keep))
            .sum();
        tracing::info!(keep, dropped, "signal history cleaned up");
        self.save()
    }

    fn save(&mut self) -> Persistence {
        match self.store.save(&self.book) {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                tracing::warn!(error = %e, "failed to save signal history");
                Persistence::Failed(e.to_string())
            }
        }
    }
}

fn build_reason(
    skip: Option<Skip>,
    action: SignalAction,
    consecutive: u32,
    required: u32,
    should_execute: bool,
) -> String {
    match skip {
        Some(Skip::WeekendDuplicate) => {
            "Weekend run - signal already exists for last trading day (Friday). Not persisted."
                .to_string()
        }
        Some(Skip::AlreadyRecorded(day)) => format!(
            "Signal already recorded for trading day {day}. Not persisted (would need {required} consecutive days)."
        ),
        Some(Skip::Stale { day, latest }) => format!(
            "Trading day {day} is older than the latest logged signal ({latest}). Not persisted."
        ),
        Some(Skip::BeforeClose) => format!(
            "Test run (before market close) - signal not persisted. Would need {required} consecutive days."
        ),
        None if !action.is_actionable() => "No action signal - continue holding.".to_string(),
        None if should_execute => {
            format!("EXECUTE: {consecutive} consecutive {action} signals (required: {required})")
        }
        None => {
            let remaining = required.saturating_sub(consecutive);
            let plural = if remaining == 1 { "" } else { "s" };
            format!(
                "WAIT: {consecutive}/{required} consecutive {action} signals ({remaining} more day{plural} needed)"
            )
        }
    }
}
