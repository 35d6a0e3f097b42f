//! Per-security signal log.
//!
//! Persisted as one JSON object keyed by security id:
//!
//! ```json
//! {
//!   "TEST123": {
//!     "signals": [{"date": "2026-02-24", "action": "BUY", "confidence": "HIGH"}],
//!     "instrument_type": "warrant"
//!   }
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trendsignal_core::{Confidence, InstrumentClass, SecurityId, SignalAction};

/// One persisted classification, attributed to a trading day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalLogEntry {
    pub date: NaiveDate,
    pub action: SignalAction,
    pub confidence: Confidence,
}

/// Rolling window of entries for one security, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalLog {
    #[serde(default)]
    pub signals: Vec<SignalLogEntry>,
    #[serde(default)]
    pub instrument_type: InstrumentClass,
}

/// All tracked securities.
pub type SignalBook = BTreeMap<SecurityId, SignalLog>;

impl SignalLog {
    pub fn new(instrument_type: InstrumentClass) -> Self {
        Self {
            signals: Vec::new(),
            instrument_type,
        }
    }

    pub fn latest(&self) -> Option<&SignalLogEntry> {
        self.signals.last()
    }

    pub fn has_entry_for(&self, day: NaiveDate) -> bool {
        self.signals.iter().any(|s| s.date == day)
    }

    /// Append an entry and drop the oldest ones beyond `retention`.
    pub fn push(&mut self, entry: SignalLogEntry, retention: usize) {
        self.signals.push(entry);
        self.truncate_to(retention);
    }

    /// Keep only the newest `keep` entries. Returns the number dropped.
    pub fn truncate_to(&mut self, keep: usize) -> usize {
        let excess = self.signals.len().saturating_sub(keep);
        self.signals.drain(..excess);
        excess
    }

    /// Entries matching `action`, counted backward from the newest until the
    /// first mismatch.
    pub fn consecutive_count(&self, action: SignalAction) -> u32 {
        self.signals
            .iter()
            .rev()
            .take_while(|s| s.action == action)
            .count() as u32
    }
}
