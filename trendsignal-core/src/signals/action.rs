//! Signal action and confidence tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical recommendation produced by the classifier.
///
/// Serialized as `BUY`, `SELL`, `STRONG_SELL`, `HOLD` in the persisted log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalAction {
    Buy,
    Sell,
    StrongSell,
    Hold,
}

impl SignalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
            SignalAction::StrongSell => "STRONG_SELL",
            SignalAction::Hold => "HOLD",
        }
    }

    /// True for every action except `Hold`.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, SignalAction::Hold)
    }

    /// True for `Sell` and `StrongSell`.
    pub fn is_sell(&self) -> bool {
        matches!(self, SignalAction::Sell | SignalAction::StrongSell)
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Confidence tier attached to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
