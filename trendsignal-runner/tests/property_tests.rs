//! Property tests for the confirmation tracker.
//!
//! 1. Logs never exceed the retention bound and stay strictly ascending by day,
//!    even when evaluation times move backward
//! 2. The reported count equals the trailing run of the current action
//! 3. Execution requires an official (persisted) call

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use std::collections::BTreeSet;
use trendsignal_core::{Confidence, InstrumentClass, SignalAction};
use trendsignal_runner::{required_days, trading_day, ConfirmationSettings, ConfirmationTracker, MemoryStore};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_action() -> impl Strategy<Value = SignalAction> {
    prop_oneof![
        Just(SignalAction::Buy),
        Just(SignalAction::Sell),
        Just(SignalAction::StrongSell),
        Just(SignalAction::Hold),
    ]
}

fn arb_class() -> impl Strategy<Value = InstrumentClass> {
    prop_oneof![Just(InstrumentClass::Stock), Just(InstrumentClass::Warrant)]
}

/// (hours relative to the previous call, action, forced). Steps may be
/// negative so that back-dated evaluations are generated too.
fn arb_calls() -> impl Strategy<Value = Vec<(i64, SignalAction, bool)>> {
    prop::collection::vec((-72i64..72, arb_action(), any::<bool>()), 1..60)
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 5)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

// ── 1. Retention and uniqueness ──────────────────────────────────────

proptest! {
    #[test]
    fn logs_stay_bounded_and_unique(
        calls in arb_calls(),
        retention in 1usize..10,
        class in arb_class(),
    ) {
        let settings = ConfirmationSettings { retention_days: retention, ..ConfirmationSettings::default() };
        let mut t = ConfirmationTracker::new(MemoryStore::new(), &settings);
        let mut now = start();
        for (step, action, forced) in calls {
            now += Duration::hours(step);
            let latest_before = t.log("P").and_then(|l| l.latest()).map(|e| e.date);
            let rec = t.record("P", action, Confidence::Medium, class, forced, now);

            if latest_before.is_some_and(|d| trading_day(now) < d) {
                prop_assert!(!rec.will_persist);
            }
            let log = t.log("P").unwrap();
            prop_assert!(log.signals.len() <= retention);
            let days: BTreeSet<_> = log.signals.iter().map(|s| s.date).collect();
            prop_assert_eq!(days.len(), log.signals.len());
            prop_assert!(log.signals.windows(2).all(|w| w[0].date < w[1].date));
        }
    }
}

// ── 2-3. Counting and gating ─────────────────────────────────────────

proptest! {
    #[test]
    fn count_matches_trailing_run(calls in arb_calls(), class in arb_class()) {
        let mut t = ConfirmationTracker::new(MemoryStore::new(), &ConfirmationSettings::default());
        let mut now = start();
        for (step, action, forced) in calls {
            now += Duration::hours(step);
            let rec = t.record("P", action, Confidence::High, class, forced, now);

            let log = t.log("P").unwrap();
            let trailing = log.signals.iter().rev().take_while(|s| s.action == action).count() as u32;
            prop_assert_eq!(rec.consecutive_days, trailing);
            prop_assert_eq!(rec.required_days, required_days(action, class));

            if rec.should_execute {
                prop_assert!(rec.will_persist);
                prop_assert!(action != SignalAction::Hold);
                prop_assert!(rec.consecutive_days >= rec.required_days);
            }
            if rec.will_persist {
                prop_assert_eq!(log.latest().map(|e| e.action), Some(action));
            }
        }
    }
}
