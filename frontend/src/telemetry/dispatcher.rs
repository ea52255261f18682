//! Batching front for the analytics trackers.
//!
//! UI code calls [`Dispatcher::record`] and forgets about it. Events sit in a
//! FIFO queue until the debounce deadline passes, then go to the primary
//! tracker in order. Anything the primary tracker can't take is logged,
//! offered to the secondary tracker, and written to the fallback store. One
//! retry pass over the fallback store runs a fixed delay after page load.
//!
//! Delivery is best-effort and at-most-once per attempt. An event that made
//! it to the vendor but was reported as failed will be sent again on retry.

use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::error::TrackError;
use crate::telemetry::clock::Clock;
use crate::telemetry::event::{FallbackEntry, Properties, PropertyValue, TrackedEvent};
use crate::telemetry::storage::EventStore;
use crate::telemetry::tracker::Tracker;

const FALLBACK_CATEGORY: &str = "gtag_fallback";

#[derive(Clone, Debug, PartialEq)]
pub struct DispatcherConfig {
    pub flush_debounce_ms: f64,
    pub retry_delay_ms: f64,
    pub max_retry_attempts: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            flush_debounce_ms: 200.0,
            retry_delay_ms: 10_000.0,
            max_retry_attempts: 3,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlushReport {
    pub delivered: usize,
    pub diverted: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub requeued: usize,
    pub dropped: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollReport {
    pub flush: Option<FlushReport>,
    pub retry: Option<RetryReport>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DispatcherStatus {
    pub queued: usize,
    pub pending_fallback: usize,
    pub primary: &'static str,
    pub primary_available: bool,
    pub secondary_available: bool,
}

pub struct Dispatcher {
    primary: Box<dyn Tracker>,
    secondary: Option<Box<dyn Tracker>>,
    store: Box<dyn EventStore>,
    clock: Rc<dyn Clock>,
    config: DispatcherConfig,
    queue: VecDeque<TrackedEvent>,
    flush_at: Option<f64>,
    retry_at: Option<f64>,
}

impl Dispatcher {
    /// The retry pass is scheduled relative to construction time, which is
    /// page load for the app's single dispatcher.
    pub fn new(
        primary: Box<dyn Tracker>,
        store: Box<dyn EventStore>,
        clock: Rc<dyn Clock>,
        config: DispatcherConfig,
    ) -> Self {
        let retry_at = Some(clock.now_ms() + config.retry_delay_ms);
        Self {
            primary,
            secondary: None,
            store,
            clock,
            config,
            queue: VecDeque::new(),
            flush_at: None,
            retry_at,
        }
    }

    pub fn with_secondary(mut self, secondary: Box<dyn Tracker>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn record(&mut self, name: &str, properties: Properties) {
        debug!("queued event {name}");
        self.queue.push_back(TrackedEvent {
            name: name.to_string(),
            properties,
        });
        if self.flush_at.is_none() {
            self.flush_at = Some(self.clock.now_ms() + self.config.flush_debounce_ms);
        }
    }

    pub fn record_event(&mut self, event: TrackedEvent) {
        self.record(&event.name, event.properties);
    }

    /// Earliest time at which [`Dispatcher::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<f64> {
        match (self.flush_at, self.retry_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn poll(&mut self) -> PollReport {
        let now = self.clock.now_ms();
        let mut report = PollReport::default();
        if self.flush_at.is_some_and(|at| at <= now) {
            report.flush = Some(self.flush());
        }
        if self.retry_at.is_some_and(|at| at <= now) {
            self.retry_at = None;
            report.retry = Some(self.retry_pending());
        }
        report
    }

    /// Drain the queue now, regardless of the debounce deadline.
    pub fn flush(&mut self) -> FlushReport {
        self.flush_at = None;
        let mut report = FlushReport::default();
        while let Some(event) = self.queue.pop_front() {
            match self.primary.track(&event.name, &event.properties) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    self.divert(&event, &e);
                    report.diverted += 1;
                }
            }
        }
        if report.delivered + report.diverted > 0 {
            debug!(
                "flushed {} events ({} diverted)",
                report.delivered + report.diverted,
                report.diverted
            );
        }
        report
    }

    fn divert(&self, event: &TrackedEvent, error: &TrackError) {
        warn!(
            "{} could not take event {}: {error}",
            self.primary.describe(),
            event.name
        );

        if let Some(secondary) = &self.secondary {
            let mut properties = Properties::new();
            match serde_json::to_string(&event.properties) {
                Ok(json) => {
                    properties.insert("custom_parameter".to_string(), PropertyValue::Str(json));
                }
                Err(e) => debug!("dropping properties of {}: {e}", event.name),
            }
            properties.insert(
                "event_category".to_string(),
                PropertyValue::from(FALLBACK_CATEGORY),
            );
            match secondary.track(&event.name, &properties) {
                Ok(()) => debug!("event {} sent via {}", event.name, secondary.describe()),
                Err(e) => debug!("{} also failed for {}: {e}", secondary.describe(), event.name),
            }
        }

        let entry = FallbackEntry::from_event(event, self.clock.now_ms());
        if let Err(e) = self.store.append(entry) {
            warn!("could not persist fallback event {}: {e}", event.name);
        }
    }

    /// Re-send everything in the fallback store once.
    ///
    /// Skipped (entries kept) while the primary tracker is unavailable.
    /// Entries that fail again go back with `attempts + 1` until they hit
    /// `max_retry_attempts`.
    pub fn retry_pending(&mut self) -> RetryReport {
        let mut report = RetryReport::default();
        let entries = match self.store.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("discarding unreadable fallback events: {e}");
                if let Err(e) = self.store.clear() {
                    warn!("could not clear fallback events: {e}");
                }
                return report;
            }
        };
        if entries.is_empty() {
            return report;
        }
        if !self.primary.is_available() {
            info!(
                "{} unavailable, keeping {} fallback events",
                self.primary.describe(),
                entries.len()
            );
            return report;
        }

        info!("retrying {} fallback events", entries.len());
        let mut requeue = Vec::new();
        for mut entry in entries {
            report.attempted += 1;
            match self.primary.track(&entry.event, &entry.data) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("retry of {} failed: {e}", entry.event);
                    entry.attempts += 1;
                    if entry.attempts < self.config.max_retry_attempts {
                        requeue.push(entry);
                    } else {
                        report.dropped += 1;
                    }
                }
            }
        }
        report.requeued = requeue.len();

        let result = if requeue.is_empty() {
            self.store.clear()
        } else {
            self.store.save(&requeue)
        };
        if let Err(e) = result {
            warn!("could not update fallback events after retry: {e}");
        }
        report
    }

    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            queued: self.queue.len(),
            pending_fallback: self.store.load().map(|e| e.len()).unwrap_or(0),
            primary: self.primary.describe(),
            primary_available: self.primary.is_available(),
            secondary_available: self
                .secondary
                .as_ref()
                .is_some_and(|s| s.is_available()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::clock::ManualClock;
    use crate::telemetry::storage::MemoryStore;
    use crate::telemetry::tracker::testing::{FailingTracker, RecordingTracker};

    fn dispatcher_with(
        primary: Box<dyn Tracker>,
        store: &MemoryStore,
        clock: &ManualClock,
    ) -> Dispatcher {
        Dispatcher::new(
            primary,
            Box::new(store.clone()),
            Rc::new(clock.clone()),
            DispatcherConfig::default(),
        )
    }

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_events_wait_for_debounce_then_flush_in_order() {
        let clock = ManualClock::starting_at(1_000.0);
        let store = MemoryStore::default();
        let tracker = RecordingTracker::default();
        let mut dispatcher = dispatcher_with(Box::new(tracker.clone()), &store, &clock);

        dispatcher.record("visualizo_pagina_inicial", props(&[("device_type", "mobile")]));
        clock.advance(50.0);
        dispatcher.record("inicio_quiz", Properties::new());

        assert_eq!(dispatcher.poll(), PollReport::default());
        assert!(tracker.events().is_empty());

        clock.advance(150.0);
        let report = dispatcher.poll();
        assert_eq!(
            report.flush,
            Some(FlushReport {
                delivered: 2,
                diverted: 0
            })
        );
        let names: Vec<String> = tracker.events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["visualizo_pagina_inicial", "inicio_quiz"]);
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn test_missing_tracker_writes_one_fallback_entry_per_flush() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::default();
        let mut dispatcher =
            dispatcher_with(Box::new(FailingTracker::missing()), &store, &clock);

        dispatcher.record("inicio_quiz", props(&[("device_type", "desktop")]));
        clock.advance(200.0);
        dispatcher.poll();
        clock.advance(200.0);
        dispatcher.poll();

        let entries = store.load().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "inicio_quiz");
        assert_eq!(entries[0].data, props(&[("device_type", "desktop")]));
        assert_eq!(entries[0].timestamp, "1970-01-01T00:00:00.200Z");
    }

    #[test]
    fn test_throwing_tracker_never_reaches_caller() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::default();
        let failing = FailingTracker::throwing();
        let mut dispatcher = dispatcher_with(Box::new(failing.clone()), &store, &clock);

        for name in ["a", "b", "c"] {
            dispatcher.record(name, Properties::new());
        }
        let report = dispatcher.flush();

        assert_eq!(report.diverted, 3);
        assert_eq!(failing.calls.get(), 3);
        let names: Vec<String> = store.load().unwrap().into_iter().map(|e| e.event).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diverted_events_go_to_secondary_with_json_payload() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::default();
        let secondary = RecordingTracker::default();
        let mut dispatcher =
            dispatcher_with(Box::new(FailingTracker::throwing()), &store, &clock)
                .with_secondary(Box::new(secondary.clone()));

        dispatcher.record("clicou_comprar", props(&[("posicao", "principal")]));
        dispatcher.flush();

        let sent = secondary.events();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].properties.get("custom_parameter"),
            Some(&PropertyValue::from(r#"{"posicao":"principal"}"#))
        );
        assert_eq!(
            sent[0].properties.get("event_category"),
            Some(&PropertyValue::from("gtag_fallback"))
        );
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_retry_pass_resends_and_clears_after_delay() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::with_raw(
            r#"[{"event":"inicio_quiz","data":{},"timestamp":"2025-06-01T10:00:00.000Z"}]"#,
        );
        let tracker = RecordingTracker::default();
        let mut dispatcher = dispatcher_with(Box::new(tracker.clone()), &store, &clock);

        clock.advance(9_999.0);
        assert_eq!(dispatcher.poll().retry, None);

        clock.advance(1.0);
        let report = dispatcher.poll().retry.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(tracker.events()[0].name, "inicio_quiz");
        assert_eq!(store.raw(), None);

        // runs once per page load
        clock.advance(20_000.0);
        assert_eq!(dispatcher.poll().retry, None);
        assert_eq!(dispatcher.next_deadline(), None);
    }

    #[test]
    fn test_retry_requeues_until_attempts_exhausted() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::with_raw(
            r#"[{"event":"a","data":{},"timestamp":"t","attempts":0},
                {"event":"b","data":{},"timestamp":"t","attempts":2}]"#,
        );
        let mut dispatcher =
            dispatcher_with(Box::new(FailingTracker::throwing()), &store, &clock);

        let report = dispatcher.retry_pending();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.requeued, 1);
        assert_eq!(report.dropped, 1);

        let left = store.load().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].event, "a");
        assert_eq!(left[0].attempts, 1);
    }

    #[test]
    fn test_retry_keeps_entries_while_tracker_missing() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::with_raw(r#"[{"event":"a","data":{},"timestamp":"t"}]"#);
        let mut dispatcher =
            dispatcher_with(Box::new(FailingTracker::missing()), &store, &clock);

        assert_eq!(dispatcher.retry_pending(), RetryReport::default());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_retry_sends_valid_entries_next_to_null_properties() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::with_raw(
            r#"[{"event":"a","data":{"k":"v"},"timestamp":"t"},{"event":"b","data":{"x":null},"timestamp":"t"},{"timestamp":"t"}]"#,
        );
        let tracker = RecordingTracker::default();
        let mut dispatcher = dispatcher_with(Box::new(tracker.clone()), &store, &clock);

        let report = dispatcher.retry_pending();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 2);
        let names: Vec<String> = tracker.events().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn test_unreadable_store_is_cleared() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::with_raw("not json");
        let mut dispatcher =
            dispatcher_with(Box::new(RecordingTracker::default()), &store, &clock);

        assert_eq!(dispatcher.retry_pending(), RetryReport::default());
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn test_status_reports_queue_and_pending() {
        let clock = ManualClock::starting_at(0.0);
        let store = MemoryStore::with_raw(r#"[{"event":"a","data":{},"timestamp":"t"}]"#);
        let mut dispatcher =
            dispatcher_with(Box::new(FailingTracker::missing()), &store, &clock);
        dispatcher.record("b", Properties::new());

        let status = dispatcher.status();
        assert_eq!(status.queued, 1);
        assert_eq!(status.pending_fallback, 1);
        assert!(!status.primary_available);
        assert!(!status.secondary_available);
        assert_eq!(dispatcher.next_deadline(), Some(200.0));
    }
}
