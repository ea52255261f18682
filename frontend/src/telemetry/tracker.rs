use crate::error::TrackError;
use crate::telemetry::event::Properties;

/// Something events can be handed to: the GA global, the attribution pixel,
/// or an inert stand-in when neither is loaded.
pub trait Tracker {
    /// Whether a call right now has a chance of reaching the vendor.
    fn is_available(&self) -> bool;

    fn track(&self, name: &str, properties: &Properties) -> Result<(), TrackError>;

    fn describe(&self) -> &'static str {
        "tracker"
    }
}

/// Accepts everything and does nothing.
pub struct NoopTracker;

impl Tracker for NoopTracker {
    fn is_available(&self) -> bool {
        false
    }

    fn track(&self, _name: &str, _properties: &Properties) -> Result<(), TrackError> {
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::telemetry::event::TrackedEvent;

    /// Keeps every event it receives. Clones share the same log.
    #[derive(Clone, Default)]
    pub struct RecordingTracker {
        events: Rc<RefCell<Vec<TrackedEvent>>>,
    }

    impl RecordingTracker {
        pub fn events(&self) -> Vec<TrackedEvent> {
            self.events.borrow().clone()
        }
    }

    impl Tracker for RecordingTracker {
        fn is_available(&self) -> bool {
            true
        }

        fn track(&self, name: &str, properties: &Properties) -> Result<(), TrackError> {
            self.events.borrow_mut().push(TrackedEvent {
                name: name.to_string(),
                properties: properties.clone(),
            });
            Ok(())
        }

        fn describe(&self) -> &'static str {
            "recording"
        }
    }

    /// Fails every call the way a throwing or missing global would.
    #[derive(Clone)]
    pub struct FailingTracker {
        pub error: TrackError,
        pub calls: Rc<Cell<usize>>,
    }

    impl FailingTracker {
        pub fn throwing() -> Self {
            Self {
                error: TrackError::Rejected("TypeError: boom".to_string()),
                calls: Rc::new(Cell::new(0)),
            }
        }

        pub fn missing() -> Self {
            Self {
                error: TrackError::Unavailable("window.utmify is undefined".to_string()),
                calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Tracker for FailingTracker {
        fn is_available(&self) -> bool {
            !matches!(self.error, TrackError::Unavailable(_))
        }

        fn track(&self, _name: &str, _properties: &Properties) -> Result<(), TrackError> {
            self.calls.set(self.calls.get() + 1);
            Err(self.error.clone())
        }

        fn describe(&self) -> &'static str {
            "failing"
        }
    }
}
