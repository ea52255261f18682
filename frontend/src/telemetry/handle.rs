use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::debug;

use crate::telemetry::clock::Clock;
use crate::telemetry::dispatcher::{Dispatcher, DispatcherStatus};
use crate::telemetry::event::TrackedEvent;

/// Shared handle to the page's dispatcher, handed down through a
/// `ContextProvider`. Wakes the dispatcher with a timeout whenever it has a
/// deadline pending.
#[derive(Clone)]
pub struct Telemetry {
    dispatcher: Rc<RefCell<Dispatcher>>,
    clock: Rc<dyn Clock>,
    wakeup_at: Rc<Cell<Option<f64>>>,
}

/// Milliseconds until a wakeup for `deadline`, or `None` when the pending
/// wakeup comes first; it reschedules once it has run.
fn wakeup_delay(pending: Option<f64>, deadline: f64, now: f64) -> Option<u32> {
    if pending.is_some_and(|at| at <= deadline) {
        return None;
    }
    Some((deadline - now).max(0.0).ceil() as u32)
}

impl PartialEq for Telemetry {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.dispatcher, &other.dispatcher)
    }
}

impl Telemetry {
    pub fn new(dispatcher: Dispatcher, clock: Rc<dyn Clock>) -> Self {
        let telemetry = Self {
            dispatcher: Rc::new(RefCell::new(dispatcher)),
            clock,
            wakeup_at: Rc::new(Cell::new(None)),
        };
        telemetry.schedule();
        telemetry
    }

    /// Queue `event`; delivery happens on the next wakeup.
    pub fn track(&self, event: TrackedEvent) {
        self.dispatcher.borrow_mut().record_event(event);
        self.schedule();
    }

    pub fn status(&self) -> DispatcherStatus {
        self.dispatcher.borrow().status()
    }

    fn schedule(&self) {
        let Some(deadline) = self.dispatcher.borrow().next_deadline() else {
            return;
        };
        let Some(delay) = wakeup_delay(self.wakeup_at.get(), deadline, self.clock.now_ms())
        else {
            return;
        };
        self.wakeup_at.set(Some(deadline));

        let this = self.clone();
        Timeout::new(delay, move || {
            if this.wakeup_at.get() == Some(deadline) {
                this.wakeup_at.set(None);
            }
            let report = this.dispatcher.borrow_mut().poll();
            if report.flush.is_some() || report.retry.is_some() {
                debug!("telemetry wakeup: {:?}", report);
            }
            this.schedule();
        })
        .forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_deadline_gets_a_wakeup() {
        assert_eq!(wakeup_delay(None, 1_200.0, 1_000.0), Some(200));
    }

    #[test]
    fn test_later_deadline_waits_for_pending_wakeup() {
        assert_eq!(wakeup_delay(Some(1_200.0), 11_000.0, 1_000.0), None);
        assert_eq!(wakeup_delay(Some(1_200.0), 1_200.0, 1_000.0), None);
    }

    #[test]
    fn test_earlier_deadline_preempts_pending_wakeup() {
        assert_eq!(wakeup_delay(Some(11_000.0), 1_200.0, 1_000.0), Some(200));
    }

    #[test]
    fn test_overdue_deadline_fires_immediately() {
        assert_eq!(wakeup_delay(None, 900.0, 1_000.0), Some(0));
        assert_eq!(wakeup_delay(None, 1_000.4, 1_000.0), Some(1));
    }
}
