/// Source of "now" in milliseconds since the epoch.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by `Date.now()`.
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        web_sys::js_sys::Date::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::Clock;

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Clone, Default)]
    pub struct ManualClock {
        now: Rc<Cell<f64>>,
    }

    impl ManualClock {
        pub fn starting_at(now_ms: f64) -> Self {
            Self {
                now: Rc::new(Cell::new(now_ms)),
            }
        }

        pub fn advance(&self, ms: f64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.now.get()
        }
    }
}
