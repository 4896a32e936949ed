use std::cell::Cell;
use std::rc::Rc;

use web_time::{Duration, Instant};

/// Source of "now" for timers and throttling. Runners use `SystemClock`;
/// tests drive a `ManualClock`.
pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock you can drive deterministically. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    t: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new(t: Instant) -> Self {
        Self {
            t: Rc::new(Cell::new(t)),
        }
    }

    pub fn advance(&self, by: Duration) -> Instant {
        let next = self.t.get() + by;
        self.t.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.t.get()
    }
}
