use chrono::{NaiveDate, NaiveDateTime};
use std::sync::RwLock;

/// Wall-clock source in the tour operator's local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    time: RwLock<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            time: RwLock::new(time),
        }
    }

    pub fn set(&self, time: NaiveDateTime) {
        let mut guard = self.time.write().unwrap_or_else(|e| e.into_inner());
        *guard = time;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.time.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.time.read().unwrap_or_else(|e| e.into_inner())
    }
}
