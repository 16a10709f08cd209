//! System clock implementation.

use chrono::{DateTime, Utc};

use super::ports::ClockPort;

/// Wall-clock time authority.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
