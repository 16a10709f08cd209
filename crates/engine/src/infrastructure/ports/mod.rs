//! Port traits decoupling use cases from infrastructure.

mod error;
mod repos;

pub use error::RepoError;
pub use repos::GameRepo;

#[cfg(test)]
pub use repos::MockGameRepo;

use chrono::{DateTime, Utc};

/// Time authority. Injected so tests can pin the clock.
#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
