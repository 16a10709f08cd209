//! Infrastructure: storage adapters, locks, clock, ports.

pub mod clock;
pub mod locks;
pub mod memory;
pub mod ports;

pub use locks::GameLocks;
pub use memory::InMemoryGames;
