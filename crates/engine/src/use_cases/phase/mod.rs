//! Day-cycle and timer use cases.

mod accuse;
mod advance_phase;
mod proceed;
mod reveal_mayor;
mod testament;
mod tick;

pub use accuse::{AccusationAccepted, Accuse};
pub use advance_phase::{AdvanceOutcome, AdvancePhase, PhaseChange};
pub use proceed::{ProceedRecorded, VoteToProceed};
pub use reveal_mayor::RevealMayor;
pub use testament::{SubmitTestament, TestamentAccepted};
pub use tick::{TickEvent, TickGames};
