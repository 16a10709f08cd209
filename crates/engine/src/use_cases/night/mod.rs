//! Night-phase use cases.

mod resolve_night;
mod submit_action;

pub use resolve_night::{NightResolution, ResolveNight};
pub use submit_action::{ActionSubmitted, SubmitAction};
