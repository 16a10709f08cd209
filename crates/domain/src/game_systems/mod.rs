//! The rule engines that mutate the [`Game`](crate::entities::Game)
//! aggregate: night resolution, vote counting, win detection.

pub mod night_resolver;
pub mod vote_tally;
pub mod win;

pub use night_resolver::{
    resolve, Investigation, LookoutReport, MuteNotice, ResolutionReport, Verdict, Wills,
};
pub use vote_tally::{tally, TallyOutcome};
pub use win::check_win_condition;
