//! Live session engine
//!
//! ## Modules
//! - `clock`: wall-clock derived game time and announcement milestones
//! - `goal_ledger`: score bookkeeping
//! - `match_state`: game lifecycle, auto-finish, next round creation
//! - `rotation`: 2/3/4-team rotation rules

pub mod clock;
pub mod goal_ledger;
pub mod match_state;
pub mod rotation;

pub use clock::{Clock, ClockReading, GameClock, ManualClock, Milestone, SystemClock};
pub use goal_ledger::{GoalEntry, GoalLedger};
pub use match_state::{FinishOutcome, GoalOutcome, MatchStateMachine, Transition};
pub use rotation::{RotationDecision, RotationEngine, RoundResult};
