//! Achievement badges
//!
//! `types` names every badge; `engine` decides which ones a player earned in
//! one session. Counts accumulate on the player record.

mod engine;
mod types;

pub use engine::{BadgeContext, BadgeEngine, PERFECT_FINISH_SCORE};
pub use types::{BadgeCategory, BadgeKind, CareerCounter};
