//! Session statistics
//!
//! Folds finished games into per-player and per-team totals. Nothing here
//! mutates a session.

mod aggregator;
mod game_facts;

pub use aggregator::{
    GameOutcome, PlayerGameLine, PlayerStats, SessionStats, SessionSummary, StatisticsAggregator,
    TeamStats, POINTS_DRAW, POINTS_WIN,
};
pub use game_facts::GameFacts;
