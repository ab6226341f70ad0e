//! Player rating
//!
//! - `tier`: named rating bands
//! - `breakdown`: audit record of a single update
//! - `engine`: per-session update and inactivity penalty

mod breakdown;
mod engine;
mod tier;

pub use breakdown::RatingBreakdown;
pub use engine::RatingEngine;
pub use tier::Tier;
