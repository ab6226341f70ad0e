//! # fives_core - Match Session Engine
//!
//! Runs informal multi-team football sessions and keeps the club's records.
//!
//! ## Features
//! - Live match state machine with a wall-clock derived game clock
//! - Winner-stays rotation for 2, 3 and 4 teams
//! - Post-session statistics, badges, ratings and club news
//! - Local-first storage contract and a compact snapshot codec
//! - JSON API for host applications

// Builder-style struct initialisation is used throughout tests and presets
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::large_enum_variant)]

pub mod api;
pub mod badges;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod news;
pub mod rating;
pub mod session;
pub mod stats;
pub mod store;

pub use api::{finish_game_json, process_session_json, rotation_preview_json, session_summary_json};
pub use badges::{BadgeEngine, BadgeKind};
pub use config::EngineConfig;
pub use engine::{
    Clock, FinishOutcome, GameClock, GoalEntry, GoalLedger, ManualClock, MatchStateMachine,
    RotationDecision, RotationEngine, SystemClock, Transition,
};
pub use error::{CoreError, Result};
pub use models::{Game, Goal, NewsItem, Player, Session, SessionConfig, Team};
pub use news::NewsGenerator;
pub use rating::{RatingBreakdown, RatingEngine, Tier};
pub use session::{SessionOutcome, SessionProcessor};
pub use stats::{PlayerStats, SessionStats, StatisticsAggregator, TeamStats};
pub use store::{ClubRepository, ClubSnapshot, LocalFirstRepository, MemoryRepository, SaveReport, StoreError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
