//! Game clock derived from stored timestamps.
//!
//! Elapsed time is always recomputed as
//! `elapsed_seconds_on_pause + (now - last_resume_time)` while a game is active.
//! Nothing is accumulated per tick, so the clock is correct after the host has
//! been suspended.

use crate::models::{Game, GameStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.now.set(self.now.get() + Duration::seconds(seconds));
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Announcement cue returned to the host; the engine never speaks itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Milestone {
    MinutesLeft(u64),
    SecondsLeft(u64),
    Countdown(u64),
    FinalWhistle,
}

impl Milestone {
    fn from_remaining(seconds: u64) -> Self {
        match seconds {
            0 => Milestone::FinalWhistle,
            1..=5 => Milestone::Countdown(seconds),
            s if s % 60 == 0 => Milestone::MinutesLeft(s / 60),
            s => Milestone::SecondsLeft(s),
        }
    }
}

/// Remaining-seconds values that trigger an announcement, highest first.
pub const MILESTONE_SECONDS: [u64; 9] = [180, 60, 30, 5, 4, 3, 2, 1, 0];

/// Result of observing a live game's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub elapsed_seconds: u64,
    pub remaining_seconds: Option<u64>,
    pub time_up: bool,
    pub milestone: Option<Milestone>,
}

pub struct GameClock;

impl GameClock {
    pub fn elapsed_seconds(game: &Game, now: DateTime<Utc>) -> u64 {
        match (game.status, game.last_resume_time) {
            (GameStatus::Active, Some(resumed)) => {
                let running = (now - resumed).num_seconds().max(0) as u64;
                game.elapsed_seconds_on_pause + running
            }
            (GameStatus::Finished, _) => {
                game.duration_seconds.unwrap_or(game.elapsed_seconds_on_pause)
            }
            _ => game.elapsed_seconds_on_pause,
        }
    }

    pub fn remaining_seconds(game: &Game, now: DateTime<Utc>, duration: u64) -> u64 {
        duration.saturating_sub(Self::elapsed_seconds(game, now))
    }

    /// Reads the clock and claims the next milestone, at most once per value per game.
    ///
    /// When several milestones were skipped (e.g. the host was suspended) they are
    /// all marked announced and only the most recent one is returned.
    pub fn observe(game: &mut Game, now: DateTime<Utc>, duration: Option<u64>) -> ClockReading {
        let elapsed = Self::elapsed_seconds(game, now);
        let Some(duration) = duration else {
            return ClockReading {
                elapsed_seconds: elapsed,
                remaining_seconds: None,
                time_up: false,
                milestone: None,
            };
        };

        let remaining = duration.saturating_sub(elapsed);
        let mut milestone = None;
        if game.status == GameStatus::Active {
            for value in MILESTONE_SECONDS {
                if value >= remaining && value < duration && game.announced_milestones.insert(value)
                {
                    milestone = Some(Milestone::from_remaining(value));
                }
            }
        }

        ClockReading {
            elapsed_seconds: elapsed,
            remaining_seconds: Some(remaining),
            time_up: remaining == 0,
            milestone,
        }
    }
}
