use crate::badges::BadgeKind;
use crate::rating::Tier;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub type PlayerId = String;

/// Role tags that change how a player's contributions are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Goalkeeper,
    Defender,
    Playmaker,
    Attacker,
    Workhorse,
}

impl Skill {
    pub fn is_defensive(&self) -> bool {
        matches!(self, Skill::Goalkeeper | Skill::Defender)
    }
}

/// Short-term form derived from the last rating delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    Hot,
    #[default]
    Stable,
    Cold,
}

impl Form {
    pub fn from_delta(delta: f64, threshold: f64) -> Self {
        if delta >= threshold {
            Form::Hot
        } else if delta <= -threshold {
            Form::Cold
        } else {
            Form::Stable
        }
    }
}

/// Lifetime counters for a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerStats {
    pub goals: u32,
    pub assists: u32,
    pub own_goals: u32,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub clean_sheets: u32,
    pub sessions: u32,
}

/// Counters for the calendar month of the last played session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    /// `(year, month)` these counters belong to
    pub period: Option<(i32, u32)>,
    pub goals: u32,
    pub assists: u32,
    pub games: u32,
    pub wins: u32,
    pub sessions: u32,
}

impl MonthlyStats {
    pub fn period_of(at: DateTime<Utc>) -> (i32, u32) {
        (at.year(), at.month())
    }
}

/// One entry of the short per-session history shown on a player card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHistoryEntry {
    pub session_id: String,
    pub played_at: DateTime<Utc>,
    pub rating_before: u8,
    pub rating_after: u8,
    pub delta: f64,
    pub games: u32,
    pub goals: u32,
    pub assists: u32,
    pub wins: u32,
    #[serde(default)]
    pub badges: Vec<BadgeKind>,
    /// True for inactivity penalty entries
    #[serde(default)]
    pub penalty: bool,
}

/// Rating point for the long-range chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub at: DateTime<Utc>,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub value: f64,
    pub session_id: String,
    pub achieved_at: DateTime<Utc>,
}

/// Best single-session performances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecords {
    pub most_goals: Option<RecordEntry>,
    pub most_assists: Option<RecordEntry>,
    pub best_win_rate: Option<RecordEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub rating: u8,
    /// Hard floor: the rating never drops below this value
    pub initial_rating: u8,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub badges: BTreeMap<BadgeKind, u32>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub form: Form,
    #[serde(default)]
    pub career: CareerStats,
    #[serde(default)]
    pub monthly: MonthlyStats,
    #[serde(default)]
    pub session_history: VecDeque<SessionHistoryEntry>,
    #[serde(default)]
    pub history_data: VecDeque<HistoryPoint>,
    #[serde(default)]
    pub records: PlayerRecords,
    #[serde(default)]
    pub consecutive_missed_sessions: u32,
    #[serde(default)]
    pub is_immune_to_penalty: bool,
    #[serde(default)]
    pub last_played_at: Option<DateTime<Utc>>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rating: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating,
            initial_rating: rating,
            tier: Tier::from_rating(rating),
            badges: BTreeMap::new(),
            skills: Vec::new(),
            form: Form::Stable,
            career: CareerStats::default(),
            monthly: MonthlyStats::default(),
            session_history: VecDeque::new(),
            history_data: VecDeque::new(),
            records: PlayerRecords::default(),
            consecutive_missed_sessions: 0,
            is_immune_to_penalty: false,
            last_played_at: None,
        }
    }

    pub fn with_skills(mut self, skills: &[Skill]) -> Self {
        self.skills = skills.to_vec();
        self
    }

    pub fn has_skill(&self, skill: Skill) -> bool {
        self.skills.contains(&skill)
    }

    pub fn is_defensive(&self) -> bool {
        self.skills.iter().any(Skill::is_defensive)
    }

    pub fn badge_count(&self, kind: BadgeKind) -> u32 {
        self.badges.get(&kind).copied().unwrap_or(0)
    }

    /// Sets the rating respecting the floor and recomputes the tier.
    pub fn set_rating(&mut self, rating: u8) {
        self.rating = rating.max(self.initial_rating);
        self.tier = Tier::from_rating(self.rating);
    }
}
