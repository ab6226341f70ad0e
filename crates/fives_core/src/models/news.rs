use super::PlayerId;
use crate::badges::BadgeKind;
use crate::rating::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStat {
    Goals,
    Assists,
    Games,
}

impl MilestoneStat {
    pub fn label(&self) -> &'static str {
        match self {
            MilestoneStat::Goals => "goals",
            MilestoneStat::Assists => "assists",
            MilestoneStat::Games => "games",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NewsKind {
    TierPromotion { from: Tier, to: Tier },
    BadgeUnlocked { badge: BadgeKind },
    CareerMilestone { stat: MilestoneStat, value: u32 },
}

impl NewsKind {
    pub fn slug(&self) -> String {
        match self {
            NewsKind::TierPromotion { to, .. } => format!("tier-{}", to.label().to_lowercase()),
            NewsKind::BadgeUnlocked { badge } => format!("badge-{}", badge.slug()),
            NewsKind::CareerMilestone { stat, value } => format!("{}-{}", stat.label(), value),
        }
    }
}

/// Club feed entry; expires 24 hours after `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub player_id: PlayerId,
    pub player_name: String,
    pub kind: NewsKind,
    pub message: String,
    pub priority: u32,
    pub timestamp: DateTime<Utc>,
}
