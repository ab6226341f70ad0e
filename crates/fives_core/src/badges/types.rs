use serde::{Deserialize, Serialize};

/// Every achievement a player can earn.
///
/// Session badges are evaluated from one session's games; career badges fire
/// once, the session a lifetime counter crosses the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    // Session totals
    Goleador,
    AssistKing,
    Mvp,

    // Per-game patterns
    HatTrick,
    Duplet,
    Maestro,
    Fortress,
    Sniper,
    FirstBlood,
    ComebackKings,
    PerfectFinish,

    // Streaks and volume
    Dynasty,
    Unbeatable,
    IronMan,

    // Team context
    UnsungHero,
    DecisiveFactor,

    // Career
    CareerGoals50,
    CareerGoals100,
    CareerGoals200,
    CareerAssists50,
    CareerAssists100,
    Veteran25,
    Veteran50,
    Veteran100,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeCategory {
    SessionTotal,
    GamePattern,
    Streak,
    TeamContext,
    Career,
}

/// Career counter a milestone badge watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareerCounter {
    Goals,
    Assists,
    Sessions,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 24] = [
        BadgeKind::Goleador,
        BadgeKind::AssistKing,
        BadgeKind::Mvp,
        BadgeKind::HatTrick,
        BadgeKind::Duplet,
        BadgeKind::Maestro,
        BadgeKind::Fortress,
        BadgeKind::Sniper,
        BadgeKind::FirstBlood,
        BadgeKind::ComebackKings,
        BadgeKind::PerfectFinish,
        BadgeKind::Dynasty,
        BadgeKind::Unbeatable,
        BadgeKind::IronMan,
        BadgeKind::UnsungHero,
        BadgeKind::DecisiveFactor,
        BadgeKind::CareerGoals50,
        BadgeKind::CareerGoals100,
        BadgeKind::CareerGoals200,
        BadgeKind::CareerAssists50,
        BadgeKind::CareerAssists100,
        BadgeKind::Veteran25,
        BadgeKind::Veteran50,
        BadgeKind::Veteran100,
    ];

    pub fn category(&self) -> BadgeCategory {
        match self {
            BadgeKind::Goleador | BadgeKind::AssistKing | BadgeKind::Mvp => BadgeCategory::SessionTotal,

            BadgeKind::HatTrick
            | BadgeKind::Duplet
            | BadgeKind::Maestro
            | BadgeKind::Fortress
            | BadgeKind::Sniper
            | BadgeKind::FirstBlood
            | BadgeKind::ComebackKings
            | BadgeKind::PerfectFinish => BadgeCategory::GamePattern,

            BadgeKind::Dynasty | BadgeKind::Unbeatable | BadgeKind::IronMan => BadgeCategory::Streak,

            BadgeKind::UnsungHero | BadgeKind::DecisiveFactor => BadgeCategory::TeamContext,

            BadgeKind::CareerGoals50
            | BadgeKind::CareerGoals100
            | BadgeKind::CareerGoals200
            | BadgeKind::CareerAssists50
            | BadgeKind::CareerAssists100
            | BadgeKind::Veteran25
            | BadgeKind::Veteran50
            | BadgeKind::Veteran100 => BadgeCategory::Career,
        }
    }

    /// Stable identifier used in news ids and exports.
    pub fn slug(&self) -> &'static str {
        match self {
            BadgeKind::Goleador => "goleador",
            BadgeKind::AssistKing => "assist_king",
            BadgeKind::Mvp => "mvp",
            BadgeKind::HatTrick => "hat_trick",
            BadgeKind::Duplet => "duplet",
            BadgeKind::Maestro => "maestro",
            BadgeKind::Fortress => "fortress",
            BadgeKind::Sniper => "sniper",
            BadgeKind::FirstBlood => "first_blood",
            BadgeKind::ComebackKings => "comeback_kings",
            BadgeKind::PerfectFinish => "perfect_finish",
            BadgeKind::Dynasty => "dynasty",
            BadgeKind::Unbeatable => "unbeatable",
            BadgeKind::IronMan => "iron_man",
            BadgeKind::UnsungHero => "unsung_hero",
            BadgeKind::DecisiveFactor => "decisive_factor",
            BadgeKind::CareerGoals50 => "career_goals_50",
            BadgeKind::CareerGoals100 => "career_goals_100",
            BadgeKind::CareerGoals200 => "career_goals_200",
            BadgeKind::CareerAssists50 => "career_assists_50",
            BadgeKind::CareerAssists100 => "career_assists_100",
            BadgeKind::Veteran25 => "veteran_25",
            BadgeKind::Veteran50 => "veteran_50",
            BadgeKind::Veteran100 => "veteran_100",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BadgeKind::Goleador => "Goleador",
            BadgeKind::AssistKing => "Assist King",
            BadgeKind::Mvp => "MVP",
            BadgeKind::HatTrick => "Hat-trick",
            BadgeKind::Duplet => "Duplet",
            BadgeKind::Maestro => "Maestro",
            BadgeKind::Fortress => "Fortress",
            BadgeKind::Sniper => "Sniper",
            BadgeKind::FirstBlood => "First Blood",
            BadgeKind::ComebackKings => "Comeback Kings",
            BadgeKind::PerfectFinish => "Perfect Finish",
            BadgeKind::Dynasty => "Dynasty",
            BadgeKind::Unbeatable => "Unbeatable",
            BadgeKind::IronMan => "Iron Man",
            BadgeKind::UnsungHero => "Unsung Hero",
            BadgeKind::DecisiveFactor => "Decisive Factor",
            BadgeKind::CareerGoals50 => "50 Career Goals",
            BadgeKind::CareerGoals100 => "100 Career Goals",
            BadgeKind::CareerGoals200 => "200 Career Goals",
            BadgeKind::CareerAssists50 => "50 Career Assists",
            BadgeKind::CareerAssists100 => "100 Career Assists",
            BadgeKind::Veteran25 => "Veteran (25 sessions)",
            BadgeKind::Veteran50 => "Veteran (50 sessions)",
            BadgeKind::Veteran100 => "Veteran (100 sessions)",
        }
    }

    /// Flat bonus added to the average match rating in the session it is earned.
    pub fn rating_bonus(&self) -> f64 {
        match self {
            BadgeKind::Mvp => 0.4,
            BadgeKind::Goleador | BadgeKind::AssistKing | BadgeKind::Dynasty => 0.3,
            BadgeKind::HatTrick
            | BadgeKind::Fortress
            | BadgeKind::Sniper
            | BadgeKind::ComebackKings
            | BadgeKind::Unbeatable
            | BadgeKind::DecisiveFactor => 0.2,
            BadgeKind::Duplet
            | BadgeKind::Maestro
            | BadgeKind::FirstBlood
            | BadgeKind::PerfectFinish
            | BadgeKind::IronMan
            | BadgeKind::UnsungHero => 0.1,
            _ => 0.0,
        }
    }

    /// News priority weight; rarer badges rank higher.
    pub fn rarity(&self) -> u32 {
        match self {
            BadgeKind::Dynasty | BadgeKind::Mvp | BadgeKind::CareerGoals200 | BadgeKind::Veteran100 => 5,
            BadgeKind::Goleador
            | BadgeKind::AssistKing
            | BadgeKind::Unbeatable
            | BadgeKind::CareerGoals100
            | BadgeKind::CareerAssists100
            | BadgeKind::Veteran50 => 4,
            BadgeKind::HatTrick | BadgeKind::ComebackKings | BadgeKind::IronMan | BadgeKind::DecisiveFactor => 3,
            BadgeKind::Fortress
            | BadgeKind::Sniper
            | BadgeKind::FirstBlood
            | BadgeKind::CareerGoals50
            | BadgeKind::CareerAssists50
            | BadgeKind::Veteran25 => 2,
            _ => 1,
        }
    }

    /// `(counter, threshold)` for career milestone badges.
    pub fn career_threshold(&self) -> Option<(CareerCounter, u32)> {
        match self {
            BadgeKind::CareerGoals50 => Some((CareerCounter::Goals, 50)),
            BadgeKind::CareerGoals100 => Some((CareerCounter::Goals, 100)),
            BadgeKind::CareerGoals200 => Some((CareerCounter::Goals, 200)),
            BadgeKind::CareerAssists50 => Some((CareerCounter::Assists, 50)),
            BadgeKind::CareerAssists100 => Some((CareerCounter::Assists, 100)),
            BadgeKind::Veteran25 => Some((CareerCounter::Sessions, 25)),
            BadgeKind::Veteran50 => Some((CareerCounter::Sessions, 50)),
            BadgeKind::Veteran100 => Some((CareerCounter::Sessions, 100)),
            _ => None,
        }
    }
}
