use serde::{Deserialize, Serialize};

/// Session thresholds for badge predicates.
///
/// Pattern badges count games matching a per-game pattern and need at least the
/// configured number of occurrences in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeThresholds {
    pub goleador_goals: u32,
    pub assist_king_assists: u32,
    pub mvp_goals: u32,
    pub mvp_assists: u32,
    pub mvp_wins: u32,
    pub hat_trick_goals_in_game: u32,
    pub duplet_goals_in_game: u32,
    pub duplet_games: u32,
    pub maestro_assists_in_game: u32,
    pub maestro_games: u32,
    pub fortress_games: u32,
    pub sniper_games: u32,
    pub first_blood_games: u32,
    pub comeback_games: u32,
    pub perfect_finish_games: u32,
    pub dynasty_streak: u32,
    pub unbeatable_games: u32,
    pub iron_man_games: u32,
    pub unsung_hero_team_wins: u32,
    pub decisive_factor_wins: u32,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        Self {
            goleador_goals: 7,
            assist_king_assists: 6,
            mvp_goals: 5,
            mvp_assists: 5,
            mvp_wins: 5,
            hat_trick_goals_in_game: 3,
            duplet_goals_in_game: 2,
            duplet_games: 2,
            maestro_assists_in_game: 2,
            maestro_games: 2,
            fortress_games: 3,
            sniper_games: 3,
            first_blood_games: 5,
            comeback_games: 3,
            perfect_finish_games: 2,
            dynasty_streak: 9,
            unbeatable_games: 6,
            iron_man_games: 12,
            unsung_hero_team_wins: 3,
            decisive_factor_wins: 3,
        }
    }
}
