use serde::{Deserialize, Serialize};

/// Points a team result contributes to a player's match rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamPointsConfig {
    pub draw: f64,
    pub win: f64,
    /// Win by at least `dominant_margin`
    pub dominant_win: f64,
    /// Win after trailing; overrides dominant
    pub comeback_win: f64,
    pub loss: f64,
    /// Loss by at least `dominant_margin`
    pub heavy_loss: f64,
    pub dominant_margin: u32,
}

impl Default for TeamPointsConfig {
    fn default() -> Self {
        Self {
            draw: 0.4,
            win: 1.0,
            dominant_win: 1.3,
            comeback_win: 1.5,
            loss: -0.5,
            heavy_loss: -0.8,
            dominant_margin: 2,
        }
    }
}

/// Per-event weights for individual contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualPointsConfig {
    pub clean_sheet_defensive: f64,
    pub clean_sheet: f64,
    pub goal_attacker: f64,
    pub goal: f64,
    pub assist_playmaker: f64,
    pub assist: f64,
    pub own_goal: f64,
}

impl Default for IndividualPointsConfig {
    fn default() -> Self {
        Self {
            clean_sheet_defensive: 2.0,
            clean_sheet: 1.0,
            goal_attacker: 1.2,
            goal: 1.0,
            assist_playmaker: 1.0,
            assist: 0.7,
            own_goal: -1.5,
        }
    }
}

/// K-factor for players with fewer than `below_sessions` sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KFactorBracket {
    pub below_sessions: u32,
    pub k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub base_match_rating: f64,
    pub team_points: TeamPointsConfig,
    pub individual_points: IndividualPointsConfig,
    pub performance_min: f64,
    pub performance_max: f64,
    /// Checked in order; the first matching bracket wins
    pub k_brackets: Vec<KFactorBracket>,
    pub veteran_k: f64,
    pub high_win_rate: f64,
    pub low_win_rate: f64,
    pub win_rate_nudge: f64,
    pub zero_contribution_penalty: f64,
    /// Sessions below which a player counts as new for the delta cap
    pub new_player_sessions: u32,
    pub new_player_delta_cap: f64,
    pub veteran_delta_cap: f64,
    pub rating_ceiling: u8,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            base_match_rating: 6.0,
            team_points: TeamPointsConfig::default(),
            individual_points: IndividualPointsConfig::default(),
            performance_min: 40.0,
            performance_max: 99.0,
            k_brackets: vec![
                KFactorBracket { below_sessions: 3, k: 0.25 },
                KFactorBracket { below_sessions: 15, k: 0.10 },
                KFactorBracket { below_sessions: 30, k: 0.07 },
            ],
            veteran_k: 0.04,
            high_win_rate: 0.75,
            low_win_rate: 0.20,
            win_rate_nudge: 0.3,
            zero_contribution_penalty: -0.5,
            new_player_sessions: 3,
            new_player_delta_cap: 3.0,
            veteran_delta_cap: 2.0,
            rating_ceiling: 99,
        }
    }
}

impl RatingConfig {
    pub fn k_factor(&self, sessions_played: u32) -> f64 {
        self.k_brackets
            .iter()
            .find(|bracket| sessions_played < bracket.below_sessions)
            .map(|bracket| bracket.k)
            .unwrap_or(self.veteran_k)
    }

    pub fn delta_cap(&self, sessions_played: u32) -> f64 {
        if sessions_played < self.new_player_sessions {
            self.new_player_delta_cap
        } else {
            self.veteran_delta_cap
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_factor_brackets() {
        let config = RatingConfig::default();
        assert_eq!(config.k_factor(0), 0.25);
        assert_eq!(config.k_factor(2), 0.25);
        assert_eq!(config.k_factor(3), 0.10);
        assert_eq!(config.k_factor(14), 0.10);
        assert_eq!(config.k_factor(15), 0.07);
        assert_eq!(config.k_factor(29), 0.07);
        assert_eq!(config.k_factor(30), 0.04);
    }

    #[test]
    fn test_delta_cap() {
        let config = RatingConfig::default();
        assert_eq!(config.delta_cap(2), 3.0);
        assert_eq!(config.delta_cap(3), 2.0);
    }
}
