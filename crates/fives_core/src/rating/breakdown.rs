use crate::badges::BadgeKind;
use crate::models::PlayerId;
use serde::{Deserialize, Serialize};

/// Audit record of one rating update.
///
/// Intermediate values are kept unrounded; only `new_rating` is rounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    pub player_id: PlayerId,
    pub session_id: String,
    pub previous_rating: u8,
    pub new_rating: u8,
    pub games_played: u32,
    pub avg_team_points: f64,
    pub avg_individual_points: f64,
    pub badge_bonus: f64,
    pub badges: Vec<BadgeKind>,
    pub avg_match_rating: f64,
    pub performance_level: f64,
    pub k_factor: f64,
    pub win_rate_adjustment: f64,
    pub zero_contribution_adjustment: f64,
    /// Delta after adjustments and the experience cap
    pub delta: f64,
    pub is_penalty: bool,
}

impl RatingBreakdown {
    /// Breakdown for a player who did not play: nothing moves.
    pub fn unchanged(player_id: &str, session_id: &str, rating: u8) -> Self {
        Self {
            player_id: player_id.to_string(),
            session_id: session_id.to_string(),
            previous_rating: rating,
            new_rating: rating,
            ..Default::default()
        }
    }

    pub fn rating_change(&self) -> i16 {
        self.new_rating as i16 - self.previous_rating as i16
    }
}
