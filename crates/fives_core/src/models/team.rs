use super::PlayerId;
use serde::{Deserialize, Serialize};

pub type TeamId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub color: String,
    /// Ordered roster; the first `players_per_team` ids are the active lineup
    pub player_ids: Vec<PlayerId>,
    /// Rounds won in a row while staying on the field
    #[serde(default)]
    pub consecutive_games: u32,
    /// Awarded each time the team is forced off after a winning streak
    #[serde(default)]
    pub big_stars: u32,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            player_ids: Vec::new(),
            consecutive_games: 0,
            big_stars: 0,
        }
    }

    pub fn with_players<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.player_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn lineup(&self, players_per_team: usize) -> &[PlayerId] {
        let n = players_per_team.min(self.player_ids.len());
        &self.player_ids[..n]
    }

    pub fn bench(&self, players_per_team: usize) -> &[PlayerId] {
        let n = players_per_team.min(self.player_ids.len());
        &self.player_ids[n..]
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }

    /// Called whenever the team leaves the field.
    pub fn leave_field(&mut self) {
        self.consecutive_games = 0;
    }
}
