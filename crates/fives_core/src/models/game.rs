use super::{PlayerId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Pending,
    Active,
    Paused,
    Finished,
}

/// Which side of the pitch a team occupies in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub game_id: String,
    /// Team of the player who touched the ball last; for own goals this is the conceding team
    pub team_id: TeamId,
    pub scorer_id: Option<PlayerId>,
    pub assistant_id: Option<PlayerId>,
    #[serde(default)]
    pub is_own_goal: bool,
    /// Side whose score was incremented when the goal was recorded
    #[serde(default)]
    pub credited_side: Option<Side>,
    /// Seconds on the game clock
    pub timestamp_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub round: u32,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    #[serde(default)]
    pub team1_score: u32,
    #[serde(default)]
    pub team2_score: u32,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default)]
    pub winner_team_id: Option<TeamId>,
    #[serde(default)]
    pub is_draw: bool,
    /// Team chosen to stay on after a first-round draw
    #[serde(default)]
    pub manual_winner_id: Option<TeamId>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_resume_time: Option<DateTime<Utc>>,
    /// Clock seconds banked before the current running stretch
    #[serde(default)]
    pub elapsed_seconds_on_pause: u64,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Lineups snapshotted when the game starts
    #[serde(default)]
    pub team1_lineup: Vec<PlayerId>,
    #[serde(default)]
    pub team2_lineup: Vec<PlayerId>,
    #[serde(default)]
    pub announced_milestones: BTreeSet<u64>,
}

impl Game {
    pub fn new(id: impl Into<String>, round: u32, team1_id: &str, team2_id: &str) -> Self {
        Self {
            id: id.into(),
            round,
            team1_id: team1_id.to_string(),
            team2_id: team2_id.to_string(),
            team1_score: 0,
            team2_score: 0,
            status: GameStatus::Pending,
            winner_team_id: None,
            is_draw: false,
            manual_winner_id: None,
            start_time: None,
            last_resume_time: None,
            elapsed_seconds_on_pause: 0,
            duration_seconds: None,
            finished_at: None,
            goals: Vec::new(),
            team1_lineup: Vec::new(),
            team2_lineup: Vec::new(),
            announced_milestones: BTreeSet::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    pub fn is_live(&self) -> bool {
        matches!(self.status, GameStatus::Active | GameStatus::Paused)
    }

    pub fn side_of(&self, team_id: &str) -> Option<Side> {
        if self.team1_id == team_id {
            Some(Side::Team1)
        } else if self.team2_id == team_id {
            Some(Side::Team2)
        } else {
            None
        }
    }

    pub fn team_id(&self, side: Side) -> &TeamId {
        match side {
            Side::Team1 => &self.team1_id,
            Side::Team2 => &self.team2_id,
        }
    }

    pub fn opponent_of(&self, team_id: &str) -> Option<&TeamId> {
        self.side_of(team_id).map(|side| self.team_id(side.opposite()))
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Team1 => self.team1_score,
            Side::Team2 => self.team2_score,
        }
    }

    pub fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Team1 => &mut self.team1_score,
            Side::Team2 => &mut self.team2_score,
        }
    }

    /// `(goals for, goals against)` from the point of view of `team_id`.
    pub fn score_for(&self, team_id: &str) -> Option<(u32, u32)> {
        self.side_of(team_id).map(|side| (self.score(side), self.score(side.opposite())))
    }

    pub fn lineup(&self, side: Side) -> &[PlayerId] {
        match side {
            Side::Team1 => &self.team1_lineup,
            Side::Team2 => &self.team2_lineup,
        }
    }

    pub fn lineup_mut(&mut self, side: Side) -> &mut Vec<PlayerId> {
        match side {
            Side::Team1 => &mut self.team1_lineup,
            Side::Team2 => &mut self.team2_lineup,
        }
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.side_of(team_id).is_some()
    }

    pub fn loser_team_id(&self) -> Option<&TeamId> {
        self.winner_team_id.as_deref().and_then(|winner| self.opponent_of(winner))
    }

    /// Side credited with a goal: the side fixed at recording time, else the
    /// opposing side for own goals.
    pub fn beneficiary_side(&self, goal: &Goal) -> Option<Side> {
        if goal.credited_side.is_some() {
            return goal.credited_side;
        }
        let side = self.side_of(&goal.team_id)?;
        Some(if goal.is_own_goal { side.opposite() } else { side })
    }

    /// Goals in replay order: by clock time, ties kept in insertion order.
    pub fn ordered_goals(&self) -> Vec<&Goal> {
        let mut goals: Vec<&Goal> = self.goals.iter().collect();
        goals.sort_by_key(|goal| goal.timestamp_seconds);
        goals
    }
}
