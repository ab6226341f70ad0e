use super::events::{EventLogEntry, EventPayload};
use super::{Game, Player, Team, TeamId};
use crate::engine::rotation;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// Winner is forced off after three straight wins
    #[default]
    AutoRotate,
    /// Winner stays until it loses
    PlayUntilLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

/// Set once when the session is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub num_teams: u8,
    pub players_per_team: u8,
    #[serde(default)]
    pub match_duration_minutes: Option<u32>,
    /// Early finish threshold; `None` or 0 disables it
    #[serde(default)]
    pub goals_to_win: Option<u32>,
    #[serde(default)]
    pub rotation_mode: RotationMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_teams: 3,
            players_per_team: 5,
            match_duration_minutes: None,
            goals_to_win: Some(2),
            rotation_mode: RotationMode::AutoRotate,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(2..=4).contains(&self.num_teams) {
            return Err(CoreError::InvalidTeamCount(self.num_teams));
        }
        if self.players_per_team == 0 {
            return Err(CoreError::InvalidConfig("players_per_team must be at least 1".into()));
        }
        if self.match_duration_minutes == Some(0) {
            return Err(CoreError::InvalidConfig("match_duration_minutes must be positive".into()));
        }
        Ok(())
    }

    pub fn goals_to_win(&self) -> Option<u32> {
        self.goals_to_win.filter(|goals| *goals > 0)
    }

    pub fn duration_seconds(&self) -> Option<u64> {
        self.match_duration_minutes.map(|minutes| minutes as u64 * 60)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub config: SessionConfig,
    pub teams: Vec<Team>,
    /// Ordered rounds; the last one is the current game while the session is active
    pub games: Vec<Game>,
    /// Player snapshots hydrated when the session was created
    #[serde(default)]
    pub player_pool: Vec<Player>,
    /// Four-team mode only: [field side 1, field side 2, bench 1, bench 2]
    #[serde(default)]
    pub rotation_queue: Vec<TeamId>,
    #[serde(default)]
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_log: Vec<EventLogEntry>,
}

impl Session {
    /// Creates a session and its first pending game.
    ///
    /// Team order is randomised (coin flip for 2/3 teams, a random queue for 4 teams),
    /// so `rng` should be seeded by the caller when reproducible setups are needed.
    pub fn new<R: Rng + ?Sized>(
        id: Option<String>,
        config: SessionConfig,
        mut teams: Vec<Team>,
        player_pool: Vec<Player>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        config.validate()?;
        if teams.len() != config.num_teams as usize {
            return Err(CoreError::InvalidConfig(format!(
                "expected {} teams, found {}",
                config.num_teams,
                teams.len()
            )));
        }
        let mut seen = std::collections::HashSet::new();
        if !teams.iter().all(|team| seen.insert(team.id.clone())) {
            return Err(CoreError::InvalidConfig("team ids must be unique".into()));
        }

        for team in &mut teams {
            team.consecutive_games = 0;
        }

        let mut rotation_queue = Vec::new();
        let (first, second) = if config.num_teams == 4 {
            let ids: Vec<TeamId> = teams.iter().map(|team| team.id.clone()).collect();
            rotation_queue = rotation::initial_queue(&ids, rng);
            (rotation_queue[0].clone(), rotation_queue[1].clone())
        } else {
            teams.shuffle(rng);
            (teams[0].id.clone(), teams[1].id.clone())
        };

        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let first_game = Game::new(format!("{id}-r1"), 1, &first, &second);

        log::info!(
            "Created session {} ({} teams, {} per side)",
            id,
            config.num_teams,
            config.players_per_team
        );

        Ok(Self {
            id,
            config,
            teams,
            games: vec![first_game],
            player_pool,
            rotation_queue,
            status: SessionStatus::Active,
            created_at: now,
            completed_at: None,
            event_log: Vec::new(),
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    pub fn current_game(&self) -> Option<&Game> {
        if self.is_completed() {
            return None;
        }
        self.games.last()
    }

    pub fn current_game_mut(&mut self) -> Option<&mut Game> {
        if self.is_completed() {
            return None;
        }
        self.games.last_mut()
    }

    pub fn finished_games(&self) -> impl Iterator<Item = &Game> {
        self.games.iter().filter(|game| game.is_finished())
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.id == team_id)
    }

    pub fn team_mut(&mut self, team_id: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|team| team.id == team_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.player_pool.iter().find(|player| player.id == player_id)
    }

    /// Teams not on the field in the current game.
    pub fn resting_team_ids(&self) -> Vec<TeamId> {
        let Some(game) = self.current_game() else {
            return Vec::new();
        };
        self.teams
            .iter()
            .filter(|team| !game.involves(&team.id))
            .map(|team| team.id.clone())
            .collect()
    }

    pub fn next_game_id(&self) -> String {
        format!("{}-r{}", self.id, self.games.len() + 1)
    }

    pub fn log_event(&mut self, at: DateTime<Utc>, payload: EventPayload) {
        self.event_log.push(EventLogEntry { at, payload });
    }

    /// Moves `player_in` into `player_out`'s roster slot.
    ///
    /// `player_in` may come from the bench of the same team or be a new id. Unknown
    /// teams or a `player_out` not on the roster leave the session unchanged.
    pub fn substitute(
        &mut self,
        team_id: &str,
        player_out: &str,
        player_in: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(team) = self.team_mut(team_id) else {
            log::warn!("Substitution ignored: unknown team {}", team_id);
            return false;
        };
        let Some(out_idx) = team.player_ids.iter().position(|id| id == player_out) else {
            log::warn!("Substitution ignored: {} is not on {}", player_out, team_id);
            return false;
        };
        match team.player_ids.iter().position(|id| id == player_in) {
            Some(in_idx) => team.player_ids.swap(out_idx, in_idx),
            None => team.player_ids[out_idx] = player_in.to_string(),
        }

        if let Some(game) = self.current_game_mut() {
            if game.is_live() {
                if let Some(side) = game.side_of(team_id) {
                    let lineup = game.lineup_mut(side);
                    if let Some(slot) = lineup.iter().position(|id| id == player_out) {
                        lineup[slot] = player_in.to_string();
                    }
                }
            }
        }

        self.log_event(
            now,
            EventPayload::Substitution {
                team_id: team_id.to_string(),
                player_out: player_out.to_string(),
                player_in: player_in.to_string(),
            },
        );
        true
    }

    /// Loans a player (legionnaire) from one team's roster to the end of another's.
    pub fn loan_player(
        &mut self,
        player_id: &str,
        from_team_id: &str,
        to_team_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if from_team_id == to_team_id || self.team(to_team_id).is_none() {
            return false;
        }
        let Some(from) = self.team_mut(from_team_id) else {
            return false;
        };
        let Some(idx) = from.player_ids.iter().position(|id| id == player_id) else {
            return false;
        };
        let moved = from.player_ids.remove(idx);
        if let Some(to) = self.team_mut(to_team_id) {
            to.player_ids.push(moved);
        }

        self.log_event(
            now,
            EventPayload::Loan {
                player_id: player_id.to_string(),
                from_team_id: from_team_id.to_string(),
                to_team_id: to_team_id.to_string(),
            },
        );
        true
    }
}
