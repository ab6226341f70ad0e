use super::game_facts::GameFacts;
use crate::models::{Game, PlayerId, Session, Side, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Win,
    Draw,
    Loss,
}

/// One player's view of one finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameLine {
    pub game_id: String,
    pub round: u32,
    pub team_id: TeamId,
    pub outcome: GameOutcome,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goals: u32,
    pub assists: u32,
    pub own_goals: u32,
    pub clean_sheet: bool,
    /// The player's team was behind at some point
    pub trailed: bool,
    pub scored_first_goal: bool,
    pub scored_last_goal: bool,
}

impl PlayerGameLine {
    pub fn goal_difference(&self) -> i32 {
        self.goals_for as i32 - self.goals_against as i32
    }

    pub fn is_win(&self) -> bool {
        self.outcome == GameOutcome::Win
    }

    pub fn is_comeback_win(&self) -> bool {
        self.is_win() && self.trailed
    }

    pub fn contributed(&self) -> bool {
        self.goals > 0 || self.assists > 0
    }
}

/// Per-session aggregate for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub goals: u32,
    pub assists: u32,
    pub own_goals: u32,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub clean_sheets: u32,
    pub clean_sheet_wins: u32,
    /// Game lines in session order
    pub games: Vec<PlayerGameLine>,
}

impl PlayerStats {
    fn push(&mut self, line: PlayerGameLine) {
        self.goals += line.goals;
        self.assists += line.assists;
        self.own_goals += line.own_goals;
        self.games_played += 1;
        match line.outcome {
            GameOutcome::Win => self.wins += 1,
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::Loss => self.losses += 1,
        }
        if line.clean_sheet {
            self.clean_sheets += 1;
            if line.is_win() {
                self.clean_sheet_wins += 1;
            }
        }
        self.games.push(line);
    }

    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games_played as f64
    }

    pub fn longest_win_streak(&self) -> u32 {
        let mut best = 0;
        let mut current = 0;
        for line in &self.games {
            if line.is_win() {
                current += 1;
                best = best.max(current);
            } else {
                current = 0;
            }
        }
        best
    }

    /// Team the player appeared for most often; ties go to the latest.
    pub fn main_team_id(&self) -> Option<&TeamId> {
        let mut counts: BTreeMap<&TeamId, (usize, usize)> = BTreeMap::new();
        for (idx, line) in self.games.iter().enumerate() {
            let entry = counts.entry(&line.team_id).or_insert((0, idx));
            entry.0 += 1;
            entry.1 = idx;
        }
        counts.into_iter().max_by_key(|(_, (count, last))| (*count, *last)).map(|(id, _)| id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_id: TeamId,
    pub games_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl TeamStats {
    fn push(&mut self, goals_for: u32, goals_against: u32) {
        self.games_played += 1;
        self.goals_for += goals_for;
        self.goals_against += goals_against;
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
        match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                self.points += POINTS_WIN;
            }
            std::cmp::Ordering::Equal => {
                self.draws += 1;
                self.points += POINTS_DRAW;
            }
            std::cmp::Ordering::Less => self.losses += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub players: BTreeMap<PlayerId, PlayerStats>,
    pub teams: BTreeMap<TeamId, TeamStats>,
}

impl SessionStats {
    pub fn player(&self, player_id: &str) -> Option<&PlayerStats> {
        self.players.get(player_id)
    }

    /// Highest win count among teams; `None` when no game was played.
    pub fn most_team_wins(&self) -> Option<u32> {
        self.teams.values().filter(|team| team.games_played > 0).map(|team| team.wins).max()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub games_played: usize,
    pub standings: Vec<TeamStats>,
    pub top_scorer: Option<(PlayerId, u32)>,
    pub top_assister: Option<(PlayerId, u32)>,
}

pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Folds every finished game of the session.
    ///
    /// Pure: calling it repeatedly on the same session yields the same totals.
    pub fn aggregate(session: &Session) -> SessionStats {
        let players_per_team = session.config.players_per_team as usize;
        Self::aggregate_games(session.finished_games(), &session.teams, players_per_team)
    }

    pub fn aggregate_games<'a>(
        games: impl IntoIterator<Item = &'a Game>,
        teams: &[Team],
        players_per_team: usize,
    ) -> SessionStats {
        let mut stats = SessionStats::default();
        for team in teams {
            stats
                .teams
                .entry(team.id.clone())
                .or_insert_with(|| TeamStats { team_id: team.id.clone(), ..Default::default() });
        }

        for game in games.into_iter().filter(|game| game.is_finished()) {
            let facts = GameFacts::replay(game);
            for side in [Side::Team1, Side::Team2] {
                let team_id = game.team_id(side);
                let goals_for = game.score(side);
                let goals_against = game.score(side.opposite());
                stats
                    .teams
                    .entry(team_id.clone())
                    .or_insert_with(|| TeamStats { team_id: team_id.clone(), ..Default::default() })
                    .push(goals_for, goals_against);

                for player_id in participants(game, side, teams, players_per_team) {
                    let line = player_line(game, side, &player_id, &facts);
                    stats
                        .players
                        .entry(player_id.clone())
                        .or_insert_with(|| PlayerStats { player_id, ..Default::default() })
                        .push(line);
                }
            }
        }
        stats
    }

    /// Teams sorted by points, goal difference and goals for, all descending.
    pub fn rank_teams(stats: &SessionStats) -> Vec<TeamStats> {
        let mut standings: Vec<TeamStats> = stats.teams.values().cloned().collect();
        standings.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.goal_difference.cmp(&a.goal_difference))
                .then(b.goals_for.cmp(&a.goals_for))
                .then(a.team_id.cmp(&b.team_id))
        });
        standings
    }

    pub fn summarize(session: &Session) -> SessionSummary {
        let stats = Self::aggregate(session);
        let leader = |metric: fn(&PlayerStats) -> u32| {
            stats
                .players
                .values()
                .filter(|p| metric(p) > 0)
                .max_by(|a, b| metric(a).cmp(&metric(b)).then(b.player_id.cmp(&a.player_id)))
                .map(|p| (p.player_id.clone(), metric(p)))
        };
        SessionSummary {
            games_played: session.finished_games().count(),
            standings: Self::rank_teams(&stats),
            top_scorer: leader(|p: &PlayerStats| p.goals),
            top_assister: leader(|p: &PlayerStats| p.assists),
        }
    }
}

/// Lineup snapshot for `side`, falling back to the team roster, plus anyone
/// credited with a goal or assist for that side who is missing from it.
fn participants(game: &Game, side: Side, teams: &[Team], players_per_team: usize) -> Vec<PlayerId> {
    let team_id = game.team_id(side);
    let mut ids: Vec<PlayerId> = if game.lineup(side).is_empty() {
        teams
            .iter()
            .find(|team| &team.id == team_id)
            .map(|team| team.lineup(players_per_team).to_vec())
            .unwrap_or_default()
    } else {
        game.lineup(side).to_vec()
    };

    for goal in game.goals.iter().filter(|goal| &goal.team_id == team_id) {
        for id in [&goal.scorer_id, &goal.assistant_id].into_iter().flatten() {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

fn player_line(game: &Game, side: Side, player_id: &str, facts: &GameFacts) -> PlayerGameLine {
    let team_id = game.team_id(side);
    let goals_for = game.score(side);
    let goals_against = game.score(side.opposite());
    let mine = |id: &Option<PlayerId>| id.as_deref() == Some(player_id);

    let mut goals = 0;
    let mut assists = 0;
    let mut own_goals = 0;
    for goal in game.goals.iter().filter(|goal| &goal.team_id == team_id) {
        if goal.is_own_goal {
            own_goals += mine(&goal.scorer_id) as u32;
        } else {
            goals += mine(&goal.scorer_id) as u32;
            assists += mine(&goal.assistant_id) as u32;
        }
    }

    PlayerGameLine {
        game_id: game.id.clone(),
        round: game.round,
        team_id: team_id.clone(),
        outcome: match goals_for.cmp(&goals_against) {
            std::cmp::Ordering::Greater => GameOutcome::Win,
            std::cmp::Ordering::Equal => GameOutcome::Draw,
            std::cmp::Ordering::Less => GameOutcome::Loss,
        },
        goals_for,
        goals_against,
        goals,
        assists,
        own_goals,
        clean_sheet: goals_against == 0,
        trailed: facts.trailed(side),
        scored_first_goal: mine(&facts.first_goal_scorer) && goal_side_matches(game, side, true),
        scored_last_goal: mine(&facts.last_goal_scorer) && goal_side_matches(game, side, false),
    }
}

/// Whether the first (or last) goal of the game was credited to `side`.
fn goal_side_matches(game: &Game, side: Side, first: bool) -> bool {
    let goals = game.ordered_goals();
    let goal = if first { goals.first() } else { goals.last() };
    goal.and_then(|goal| game.beneficiary_side(goal)) == Some(side)
}
