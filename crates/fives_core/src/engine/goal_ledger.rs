use super::clock::GameClock;
use crate::models::{Game, Goal, PlayerId};
use chrono::{DateTime, Utc};

/// Details of a goal as entered by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalEntry {
    pub team_id: String,
    pub scorer_id: Option<PlayerId>,
    pub assistant_id: Option<PlayerId>,
    pub is_own_goal: bool,
}

impl GoalEntry {
    pub fn new(team_id: impl Into<String>) -> Self {
        Self { team_id: team_id.into(), ..Default::default() }
    }

    pub fn scored_by(mut self, scorer_id: impl Into<String>) -> Self {
        self.scorer_id = Some(scorer_id.into());
        self
    }

    pub fn assisted_by(mut self, assistant_id: impl Into<String>) -> Self {
        self.assistant_id = Some(assistant_id.into());
        self
    }

    pub fn own_goal(mut self) -> Self {
        self.is_own_goal = true;
        self
    }
}

fn next_goal_seq(game: &Game) -> usize {
    let prefix = format!("{}-g", game.id);
    game.goals
        .iter()
        .filter_map(|goal| goal.id.strip_prefix(&prefix)?.parse::<usize>().ok())
        .max()
        .map_or(1, |seq| seq + 1)
}

/// Score bookkeeping for a live game. No policy lives here.
pub struct GoalLedger;

impl GoalLedger {
    /// Appends a goal and credits the score.
    ///
    /// Own goals are stored against the team whose player scored them and credit
    /// the opposing side. Returns `None` (game untouched) when the game is not live
    /// or the team does not play in it.
    pub fn record(game: &mut Game, entry: GoalEntry, now: DateTime<Utc>) -> Option<Goal> {
        if !game.is_live() {
            log::warn!("Goal ignored: game {} is {:?}", game.id, game.status);
            return None;
        }
        let Some(side) = game.side_of(&entry.team_id) else {
            log::warn!("Goal ignored: team {} not in game {}", entry.team_id, game.id);
            return None;
        };

        let credited = if entry.is_own_goal { side.opposite() } else { side };
        *game.score_mut(credited) += 1;

        let goal = Goal {
            id: format!("{}-g{}", game.id, next_goal_seq(game)),
            game_id: game.id.clone(),
            team_id: entry.team_id,
            scorer_id: entry.scorer_id,
            // An own goal has no assist
            assistant_id: if entry.is_own_goal { None } else { entry.assistant_id },
            is_own_goal: entry.is_own_goal,
            credited_side: Some(credited),
            timestamp_seconds: GameClock::elapsed_seconds(game, now),
        };
        game.goals.push(goal.clone());
        Some(goal)
    }

    /// Rewrites attribution of an existing goal; the score and credited side are
    /// left as counted.
    pub fn correct(
        game: &mut Game,
        goal_id: &str,
        scorer_id: Option<PlayerId>,
        assistant_id: Option<PlayerId>,
        is_own_goal: bool,
    ) -> bool {
        let Some(goal) = game.goals.iter_mut().find(|goal| goal.id == goal_id) else {
            return false;
        };
        goal.scorer_id = scorer_id;
        goal.assistant_id = assistant_id;
        goal.is_own_goal = is_own_goal;
        true
    }

    /// Removes a mistakenly recorded goal and takes it off the credited score.
    pub fn remove(game: &mut Game, goal_id: &str) -> Option<Goal> {
        if game.is_finished() {
            return None;
        }
        let idx = game.goals.iter().position(|goal| goal.id == goal_id)?;
        let goal = game.goals.remove(idx);
        if let Some(side) = game.beneficiary_side(&goal) {
            let score = game.score_mut(side);
            *score = score.saturating_sub(1);
        }
        Some(goal)
    }
}
