use crate::models::{Game, PlayerId, Side};

/// Facts recovered by replaying a finished game's goals in clock order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFacts {
    /// Scorer of the game's first goal, unless it was an own goal
    pub first_goal_scorer: Option<PlayerId>,
    /// Scorer of the game's last goal, unless it was an own goal
    pub last_goal_scorer: Option<PlayerId>,
    /// Whether each side was behind at any point (`[team1, team2]`)
    pub trailed: [bool; 2],
}

impl GameFacts {
    pub fn replay(game: &Game) -> Self {
        let goals = game.ordered_goals();
        let scorer = |index: Option<usize>| {
            index
                .and_then(|i| goals.get(i))
                .filter(|goal| !goal.is_own_goal)
                .and_then(|goal| goal.scorer_id.clone())
        };

        let mut running = [0u32; 2];
        let mut trailed = [false; 2];
        for goal in &goals {
            let Some(side) = game.beneficiary_side(goal) else {
                continue;
            };
            running[side_index(side)] += 1;
            trailed[0] |= running[0] < running[1];
            trailed[1] |= running[1] < running[0];
        }

        Self {
            first_goal_scorer: scorer((!goals.is_empty()).then_some(0)),
            last_goal_scorer: scorer(goals.len().checked_sub(1)),
            trailed,
        }
    }

    pub fn trailed(&self, side: Side) -> bool {
        self.trailed[side_index(side)]
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Team1 => 0,
        Side::Team2 => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Goal;

    fn goal(team: &str, scorer: &str, t: u64, own: bool) -> Goal {
        Goal {
            id: format!("g{t}"),
            game_id: "r1".into(),
            team_id: team.into(),
            scorer_id: Some(scorer.into()),
            assistant_id: None,
            is_own_goal: own,
            credited_side: None,
            timestamp_seconds: t,
        }
    }

    #[test]
    fn test_comeback_detected_from_goal_order() {
        let mut game = Game::new("r1", 1, "a", "b");
        // Recorded out of order; replay sorts by clock
        game.goals.push(goal("a", "a1", 300, false));
        game.goals.push(goal("b", "b1", 60, false));
        game.goals.push(goal("a", "a2", 200, false));

        let facts = GameFacts::replay(&game);
        assert!(facts.trailed(Side::Team1));
        assert!(!facts.trailed(Side::Team2));
        assert_eq!(facts.first_goal_scorer.as_deref(), Some("b1"));
        assert_eq!(facts.last_goal_scorer.as_deref(), Some("a1"));
    }

    #[test]
    fn test_own_goal_counts_for_opponent_and_has_no_scorer_credit() {
        let mut game = Game::new("r1", 1, "a", "b");
        game.goals.push(goal("a", "a1", 10, true));
        let facts = GameFacts::replay(&game);
        assert!(facts.trailed(Side::Team1));
        assert!(facts.first_goal_scorer.is_none());
    }

    #[test]
    fn test_goalless_game() {
        let facts = GameFacts::replay(&Game::new("r1", 1, "a", "b"));
        assert_eq!(facts, GameFacts::default());
    }
}
