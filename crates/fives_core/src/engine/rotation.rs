//! Team rotation between rounds.
//!
//! ## Formats
//! - 2 teams: same pairing every round.
//! - 3 teams: winner stays, loser swaps with the resting team. Under
//!   [`RotationMode::AutoRotate`] a third straight win forces the winner off and
//!   awards a big star.
//! - 4 teams: explicit queue `[side 1, side 2, bench 1, bench 2]`.
//!
//! A team that stays keeps its side; the incoming team takes the side of the team
//! that left.

use crate::models::{Game, RotationMode, Session, Side, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Wins in a row that force a team off the field.
pub const FORCED_ROTATION_STREAK: u32 = 3;
/// Three-team draws rotate the remaining team once its streak reaches this.
pub const DRAW_ROTATION_STREAK: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Win { winner: Side },
    Draw,
}

impl RoundResult {
    pub fn of(game: &Game) -> Option<Self> {
        if game.is_draw {
            return Some(RoundResult::Draw);
        }
        let winner = game.winner_team_id.as_deref()?;
        game.side_of(winner).map(|winner| RoundResult::Win { winner })
    }
}

/// Who plays the next round and what changed on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationDecision {
    pub next_team1_id: TeamId,
    pub next_team2_id: TeamId,
    pub left_field: Vec<TeamId>,
    pub entered_field: Vec<TeamId>,
    pub big_star_team_id: Option<TeamId>,
}

/// Random permutation of the four team ids, used as the opening queue.
pub fn initial_queue<R: Rng + ?Sized>(team_ids: &[TeamId], rng: &mut R) -> Vec<TeamId> {
    let mut queue = team_ids.to_vec();
    queue.shuffle(rng);
    queue
}

pub struct RotationEngine;

impl RotationEngine {
    /// Applies the rotation rules for the session's last (finished) game.
    ///
    /// Updates team streaks, big stars and the 4-team queue. Returns `None` and
    /// leaves the session untouched when the game is not finished, has no result
    /// or references unknown teams. For a first-round 3-team draw the game must
    /// carry `manual_winner_id`.
    pub fn rotate(session: &mut Session) -> Option<RotationDecision> {
        let game = session.games.last()?.clone();
        if !game.is_finished() || session.team(&game.team1_id).is_none() || session.team(&game.team2_id).is_none() {
            return None;
        }
        let result = RoundResult::of(&game)?;

        let decision = match session.config.num_teams {
            2 => Self::rotate_two(session, &game, result),
            3 => Self::rotate_three(session, &game, result),
            4 => Self::rotate_four(session, &game, result),
            n => {
                log::warn!("Rotation skipped: unsupported team count {}", n);
                None
            }
        }?;

        log::debug!(
            "Round {} rotation: {} vs {} next (left: {:?}, big star: {:?})",
            game.round,
            decision.next_team1_id,
            decision.next_team2_id,
            decision.left_field,
            decision.big_star_team_id
        );
        Some(decision)
    }

    /// Runs the rotation on a copy of the session.
    pub fn preview(session: &Session) -> Option<RotationDecision> {
        let mut scratch = session.clone();
        Self::rotate(&mut scratch)
    }

    fn rotate_two(session: &mut Session, game: &Game, result: RoundResult) -> Option<RotationDecision> {
        if let RoundResult::Win { winner } = result {
            let winner_id = game.team_id(winner).clone();
            let loser_id = game.team_id(winner.opposite()).clone();
            session.team_mut(&winner_id)?.consecutive_games += 1;
            session.team_mut(&loser_id)?.consecutive_games = 0;
        }
        Some(RotationDecision {
            next_team1_id: game.team1_id.clone(),
            next_team2_id: game.team2_id.clone(),
            left_field: Vec::new(),
            entered_field: Vec::new(),
            big_star_team_id: None,
        })
    }

    fn rotate_three(session: &mut Session, game: &Game, result: RoundResult) -> Option<RotationDecision> {
        let resting_id = session
            .teams
            .iter()
            .find(|team| !game.involves(&team.id))
            .map(|team| team.id.clone())?;
        let mode = session.config.rotation_mode;
        let streak = |session: &Session, side: Side| {
            session.team(game.team_id(side)).map(|team| team.consecutive_games).unwrap_or(0)
        };

        let mut big_star = None;
        let staying = match result {
            RoundResult::Win { winner } => {
                let forced = mode == RotationMode::AutoRotate
                    && streak(session, winner) + 1 >= FORCED_ROTATION_STREAK;
                if forced {
                    big_star = Some(game.team_id(winner).clone());
                    // Loser stays on with a broken streak
                    session.team_mut(game.team_id(winner.opposite()))?.consecutive_games = 0;
                    winner.opposite()
                } else {
                    session.team_mut(game.team_id(winner))?.consecutive_games += 1;
                    winner
                }
            }
            RoundResult::Draw if game.round <= 1 => {
                let chosen = game.manual_winner_id.as_deref().and_then(|id| game.side_of(id))?;
                session.team_mut(game.team_id(chosen))?.consecutive_games += 1;
                chosen
            }
            RoundResult::Draw => {
                let candidate = if streak(session, Side::Team2) < streak(session, Side::Team1) {
                    Side::Team2
                } else {
                    Side::Team1
                };
                let staying = if mode == RotationMode::AutoRotate
                    && streak(session, candidate) + 1 >= DRAW_ROTATION_STREAK
                {
                    candidate.opposite()
                } else {
                    candidate
                };
                session.team_mut(game.team_id(staying))?.consecutive_games += 1;
                staying
            }
        };

        let leaving = staying.opposite();
        let leaving_id = game.team_id(leaving).clone();
        {
            let team = session.team_mut(&leaving_id)?;
            team.leave_field();
            if big_star.is_some() {
                team.big_stars += 1;
            }
        }
        session.team_mut(&resting_id)?.consecutive_games = 0;

        let (next_team1_id, next_team2_id) = match leaving {
            Side::Team1 => (resting_id.clone(), game.team2_id.clone()),
            Side::Team2 => (game.team1_id.clone(), resting_id.clone()),
        };

        Some(RotationDecision {
            next_team1_id,
            next_team2_id,
            left_field: vec![leaving_id],
            entered_field: vec![resting_id],
            big_star_team_id: big_star,
        })
    }

    fn rotate_four(session: &mut Session, game: &Game, result: RoundResult) -> Option<RotationDecision> {
        let queue = Self::normalized_queue(session, game)?;
        let [side1, side2, bench1, bench2] = [&queue[0], &queue[1], &queue[2], &queue[3]];

        let mut big_star = None;
        let new_queue: Vec<TeamId> = match result {
            RoundResult::Draw => vec![bench1.clone(), bench2.clone(), side1.clone(), side2.clone()],
            RoundResult::Win { winner } => {
                let winner_id = game.team_id(winner).clone();
                let loser_id = game.team_id(winner.opposite()).clone();
                let winner_streak = session.team(&winner_id)?.consecutive_games;

                if winner_streak + 1 >= FORCED_ROTATION_STREAK {
                    big_star = Some(winner_id.clone());
                    vec![bench1.clone(), bench2.clone(), loser_id, winner_id]
                } else {
                    session.team_mut(&winner_id)?.consecutive_games += 1;
                    match winner {
                        Side::Team1 => vec![winner_id, bench1.clone(), bench2.clone(), loser_id],
                        Side::Team2 => vec![bench1.clone(), winner_id, bench2.clone(), loser_id],
                    }
                }
            }
        };

        let on_field = [&new_queue[0], &new_queue[1]];
        let left_field: Vec<TeamId> =
            [side1, side2].into_iter().filter(|id| !on_field.contains(id)).cloned().collect();
        let entered_field: Vec<TeamId> =
            on_field.into_iter().filter(|id| *id != side1 && *id != side2).cloned().collect();

        for id in left_field.iter().chain(entered_field.iter()) {
            session.team_mut(id)?.leave_field();
        }
        if let Some(star) = &big_star {
            session.team_mut(star)?.big_stars += 1;
        }

        let decision = RotationDecision {
            next_team1_id: new_queue[0].clone(),
            next_team2_id: new_queue[1].clone(),
            left_field,
            entered_field,
            big_star_team_id: big_star,
        };
        session.rotation_queue = new_queue;
        Some(decision)
    }

    /// The stored queue if it is consistent with the game, otherwise a queue
    /// rebuilt from the game's sides followed by the other teams in session order.
    fn normalized_queue(session: &Session, game: &Game) -> Option<Vec<TeamId>> {
        let queue = &session.rotation_queue;
        let distinct = queue.iter().collect::<std::collections::HashSet<_>>().len() == 4;
        let known = queue.iter().all(|id| session.team(id).is_some());
        if queue.len() == 4 && distinct && known && queue[0] == game.team1_id && queue[1] == game.team2_id {
            return Some(queue.clone());
        }

        log::warn!("Rotation queue {:?} inconsistent with game {}, rebuilding", queue, game.id);
        let mut rebuilt = vec![game.team1_id.clone(), game.team2_id.clone()];
        rebuilt.extend(
            session.teams.iter().filter(|team| !game.involves(&team.id)).map(|team| team.id.clone()),
        );
        (rebuilt.len() == 4).then_some(rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameStatus, SessionConfig, Team};
    use chrono::Utc;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session(num_teams: u8, mode: RotationMode) -> Session {
        let teams: Vec<Team> =
            ["A", "B", "C", "D"][..num_teams as usize].iter().map(|id| Team::new(*id, *id, "#000")).collect();
        let config = SessionConfig {
            num_teams,
            players_per_team: 1,
            rotation_mode: mode,
            ..SessionConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut session = Session::new(Some("s".into()), config, teams, vec![], &mut rng, Utc::now()).unwrap();
        // Fixed opening for readable assertions
        session.games[0].team1_id = "A".into();
        session.games[0].team2_id = "B".into();
        if num_teams == 4 {
            session.rotation_queue = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        }
        session
    }

    /// Finishes the current game with the given score and appends the next one.
    fn play(session: &mut Session, team1_score: u32, team2_score: u32) -> RotationDecision {
        let game = session.games.last_mut().unwrap();
        game.team1_score = team1_score;
        game.team2_score = team2_score;
        game.status = GameStatus::Finished;
        game.is_draw = team1_score == team2_score;
        game.winner_team_id = match team1_score.cmp(&team2_score) {
            std::cmp::Ordering::Greater => Some(game.team1_id.clone()),
            std::cmp::Ordering::Less => Some(game.team2_id.clone()),
            std::cmp::Ordering::Equal => None,
        };
        let round = game.round;
        let decision = RotationEngine::rotate(session).unwrap();
        let next = Game::new(session.next_game_id(), round + 1, &decision.next_team1_id, &decision.next_team2_id);
        session.games.push(next);
        decision
    }

    fn streak(session: &Session, id: &str) -> u32 {
        session.team(id).unwrap().consecutive_games
    }

    #[test]
    fn test_two_teams_keep_playing() {
        let mut s = session(2, RotationMode::AutoRotate);
        for _ in 0..4 {
            let decision = play(&mut s, 1, 0);
            assert_eq!((decision.next_team1_id.as_str(), decision.next_team2_id.as_str()), ("A", "B"));
        }
        assert_eq!(streak(&s, "A"), 4);
        assert_eq!(streak(&s, "B"), 0);
    }

    #[test]
    fn test_three_team_winner_keeps_slot() {
        let mut s = session(3, RotationMode::AutoRotate);
        let decision = play(&mut s, 2, 0);
        assert_eq!(streak(&s, "A"), 1);
        assert_eq!(decision.next_team1_id, "A");
        assert_eq!(decision.next_team2_id, "C");
        assert_eq!(decision.left_field, vec!["B".to_string()]);
    }

    #[test]
    fn test_three_team_third_win_forces_rotation() {
        let mut s = session(3, RotationMode::AutoRotate);
        play(&mut s, 2, 0); // A beats B, C in
        play(&mut s, 2, 0); // A beats C, B in
        assert_eq!(streak(&s, "A"), 2);
        let decision = play(&mut s, 2, 1); // A beats B, forced off

        let a = s.team("A").unwrap();
        assert_eq!(a.big_stars, 1);
        assert_eq!(a.consecutive_games, 0);
        assert_eq!(decision.big_star_team_id.as_deref(), Some("A"));
        // C takes A's slot, B stays
        assert_eq!(decision.next_team1_id, "C");
        assert_eq!(decision.next_team2_id, "B");
    }

    #[test]
    fn test_play_until_loss_never_forces() {
        let mut s = session(3, RotationMode::PlayUntilLoss);
        for _ in 0..5 {
            let decision = play(&mut s, 1, 0);
            assert_eq!(decision.next_team1_id, "A");
            assert!(decision.big_star_team_id.is_none());
        }
        assert_eq!(streak(&s, "A"), 5);
        assert_eq!(s.team("A").unwrap().big_stars, 0);
    }

    #[test]
    fn test_three_team_loser_swaps_with_resting() {
        let mut s = session(3, RotationMode::AutoRotate);
        let decision = play(&mut s, 0, 1); // B beats A
        assert_eq!(decision.next_team1_id, "C");
        assert_eq!(decision.next_team2_id, "B");
        assert_eq!(streak(&s, "B"), 1);
    }

    #[test]
    fn test_first_round_draw_needs_manual_winner() {
        let mut s = session(3, RotationMode::AutoRotate);
        let game = s.games.last_mut().unwrap();
        game.status = GameStatus::Finished;
        game.is_draw = true;
        assert!(RotationEngine::rotate(&mut s).is_none());

        s.games.last_mut().unwrap().manual_winner_id = Some("B".into());
        let decision = RotationEngine::rotate(&mut s).unwrap();
        assert_eq!(decision.next_team1_id, "C");
        assert_eq!(decision.next_team2_id, "B");
        assert_eq!(streak(&s, "B"), 1);
    }

    #[test]
    fn test_later_draw_keeps_fresher_team() {
        let mut s = session(3, RotationMode::AutoRotate);
        play(&mut s, 1, 0); // A (1) vs C (0)
        let decision = play(&mut s, 1, 1);
        // C has the shorter streak and stays in slot 2
        assert_eq!(decision.left_field, vec!["A".to_string()]);
        assert_eq!(decision.next_team1_id, "B");
        assert_eq!(decision.next_team2_id, "C");
        assert_eq!(streak(&s, "C"), 1);
        assert_eq!(streak(&s, "A"), 0);
    }

    #[test]
    fn test_draw_rotates_team_reaching_two() {
        let mut s = session(3, RotationMode::AutoRotate);
        play(&mut s, 1, 0); // A 1, C enters
        play(&mut s, 0, 1); // C beats A: C 1, B enters slot 1
        assert_eq!(streak(&s, "C"), 1);
        // B (0) vs C (1) draw: B would stay at 1 streak, no forced rotation
        let decision = play(&mut s, 2, 2);
        assert_eq!(decision.left_field, vec!["C".to_string()]);

        // B (1) vs A (0) draw: A is fresher and stays
        let decision = play(&mut s, 0, 0);
        assert_eq!(decision.left_field, vec!["B".to_string()]);

        // C (0) vs A (1)
        play(&mut s, 3, 0); // C beats A: C 1, B enters
        // C(1) vs B(0): draw, B stays (0 -> 1)
        let decision = play(&mut s, 1, 1);
        assert_eq!(decision.left_field, vec!["C".to_string()]);
        // A(0) vs B(1)? slot order: A enters C's slot
        assert_eq!(decision.next_team1_id, "A");
    }

    #[test]
    fn test_draw_with_both_streaks_forces_fresher_team_off() {
        let mut s = session(3, RotationMode::AutoRotate);
        s.team_mut("A").unwrap().consecutive_games = 1;
        s.team_mut("B").unwrap().consecutive_games = 1;
        s.games[0].round = 2;
        let decision = play(&mut s, 1, 1);
        // Slot 1 is the candidate; its streak would reach 2, so it rotates instead
        assert_eq!(decision.left_field, vec!["A".to_string()]);
        assert_eq!(streak(&s, "B"), 2);
    }

    #[test]
    fn test_four_team_winner_keeps_side() {
        let mut s = session(4, RotationMode::AutoRotate);
        let decision = play(&mut s, 1, 0);
        assert_eq!(s.rotation_queue, vec!["A", "C", "D", "B"]);
        assert_eq!((decision.next_team1_id.as_str(), decision.next_team2_id.as_str()), ("A", "C"));

        // C wins from side 2: D promotes into A's side
        let decision = play(&mut s, 0, 1);
        assert_eq!(s.rotation_queue, vec!["D", "C", "B", "A"]);
        assert_eq!(decision.next_team1_id, "D");
    }

    #[test]
    fn test_four_team_draw_rotates_both() {
        let mut s = session(4, RotationMode::AutoRotate);
        play(&mut s, 2, 2);
        assert_eq!(s.rotation_queue, vec!["C", "D", "A", "B"]);
    }

    #[test]
    fn test_four_team_forced_rotation_orders_loser_first() {
        let mut s = session(4, RotationMode::AutoRotate);
        play(&mut s, 1, 0); // A,C,D,B
        play(&mut s, 1, 0); // A,D,B,C
        let decision = play(&mut s, 1, 0); // A third win
        assert_eq!(s.rotation_queue, vec!["B", "C", "D", "A"]);
        assert_eq!(decision.big_star_team_id.as_deref(), Some("A"));
        assert_eq!(s.team("A").unwrap().big_stars, 1);
        assert_eq!(streak(&s, "A"), 0);
    }

    #[test]
    fn test_unfinished_game_is_not_rotated() {
        let mut s = session(3, RotationMode::AutoRotate);
        let before = s.clone();
        assert!(RotationEngine::rotate(&mut s).is_none());
        assert_eq!(s, before);
    }

    proptest! {
        #[test]
        fn prop_four_team_queue_stays_a_permutation(outcomes in prop::collection::vec(0u8..3, 1..60)) {
            let mut s = session(4, RotationMode::AutoRotate);
            for outcome in outcomes {
                let stars_before: u32 = s.teams.iter().map(|t| t.big_stars).sum();
                let decision = match outcome {
                    0 => play(&mut s, 1, 0),
                    1 => play(&mut s, 0, 1),
                    _ => play(&mut s, 1, 1),
                };
                let mut ids = s.rotation_queue.clone();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), 4);
                prop_assert_eq!(s.rotation_queue.len(), 4);
                prop_assert_eq!(&s.rotation_queue[0], &decision.next_team1_id);
                let stars_after: u32 = s.teams.iter().map(|t| t.big_stars).sum();
                prop_assert!(stars_after - stars_before <= 1);
                prop_assert!(s.teams.iter().all(|t| t.consecutive_games < FORCED_ROTATION_STREAK));
            }
        }

        #[test]
        fn prop_auto_rotate_awards_one_star_per_forced_exit(outcomes in prop::collection::vec(0u8..2, 1..60)) {
            let mut s = session(3, RotationMode::AutoRotate);
            for outcome in outcomes {
                let game = s.games.last().unwrap().clone();
                let winner = if outcome == 0 { game.team1_id.clone() } else { game.team2_id.clone() };
                let streak_before = streak(&s, &winner);
                let stars_before = s.team(&winner).unwrap().big_stars;
                let decision = if outcome == 0 { play(&mut s, 1, 0) } else { play(&mut s, 0, 1) };
                let stars_after = s.team(&winner).unwrap().big_stars;
                if streak_before + 1 == FORCED_ROTATION_STREAK {
                    prop_assert_eq!(stars_after, stars_before + 1);
                    prop_assert_eq!(decision.big_star_team_id.as_deref(), Some(winner.as_str()));
                    prop_assert!(decision.left_field.contains(&winner));
                } else {
                    prop_assert_eq!(stars_after, stars_before);
                }
            }
        }
    }
}
