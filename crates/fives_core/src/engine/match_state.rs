//! Live-match lifecycle: Pending → Active ⇄ Paused → Finished.
//!
//! Every operation acts on the session's current game (its last element) and is
//! a no-op on malformed input, reported through [`Transition::Ignored`].

use super::clock::{ClockReading, Clock, GameClock};
use super::goal_ledger::{GoalEntry, GoalLedger};
use super::rotation::{RotationDecision, RotationEngine};
use crate::models::{EventPayload, Game, GameStatus, Goal, PlayerId, Session, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(&'static str),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FinishOutcome {
    Finished {
        game_id: String,
        winner_team_id: Option<String>,
        is_draw: bool,
        next_game_id: String,
        rotation: Option<RotationDecision>,
    },
    /// First-round three-team draw: the host must pick who stays on
    TieBreakRequired { game_id: String },
    Ignored { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalOutcome {
    pub goal: Goal,
    /// Set when the goal reached `goals_to_win`
    pub finish: Option<FinishOutcome>,
}

pub struct MatchStateMachine<'a, C: Clock + ?Sized> {
    clock: &'a C,
}

impl<'a, C: Clock + ?Sized> MatchStateMachine<'a, C> {
    pub fn new(clock: &'a C) -> Self {
        Self { clock }
    }

    pub fn start(&self, session: &mut Session) -> Transition {
        let now = self.clock.now();
        let players_per_team = session.config.players_per_team as usize;
        let Some(game) = session.current_game() else {
            return Transition::Ignored("no current game");
        };
        if game.status != GameStatus::Pending {
            return Transition::Ignored("game already started");
        }
        let lineups = [&game.team1_id, &game.team2_id].map(|id| {
            session.team(id).map(|team| team.lineup(players_per_team).to_vec()).unwrap_or_default()
        });

        let Some(game) = session.current_game_mut() else {
            return Transition::Ignored("no current game");
        };
        game.status = GameStatus::Active;
        game.start_time.get_or_insert(now);
        game.last_resume_time = Some(now);
        let [team1_lineup, team2_lineup] = lineups;
        game.team1_lineup = team1_lineup;
        game.team2_lineup = team2_lineup;
        let payload = EventPayload::StartRound {
            game_id: game.id.clone(),
            round: game.round,
            team1_id: game.team1_id.clone(),
            team2_id: game.team2_id.clone(),
        };

        log::debug!("Round {} started", game.round);
        session.log_event(now, payload);
        Transition::Applied
    }

    pub fn pause(&self, session: &mut Session) -> Transition {
        let now = self.clock.now();
        let Some(game) = session.current_game_mut() else {
            return Transition::Ignored("no current game");
        };
        if game.status != GameStatus::Active {
            return Transition::Ignored("game is not running");
        }
        game.elapsed_seconds_on_pause = GameClock::elapsed_seconds(game, now);
        game.status = GameStatus::Paused;
        let payload = EventPayload::Pause {
            game_id: game.id.clone(),
            elapsed_seconds: game.elapsed_seconds_on_pause,
        };
        session.log_event(now, payload);
        Transition::Applied
    }

    pub fn resume(&self, session: &mut Session) -> Transition {
        let now = self.clock.now();
        let Some(game) = session.current_game_mut() else {
            return Transition::Ignored("no current game");
        };
        if game.status != GameStatus::Paused {
            return Transition::Ignored("game is not paused");
        }
        game.status = GameStatus::Active;
        game.last_resume_time = Some(now);
        let payload = EventPayload::Resume { game_id: game.id.clone() };
        session.log_event(now, payload);
        Transition::Applied
    }

    /// Reads the current game's clock, claiming announcement milestones.
    pub fn observe(&self, session: &mut Session) -> Option<ClockReading> {
        let now = self.clock.now();
        let duration = session.config.duration_seconds();
        let game = session.current_game_mut()?;
        Some(GameClock::observe(game, now, duration))
    }

    /// Records a goal; finishes the game when it reaches `goals_to_win` while active.
    pub fn record_goal(&self, session: &mut Session, entry: GoalEntry) -> Option<GoalOutcome> {
        let now = self.clock.now();
        let target = session.config.goals_to_win();
        let game = session.current_game_mut()?;
        let goal = GoalLedger::record(game, entry, now)?;
        let reached = game.status == GameStatus::Active
            && target.is_some_and(|target| game.team1_score >= target || game.team2_score >= target);

        session.log_event(
            now,
            EventPayload::Goal {
                game_id: goal.game_id.clone(),
                goal_id: goal.id.clone(),
                team_id: goal.team_id.clone(),
                scorer_id: goal.scorer_id.clone(),
                assistant_id: goal.assistant_id.clone(),
                is_own_goal: goal.is_own_goal,
            },
        );

        let finish = reached.then(|| self.finish(session, None));
        Some(GoalOutcome { goal, finish })
    }

    pub fn correct_goal(
        &self,
        session: &mut Session,
        goal_id: &str,
        scorer_id: Option<PlayerId>,
        assistant_id: Option<PlayerId>,
        is_own_goal: bool,
    ) -> Transition {
        let now = self.clock.now();
        // Corrections may target any game of the session, finished ones included
        let Some(game) = session.games.iter_mut().find(|game| game.goals.iter().any(|g| g.id == goal_id))
        else {
            return Transition::Ignored("unknown goal");
        };
        let game_id = game.id.clone();
        GoalLedger::correct(game, goal_id, scorer_id.clone(), assistant_id.clone(), is_own_goal);
        session.log_event(
            now,
            EventPayload::GoalCorrected {
                game_id,
                goal_id: goal_id.to_string(),
                scorer_id,
                assistant_id,
                is_own_goal,
            },
        );
        Transition::Applied
    }

    pub fn remove_goal(&self, session: &mut Session, goal_id: &str) -> Transition {
        let now = self.clock.now();
        let Some(game) = session.current_game_mut() else {
            return Transition::Ignored("no current game");
        };
        let Some(goal) = GoalLedger::remove(game, goal_id) else {
            return Transition::Ignored("unknown goal");
        };
        session.log_event(
            now,
            EventPayload::GoalRemoved { game_id: goal.game_id, goal_id: goal.id },
        );
        Transition::Applied
    }

    /// Finishes the current game, applies rotation and appends the next pending game.
    ///
    /// `manual_winner_id` is only consulted for a draw, where it names the team that
    /// stays on; the game itself is still recorded as a draw.
    pub fn finish(&self, session: &mut Session, manual_winner_id: Option<&str>) -> FinishOutcome {
        let now = self.clock.now();
        let num_teams = session.config.num_teams;
        let Some(game) = session.current_game_mut() else {
            return FinishOutcome::Ignored { reason: "no current game".into() };
        };
        if !game.is_live() {
            return FinishOutcome::Ignored { reason: format!("game {} is {:?}", game.id, game.status) };
        }

        let is_draw = game.team1_score == game.team2_score;
        let manual = manual_winner_id.filter(|id| game.involves(id)).map(str::to_string);
        if is_draw && num_teams == 3 && game.round <= 1 && manual.is_none() {
            return FinishOutcome::TieBreakRequired { game_id: game.id.clone() };
        }

        let elapsed = GameClock::elapsed_seconds(game, now);
        game.elapsed_seconds_on_pause = elapsed;
        game.duration_seconds = Some(elapsed);
        game.is_draw = is_draw;
        game.winner_team_id = match game.team1_score.cmp(&game.team2_score) {
            std::cmp::Ordering::Greater => Some(game.team_id(Side::Team1).clone()),
            std::cmp::Ordering::Less => Some(game.team_id(Side::Team2).clone()),
            std::cmp::Ordering::Equal => None,
        };
        if is_draw {
            game.manual_winner_id = manual;
        }
        game.status = GameStatus::Finished;
        game.finished_at = Some(now);

        let finished = game.clone();
        session.log_event(
            now,
            EventPayload::FinishRound {
                game_id: finished.id.clone(),
                team1_score: finished.team1_score,
                team2_score: finished.team2_score,
                winner_team_id: finished.winner_team_id.clone(),
                is_draw,
            },
        );

        let rotation = RotationEngine::rotate(session);
        let (team1_id, team2_id) = match &rotation {
            Some(decision) => (decision.next_team1_id.clone(), decision.next_team2_id.clone()),
            None => {
                log::warn!("No rotation for game {}, keeping the same pairing", finished.id);
                (finished.team1_id.clone(), finished.team2_id.clone())
            }
        };
        if let Some(decision) = &rotation {
            if num_teams > 2 {
                session.log_event(
                    now,
                    EventPayload::Rotation {
                        left_field: decision.left_field.clone(),
                        entered_field: decision.entered_field.clone(),
                        big_star_team_id: decision.big_star_team_id.clone(),
                    },
                );
            }
        }

        let next = Game::new(session.next_game_id(), finished.round + 1, &team1_id, &team2_id);
        let next_game_id = next.id.clone();
        session.games.push(next);

        log::info!(
            "Round {} finished {}-{}, next {} vs {}",
            finished.round,
            finished.team1_score,
            finished.team2_score,
            team1_id,
            team2_id
        );

        FinishOutcome::Finished {
            game_id: finished.id,
            winner_team_id: finished.winner_team_id,
            is_draw,
            next_game_id,
            rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::models::{RotationMode, SessionConfig, Team};
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn three_team_session(goals_to_win: Option<u32>) -> Session {
        let teams = vec![
            Team::new("A", "Amber", "#fa0").with_players(["a1", "a2", "a3"]),
            Team::new("B", "Blue", "#00f").with_players(["b1", "b2"]),
            Team::new("C", "Coral", "#f77").with_players(["c1", "c2"]),
        ];
        let config = SessionConfig {
            num_teams: 3,
            players_per_team: 2,
            match_duration_minutes: Some(7),
            goals_to_win,
            rotation_mode: RotationMode::AutoRotate,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut session =
            Session::new(Some("s".into()), config, teams, vec![], &mut rng, Utc::now()).unwrap();
        session.games[0].team1_id = "A".into();
        session.games[0].team2_id = "B".into();
        session
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 5, 2, 18, 0, 0).unwrap())
    }

    #[test]
    fn test_lifecycle_accumulates_time_across_pause() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(None);

        assert!(machine.start(&mut session).is_applied());
        assert_eq!(machine.start(&mut session), Transition::Ignored("game already started"));
        clock.advance_seconds(100);
        assert!(machine.pause(&mut session).is_applied());
        clock.advance_seconds(600);
        assert!(machine.resume(&mut session).is_applied());
        clock.advance_seconds(20);

        let reading = machine.observe(&mut session).unwrap();
        assert_eq!(reading.elapsed_seconds, 120);
        assert_eq!(reading.remaining_seconds, Some(300));
    }

    #[test]
    fn test_start_snapshots_lineups() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(None);
        machine.start(&mut session);
        let game = session.current_game().unwrap();
        assert_eq!(game.team1_lineup, vec!["a1", "a2"]);
        assert_eq!(game.team2_lineup, vec!["b1", "b2"]);
    }

    #[test]
    fn test_goals_to_win_finishes_game() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(Some(2));
        machine.start(&mut session);

        let first = machine.record_goal(&mut session, GoalEntry::new("A").scored_by("a1")).unwrap();
        assert!(first.finish.is_none());
        clock.advance_seconds(45);
        let second = machine.record_goal(&mut session, GoalEntry::new("A").scored_by("a2")).unwrap();
        assert_eq!(second.goal.timestamp_seconds, 45);

        match second.finish {
            Some(FinishOutcome::Finished { winner_team_id, next_game_id, .. }) => {
                assert_eq!(winner_team_id.as_deref(), Some("A"));
                assert_eq!(next_game_id, "s-r2");
            }
            other => panic!("expected finished game, got {other:?}"),
        }
        assert_eq!(session.games.len(), 2);
        let next = session.current_game().unwrap();
        assert_eq!((next.team1_id.as_str(), next.team2_id.as_str()), ("A", "C"));
        assert_eq!(next.status, GameStatus::Pending);
    }

    #[test]
    fn test_first_round_draw_waits_for_tie_break() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(None);
        machine.start(&mut session);

        assert!(matches!(machine.finish(&mut session, None), FinishOutcome::TieBreakRequired { .. }));
        assert_eq!(session.games.len(), 1);
        assert!(session.games[0].is_live());

        let outcome = machine.finish(&mut session, Some("B"));
        assert!(matches!(outcome, FinishOutcome::Finished { is_draw: true, .. }));
        assert_eq!(session.games[0].manual_winner_id.as_deref(), Some("B"));
        let next = session.current_game().unwrap();
        assert_eq!((next.team1_id.as_str(), next.team2_id.as_str()), ("C", "B"));
    }

    #[test]
    fn test_finish_from_paused_records_duration() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(None);
        machine.start(&mut session);
        machine.record_goal(&mut session, GoalEntry::new("B"));
        clock.advance_seconds(200);
        machine.pause(&mut session);
        clock.advance_seconds(50);

        machine.finish(&mut session, None);
        let finished = &session.games[0];
        assert_eq!(finished.status, GameStatus::Finished);
        assert_eq!(finished.duration_seconds, Some(200));
        assert_eq!(finished.winner_team_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_finish_pending_game_is_ignored() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(None);
        assert!(matches!(machine.finish(&mut session, None), FinishOutcome::Ignored { .. }));
        assert_eq!(session.games.len(), 1);
    }

    #[test]
    fn test_correct_goal_in_finished_game() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(Some(1));
        machine.start(&mut session);
        let outcome = machine.record_goal(&mut session, GoalEntry::new("A")).unwrap();
        assert!(outcome.finish.is_some());

        let applied = machine.correct_goal(&mut session, &outcome.goal.id, Some("a3".into()), None, false);
        assert!(applied.is_applied());
        assert_eq!(session.games[0].goals[0].scorer_id.as_deref(), Some("a3"));
        assert_eq!(session.games[0].team1_score, 1);
    }

    #[test]
    fn test_remove_goal_after_correcting_to_own_goal() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(None);
        machine.start(&mut session);
        clock.advance_seconds(30);
        let goal = machine.record_goal(&mut session, GoalEntry::new("A").scored_by("a1")).unwrap().goal;

        assert!(machine.correct_goal(&mut session, &goal.id, Some("a1".into()), None, true).is_applied());
        assert!(machine.remove_goal(&mut session, &goal.id).is_applied());

        let game = session.current_game().unwrap();
        assert!(game.goals.is_empty());
        assert_eq!((game.team1_score, game.team2_score), (0, 0));
    }

    #[test]
    fn test_event_log_records_round() {
        let clock = clock();
        let machine = MatchStateMachine::new(&clock);
        let mut session = three_team_session(Some(1));
        machine.start(&mut session);
        machine.record_goal(&mut session, GoalEntry::new("B").scored_by("b1"));

        let kinds: Vec<&str> = session
            .event_log
            .iter()
            .map(|entry| match entry.payload {
                EventPayload::StartRound { .. } => "start",
                EventPayload::Goal { .. } => "goal",
                EventPayload::FinishRound { .. } => "finish",
                EventPayload::Rotation { .. } => "rotation",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["start", "goal", "finish", "rotation"]);
    }
}
