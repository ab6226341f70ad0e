use super::history::{merge_career, merge_monthly, push_bounded, update_records};
use crate::badges::{BadgeContext, BadgeEngine};
use crate::config::EngineConfig;
use crate::models::{Form, HistoryPoint, NewsItem, Player, Session, SessionHistoryEntry, SessionStatus};
use crate::news::NewsGenerator;
use crate::rating::{RatingBreakdown, RatingEngine};
use crate::stats::{PlayerStats, SessionStats, StatisticsAggregator};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything produced by closing a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    /// Completed session with unfinished rounds dropped
    pub session: Session,
    /// Full club roster, in input order
    pub players: Vec<Player>,
    /// Participants and penalized players; the only records that need saving
    pub written: Vec<Player>,
    pub breakdowns: Vec<RatingBreakdown>,
    pub news_feed: Vec<NewsItem>,
    pub stats: SessionStats,
}

struct PlayerUpdate {
    player: Player,
    breakdown: Option<RatingBreakdown>,
}

impl PlayerUpdate {
    fn untouched(player: Player) -> Self {
        Self { player, breakdown: None }
    }
}

pub struct SessionProcessor<'a> {
    config: &'a EngineConfig,
}

impl<'a> SessionProcessor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Closes `session` against the club roster.
    ///
    /// Pure: inputs are never modified and the same inputs give the same
    /// outcome. The session's `completed_at` (or `now` when unset) stamps the
    /// history entries and news items; `now` only drives news expiry.
    pub fn process(
        &self,
        session: &Session,
        players: &[Player],
        news_feed: &[NewsItem],
        now: DateTime<Utc>,
    ) -> SessionOutcome {
        let played_at = session.completed_at.unwrap_or(now);
        let stats = StatisticsAggregator::aggregate(session);

        let updates: Vec<PlayerUpdate> = players
            .par_iter()
            .map(|player| match stats.player(&player.id) {
                Some(player_stats) if player_stats.games_played > 0 => {
                    self.participated(player, player_stats, &stats, &session.id, played_at)
                }
                _ => self.missed(player, &session.id, played_at),
            })
            .collect();

        let mut updated = Vec::with_capacity(updates.len());
        let mut written = Vec::new();
        let mut breakdowns = Vec::new();
        for update in updates {
            if let Some(breakdown) = update.breakdown {
                written.push(update.player.clone());
                breakdowns.push(breakdown);
            }
            updated.push(update.player);
        }

        let news = NewsGenerator::new(&self.config.news);
        let fresh = news.generate(players, &updated, &session.id, played_at);
        let news_feed = news.merge_feed(fresh, news_feed, now);

        let mut final_session = session.clone();
        final_session.games.retain(|game| game.is_finished());
        final_session.status = SessionStatus::Completed;
        final_session.completed_at = Some(played_at);

        log::info!(
            "Processed session {}: {} games, {} players written, {} news items",
            session.id,
            final_session.games.len(),
            written.len(),
            news_feed.len()
        );

        SessionOutcome {
            session: final_session,
            players: updated,
            written,
            breakdowns,
            news_feed,
            stats,
        }
    }

    fn participated(
        &self,
        player: &Player,
        stats: &PlayerStats,
        session_stats: &SessionStats,
        session_id: &str,
        played_at: DateTime<Utc>,
    ) -> PlayerUpdate {
        let cfg = &self.config.processor;
        let career = merge_career(&player.career, stats);

        let badges = BadgeEngine::new(&self.config.badges).evaluate(&BadgeContext {
            stats,
            session: session_stats,
            career_before: &player.career,
            career_after: &career,
        });
        let breakdown = RatingEngine::new(&self.config.rating).rate(player, stats, &badges, session_id);

        let mut next = player.clone();
        next.monthly = merge_monthly(&player.monthly, player.last_played_at, stats, played_at);
        next.career = career;
        next.set_rating(breakdown.new_rating);
        for badge in &badges {
            *next.badges.entry(*badge).or_insert(0) += 1;
        }
        next.form = Form::from_delta(breakdown.delta, cfg.form_threshold);
        push_bounded(
            &mut next.session_history,
            SessionHistoryEntry {
                session_id: session_id.to_string(),
                played_at,
                rating_before: player.rating,
                rating_after: next.rating,
                delta: breakdown.delta,
                games: stats.games_played,
                goals: stats.goals,
                assists: stats.assists,
                wins: stats.wins,
                badges,
                penalty: false,
            },
            cfg.session_history_cap,
        );
        push_bounded(
            &mut next.history_data,
            HistoryPoint { at: played_at, rating: next.rating },
            cfg.history_data_cap,
        );
        update_records(&mut next.records, stats, session_id, played_at);
        next.consecutive_missed_sessions = 0;
        next.last_played_at = Some(played_at);

        PlayerUpdate { player: next, breakdown: Some(breakdown) }
    }

    fn missed(&self, player: &Player, session_id: &str, played_at: DateTime<Utc>) -> PlayerUpdate {
        let cfg = &self.config.processor;
        let mut next = player.clone();
        next.consecutive_missed_sessions += 1;

        let due = cfg.penalty_interval > 0
            && next.consecutive_missed_sessions % cfg.penalty_interval == 0;
        if !due || next.is_immune_to_penalty {
            return PlayerUpdate::untouched(next);
        }

        let breakdown =
            RatingEngine::new(&self.config.rating).penalty(player, cfg.penalty_step, session_id);
        next.set_rating(breakdown.new_rating);
        log::debug!(
            "inactivity penalty {}: {} missed, {} -> {}",
            player.id,
            next.consecutive_missed_sessions,
            player.rating,
            next.rating
        );
        push_bounded(
            &mut next.session_history,
            SessionHistoryEntry {
                session_id: session_id.to_string(),
                played_at,
                rating_before: player.rating,
                rating_after: next.rating,
                delta: breakdown.delta,
                games: 0,
                goals: 0,
                assists: 0,
                wins: 0,
                badges: Vec::new(),
                penalty: true,
            },
            cfg.session_history_cap,
        );
        push_bounded(
            &mut next.history_data,
            HistoryPoint { at: played_at, rating: next.rating },
            cfg.history_data_cap,
        );

        PlayerUpdate { player: next, breakdown: Some(breakdown) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Clock, GoalEntry, ManualClock, MatchStateMachine};
    use crate::models::{SessionConfig, Team};
    use crate::rating::Tier;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 19, 0, 0).unwrap()
    }

    fn club() -> Vec<Player> {
        let mut players: Vec<Player> = ["a1", "a2", "b1", "b2"]
            .iter()
            .map(|id| Player::new(*id, id.to_uppercase(), 60))
            .collect();
        let mut absent = Player::new("z1", "Zed", 68);
        absent.rating = 70;
        absent.consecutive_missed_sessions = 4;
        players.push(absent);
        players
    }

    /// Two-team session where A wins 2-0 and B wins 2-1, plus one pending round.
    fn played_session(clock: &ManualClock) -> Session {
        let config = SessionConfig {
            num_teams: 2,
            players_per_team: 2,
            goals_to_win: Some(2),
            ..SessionConfig::default()
        };
        let teams = vec![
            Team::new("A", "Alpha", "#f00").with_players(["a1", "a2"]),
            Team::new("B", "Beta", "#00f").with_players(["b1", "b2"]),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut session =
            Session::new(Some("s1".into()), config, teams, club(), &mut rng, clock.now()).unwrap();
        let machine = MatchStateMachine::new(clock);

        machine.start(&mut session);
        clock.advance_seconds(60);
        machine.record_goal(&mut session, GoalEntry::new("A").scored_by("a1").assisted_by("a2"));
        clock.advance_seconds(60);
        machine.record_goal(&mut session, GoalEntry::new("A").scored_by("a1"));

        machine.start(&mut session);
        clock.advance_seconds(30);
        machine.record_goal(&mut session, GoalEntry::new("A").scored_by("a2"));
        clock.advance_seconds(30);
        machine.record_goal(&mut session, GoalEntry::new("B").scored_by("b1"));
        clock.advance_seconds(30);
        machine.record_goal(&mut session, GoalEntry::new("B").scored_by("b2").assisted_by("b1"));
        session
    }

    #[test]
    fn test_process_session_end_to_end() {
        let clock = ManualClock::new(start());
        let session = played_session(&clock);
        assert_eq!(session.finished_games().count(), 2);
        assert_eq!(session.games.len(), 3);

        let config = EngineConfig::default();
        let outcome = SessionProcessor::new(&config).process(&session, &club(), &[], clock.now());

        assert_eq!(outcome.session.status, SessionStatus::Completed);
        assert_eq!(outcome.session.games.len(), 2);
        assert_eq!(outcome.players.len(), 5);

        let a1 = &outcome.players[0];
        assert_eq!(a1.career.goals, 2);
        assert_eq!(a1.career.games, 2);
        assert_eq!(a1.career.sessions, 1);
        assert_eq!(a1.session_history.len(), 1);
        assert_eq!(a1.history_data.len(), 1);
        assert_eq!(a1.consecutive_missed_sessions, 0);
        assert_eq!(a1.monthly.period, Some((2024, 6)));
        assert!(a1.records.most_goals.is_some());

        // four participants plus the penalized absentee
        assert_eq!(outcome.written.len(), 5);
        assert_eq!(outcome.breakdowns.len(), 5);
    }

    #[test]
    fn test_fifth_missed_session_costs_one_point() {
        let clock = ManualClock::new(start());
        let session = played_session(&clock);
        let config = EngineConfig::default();
        let outcome = SessionProcessor::new(&config).process(&session, &club(), &[], clock.now());

        let absent = outcome.players.iter().find(|p| p.id == "z1").unwrap();
        assert_eq!(absent.rating, 69);
        assert_eq!(absent.tier, Tier::Regular);
        assert_eq!(absent.consecutive_missed_sessions, 5);
        let penalties: Vec<_> = outcome.breakdowns.iter().filter(|b| b.is_penalty).collect();
        assert_eq!(penalties.len(), 1);
        assert_eq!(penalties[0].player_id, "z1");
        assert!(absent.session_history.back().unwrap().penalty);
    }

    #[test]
    fn test_immune_and_off_cycle_absentees_are_not_written() {
        let clock = ManualClock::new(start());
        let session = played_session(&clock);
        let mut players = club();
        players[4].is_immune_to_penalty = true;
        let mut casual = Player::new("z2", "Zoe", 65);
        casual.consecutive_missed_sessions = 1;
        players.push(casual);

        let config = EngineConfig::default();
        let outcome = SessionProcessor::new(&config).process(&session, &players, &[], clock.now());
        assert_eq!(outcome.written.len(), 4);
        assert_eq!(outcome.players[4].rating, 70);
        assert_eq!(outcome.players[4].consecutive_missed_sessions, 5);
        assert_eq!(outcome.players[5].consecutive_missed_sessions, 2);
    }

    #[test]
    fn test_processing_is_repeatable() {
        let clock = ManualClock::new(start());
        let session = played_session(&clock);
        let config = EngineConfig::default();
        let processor = SessionProcessor::new(&config);
        let now = clock.now();
        let first = processor.process(&session, &club(), &[], now);
        let second = processor.process(&session, &club(), &[], now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_badge_counts_accumulate() {
        let clock = ManualClock::new(start());
        let session = played_session(&clock);
        let mut players = club();
        players[0].badges.insert(crate::badges::BadgeKind::Duplet, 2);
        let config = EngineConfig::default();
        let outcome = SessionProcessor::new(&config).process(&session, &players, &[], clock.now());
        // a1 scored twice in one game only; earlier count is kept
        assert_eq!(outcome.players[0].badge_count(crate::badges::BadgeKind::Duplet), 2);
    }
}
