use super::breakdown::RatingBreakdown;
use crate::badges::BadgeKind;
use crate::config::RatingConfig;
use crate::models::{Player, Skill};
use crate::stats::{GameOutcome, PlayerGameLine, PlayerStats};

/// Experience-scaled rating update.
pub struct RatingEngine<'a> {
    config: &'a RatingConfig,
}

impl<'a> RatingEngine<'a> {
    pub fn new(config: &'a RatingConfig) -> Self {
        Self { config }
    }

    /// Contextual points for the result of one game.
    pub fn team_points(&self, line: &PlayerGameLine) -> f64 {
        let p = &self.config.team_points;
        let margin = line.goal_difference();
        let dominant = p.dominant_margin as i32;
        match line.outcome {
            GameOutcome::Draw => p.draw,
            GameOutcome::Win if line.trailed => p.comeback_win,
            GameOutcome::Win if margin >= dominant => p.dominant_win,
            GameOutcome::Win => p.win,
            GameOutcome::Loss if margin <= -dominant => p.heavy_loss,
            GameOutcome::Loss => p.loss,
        }
    }

    /// Skill-weighted personal contribution in one game.
    pub fn individual_points(&self, player: &Player, line: &PlayerGameLine) -> f64 {
        let p = &self.config.individual_points;
        let mut points = 0.0;
        if line.clean_sheet {
            points += if player.is_defensive() { p.clean_sheet_defensive } else { p.clean_sheet };
        }
        let goal_weight = if player.has_skill(Skill::Attacker) { p.goal_attacker } else { p.goal };
        let assist_weight =
            if player.has_skill(Skill::Playmaker) { p.assist_playmaker } else { p.assist };
        points += line.goals as f64 * goal_weight;
        points += line.assists as f64 * assist_weight;
        points += line.own_goals as f64 * p.own_goal;
        points
    }

    /// Rates one session. `player` is the snapshot before the session was merged,
    /// so `career.sessions` counts the sessions played before this one.
    pub fn rate(
        &self,
        player: &Player,
        stats: &PlayerStats,
        badges: &[BadgeKind],
        session_id: &str,
    ) -> RatingBreakdown {
        if stats.games_played == 0 || stats.games.is_empty() {
            return RatingBreakdown::unchanged(&player.id, session_id, player.rating);
        }
        let cfg = self.config;
        let games = stats.games.len() as f64;

        let avg_team_points = stats.games.iter().map(|l| self.team_points(l)).sum::<f64>() / games;
        let avg_individual_points =
            stats.games.iter().map(|l| self.individual_points(player, l)).sum::<f64>() / games;
        let badge_bonus: f64 = badges.iter().map(BadgeKind::rating_bonus).sum();

        let avg_match_rating =
            cfg.base_match_rating + avg_team_points + avg_individual_points + badge_bonus;
        let performance_level =
            (avg_match_rating * 10.0).clamp(cfg.performance_min, cfg.performance_max);

        let sessions = player.career.sessions;
        let k_factor = cfg.k_factor(sessions);
        let mut delta = (performance_level - player.rating as f64) * k_factor;

        let win_rate = stats.win_rate();
        let win_rate_adjustment = if win_rate >= cfg.high_win_rate {
            cfg.win_rate_nudge
        } else if win_rate <= cfg.low_win_rate {
            -cfg.win_rate_nudge
        } else {
            0.0
        };
        delta += win_rate_adjustment;

        let silent =
            stats.wins == 0 && stats.goals == 0 && stats.assists == 0 && stats.clean_sheets == 0;
        let zero_contribution_adjustment = if silent { cfg.zero_contribution_penalty } else { 0.0 };
        delta += zero_contribution_adjustment;

        let cap = cfg.delta_cap(sessions);
        let delta = delta.clamp(-cap, cap);
        let new_rating = self.bounded(player, (player.rating as f64 + delta).round());

        log::debug!(
            "rating {}: perf {:.1} k {:.2} delta {:+.2} ({} -> {})",
            player.id,
            performance_level,
            k_factor,
            delta,
            player.rating,
            new_rating
        );

        RatingBreakdown {
            player_id: player.id.clone(),
            session_id: session_id.to_string(),
            previous_rating: player.rating,
            new_rating,
            games_played: stats.games_played,
            avg_team_points,
            avg_individual_points,
            badge_bonus,
            badges: badges.to_vec(),
            avg_match_rating,
            performance_level,
            k_factor,
            win_rate_adjustment,
            zero_contribution_adjustment,
            delta,
            is_penalty: false,
        }
    }

    /// Inactivity step down, clamped at the player's floor.
    pub fn penalty(&self, player: &Player, step: u8, session_id: &str) -> RatingBreakdown {
        let new_rating = self.bounded(player, player.rating.saturating_sub(step) as f64);
        RatingBreakdown {
            is_penalty: true,
            delta: new_rating as f64 - player.rating as f64,
            new_rating,
            ..RatingBreakdown::unchanged(&player.id, session_id, player.rating)
        }
    }

    fn bounded(&self, player: &Player, rating: f64) -> u8 {
        let ceiling = self.config.rating_ceiling.max(player.initial_rating) as f64;
        rating.clamp(player.initial_rating as f64, ceiling) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(outcome: GameOutcome, goals_for: u32, goals_against: u32, goals: u32) -> PlayerGameLine {
        PlayerGameLine {
            game_id: "g".into(),
            round: 1,
            team_id: "A".into(),
            outcome,
            goals_for,
            goals_against,
            goals,
            assists: 0,
            own_goals: 0,
            clean_sheet: goals_against == 0,
            trailed: false,
            scored_first_goal: false,
            scored_last_goal: false,
        }
    }

    fn stats_of(lines: Vec<PlayerGameLine>) -> PlayerStats {
        let mut stats = PlayerStats { player_id: "p1".into(), ..Default::default() };
        for l in lines {
            stats.goals += l.goals;
            stats.assists += l.assists;
            stats.own_goals += l.own_goals;
            stats.games_played += 1;
            match l.outcome {
                GameOutcome::Win => stats.wins += 1,
                GameOutcome::Draw => stats.draws += 1,
                GameOutcome::Loss => stats.losses += 1,
            }
            stats.clean_sheets += l.clean_sheet as u32;
            stats.games.push(l);
        }
        stats
    }

    #[test]
    fn test_new_player_ten_points_above_gets_two_and_half() {
        let config = RatingConfig::default();
        let engine = RatingEngine::new(&config);
        let player = Player::new("p1", "Ana", 60);
        // team avg 0.25, individual avg 0.75 -> 7.0 -> performance 70
        let stats = stats_of(vec![
            line(GameOutcome::Win, 2, 1, 2),
            line(GameOutcome::Win, 2, 1, 1),
            line(GameOutcome::Loss, 1, 2, 0),
            line(GameOutcome::Loss, 0, 1, 0),
        ]);
        let breakdown = engine.rate(&player, &stats, &[], "s1");
        assert!((breakdown.performance_level - 70.0).abs() < 1e-9);
        assert!((breakdown.delta - 2.5).abs() < 1e-9);
        assert_eq!(breakdown.new_rating, 63);
        assert!(!breakdown.is_penalty);
    }

    #[test]
    fn test_team_points_comeback_overrides_dominant() {
        let config = RatingConfig::default();
        let engine = RatingEngine::new(&config);
        let mut win = line(GameOutcome::Win, 4, 1, 0);
        assert_eq!(engine.team_points(&win), 1.3);
        win.trailed = true;
        assert_eq!(engine.team_points(&win), 1.5);
        assert_eq!(engine.team_points(&line(GameOutcome::Loss, 0, 2, 0)), -0.8);
        assert_eq!(engine.team_points(&line(GameOutcome::Loss, 1, 2, 0)), -0.5);
        assert_eq!(engine.team_points(&line(GameOutcome::Draw, 1, 1, 0)), 0.4);
    }

    #[test]
    fn test_individual_points_use_skill_weights() {
        let config = RatingConfig::default();
        let engine = RatingEngine::new(&config);
        let keeper = Player::new("k", "Keeper", 60).with_skills(&[Skill::Goalkeeper]);
        let striker = Player::new("s", "Striker", 60).with_skills(&[Skill::Attacker]);
        let cs = line(GameOutcome::Win, 1, 0, 1);
        assert!((engine.individual_points(&keeper, &cs) - 3.0).abs() < 1e-9);
        assert!((engine.individual_points(&striker, &cs) - 2.2).abs() < 1e-9);

        let mut og = line(GameOutcome::Loss, 0, 1, 0);
        og.own_goals = 1;
        assert!((engine.individual_points(&striker, &og) + 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_games_is_unchanged() {
        let config = RatingConfig::default();
        let player = Player::new("p1", "Ana", 70);
        let breakdown = RatingEngine::new(&config).rate(&player, &PlayerStats::default(), &[], "s1");
        assert_eq!(breakdown.new_rating, 70);
        assert_eq!(breakdown.delta, 0.0);
    }

    #[test]
    fn test_never_drops_below_initial_rating() {
        let config = RatingConfig::default();
        let engine = RatingEngine::new(&config);
        let player = Player::new("p1", "Ana", 80);
        let stats = stats_of(vec![line(GameOutcome::Loss, 0, 5, 0); 4]);
        let breakdown = engine.rate(&player, &stats, &[], "s1");
        assert!(breakdown.delta < 0.0);
        assert_eq!(breakdown.new_rating, 80);
    }

    #[test]
    fn test_penalty_steps_down_to_floor() {
        let config = RatingConfig::default();
        let engine = RatingEngine::new(&config);
        let mut player = Player::new("p1", "Ana", 68);
        player.rating = 70;
        let breakdown = engine.penalty(&player, 1, "s1");
        assert_eq!(breakdown.new_rating, 69);
        assert!(breakdown.is_penalty);

        player.rating = 68;
        let breakdown = engine.penalty(&player, 1, "s1");
        assert_eq!(breakdown.new_rating, 68);
        assert_eq!(breakdown.delta, 0.0);
    }

    #[test]
    fn test_win_rate_nudge_boundaries() {
        let config = RatingConfig::default();
        let engine = RatingEngine::new(&config);
        let player = Player::new("p1", "Ana", 60);
        let win = line(GameOutcome::Win, 2, 1, 1);
        let loss = line(GameOutcome::Loss, 1, 2, 1);

        let three_of_four = stats_of(vec![win.clone(), win.clone(), win.clone(), loss.clone()]);
        assert_eq!(engine.rate(&player, &three_of_four, &[], "s1").win_rate_adjustment, 0.3);

        let two_of_three = stats_of(vec![win.clone(), win.clone(), loss.clone()]);
        assert_eq!(engine.rate(&player, &two_of_three, &[], "s1").win_rate_adjustment, 0.0);

        let one_of_five = stats_of(vec![win.clone(), loss.clone(), loss.clone(), loss.clone(), loss.clone()]);
        assert_eq!(engine.rate(&player, &one_of_five, &[], "s1").win_rate_adjustment, -0.3);

        let one_of_four = stats_of(vec![win, loss.clone(), loss.clone(), loss]);
        assert_eq!(engine.rate(&player, &one_of_four, &[], "s1").win_rate_adjustment, 0.0);
    }

    #[test]
    fn test_zero_contribution_penalty() {
        let config = RatingConfig::default();
        let engine = RatingEngine::new(&config);
        let player = Player::new("p1", "Ana", 60);

        let silent = stats_of(vec![line(GameOutcome::Loss, 0, 1, 0), line(GameOutcome::Draw, 1, 1, 0)]);
        let breakdown = engine.rate(&player, &silent, &[], "s1");
        assert_eq!(breakdown.zero_contribution_adjustment, -0.5);
        assert_eq!(breakdown.win_rate_adjustment, -0.3);

        let scored = stats_of(vec![line(GameOutcome::Loss, 1, 2, 1), line(GameOutcome::Draw, 1, 1, 0)]);
        assert_eq!(engine.rate(&player, &scored, &[], "s1").zero_contribution_adjustment, 0.0);

        // A goalless draw is a clean sheet
        let kept_clean = stats_of(vec![line(GameOutcome::Draw, 0, 0, 0)]);
        assert_eq!(engine.rate(&player, &kept_clean, &[], "s1").zero_contribution_adjustment, 0.0);
    }

    fn arb_line() -> impl Strategy<Value = PlayerGameLine> {
        (0u32..6, 0u32..6, 0u32..4, 0u32..3, 0u32..2, any::<bool>()).prop_map(
            |(gf, ga, goals, assists, own_goals, trailed)| {
                let outcome = match gf.cmp(&ga) {
                    std::cmp::Ordering::Greater => GameOutcome::Win,
                    std::cmp::Ordering::Equal => GameOutcome::Draw,
                    std::cmp::Ordering::Less => GameOutcome::Loss,
                };
                PlayerGameLine {
                    assists,
                    own_goals,
                    trailed,
                    ..line(outcome, gf, ga, goals.min(gf))
                }
            },
        )
    }

    proptest! {
        #[test]
        fn prop_delta_within_cap_and_floor_holds(
            lines in prop::collection::vec(arb_line(), 1..15),
            initial in 40u8..90,
            above in 0u8..10,
            sessions in 0u32..40,
            defensive in any::<bool>(),
        ) {
            let config = RatingConfig::default();
            let engine = RatingEngine::new(&config);
            let mut player = Player::new("p1", "Ana", initial);
            player.rating = initial + above;
            player.career.sessions = sessions;
            if defensive {
                player.skills.push(Skill::Defender);
            }
            let badges = [BadgeKind::Mvp, BadgeKind::Dynasty];
            let breakdown = engine.rate(&player, &stats_of(lines), &badges, "s1");
            let cap = config.delta_cap(sessions);
            prop_assert!(breakdown.delta.abs() <= cap + 1e-9);
            prop_assert!(breakdown.new_rating >= player.initial_rating);
            prop_assert!(breakdown.new_rating <= config.rating_ceiling);
        }
    }
}
