use super::types::{BadgeKind, CareerCounter};
use crate::config::BadgeThresholds;
use crate::models::CareerStats;
use crate::stats::{PlayerGameLine, PlayerStats, SessionStats};

/// Score a perfect finish must end on. Kept literal, independent of the
/// session's `goals_to_win`.
pub const PERFECT_FINISH_SCORE: u32 = 2;

/// Everything a badge predicate may look at for one player.
pub struct BadgeContext<'a> {
    pub stats: &'a PlayerStats,
    pub session: &'a SessionStats,
    /// Career totals before the session was merged
    pub career_before: &'a CareerStats,
    /// Career totals after the session was merged
    pub career_after: &'a CareerStats,
}

pub struct BadgeEngine<'a> {
    thresholds: &'a BadgeThresholds,
}

impl<'a> BadgeEngine<'a> {
    pub fn new(thresholds: &'a BadgeThresholds) -> Self {
        Self { thresholds }
    }

    /// Badges earned this session, in declaration order.
    ///
    /// A player with no games earns nothing, career badges included.
    pub fn evaluate(&self, ctx: &BadgeContext<'_>) -> Vec<BadgeKind> {
        if ctx.stats.games_played == 0 {
            return Vec::new();
        }
        BadgeKind::ALL
            .into_iter()
            .filter(|kind| self.is_earned(*kind, ctx))
            .collect()
    }

    fn is_earned(&self, kind: BadgeKind, ctx: &BadgeContext<'_>) -> bool {
        let t = self.thresholds;
        let stats = ctx.stats;
        let count = |pred: fn(&PlayerGameLine, &BadgeThresholds) -> bool| {
            stats.games.iter().filter(|line| pred(line, t)).count() as u32
        };

        match kind {
            BadgeKind::Goleador => stats.goals >= t.goleador_goals,
            BadgeKind::AssistKing => stats.assists >= t.assist_king_assists,
            BadgeKind::Mvp => {
                stats.goals >= t.mvp_goals && stats.assists >= t.mvp_assists && stats.wins >= t.mvp_wins
            }

            BadgeKind::HatTrick => count(|l, t| l.goals >= t.hat_trick_goals_in_game) >= 1,
            BadgeKind::Duplet => count(|l, t| l.goals >= t.duplet_goals_in_game) >= t.duplet_games,
            BadgeKind::Maestro => {
                count(|l, t| l.assists >= t.maestro_assists_in_game) >= t.maestro_games
            }
            BadgeKind::Fortress => count(|l, _| l.clean_sheet) >= t.fortress_games,
            BadgeKind::Sniper => count(is_sniper_game) >= t.sniper_games,
            BadgeKind::FirstBlood => count(|l, _| l.scored_first_goal) >= t.first_blood_games,
            BadgeKind::ComebackKings => count(|l, _| l.is_comeback_win()) >= t.comeback_games,
            BadgeKind::PerfectFinish => count(is_perfect_finish) >= t.perfect_finish_games,

            BadgeKind::Dynasty => stats.longest_win_streak() >= t.dynasty_streak,
            BadgeKind::Unbeatable => stats.games_played >= t.unbeatable_games && stats.losses == 0,
            BadgeKind::IronMan => stats.games_played >= t.iron_man_games,

            BadgeKind::UnsungHero => self.is_unsung_hero(ctx),
            BadgeKind::DecisiveFactor => {
                stats.wins >= t.decisive_factor_wins
                    && stats.games.iter().filter(|l| l.is_win()).all(PlayerGameLine::contributed)
            }

            _ => kind
                .career_threshold()
                .map(|(counter, threshold)| {
                    let before = career_value(ctx.career_before, counter);
                    let after = career_value(ctx.career_after, counter);
                    before < threshold && after >= threshold
                })
                .unwrap_or(false),
        }
    }

    /// Zero goals and assists while playing for the session's winningest team.
    fn is_unsung_hero(&self, ctx: &BadgeContext<'_>) -> bool {
        if ctx.stats.goals > 0 || ctx.stats.assists > 0 {
            return false;
        }
        let Some(most_wins) = ctx.session.most_team_wins() else {
            return false;
        };
        let team_wins = ctx
            .stats
            .main_team_id()
            .and_then(|team_id| ctx.session.teams.get(team_id))
            .map(|team| team.wins)
            .unwrap_or(0);
        team_wins == most_wins && team_wins >= self.thresholds.unsung_hero_team_wins
    }
}

/// Scored the last goal of a game won by exactly one.
fn is_sniper_game(line: &PlayerGameLine, _: &BadgeThresholds) -> bool {
    line.scored_last_goal && line.is_win() && line.goal_difference() == 1
}

fn is_perfect_finish(line: &PlayerGameLine, _: &BadgeThresholds) -> bool {
    line.is_win() && line.goals_for == PERFECT_FINISH_SCORE && line.goals_against == 0
}

fn career_value(career: &CareerStats, counter: CareerCounter) -> u32 {
    match counter {
        CareerCounter::Goals => career.goals,
        CareerCounter::Assists => career.assists,
        CareerCounter::Sessions => career.sessions,
    }
}
