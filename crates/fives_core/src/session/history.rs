use crate::models::{CareerStats, MonthlyStats, PlayerRecords, RecordEntry};
use crate::stats::PlayerStats;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Pushes to the back, dropping from the front once `cap` is reached.
pub fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, cap: usize) {
    if cap == 0 {
        buffer.clear();
        return;
    }
    while buffer.len() >= cap {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

pub fn merge_career(career: &CareerStats, stats: &PlayerStats) -> CareerStats {
    CareerStats {
        goals: career.goals + stats.goals,
        assists: career.assists + stats.assists,
        own_goals: career.own_goals + stats.own_goals,
        games: career.games + stats.games_played,
        wins: career.wins + stats.wins,
        draws: career.draws + stats.draws,
        losses: career.losses + stats.losses,
        clean_sheets: career.clean_sheets + stats.clean_sheets,
        sessions: career.sessions + 1,
    }
}

/// Adds the session to the monthly counters, starting over when the session
/// falls in a different calendar month than the player's last one.
pub fn merge_monthly(
    monthly: &MonthlyStats,
    last_played_at: Option<DateTime<Utc>>,
    stats: &PlayerStats,
    played_at: DateTime<Utc>,
) -> MonthlyStats {
    let period = MonthlyStats::period_of(played_at);
    let same_month = last_played_at.map(MonthlyStats::period_of) == Some(period);
    let base = if same_month && monthly.period == Some(period) {
        monthly.clone()
    } else {
        MonthlyStats { period: Some(period), ..Default::default() }
    };
    MonthlyStats {
        period: Some(period),
        goals: base.goals + stats.goals,
        assists: base.assists + stats.assists,
        games: base.games + stats.games_played,
        wins: base.wins + stats.wins,
        sessions: base.sessions + 1,
    }
}

/// Replaces each record the session ties or beats.
pub fn update_records(
    records: &mut PlayerRecords,
    stats: &PlayerStats,
    session_id: &str,
    at: DateTime<Utc>,
) {
    if stats.games_played == 0 {
        return;
    }
    let entry = |value: f64| RecordEntry { value, session_id: session_id.to_string(), achieved_at: at };
    let beats = |current: &Option<RecordEntry>, value: f64| {
        current.as_ref().map_or(true, |record| value >= record.value)
    };

    let goals = stats.goals as f64;
    if beats(&records.most_goals, goals) {
        records.most_goals = Some(entry(goals));
    }
    let assists = stats.assists as f64;
    if beats(&records.most_assists, assists) {
        records.most_assists = Some(entry(assists));
    }
    let win_rate = stats.win_rate();
    if beats(&records.best_win_rate, win_rate) {
        records.best_win_rate = Some(entry(win_rate));
    }
}
