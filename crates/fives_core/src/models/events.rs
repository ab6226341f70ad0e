use super::{PlayerId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry of the session's append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub at: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    StartRound {
        game_id: String,
        round: u32,
        team1_id: TeamId,
        team2_id: TeamId,
    },
    Pause {
        game_id: String,
        elapsed_seconds: u64,
    },
    Resume {
        game_id: String,
    },
    Goal {
        game_id: String,
        goal_id: String,
        team_id: TeamId,
        scorer_id: Option<PlayerId>,
        assistant_id: Option<PlayerId>,
        is_own_goal: bool,
    },
    GoalCorrected {
        game_id: String,
        goal_id: String,
        scorer_id: Option<PlayerId>,
        assistant_id: Option<PlayerId>,
        is_own_goal: bool,
    },
    GoalRemoved {
        game_id: String,
        goal_id: String,
    },
    FinishRound {
        game_id: String,
        team1_score: u32,
        team2_score: u32,
        winner_team_id: Option<TeamId>,
        is_draw: bool,
    },
    Rotation {
        left_field: Vec<TeamId>,
        entered_field: Vec<TeamId>,
        big_star_team_id: Option<TeamId>,
    },
    Substitution {
        team_id: TeamId,
        player_out: PlayerId,
        player_in: PlayerId,
    },
    Loan {
        player_id: PlayerId,
        from_team_id: TeamId,
        to_team_id: TeamId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_tagged_by_kind() {
        let payload = EventPayload::Resume { game_id: "r1".into() };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "resume");
        assert_eq!(json["game_id"], "r1");

        let back: EventPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
