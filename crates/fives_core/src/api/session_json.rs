//! JSON API for session operations
//!
//! String-in, string-out entry points for host applications. Every call
//! answers with an [`ApiResponse`] envelope, including on malformed input.

use crate::config::{self, EngineConfig};
use crate::engine::{Clock, FinishOutcome, ManualClock, MatchStateMachine, RotationDecision, RotationEngine, SystemClock};
use crate::models::{NewsItem, Player, Session};
use crate::session::{SessionOutcome, SessionProcessor};
use crate::stats::{SessionSummary, StatisticsAggregator};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, warn};

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Structured API error with codes and details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self { code: code.to_string(), message: message.to_string(), details: None }
    }

    pub fn with_details(
        code: &str,
        message: &str,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self { code: code.to_string(), message: message.to_string(), details: Some(details) }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Close a session and recompute the club
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSessionRequest {
    pub schema_version: Option<String>,
    pub session: Session,
    pub players: Vec<Player>,
    #[serde(default)]
    pub news_feed: Vec<NewsItem>,
    /// Defaults to the current time
    pub now: Option<DateTime<Utc>>,
    /// Defaults to the file named by `FIVES_ENGINE_CONFIG_PATH`, else built-ins
    pub config: Option<EngineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishGameRequest {
    pub schema_version: Option<String>,
    pub session: Session,
    /// Team that stays on after a draw
    pub manual_winner_id: Option<String>,
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishGameResponse {
    pub session: Session,
    pub outcome: FinishOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionQueryRequest {
    pub schema_version: Option<String>,
    pub session: Session,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationPreviewResponse {
    /// `None` until the current round is finished
    pub decision: Option<RotationDecision>,
    pub resting_team_ids: Vec<String>,
}

fn respond<T: Serialize>(response: ApiResponse<T>) -> String {
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

fn parse<R: DeserializeOwned>(request_json: &str, name: &str) -> Result<R, ApiError> {
    serde_json::from_str(request_json).map_err(|e| {
        error!("Failed to parse {}: {}", name, e);
        ApiError::new("INVALID_JSON", &format!("Invalid JSON format: {}", e))
    })
}

fn check_schema(version: Option<&str>) -> Result<(), ApiError> {
    match version {
        Some(v) if v != API_VERSION => {
            let mut details = HashMap::new();
            details.insert("expected".to_string(), serde_json::Value::from(API_VERSION));
            details.insert("found".to_string(), serde_json::Value::from(v));
            Err(ApiError::with_details("SCHEMA_MISMATCH", "Unsupported schema version", details))
        }
        _ => Ok(()),
    }
}

/// Process a finished session from a JSON `ProcessSessionRequest`
///
/// # Returns
/// JSON string containing `ApiResponse<SessionOutcome>`
pub fn process_session_json(request_json: &str) -> String {
    info!("Processing session request");

    let request: ProcessSessionRequest = match parse(request_json, "ProcessSessionRequest") {
        Ok(req) => req,
        Err(error) => return respond(ApiResponse::<SessionOutcome>::error(error)),
    };
    if let Err(error) = check_schema(request.schema_version.as_deref()) {
        warn!("Session request rejected: {}", error.message);
        return respond(ApiResponse::<SessionOutcome>::error(error));
    }

    let config = match request.config {
        Some(config) => config.validate().map(|_| config),
        None => config::load_from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid engine config: {}", e);
            let error = ApiError::new("INVALID_CONFIG", &e.to_string());
            return respond(ApiResponse::<SessionOutcome>::error(error));
        }
    };

    let now = request.now.unwrap_or_else(|| SystemClock.now());
    let outcome = SessionProcessor::new(&config).process(
        &request.session,
        &request.players,
        &request.news_feed,
        now,
    );
    info!(
        "Session {} processed: {} players written",
        outcome.session.id,
        outcome.written.len()
    );
    respond(ApiResponse::success(outcome))
}

/// Finish the current game of a live session
///
/// # Returns
/// JSON string containing `ApiResponse<FinishGameResponse>`; `outcome` may be
/// `tie_break_required` or `ignored`, in which case `session` is unchanged
pub fn finish_game_json(request_json: &str) -> String {
    info!("Processing finish game request");

    let request: FinishGameRequest = match parse(request_json, "FinishGameRequest") {
        Ok(req) => req,
        Err(error) => return respond(ApiResponse::<FinishGameResponse>::error(error)),
    };
    if let Err(error) = check_schema(request.schema_version.as_deref()) {
        return respond(ApiResponse::<FinishGameResponse>::error(error));
    }
    if request.session.is_completed() {
        warn!("Finish requested for completed session {}", request.session.id);
        let error = ApiError::new("SESSION_COMPLETED", "Session is already completed");
        return respond(ApiResponse::<FinishGameResponse>::error(error));
    }

    let mut session = request.session;
    let clock = ManualClock::new(request.now.unwrap_or_else(|| SystemClock.now()));
    let outcome =
        MatchStateMachine::new(&clock).finish(&mut session, request.manual_winner_id.as_deref());
    respond(ApiResponse::success(FinishGameResponse { session, outcome }))
}

/// Preview the rotation the current round would produce if finished as it stands
pub fn rotation_preview_json(request_json: &str) -> String {
    let request: SessionQueryRequest = match parse(request_json, "SessionQueryRequest") {
        Ok(req) => req,
        Err(error) => return respond(ApiResponse::<RotationPreviewResponse>::error(error)),
    };
    let session = request.session;
    let decision = RotationEngine::preview(&session);
    respond(ApiResponse::success(RotationPreviewResponse {
        decision,
        resting_team_ids: session.resting_team_ids(),
    }))
}

/// Standings and leaders for a session's finished games
pub fn session_summary_json(request_json: &str) -> String {
    let request: SessionQueryRequest = match parse(request_json, "SessionQueryRequest") {
        Ok(req) => req,
        Err(error) => return respond(ApiResponse::<SessionSummary>::error(error)),
    };
    respond(ApiResponse::success(StatisticsAggregator::summarize(&request.session)))
}
