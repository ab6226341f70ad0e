//! Audit Library
//!
//! Club snapshot IO (JSON or MessagePack+LZ4), session recomputation and
//! format conversion for the `fives_audit` CLI.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use fives_core::config::EngineConfig;
use fives_core::models::SessionStatus;
use fives_core::store::{self, ClubSnapshot};
use fives_core::{RatingBreakdown, SessionOutcome, SessionProcessor};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

/// Loads a snapshot; `.json` files are read as JSON, anything else as the binary format.
pub fn load_snapshot(path: &Path) -> Result<ClubSnapshot> {
    if is_json(path) {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        return ClubSnapshot::from_json(&json)
            .with_context(|| format!("Invalid JSON snapshot: {}", path.display()));
    }
    store::load_from_path(path).with_context(|| format!("Failed to load snapshot: {}", path.display()))
}

pub fn write_snapshot(path: &Path, snapshot: &ClubSnapshot) -> Result<()> {
    if is_json(path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, snapshot.to_json()?)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        return Ok(());
    }
    store::save_to_path(path, snapshot)
        .with_context(|| format!("Failed to save snapshot: {}", path.display()))
}

/// Reads an engine config file (YAML for `.yaml`/`.yml`, JSON otherwise).
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
    let config = if yaml { EngineConfig::from_yaml(&text) } else { EngineConfig::from_json(&text) };
    config.with_context(|| format!("Invalid config: {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player_id: String,
    pub previous_rating: u8,
    pub new_rating: u8,
    pub delta: f64,
    pub is_penalty: bool,
}

impl From<&RatingBreakdown> for RatingChange {
    fn from(b: &RatingBreakdown) -> Self {
        Self {
            player_id: b.player_id.clone(),
            previous_rating: b.previous_rating,
            new_rating: b.new_rating,
            delta: b.delta,
            is_penalty: b.is_penalty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub session_id: String,
    pub games: usize,
    pub written_players: usize,
    pub news_items: usize,
    pub changes: Vec<RatingChange>,
}

/// Whether `session_id` is already folded into the snapshot's roster.
pub fn is_processed(snapshot: &ClubSnapshot, session_id: &str) -> bool {
    snapshot
        .sessions
        .iter()
        .any(|s| s.id == session_id && s.status == SessionStatus::Completed)
}

/// Replays the processor for one stored session against the snapshot's roster.
///
/// Without `session_id` the active session is used. A session that was already
/// processed is evaluated at its own `completed_at`; its outcome is for
/// reporting only and [`apply`] rejects it.
pub fn recompute(
    snapshot: &ClubSnapshot,
    session_id: Option<&str>,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<SessionOutcome> {
    let session = match session_id {
        Some(id) => snapshot.session(id).with_context(|| format!("Session {} not found", id))?,
        None => snapshot.active_session.as_ref().context("Snapshot has no active session")?,
    };
    let now = if is_processed(snapshot, &session.id) {
        log::warn!("Session {} is already merged into the roster; report only", session.id);
        session.completed_at.unwrap_or(now)
    } else {
        now
    };
    log::info!("Recomputing session {} over {} players", session.id, snapshot.players.len());
    Ok(SessionProcessor::new(config).process(session, &snapshot.players, &snapshot.news_feed, now))
}

pub fn report(outcome: &SessionOutcome) -> AuditReport {
    AuditReport {
        session_id: outcome.session.id.clone(),
        games: outcome.session.games.len(),
        written_players: outcome.written.len(),
        news_items: outcome.news_feed.len(),
        changes: outcome.breakdowns.iter().map(RatingChange::from).collect(),
    }
}

/// Folds an outcome back into the snapshot: written players, the completed
/// session and the new feed.
///
/// Fails without touching the snapshot when the session was already processed.
pub fn apply(snapshot: &mut ClubSnapshot, outcome: &SessionOutcome) -> Result<()> {
    if is_processed(snapshot, &outcome.session.id) {
        bail!("Session {} was already applied to this snapshot", outcome.session.id);
    }
    for player in &outcome.written {
        match snapshot.players.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player.clone(),
            None => snapshot.players.push(player.clone()),
        }
    }
    let session = &outcome.session;
    snapshot.sessions.retain(|s| s.id != session.id);
    snapshot.sessions.insert(0, session.clone());
    if snapshot.active_session.as_ref().is_some_and(|active| active.id == session.id) {
        snapshot.active_session = None;
    }
    snapshot.news_feed = outcome.news_feed.clone();
    snapshot.saved_at = Utc::now();
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertMetadata {
    pub players: usize,
    pub sessions: usize,
    pub input_size: u64,
    pub output_size: u64,
    /// SHA256 of the output file (hex)
    pub checksum: String,
    pub created_at: String,
}

/// Converts between JSON and binary snapshots, chosen by file extension.
pub fn convert(input: &Path, output: &Path) -> Result<ConvertMetadata> {
    let snapshot = load_snapshot(input)?;
    write_snapshot(output, &snapshot)?;

    let input_size = fs::metadata(input)?.len();
    let bytes = fs::read(output)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);

    Ok(ConvertMetadata {
        players: snapshot.players.len(),
        sessions: snapshot.sessions.len(),
        input_size,
        output_size: bytes.len() as u64,
        checksum: format!("{:x}", hasher.finalize()),
        created_at: Utc::now().to_rfc3339(),
    })
}
