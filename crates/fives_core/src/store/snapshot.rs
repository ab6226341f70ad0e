use super::error::StoreError;
use crate::models::{NewsItem, Player, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;

pub const SNAPSHOT_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;

/// Everything the club keeps between sessions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClubSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub players: Vec<Player>,
    /// Completed sessions, most recent first
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub active_session: Option<Session>,
    #[serde(default)]
    pub news_feed: Vec<NewsItem>,
}

impl Default for ClubSnapshot {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ClubSnapshot {
    pub fn new(saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at,
            players: Vec::new(),
            sessions: Vec::new(),
            active_session: None,
            news_feed: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        let mut player_ids = HashSet::new();
        for player in &self.players {
            if !player_ids.insert(&player.id) {
                return Err(StoreError::Corrupted(format!("duplicate player id {}", player.id)));
            }
        }
        let mut session_ids = HashSet::new();
        for session in &self.sessions {
            if !session_ids.insert(&session.id) {
                return Err(StoreError::Corrupted(format!("duplicate session id {}", session.id)));
            }
        }
        Ok(())
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions
            .iter()
            .chain(self.active_session.iter())
            .find(|session| session.id == session_id)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot: ClubSnapshot = serde_json::from_str(json)?;
        check_version(snapshot.version)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// MessagePack, LZ4 with prepended size, then a trailing SHA-256 of the compressed bytes.
pub fn encode(snapshot: &ClubSnapshot) -> Result<Vec<u8>, StoreError> {
    snapshot.validate()?;

    let msgpack = to_vec_named(snapshot)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

pub fn decode(bytes: &[u8]) -> Result<ClubSnapshot, StoreError> {
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(StoreError::Corrupted(format!("{} bytes is too short", bytes.len())));
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize()[..] != *checksum_bytes {
        return Err(StoreError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| StoreError::Decompression)?;
    let snapshot: ClubSnapshot = from_slice(&msgpack)?;
    check_version(snapshot.version)?;
    Ok(snapshot)
}

fn check_version(found: u32) -> Result<(), StoreError> {
    if found > SNAPSHOT_VERSION {
        return Err(StoreError::VersionMismatch { found, expected: SNAPSHOT_VERSION });
    }
    Ok(())
}

/// Writes through a temp file and renames it into place.
pub fn save_to_path(path: &Path, snapshot: &ClubSnapshot) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let data = encode(snapshot)?;
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }
    rename(&temp_path, path)?;

    log::debug!("Saved {} bytes to {:?}", data.len(), path);
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<ClubSnapshot, StoreError> {
    if !path.exists() {
        return Err(StoreError::FileNotFound { path: path.display().to_string() });
    }

    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let snapshot = decode(&data)?;
    log::debug!("Loaded {} bytes from {:?}", data.len(), path);
    Ok(snapshot)
}
