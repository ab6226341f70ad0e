use super::error::StoreError;
use super::snapshot::ClubSnapshot;
use crate::models::{NewsItem, Player, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a write. Local writes always land; `cloud_synced` reports the
/// best-effort remote push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    pub success: bool,
    pub cloud_synced: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl SaveReport {
    pub fn local() -> Self {
        Self { success: true, cloud_synced: false, message: None }
    }

    pub fn synced() -> Self {
        Self { success: true, cloud_synced: true, message: None }
    }
}

/// Storage contract the host application implements or picks.
pub trait ClubRepository {
    fn load_players(&self) -> Vec<Player>;
    /// Upserts by player id.
    fn save_players(&mut self, players: &[Player]) -> SaveReport;

    /// Completed sessions, most recent first.
    fn load_session_history(&self, limit: Option<usize>) -> Vec<Session>;
    fn save_session(&mut self, session: &Session) -> SaveReport;

    fn load_active_session(&self) -> Option<Session>;
    fn save_active_session(&mut self, session: Option<&Session>) -> SaveReport;

    fn load_news_feed(&self, limit: Option<usize>) -> Vec<NewsItem>;
    fn save_news_feed(&mut self, items: &[NewsItem]) -> SaveReport;
}

/// In-process store backed by a [`ClubSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    snapshot: ClubSnapshot,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ClubSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &ClubSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> ClubSnapshot {
        self.snapshot
    }

    fn touch(&mut self) {
        self.snapshot.saved_at = Utc::now();
    }
}

fn session_time(session: &Session) -> DateTime<Utc> {
    session.completed_at.unwrap_or(session.created_at)
}

fn take_limit<T: Clone>(items: &[T], limit: Option<usize>) -> Vec<T> {
    let n = limit.unwrap_or(items.len()).min(items.len());
    items[..n].to_vec()
}

impl ClubRepository for MemoryRepository {
    fn load_players(&self) -> Vec<Player> {
        self.snapshot.players.clone()
    }

    fn save_players(&mut self, players: &[Player]) -> SaveReport {
        for player in players {
            match self.snapshot.players.iter_mut().find(|p| p.id == player.id) {
                Some(existing) => *existing = player.clone(),
                None => self.snapshot.players.push(player.clone()),
            }
        }
        self.touch();
        SaveReport::local()
    }

    fn load_session_history(&self, limit: Option<usize>) -> Vec<Session> {
        take_limit(&self.snapshot.sessions, limit)
    }

    fn save_session(&mut self, session: &Session) -> SaveReport {
        let sessions = &mut self.snapshot.sessions;
        sessions.retain(|s| s.id != session.id);
        sessions.push(session.clone());
        sessions.sort_by(|a, b| session_time(b).cmp(&session_time(a)));
        if self.snapshot.active_session.as_ref().is_some_and(|active| active.id == session.id) {
            self.snapshot.active_session = None;
        }
        self.touch();
        SaveReport::local()
    }

    fn load_active_session(&self) -> Option<Session> {
        self.snapshot.active_session.clone()
    }

    fn save_active_session(&mut self, session: Option<&Session>) -> SaveReport {
        self.snapshot.active_session = session.cloned();
        self.touch();
        SaveReport::local()
    }

    fn load_news_feed(&self, limit: Option<usize>) -> Vec<NewsItem> {
        take_limit(&self.snapshot.news_feed, limit)
    }

    fn save_news_feed(&mut self, items: &[NewsItem]) -> SaveReport {
        self.snapshot.news_feed = items.to_vec();
        self.touch();
        SaveReport::local()
    }
}

/// A single write forwarded to the remote side.
#[derive(Debug, Clone, Copy)]
pub enum SyncRecord<'a> {
    Players(&'a [Player]),
    Session(&'a Session),
    ActiveSession(Option<&'a Session>),
    NewsFeed(&'a [NewsItem]),
}

pub trait RemoteSync {
    fn push(&mut self, record: SyncRecord<'_>) -> Result<(), StoreError>;
}

/// Writes locally first, then tries the remote. Remote failures only clear
/// `cloud_synced`; they never fail the write.
pub struct LocalFirstRepository<R: RemoteSync> {
    local: MemoryRepository,
    remote: Option<R>,
}

impl<R: RemoteSync> LocalFirstRepository<R> {
    pub fn new(local: MemoryRepository, remote: Option<R>) -> Self {
        Self { local, remote }
    }

    pub fn local(&self) -> &MemoryRepository {
        &self.local
    }

    pub fn remote_mut(&mut self) -> Option<&mut R> {
        self.remote.as_mut()
    }

    fn sync(&mut self, local: SaveReport, record: SyncRecord<'_>) -> SaveReport {
        let Some(remote) = self.remote.as_mut() else {
            return local;
        };
        match remote.push(record) {
            Ok(()) => SaveReport::synced(),
            Err(err) => {
                log::warn!("Remote sync failed, kept local copy: {}", err);
                SaveReport { message: Some(err.to_string()), ..local }
            }
        }
    }
}

impl<R: RemoteSync> ClubRepository for LocalFirstRepository<R> {
    fn load_players(&self) -> Vec<Player> {
        self.local.load_players()
    }

    fn save_players(&mut self, players: &[Player]) -> SaveReport {
        let report = self.local.save_players(players);
        self.sync(report, SyncRecord::Players(players))
    }

    fn load_session_history(&self, limit: Option<usize>) -> Vec<Session> {
        self.local.load_session_history(limit)
    }

    fn save_session(&mut self, session: &Session) -> SaveReport {
        let report = self.local.save_session(session);
        self.sync(report, SyncRecord::Session(session))
    }

    fn load_active_session(&self) -> Option<Session> {
        self.local.load_active_session()
    }

    fn save_active_session(&mut self, session: Option<&Session>) -> SaveReport {
        let report = self.local.save_active_session(session);
        self.sync(report, SyncRecord::ActiveSession(session))
    }

    fn load_news_feed(&self, limit: Option<usize>) -> Vec<NewsItem> {
        self.local.load_news_feed(limit)
    }

    fn save_news_feed(&mut self, items: &[NewsItem]) -> SaveReport {
        let report = self.local.save_news_feed(items);
        self.sync(report, SyncRecord::NewsFeed(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionConfig, Team};
    use chrono::Duration;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Default)]
    struct FlakyRemote {
        fail: bool,
        pushes: usize,
    }

    impl RemoteSync for FlakyRemote {
        fn push(&mut self, _record: SyncRecord<'_>) -> Result<(), StoreError> {
            self.pushes += 1;
            if self.fail {
                return Err(StoreError::Remote("offline".into()));
            }
            Ok(())
        }
    }

    fn session(id: &str, at: DateTime<Utc>) -> Session {
        let config = SessionConfig { num_teams: 2, players_per_team: 1, ..SessionConfig::default() };
        let teams = vec![Team::new("a", "A", "#a"), Team::new("b", "B", "#b")];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Session::new(Some(id.into()), config, teams, vec![], &mut rng, at).unwrap()
    }

    #[test]
    fn test_save_players_upserts() {
        let mut repo = MemoryRepository::new();
        repo.save_players(&[Player::new("p1", "Ana", 60), Player::new("p2", "Bo", 61)]);
        let mut ana = Player::new("p1", "Ana", 60);
        ana.rating = 64;
        repo.save_players(&[ana]);
        let players = repo.load_players();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].rating, 64);
    }

    #[test]
    fn test_session_history_most_recent_first() {
        let now = Utc::now();
        let mut repo = MemoryRepository::new();
        repo.save_active_session(Some(&session("s2", now)));
        repo.save_session(&session("s1", now - Duration::days(7)));
        repo.save_session(&session("s2", now));
        let ids: Vec<String> = repo.load_session_history(None).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["s2", "s1"]);
        assert_eq!(repo.load_session_history(Some(1)).len(), 1);
        assert!(repo.load_active_session().is_none());
    }

    #[test]
    fn test_local_first_reports_sync_state() {
        let mut repo = LocalFirstRepository::new(MemoryRepository::new(), Some(FlakyRemote::default()));
        assert_eq!(repo.save_players(&[Player::new("p1", "Ana", 60)]), SaveReport::synced());

        if let Some(remote) = repo.remote_mut() {
            remote.fail = true;
        }
        let report = repo.save_players(&[Player::new("p2", "Bo", 60)]);
        assert!(report.success);
        assert!(!report.cloud_synced);
        assert!(report.message.is_some());
        assert_eq!(repo.load_players().len(), 2);
        assert_eq!(repo.remote_mut().map(|r| r.pushes), Some(2));
    }

    #[test]
    fn test_offline_repository_is_local_only() {
        let mut repo: LocalFirstRepository<FlakyRemote> = LocalFirstRepository::new(MemoryRepository::new(), None);
        assert_eq!(repo.save_news_feed(&[]), SaveReport::local());
    }
}
