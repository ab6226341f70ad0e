//! Plain data contracts shared with the host application.
//!
//! Teams and players reference each other by id only; the session owns flat
//! lists (`teams`, `player_pool`) that act as the arenas.

pub mod events;
pub mod game;
pub mod news;
pub mod player;
pub mod session;
pub mod team;

pub use events::{EventLogEntry, EventPayload};
pub use game::{Game, GameStatus, Goal, Side};
pub use news::{MilestoneStat, NewsItem, NewsKind};
pub use player::{
    CareerStats, Form, HistoryPoint, MonthlyStats, Player, PlayerId, PlayerRecords, RecordEntry,
    SessionHistoryEntry, Skill,
};
pub use session::{RotationMode, Session, SessionConfig, SessionStatus};
pub use team::{Team, TeamId};
