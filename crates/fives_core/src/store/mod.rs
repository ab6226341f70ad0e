// Club storage contract
// Local-first repository plus a MessagePack + LZ4 snapshot codec with integrity checks

pub mod error;
pub mod repository;
pub mod snapshot;

pub use error::StoreError;
pub use repository::{
    ClubRepository, LocalFirstRepository, MemoryRepository, RemoteSync, SaveReport, SyncRecord,
};
pub use snapshot::{decode, encode, load_from_path, save_to_path, ClubSnapshot, SNAPSHOT_VERSION};
