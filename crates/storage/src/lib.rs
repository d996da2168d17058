#![forbid(unsafe_code)]

pub mod changes;
pub mod local;
pub mod repository;
pub mod sqlite;

pub use changes::{ChangeFeed, ChangeKind, Table, TableChange};
pub use local::{InMemoryLocalStore, JsonFileStore, LocalStore, LocalStoreError};
pub use repository::{
    AttemptRepository, HistoryRepository, InMemoryRepository, LeaderboardRepository,
    QuestionRepository, Storage, StorageError,
};
