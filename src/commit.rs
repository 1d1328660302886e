//! Commit history: records, persistence boundary and the log on top of it.
/// Commit log operations
mod log;
/// In-process store
mod memory;
/// Commit records
mod model;
/// Persistence trait
mod store;

pub use log::CommitLog;
pub use memory::InMemoryCommitStore;
pub use model::{
    Commit,
    CommitSummary,
    NewCommit,
};
pub use store::CommitStore;
