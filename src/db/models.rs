use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored play. `id` and `add_time` are assigned by the store on insert;
/// `played_at` is the provider's ISO-8601 timestamp for synced plays and
/// `None` for manual submissions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct PlayRecord {
    pub id: i64,
    pub artist: String,
    pub album: String,
    pub name: String,
    pub uri: String,
    pub add_time: String,
    pub played_at: Option<String>,
}

/// Fields the caller supplies for a new play record.
#[derive(Debug, Clone)]
pub struct NewPlay {
    pub artist: String,
    pub album: String,
    pub name: String,
    pub uri: String,
    pub played_at: Option<String>,
}
