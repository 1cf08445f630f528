//! SQL DDL for initializing the track vault storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// Conf-table keys provisioned at bootstrap. `conf_set` only ever updates
/// rows, so every key must exist before the first write.
pub const KEY_ACCESS: &str = "ACCESS";
pub const KEY_REFRESH: &str = "REFRESH";
pub const KEY_ACCESS_VALIDITY: &str = "ACCESS_VALIDITY";

pub const CONF_KEYS: [&str; 3] = [KEY_ACCESS, KEY_REFRESH, KEY_ACCESS_VALIDITY];

/// SQLite schema with:
/// - `music`: append-only play records, `id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `played_at` UNIQUE as the dedup natural key; NULL for manual inserts
///   (SQLite's UNIQUE admits any number of NULLs)
/// - `conf`: flat key/value credential rows, pre-seeded with empty values
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS music (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist TEXT NOT NULL,
    album TEXT NOT NULL,
    name TEXT NOT NULL,
    uri TEXT NOT NULL DEFAULT '',
    add_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    played_at TEXT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS conf (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL DEFAULT ''
);

INSERT OR IGNORE INTO conf (key, value)
    VALUES ('ACCESS', ''), ('REFRESH', ''), ('ACCESS_VALIDITY', '')
"#;
