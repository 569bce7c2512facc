//! `SQLite` schema definitions for crowtalk.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the field recordings table.
pub const CREATE_RECORDINGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS recordings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL DEFAULT '',
    phonetic TEXT NOT NULL DEFAULT '',
    interpretation TEXT NOT NULL DEFAULT '',
    response TEXT NOT NULL DEFAULT '',
    place TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    lat REAL,
    lon REAL,
    acc INTEGER,
    rec_time TEXT,
    duration REAL NOT NULL DEFAULT 0,
    audio_ref TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the session events table.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS session_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id TEXT NOT NULL,
    response TEXT NOT NULL,
    timestamp TEXT NOT NULL
)
";

/// SQL statement to create an index on recording category for tallies.
pub const CREATE_RECORDING_CATEGORY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_recordings_category ON recordings(category)
";

/// SQL statement to create an index on event timestamps.
pub const CREATE_EVENT_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_events_timestamp ON session_events(timestamp)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RECORDINGS_TABLE,
    CREATE_EVENTS_TABLE,
    CREATE_RECORDING_CATEGORY_INDEX,
    CREATE_EVENT_TIMESTAMP_INDEX,
    CREATE_METADATA_TABLE,
];
