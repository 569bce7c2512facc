//! Storage layer for crowtalk.
//!
//! This module provides `SQLite`-based persistence for the session event log
//! and for field recording metadata. Audio payloads are never stored here;
//! recordings carry an opaque `audio_ref` handle resolved by the audio
//! collaborator.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::export::{FieldRecording, GpsFix};
use crate::model::{CatalogItem, Location, SessionEvent, SoundSource};

/// A field recording as stored, with its assigned row id and audio handle.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecording {
    /// Row id assigned by the storage layer.
    pub id: i64,
    /// Opaque audio handle (e.g. a file path or capture token).
    pub audio_ref: String,
    /// The recording metadata in the export schema.
    pub record: FieldRecording,
}

/// Storage engine for session events and field recording metadata.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Session events ===

    /// Append a session event. Row ids preserve caller sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn append_event(&self, event: &SessionEvent) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO session_events (category_id, response, timestamp)
            VALUES (?1, ?2, ?3)
            ",
            params![
                event.category_id,
                event.response,
                event.timestamp.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Appended session event with id {}", id);
        Ok(id)
    }

    /// All session events in append order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn events(&self) -> Result<Vec<SessionEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, response, timestamp FROM session_events ORDER BY id ASC",
        )?;

        let events = stmt
            .query_map([], Self::row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// The trailing `n` events, in append order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_events(&self, n: usize) -> Result<Vec<SessionEvent>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT category_id, response, timestamp FROM session_events
            ORDER BY id DESC LIMIT ?1
            ",
        )?;

        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let mut events = stmt
            .query_map([limit], Self::row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        events.reverse();
        Ok(events)
    }

    /// Number of logged session events.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn event_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM session_events", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn row_to_event(row: &Row<'_>) -> std::result::Result<SessionEvent, rusqlite::Error> {
        let timestamp: String = row.get(2)?;
        let timestamp = timestamp.parse::<DateTime<Utc>>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(SessionEvent {
            category_id: row.get(0)?,
            response: row.get(1)?,
            timestamp,
        })
    }

    // === Field recordings ===

    /// Insert a field recording, returning the assigned row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_recording(&self, record: &FieldRecording, audio_ref: &str) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO recordings
                (category, phonetic, interpretation, response, place, notes,
                 lat, lon, acc, rec_time, duration, audio_ref)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
            params![
                record.category,
                record.phonetic,
                record.interpretation,
                record.response,
                record.place,
                record.notes,
                record.gps.map(|g| g.lat),
                record.gps.map(|g| g.lon),
                record.gps.map(|g| g.acc),
                record.rec_time.map(|t| t.to_rfc3339()),
                record.duration,
                audio_ref,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted recording with id {}", id);
        Ok(id)
    }

    /// Get a recording by its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_recording(&self, id: i64) -> Result<Option<StoredRecording>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {RECORDING_COLUMNS} FROM recordings WHERE id = ?1"),
                [id],
                Self::row_to_recording,
            )
            .optional()?;
        Ok(result)
    }

    /// All recordings in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recordings(&self) -> Result<Vec<StoredRecording>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORDING_COLUMNS} FROM recordings ORDER BY id ASC"
        ))?;

        let recordings = stmt
            .query_map([], Self::row_to_recording)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(recordings)
    }

    /// Delete a recording. Returns true if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_recording(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM recordings WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Number of stored recordings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recording_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM recordings", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Prune recordings to keep only the most recent `keep_count` rows.
    ///
    /// Returns the number of recordings deleted. A `keep_count` of 0 is
    /// treated as unlimited and deletes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_keep_recent(&self, keep_count: usize) -> Result<usize> {
        if keep_count == 0 {
            return Ok(0);
        }

        let keep = i64::try_from(keep_count).unwrap_or(i64::MAX);
        let affected = self.conn.execute(
            r"
            DELETE FROM recordings WHERE id NOT IN (
                SELECT id FROM recordings ORDER BY id DESC LIMIT ?1
            )
            ",
            [keep],
        )?;

        if affected > 0 {
            info!("Pruned {} recordings to keep {} recent", affected, keep_count);
        }
        Ok(affected)
    }

    /// Project stored recordings into catalog items for the field tier.
    ///
    /// Item ids follow the `field_<rowid>` convention so they stay stable
    /// across rebuilds. Unlabelled recordings are projected under the
    /// `ovrigt` (Other) category, which exists for unclassified sounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn field_catalog_items(&self) -> Result<Vec<CatalogItem>> {
        let items = self
            .recordings()?
            .into_iter()
            .map(|stored| {
                let rec = stored.record;
                let category = if rec.category.is_empty() {
                    "ovrigt".to_string()
                } else {
                    rec.category
                };
                let mut item = CatalogItem::new(
                    format!("field_{}", stored.id),
                    SoundSource::FieldRecorded,
                    category,
                );
                item.title = if rec.phonetic.is_empty() {
                    "Field recording".to_string()
                } else {
                    rec.phonetic.clone()
                };
                item.phonetic = rec.phonetic;
                item.interpretation = rec.interpretation;
                item.audio_ref = stored.audio_ref;
                item.location = rec.gps.map(|g| Location::new(g.lat, g.lon));
                item.duration_seconds = (rec.duration > 0.0).then_some(rec.duration);
                item
            })
            .collect();
        Ok(items)
    }

    fn row_to_recording(row: &Row<'_>) -> std::result::Result<StoredRecording, rusqlite::Error> {
        let lat: Option<f64> = row.get(7)?;
        let lon: Option<f64> = row.get(8)?;
        let acc: Option<u32> = row.get(9)?;
        let gps = match (lat, lon) {
            (Some(lat), Some(lon)) => Some(GpsFix {
                lat,
                lon,
                acc: acc.unwrap_or(0),
            }),
            _ => None,
        };

        let rec_time: Option<String> = row.get(10)?;
        let rec_time = rec_time
            .map(|t| {
                t.parse::<DateTime<Utc>>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        10,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?;

        Ok(StoredRecording {
            id: row.get(0)?,
            audio_ref: row.get(12)?,
            record: FieldRecording {
                category: row.get(1)?,
                phonetic: row.get(2)?,
                interpretation: row.get(3)?,
                response: row.get(4)?,
                place: row.get(5)?,
                notes: row.get(6)?,
                gps,
                rec_time,
                duration: row.get(11)?,
            },
        })
    }
}

/// Column list shared by recording queries; order matches `row_to_recording`.
const RECORDING_COLUMNS: &str = "id, category, phonetic, interpretation, response, place, notes, \
                                 lat, lon, acc, rec_time, duration, audio_ref";

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> Storage {
        Storage::open_in_memory().expect("in-memory storage")
    }

    fn recording(category: &str, place: &str) -> FieldRecording {
        FieldRecording {
            category: category.to_string(),
            phonetic: "kraa".to_string(),
            interpretation: String::new(),
            response: "answered".to_string(),
            place: place.to_string(),
            notes: String::new(),
            gps: Some(GpsFix {
                lat: 59.33,
                lon: 18.07,
                acc: 8,
            }),
            rec_time: Some(Utc::now()),
            duration: 5.5,
        }
    }

    #[test]
    fn test_append_and_read_events_in_caller_order() {
        let storage = storage();
        storage
            .append_event(&SessionEvent::new("kontaktrop", "answered"))
            .unwrap();
        storage
            .append_event(&SessionEvent::new("matrop", "approached"))
            .unwrap();
        storage
            .append_event(&SessionEvent::new("alarm", "fled"))
            .unwrap();

        let events = storage.events().unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.category_id.as_str()).collect();
        assert_eq!(ids, vec!["kontaktrop", "matrop", "alarm"]);
        assert_eq!(storage.event_count().unwrap(), 3);
    }

    #[test]
    fn test_recent_events_trailing_window_in_order() {
        let storage = storage();
        for id in ["a", "b", "c", "d", "e"] {
            storage.append_event(&SessionEvent::new(id, "answered")).unwrap();
        }

        let recent = storage.recent_events(3).unwrap();
        let ids: Vec<&str> = recent.iter().map(|e| e.category_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "e"]);
    }

    #[test]
    fn test_recent_events_on_empty_log() {
        let storage = storage();
        assert!(storage.recent_events(3).unwrap().is_empty());
        assert_eq!(storage.event_count().unwrap(), 0);
    }

    #[test]
    fn test_event_timestamp_roundtrip() {
        let storage = storage();
        let event = SessionEvent::new("rassel", "answered");
        storage.append_event(&event).unwrap();

        let events = storage.events().unwrap();
        assert_eq!(events[0].timestamp, event.timestamp);
    }

    #[test]
    fn test_insert_and_get_recording() {
        let storage = storage();
        let rec = recording("kontaktrop", "Djurgården");
        let id = storage.insert_recording(&rec, "file:rec_001.webm").unwrap();

        let stored = storage.get_recording(id).unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.audio_ref, "file:rec_001.webm");
        assert_eq!(stored.record.category, "kontaktrop");
        assert_eq!(stored.record.place, "Djurgården");
        assert_eq!(stored.record.gps.unwrap().acc, 8);
    }

    #[test]
    fn test_get_recording_missing() {
        let storage = storage();
        assert!(storage.get_recording(42).unwrap().is_none());
    }

    #[test]
    fn test_recordings_in_insertion_order() {
        let storage = storage();
        storage.insert_recording(&recording("alarm", "p1"), "a1").unwrap();
        storage.insert_recording(&recording("rassel", "p2"), "a2").unwrap();

        let all = storage.recordings().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].record.category, "alarm");
        assert_eq!(all[1].record.category, "rassel");
        assert_eq!(storage.recording_count().unwrap(), 2);
    }

    #[test]
    fn test_delete_recording() {
        let storage = storage();
        let id = storage.insert_recording(&recording("alarm", "p"), "a").unwrap();

        assert!(storage.delete_recording(id).unwrap());
        assert!(!storage.delete_recording(id).unwrap());
        assert_eq!(storage.recording_count().unwrap(), 0);
    }

    #[test]
    fn test_recording_without_gps() {
        let storage = storage();
        let mut rec = recording("ovrigt", "");
        rec.gps = None;
        rec.rec_time = None;
        let id = storage.insert_recording(&rec, "a").unwrap();

        let stored = storage.get_recording(id).unwrap().unwrap();
        assert!(stored.record.gps.is_none());
        assert!(stored.record.rec_time.is_none());
    }

    #[test]
    fn test_prune_keep_recent_drops_oldest() {
        let storage = storage();
        for place in ["p1", "p2", "p3", "p4", "p5"] {
            storage.insert_recording(&recording("alarm", place), "a").unwrap();
        }

        let deleted = storage.prune_keep_recent(2).unwrap();
        assert_eq!(deleted, 3);

        let places: Vec<String> = storage
            .recordings()
            .unwrap()
            .into_iter()
            .map(|r| r.record.place)
            .collect();
        assert_eq!(places, vec!["p4", "p5"]);
    }

    #[test]
    fn test_prune_keep_recent_zero_is_unlimited() {
        let storage = storage();
        storage.insert_recording(&recording("alarm", "p"), "a").unwrap();

        assert_eq!(storage.prune_keep_recent(0).unwrap(), 0);
        assert_eq!(storage.recording_count().unwrap(), 1);
    }

    #[test]
    fn test_prune_keep_recent_under_limit_is_noop() {
        let storage = storage();
        storage.insert_recording(&recording("alarm", "p"), "a").unwrap();

        assert_eq!(storage.prune_keep_recent(10).unwrap(), 0);
        assert_eq!(storage.recording_count().unwrap(), 1);
    }

    #[test]
    fn test_field_catalog_items_projection() {
        let storage = storage();
        let id = storage
            .insert_recording(&recording("rassel", "oak grove"), "file:r.webm")
            .unwrap();

        let items = storage.field_catalog_items().unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, format!("field_{id}"));
        assert_eq!(item.source, SoundSource::FieldRecorded);
        assert_eq!(item.category_id, "rassel");
        assert_eq!(item.audio_ref, "file:r.webm");
        assert!(item.location.is_some());
        assert_eq!(item.duration_seconds, Some(5.5));
    }

    #[test]
    fn test_field_catalog_items_unlabelled_fall_back_to_other() {
        let storage = storage();
        let mut rec = recording("", "");
        rec.phonetic = String::new();
        rec.duration = 0.0;
        storage.insert_recording(&rec, "a").unwrap();

        let items = storage.field_catalog_items().unwrap();
        assert_eq!(items[0].category_id, "ovrigt");
        assert_eq!(items[0].title, "Field recording");
        assert!(items[0].duration_seconds.is_none());
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = std::env::temp_dir().join("crowtalk_storage_test");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("nested").join("crowtalk.db");

        let storage = Storage::open(&path).unwrap();
        assert_eq!(storage.path(), path.as_path());
        assert!(path.exists());

        drop(storage);
        std::fs::remove_dir_all(&dir).ok();
    }
}
