//! Export records for crowtalk.
//!
//! The export JSON schema is a fixed external contract: historical exports
//! must still parse after any change to this crate, so field names (notably
//! the camelCase `recTime`, `exportedAt` and `fieldRecordings` keys) are
//! frozen here rather than derived from the internal model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::SessionEvent;

/// A GPS fix attached to a field recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Reported accuracy in meters.
    pub acc: u32,
}

/// One field recording in the export schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecording {
    /// Category code, or empty if unlabelled.
    pub category: String,
    /// Phonetic rendering of the call.
    #[serde(default)]
    pub phonetic: String,
    /// Free-text interpretation.
    #[serde(default)]
    pub interpretation: String,
    /// Observed response tag.
    #[serde(default)]
    pub response: String,
    /// Place name entered by the user.
    #[serde(default)]
    pub place: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// GPS fix, when location access was granted at capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsFix>,
    /// When the recording started.
    #[serde(rename = "recTime", default, skip_serializing_if = "Option::is_none")]
    pub rec_time: Option<DateTime<Utc>>,
    /// Recording length in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// The complete exported data set for a field session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    /// When the export was produced.
    #[serde(rename = "exportedAt")]
    pub exported_at: DateTime<Utc>,
    /// All field recordings.
    #[serde(rename = "fieldRecordings")]
    pub field_recordings: Vec<FieldRecording>,
    /// All logged session events.
    #[serde(rename = "sessionEvents")]
    pub session_events: Vec<SessionEvent>,
}

impl ExportBundle {
    /// Assemble a bundle stamped with the current time.
    #[must_use]
    pub fn new(field_recordings: Vec<FieldRecording>, session_events: Vec<SessionEvent>) -> Self {
        Self {
            exported_at: Utc::now(),
            field_recordings,
            session_events,
        }
    }

    /// Serialize the bundle as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
