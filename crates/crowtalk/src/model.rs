//! Core data model for crowtalk.
//!
//! This module defines the normalized representation of playable sounds and
//! logged field observations, independent of where the audio came from or
//! how it is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The source tier a catalog item belongs to.
///
/// Tier membership defines the base ordering precedence of the catalog:
/// synthesized teaching calls come first, then curated library recordings,
/// then the user's own field recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundSource {
    /// Synthesized demonstration call.
    Synthetic,
    /// Curated library recording (e.g. from a public archive).
    Curated,
    /// Recording made by the user in the field.
    FieldRecorded,
}

impl std::fmt::Display for SoundSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synthetic => write!(f, "synthetic"),
            Self::Curated => write!(f, "curated"),
            Self::FieldRecorded => write!(f, "field_recorded"),
        }
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees, -90..=90.
    pub lat: f64,
    /// Longitude in degrees, -180..=180.
    pub lon: f64,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check whether both coordinates are finite and within range.
    ///
    /// The catalog builder treats an invalid location as "no location"
    /// rather than aborting the whole build, since one bad GPS fix should
    /// not block the whole catalog.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// One playable sound, regardless of source.
///
/// Items are rebuilt on demand whenever source lists or the viewer's
/// location change; the `id` is stable across rebuilds for a given source
/// item but carries no persistent identity beyond one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Opaque unique identifier within one catalog build.
    pub id: String,

    /// Which tier this item belongs to.
    pub source: SoundSource,

    /// Reference into the category registry. Must resolve; unknown
    /// references are rejected by the builder, not silently dropped.
    pub category_id: String,

    /// Display title. May be empty.
    pub title: String,

    /// Phonetic rendering of the call (e.g. "kraa… kraa"). May be empty.
    pub phonetic: String,

    /// Free-text interpretation of the call. May be empty.
    pub interpretation: String,

    /// Opaque handle resolved by the audio-provider collaborator.
    /// Never an inline payload.
    pub audio_ref: String,

    /// GPS position, present only for recordings captured with a fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Recording length in seconds, when known. Positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,

    /// Whether playback needs an explicit confirmation step.
    ///
    /// Alarm and mobbing calls can frighten a flock for hours, so the UI
    /// asks before playing them.
    #[serde(default)]
    pub danger: bool,
}

impl CatalogItem {
    /// Create a minimal item with empty display strings.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source: SoundSource,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            category_id: category_id.into(),
            title: String::new(),
            phonetic: String::new(),
            interpretation: String::new(),
            audio_ref: String::new(),
            location: None,
            duration_seconds: None,
            danger: false,
        }
    }

    /// The item's location, if present and well-formed.
    #[must_use]
    pub fn valid_location(&self) -> Option<Location> {
        self.location.filter(Location::is_valid)
    }
}

/// One logged (category played, response observed) pair.
///
/// Session events are append-only; ordering by timestamp defines recency
/// for the suggestion engine's repetition weighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// The category that was played.
    pub category_id: String,

    /// Free-form response tag (e.g. "approached", "ignored", "fled").
    pub response: String,

    /// When the interaction was logged.
    pub timestamp: DateTime<Utc>,
}

impl SessionEvent {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(category_id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}
