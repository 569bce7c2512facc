//! Catalog builder for crowtalk.
//!
//! Merges the three heterogeneous sound sources (synthetic teaching calls,
//! curated library recordings, the user's own field recordings) into one
//! ordered catalog. Tier precedence is a product requirement: teaching
//! sounds come before real recordings, exactly and stably.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::haversine_meters;
use crate::model::{CatalogItem, Location, SoundSource};
use crate::registry::CategoryRegistry;

/// Composes ordered catalogs from raw source lists.
///
/// The builder is a pure, synchronous computation over its inputs plus the
/// immutable registry; it performs no I/O and may be called freely from any
/// event handler.
#[derive(Debug)]
pub struct CatalogBuilder<'a> {
    registry: &'a CategoryRegistry,
}

impl<'a> CatalogBuilder<'a> {
    /// Create a builder backed by the given registry.
    #[must_use]
    pub fn new(registry: &'a CategoryRegistry) -> Self {
        Self { registry }
    }

    /// Merge source lists into a single ordered catalog.
    ///
    /// All synthetic items come first, then all curated items, then all
    /// field recordings. When `viewer` is supplied, the curated and field
    /// tiers are sub-sorted by ascending great-circle distance; items
    /// without a usable location sort after located ones, keeping their
    /// relative input order. Without `viewer`, insertion order is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateItem`] if any two items share an id, and
    /// [`Error::UnknownCategory`] if an item references a category the
    /// registry does not know. Both are fatal to the build call; the
    /// builder never skips items silently.
    pub fn build(
        &self,
        synthetic: Vec<CatalogItem>,
        curated: Vec<CatalogItem>,
        field: Vec<CatalogItem>,
        viewer: Option<Location>,
    ) -> Result<Vec<CatalogItem>> {
        let mut seen = HashSet::new();
        for item in synthetic.iter().chain(&curated).chain(&field) {
            if !seen.insert(item.id.as_str()) {
                return Err(Error::duplicate_item(&item.id));
            }
            if !self.registry.contains(&item.category_id) {
                return Err(Error::unknown_category(&item.category_id));
            }
        }

        // A viewer position with bad coordinates cannot rank anything.
        let viewer = viewer.filter(|v| {
            let ok = v.is_valid();
            if !ok {
                warn!(lat = v.lat, lon = v.lon, "ignoring invalid viewer location");
            }
            ok
        });

        let mut curated = curated;
        let mut field = field;
        if let Some(viewer) = viewer {
            sort_tier_by_distance(&mut curated, viewer);
            sort_tier_by_distance(&mut field, viewer);
        }

        let mut catalog = synthetic;
        catalog.extend(curated);
        catalog.extend(field);
        debug!(items = catalog.len(), "catalog built");
        Ok(catalog)
    }
}

/// Sub-sort one tier by ascending distance from the viewer.
///
/// Items with a malformed location are demoted to "no location" with a
/// warning rather than aborting the build; one bad GPS fix should not block
/// the whole catalog. The sort is stable, so unlocated items keep their
/// relative input order behind all located ones.
fn sort_tier_by_distance(tier: &mut [CatalogItem], viewer: Location) {
    let distances: Vec<Option<f64>> = tier
        .iter()
        .map(|item| {
            if item.location.is_some() && item.valid_location().is_none() {
                warn!(id = %item.id, "item has malformed coordinates, sorting as unlocated");
            }
            item.valid_location()
                .map(|loc| haversine_meters(viewer, loc))
        })
        .collect();

    let mut order: Vec<usize> = (0..tier.len()).collect();
    order.sort_by(|&a, &b| match (distances[a], distances[b]) {
        (Some(da), Some(db)) => da.total_cmp(&db),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut sorted: Vec<CatalogItem> = order.into_iter().map(|i| tier[i].clone()).collect();
    tier.swap_with_slice(&mut sorted);
}

/// The six built-in synthesized teaching calls.
///
/// Ids are stable (`syn_*`) so the audio collaborator can resolve them and
/// suggestion links can jump to them. Alarm and mobbing are flagged as
/// dangerous: played without context they can frighten a flock for hours.
#[must_use]
pub fn synthetic_demos() -> Vec<CatalogItem> {
    let demos: [(&str, &str, &str, &str, &str, bool); 6] = [
        (
            "syn_contact",
            "Contact (2 calls)",
            "kraa\u{2026} kraa",
            "kontaktrop",
            "Longer = friendly",
            false,
        ),
        (
            "syn_food",
            "Food (3 short)",
            "kra-kra-kra",
            "matrop",
            "Shorter near food",
            false,
        ),
        (
            "syn_alarm",
            "Alarm (3 fast)",
            "KRA! KRA! KRA!",
            "alarm",
            "3 = warning",
            true,
        ),
        (
            "syn_mob",
            "Mobbing (5+)",
            "KRA-KRA-KRA-KRA-KRA",
            "mobbing",
            "5+ = rally the flock",
            true,
        ),
        (
            "syn_content",
            "Content (4 calls)",
            "kraa-kraa-kraa-kraa",
            "ovrigt",
            "Relaxed / observed",
            false,
        ),
        (
            "syn_click",
            "Rattle",
            "klk-klk-klk",
            "rassel",
            "Social close contact",
            false,
        ),
    ];

    demos
        .into_iter()
        .map(|(id, title, phonetic, category, interpretation, danger)| {
            let mut item = CatalogItem::new(id, SoundSource::Synthetic, category);
            item.title = title.to_string();
            item.phonetic = phonetic.to_string();
            item.interpretation = interpretation.to_string();
            item.audio_ref = format!("synth:{}", id.trim_start_matches("syn_"));
            item.danger = danger;
            item
        })
        .collect()
}

/// One entry in a curated sound manifest.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    phonetic: String,
    #[serde(default)]
    interpretation: String,
    category: String,
    audio: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

/// Load curated library recordings from a JSON manifest.
///
/// The manifest is supplied by the asset collaborator; each entry carries a
/// stable id, a category code, an opaque audio handle, and an optional
/// recording position.
///
/// # Errors
///
/// Returns [`Error::ManifestLoad`] if the file cannot be read or parsed.
pub fn load_curated_manifest(path: impl AsRef<Path>) -> Result<Vec<CatalogItem>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| Error::ManifestLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(&raw).map_err(|e| Error::ManifestLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(entries = entries.len(), path = %path.display(), "curated manifest loaded");
    Ok(entries
        .into_iter()
        .map(|entry| {
            let mut item = CatalogItem::new(entry.id, SoundSource::Curated, entry.category);
            item.title = entry.title;
            item.phonetic = entry.phonetic;
            item.interpretation = entry.interpretation;
            item.audio_ref = entry.audio;
            item.location = match (entry.lat, entry.lon) {
                (Some(lat), Some(lon)) => Some(Location::new(lat, lon)),
                _ => None,
            };
            item.duration_seconds = entry.duration;
            item
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, source: SoundSource, category: &str) -> CatalogItem {
        CatalogItem::new(id, source, category)
    }

    fn located(id: &str, source: SoundSource, category: &str, lat: f64, lon: f64) -> CatalogItem {
        let mut item = item(id, source, category);
        item.location = Some(Location::new(lat, lon));
        item
    }

    fn registry() -> CategoryRegistry {
        CategoryRegistry::builtin()
    }

    #[test]
    fn test_tier_precedence() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);

        let catalog = builder
            .build(
                vec![item("s1", SoundSource::Synthetic, "kontaktrop")],
                vec![item("c1", SoundSource::Curated, "alarm")],
                vec![item("f1", SoundSource::FieldRecorded, "ovrigt")],
                None,
            )
            .unwrap();

        let sources: Vec<SoundSource> = catalog.iter().map(|i| i.source).collect();
        assert_eq!(
            sources,
            vec![
                SoundSource::Synthetic,
                SoundSource::Curated,
                SoundSource::FieldRecorded,
            ]
        );
    }

    #[test]
    fn test_insertion_order_kept_without_viewer() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);

        let catalog = builder
            .build(
                vec![],
                vec![
                    located("c1", SoundSource::Curated, "alarm", 59.0, 18.0),
                    item("c2", SoundSource::Curated, "alarm"),
                    located("c3", SoundSource::Curated, "alarm", 10.0, 10.0),
                ],
                vec![],
                None,
            )
            .unwrap();

        let ids: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn test_geo_sort_500_10_200() {
        // Recordings roughly 500m, 10m and 200m north of the viewer, in
        // input order [A(500), B(10), C(200)], must come out [B, C, A].
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);
        let viewer = Location::new(59.0, 18.0);

        let catalog = builder
            .build(
                vec![],
                vec![
                    located("A", SoundSource::Curated, "alarm", 59.0045, 18.0),
                    located("B", SoundSource::Curated, "alarm", 59.00009, 18.0),
                    located("C", SoundSource::Curated, "alarm", 59.0018, 18.0),
                ],
                vec![],
                Some(viewer),
            )
            .unwrap();

        let ids: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_unlocated_items_sort_after_located_stably() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);
        let viewer = Location::new(59.0, 18.0);

        let catalog = builder
            .build(
                vec![],
                vec![],
                vec![
                    item("u1", SoundSource::FieldRecorded, "ovrigt"),
                    located("near", SoundSource::FieldRecorded, "ovrigt", 59.0001, 18.0),
                    item("u2", SoundSource::FieldRecorded, "ovrigt"),
                    located("far", SoundSource::FieldRecorded, "ovrigt", 60.0, 18.0),
                ],
                Some(viewer),
            )
            .unwrap();

        let ids: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far", "u1", "u2"]);
    }

    #[test]
    fn test_synthetic_tier_never_geo_sorted() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);
        let viewer = Location::new(59.0, 18.0);

        let catalog = builder
            .build(
                vec![
                    located("s_far", SoundSource::Synthetic, "kontaktrop", 60.0, 18.0),
                    located("s_near", SoundSource::Synthetic, "kontaktrop", 59.0, 18.0),
                ],
                vec![],
                vec![],
                Some(viewer),
            )
            .unwrap();

        let ids: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["s_far", "s_near"]);
    }

    #[test]
    fn test_malformed_location_sorts_as_unlocated() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);
        let viewer = Location::new(59.0, 18.0);

        let catalog = builder
            .build(
                vec![],
                vec![
                    located("bad", SoundSource::Curated, "alarm", 200.0, 18.0),
                    located("good", SoundSource::Curated, "alarm", 59.001, 18.0),
                ],
                vec![],
                Some(viewer),
            )
            .unwrap();

        let ids: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "bad"]);
    }

    #[test]
    fn test_invalid_viewer_location_ignored() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);

        let catalog = builder
            .build(
                vec![],
                vec![
                    located("c1", SoundSource::Curated, "alarm", 60.0, 18.0),
                    located("c2", SoundSource::Curated, "alarm", 59.0, 18.0),
                ],
                vec![],
                Some(Location::new(f64::NAN, 18.0)),
            )
            .unwrap();

        // No re-ordering without a usable viewer position.
        let ids: Vec<&str> = catalog.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_duplicate_id_across_tiers_fails() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);

        let err = builder
            .build(
                vec![item("dup", SoundSource::Synthetic, "kontaktrop")],
                vec![],
                vec![item("dup", SoundSource::FieldRecorded, "ovrigt")],
                None,
            )
            .unwrap_err();

        assert!(err.is_duplicate_item());
        assert!(err.to_string().contains("dup"));
    }

    #[test]
    fn test_duplicate_id_within_tier_fails() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);

        let err = builder
            .build(
                vec![],
                vec![
                    item("x", SoundSource::Curated, "alarm"),
                    item("x", SoundSource::Curated, "alarm"),
                ],
                vec![],
                None,
            )
            .unwrap_err();

        assert!(err.is_duplicate_item());
    }

    #[test]
    fn test_unknown_category_fails_not_skips() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);

        let err = builder
            .build(
                vec![item("s1", SoundSource::Synthetic, "kontaktrop")],
                vec![item("c1", SoundSource::Curated, "not_a_category")],
                vec![],
                None,
            )
            .unwrap_err();

        assert!(matches!(err, Error::UnknownCategory { .. }));
    }

    #[test]
    fn test_empty_sources_build_empty_catalog() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);
        let catalog = builder.build(vec![], vec![], vec![], None).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_synthetic_demos_resolve_in_builtin_registry() {
        let registry = registry();
        let builder = CatalogBuilder::new(&registry);
        let demos = synthetic_demos();
        assert_eq!(demos.len(), 6);

        let catalog = builder.build(demos, vec![], vec![], None).unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog[0].id, "syn_contact");
    }

    #[test]
    fn test_synthetic_demos_danger_flags() {
        let demos = synthetic_demos();
        let dangerous: Vec<&str> = demos
            .iter()
            .filter(|d| d.danger)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(dangerous, vec!["syn_alarm", "syn_mob"]);
    }

    #[test]
    fn test_load_curated_manifest() {
        let dir = std::env::temp_dir().join("crowtalk_manifest_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("manifest.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "xc_1", "title": "Alarm at dusk", "category": "alarm",
                 "audio": "xc:802133", "lat": 59.3, "lon": 18.1, "duration": 12.5},
                {"id": "xc_2", "category": "kontaktrop", "audio": "xc:911245"}
            ]"#,
        )
        .unwrap();

        let items = load_curated_manifest(&path).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, SoundSource::Curated);
        assert_eq!(items[0].audio_ref, "xc:802133");
        assert!(items[0].location.is_some());
        assert_eq!(items[0].duration_seconds, Some(12.5));
        assert!(items[1].location.is_none());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_curated_manifest_missing_file() {
        let err = load_curated_manifest("/nonexistent/manifest.json").unwrap_err();
        assert!(matches!(err, Error::ManifestLoad { .. }));
    }

    #[test]
    fn test_load_curated_manifest_bad_json() {
        let dir = std::env::temp_dir().join("crowtalk_manifest_test_bad");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("manifest.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_curated_manifest(&path).unwrap_err();
        assert!(matches!(err, Error::ManifestLoad { .. }));

        std::fs::remove_file(&path).ok();
    }
}
