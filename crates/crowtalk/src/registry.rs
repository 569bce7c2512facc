//! Category registry for crowtalk.
//!
//! Vocalization categories are a frozen external contract: exported logs and
//! field notes reference category ids permanently, so an id must never be
//! renamed or reused once shipped. The registry is therefore constructed once
//! at process start and exposes no mutation API, which prevents category-id
//! drift mid-session.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Trigger value that matches any response for a category.
pub const WILDCARD_TRIGGER: &str = "*";

/// One suggestion rule: when the crow responds with `trigger`, recommend
/// playing `suggest` next.
///
/// Rule table contents are configuration data, not part of the engine's
/// logic contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideRule {
    /// Observed response tag this rule fires on, or `"*"` for any.
    pub trigger: String,
    /// Category ids to try next, in recommended order. May be empty when
    /// the right move is to play nothing.
    pub suggest: Vec<String>,
    /// Field guidance shown alongside the suggestion, returned verbatim.
    pub note: String,
}

impl GuideRule {
    /// Create a new rule.
    #[must_use]
    pub fn new(
        trigger: impl Into<String>,
        suggest: Vec<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            suggest,
            note: note.into(),
        }
    }

    /// Check whether this rule is the wildcard fallback.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.trigger == WILDCARD_TRIGGER
    }
}

/// A semantic vocalization type with a stable short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable short code. Never renamed once shipped.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Display description (call shape, context, cautions).
    pub description: String,
    /// Ordered suggestion rules consulted by the suggestion engine.
    #[serde(default)]
    pub guide_rules: Vec<GuideRule>,
}

/// Immutable lookup table of vocalization categories.
///
/// Loaded once from a static definition (built-in table or a TOML file) and
/// passed by reference to every component that needs it. `all()` preserves
/// declaration order, which is the canonical UI ordering for pickers.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

/// On-disk shape of a category definition file.
#[derive(Debug, Deserialize)]
struct CategoryFile {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Build a registry from a list of category definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, an id is empty or duplicated,
    /// or a rule suggests a category id that is not declared.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::registry_validation("no categories defined"));
        }

        let mut index = HashMap::with_capacity(categories.len());
        for (i, category) in categories.iter().enumerate() {
            if category.id.is_empty() {
                return Err(Error::registry_validation(format!(
                    "category at position {i} has an empty id"
                )));
            }
            if index.insert(category.id.clone(), i).is_some() {
                return Err(Error::registry_validation(format!(
                    "duplicate category id '{}'",
                    category.id
                )));
            }
        }

        // Rule targets must resolve within the same table, otherwise the
        // suggestion engine would hand the UI ids it cannot render.
        let ids: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        for category in &categories {
            for rule in &category.guide_rules {
                for target in &rule.suggest {
                    if !ids.contains(target.as_str()) {
                        return Err(Error::registry_validation(format!(
                            "category '{}' rule '{}' suggests undeclared category '{}'",
                            category.id, rule.trigger, target
                        )));
                    }
                }
            }
        }

        Ok(Self { categories, index })
    }

    /// Load a registry from a TOML definition file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file: CategoryFile = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .extract()?;
        Self::new(file.categories)
    }

    /// The shipped category table.
    ///
    /// Eight categories of hooded-crow vocalization with suggestion rules
    /// drawn from the field guide.
    ///
    /// # Panics
    ///
    /// Panics if the shipped table fails validation, which would be a bug.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn builtin() -> Self {
        let categories = vec![
            Category {
                id: "kontaktrop".to_string(),
                label: "Contact call".to_string(),
                description: "1\u{2013}2 soft calls. Signals presence and willingness to \
                              communicate; the crow is relaxed and social. The safest \
                              call to start with."
                    .to_string(),
                guide_rules: vec![
                    GuideRule::new(
                        "approached",
                        vec!["rassel".to_string(), "kontaktrop".to_string()],
                        "A softer tone signals you are harmless.",
                    ),
                    GuideRule::new(
                        "answered",
                        vec!["kontaktrop".to_string(), "matrop".to_string()],
                        "Match the rhythm. Wait 3\u{2013}5 seconds after each call.",
                    ),
                    GuideRule::new(
                        "ignored",
                        vec!["matrop".to_string(), "kontaktrop".to_string()],
                        "Try again near a visible food attraction.",
                    ),
                    GuideRule::new(
                        WILDCARD_TRIGGER,
                        vec!["kontaktrop".to_string()],
                        "Keep the same gentle cadence and observe.",
                    ),
                ],
            },
            Category {
                id: "alarm".to_string(),
                label: "Alarm".to_string(),
                description: "3 fast, loud calls. The crow perceives a threat. Playing \
                              it without context risks frightening the whole flock \
                              permanently."
                    .to_string(),
                guide_rules: vec![
                    GuideRule::new(
                        "fled",
                        vec!["kontaktrop".to_string()],
                        "Wait at least five minutes, then re-establish trust with a \
                         calm contact call.",
                    ),
                    GuideRule::new(
                        "group",
                        vec![],
                        "Play nothing. Document how many gather and from which \
                         direction.",
                    ),
                    GuideRule::new(
                        WILDCARD_TRIGGER,
                        vec!["kontaktrop".to_string()],
                        "Let the crow calm down before any further playback.",
                    ),
                ],
            },
            Category {
                id: "mobbing".to_string(),
                label: "Mobbing".to_string(),
                description: "5+ intense calls that rally the flock against a shared \
                              threat. Only use to study flock response; it can disturb \
                              crows for hours."
                    .to_string(),
                guide_rules: vec![GuideRule::new(
                    WILDCARD_TRIGGER,
                    vec![],
                    "Wait and observe. Document how many gather and from which \
                     direction.",
                )],
            },
            Category {
                id: "matrop".to_string(),
                label: "Food call".to_string(),
                description: "Short calls near food. Triggers curiosity and \
                              recruitment; crows share food sources within the flock."
                    .to_string(),
                guide_rules: vec![
                    GuideRule::new(
                        "approached",
                        vec!["kontaktrop".to_string(), "matrop".to_string()],
                        "Make contact with the crow without escalating.",
                    ),
                    GuideRule::new(
                        "ignored",
                        vec!["matrop".to_string()],
                        "Repeat if the crow looks interested but hesitates.",
                    ),
                    GuideRule::new(
                        WILDCARD_TRIGGER,
                        vec!["kontaktrop".to_string()],
                        "Fall back to a calm contact call.",
                    ),
                ],
            },
            Category {
                id: "territorial".to_string(),
                label: "Territorial".to_string(),
                description: "Powerful calls defending an area.".to_string(),
                guide_rules: vec![
                    GuideRule::new(
                        "fled",
                        vec!["kontaktrop".to_string()],
                        "The bird yielded the spot. Re-establish contact gently.",
                    ),
                    GuideRule::new(
                        WILDCARD_TRIGGER,
                        vec!["kontaktrop".to_string()],
                        "Do not press a defending bird; keep your distance.",
                    ),
                ],
            },
            Category {
                id: "rassel".to_string(),
                label: "Rattle".to_string(),
                description: "Clicking rattle used at close range between crows that \
                              know each other. Effective once trust is built."
                    .to_string(),
                guide_rules: vec![
                    GuideRule::new(
                        "answered",
                        vec!["rassel".to_string(), "kontaktrop".to_string()],
                        "Match the intimacy level; do not escalate to alarm.",
                    ),
                    GuideRule::new(
                        WILDCARD_TRIGGER,
                        vec!["kontaktrop".to_string()],
                        "Signal that you are calm and friendly.",
                    ),
                ],
            },
            Category {
                id: "juvenil".to_string(),
                label: "Juvenile".to_string(),
                description: "High-pitched begging calls of young birds.".to_string(),
                guide_rules: vec![GuideRule::new(
                    WILDCARD_TRIGGER,
                    vec!["kontaktrop".to_string()],
                    "Juveniles and regional dialects deviate; respond softly and \
                     observe.",
                )],
            },
            Category {
                id: "ovrigt".to_string(),
                label: "Other".to_string(),
                description: "Unclassified sound. Compare rhythm and pitch against \
                              known call categories."
                    .to_string(),
                guide_rules: vec![GuideRule::new(
                    WILDCARD_TRIGGER,
                    vec!["kontaktrop".to_string()],
                    "The safest choice in an unknown context.",
                )],
            },
        ];

        // The shipped table always validates.
        Self::new(categories).expect("builtin category table must be valid")
    }

    /// Look up a category by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the id does not resolve.
    pub fn lookup(&self, id: &str) -> Result<&Category> {
        self.index
            .get(id)
            .map(|&i| &self.categories[i])
            .ok_or_else(|| Error::unknown_category(id))
    }

    /// Check whether a category id resolves.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All categories in declaration order.
    #[must_use]
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the registry is empty (never true for a constructed registry).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            label: id.to_string(),
            description: String::new(),
            guide_rules: vec![],
        }
    }

    #[test]
    fn test_builtin_has_shipped_codes() {
        let registry = CategoryRegistry::builtin();
        for id in [
            "kontaktrop",
            "alarm",
            "mobbing",
            "matrop",
            "territorial",
            "rassel",
            "juvenil",
            "ovrigt",
        ] {
            assert!(registry.contains(id), "missing category {id}");
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn test_builtin_declaration_order_stable() {
        let registry = CategoryRegistry::builtin();
        let ids: Vec<&str> = registry.all().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "kontaktrop",
                "alarm",
                "mobbing",
                "matrop",
                "territorial",
                "rassel",
                "juvenil",
                "ovrigt",
            ]
        );
    }

    #[test]
    fn test_builtin_rules_resolve() {
        // Every suggested id in the shipped table must itself be a category.
        let registry = CategoryRegistry::builtin();
        for category in registry.all() {
            for rule in &category.guide_rules {
                for target in &rule.suggest {
                    assert!(registry.contains(target));
                }
            }
        }
    }

    #[test]
    fn test_lookup_known() {
        let registry = CategoryRegistry::builtin();
        let category = registry.lookup("alarm").unwrap();
        assert_eq!(category.label, "Alarm");
    }

    #[test]
    fn test_lookup_unknown_fails() {
        let registry = CategoryRegistry::builtin();
        let err = registry.lookup("warbler").unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { .. }));
    }

    #[test]
    fn test_new_rejects_empty_list() {
        let err = CategoryRegistry::new(vec![]).unwrap_err();
        assert!(err.to_string().contains("no categories"));
    }

    #[test]
    fn test_new_rejects_empty_id() {
        let err = CategoryRegistry::new(vec![minimal_category("")]).unwrap_err();
        assert!(err.to_string().contains("empty id"));
    }

    #[test]
    fn test_new_rejects_duplicate_id() {
        let err =
            CategoryRegistry::new(vec![minimal_category("a"), minimal_category("a")]).unwrap_err();
        assert!(err.to_string().contains("duplicate category id 'a'"));
    }

    #[test]
    fn test_new_rejects_undeclared_rule_target() {
        let mut category = minimal_category("a");
        category.guide_rules = vec![GuideRule::new(
            "approached",
            vec!["missing".to_string()],
            "note",
        )];
        let err = CategoryRegistry::new(vec![category]).unwrap_err();
        assert!(err.to_string().contains("undeclared category 'missing'"));
    }

    #[test]
    fn test_wildcard_rule_detection() {
        let rule = GuideRule::new(WILDCARD_TRIGGER, vec![], "note");
        assert!(rule.is_wildcard());
        let rule = GuideRule::new("approached", vec![], "note");
        assert!(!rule.is_wildcard());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join("crowtalk_registry_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("categories.toml");
        std::fs::write(
            &path,
            r#"
[[categories]]
id = "contact"
label = "Contact"
description = "soft"

[[categories.guide_rules]]
trigger = "approached"
suggest = ["contact"]
note = "keep going"
"#,
        )
        .unwrap();

        let registry = CategoryRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 1);
        let category = registry.lookup("contact").unwrap();
        assert_eq!(category.guide_rules.len(), 1);
        assert_eq!(category.guide_rules[0].note, "keep going");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let dir = std::env::temp_dir().join("crowtalk_registry_test_bad");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("categories.toml");
        std::fs::write(
            &path,
            r#"
[[categories]]
id = "a"
label = "A"
description = ""

[[categories]]
id = "a"
label = "A again"
description = ""
"#,
        )
        .unwrap();

        let err = CategoryRegistry::load(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate category id"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_category_serde_roundtrip() {
        let registry = CategoryRegistry::builtin();
        let category = registry.lookup("kontaktrop").unwrap();
        let json = serde_json::to_string(category).unwrap();
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(*category, back);
    }
}
