//! Suggestion engine for crowtalk.
//!
//! Given a category that was just played and the crow's observed response,
//! the engine consults the category's rule table and returns a ranked list
//! of next categories to try plus free-text guidance. The computation is a
//! pure function of its inputs; it holds no state beyond a reference to the
//! immutable registry, which is why it can be tested without any storage
//! or rendering dependency.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::SessionEvent;
use crate::registry::{Category, CategoryRegistry, GuideRule};

/// Number of trailing session events considered by the repetition penalty.
pub const REPETITION_WINDOW: usize = 3;

/// Guidance returned when no rule matches a response.
pub const DEFAULT_NOTE: &str = "repeat and observe";

/// The engine's recommended next move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Category ids to try next, best first.
    pub suggested_category_ids: Vec<String>,
    /// Field guidance, taken verbatim from the matched rule.
    pub note: String,
}

/// Computes next-action suggestions from the category rule tables.
#[derive(Debug)]
pub struct SuggestionEngine<'a> {
    registry: &'a CategoryRegistry,
}

impl<'a> SuggestionEngine<'a> {
    /// Create an engine backed by the given registry.
    #[must_use]
    pub fn new(registry: &'a CategoryRegistry) -> Self {
        Self { registry }
    }

    /// Suggest what to play next after `category` drew `response`.
    ///
    /// Rule matching is case-insensitive exact on the trigger, falling back
    /// to the category's `"*"` wildcard entry. If neither exists the engine
    /// recommends repeating the same stimulus rather than guessing.
    /// Categories played within the last [`REPETITION_WINDOW`] events are
    /// moved to the end of the list (not removed), since repeated identical
    /// stimuli show diminishing behavioral response in the field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCategory`] if `category` does not resolve in
    /// the registry. Callers must resolve categories through the registry
    /// first, so this indicates a programming error, not bad field data.
    pub fn suggest_next(
        &self,
        category: &Category,
        response: &str,
        recent_events: &[SessionEvent],
    ) -> Result<Suggestion> {
        if !self.registry.contains(&category.id) {
            return Err(Error::invalid_category(&category.id));
        }

        let Some(rule) = match_rule(category, response) else {
            debug!(category = %category.id, response, "no rule matched, suggesting repeat");
            return Ok(Suggestion {
                suggested_category_ids: vec![category.id.clone()],
                note: DEFAULT_NOTE.to_string(),
            });
        };

        let suggested = apply_repetition_penalty(&rule.suggest, recent_events);
        debug!(
            category = %category.id,
            response,
            trigger = %rule.trigger,
            "rule matched"
        );
        Ok(Suggestion {
            suggested_category_ids: suggested,
            note: rule.note.clone(),
        })
    }
}

/// Find the rule for a response: case-insensitive exact trigger match first,
/// then the wildcard entry if the category has one.
///
/// Case folding is Unicode-aware so triggers in user-supplied category files
/// (e.g. Swedish tags like "flög") match regardless of input casing.
fn match_rule<'c>(category: &'c Category, response: &str) -> Option<&'c GuideRule> {
    let response = response.to_lowercase();
    category
        .guide_rules
        .iter()
        .find(|rule| !rule.is_wildcard() && rule.trigger.to_lowercase() == response)
        .or_else(|| category.guide_rules.iter().find(|rule| rule.is_wildcard()))
}

/// Move categories played in the trailing event window to the end of the
/// suggestion list, preserving relative order within both groups.
fn apply_repetition_penalty(suggested: &[String], recent_events: &[SessionEvent]) -> Vec<String> {
    let window_start = recent_events.len().saturating_sub(REPETITION_WINDOW);
    let recent: Vec<&str> = recent_events[window_start..]
        .iter()
        .map(|e| e.category_id.as_str())
        .collect();

    let (penalized, fresh): (Vec<String>, Vec<String>) = suggested
        .iter()
        .cloned()
        .partition(|id| recent.contains(&id.as_str()));

    let mut result = fresh;
    result.extend(penalized);
    result
}
