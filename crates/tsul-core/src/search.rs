//! # Search Engine
//!
//! Ranked, case-insensitive substring search over a snapshot of items.
//! Stateless: the same `(query, corpus)` always yields the same result.
//! Debouncing is the caller's job.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  q = trim(query).lowercase()                                            │
//! │                                                                         │
//! │  lower(name) == q                          ──► Exact                    │
//! │  lower(name) ⊇ q  or  lower(price) ⊇ q     ──► Partial                  │
//! │  otherwise                                 ──► excluded                 │
//! │                                                                         │
//! │  Result: [all Exact ... , all Partial ...]  (corpus order kept in each) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Three operations share the corpus:
//! - [`search`] - the ranked dropdown
//! - [`filter_visible`] - type-ahead show/hide of every tile, no ranking
//! - [`filter_section`] - the Enter-key fallback over one section's titles

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Section used when an item does not name one.
pub const DEFAULT_SECTION: &str = "home";

// =============================================================================
// Corpus Types
// =============================================================================

/// Opaque handle back to a searchable item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the search corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: ItemId,

    /// Display name, e.g. `TSUL Hoodie – Black Colorway`.
    pub name: String,

    /// Price or label string as rendered, e.g. `$40`.
    pub price_label: String,

    /// Section the item lives in.
    pub section: String,

    /// Full rendered text of the tile, when it differs from name + label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SearchItem {
    /// Creates an item in the default section.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price_label: impl Into<String>) -> Self {
        SearchItem {
            id: ItemId::new(id),
            name: name.into(),
            price_label: price_label.into(),
            section: DEFAULT_SECTION.to_string(),
            text: None,
        }
    }

    /// Places the item in `section` (blank keeps the default).
    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        let section = section.into();
        if !section.trim().is_empty() {
            self.section = section;
        }
        self
    }

    /// Overrides the rendered text used by [`filter_visible`].
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Text the type-ahead filter looks at.
    pub fn rendered_text(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => format!("{} {}", self.name, self.price_label),
        }
    }
}

// =============================================================================
// Ranked Search
// =============================================================================

/// How an item matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Partial,
}

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    /// Display name of the item.
    pub label: String,
    pub kind: MatchKind,
    pub source: ItemId,
    pub section: String,
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

fn classify(item: &SearchItem, needle: &str) -> Option<MatchKind> {
    let name = item.name.to_lowercase();
    if name == needle {
        return Some(MatchKind::Exact);
    }
    if name.contains(needle) || item.price_label.to_lowercase().contains(needle) {
        return Some(MatchKind::Partial);
    }
    None
}

/// Ranked search over `corpus`.
///
/// An empty (or all-whitespace) query yields no matches.
///
/// ```rust
/// use tsul_core::search::{search, MatchKind, SearchItem};
///
/// let corpus = vec![
///     SearchItem::new("1", "Hoodie", "$40"),
///     SearchItem::new("2", "Hoodie Black", "$40"),
///     SearchItem::new("3", "Tee", "$40"),
/// ];
/// let hits = search("hoodie", &corpus);
/// assert_eq!(hits.len(), 2);
/// assert_eq!(hits[0].kind, MatchKind::Exact);
/// ```
pub fn search(query: &str, corpus: &[SearchItem]) -> Vec<SearchMatch> {
    let needle = normalize(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<SearchMatch> = corpus
        .iter()
        .filter_map(|item| {
            classify(item, &needle).map(|kind| SearchMatch {
                label: item.name.clone(),
                kind,
                source: item.id.clone(),
                section: item.section.clone(),
            })
        })
        .collect();

    // sort_by_key is stable: corpus order survives inside each kind
    matches.sort_by_key(|m| m.kind);
    matches
}

// =============================================================================
// Filters
// =============================================================================

/// Type-ahead filter: ids of every item whose rendered text contains the
/// query (case-insensitive). An empty query shows everything.
pub fn filter_visible(query: &str, corpus: &[SearchItem]) -> HashSet<ItemId> {
    let needle = normalize(query);
    corpus
        .iter()
        .filter(|item| item.rendered_text().to_lowercase().contains(&needle))
        .map(|item| item.id.clone())
        .collect()
}

/// Outcome of the section-scoped fallback filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFilter {
    pub section: String,

    /// Matching ids, in corpus order.
    pub visible: Vec<ItemId>,

    /// Inline message when nothing matched.
    pub empty_message: Option<String>,
}

/// Filters the items of one section by title.
///
/// When nothing matches, `empty_message` is `No results for "<query>"`
/// with the query as typed (trimmed).
pub fn filter_section(query: &str, section: &str, corpus: &[SearchItem]) -> SectionFilter {
    let needle = normalize(query);
    let visible: Vec<ItemId> = corpus
        .iter()
        .filter(|item| item.section == section)
        .filter(|item| item.name.to_lowercase().contains(&needle))
        .map(|item| item.id.clone())
        .collect();

    let empty_message = visible
        .is_empty()
        .then(|| format!("No results for \"{}\"", query.trim()));

    SectionFilter {
        section: section.to_string(),
        visible,
        empty_message,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<SearchItem> {
        vec![
            SearchItem::new("1", "Hoodie", "$40"),
            SearchItem::new("2", "Hoodie Black", "$40"),
            SearchItem::new("3", "Tee", "$40"),
        ]
    }

    fn labels(matches: &[SearchMatch]) -> Vec<(&str, MatchKind)> {
        matches.iter().map(|m| (m.label.as_str(), m.kind)).collect()
    }

    #[test]
    fn test_exact_before_partial() {
        let hits = search("hoodie", &corpus());
        assert_eq!(
            labels(&hits),
            vec![("Hoodie", MatchKind::Exact), ("Hoodie Black", MatchKind::Partial)]
        );
    }

    #[test]
    fn test_exact_ranks_first_even_when_later_in_corpus() {
        let corpus = vec![
            SearchItem::new("a", "Hoodie Black", "$40"),
            SearchItem::new("b", "Zip Hoodie", "$40"),
            SearchItem::new("c", "HOODIE", "$40"),
        ];
        let hits = search("Hoodie", &corpus);
        assert_eq!(
            labels(&hits),
            vec![
                ("HOODIE", MatchKind::Exact),
                ("Hoodie Black", MatchKind::Partial),
                ("Zip Hoodie", MatchKind::Partial),
            ]
        );
    }

    #[test]
    fn test_partial_keeps_corpus_order() {
        let corpus = vec![
            SearchItem::new("1", "Tee Zeta", "$40"),
            SearchItem::new("2", "Tee Alpha", "$40"),
            SearchItem::new("3", "Tee Mid", "$40"),
        ];
        let ids: Vec<_> = search("tee ", &corpus)
            .into_iter()
            .map(|m| m.source.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_price_label_matches_partially() {
        let corpus = vec![
            SearchItem::new("1", "Hoodie", "$40"),
            SearchItem::new("2", "Tee", "$25"),
        ];
        let hits = search("$25", &corpus);
        assert_eq!(labels(&hits), vec![("Tee", MatchKind::Partial)]);
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        assert!(search("", &corpus()).is_empty());
        assert!(search("   ", &corpus()).is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let c = corpus();
        assert_eq!(search("e", &c), search("e", &c));
    }

    #[test]
    fn test_match_carries_section() {
        let corpus = vec![SearchItem::new("1", "Hoodie", "$40").in_section("men")];
        assert_eq!(search("hoodie", &corpus)[0].section, "men");
        let blank = SearchItem::new("2", "Tee", "$40").in_section("  ");
        assert_eq!(blank.section, DEFAULT_SECTION);
    }

    #[test]
    fn test_filter_visible() {
        let corpus = vec![
            SearchItem::new("1", "Hoodie", "$40"),
            SearchItem::new("2", "Tee", "$40").with_text("TSUL Tee 100% cotton"),
        ];
        let visible = filter_visible("COTTON", &corpus);
        assert_eq!(visible.len(), 1);
        assert!(visible.contains(&ItemId::new("2")));

        assert_eq!(filter_visible("", &corpus).len(), 2);
        assert!(filter_visible("$40", &corpus).contains(&ItemId::new("1")));
    }

    #[test]
    fn test_filter_section() {
        let corpus = vec![
            SearchItem::new("1", "Hoodie", "$40").in_section("men"),
            SearchItem::new("2", "Tee", "$40").in_section("men"),
            SearchItem::new("3", "Hoodie", "$40").in_section("women"),
        ];

        let found = filter_section("hood", "men", &corpus);
        assert_eq!(found.visible, vec![ItemId::new("1")]);
        assert_eq!(found.empty_message, None);

        let none = filter_section("jacket", "men", &corpus);
        assert!(none.visible.is_empty());
        assert_eq!(none.empty_message.as_deref(), Some("No results for \"jacket\""));
    }
}
