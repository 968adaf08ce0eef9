//! # Search Commands
//!
//! ```text
//! keystroke ──► Command::Search ──► Debouncer (300 ms) ──► run_search
//!                    │ empty                                   │
//!                    ▼                                         ▼
//!              SearchCleared                          SearchResults
//!
//! keystroke ──► Command::Filter ──► filter_visible ──► VisibleItems   (no delay)
//! Enter     ──► Command::Find   ──► filter_section ──► SectionFiltered
//! ```

use tracing::debug;

use tsul_core::search::{filter_section, filter_visible, search};
use tsul_core::ItemId;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::events::{EventSink, UiEvent};

/// Ranked dropdown results. Runs after the debounce delay.
pub fn run_search(ctx: &AppContext, sink: &dyn EventSink, query: &str) -> AppResult<()> {
    let query = query.trim();
    if query.is_empty() {
        sink.emit(UiEvent::SearchCleared);
        return Ok(());
    }

    let matches = search(query, &ctx.corpus);
    debug!(query, hits = matches.len(), "search");
    sink.emit(UiEvent::SearchResults {
        query: query.to_string(),
        matches,
    });
    Ok(())
}

/// Live filter of the visible product tiles.
pub fn filter(ctx: &AppContext, sink: &dyn EventSink, query: &str) -> AppResult<()> {
    let mut ids: Vec<ItemId> = filter_visible(query, &ctx.corpus).into_iter().collect();
    ids.sort();
    debug!(query, visible = ids.len(), "filter");
    sink.emit(UiEvent::VisibleItems {
        query: query.trim().to_string(),
        ids,
    });
    Ok(())
}

/// Enter-key fallback: filter the collection section by title.
pub fn find(ctx: &AppContext, sink: &dyn EventSink, query: &str) -> AppResult<()> {
    let section = &ctx.config.search.fallback_section;
    let outcome = filter_section(query, section, &ctx.corpus);
    debug!(query, section = %section, visible = outcome.visible.len(), "find");
    sink.emit(UiEvent::SectionFiltered(outcome));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{drain, test_context};
    use crate::events::ChannelSink;
    use tsul_core::MatchKind;

    #[test]
    fn test_search_results_ranked() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        run_search(&ctx, &sink, "  TSUL Tee – Black Colorway ").unwrap();

        match drain(&mut rx).as_slice() {
            [UiEvent::SearchResults { query, matches }] => {
                assert_eq!(query, "TSUL Tee – Black Colorway");
                assert_eq!(matches.len(), 1);
                assert_eq!(matches[0].kind, MatchKind::Exact);
                assert_eq!(matches[0].source.as_str(), "tee");
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_search_partial_keeps_catalog_order() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        run_search(&ctx, &sink, "black").unwrap();

        let events = drain(&mut rx);
        let UiEvent::SearchResults { matches, .. } = &events[0] else {
            panic!("expected results");
        };
        let ids: Vec<&str> = matches.iter().map(|m| m.source.as_str()).collect();
        assert_eq!(ids, vec!["sweats", "hoodie", "tee"]);
        assert!(matches.iter().all(|m| m.kind == MatchKind::Partial));
    }

    #[test]
    fn test_blank_search_clears() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        run_search(&ctx, &sink, "   ").unwrap();
        assert_eq!(drain(&mut rx), vec![UiEvent::SearchCleared]);
    }

    #[test]
    fn test_filter_matches_price_text() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        filter(&ctx, &sink, "$40").unwrap();
        filter(&ctx, &sink, "hood").unwrap();

        let events = drain(&mut rx);
        let UiEvent::VisibleItems { ids, .. } = &events[0] else {
            panic!("expected visible items");
        };
        assert_eq!(ids.len(), 3);
        assert_eq!(
            events[1],
            UiEvent::VisibleItems {
                query: "hood".to_string(),
                ids: vec![ItemId::new("hoodie")],
            }
        );
    }

    #[test]
    fn test_find_without_match_shows_message() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        find(&ctx, &sink, "jacket").unwrap();

        let events = drain(&mut rx);
        let UiEvent::SectionFiltered(outcome) = &events[0] else {
            panic!("expected section filter");
        };
        assert_eq!(outcome.section, "men");
        assert!(outcome.visible.is_empty());
        assert_eq!(outcome.empty_message.as_deref(), Some("No results for \"jacket\""));
    }
}
