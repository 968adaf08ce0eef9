//! # UI Events
//!
//! Everything the runtime wants the page to show goes out as a [`UiEvent`]
//! through an [`EventSink`]. The runtime never touches a widget directly.

use serde::Serialize;
use tokio::sync::mpsc;

use tsul_core::search::SectionFilter;
use tsul_core::{CartSummary, ItemId, Product, Receipt, Rgb, SearchMatch};

use crate::error::Notice;
use crate::identity::AuthState;

/// Something for the page to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    /// Transient message.
    Notice(Notice),

    /// Badge counts after any cart change.
    CartUpdated { summary: CartSummary },

    /// The receipt panel, already formatted.
    ReceiptRendered { receipt: Receipt, text: String },

    /// Dropdown results for the debounced search box.
    SearchResults { query: String, matches: Vec<SearchMatch> },

    /// The search box was emptied; hide the dropdown.
    SearchCleared,

    /// Items left visible by the live filter, sorted by id.
    VisibleItems { query: String, ids: Vec<ItemId> },

    /// Enter-key fallback filter of one section.
    SectionFiltered(SectionFilter),

    AccentChanged { color: Rgb },

    ProductShown { product: Product, size: String },

    /// Inline not-found state of the product page.
    ProductNotFound { message: String },

    AuthChanged { state: AuthState },
}

/// Receives UI events from the runtime.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: UiEvent);

    /// Whether the page has a product container to render into.
    fn has_product_view(&self) -> bool {
        true
    }
}

/// Drops every event.
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn emit(&self, _event: UiEvent) {}

    fn has_product_view(&self) -> bool {
        false
    }
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<UiEvent>,
    product_view: bool,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChannelSink {
            tx,
            product_view: true,
        };
        (sink, rx)
    }

    /// A page without a product container.
    pub fn without_product_view(mut self) -> Self {
        self.product_view = false;
        self
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: UiEvent) {
        // receiver gone means the page is gone
        let _ = self.tx.send(event);
    }

    fn has_product_view(&self) -> bool {
        self.product_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(UiEvent::SearchCleared);
        assert_eq!(rx.try_recv().unwrap(), UiEvent::SearchCleared);
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.emit(UiEvent::SearchCleared);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_value(UiEvent::AccentChanged {
            color: Rgb::new(0x30, 0x82, 0xFF),
        })
        .unwrap();
        assert_eq!(json["type"], "accentChanged");
        assert_eq!(json["color"], "#3082ff");
    }
}
