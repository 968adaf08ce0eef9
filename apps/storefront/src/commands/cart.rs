//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐  add_item / add_product  ┌──────────┐                     │
//! │  │  Empty   │─────────────────────────►│ In Cart  │◄──┐ add (merge)     │
//! │  │  Cart    │◄─────────────────────────│          │───┘ remove_item     │
//! │  └──────────┘        clear_cart        └──────────┘                     │
//! │                                                                         │
//! │  Every mutation is followed by a full re-render: CartUpdated +         │
//! │  ReceiptRendered, read back from the persisted slot.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use tsul_core::catalog::select_size;
use tsul_core::{AddItemRequest, ProductLookup};

use crate::context::AppContext;
use crate::error::{AppResult, Notice};
use crate::events::{EventSink, UiEvent};
use crate::render::render_receipt;

/// Adds one unit of a variant typed or scraped from the page.
///
/// `price` is coerced (`"40"`, `"$40.00"`); a bad price, name or size aborts
/// without touching the cart.
pub async fn add_item(
    ctx: &AppContext,
    sink: &dyn EventSink,
    name: &str,
    price: &str,
    size: &str,
) -> AppResult<()> {
    debug!(name, price, size, "add_item command");
    let request = AddItemRequest::parse(name, price, size)?;
    add_request(ctx, sink, request).await
}

/// Adds a catalog product in the chosen size (default M).
///
/// An unknown product is the inline not-found state, not an error.
pub async fn add_product(
    ctx: &AppContext,
    sink: &dyn EventSink,
    product_id: &str,
    size: Option<&str>,
) -> AppResult<()> {
    debug!(product_id, ?size, "add_product command");
    let product = match ctx.catalog.resolve(Some(product_id)) {
        ProductLookup::Found(product) => product,
        ProductLookup::NotFound => {
            super::product::emit_not_found(sink);
            return Ok(());
        }
    };

    let size = select_size(size)?;
    let request = AddItemRequest::new(&product.name, product.price, size)?;
    add_request(ctx, sink, request).await
}

async fn add_request(
    ctx: &AppContext,
    sink: &dyn EventSink,
    request: AddItemRequest,
) -> AppResult<()> {
    let outcome = ctx.cart.add_item(request).await?;
    sink.emit(UiEvent::Notice(
        Notice::success(outcome.notice()).lasting(ctx.config.cart.notice_ms),
    ));
    render_cart(ctx, sink).await
}

/// Removes the line at `index` (0-based). Out of range changes nothing.
pub async fn remove_item(ctx: &AppContext, sink: &dyn EventSink, index: usize) -> AppResult<()> {
    debug!(index, "remove_item command");
    ctx.cart.remove_item(index).await?;
    render_cart(ctx, sink).await
}

pub async fn clear_cart(ctx: &AppContext, sink: &dyn EventSink) -> AppResult<()> {
    debug!("clear_cart command");
    ctx.cart.clear().await?;
    render_cart(ctx, sink).await
}

/// Re-renders the badge and receipt from the persisted cart.
pub async fn render_cart(ctx: &AppContext, sink: &dyn EventSink) -> AppResult<()> {
    let receipt = ctx.cart.receipt().await?;
    let summary = tsul_core::CartSummary::from(receipt.lines.as_slice());
    let text = render_receipt(&receipt, &ctx.config.store.receipt_title);

    sink.emit(UiEvent::CartUpdated { summary });
    sink.emit(UiEvent::ReceiptRendered { receipt, text });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{drain, test_context};
    use crate::error::{AppError, NoticeLevel};
    use crate::events::ChannelSink;

    #[tokio::test]
    async fn test_add_item_notifies_and_renders() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();

        add_item(&ctx, &sink, "TSUL Hoodie", "40", "M").await.unwrap();
        add_item(&ctx, &sink, "TSUL Hoodie", "$40.00", "M").await.unwrap();

        let events = drain(&mut rx);
        let notices: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "TSUL Hoodie (M) added to cart");
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[0].duration_ms, 3000);

        match events.last().unwrap() {
            UiEvent::ReceiptRendered { receipt, text } => {
                assert_eq!(receipt.lines.len(), 1);
                assert_eq!(receipt.total.cents(), 8660);
                assert!(text.contains("1. TSUL Hoodie (M) x2 - $80.00"));
                assert!(text.contains("Tax (8.25%): $6.60"));
            }
            other => panic!("expected receipt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_price_aborts_without_mutation() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();

        let err = add_item(&ctx, &sink, "TSUL Tee", "forty", "S").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(drain(&mut rx).is_empty());
        assert!(ctx.cart.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_product_defaults_to_medium() {
        let ctx = test_context();
        let (sink, _rx) = ChannelSink::new();

        add_product(&ctx, &sink, "tee", None).await.unwrap();
        add_product(&ctx, &sink, "tee", Some("L")).await.unwrap();

        let cart = ctx.cart.load().await.unwrap();
        let sizes: Vec<&str> = cart.lines().iter().map(|l| l.size.as_str()).collect();
        assert_eq!(sizes, vec!["M", "L"]);
        assert_eq!(cart.lines()[0].unit_price.cents(), 4000);
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();

        add_product(&ctx, &sink, "jacket", Some("M")).await.unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![UiEvent::ProductNotFound {
                message: "Product not found.".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_add_product_bad_size() {
        let ctx = test_context();
        let (sink, _rx) = ChannelSink::new();
        let err = add_product(&ctx, &sink, "tee", Some("XXL")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_remove_and_clear_render_each_time() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        add_item(&ctx, &sink, "TSUL Tee", "40", "S").await.unwrap();
        add_item(&ctx, &sink, "TSUL Hoodie", "40", "M").await.unwrap();
        drain(&mut rx);

        remove_item(&ctx, &sink, 7).await.unwrap();
        remove_item(&ctx, &sink, 0).await.unwrap();
        let renders = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, UiEvent::ReceiptRendered { .. }))
            .count();
        assert_eq!(renders, 2);
        assert_eq!(ctx.cart.load().await.unwrap().lines()[0].name, "TSUL Hoodie");

        clear_cart(&ctx, &sink).await.unwrap();
        let events = drain(&mut rx);
        assert!(events.contains(&UiEvent::CartUpdated {
            summary: Default::default()
        }));
    }
}
