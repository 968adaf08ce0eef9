//! # Product Page Commands
//!
//! A missing id, an unknown id and a page with no product container all end
//! the same way: the inline "Product not found." state.

use tracing::debug;

use tsul_core::catalog::{DEFAULT_SIZE, NOT_FOUND_MESSAGE};
use tsul_core::ProductLookup;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::events::{EventSink, UiEvent};

/// Renders the product page for `product_id` with the default size selected.
pub fn show_product(
    ctx: &AppContext,
    sink: &dyn EventSink,
    product_id: Option<&str>,
) -> AppResult<()> {
    debug!(?product_id, "show_product command");
    let lookup = ctx
        .catalog
        .resolve(product_id)
        .require_target(sink.has_product_view());

    match lookup {
        ProductLookup::Found(product) => sink.emit(UiEvent::ProductShown {
            product: product.clone(),
            size: DEFAULT_SIZE.to_string(),
        }),
        ProductLookup::NotFound => emit_not_found(sink),
    }
    Ok(())
}

pub(crate) fn emit_not_found(sink: &dyn EventSink) {
    sink.emit(UiEvent::ProductNotFound {
        message: NOT_FOUND_MESSAGE.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{drain, test_context};
    use crate::events::ChannelSink;

    fn not_found() -> UiEvent {
        UiEvent::ProductNotFound {
            message: "Product not found.".to_string(),
        }
    }

    #[test]
    fn test_show_known_product() {
        let ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        show_product(&ctx, &sink, Some("hoodie")).unwrap();

        match drain(&mut rx).as_slice() {
            [UiEvent::ProductShown { product, size }] => {
                assert_eq!(product.name, "TSUL Hoodie – Black Colorway");
                assert_eq!(size, "M");
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[test]
    fn test_not_found_outcomes_are_identical() {
        let ctx = test_context();

        let (sink, mut rx) = ChannelSink::new();
        show_product(&ctx, &sink, None).unwrap();
        show_product(&ctx, &sink, Some("jacket")).unwrap();
        assert_eq!(drain(&mut rx), vec![not_found(), not_found()]);

        let (sink, mut rx) = ChannelSink::new();
        let sink = sink.without_product_view();
        show_product(&ctx, &sink, Some("hoodie")).unwrap();
        assert_eq!(drain(&mut rx), vec![not_found()]);
    }
}
