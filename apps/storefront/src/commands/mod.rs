//! # Commands
//!
//! Every UI interaction arrives as a [`Command`] and is handled to completion
//! before the next one starts.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (Command enum + dispatch)
//! ├── cart.rs     ◄─── add / remove / clear / render receipt
//! ├── product.rs  ◄─── product page, not-found state
//! ├── search.rs   ◄─── ranked search, live filter, section fallback
//! ├── page.rs     ◄─── accent clicks, canvas resize
//! └── account.rs  ◄─── sign-up / sign-in / sign-out / verify link
//! ```
//!
//! ## How Commands Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  shell line / page event                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  RuntimeHandle::send(Command) ──mpsc──► runtime task                    │
//! │                                              │                          │
//! │                          Search ─────────────┤──► Debouncer ──┐         │
//! │                                              │                │         │
//! │                                              ▼                ▼         │
//! │                                   dispatch(&mut ctx, sink, cmd)         │
//! │                                              │                          │
//! │                              Ok ─────────────┤──── Err(AppError)        │
//! │                              UiEvents        │     └─► UiEvent::Notice  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod account;
pub mod cart;
pub mod page;
pub mod product;
pub mod search;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::events::EventSink;

/// A UI interaction.
#[derive(Clone, PartialEq)]
pub enum Command {
    /// Add one unit of a variant; `price` as shown on the page.
    AddItem {
        name: String,
        price: String,
        size: String,
    },
    /// Add a catalog product; size defaults to M.
    AddProduct {
        product_id: String,
        size: Option<String>,
    },
    /// Remove the line at a 0-based index.
    RemoveItem { index: usize },
    ClearCart,
    ShowCart,
    ShowProduct { product_id: Option<String> },
    /// Search box input (debounced by the runtime).
    Search { query: String },
    /// Type-ahead tile filter (immediate).
    Filter { query: String },
    /// Enter in the search box.
    Find { query: String },
    Click,
    Resize { width: f64, height: f64 },
    SignUp { email: String, password: String },
    SignIn { email: String, password: String },
    SignOut,
    Verify { link: String },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddItem { .. } => "add_item",
            Command::AddProduct { .. } => "add_product",
            Command::RemoveItem { .. } => "remove_item",
            Command::ClearCart => "clear_cart",
            Command::ShowCart => "show_cart",
            Command::ShowProduct { .. } => "show_product",
            Command::Search { .. } => "search",
            Command::Filter { .. } => "filter",
            Command::Find { .. } => "find",
            Command::Click => "click",
            Command::Resize { .. } => "resize",
            Command::SignUp { .. } => "sign_up",
            Command::SignIn { .. } => "sign_in",
            Command::SignOut => "sign_out",
            Command::Verify { .. } => "verify",
        }
    }
}

// passwords stay out of logs
impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SignUp { email, .. } | Command::SignIn { email, .. } => f
                .debug_struct(self.name())
                .field("email", email)
                .finish_non_exhaustive(),
            Command::AddItem { name, price, size } => f
                .debug_struct(self.name())
                .field("name", name)
                .field("price", price)
                .field("size", size)
                .finish(),
            Command::AddProduct { product_id, size } => f
                .debug_struct(self.name())
                .field("product_id", product_id)
                .field("size", size)
                .finish(),
            Command::RemoveItem { index } => {
                f.debug_struct(self.name()).field("index", index).finish()
            }
            Command::ShowProduct { product_id } => f
                .debug_struct(self.name())
                .field("product_id", product_id)
                .finish(),
            Command::Search { query } | Command::Filter { query } | Command::Find { query } => {
                f.debug_struct(self.name()).field("query", query).finish()
            }
            Command::Resize { width, height } => f
                .debug_struct(self.name())
                .field("width", width)
                .field("height", height)
                .finish(),
            Command::Verify { link } => f.debug_struct(self.name()).field("link", link).finish(),
            Command::ClearCart | Command::ShowCart | Command::Click | Command::SignOut => {
                f.write_str(self.name())
            }
        }
    }
}

/// Runs one command to completion. `Search` runs without delay here; the
/// runtime debounces it before calling in.
pub async fn dispatch(ctx: &mut AppContext, sink: &dyn EventSink, command: Command) -> AppResult<()> {
    match command {
        Command::AddItem { name, price, size } => {
            cart::add_item(ctx, sink, &name, &price, &size).await
        }
        Command::AddProduct { product_id, size } => {
            cart::add_product(ctx, sink, &product_id, size.as_deref()).await
        }
        Command::RemoveItem { index } => cart::remove_item(ctx, sink, index).await,
        Command::ClearCart => cart::clear_cart(ctx, sink).await,
        Command::ShowCart => cart::render_cart(ctx, sink).await,
        Command::ShowProduct { product_id } => {
            product::show_product(ctx, sink, product_id.as_deref())
        }
        Command::Search { query } => search::run_search(ctx, sink, &query),
        Command::Filter { query } => search::filter(ctx, sink, &query),
        Command::Find { query } => search::find(ctx, sink, &query),
        Command::Click => page::click(ctx, sink),
        Command::Resize { width, height } => page::resize(ctx, width, height),
        Command::SignUp { email, password } => account::sign_up(ctx, sink, &email, &password).await,
        Command::SignIn { email, password } => account::sign_in(ctx, sink, &email, &password).await,
        Command::SignOut => account::sign_out(ctx, sink).await,
        Command::Verify { link } => account::verify(ctx, sink, &link).await,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::events::{ChannelSink, NoOpSink, UiEvent};
    use crate::identity::{IdentityBackend, LocalIdentity};
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    pub(crate) fn test_context_with(identity: Arc<dyn IdentityBackend>) -> AppContext {
        let mut config = StorefrontConfig::default();
        config.animation.particle_count = 4;
        AppContext::in_memory(config, identity).unwrap()
    }

    pub(crate) fn test_context() -> AppContext {
        test_context_with(Arc::new(LocalIdentity::new()))
    }

    pub(crate) fn drain(rx: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_debug_hides_password() {
        let cmd = Command::SignIn {
            email: "a@tsul.us".to_string(),
            password: "hunter22".to_string(),
        };
        let shown = format!("{:?}", cmd);
        assert!(shown.contains("a@tsul.us"));
        assert!(!shown.contains("hunter22"));
    }

    #[tokio::test]
    async fn test_dispatch_routes_cart_commands() {
        let mut ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();

        dispatch(
            &mut ctx,
            &sink,
            Command::AddProduct {
                product_id: "sweats".to_string(),
                size: Some("S".to_string()),
            },
        )
        .await
        .unwrap();
        dispatch(&mut ctx, &sink, Command::ShowCart).await.unwrap();

        let receipts = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, UiEvent::ReceiptRendered { .. }))
            .count();
        assert_eq!(receipts, 2);
    }

    #[tokio::test]
    async fn test_dispatch_without_a_page() {
        let mut ctx = test_context();

        dispatch(
            &mut ctx,
            &NoOpSink,
            Command::AddItem {
                name: "TSUL Tee".to_string(),
                price: "40".to_string(),
                size: "M".to_string(),
            },
        )
        .await
        .unwrap();
        dispatch(&mut ctx, &NoOpSink, Command::ShowProduct { product_id: None })
            .await
            .unwrap();

        let summary = ctx.cart.summary().await.unwrap();
        assert_eq!(summary.total_quantity, 1);
    }
}
