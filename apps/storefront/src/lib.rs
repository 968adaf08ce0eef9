//! # TSUL Storefront
//!
//! Application layer of the storefront: configuration, the command runtime,
//! the account flow and a headless line shell standing in for the page.
//!
//! ## Module Organization
//! ```text
//! tsul_storefront/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── storefront.toml + TSUL_* overrides
//! ├── context.rs      ◄─── AppContext: cart store, catalog, accent, particles
//! ├── runtime.rs      ◄─── select! loop: commands, debounce, frames, auth
//! ├── debounce.rs     ◄─── single-slot cancellable delay
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command enum + dispatch
//! │   ├── cart.rs     ◄─── add / remove / clear / receipt
//! │   ├── product.rs  ◄─── product page
//! │   ├── search.rs   ◄─── search, filter, find
//! │   ├── page.rs     ◄─── accent clicks, resize
//! │   └── account.rs  ◄─── sign-up / sign-in / sign-out / verify
//! ├── account.rs      ◄─── form validation + notices over an identity backend
//! ├── identity.rs     ◄─── IdentityBackend seam + in-process backend
//! ├── events.rs       ◄─── UiEvent + EventSink
//! ├── render.rs       ◄─── receipt text, search rows, particle Surface
//! ├── shell.rs        ◄─── stdin commands, stdout events
//! └── error.rs        ◄─── AppError → Notice
//! ```

pub mod account;
pub mod commands;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod events;
pub mod identity;
pub mod render;
pub mod runtime;
pub mod shell;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use commands::Command;
pub use config::StorefrontConfig;
pub use context::AppContext;
pub use error::{AppError, AppResult, Notice, NoticeLevel};
pub use events::{ChannelSink, EventSink, UiEvent};
pub use identity::{AuthState, IdentityBackend, LocalIdentity};
pub use runtime::{Runtime, RuntimeHandle};

use render::CountingSurface;
use shell::{JsonLinesSink, StdoutSink};

/// Set to `json` to print events as JSON lines instead of text.
pub const OUTPUT_ENV: &str = "TSUL_OUTPUT";

/// Runs the headless storefront until stdin closes or `quit`.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Storefront Startup                                │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,tsul=debug,sqlx=warn; override with RUST_LOG        │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • explicit path, $TSUL_CONFIG, or the platform config dir           │
/// │     • TSUL_* environment overrides                                      │
/// │                                                                         │
/// │  3. Build AppContext ─────────────────────────────────────────────────► │
/// │     • SQLite slot store (or memory), migrations                         │
/// │     • catalog, accent cycle, particle pool                              │
/// │                                                                         │
/// │  4. Spawn Runtime, render the persisted cart ─────────────────────────► │
/// │                                                                         │
/// │  5. Shell loop, then graceful shutdown ───────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> AppResult<()> {
    init_tracing();
    info!("Starting TSUL storefront");

    let config = StorefrontConfig::load_or_default(config_path);
    let identity: Arc<dyn IdentityBackend> = Arc::new(LocalIdentity::new());
    let ctx = AppContext::init(config, identity).await?;

    let surface = CountingSurface::new();
    let stats = surface.stats();
    let json = std::env::var(OUTPUT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let sink: Arc<dyn EventSink> = if json {
        Arc::new(JsonLinesSink)
    } else {
        Arc::new(StdoutSink)
    };
    let handle = Runtime::spawn(ctx, sink, Box::new(surface));

    // page load shows whatever cart survived the last session
    handle.send(Command::ShowCart).await?;
    if !json {
        println!("Type `help` for commands.");
    }

    let reader = BufReader::new(tokio::io::stdin());
    let sent = shell::run_lines(reader, |command| handle.send(command)).await?;

    handle.shutdown().await?;
    info!(commands = sent, frames = stats.frames(), "Storefront stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tsul_storefront=trace` - Include debounce tracing
/// - Default: INFO, DEBUG for the storefront crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tsul=debug,sqlx=warn"));

    // stdout carries UI events
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
