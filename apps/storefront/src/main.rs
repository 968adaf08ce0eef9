//! # TSUL Storefront Entry Point
//!
//! ```text
//! tsul-storefront [config.toml]
//!
//!   stdin  ──► one command per line (`help` for the list)
//!   stdout ◄── receipts, search rows, notices
//!   stderr ◄── logs (RUST_LOG)
//! ```
//!
//! The actual setup is in lib.rs for better testability.

use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    match tsul_storefront::run(config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tsul-storefront: {}", err);
            ExitCode::FAILURE
        }
    }
}
