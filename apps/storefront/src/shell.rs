//! # Headless Shell
//!
//! Drives the storefront from text: one command per stdin line, UI events
//! printed to stdout as they arrive.
//!
//! ```text
//! stdin ──► parse_line ──► RuntimeHandle::send ──► runtime
//!                                                     │
//! stdout ◄── format_event ◄── StdoutSink::emit ◄──────┘
//!        ◄── serde_json  ◄── JsonLinesSink::emit   (TSUL_OUTPUT=json)
//! ```

use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::commands::Command;
use crate::error::{AppResult, NoticeLevel};
use crate::events::{EventSink, UiEvent};
use crate::identity::AuthState;
use crate::render::render_search_results;

pub const HELP: &str = "\
Commands:
  add <price> <size> <name...>   add one unit of an item
  product [id]                   show a product page
  buy <id> [size]                add a catalog product (default size M)
  remove <n>                     remove receipt line n (1-based)
  clear                          empty the cart
  cart                           print the receipt
  search <query...>              search box (debounced)
  filter <query...>              live filter of product tiles
  find <query...>                Enter in the search box
  click                          next accent color
  resize <width> <height>        resize the particle canvas
  signup <email> <password>      create an account
  signin <email> <password>      sign in
  signout                        sign out
  verify <link>                  open a verification link
  help                           this list
  quit                           exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellInput {
    Command(Command),
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command `{0}`. Type `help` for the list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parses one line of shell input.
pub fn parse_line(line: &str) -> Result<ShellInput, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(ShellInput::Empty),
        "help" | "?" => return Ok(ShellInput::Help),
        "quit" | "exit" => return Ok(ShellInput::Quit),

        "add" => match args.as_slice() {
            [price, size, name @ ..] if !name.is_empty() => Command::AddItem {
                name: name.join(" "),
                price: price.to_string(),
                size: size.to_string(),
            },
            _ => return Err(ParseError::Usage("add <price> <size> <name...>")),
        },
        "product" => match args.as_slice() {
            [] => Command::ShowProduct { product_id: None },
            [id] => Command::ShowProduct {
                product_id: Some(id.to_string()),
            },
            _ => return Err(ParseError::Usage("product [id]")),
        },
        "buy" => match args.as_slice() {
            [id] => Command::AddProduct {
                product_id: id.to_string(),
                size: None,
            },
            [id, size] => Command::AddProduct {
                product_id: id.to_string(),
                size: Some(size.to_string()),
            },
            _ => return Err(ParseError::Usage("buy <id> [size]")),
        },
        "remove" => match args.as_slice() {
            [n] => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Command::RemoveItem { index: n - 1 },
                _ => return Err(ParseError::Usage("remove <n>  (n starts at 1)")),
            },
            _ => return Err(ParseError::Usage("remove <n>")),
        },
        "clear" => Command::ClearCart,
        "cart" => Command::ShowCart,

        "search" => Command::Search {
            query: rest.to_string(),
        },
        "filter" => Command::Filter {
            query: rest.to_string(),
        },
        "find" => Command::Find {
            query: rest.to_string(),
        },

        "click" => Command::Click,
        "resize" => match args.as_slice() {
            [w, h] => match (w.parse::<f64>(), h.parse::<f64>()) {
                (Ok(width), Ok(height)) => Command::Resize { width, height },
                _ => return Err(ParseError::Usage("resize <width> <height>")),
            },
            _ => return Err(ParseError::Usage("resize <width> <height>")),
        },

        "signup" | "signin" => {
            let [email, password] = args.as_slice() else {
                return Err(ParseError::Usage(if word.eq_ignore_ascii_case("signup") {
                    "signup <email> <password>"
                } else {
                    "signin <email> <password>"
                }));
            };
            let (email, password) = (email.to_string(), password.to_string());
            if word.eq_ignore_ascii_case("signup") {
                Command::SignUp { email, password }
            } else {
                Command::SignIn { email, password }
            }
        }
        "signout" => Command::SignOut,
        "verify" => match args.as_slice() {
            [link] => Command::Verify {
                link: link.to_string(),
            },
            _ => return Err(ParseError::Usage("verify <link>")),
        },

        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(ShellInput::Command(command))
}

/// Text lines for one event. Some events print nothing.
pub fn format_event(event: &UiEvent) -> Vec<String> {
    match event {
        UiEvent::Notice(notice) => {
            let level = match notice.level {
                NoticeLevel::Success => "ok",
                NoticeLevel::Error => "error",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Info => "info",
            };
            vec![format!("[{}] {}", level, notice.message)]
        }
        UiEvent::CartUpdated { summary } => vec![format!(
            "Cart: {} line(s), {} item(s)",
            summary.line_count, summary.total_quantity
        )],
        UiEvent::ReceiptRendered { text, .. } => text.lines().map(str::to_string).collect(),
        UiEvent::SearchResults { query, matches } if matches.is_empty() => {
            vec![format!("No results for \"{}\"", query)]
        }
        UiEvent::SearchResults { matches, .. } => render_search_results(matches)
            .into_iter()
            .map(|row| format!("  {}", row))
            .collect(),
        UiEvent::SearchCleared => Vec::new(),
        UiEvent::VisibleItems { ids, .. } => {
            let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
            let shown = if ids.is_empty() {
                "(none)".to_string()
            } else {
                ids.join(", ")
            };
            vec![format!("Visible: {}", shown)]
        }
        UiEvent::SectionFiltered(filter) => match &filter.empty_message {
            Some(message) => vec![format!("#{}: {}", filter.section, message)],
            None => {
                let ids: Vec<&str> = filter.visible.iter().map(|id| id.as_str()).collect();
                vec![format!("#{}: {}", filter.section, ids.join(", "))]
            }
        },
        UiEvent::AccentChanged { color } => vec![format!("Accent: {}", color)],
        UiEvent::ProductShown { product, size } => vec![
            format!("{} - {}", product.name, product.price),
            product.description.clone(),
            format!("Material: {}", product.material),
            format!("Color: {}", product.color),
            format!("Made in: {}", product.origin),
            format!("Size: {}", size),
        ],
        UiEvent::ProductNotFound { message } => vec![message.clone()],
        UiEvent::AuthChanged { state } => vec![match state {
            AuthState::SignedOut => "Signed out".to_string(),
            AuthState::SignedIn(p) if p.email_verified => format!("Signed in as {}", p.email),
            AuthState::SignedIn(p) => format!("Signed in as {} (unverified)", p.email),
        }],
    }
}

/// Prints events to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, event: UiEvent) {
        let mut out = std::io::stdout().lock();
        for line in format_event(&event) {
            if writeln!(out, "{}", line).is_err() {
                return;
            }
        }
    }
}

/// Prints one JSON object per event, for a front end reading stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesSink;

impl EventSink for JsonLinesSink {
    fn emit(&self, event: UiEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => {
                let _ = writeln!(std::io::stdout().lock(), "{}", json);
            }
            Err(e) => warn!(error = %e, "Event could not be serialized"),
        }
    }
}

/// Feeds lines from `reader` into `send` until EOF or `quit`.
/// Returns the number of commands sent.
pub async fn run_lines<R, F, Fut>(reader: R, mut send: F) -> AppResult<usize>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(Command) -> Fut,
    Fut: std::future::Future<Output = AppResult<()>>,
{
    let mut lines = reader.lines();
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(ShellInput::Empty) => {}
            Ok(ShellInput::Help) => println!("{}", HELP),
            Ok(ShellInput::Quit) => break,
            Ok(ShellInput::Command(command)) => {
                debug!(command = command.name(), "Shell command");
                send(command).await?;
                sent += 1;
            }
            Err(err) => eprintln!("{}", err),
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Notice;
    use std::sync::{Arc, Mutex};
    use tsul_core::Catalog;

    fn command(line: &str) -> Command {
        match parse_line(line).unwrap() {
            ShellInput::Command(command) => command,
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_add_keeps_name_spaces() {
        assert_eq!(
            command("add $40.00 M  TSUL Hoodie – Black Colorway"),
            Command::AddItem {
                name: "TSUL Hoodie – Black Colorway".to_string(),
                price: "$40.00".to_string(),
                size: "M".to_string(),
            }
        );
        assert!(matches!(parse_line("add 40 M"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_remove_is_one_based() {
        assert_eq!(command("remove 1"), Command::RemoveItem { index: 0 });
        assert!(parse_line("remove 0").is_err());
        assert!(parse_line("remove two").is_err());
    }

    #[test]
    fn test_parse_queries_keep_raw_text() {
        assert_eq!(
            command("search  black tee"),
            Command::Search {
                query: "black tee".to_string()
            }
        );
        assert_eq!(
            command("search"),
            Command::Search {
                query: String::new()
            }
        );
        assert_eq!(
            command("FIND hoodie"),
            Command::Find {
                query: "hoodie".to_string()
            }
        );
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_line("   ").unwrap(), ShellInput::Empty);
        assert_eq!(parse_line("help").unwrap(), ShellInput::Help);
        assert_eq!(parse_line("exit").unwrap(), ShellInput::Quit);
        assert_eq!(command("product"), Command::ShowProduct { product_id: None });
        assert_eq!(
            command("buy tee L"),
            Command::AddProduct {
                product_id: "tee".to_string(),
                size: Some("L".to_string())
            }
        );
        assert_eq!(
            command("resize 800 600"),
            Command::Resize {
                width: 800.0,
                height: 600.0
            }
        );
        assert!(matches!(command("signin a@tsul.us pw1234"), Command::SignIn { .. }));
        assert_eq!(
            parse_line("dance"),
            Err(ParseError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_format_events() {
        assert_eq!(
            format_event(&UiEvent::Notice(Notice::success("TSUL Tee (M) added to cart"))),
            vec!["[ok] TSUL Tee (M) added to cart"]
        );
        assert!(format_event(&UiEvent::SearchCleared).is_empty());

        let catalog = Catalog::builtin();
        let tee = catalog.products().iter().find(|p| p.id == "tee").unwrap();
        let lines = format_event(&UiEvent::ProductShown {
            product: tee.clone(),
            size: "M".to_string(),
        });
        assert!(lines[0].ends_with("$40.00"));
        assert_eq!(lines.last().unwrap(), "Size: M");
    }

    #[tokio::test]
    async fn test_run_lines_stops_at_quit() {
        let input: &[u8] = b"buy tee\n\nbogus\ncart\nquit\nclear\n";
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sent = run_lines(input, |command| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push(command);
                Ok(())
            }
        })
        .await
        .unwrap();

        assert_eq!(sent, 2);
        assert_eq!(seen.lock().unwrap()[1], Command::ShowCart);
    }
}
