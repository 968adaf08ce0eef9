//! # Identity Backend
//!
//! Accounts live outside the storefront. [`IdentityBackend`] is the seam the
//! account flow talks to; [`LocalIdentity`] is an in-process implementation
//! for offline runs and tests.
//!
//! ## Auth State
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   SignedOut ──create_account──► SignedIn(unverified)                    │
//! │       ▲    ──sign_in─────────► SignedIn(verified | unverified)          │
//! │       │                                 │                               │
//! │       │                                 │ apply_verification_code       │
//! │       │                                 ▼                               │
//! │       └──────────sign_out──────── SignedIn(verified)                    │
//! │                                                                         │
//! │   Every transition is published on a watch channel; the runtime        │
//! │   forwards it to the page as UiEvent::AuthChanged.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use tsul_core::validation::{validate_email, validate_password};

/// Where verification links send the shopper back to.
pub const DEFAULT_CONTINUE_URL: &str = "https://tsul.us/verify";

/// Failure reported by the identity backend. Displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct IdentityError(String);

impl IdentityError {
    pub fn new(message: impl Into<String>) -> Self {
        IdentityError(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// A signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

/// Current authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "principal", rename_all = "camelCase")]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Principal),
}

impl AuthState {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthState::SignedOut => None,
            AuthState::SignedIn(p) => Some(p),
        }
    }

    /// The page treats only verified principals as logged in.
    pub fn is_logged_in(&self) -> bool {
        self.principal().is_some_and(|p| p.email_verified)
    }
}

/// Operations the storefront needs from an identity provider.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Creates an account and signs it in (unverified).
    async fn create_account(&self, email: &str, password: &str) -> IdentityResult<Principal>;

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Principal>;

    async fn sign_out(&self) -> IdentityResult<()>;

    /// Sends a verification link to the principal's email address.
    async fn send_verification(&self, principal: &Principal) -> IdentityResult<()>;

    /// Applies the `oobCode` from a verification link.
    async fn apply_verification_code(&self, code: &str) -> IdentityResult<()>;

    /// Auth-state changes. The receiver starts at the current state.
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}

/// Extracts the code from a `?mode=verifyEmail&oobCode=CODE` link.
///
/// Returns `None` for any other link, including a verify link with an empty
/// code.
pub fn parse_verification_link(link: &str) -> Option<String> {
    let query = match link.split_once('?') {
        Some((_, q)) => q,
        None => link,
    };
    let query = query.split('#').next().unwrap_or_default();

    let mut mode = None;
    let mut code = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("mode", v)) => mode = Some(v),
            Some(("oobCode", v)) => code = Some(v),
            _ => {}
        }
    }

    match (mode, code) {
        (Some("verifyEmail"), Some(c)) if !c.is_empty() => Some(c.to_string()),
        _ => None,
    }
}

// =============================================================================
// Local Backend
// =============================================================================

#[derive(Debug)]
struct Account {
    principal: Principal,
    password: String,
}

#[derive(Debug, Default)]
struct LocalState {
    /// Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    /// Outstanding verification code → account key.
    pending: HashMap<String, String>,
    /// Every link "sent", oldest first.
    outbox: Vec<String>,
}

/// In-process identity backend.
#[derive(Debug)]
pub struct LocalIdentity {
    state: Mutex<LocalState>,
    auth: watch::Sender<AuthState>,
    continue_url: String,
}

impl Default for LocalIdentity {
    fn default() -> Self {
        LocalIdentity::new()
    }
}

impl LocalIdentity {
    pub fn new() -> Self {
        LocalIdentity::with_continue_url(DEFAULT_CONTINUE_URL)
    }

    pub fn with_continue_url(url: impl Into<String>) -> Self {
        let (auth, _) = watch::channel(AuthState::SignedOut);
        LocalIdentity {
            state: Mutex::new(LocalState::default()),
            auth,
            continue_url: url.into(),
        }
    }

    pub fn verification_link(&self, code: &str) -> String {
        format!("{}?mode=verifyEmail&oobCode={}", self.continue_url, code)
    }

    /// Most recent verification link sent.
    pub async fn last_verification_link(&self) -> Option<String> {
        self.state.lock().await.outbox.last().cloned()
    }

    pub fn current(&self) -> AuthState {
        self.auth.borrow().clone()
    }
}

#[async_trait]
impl IdentityBackend for LocalIdentity {
    async fn create_account(&self, email: &str, password: &str) -> IdentityResult<Principal> {
        let email = validate_email(email).map_err(|_| IdentityError::new("Invalid email address."))?;
        validate_password(password)
            .map_err(|_| IdentityError::new("Password should be at least 6 characters."))?;

        let key = email.to_lowercase();
        let mut state = self.state.lock().await;
        if state.accounts.contains_key(&key) {
            return Err(IdentityError::new("Email address is already in use."));
        }

        let principal = Principal {
            uid: Uuid::new_v4().to_string(),
            email: email.to_string(),
            email_verified: false,
        };
        state.accounts.insert(
            key,
            Account {
                principal: principal.clone(),
                password: password.to_string(),
            },
        );
        drop(state);

        info!(uid = %principal.uid, "Account created");
        self.auth.send_replace(AuthState::SignedIn(principal.clone()));
        Ok(principal)
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Principal> {
        let state = self.state.lock().await;
        let principal = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.principal.clone())
            .ok_or_else(|| IdentityError::new("Invalid email or password."))?;
        drop(state);

        debug!(uid = %principal.uid, verified = principal.email_verified, "Signed in");
        self.auth.send_replace(AuthState::SignedIn(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> IdentityResult<()> {
        self.auth.send_replace(AuthState::SignedOut);
        debug!("Signed out");
        Ok(())
    }

    async fn send_verification(&self, principal: &Principal) -> IdentityResult<()> {
        let key = principal.email.to_lowercase();
        let code = Uuid::new_v4().simple().to_string();
        let link = self.verification_link(&code);

        let mut state = self.state.lock().await;
        if !state.accounts.contains_key(&key) {
            return Err(IdentityError::new("No account for this email address."));
        }
        info!(uid = %principal.uid, %link, "Verification link issued");
        state.pending.insert(code, key);
        state.outbox.push(link);
        Ok(())
    }

    async fn apply_verification_code(&self, code: &str) -> IdentityResult<()> {
        let mut state = self.state.lock().await;
        let key = state
            .pending
            .remove(code)
            .ok_or_else(|| IdentityError::new("The verification code is invalid or has expired."))?;

        let Some(account) = state.accounts.get_mut(&key) else {
            return Err(IdentityError::new("No account for this email address."));
        };
        account.principal.email_verified = true;
        let verified = account.principal.clone();
        drop(state);

        info!(uid = %verified.uid, "Email verified");
        self.auth.send_if_modified(|current| match current {
            AuthState::SignedIn(p) if p.uid == verified.uid => {
                *p = verified.clone();
                true
            }
            _ => false,
        });
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(link: &str) -> String {
        parse_verification_link(link).unwrap()
    }

    #[test]
    fn test_parse_verification_link() {
        assert_eq!(
            parse_verification_link("https://tsul.us/verify?mode=verifyEmail&oobCode=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            parse_verification_link("?oobCode=xyz&mode=verifyEmail#top"),
            Some("xyz".to_string())
        );
        assert_eq!(parse_verification_link("https://tsul.us/verify?mode=resetPassword&oobCode=a"), None);
        assert_eq!(parse_verification_link("https://tsul.us/verify?mode=verifyEmail&oobCode="), None);
        assert_eq!(parse_verification_link("https://tsul.us/"), None);
    }

    #[tokio::test]
    async fn test_sign_up_verify_sign_in() {
        let idp = LocalIdentity::new();
        let auth = idp.subscribe();

        let principal = idp.create_account("a@tsul.us", "secret1").await.unwrap();
        assert!(!principal.email_verified);
        assert!(!auth.borrow().is_logged_in());

        idp.send_verification(&principal).await.unwrap();
        let link = idp.last_verification_link().await.unwrap();
        assert!(link.starts_with("https://tsul.us/verify?mode=verifyEmail&oobCode="));

        idp.apply_verification_code(&code_of(&link)).await.unwrap();
        assert!(auth.borrow().is_logged_in());

        // codes are single use
        assert!(idp.apply_verification_code(&code_of(&link)).await.is_err());

        idp.sign_out().await.unwrap();
        assert_eq!(*auth.borrow(), AuthState::SignedOut);

        let again = idp.sign_in("A@TSUL.US", "secret1").await.unwrap();
        assert!(again.email_verified);
        assert_eq!(again.uid, principal.uid);
    }

    #[tokio::test]
    async fn test_backend_errors() {
        let idp = LocalIdentity::new();
        idp.create_account("a@tsul.us", "secret1").await.unwrap();

        let dup = idp.create_account("a@tsul.us", "secret1").await.unwrap_err();
        assert_eq!(dup.message(), "Email address is already in use.");

        let bad = idp.sign_in("a@tsul.us", "wrong!!").await.unwrap_err();
        assert_eq!(bad.to_string(), "Invalid email or password.");

        assert!(idp.create_account("not-an-email", "secret1").await.is_err());
    }

    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let idp = LocalIdentity::new();
        let mut auth = idp.subscribe();
        assert_eq!(*auth.borrow_and_update(), AuthState::SignedOut);

        idp.create_account("b@tsul.us", "secret1").await.unwrap();
        auth.changed().await.unwrap();
        assert_eq!(auth.borrow().principal().map(|p| p.email.as_str()), Some("b@tsul.us"));
    }
}
