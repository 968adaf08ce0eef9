//! # Account Flow
//!
//! Turns the sign-up / sign-in / sign-out / verify-link forms into identity
//! backend calls and the notices the page shows for them.
//!
//! ```text
//! sign_up:  fields present? ─► password ≥ 6? ─► create_account ─► send_verification
//!              │ no                │ no              │ err              │ err
//!              ▼                   ▼                 ▼                  ▼
//!   "Enter both email    "Password must be   "Sign-up error: <backend message>"
//!    and password."       at least 6 ..."
//!
//! sign_in:  fields present? ─► sign_in ─► verified? ─► "Logged in successfully!"
//!                                             │ no
//!                                             ▼
//!                          warning "Please verify your email before logging in."
//! ```

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use tsul_core::validation::{require, validate_password};
use tsul_core::ValidationError;

use crate::error::{AccountAction, AppError, AppResult, Notice, ACCOUNT_NOTICE_MS};
use crate::identity::{parse_verification_link, AuthState, IdentityBackend};

const MISSING_CREDENTIALS: &str = "Enter both email and password.";

/// Account operations over an [`IdentityBackend`].
#[derive(Clone)]
pub struct AccountFlow {
    backend: Arc<dyn IdentityBackend>,
}

impl std::fmt::Debug for AccountFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountFlow").finish_non_exhaustive()
    }
}

impl AccountFlow {
    pub fn new(backend: Arc<dyn IdentityBackend>) -> Self {
        AccountFlow { backend }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.backend.subscribe()
    }

    /// Creates the account and sends the verification link.
    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<Notice> {
        let email = credentials(email, password)?;
        validate_password(password).map_err(|e| match e {
            ValidationError::TooShort { min, .. } => {
                AppError::Account(format!("Password must be at least {} characters.", min))
            }
            _ => AppError::Account(MISSING_CREDENTIALS.to_string()),
        })?;

        let principal = self
            .backend
            .create_account(email, password)
            .await
            .map_err(|e| AppError::identity(AccountAction::SignUp, e))?;
        self.backend
            .send_verification(&principal)
            .await
            .map_err(|e| AppError::identity(AccountAction::SignUp, e))?;

        debug!(uid = %principal.uid, "Sign-up complete, verification pending");
        Ok(account_notice(Notice::success(format!(
            "Verification email sent to {}.",
            email
        ))))
    }

    /// Signs in. An unverified principal gets a warning instead of a welcome.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Notice> {
        let email = credentials(email, password)?;

        let principal = self
            .backend
            .sign_in(email, password)
            .await
            .map_err(|e| AppError::identity(AccountAction::SignIn, e))?;

        let notice = if principal.email_verified {
            Notice::success("Logged in successfully!")
        } else {
            debug!(uid = %principal.uid, "Sign-in with unverified email");
            Notice::warning("Please verify your email before logging in.")
        };
        Ok(account_notice(notice))
    }

    pub async fn sign_out(&self) -> AppResult<Notice> {
        self.backend
            .sign_out()
            .await
            .map_err(|e| AppError::identity(AccountAction::SignOut, e))?;
        Ok(account_notice(Notice::success("Signed out successfully.")))
    }

    /// Applies a verification link. Links that are not `verifyEmail` links
    /// are ignored (`Ok(None)`).
    pub async fn verify_link(&self, link: &str) -> AppResult<Option<Notice>> {
        let Some(code) = parse_verification_link(link) else {
            debug!("Not a verification link, ignoring");
            return Ok(None);
        };

        self.backend
            .apply_verification_code(&code)
            .await
            .map_err(|e| AppError::identity(AccountAction::Verify, e))?;
        Ok(Some(account_notice(Notice::success(
            "Email verified successfully!",
        ))))
    }
}

fn credentials<'a>(email: &'a str, password: &str) -> AppResult<&'a str> {
    let missing = |_: ValidationError| AppError::Account(MISSING_CREDENTIALS.to_string());
    let email = require("email", email).map_err(missing)?;
    if password.is_empty() {
        return Err(AppError::Account(MISSING_CREDENTIALS.to_string()));
    }
    Ok(email)
}

fn account_notice(notice: Notice) -> Notice {
    notice.lasting(ACCOUNT_NOTICE_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NoticeLevel;
    use crate::identity::LocalIdentity;

    fn flow() -> (AccountFlow, Arc<LocalIdentity>) {
        let idp = Arc::new(LocalIdentity::new());
        (AccountFlow::new(idp.clone()), idp)
    }

    #[tokio::test]
    async fn test_sign_up_requires_both_fields() {
        let (flow, _) = flow();
        let err = flow.sign_up("", "secret1").await.unwrap_err();
        assert_eq!(err.notice().message, "Enter both email and password.");

        let err = flow.sign_in("a@tsul.us", "").await.unwrap_err();
        assert_eq!(err.notice().message, "Enter both email and password.");
    }

    #[tokio::test]
    async fn test_sign_up_short_password() {
        let (flow, _) = flow();
        let err = flow.sign_up("a@tsul.us", "abc").await.unwrap_err();
        let notice = err.notice();
        assert_eq!(notice.message, "Password must be at least 6 characters.");
        assert_eq!(notice.level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_full_account_cycle() {
        let (flow, idp) = flow();

        let notice = flow.sign_up("a@tsul.us", "secret1").await.unwrap();
        assert_eq!(notice.message, "Verification email sent to a@tsul.us.");
        assert_eq!(notice.duration_ms, ACCOUNT_NOTICE_MS);

        let notice = flow.sign_in("a@tsul.us", "secret1").await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Please verify your email before logging in.");

        let link = idp.last_verification_link().await.unwrap();
        let notice = flow.verify_link(&link).await.unwrap().unwrap();
        assert_eq!(notice.message, "Email verified successfully!");

        let notice = flow.sign_in("a@tsul.us", "secret1").await.unwrap();
        assert_eq!(notice.message, "Logged in successfully!");
        assert!(flow.subscribe().borrow().is_logged_in());

        let notice = flow.sign_out().await.unwrap();
        assert_eq!(notice.message, "Signed out successfully.");
        assert_eq!(*flow.subscribe().borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_backend_messages_are_prefixed() {
        let (flow, _) = flow();
        let err = flow.sign_in("nobody@tsul.us", "secret1").await.unwrap_err();
        assert_eq!(err.notice().message, "Login error: Invalid email or password.");

        flow.sign_up("a@tsul.us", "secret1").await.unwrap();
        let err = flow.sign_up("a@tsul.us", "secret1").await.unwrap_err();
        assert_eq!(
            err.notice().message,
            "Sign-up error: Email address is already in use."
        );

        let err = flow
            .verify_link("https://tsul.us/verify?mode=verifyEmail&oobCode=bogus")
            .await
            .unwrap_err();
        assert!(err.notice().message.starts_with("Verification failed: "));
    }

    #[tokio::test]
    async fn test_non_verify_link_is_ignored() {
        let (flow, _) = flow();
        assert_eq!(flow.verify_link("https://tsul.us/").await.unwrap(), None);
    }
}
