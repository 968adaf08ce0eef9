//! # Account Commands
//!
//! Thin wrappers over [`crate::account::AccountFlow`]. Auth-state changes
//! reach the page separately, through the runtime's watch on the backend.

use tracing::debug;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::events::{EventSink, UiEvent};

pub async fn sign_up(
    ctx: &AppContext,
    sink: &dyn EventSink,
    email: &str,
    password: &str,
) -> AppResult<()> {
    debug!("sign_up command");
    let notice = ctx.account.sign_up(email, password).await?;
    sink.emit(UiEvent::Notice(notice));
    Ok(())
}

pub async fn sign_in(
    ctx: &AppContext,
    sink: &dyn EventSink,
    email: &str,
    password: &str,
) -> AppResult<()> {
    debug!("sign_in command");
    let notice = ctx.account.sign_in(email, password).await?;
    sink.emit(UiEvent::Notice(notice));
    Ok(())
}

pub async fn sign_out(ctx: &AppContext, sink: &dyn EventSink) -> AppResult<()> {
    debug!("sign_out command");
    let notice = ctx.account.sign_out().await?;
    sink.emit(UiEvent::Notice(notice));
    Ok(())
}

/// Handles the page being opened from a verification link.
pub async fn verify(ctx: &AppContext, sink: &dyn EventSink, link: &str) -> AppResult<()> {
    debug!("verify command");
    if let Some(notice) = ctx.account.verify_link(link).await? {
        sink.emit(UiEvent::Notice(notice));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{drain, test_context_with};
    use crate::events::ChannelSink;
    use crate::identity::LocalIdentity;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_account_commands_emit_notices() {
        let idp = Arc::new(LocalIdentity::new());
        let ctx = test_context_with(idp.clone());
        let (sink, mut rx) = ChannelSink::new();

        sign_up(&ctx, &sink, "a@tsul.us", "secret1").await.unwrap();
        let link = idp.last_verification_link().await.unwrap();
        verify(&ctx, &sink, &link).await.unwrap();
        verify(&ctx, &sink, "https://tsul.us/").await.unwrap();
        sign_in(&ctx, &sink, "a@tsul.us", "secret1").await.unwrap();
        sign_out(&ctx, &sink).await.unwrap();

        let messages: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notice(n) => Some(n.message),
                _ => None,
            })
            .collect();
        assert_eq!(
            messages,
            vec![
                "Verification email sent to a@tsul.us.",
                "Email verified successfully!",
                "Logged in successfully!",
                "Signed out successfully.",
            ]
        );
    }
}
