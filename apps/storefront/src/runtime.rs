//! # Runtime
//!
//! One task owns the [`AppContext`] and does everything the page's event
//! loop did: handle UI commands one at a time, fire debounced searches,
//! draw particle frames and forward auth-state changes.
//!
//! ## Event Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          runtime task                                   │
//! │                                                                         │
//! │   tokio::select! {                                                      │
//! │     commands.recv()  ──► Search?  ──yes──► Debouncer::schedule          │
//! │                      │            (blank) ► cancel + SearchCleared      │
//! │                      └──── no ───────────► dispatch ──► UiEvents        │
//! │                                                                         │
//! │     fired.recv()     ──► accept(generation) ──► run_search              │
//! │                                                                         │
//! │     frames.tick()    ──► surface.clear ──► engine.frame ──► draw        │
//! │                                                                         │
//! │     auth.changed()   ──► AuthChanged { state }                          │
//! │   }                                                                     │
//! │                                                                         │
//! │   Command channel closed ──► loop ends ──► AppContext handed back       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A handler error never ends the loop; it becomes a [`UiEvent::Notice`].

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::commands::{dispatch, Command};
use crate::context::AppContext;
use crate::debounce::Debouncer;
use crate::error::{AppError, AppResult};
use crate::events::{EventSink, UiEvent};
use crate::render::Surface;

/// Commands that can queue before `send` waits.
const COMMAND_BUFFER: usize = 64;

/// Starts runtimes.
pub struct Runtime;

impl Runtime {
    /// Moves `ctx` into a new task and returns the handle that feeds it.
    pub fn spawn(
        ctx: AppContext,
        sink: Arc<dyn EventSink>,
        surface: Box<dyn Surface>,
    ) -> RuntimeHandle {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run_loop(ctx, sink, surface, rx));
        RuntimeHandle { commands: tx, task }
    }
}

/// Sending side of a running runtime.
#[derive(Debug)]
pub struct RuntimeHandle {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<AppContext>,
}

impl RuntimeHandle {
    /// Queues a command. Commands run in the order they were sent.
    pub async fn send(&self, command: Command) -> AppResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::RuntimeStopped)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Lets queued commands finish, then returns the context.
    pub async fn stop(self) -> AppResult<AppContext> {
        let RuntimeHandle { commands, task } = self;
        drop(commands);
        task.await.map_err(|e| {
            warn!(error = %e, "Runtime task ended abnormally");
            AppError::RuntimeStopped
        })
    }

    /// [`stop`](Self::stop), then closes storage.
    pub async fn shutdown(self) -> AppResult<()> {
        let ctx = self.stop().await?;
        ctx.close().await;
        Ok(())
    }
}

async fn run_loop(
    mut ctx: AppContext,
    sink: Arc<dyn EventSink>,
    mut surface: Box<dyn Surface>,
    mut commands: mpsc::Receiver<Command>,
) -> AppContext {
    let sink = sink.as_ref();
    let (mut debouncer, mut fired) = Debouncer::new(ctx.config.search.debounce());

    let mut frames = interval(ctx.config.animation.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let animate = ctx.particles.is_some();

    let mut auth = ctx.account.subscribe();
    let mut auth_open = true;
    let state = auth.borrow_and_update().clone();
    sink.emit(UiEvent::AuthChanged { state });

    info!(animate, debounce_ms = debouncer.delay().as_millis() as u64, "Runtime started");

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Search { query }) => {
                    if query.trim().is_empty() {
                        debouncer.cancel();
                        sink.emit(UiEvent::SearchCleared);
                    } else {
                        debouncer.schedule(query);
                    }
                }
                Some(command) => handle(&mut ctx, sink, command).await,
                None => break,
            },

            Some(value) = fired.recv() => {
                if let Some(query) = debouncer.accept(value) {
                    handle(&mut ctx, sink, Command::Search { query }).await;
                }
            }

            _ = frames.tick(), if animate => draw_frame(&mut ctx, surface.as_mut()),

            changed = auth.changed(), if auth_open => match changed {
                Ok(()) => {
                    let state = auth.borrow_and_update().clone();
                    debug!(logged_in = state.is_logged_in(), "Auth state changed");
                    sink.emit(UiEvent::AuthChanged { state });
                }
                Err(_) => {
                    debug!("Identity backend dropped its auth channel");
                    auth_open = false;
                }
            },
        }
    }

    debouncer.cancel();
    info!("Runtime stopped");
    ctx
}

async fn handle(ctx: &mut AppContext, sink: &dyn EventSink, command: Command) {
    let name = command.name();
    if let Err(err) = dispatch(ctx, sink, command).await {
        debug!(command = name, error = %err, "Command failed");
        sink.emit(UiEvent::Notice(err.notice()));
    }
}

fn draw_frame(ctx: &mut AppContext, surface: &mut dyn Surface) {
    let now = ctx.now_ms();
    let Some(engine) = ctx.particles.as_mut() else {
        return;
    };

    let (width, height) = engine.size();
    surface.clear(width, height);
    for sprite in engine.frame(now) {
        surface.draw(&sprite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{drain, test_context, test_context_with};
    use crate::error::NoticeLevel;
    use crate::events::ChannelSink;
    use crate::identity::{AuthState, LocalIdentity};
    use crate::render::CountingSurface;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::sleep;

    fn start(ctx: AppContext) -> (RuntimeHandle, UnboundedReceiver<UiEvent>, CountingSurface) {
        let (sink, rx) = ChannelSink::new();
        let surface = CountingSurface::new();
        let handle = Runtime::spawn(ctx, Arc::new(sink), Box::new(surface.clone()));
        (handle, rx, surface)
    }

    fn search(query: &str) -> Command {
        Command::Search {
            query: query.to_string(),
        }
    }

    fn search_queries(events: &[UiEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                UiEvent::SearchResults { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced() {
        let (handle, mut rx, _) = start(test_context());

        handle.send(search("h")).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        handle.send(search("ho")).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        handle.send(search("hood")).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        assert!(search_queries(&drain(&mut rx)).is_empty());

        sleep(Duration::from_millis(300)).await;
        let _ctx = handle.stop().await.unwrap();
        assert_eq!(search_queries(&drain(&mut rx)), vec!["hood"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_search_cancels_pending() {
        let (handle, mut rx, _) = start(test_context());

        handle.send(search("tee")).await.unwrap();
        handle.send(search("  ")).await.unwrap();
        sleep(Duration::from_secs(1)).await;
        let _ctx = handle.stop().await.unwrap();

        let events = drain(&mut rx);
        assert!(search_queries(&events).is_empty());
        assert!(events.contains(&UiEvent::SearchCleared));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_command_becomes_notice() {
        let (handle, mut rx, _) = start(test_context());

        handle
            .send(Command::AddItem {
                name: "TSUL Tee".to_string(),
                price: "free".to_string(),
                size: "M".to_string(),
            })
            .await
            .unwrap();
        handle.send(Command::ShowCart).await.unwrap();
        let ctx = handle.stop().await.unwrap();

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            UiEvent::Notice(n) if n.level == NoticeLevel::Error
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, UiEvent::ReceiptRendered { .. })));
        assert!(ctx.cart.load().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_are_drawn() {
        let (handle, _rx, surface) = start(test_context());
        sleep(Duration::from_millis(200)).await;
        let _ctx = handle.stop().await.unwrap();

        let stats = surface.stats();
        assert!(stats.frames() >= 10);
        assert!(stats.last_frame_sprites() <= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_frames_when_animation_disabled() {
        let mut ctx = test_context();
        ctx.particles = None;
        let (handle, _rx, surface) = start(ctx);
        sleep(Duration::from_millis(200)).await;
        let _ctx = handle.stop().await.unwrap();
        assert_eq!(surface.stats().frames(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_changes_are_forwarded() {
        let idp = Arc::new(LocalIdentity::new());
        let (handle, mut rx, _) = start(test_context_with(idp.clone()));

        handle
            .send(Command::SignUp {
                email: "a@tsul.us".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;
        handle.send(Command::SignOut).await.unwrap();
        sleep(Duration::from_millis(10)).await;
        let _ctx = handle.stop().await.unwrap();

        let states: Vec<AuthState> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::AuthChanged { state } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(states.first(), Some(&AuthState::SignedOut));
        assert!(states
            .iter()
            .any(|s| s.principal().is_some_and(|p| p.email == "a@tsul.us")));
        assert_eq!(states.last(), Some(&AuthState::SignedOut));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_storage() {
        let (handle, _rx, _) = start(test_context());
        assert!(handle.is_running());
        handle.shutdown().await.unwrap();
    }
}
