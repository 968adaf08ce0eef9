//! # Page Commands
//!
//! Clicks anywhere on the page step the accent color; window resizes move
//! the particle walls.

use tracing::debug;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::events::{EventSink, UiEvent};

/// Advances the accent to the next palette color.
pub fn click(ctx: &mut AppContext, sink: &dyn EventSink) -> AppResult<()> {
    let color = ctx.accent.advance();
    debug!(color = %color, "Accent changed");
    sink.emit(UiEvent::AccentChanged { color });
    Ok(())
}

/// New canvas size. Particles keep their positions.
pub fn resize(ctx: &mut AppContext, width: f64, height: f64) -> AppResult<()> {
    if let Some(engine) = ctx.particles.as_mut() {
        engine.resize(width, height);
        debug!(width, height, "Canvas resized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{drain, test_context};
    use crate::events::ChannelSink;
    use tsul_core::PALETTE;

    #[test]
    fn test_click_cycles_and_wraps() {
        let mut ctx = test_context();
        let (sink, mut rx) = ChannelSink::new();
        for _ in 0..PALETTE.len() {
            click(&mut ctx, &sink).unwrap();
        }

        let colors: Vec<_> = drain(&mut rx)
            .into_iter()
            .map(|e| match e {
                UiEvent::AccentChanged { color } => color,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(colors[0], PALETTE[1]);
        assert_eq!(*colors.last().unwrap(), PALETTE[0]);
    }

    #[test]
    fn test_resize_sanitizes() {
        let mut ctx = test_context();
        resize(&mut ctx, 800.0, f64::NAN).unwrap();
        assert_eq!(ctx.particles.as_ref().unwrap().size(), (800.0, 0.0));
    }
}
