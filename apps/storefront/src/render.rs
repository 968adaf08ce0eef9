//! # Renderers
//!
//! Pure formatting of engine output for the page, plus the [`Surface`] the
//! frame loop draws particle sprites onto.
//!
//! ## Receipt Layout
//! ```text
//! ------------------------------
//! TSUL Fall/Holiday 2025 Receipt
//! ------------------------------
//! 1. TSUL Hoodie (M) x2 - $80.00
//! ------------------------------
//! Subtotal: $80.00
//! Tax (8.25%): $6.60
//! Total: $86.60
//! ------------------------------
//! Printed: 2025-12-01 09:30:00 UTC
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tsul_core::{MatchKind, Receipt, SearchMatch, Sprite};

/// Width of the receipt rules.
pub const RULE_WIDTH: usize = 30;

/// Formats a receipt as fixed-width plain text.
pub fn render_receipt(receipt: &Receipt, title: &str) -> String {
    let width = RULE_WIDTH.max(title.chars().count());
    let rule = "-".repeat(width);
    let mut out = Vec::with_capacity(receipt.lines.len() + 9);

    out.push(rule.clone());
    out.push(format!("{:^width$}", title, width = width).trim_end().to_string());
    out.push(rule.clone());

    for (i, line) in receipt.lines.iter().enumerate() {
        out.push(format!(
            "{}. {} ({}) x{} - {}",
            i + 1,
            line.name,
            line.size,
            line.quantity,
            line.line_total()
        ));
    }

    out.push(rule.clone());
    out.push(format!("Subtotal: {}", receipt.subtotal));
    out.push(format!("Tax ({}): {}", receipt.tax_rate, receipt.tax));
    out.push(format!("Total: {}", receipt.total));
    out.push(rule);
    out.push(format!(
        "Printed: {}",
        receipt.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.join("\n")
}

/// One dropdown row per match; exact hits are marked.
pub fn render_search_results(matches: &[SearchMatch]) -> Vec<String> {
    matches
        .iter()
        .map(|m| match m.kind {
            MatchKind::Exact => format!("{} [exact] #{}", m.label, m.section),
            MatchKind::Partial => format!("{} #{}", m.label, m.section),
        })
        .collect()
}

// =============================================================================
// Surface
// =============================================================================

/// Drawing target for particle frames.
pub trait Surface: Send {
    /// Clears the whole surface before a frame.
    fn clear(&mut self, width: f64, height: f64);

    fn draw(&mut self, sprite: &Sprite);
}

/// Discards nothing but counts; used headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct CountingSurface {
    stats: Arc<SurfaceStats>,
}

/// Counters shared between a [`CountingSurface`] and its observers.
#[derive(Debug, Default)]
pub struct SurfaceStats {
    frames: AtomicU64,
    sprites: AtomicU64,
    last_frame_sprites: AtomicU64,
}

impl SurfaceStats {
    /// Frames cleared so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Sprites drawn over all frames.
    pub fn sprites(&self) -> u64 {
        self.sprites.load(Ordering::Relaxed)
    }

    pub fn last_frame_sprites(&self) -> u64 {
        self.last_frame_sprites.load(Ordering::Relaxed)
    }
}

impl CountingSurface {
    pub fn new() -> Self {
        CountingSurface::default()
    }

    pub fn stats(&self) -> Arc<SurfaceStats> {
        Arc::clone(&self.stats)
    }
}

impl Surface for CountingSurface {
    fn clear(&mut self, _width: f64, _height: f64) {
        self.stats.frames.fetch_add(1, Ordering::Relaxed);
        self.stats.last_frame_sprites.store(0, Ordering::Relaxed);
    }

    fn draw(&mut self, _sprite: &Sprite) {
        self.stats.sprites.fetch_add(1, Ordering::Relaxed);
        self.stats.last_frame_sprites.fetch_add(1, Ordering::Relaxed);
    }
}
