//! # Particle Engine
//!
//! Fixed pool of falling, bouncing gumballs behind the landing page.
//! The engine is pure: it advances state for a given clock reading and
//! hands back [`Sprite`]s; the caller owns the frame clock and the surface.
//!
//! ## Particle Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Opacity Phases (elapsed since spawn)                 │
//! │                                                                         │
//! │   opacity                                                               │
//! │   1.0 ┤        ┌──────────────────────┐                                 │
//! │       │       ╱                        ╲                                │
//! │       │      ╱ +0.03/frame              ╲ -0.02/frame                   │
//! │   0.0 ┼─────╯                            ╰──────────────────────        │
//! │       0    1000 ms                  5000 ms         faded = true        │
//! │       │ Spawning │      Settled       │  Fading  │     Dormant          │
//! │                                                                         │
//! │   Dormant particles keep falling (gravity + velocity) but neither      │
//! │   drift nor draw. They are never removed from the pool.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Step Order
//! 1. horizontal drift `x += sin(angle)·amplitude·0.01`, `angle += speed`
//! 2. floor: bottom edge would pass the floor → clamp, `dy = -dy·0.6`;
//!    otherwise `dy += 0.15`
//! 3. walls: edge would pass a side → reflect `dx` (no damping)
//! 4. `x += dx`, `y += dy`
//! 5. opacity per phase

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::color::Rgb;
use crate::error::{CoreError, CoreResult};

/// Downward acceleration per frame.
pub const GRAVITY: f64 = 0.15;
/// Fraction of vertical speed kept on a floor bounce.
pub const BOUNCE: f64 = 0.6;
/// Scale applied to the sinusoidal drift.
pub const DRIFT_SCALE: f64 = 0.01;
/// Opacity gained per frame while spawning.
pub const FADE_IN_STEP: f64 = 0.03;
/// Opacity lost per frame while fading.
pub const FADE_OUT_STEP: f64 = 0.02;
/// End of the spawning phase.
pub const SPAWN_MS: f64 = 1000.0;
/// Start of the fading phase.
pub const SETTLE_MS: f64 = 5000.0;
/// Pool size used by the landing page.
pub const DEFAULT_PARTICLE_COUNT: usize = 80;

/// Gradient stop shades, as `(offset, shade percent)` after the white core
/// and the base color.
const RIM_SHADES: [(f64, f64); 2] = [(0.6, -25.0), (0.9, -45.0)];

// =============================================================================
// Particle
// =============================================================================

/// Opacity phase of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Spawning,
    Settled,
    Fading,
    Dormant,
}

/// One gumball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub dx: f64,
    pub dy: f64,
    pub color: Rgb,
    pub opacity: f64,
    /// Drift phase angle (radians).
    pub angle: f64,
    pub amplitude: f64,
    pub speed: f64,
    /// Clock reading at creation (ms).
    pub spawned_at: f64,
    pub faded: bool,
}

impl Particle {
    /// Creates a particle above the visible area with random attributes.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        width: f64,
        height: f64,
        color: Rgb,
        now_ms: f64,
    ) -> Self {
        let radius = rng.random::<f64>() * 30.0 + 20.0;
        let x = rng.random::<f64>() * width;
        let y = -(rng.random::<f64>() * height);
        Particle {
            x,
            y,
            radius,
            dx: (rng.random::<f64>() - 0.5) * 2.0,
            dy: rng.random::<f64>() * 0.5 + 1.0,
            color,
            opacity: 0.0,
            angle: rng.random::<f64>() * TAU,
            amplitude: rng.random::<f64>() * 15.0 + 10.0,
            speed: rng.random::<f64>() * 0.05 + 0.02,
            spawned_at: now_ms,
            faded: false,
        }
    }

    /// Phase at clock reading `now_ms`.
    pub fn phase(&self, now_ms: f64) -> Phase {
        let elapsed = now_ms - self.spawned_at;
        if self.faded {
            Phase::Dormant
        } else if elapsed < SPAWN_MS {
            Phase::Spawning
        } else if elapsed <= SETTLE_MS {
            Phase::Settled
        } else {
            Phase::Fading
        }
    }

    /// Advances one frame inside a `width × height` surface.
    pub fn step(&mut self, width: f64, height: f64, now_ms: f64) {
        if !self.faded {
            self.x += self.angle.sin() * self.amplitude * DRIFT_SCALE;
            self.angle += self.speed;
        }

        if self.y + self.radius + self.dy > height {
            self.y = height - self.radius;
            self.dy *= -BOUNCE;
        } else {
            self.dy += GRAVITY;
        }

        if self.x + self.radius + self.dx > width {
            self.dx = -self.dx.abs();
        } else if self.x - self.radius + self.dx < 0.0 {
            self.dx = self.dx.abs();
        }

        self.x += self.dx;
        self.y += self.dy;

        match self.phase(now_ms) {
            Phase::Spawning => self.opacity = (self.opacity + FADE_IN_STEP).min(1.0),
            Phase::Fading => {
                self.opacity -= FADE_OUT_STEP;
                if self.opacity <= 0.0 {
                    self.opacity = 0.0;
                    self.faded = true;
                }
            }
            Phase::Settled | Phase::Dormant => {}
        }
    }

    /// Draw description for the current state; `None` once dormant.
    pub fn sprite(&self) -> Option<Sprite> {
        if self.faded {
            return None;
        }
        let r = self.radius;
        let mut stops = Vec::with_capacity(2 + RIM_SHADES.len());
        stops.push(GradientStop {
            offset: 0.0,
            color: Rgb::WHITE,
        });
        stops.push(GradientStop {
            offset: 0.2,
            color: self.color,
        });
        stops.extend(RIM_SHADES.iter().map(|&(offset, pct)| GradientStop {
            offset,
            color: self.color.shade(pct),
        }));

        Some(Sprite {
            x: self.x,
            y: self.y,
            radius: r,
            opacity: self.opacity,
            gradient: RadialGradient {
                inner: Circle {
                    x: self.x - r / 3.0,
                    y: self.y - r / 3.0,
                    radius: r / 8.0,
                },
                outer: Circle {
                    x: self.x,
                    y: self.y,
                    radius: r,
                },
                stops,
            },
        })
    }
}

// =============================================================================
// Sprites
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgb,
}

/// Two-circle radial gradient, as a 2D canvas understands it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    pub inner: Circle,
    pub outer: Circle,
    pub stops: Vec<GradientStop>,
}

/// A filled circle to draw this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub opacity: f64,
    pub gradient: RadialGradient,
}

// =============================================================================
// Engine
// =============================================================================

/// Owns the particle pool and the surface bounds.
#[derive(Debug, Clone)]
pub struct ParticleEngine {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    frames: u64,
}

impl ParticleEngine {
    /// Spawns `count` particles with colors drawn from `palette`.
    pub fn initialize<R: Rng + ?Sized>(
        width: f64,
        height: f64,
        count: usize,
        palette: &[Rgb],
        rng: &mut R,
        now_ms: f64,
    ) -> CoreResult<Self> {
        if palette.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        let (width, height) = (sanitize(width), sanitize(height));
        let particles = (0..count)
            .map(|_| {
                let color = palette[rng.random_range(0..palette.len())];
                Particle::spawn(rng, width, height, color, now_ms)
            })
            .collect();

        Ok(ParticleEngine {
            width,
            height,
            particles,
            frames: 0,
        })
    }

    /// Builds an engine around existing particles.
    pub fn with_particles(width: f64, height: f64, particles: Vec<Particle>) -> Self {
        ParticleEngine {
            width: sanitize(width),
            height: sanitize(height),
            particles,
            frames: 0,
        }
    }

    /// Advances every particle one frame.
    pub fn step(&mut self, now_ms: f64) {
        let (w, h) = (self.width, self.height);
        for particle in &mut self.particles {
            particle.step(w, h, now_ms);
        }
        self.frames += 1;
    }

    /// Sprites for every particle that is still visible.
    pub fn sprites(&self) -> Vec<Sprite> {
        self.particles.iter().filter_map(Particle::sprite).collect()
    }

    /// Steps and returns the sprites to draw.
    pub fn frame(&mut self, now_ms: f64) -> Vec<Sprite> {
        self.step(now_ms);
        self.sprites()
    }

    /// New surface bounds; particles keep their positions.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = sanitize(width);
        self.height = sanitize(height);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Frames stepped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether every particle has faded out.
    pub fn is_dormant(&self) -> bool {
        self.particles.iter().all(|p| p.faded)
    }
}

fn sanitize(dimension: f64) -> f64 {
    if dimension.is_finite() {
        dimension.max(0.0)
    } else {
        0.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
