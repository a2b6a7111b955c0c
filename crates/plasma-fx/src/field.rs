#![forbid(unsafe_code)]

//! Emitter field engine.
//!
//! The field at pixel `(x, y)` is
//!
//! ```text
//! value = shift + Σ_e cos(|p - e|² / GRADIENT_ZOOM)
//! ```
//!
//! where each emitter `e` orbits its own center. The value is mapped through
//! the palette with [`Palette::index_for`].
//!
//! # Determinism
//!
//! [`Field::render`] is a pure function of emitter angles, `shift`, origin,
//! and palette: two renders with no [`Field::tick`] in between write
//! identical pixels. Randomness only enters once, when initial emitter
//! angles are drawn.
//!
//! # Cost
//!
//! `O(width * height * N)` per frame. Emitter positions are hoisted out of
//! the pixel loop into a stack array, so the loop does no allocation.

use rand::Rng;

use crate::color::Rgb;
use crate::palette::Palette;
use crate::surface::Surface;

/// Horizontal center of the reference 128x64 panel chain.
pub const PANEL_CENTER_X: f64 = 64.0;
/// Vertical center of the reference 128x64 panel chain.
pub const PANEL_CENTER_Y: f64 = 32.0;

/// Multiplier applied to every emitter's orbit radius.
pub const RADIUS_SCALE: f64 = 3.5;
/// Multiplier applied to every emitter's per-tick angular velocity.
pub const ANGLE_DELTA_SCALE: f64 = 0.0001;
/// Global phase advance per tick.
pub const SHIFT_DELTA: f64 = 0.01;
/// Divisor for squared distance before the cosine falloff.
pub const GRADIENT_ZOOM: f64 = 2500.0;

/// Emitters in the default field.
pub const EMITTER_COUNT: usize = 8;

/// Upper bound (inclusive) of the initial angle draw, in radians.
const INITIAL_ANGLE_MAX: u32 = 1000;

/// `(radius, center_x, center_y, angle_delta)` for the default field.
pub const DEFAULT_EMITTERS: [(f64, f64, f64, f64); EMITTER_COUNT] = [
    (16.3, -16.1, 8.7, 3.0),
    (23.0, 5.6, -6.5, -5.0),
    (40.8, 23.4, 14.0, 7.0),
    (8.2, -24.1, -2.9, -11.0),
    (34.3, -4.1, -16.1, 13.0),
    (13.5, 12.1, 7.4, -17.0),
    (12.1, -2.3, 26.2, 19.0),
    (42.1, -44.2, 5.3, -23.0),
];

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// A point source orbiting a fixed center.
///
/// Only `angle` changes after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emitter {
    radius: f64,
    center_x: f64,
    center_y: f64,
    angle_delta: f64,
    angle: f64,
}

impl Emitter {
    /// Create an emitter with a random starting angle.
    ///
    /// The angle is an integer drawn uniformly from `0..=1000` and used as
    /// radians as-is; the trig functions wrap it.
    pub fn new<R: Rng>(
        radius: f64,
        center_x: f64,
        center_y: f64,
        angle_delta: f64,
        rng: &mut R,
    ) -> Self {
        let angle = f64::from(rng.gen_range(0..=INITIAL_ANGLE_MAX));
        Self::with_angle(radius, center_x, center_y, angle_delta, angle)
    }

    /// Create an emitter with an explicit starting angle.
    pub const fn with_angle(
        radius: f64,
        center_x: f64,
        center_y: f64,
        angle_delta: f64,
        angle: f64,
    ) -> Self {
        Self {
            radius,
            center_x,
            center_y,
            angle_delta,
            angle,
        }
    }

    #[inline]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub const fn center(&self) -> (f64, f64) {
        (self.center_x, self.center_y)
    }

    #[inline]
    pub const fn angle_delta(&self) -> f64 {
        self.angle_delta
    }

    #[inline]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    /// Absolute position relative to `origin`.
    #[inline]
    pub fn position(&self, origin: (f64, f64)) -> (f64, f64) {
        let (sin, cos) = self.angle.sin_cos();
        let r = self.radius * RADIUS_SCALE;
        (
            origin.0 + self.center_x + cos * r,
            origin.1 + self.center_y + sin * r,
        )
    }

    /// Absolute x on the reference panel.
    #[inline]
    pub fn x(&self) -> f64 {
        PANEL_CENTER_X + self.center_x + self.angle.cos() * self.radius * RADIUS_SCALE
    }

    /// Absolute y on the reference panel.
    #[inline]
    pub fn y(&self) -> f64 {
        PANEL_CENTER_Y + self.center_y + self.angle.sin() * self.radius * RADIUS_SCALE
    }

    /// Advance the angle by one step.
    #[inline]
    pub fn tick(&mut self) {
        self.angle += self.angle_delta * ANGLE_DELTA_SCALE;
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// Emitters, global phase, and palette: everything a frame depends on.
#[derive(Debug, Clone)]
pub struct Field<const N: usize = EMITTER_COUNT> {
    emitters: [Emitter; N],
    shift: f64,
    origin: (f64, f64),
    palette: Palette,
}

impl Field<EMITTER_COUNT> {
    /// The default eight-emitter field with angles drawn from `rng`.
    pub fn with_rng<R: Rng>(palette: Palette, rng: &mut R) -> Self {
        let emitters = DEFAULT_EMITTERS.map(|(radius, cx, cy, delta)| {
            Emitter::new(radius, cx, cy, delta, &mut *rng)
        });
        Self::new(emitters, palette)
    }

    /// The default field seeded from the thread-local entropy source.
    pub fn from_entropy(palette: Palette) -> Self {
        Self::with_rng(palette, &mut rand::thread_rng())
    }
}

impl<const N: usize> Field<N> {
    /// A field over explicit emitters, with `shift = 0` and the reference
    /// panel center as origin.
    pub fn new(emitters: [Emitter; N], palette: Palette) -> Self {
        Self {
            emitters,
            shift: 0.0,
            origin: (PANEL_CENTER_X, PANEL_CENTER_Y),
            palette,
        }
    }

    /// Set the point emitter centers are measured from.
    #[must_use]
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    /// Set the global phase.
    #[must_use]
    pub fn with_shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    #[inline]
    pub const fn emitters(&self) -> &[Emitter; N] {
        &self.emitters
    }

    #[inline]
    pub const fn shift(&self) -> f64 {
        self.shift
    }

    #[inline]
    pub const fn origin(&self) -> (f64, f64) {
        self.origin
    }

    #[inline]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Advance every emitter and the global phase by one step.
    pub fn tick(&mut self) {
        for emitter in &mut self.emitters {
            emitter.tick();
        }
        self.shift += SHIFT_DELTA;
    }

    /// Emitter positions for the current state.
    #[inline]
    fn positions(&self) -> [(f64, f64); N] {
        self.emitters.map(|e| e.position(self.origin))
    }

    /// Field value at pixel `(x, y)`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        field_value(self.shift, &self.positions(), x, y)
    }

    /// Write one full frame to `surface`.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let positions = self.positions();
        let width = surface.width();
        let height = surface.height();

        for y in 0..height {
            let fy = f64::from(y);
            for x in 0..width {
                let value = field_value(self.shift, &positions, f64::from(x), fy);
                surface.set_pixel(x, y, self.palette.color_for(value));
            }
        }
    }

    /// The color `render` would write at `(x, y)`.
    pub fn color_at(&self, x: u32, y: u32) -> Rgb {
        self.palette
            .color_for(self.sample(f64::from(x), f64::from(y)))
    }
}

#[inline(always)]
fn field_value(shift: f64, positions: &[(f64, f64)], x: f64, y: f64) -> f64 {
    let mut value = shift;
    for &(ex, ey) in positions {
        let rx = ex - x;
        let ry = ey - y;
        value += ((rx * rx + ry * ry) / GRADIENT_ZOOM).cos();
    }
    value
}
