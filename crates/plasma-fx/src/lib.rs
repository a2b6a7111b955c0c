#![forbid(unsafe_code)]

//! Plasma field engine: palettes, rotating emitters, and pixel surfaces.
//!
//! # Role in the workspace
//! `plasma-fx` is the render kernel. It owns everything that is evaluated
//! per frame and nothing that touches the process environment: no argument
//! parsing, no signal handlers, no terminal I/O. The `plasma` binary
//! (`plasma-cli`) wires those in and hands this crate a [`Surface`] and a
//! [`CancelToken`].
//!
//! # Primary responsibilities
//! - **Palette**: build a lookup table from an explicit list, gradient stops,
//!   or a hue sweep ([`PaletteSpec`]).
//! - **Field**: advance emitter phases ([`Field::tick`]) and evaluate the
//!   summed cosine field for every pixel ([`Field::render`]).
//! - **Surface**: the pixel sink abstraction plus an in-memory
//!   [`Framebuffer`] implementation.
//! - **Runner**: the fixed-period tick/render/sleep loop with cooperative
//!   cancellation ([`run`]).

pub mod color;
pub mod error;
pub mod field;
pub mod palette;
pub mod runner;
pub mod surface;

pub use color::Rgb;
pub use error::PlasmaError;
pub use field::{
    ANGLE_DELTA_SCALE, DEFAULT_EMITTERS, EMITTER_COUNT, Emitter, Field, GRADIENT_ZOOM,
    PANEL_CENTER_X, PANEL_CENTER_Y, RADIUS_SCALE, SHIFT_DELTA,
};
pub use palette::{COLORS_LERP_SIZE, HUES_PALETTE_SIZE, LED_COLOR_ADJUST, Palette, PaletteSpec};
pub use runner::{CancelToken, LoopState, RunConfig, RunSummary, run};
pub use surface::{Framebuffer, Surface};
