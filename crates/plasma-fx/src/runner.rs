#![forbid(unsafe_code)]

//! Fixed-period frame loop with cooperative cancellation.
//!
//! ```text
//!            cancel observed / frame limit
//!  Running ─────────────────────────────────▶ Stopped
//!    │  ▲
//!    └──┘ tick → render → present → sleep
//! ```
//!
//! The [`CancelToken`] is the only state shared across contexts. It is
//! checked once at the top of every iteration, so a stop request lands
//! between frames, never mid-frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::PlasmaError;
use crate::field::Field;
use crate::surface::Surface;

/// Default pause between frames.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(2);

/// Cloneable stop flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop after the current iteration.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// The underlying flag, for registration with signal handlers that set
    /// it to `true`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Frame loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Frame loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Sleep after each frame.
    pub frame_delay: Duration,
    /// Stop after this many frames (`None` runs until cancelled).
    pub max_frames: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_delay: DEFAULT_FRAME_DELAY,
            max_frames: None,
        }
    }
}

impl RunConfig {
    /// Set the frame limit.
    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Set the inter-frame delay.
    #[must_use]
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }
}

/// What a finished loop did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: Duration,
    /// Whether the loop ended because the token was cancelled.
    pub cancelled: bool,
}

impl RunSummary {
    /// Mean frames per second over the run.
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drive `field` into `surface` until `cancel` is set or the frame limit is
/// reached.
///
/// Each iteration runs `tick`, `render`, and `present`, then sleeps
/// `config.frame_delay`. The only error path is a failing
/// [`Surface::present`].
pub fn run<const N: usize, S: Surface + ?Sized>(
    field: &mut Field<N>,
    surface: &mut S,
    config: &RunConfig,
    cancel: &CancelToken,
) -> Result<RunSummary, PlasmaError> {
    let start = Instant::now();
    let mut frames = 0u64;
    let mut state = LoopState::Running;

    info!(
        width = surface.width(),
        height = surface.height(),
        emitters = N,
        palette = field.palette().len(),
        delay_us = config.frame_delay.as_micros() as u64,
        "frame loop started"
    );

    while state == LoopState::Running {
        if cancel.is_cancelled() {
            debug!(frames, "cancellation observed");
            state = LoopState::Stopped;
            continue;
        }

        field.tick();
        field.render(&mut *surface);
        surface.present()?;
        frames += 1;

        if config.max_frames.is_some_and(|max| frames >= max) {
            state = LoopState::Stopped;
            continue;
        }

        if !config.frame_delay.is_zero() {
            thread::sleep(config.frame_delay);
        }
    }

    let summary = RunSummary {
        frames,
        elapsed: start.elapsed(),
        cancelled: cancel.is_cancelled(),
    };
    info!(
        frames = summary.frames,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        fps = summary.fps(),
        cancelled = summary.cancelled,
        "frame loop stopped"
    );
    Ok(summary)
}
