#![forbid(unsafe_code)]

//! Truecolor terminal surface.
//!
//! Two pixel rows share one terminal cell: the upper half-block glyph is
//! drawn with the top pixel as foreground and the bottom pixel as
//! background. Pixels are staged in a [`Framebuffer`] and only cells that
//! changed since the previous frame are written on [`Surface::present`].
//!
//! Raw mode swallows the terminal's interrupt key, so `present` also drains
//! pending key events and maps `Ctrl+C`, `q`, and `Esc` onto the
//! [`CancelToken`] the frame loop watches.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
    EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};
use plasma_fx::{CancelToken, Framebuffer, PlasmaError, Rgb, Surface};
use tracing::{debug, warn};

/// Glyph whose foreground paints the top half of the cell.
pub const UPPER_HALF: char = '\u{2580}';

/// Colors of one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBlock {
    pub top: Rgb,
    pub bottom: Rgb,
}

/// Number of terminal rows needed for `height` pixel rows.
#[inline]
pub const fn cell_rows(height: u32) -> u32 {
    height.div_ceil(2)
}

/// The cell at `(col, row)`. A missing bottom pixel (odd height) is black.
#[inline]
pub fn half_block(frame: &Framebuffer, col: u32, row: u32) -> HalfBlock {
    HalfBlock {
        top: frame.get_pixel(col, row * 2),
        bottom: frame.get_pixel(col, row * 2 + 1),
    }
}

#[inline]
fn term_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') | KeyCode::Esc => true,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Terminal mode guard
// ---------------------------------------------------------------------------

/// Raw mode plus alternate screen, restored on drop.
#[must_use]
struct TerminalGuard;

impl TerminalGuard {
    fn acquire<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            Clear(ClearType::All)
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = execute!(
            out,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

// ---------------------------------------------------------------------------
// TerminalSurface
// ---------------------------------------------------------------------------

/// A [`Surface`] drawn with half-block cells.
pub struct TerminalSurface<W: Write = Stdout> {
    out: W,
    frame: Framebuffer,
    /// Cells as last written, row-major over `frame.width() x cell_rows`.
    prev: Vec<Option<HalfBlock>>,
    /// Terminal area that is actually drawn, in cells.
    visible: (u32, u32),
    cancel: Option<CancelToken>,
    // Dropped last.
    _guard: Option<TerminalGuard>,
}

impl TerminalSurface<Stdout> {
    /// Take over the controlling terminal for a `width x height` pixel
    /// surface. The terminal is restored when the surface is dropped.
    pub fn new(width: u32, height: u32) -> Result<Self, PlasmaError> {
        let (term_cols, term_rows) = terminal::size()
            .map_err(|e| PlasmaError::device(format!("can't query terminal size: {e}")))?;
        let visible = (
            width.min(u32::from(term_cols)),
            cell_rows(height).min(u32::from(term_rows)),
        );
        if visible != (width, cell_rows(height)) {
            warn!(
                width,
                height,
                term_cols,
                term_rows,
                "terminal smaller than surface, output is clipped"
            );
        }

        let mut out = io::stdout();
        let guard = TerminalGuard::acquire(&mut out)
            .map_err(|e| PlasmaError::device(format!("can't set up terminal: {e}")))?;
        debug!(width, height, cols = visible.0, rows = visible.1, "terminal surface ready");

        let mut surface = Self::with_writer(out, width, height, visible);
        surface._guard = Some(guard);
        Ok(surface)
    }
}

impl<W: Write> TerminalSurface<W> {
    /// A surface that writes to `out` without changing terminal modes,
    /// drawing at most `visible` (cols, rows) cells. The visible area never
    /// extends past the surface itself.
    pub fn with_writer(out: W, width: u32, height: u32, visible: (u32, u32)) -> Self {
        let rows = cell_rows(height);
        let cells = width as usize * rows as usize;
        Self {
            out,
            frame: Framebuffer::new(width, height),
            prev: vec![None; cells],
            visible: (visible.0.min(width), visible.1.min(rows)),
            cancel: None,
            _guard: None,
        }
    }

    /// Cancel `token` when a quit key is pressed.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The staged pixels of the current frame.
    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    /// Forget what is on screen so the next frame is written in full.
    pub fn invalidate(&mut self) {
        self.prev.fill(None);
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn draw(&mut self) -> io::Result<()> {
        let width = self.frame.width();
        let (vis_cols, vis_rows) = self.visible;
        let mut cursor_at: Option<(u32, u32)> = None;
        let mut colors: Option<HalfBlock> = None;

        queue!(self.out, BeginSynchronizedUpdate)?;
        for row in 0..vis_rows {
            for col in 0..vis_cols {
                let idx = row as usize * width as usize + col as usize;
                let cell = half_block(&self.frame, col, row);
                if self.prev[idx] == Some(cell) {
                    continue;
                }
                if cursor_at != Some((col, row)) {
                    queue!(self.out, cursor::MoveTo(col as u16, row as u16))?;
                }
                match colors {
                    Some(c) if c == cell => {}
                    Some(c) if c.top == cell.top => {
                        queue!(self.out, SetBackgroundColor(term_color(cell.bottom)))?;
                    }
                    Some(c) if c.bottom == cell.bottom => {
                        queue!(self.out, SetForegroundColor(term_color(cell.top)))?;
                    }
                    _ => {
                        queue!(
                            self.out,
                            SetForegroundColor(term_color(cell.top)),
                            SetBackgroundColor(term_color(cell.bottom))
                        )?;
                    }
                }
                queue!(self.out, Print(UPPER_HALF))?;
                colors = Some(cell);
                cursor_at = Some((col + 1, row));
                self.prev[idx] = Some(cell);
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()
    }

    fn poll_quit(&self) -> io::Result<()> {
        let Some(token) = &self.cancel else {
            return Ok(());
        };
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()?
                && is_quit_key(&key)
            {
                debug!(code = ?key.code, "quit key pressed");
                token.cancel();
            }
        }
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    #[inline]
    fn width(&self) -> u32 {
        self.frame.width()
    }

    #[inline]
    fn height(&self) -> u32 {
        self.frame.height()
    }

    #[inline]
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        self.frame.set_pixel(x, y, color);
    }

    fn present(&mut self) -> Result<(), PlasmaError> {
        self.draw()
            .map_err(|e| PlasmaError::device(format!("terminal write failed: {e}")))?;
        self.poll_quit()
            .map_err(|e| PlasmaError::device(format!("terminal read failed: {e}")))
    }
}
