#![forbid(unsafe_code)]

//! Palette construction.
//!
//! A [`Palette`] is an immutable, non-empty lookup table of colors. It is
//! built once before the frame loop starts from one of three sources
//! described by [`PaletteSpec`]:
//!
//! - **File**: whitespace-separated integer triples, one color per triple.
//! - **Stops**: linear gradient through two or more colors,
//!   [`COLORS_LERP_SIZE`] samples per segment plus the final stop.
//! - **Hues**: [`HUES_PALETTE_SIZE`] samples around the hue circle at full
//!   saturation and value.
//!
//! # Index mapping
//!
//! The field engine maps a field value `v` to an entry with
//! `floor((cos(v) + 1) / 2 * len)`. At `cos(v) == 1.0` that expression is
//! exactly `len`, so [`Palette::index_for`] clamps to `len - 1`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::color::Rgb;
use crate::error::PlasmaError;

/// Interpolation steps per gradient segment.
pub const COLORS_LERP_SIZE: usize = 256;

/// Number of entries in the hue sweep palette.
pub const HUES_PALETTE_SIZE: usize = 2048;

/// Per-channel white balance for the reference LED panels: red at full
/// strength, green and blue at 90%.
pub const LED_COLOR_ADJUST: [f64; 3] = [1.0, 0.9, 0.9];

/// Usage line for the palette mode arguments.
pub const MODE_USAGE: &str = "(palette FILENAME|colors R G B R G B [(R G B)...]|hues)";

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Ordered, non-empty color lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

#[allow(clippy::len_without_is_empty)]
impl Palette {
    /// Wrap a list of colors, rejecting an empty list.
    pub fn from_colors(colors: Vec<Rgb>) -> Result<Self, PlasmaError> {
        if colors.is_empty() {
            return Err(PlasmaError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Read an explicit color list from `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PlasmaError> {
        let path = path.as_ref();
        let config_err = |source| PlasmaError::Config {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(config_err)?;
        let colors = parse_list(BufReader::new(file)).map_err(config_err)?;
        debug!(path = %path.display(), entries = colors.len(), "loaded palette file");
        Self::from_colors(colors)
    }

    /// Read an explicit color list from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, PlasmaError> {
        let colors = parse_list(reader).map_err(|source| PlasmaError::Config {
            path: PathBuf::from("<reader>"),
            source,
        })?;
        Self::from_colors(colors)
    }

    /// Linear gradient through `stops`.
    ///
    /// Each segment `a -> b` contributes [`COLORS_LERP_SIZE`] samples
    /// `a + (b - a) * j / COLORS_LERP_SIZE` (truncated), and the last stop is
    /// appended once so it is reachable. The result has
    /// `(stops.len() - 1) * COLORS_LERP_SIZE + 1` entries.
    pub fn gradient(stops: &[Rgb]) -> Result<Self, PlasmaError> {
        if stops.len() < 2 {
            return Err(PlasmaError::usage("gradient needs at least two colors"));
        }
        let last = stops[stops.len() - 1];

        let mut colors = Vec::with_capacity((stops.len() - 1) * COLORS_LERP_SIZE + 1);
        for pair in stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            for j in 0..COLORS_LERP_SIZE {
                colors.push(Rgb::new(
                    lerp_channel(a.r, b.r, j),
                    lerp_channel(a.g, b.g, j),
                    lerp_channel(a.b, b.b, j),
                ));
            }
        }
        colors.push(last);

        Ok(Self { colors })
    }

    /// Evenly spaced hues at full saturation and value, starting at red.
    pub fn hues() -> Self {
        let colors = (0..HUES_PALETTE_SIZE)
            .map(|i| {
                let hue = i as f64 / HUES_PALETTE_SIZE as f64 * 360.0;
                Rgb::from_hsv(hue, 1.0, 1.0)
            })
            .collect();
        Self { colors }
    }

    /// Number of entries (always at least one).
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    /// Map a field value to a palette index.
    ///
    /// Always in `0..len()`; non-finite values map to 0.
    #[inline]
    pub fn index_for(&self, value: f64) -> usize {
        let len = self.colors.len();
        let t = (value.cos() + 1.0) / 2.0;
        ((t * len as f64) as usize).min(len - 1)
    }

    /// The color for a field value.
    #[inline]
    pub fn color_for(&self, value: f64) -> Rgb {
        self.colors[self.index_for(value)]
    }

    /// Resample to `size` entries spread evenly from the first color to the
    /// last. Entry `i` takes the source color at position `i / (size - 1)`,
    /// so both endpoints survive; intermediate entries repeat or skip source
    /// colors (no blending).
    pub fn resample(&self, size: usize) -> Result<Self, PlasmaError> {
        if size == 0 {
            return Err(PlasmaError::usage("palette size must be at least 1"));
        }
        if size == 1 {
            return Ok(Self {
                colors: vec![self.colors[0]],
            });
        }
        let len = self.colors.len();
        let last = (size - 1) as f64;
        let colors = (0..size)
            .map(|i| {
                let src = ((i as f64 / last) * len as f64) as usize;
                self.colors[src.min(len - 1)]
            })
            .collect();
        Ok(Self { colors })
    }

    /// Scale each channel by its factor, truncating. Factors outside
    /// `[0, 1]` saturate at the channel limits.
    #[must_use]
    pub fn scaled(&self, [fr, fg, fb]: [f64; 3]) -> Self {
        let scale = |c: u8, f: f64| (f64::from(c) * f) as u8;
        let colors = self
            .colors
            .iter()
            .map(|c| Rgb::new(scale(c.r, fr), scale(c.g, fg), scale(c.b, fb)))
            .collect();
        Self { colors }
    }

    /// Write the palette in the explicit-list file format, one `R G B` line
    /// per entry.
    pub fn write_list<W: Write>(&self, mut out: W) -> io::Result<()> {
        for c in &self.colors {
            writeln!(out, "{} {} {}", c.r, c.g, c.b)?;
        }
        out.flush()
    }
}

#[inline]
fn lerp_channel(a: u8, b: u8, j: usize) -> u8 {
    let a = f64::from(a);
    let b = f64::from(b);
    (a + (b - a) * j as f64 / COLORS_LERP_SIZE as f64) as u8
}

/// Parse whitespace-separated integer triples.
///
/// Stops at end of input or at the first token that is not an integer. An
/// incomplete trailing triple is dropped. Values keep their low 8 bits.
pub fn parse_list<R: BufRead>(reader: R) -> io::Result<Vec<Rgb>> {
    let mut colors = Vec::new();
    let mut triple = [0i64; 3];
    let mut filled = 0;

    'lines: for line in reader.lines() {
        let line = line?;
        for token in line.split_whitespace() {
            let Ok(value) = token.parse::<i64>() else {
                break 'lines;
            };
            triple[filled] = value;
            filled += 1;
            if filled == 3 {
                colors.push(Rgb::truncating(triple[0], triple[1], triple[2]));
                filled = 0;
            }
        }
    }

    Ok(colors)
}

// ---------------------------------------------------------------------------
// PaletteSpec
// ---------------------------------------------------------------------------

/// Which palette to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteSpec {
    /// Explicit list read from a file.
    File(PathBuf),
    /// Gradient through two or more stops.
    Stops(Vec<Rgb>),
    /// Full hue sweep.
    Hues,
}

impl PaletteSpec {
    /// Parse the mode arguments: the mode word followed by its operands.
    ///
    /// - `palette FILENAME`
    /// - `colors R G B R G B [R G B ...]` (two or more triples)
    /// - `hues`
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, PlasmaError> {
        let Some((mode, rest)) = args.split_first() else {
            return Err(PlasmaError::usage("missing palette mode"));
        };

        match mode.as_ref() {
            "palette" => match rest {
                [file] => Ok(Self::File(PathBuf::from(file.as_ref()))),
                [] => Err(PlasmaError::usage("palette mode needs a FILENAME")),
                _ => Err(PlasmaError::usage("palette mode takes exactly one FILENAME")),
            },
            "colors" => {
                if rest.len() < 6 || rest.len() % 3 != 0 {
                    return Err(PlasmaError::usage(
                        "colors mode needs two or more R G B triples",
                    ));
                }
                let mut values = Vec::with_capacity(rest.len());
                for token in rest {
                    let token = token.as_ref();
                    let value = token.trim().parse::<i64>().map_err(|_| {
                        PlasmaError::usage(format!("invalid color component: {token}"))
                    })?;
                    values.push(value);
                }
                let stops = values
                    .chunks_exact(3)
                    .map(|c| Rgb::truncating(c[0], c[1], c[2]))
                    .collect();
                Ok(Self::Stops(stops))
            }
            "hues" => {
                if rest.is_empty() {
                    Ok(Self::Hues)
                } else {
                    Err(PlasmaError::usage("hues mode takes no arguments"))
                }
            }
            other => Err(PlasmaError::usage(format!("unknown mode: {other}"))),
        }
    }

    /// Mode word as accepted by [`PaletteSpec::parse`].
    #[must_use]
    pub const fn mode_name(&self) -> &'static str {
        match self {
            Self::File(_) => "palette",
            Self::Stops(_) => "colors",
            Self::Hues => "hues",
        }
    }

    /// Build the lookup table.
    pub fn build(&self) -> Result<Palette, PlasmaError> {
        let palette = match self {
            Self::File(path) => Palette::from_file(path)?,
            Self::Stops(stops) => Palette::gradient(stops)?,
            Self::Hues => Palette::hues(),
        };
        debug!(mode = self.mode_name(), entries = palette.len(), "built palette");
        Ok(palette)
    }
}
