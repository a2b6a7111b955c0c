#![forbid(unsafe_code)]

//! Command-line argument parsing for the `plasma` binary.
//!
//! Parses args manually to keep the binary lean. Every option also reads a
//! `PLASMA_*` environment variable; explicit flags win over the environment.
//! Options are `--flag` or `--flag=VALUE`; everything else is the palette
//! mode and its operands, so negative color components such as `-5` are
//! passed through to the mode parser.

use std::env;
use std::path::PathBuf;
use std::process;

use plasma_fx::{PaletteSpec, PlasmaError};
use plasma_fx::LED_COLOR_ADJUST;
use plasma_fx::palette::MODE_USAGE;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest accepted surface width or height in pixels.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Largest accepted `--palette-size`.
pub const MAX_PALETTE_SIZE: usize = 1 << 16;

const HELP_TEXT: &str = "\
plasma: animated plasma field for LED panels and truecolor terminals

USAGE:
    plasma [OPTIONS] (palette FILENAME|colors R G B R G B [(R G B)...]|hues)

MODES:
    palette FILENAME     Explicit color list: whitespace-separated R G B triples
    colors R G B ...     Linear gradient through two or more colors
    hues                 Full hue sweep (2048 entries)

OPTIONS:
    --rows=N             Panel rows (default: 64)
    --cols=N             Panel columns (default: 64)
    --chain=N            Panels chained horizontally (default: 2)
    --delay-ms=N         Pause between frames in ms (default: 2)
    --frames=N           Stop after N frames, 0 = run until interrupted (default: 0)
    --seed=N             Seed for the initial emitter phases (default: entropy)
    --headless           Render into an in-memory framebuffer instead of the terminal
    --snapshot=PATH      Write the last frame as a PPM image on exit
    --palette-size=N     Resample the palette to N entries (default: as built)
    --color-adjust=R,G,B Scale channels by these factors, or 'led' for 1,0.9,0.9
    --dump-palette=PATH  Write the built palette as a color list file and exit
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    PLASMA_ROWS          Override --rows
    PLASMA_COLS          Override --cols
    PLASMA_CHAIN         Override --chain
    PLASMA_DELAY_MS      Override --delay-ms
    PLASMA_FRAMES        Override --frames
    PLASMA_SEED          Override --seed
    PLASMA_HEADLESS      Override --headless (1/true to enable)
    PLASMA_SNAPSHOT      Override --snapshot
    PLASMA_PALETTE_SIZE  Override --palette-size
    PLASMA_COLOR_ADJUST  Override --color-adjust
    PLASMA_LOG           Log filter for stderr output (default: warn)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Rows per panel.
    pub rows: u32,
    /// Columns per panel.
    pub cols: u32,
    /// Number of panels chained left to right.
    pub chain: u32,
    /// Pause between frames in milliseconds.
    pub delay_ms: u64,
    /// Frame limit (0 = until interrupted).
    pub frames: u64,
    /// Seed for emitter phases (None = entropy).
    pub seed: Option<u64>,
    /// Render off-screen.
    pub headless: bool,
    /// Where to write the final frame.
    pub snapshot: Option<PathBuf>,
    /// Where to write the palette before exiting without animating.
    pub dump_palette: Option<PathBuf>,
    /// Resample the built palette to this many entries.
    pub palette_size: Option<usize>,
    /// Per-channel scale applied after resampling.
    pub color_adjust: Option<[f64; 3]>,
    /// Palette source. Required on the command line; the default only
    /// seeds the parser.
    pub palette: PaletteSpec,
}

#[derive(Debug)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
    Mode(PlasmaError),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            chain: 2,
            delay_ms: 2,
            frames: 0,
            seed: None,
            headless: false,
            snapshot: None,
            dump_palette: None,
            palette_size: None,
            color_adjust: None,
            palette: PaletteSpec::Hues,
        }
    }
}

/// One-line usage summary printed with usage errors.
pub fn usage_line() -> String {
    format!("usage: plasma [OPTIONS] {MODE_USAGE}")
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Exits the process on `--help`, `--version`, or any malformed input.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("plasma {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
            Err(ParseError::Mode(err)) => {
                eprintln!("{err}");
                eprintln!("{}", usage_line());
                process::exit(1);
            }
        }
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.cols.saturating_mul(self.chain)
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.rows
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Environment first; invalid values are ignored.
        if let Some(val) = get_env("PLASMA_ROWS")
            && let Ok(n) = val.trim().parse::<u32>()
            && (1..=MAX_DIMENSION).contains(&n)
        {
            opts.rows = n;
        }
        if let Some(val) = get_env("PLASMA_COLS")
            && let Ok(n) = val.trim().parse::<u32>()
            && (1..=MAX_DIMENSION).contains(&n)
        {
            opts.cols = n;
        }
        if let Some(val) = get_env("PLASMA_CHAIN")
            && let Ok(n) = val.trim().parse::<u32>()
            && (1..=MAX_DIMENSION).contains(&n)
        {
            opts.chain = n;
        }
        if let Some(val) = get_env("PLASMA_DELAY_MS")
            && let Ok(n) = val.trim().parse()
        {
            opts.delay_ms = n;
        }
        if let Some(val) = get_env("PLASMA_FRAMES")
            && let Ok(n) = val.trim().parse()
        {
            opts.frames = n;
        }
        if let Some(val) = get_env("PLASMA_SEED")
            && let Ok(n) = val.trim().parse()
        {
            opts.seed = Some(n);
        }
        if let Some(val) = get_env("PLASMA_HEADLESS") {
            opts.headless = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Some(val) = get_env("PLASMA_SNAPSHOT")
            && !val.trim().is_empty()
        {
            opts.snapshot = Some(PathBuf::from(val));
        }
        if let Some(val) = get_env("PLASMA_PALETTE_SIZE")
            && let Ok(n) = val.trim().parse::<usize>()
            && (1..=MAX_PALETTE_SIZE).contains(&n)
        {
            opts.palette_size = Some(n);
        }
        if let Some(val) = get_env("PLASMA_COLOR_ADJUST")
            && let Some(factors) = parse_factors(val.trim())
        {
            opts.color_adjust = Some(factors);
        }

        // Command-line args override env vars.
        let mut mode_args: Vec<String> = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--headless" => opts.headless = true,
                other if other.starts_with("--") => {
                    if let Some(val) = other.strip_prefix("--rows=") {
                        opts.rows = parse_positive("--rows", val)?;
                    } else if let Some(val) = other.strip_prefix("--cols=") {
                        opts.cols = parse_positive("--cols", val)?;
                    } else if let Some(val) = other.strip_prefix("--chain=") {
                        opts.chain = parse_positive("--chain", val)?;
                    } else if let Some(val) = other.strip_prefix("--delay-ms=") {
                        opts.delay_ms = parse_number("--delay-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--frames=") {
                        opts.frames = parse_number("--frames", val)?;
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = Some(parse_number("--seed", val)?);
                    } else if let Some(val) = other.strip_prefix("--snapshot=") {
                        opts.snapshot = Some(parse_path("--snapshot", val)?);
                    } else if let Some(val) = other.strip_prefix("--palette-size=") {
                        opts.palette_size = Some(parse_palette_size(val)?);
                    } else if let Some(val) = other.strip_prefix("--color-adjust=") {
                        let factors = parse_factors(val).ok_or_else(|| ParseError::InvalidValue {
                            flag: "--color-adjust",
                            value: val.to_string(),
                        })?;
                        opts.color_adjust = Some(factors);
                    } else if let Some(val) = other.strip_prefix("--dump-palette=") {
                        opts.dump_palette = Some(parse_path("--dump-palette", val)?);
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
                positional => mode_args.push(positional.to_string()),
            }
        }

        // Env and flags can each be in range while their product is not.
        if u64::from(opts.cols) * u64::from(opts.chain) > u64::from(MAX_DIMENSION) {
            return Err(ParseError::InvalidValue {
                flag: "--cols x --chain",
                value: format!("{}x{}", opts.cols, opts.chain),
            });
        }

        opts.palette = PaletteSpec::parse(&mode_args).map_err(ParseError::Mode)?;
        Ok(opts)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, val: &str) -> Result<T, ParseError> {
    val.parse().map_err(|_| ParseError::InvalidValue {
        flag,
        value: val.to_string(),
    })
}

fn parse_positive(flag: &'static str, val: &str) -> Result<u32, ParseError> {
    match parse_number::<u32>(flag, val)? {
        n @ 1..=MAX_DIMENSION => Ok(n),
        _ => Err(ParseError::InvalidValue {
            flag,
            value: val.to_string(),
        }),
    }
}

fn parse_palette_size(val: &str) -> Result<usize, ParseError> {
    match parse_number::<usize>("--palette-size", val)? {
        n @ 1..=MAX_PALETTE_SIZE => Ok(n),
        _ => Err(ParseError::InvalidValue {
            flag: "--palette-size",
            value: val.to_string(),
        }),
    }
}

/// `led` or three comma-separated non-negative factors.
fn parse_factors(val: &str) -> Option<[f64; 3]> {
    if val.eq_ignore_ascii_case("led") {
        return Some(LED_COLOR_ADJUST);
    }
    let mut factors = [0.0; 3];
    let mut parts = val.split(',');
    for slot in &mut factors {
        let f: f64 = parts.next()?.trim().parse().ok()?;
        if !f.is_finite() || f < 0.0 {
            return None;
        }
        *slot = f;
    }
    parts.next().is_none().then_some(factors)
}

fn parse_path(flag: &'static str, val: &str) -> Result<PathBuf, ParseError> {
    if val.trim().is_empty() {
        return Err(ParseError::InvalidValue {
            flag,
            value: val.to_string(),
        });
    }
    Ok(PathBuf::from(val))
}
