#![forbid(unsafe_code)]

//! Startup wiring: palette, field, signals, surface, snapshot.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use plasma_fx::{
    CancelToken, Field, Framebuffer, Palette, PlasmaError, RunConfig, RunSummary,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{debug, info};

use crate::cli::Opts;
use crate::terminal::TerminalSurface;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// `--dump-palette` wrote the palette and nothing was animated.
    PaletteDumped { entries: usize },
    /// The frame loop ran and stopped cleanly.
    Ran(RunSummary),
}

/// Run the binary with SIGINT and SIGTERM wired to cancellation.
pub fn run(opts: &Opts) -> Result<Outcome, PlasmaError> {
    let cancel = CancelToken::new();
    install_signal_handlers(&cancel)?;
    run_with(opts, &cancel)
}

/// Run the binary against an externally owned token.
pub fn run_with(opts: &Opts, cancel: &CancelToken) -> Result<Outcome, PlasmaError> {
    let palette = prepare_palette(opts)?;

    if let Some(path) = &opts.dump_palette {
        write_palette(&palette, path)?;
        info!(path = %path.display(), entries = palette.len(), "palette written");
        return Ok(Outcome::PaletteDumped {
            entries: palette.len(),
        });
    }

    let mut field = match opts.seed {
        Some(seed) => Field::with_rng(palette, &mut StdRng::seed_from_u64(seed)),
        None => Field::from_entropy(palette),
    };
    let config = run_config(opts);

    let (summary, last_frame) = if opts.headless {
        let mut fb = Framebuffer::new(opts.width(), opts.height());
        let summary = plasma_fx::run(&mut field, &mut fb, &config, cancel)?;
        (summary, fb)
    } else {
        let mut surface =
            TerminalSurface::new(opts.width(), opts.height())?.with_cancel(cancel.clone());
        let result = plasma_fx::run(&mut field, &mut surface, &config, cancel);
        let frame = surface.frame().clone();
        // Restore the terminal before anything is reported.
        drop(surface);
        (result?, frame)
    };

    if let Some(path) = &opts.snapshot {
        write_snapshot(&last_frame, path)?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(Outcome::Ran(summary))
}

/// Build the palette and apply `--palette-size` then `--color-adjust`.
///
/// With `--dump-palette`, `--palette-size=2048 --color-adjust=led` writes the
/// files the LED panels were calibrated with.
pub fn prepare_palette(opts: &Opts) -> Result<Palette, PlasmaError> {
    let mut palette = opts.palette.build()?;
    if let Some(size) = opts.palette_size {
        palette = palette.resample(size)?;
        debug!(entries = palette.len(), "palette resampled");
    }
    if let Some(factors) = opts.color_adjust {
        palette = palette.scaled(factors);
        debug!(r = factors[0], g = factors[1], b = factors[2], "palette channels scaled");
    }
    Ok(palette)
}

/// Frame loop settings for `opts`.
pub fn run_config(opts: &Opts) -> RunConfig {
    let config = RunConfig::default().with_frame_delay(Duration::from_millis(opts.delay_ms));
    match opts.frames {
        0 => config,
        n => config.with_max_frames(n),
    }
}

fn install_signal_handlers(cancel: &CancelToken) -> Result<(), PlasmaError> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, cancel.flag()).map_err(|e| {
            PlasmaError::device(format!("can't install handler for signal {signal}: {e}"))
        })?;
    }
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, PlasmaError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| PlasmaError::Output {
            path: path.to_path_buf(),
            source,
        })
}

fn write_palette(palette: &Palette, path: &Path) -> Result<(), PlasmaError> {
    palette
        .write_list(create(path)?)
        .map_err(|source| PlasmaError::Output {
            path: path.to_path_buf(),
            source,
        })
}

fn write_snapshot(frame: &Framebuffer, path: &Path) -> Result<(), PlasmaError> {
    frame
        .write_ppm(create(path)?)
        .map_err(|source| PlasmaError::Output {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plasma_fx::{PaletteSpec, Rgb};
    use std::fs;

    fn headless(frames: u64) -> Opts {
        Opts {
            rows: 8,
            cols: 8,
            chain: 2,
            delay_ms: 0,
            frames,
            seed: Some(11),
            headless: true,
            ..Opts::default()
        }
    }

    #[test]
    fn run_config_maps_zero_frames_to_forever() {
        let config = run_config(&headless(0));
        assert_eq!(config.max_frames, None);
        assert_eq!(config.frame_delay, Duration::ZERO);
        assert_eq!(run_config(&headless(4)).max_frames, Some(4));
    }

    #[test]
    fn headless_run_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.ppm");
        let opts = Opts {
            snapshot: Some(path.clone()),
            ..headless(3)
        };
        let outcome = run_with(&opts, &CancelToken::new()).unwrap();
        let Outcome::Ran(summary) = outcome else {
            panic!("expected a frame loop, got {outcome:?}");
        };
        assert_eq!(summary.frames, 3);
        assert!(!summary.cancelled);

        let bytes = fs::read(&path).unwrap();
        let header = b"P6\n16 8\n255\n";
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(bytes.len(), header.len() + 16 * 8 * 3);
    }

    #[test]
    fn same_seed_same_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snap = |name: &str| {
            let path = dir.path().join(name);
            let opts = Opts {
                snapshot: Some(path.clone()),
                ..headless(5)
            };
            run_with(&opts, &CancelToken::new()).unwrap();
            fs::read(path).unwrap()
        };
        assert_eq!(snap("a.ppm"), snap("b.ppm"));
    }

    #[test]
    fn cancelled_token_runs_no_frames() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = run_with(&headless(0), &cancel).unwrap();
        assert!(matches!(outcome, Outcome::Ran(s) if s.frames == 0 && s.cancelled));
    }

    #[test]
    fn dumped_palette_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.txt");
        let stops = vec![Rgb::RED, Rgb::BLUE];
        let opts = Opts {
            dump_palette: Some(path.clone()),
            palette: PaletteSpec::Stops(stops.clone()),
            ..headless(0)
        };
        let outcome = run_with(&opts, &CancelToken::new()).unwrap();
        assert_eq!(outcome, Outcome::PaletteDumped { entries: 257 });

        let read_back = PaletteSpec::File(path).build().unwrap();
        assert_eq!(read_back, Palette::gradient(&stops).unwrap());
    }

    #[test]
    fn dump_reproduces_led_palette_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.txt");
        let opts = Opts {
            dump_palette: Some(path.clone()),
            palette: PaletteSpec::Stops(vec![Rgb::WHITE, Rgb::WHITE]),
            palette_size: Some(2048),
            color_adjust: Some(plasma_fx::LED_COLOR_ADJUST),
            ..headless(0)
        };
        let outcome = run_with(&opts, &CancelToken::new()).unwrap();
        assert_eq!(outcome, Outcome::PaletteDumped { entries: 2048 });

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2048);
        assert!(lines.iter().all(|l| *l == "255 229 229"), "{:?}", &lines[..3]);
    }

    #[test]
    fn palette_options_also_shape_the_rendered_palette() {
        let opts = Opts {
            palette: PaletteSpec::Stops(vec![Rgb::BLACK, Rgb::WHITE]),
            palette_size: Some(3),
            color_adjust: Some([1.0, 0.5, 0.0]),
            ..headless(1)
        };
        let palette = prepare_palette(&opts).unwrap();
        assert_eq!(
            palette.colors(),
            &[Rgb::BLACK, Rgb::new(127, 63, 0), Rgb::new(255, 127, 0)]
        );
    }

    #[test]
    fn missing_palette_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Opts {
            palette: PaletteSpec::File(dir.path().join("absent.txt")),
            ..headless(1)
        };
        let err = run_with(&opts, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, PlasmaError::Config { .. }), "{err:?}");
    }

    #[test]
    fn unwritable_snapshot_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Opts {
            snapshot: Some(dir.path().join("no-such-dir").join("frame.ppm")),
            ..headless(1)
        };
        let err = run_with(&opts, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, PlasmaError::Output { .. }), "{err:?}");
    }
}
