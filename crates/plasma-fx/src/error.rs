#![forbid(unsafe_code)]

//! Startup and device errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Everything that can stop the renderer before (or, for I/O-backed
/// surfaces, during) the frame loop.
#[derive(Debug)]
pub enum PlasmaError {
    /// Malformed or missing command-line mode or arguments.
    Usage(String),
    /// A palette file could not be opened or read.
    Config { path: PathBuf, source: io::Error },
    /// A palette source produced no colors.
    EmptyPalette,
    /// The output surface could not be acquired or written.
    Device(String),
    /// A snapshot or palette dump could not be written.
    Output { path: PathBuf, source: io::Error },
}

impl PlasmaError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    /// Whether the usage banner should accompany this error.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

impl fmt::Display for PlasmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "usage error: {msg}"),
            Self::Config { path, source } => {
                write!(f, "can't open palette file {}: {source}", path.display())
            }
            Self::EmptyPalette => write!(f, "palette contains no colors"),
            Self::Device(msg) => write!(f, "device error: {msg}"),
            Self::Output { path, source } => {
                write!(f, "can't write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PlasmaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config { source, .. } | Self::Output { source, .. } => Some(source),
            _ => None,
        }
    }
}
