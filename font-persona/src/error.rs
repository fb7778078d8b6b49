//! Errors surfaced by the analysis pipeline.

use std::{fmt, path::PathBuf};

use skrifa::{raw::ReadError, Tag};

/// Errors that abort the analysis of a single font.
///
/// Every variant carries the identifier of the offending font so that a
/// batch driver can log the failure and continue with the next item.
#[derive(Debug)]
pub enum Error {
    /// The font file could not be read from disk.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The data is not a recognized sfnt container (or collection face).
    ///
    /// WOFF and WOFF2 data must be decoded by the loader before it reaches
    /// the analyzer and is reported through this variant.
    UnsupportedFormat { font: String, reason: ReadError },
    /// A table required for every analysis is absent.
    MissingTable { font: String, tag: Tag },
    /// Variable analysis was requested for a font without variation axes.
    NotVariableFont { font: String },
    /// A configuration document could not be parsed.
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns the identifier of the font associated with this error, if
    /// any.
    pub fn font(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFormat { font, .. }
            | Self::MissingTable { font, .. }
            | Self::NotVariableFont { font } => Some(font),
            Self::Io { .. } | Self::Config { .. } => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::UnsupportedFormat { font, reason } => {
                write!(f, "[{font}] unsupported font format: {reason}")
            }
            Self::MissingTable { font, tag } => {
                write!(f, "[{font}] required table '{tag}' is missing")
            }
            Self::NotVariableFont { font } => {
                write!(f, "[{font}] font has no variation axes")
            }
            Self::Config { path, source } => {
                write!(f, "invalid configuration in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::UnsupportedFormat { reason, .. } => Some(reason),
            Self::Config { source, .. } => Some(source),
            Self::MissingTable { .. } | Self::NotVariableFont { .. } => None,
        }
    }
}
