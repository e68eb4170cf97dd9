//! Error types for simulator construction and scene loading.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid arguments rejected at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Range-query trees need exactly one value per point.
    #[error("points and values must have equal length (got {points} points, {values} values)")]
    LengthMismatch { points: usize, values: usize },

    /// Dynamic shapes need a finite, positive mass (inverse mass is `1 / mass`).
    #[error("mass must be finite and > 0, got {0}")]
    InvalidMass(f32),
}

pub type SimResult<T> = std::result::Result<T, SimError>;

/// Failures while reading a scene description. Every variant that comes from
/// the text itself carries the origin (usually a file path) and 1-based line.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("{origin}:{line}: {message}")]
    Syntax { origin: String, line: usize, message: String },

    #[error("{origin}:{line}: unknown directive '{directive}'")]
    UnknownDirective { origin: String, line: usize, directive: String },

    #[error("{origin}:{line}: {source}")]
    Invalid {
        origin: String,
        line: usize,
        #[source]
        source: SimError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
