/*
 * Error Module
 *
 * Failures while reading scenery meshes from disk. These only occur at
 * startup; the binary wraps them with the offending path and exits.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading mesh assets at startup.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed OBJ data at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Face at line {line} references element {index}, but only {count} are defined")]
    IndexOutOfRange { line: usize, index: usize, count: usize },

    #[error("Mesh '{0}' has no triangles")]
    Empty(String),
}
