/*
 * Error Module
 *
 * Errors for the configuration surface. Numeric degeneracies inside the
 * simulation (zero vectors, out-of-bounds field access, empty surfaces) are
 * never errors; they resolve to neutral values where they occur.
 */

use std::path::PathBuf;

use thiserror::Error;

use crate::params::ParamValue;

// Rejected `set_parameter` calls
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter `{0}`")]
    Unknown(String),
    #[error("parameter `{name}` expects {expected}, got {got:?}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        got: ParamValue,
    },
}

// Failures while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
