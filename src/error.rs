//! Error taxonomy for command runs

use crate::flag::FlagKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by command execution.
///
/// All propagation is value-based: [`crate::Command::run`] returns these,
/// nothing unwinds across the orchestration boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Unrecognized or malformed command-line token. Fatal to the run,
    /// never retried.
    #[error(transparent)]
    ArgumentParse(#[from] clap::Error),

    /// An environment variable bound to a flag held a value that does not
    /// parse as the flag's semantic type.
    #[error("invalid value {value:?} in ${var} for flag --{flag}: {reason}")]
    EnvVar { flag: String, var: String, value: String, reason: String },

    /// The overlay file is missing, unreadable, or malformed. Fatal; there
    /// is no silent fallback to defaults.
    #[error("failed to load overlay file {}: {}", .path.display(), .reason)]
    OverlaySource { path: PathBuf, reason: String },

    /// An overlay entry's stored type does not match the flag's semantic
    /// type. Typed getters ignore the entry instead of surfacing this; it
    /// exists for the loud-failure path of the opaque getter.
    #[error("overlay entry {name:?} holds a {found:?} value but the flag expects {expected:?}")]
    OverlayTypeMismatch { name: String, expected: FlagKind, found: FlagKind },
}

/// Result type alias for flagstack operations.
pub type Result<T> = std::result::Result<T, Error>;
