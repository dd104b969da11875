//! Engine Error Types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A malformed line in the configuration text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {reason}")]
pub struct SyntaxError {
    /// 1-based line number
    pub line: usize,
    pub reason: &'static str,
}

/// Errors reading or writing the configuration resource
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Syntax error in {}, {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

/// Errors creating the change-notification subscription
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("Failed to watch {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot watch {}: path has no file name", .0.display())]
    InvalidPath(PathBuf),
}

/// Errors that can occur setting up or driving the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("DSP error: {0}")]
    Dsp(#[from] aeq_dsp::DspError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    #[error("Engine has been shut down")]
    ShutDown,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
