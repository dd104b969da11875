//! AEq Core - Equalizer Engine
//!
//! This crate connects the DSP core to the outside world:
//! - The line-oriented configuration file shared with control surfaces
//! - Non-blocking change notification on that file
//! - A per-stream `Engine` handle: initialize, process, shutdown
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Control surface (any process)              │
//! │           GUI / toggle tool ──writes──▶ config file         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ ConfigWatch (notify / mtime)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   poll ──changed?──▶ reload ──▶ Equalizer ──▶ output        │
//! │              (No blocking waits in this path)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod watch;

pub use config::{parse_config, render_config, ConfigFile, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, EngineResult, SyntaxError, WatchError};
pub use watch::{ConfigWatch, MtimeWatch, NotifyWatch};

// Re-export DSP types for convenience
pub use aeq_dsp::{EqConfig, Equalizer, Sample, StreamFormat, BAND_COUNT, BAND_FREQUENCIES};
