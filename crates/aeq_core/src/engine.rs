//! Equalizer Engine - Main Entry Point
//!
//! One `Engine` serves one audio stream. The host calls `process` from its
//! audio callback; before touching audio, the engine polls its
//! configuration watch and, if the file changed, re-reads it.
//!
//! ```text
//!   control surface ──writes──▶ config file
//!                                   │ ConfigWatch::poll (non-blocking)
//!                                   ▼
//!   input block ──▶ Engine::process ──▶ Equalizer ──▶ output block
//! ```
//!
//! A reload that fails to read or parse keeps the previous settings. The
//! processing call itself never fails; every error is raised when the
//! engine is created.

use aeq_dsp::{EqConfig, Equalizer, Sample, StreamFormat};
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::error::{EngineError, EngineResult};
use crate::watch::{ConfigWatch, NotifyWatch};

/// Per-stream equalizer engine
pub struct Engine {
    /// `None` once shut down
    equalizer: Option<Equalizer>,

    /// Change subscription on the configuration file
    watch: Option<Box<dyn ConfigWatch>>,

    config_file: ConfigFile,

    /// Last configuration that was read successfully
    config: EqConfig,
}

impl Engine {
    /// Set up the engine for a stream.
    ///
    /// Creates the default configuration file if none exists yet and
    /// subscribes to native change notifications on it. Fails if the format
    /// is unusable (e.g. more than [`aeq_dsp::MAX_CHANNELS`] channels), the
    /// file cannot be created, or the subscription cannot be made.
    pub fn initialize(format: StreamFormat, config_file: ConfigFile) -> EngineResult<Self> {
        // Refuse the stream before touching the filesystem
        format.validate()?;

        config_file.ensure_exists()?;
        let watch = NotifyWatch::subscribe(config_file.path())?;

        Self::with_watch(format, config_file, Box::new(watch))
    }

    /// Same as [`Engine::initialize`] with the per-user configuration file
    pub fn initialize_default(format: StreamFormat) -> EngineResult<Self> {
        Self::initialize(format, ConfigFile::default_location()?)
    }

    /// Set up the engine with a caller-supplied watch.
    ///
    /// The file is read once; if that fails the engine starts disabled and
    /// flat and picks up the file on its next change.
    pub fn with_watch(
        format: StreamFormat,
        config_file: ConfigFile,
        watch: Box<dyn ConfigWatch>,
    ) -> EngineResult<Self> {
        let mut equalizer = Equalizer::new(format)?;

        let config = match config_file.read() {
            Ok(config) => config,
            Err(e) => {
                warn!("Starting with default equalizer settings: {}", e);
                EqConfig::default()
            }
        };
        equalizer.apply_config(&config);

        info!(
            "Equalizer engine started: {} Hz, {} channels, {} active bands, {}",
            format.sample_rate,
            format.channels,
            equalizer.active_bands(),
            if config.enabled { "enabled" } else { "disabled" }
        );

        Ok(Self {
            equalizer: Some(equalizer),
            watch: Some(watch),
            config_file,
            config,
        })
    }

    /// Process an interleaved block into `output`.
    ///
    /// Returns the number of frames written; 0 after shutdown.
    ///
    /// # Real-time Safety
    /// Never blocks on the watch. Reads the configuration file only when
    /// the watch reports a change.
    pub fn process<S: Sample>(&mut self, input: &[S], output: &mut [S]) -> usize {
        self.refresh();
        match self.equalizer.as_mut() {
            Some(eq) => eq.process(input, output),
            None => 0,
        }
    }

    /// Process an interleaved block in place.
    ///
    /// Returns the number of frames processed; 0 after shutdown.
    pub fn process_in_place<S: Sample>(&mut self, buffer: &mut [S]) -> usize {
        self.refresh();
        match self.equalizer.as_mut() {
            Some(eq) => eq.process_in_place(buffer),
            None => 0,
        }
    }

    /// Pick up a changed configuration file, if the watch saw one.
    fn refresh(&mut self) {
        let Some(watch) = self.watch.as_mut() else {
            return;
        };
        if !watch.poll() {
            return;
        }

        match self.config_file.read() {
            Ok(config) => {
                if let Some(eq) = self.equalizer.as_mut() {
                    eq.apply_config(&config);
                }
                self.config = config;
                debug!(
                    "Reloaded equalizer settings ({})",
                    if config.enabled { "enabled" } else { "disabled" }
                );
            }
            Err(e) => warn!("Keeping previous equalizer settings: {}", e),
        }
    }

    /// Re-establish the stream format (host renegotiated rate or channels).
    ///
    /// Zeroes all channel state. Allocates; call outside the audio callback.
    pub fn set_format(&mut self, format: StreamFormat) -> EngineResult<()> {
        let eq = self.equalizer.as_mut().ok_or(EngineError::ShutDown)?;
        eq.set_format(format)?;

        info!(
            "Stream format changed: {} Hz, {} channels, {} active bands",
            format.sample_rate,
            format.channels,
            eq.active_bands()
        );
        Ok(())
    }

    /// Release the watch subscription and stream state.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        let had_watch = self.watch.take().is_some();
        let had_stream = self.equalizer.take().is_some();

        if had_watch || had_stream {
            info!("Equalizer engine shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.equalizer.is_none()
    }

    /// Settings currently in effect
    pub fn config(&self) -> &EqConfig {
        &self.config
    }

    pub fn config_file(&self) -> &ConfigFile {
        &self.config_file
    }

    pub fn format(&self) -> Option<StreamFormat> {
        self.equalizer.as_ref().map(Equalizer::format)
    }

    pub fn equalizer(&self) -> Option<&Equalizer> {
        self.equalizer.as_ref()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
