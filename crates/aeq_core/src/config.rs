//! Configuration Resource
//!
//! The equalizer settings live in a small line-oriented text file shared
//! with external control surfaces:
//!
//! ```text
//! 1 # On/off
//! 0.0 # 31.25 Hz
//! ...
//! 6.0 # 1 kHz
//! ...
//! 0.0 # 16 kHz
//! 0.0 # Preamp
//! ```
//!
//! Each line holds one number; anything after it is a comment. The preamp
//! line may be missing in files written before preamp support existed.
//! Every value line must end with a newline, so a file cut short while being
//! written is rejected rather than half-applied.
//!
//! # Storage Location
//! - Linux: `~/.config/aeq/config`
//! - Windows: `%APPDATA%\aeq\config`
//! - macOS: `~/Library/Application Support/aeq/config`

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use aeq_dsp::{EqConfig, BAND_COUNT, BAND_LABELS, MAX_GAIN_DB};
use directories::BaseDirs;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ConfigError, SyntaxError};

/// Directory under the user configuration directory
pub const CONFIG_DIR_NAME: &str = "aeq";

/// File name of the configuration inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config";

/// Length of the numeric prefix of `s`: optional sign, digits, and with
/// `fractional` a decimal part and exponent. Single pass.
fn scan_number(s: &str, fractional: bool) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(start);
    let mut has_digits = int_end > start;
    let mut end = if has_digits { int_end } else { 0 };
    if !fractional {
        return end;
    }

    let mut i = int_end;
    if bytes.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        if has_digits || frac_end > i + 1 {
            has_digits = true;
            end = frac_end;
        }
        i = frac_end;
    }

    if has_digits && matches!(bytes.get(i), Some(b'e' | b'E')) {
        let exp_start = i + 1 + usize::from(matches!(bytes.get(i + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    end
}

/// Parse the numeric prefix of a line, ignoring leading whitespace.
fn leading_number<T: FromStr>(line: &str, fractional: bool) -> Option<T> {
    let s = line.trim_start();
    s[..scan_number(s, fractional)].parse().ok()
}

/// Strip the terminator of a value line; a line without one was cut short.
fn complete_line(line: Option<&str>, number: usize) -> Result<&str, SyntaxError> {
    let line = line.ok_or(SyntaxError {
        line: number,
        reason: "missing line",
    })?;
    line.strip_suffix('\n').ok_or(SyntaxError {
        line: number,
        reason: "incomplete line",
    })
}

/// Gain in dB, clamped to the range the equalizer accepts
fn gain_line(line: Option<&str>, number: usize) -> Result<f32, SyntaxError> {
    leading_number::<f32>(complete_line(line, number)?, true)
        .filter(|g| g.is_finite())
        .map(|g| g.clamp(-MAX_GAIN_DB, MAX_GAIN_DB))
        .ok_or(SyntaxError {
            line: number,
            reason: "expected a gain in dB",
        })
}

/// Parse configuration text.
///
/// Gains outside ±[`MAX_GAIN_DB`] are clamped. Lines past the preamp are
/// ignored. Any failure leaves the caller's settings alone; nothing partial
/// is returned.
pub fn parse_config(text: &str) -> Result<EqConfig, SyntaxError> {
    let mut lines = text.split_inclusive('\n');

    let enabled: i64 = leading_number(complete_line(lines.next(), 1)?, false).ok_or(
        SyntaxError {
            line: 1,
            reason: "expected 0 or 1",
        },
    )?;

    let mut gains_db = [0.0; BAND_COUNT];
    for (k, gain) in gains_db.iter_mut().enumerate() {
        *gain = gain_line(lines.next(), k + 2)?;
    }

    let preamp_db = match lines.next() {
        Some(line) if !line.trim().is_empty() => gain_line(Some(line), BAND_COUNT + 2)?,
        _ => 0.0,
    };

    Ok(EqConfig {
        enabled: enabled != 0,
        gains_db,
        preamp_db,
    })
}

/// Render settings in the file format, one labelled line per value.
///
/// Gains are rounded to one decimal place.
pub fn render_config(config: &EqConfig) -> String {
    let mut out = format!("{} # On/off\n", u8::from(config.enabled));
    for (gain, label) in config.gains_db.iter().zip(BAND_LABELS) {
        out.push_str(&format!("{:.1} # {}\n", gain, label));
    }
    out.push_str(&format!("{:.1} # Preamp\n", config.preamp_db));
    out
}

/// Handle to the configuration file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user configuration file, `aeq/config` under the platform's
    /// configuration directory
    pub fn default_location() -> Result<Self, ConfigError> {
        BaseDirs::new()
            .map(|dirs| {
                Self::new(
                    dirs.config_dir()
                        .join(CONFIG_DIR_NAME)
                        .join(CONFIG_FILE_NAME),
                )
            })
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the file
    pub fn read(&self) -> Result<EqConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        parse_config(&text).map_err(|source| ConfigError::Syntax {
            path: self.path.clone(),
            source,
        })
    }

    /// Write settings, creating the parent directory if needed.
    ///
    /// The text goes to a temporary file in the same directory which is then
    /// renamed over the configuration, so readers see the old file or the
    /// new one and never a partial write.
    pub fn write(&self, config: &EqConfig) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(render_config(config).as_bytes())
            .map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// First-time setup: write the default (disabled, flat) settings if the
    /// file does not exist yet. Returns whether a file was created.
    pub fn ensure_exists(&self) -> Result<bool, ConfigError> {
        if self.exists() {
            return Ok(false);
        }

        self.write(&EqConfig::default())?;
        info!("Created default equalizer configuration at {:?}", self.path);
        Ok(true)
    }
}
