//! End-to-end tests: configuration file → engine → processed audio

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use aeq_core::*;
use tempfile::TempDir;

const RATE: u32 = 44100;

/// Watch driven by the test, standing in for a real notification
struct Trigger(Arc<AtomicBool>);

impl ConfigWatch for Trigger {
    fn poll(&mut self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

fn sine(freq: f32, amplitude: f32, frames: usize) -> Vec<i16> {
    (0..frames)
        .flat_map(|i| {
            let t = i as f32 / RATE as f32;
            let s = ((2.0 * std::f32::consts::PI * freq * t).sin() * amplitude) as i16;
            [s, s]
        })
        .collect()
}

fn rms(samples: &[i16]) -> f64 {
    let sum: f64 = samples.iter().map(|&s| (s as f64).powi(2)).sum();
    (sum / samples.len() as f64).sqrt()
}

fn gain_db(input: &[i16], output: &[i16]) -> f64 {
    // Second half only, past the filters' settling time
    let half = input.len() / 2;
    20.0 * (rms(&output[half..]) / rms(&input[half..])).log10()
}

fn boost_1k() -> EqConfig {
    let mut config = EqConfig::default();
    config.enabled = true;
    config.gains_db[5] = 6.0;
    config
}

fn triggered_engine(dir: &TempDir, config: &EqConfig) -> (Engine, ConfigFile, Arc<AtomicBool>) {
    let file = ConfigFile::new(dir.path().join("config"));
    file.write(config).unwrap();

    let flag = Arc::new(AtomicBool::new(false));
    let engine = Engine::with_watch(
        StreamFormat::new(RATE, 2),
        file.clone(),
        Box::new(Trigger(flag.clone())),
    )
    .unwrap();
    (engine, file, flag)
}

#[test]
fn initialize_creates_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("aeq").join(CONFIG_FILE_NAME));

    let engine = Engine::initialize(StreamFormat::new(RATE, 2), file.clone()).unwrap();
    assert!(file.exists());
    assert_eq!(file.read().unwrap(), EqConfig::default());
    assert_eq!(engine.config(), &EqConfig::default());

    let text = fs::read_to_string(file.path()).unwrap();
    assert_eq!(text.lines().count(), BAND_COUNT + 2);
    assert!(text.starts_with("0 # On/off\n"));
    assert!(text.ends_with("0.0 # Preamp\n"));
}

#[test]
fn initialize_keeps_existing_config() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("config"));
    file.write(&boost_1k()).unwrap();

    let engine = Engine::initialize(StreamFormat::new(RATE, 2), file.clone()).unwrap();
    assert_eq!(engine.config(), &boost_1k());
}

#[test]
fn too_many_channels_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("aeq").join("config"));

    let result = Engine::initialize(StreamFormat::new(RATE, 11), file.clone());
    assert!(matches!(
        result,
        Err(EngineError::Dsp(aeq_dsp::DspError::TooManyChannels {
            channels: 11,
            max: 10
        }))
    ));
    // Refused before any filesystem work
    assert!(!file.exists());
}

#[test]
fn uncreatable_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, "").unwrap();

    let file = ConfigFile::new(blocker.join("config"));
    let result = Engine::initialize(StreamFormat::new(RATE, 2), file);
    assert!(matches!(result, Err(EngineError::Config(ConfigError::Io { .. }))));
}

#[test]
fn config_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("config"));

    file.write(&EqConfig::default()).unwrap();
    assert_eq!(file.read().unwrap(), EqConfig::default());

    let mut config = boost_1k();
    config.gains_db[0] = -3.27;
    config.preamp_db = 1.04;
    file.write(&config).unwrap();

    let back = file.read().unwrap();
    assert!(back.enabled);
    assert!((back.gains_db[0] - -3.3).abs() < 1e-5);
    assert!((back.preamp_db - 1.0).abs() < 1e-5);
}

#[test]
fn legacy_file_without_preamp_loads() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("config"));

    let mut text = String::from("1 # On/off\n");
    for label in aeq_dsp::BAND_LABELS {
        text.push_str(&format!("2.0 # {}\n", label));
    }
    fs::write(file.path(), text).unwrap();

    let config = file.read().unwrap();
    assert!(config.enabled);
    assert_eq!(config.gains_db, [2.0; BAND_COUNT]);
    assert_eq!(config.preamp_db, 0.0);
}

#[test]
fn one_khz_boost_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (mut engine, _, _) = triggered_engine(&dir, &boost_1k());

    let input = sine(1000.0, 8000.0, 8820);
    let mut output = vec![0i16; input.len()];
    assert_eq!(engine.process(&input, &mut output), 8820);

    let db = gain_db(&input, &output);
    assert!((db - 6.0).abs() < 0.3, "1 kHz boost was {} dB", db);

    let input = sine(10000.0, 8000.0, 8820);
    let mut output = vec![0i16; input.len()];
    engine.process(&input, &mut output);

    let db = gain_db(&input, &output);
    assert!(db.abs() < 0.5, "10 kHz changed by {} dB", db);
}

#[test]
fn toggle_takes_effect_on_observed_block() {
    let dir = tempfile::tempdir().unwrap();
    let mut disabled = boost_1k();
    disabled.enabled = false;
    let (mut engine, file, flag) = triggered_engine(&dir, &disabled);

    let input = sine(1000.0, 8000.0, 512);
    let mut output = vec![0i16; input.len()];

    engine.process(&input, &mut output);
    assert_eq!(output, input);

    // Written but not yet observed: still bypassed
    file.write(&boost_1k()).unwrap();
    engine.process(&input, &mut output);
    assert_eq!(output, input);

    // Observed: this very block is equalized
    flag.store(true, Ordering::Relaxed);
    engine.process(&input, &mut output);
    assert_ne!(output, input);
    assert!(engine.config().enabled);

    // And back off again
    file.write(&disabled).unwrap();
    flag.store(true, Ordering::Relaxed);
    engine.process(&input, &mut output);
    assert_eq!(output, input);
}

#[test]
fn malformed_reload_keeps_last_good() {
    let dir = tempfile::tempdir().unwrap();
    let (mut engine, file, flag) = triggered_engine(&dir, &boost_1k());

    // A writer caught mid-save
    fs::write(file.path(), "0 # On/off\n0.0 # 31.25 Hz\n0.").unwrap();
    flag.store(true, Ordering::Relaxed);

    let input = sine(1000.0, 8000.0, 512);
    let mut output = vec![0i16; input.len()];
    engine.process(&input, &mut output);

    assert_eq!(engine.config(), &boost_1k());
    assert_ne!(output, input);
}

#[test]
fn process_after_shutdown_is_inert() {
    let dir = tempfile::tempdir().unwrap();
    let (mut engine, _, _) = triggered_engine(&dir, &boost_1k());

    engine.shutdown();
    engine.shutdown();

    let mut buffer = sine(1000.0, 8000.0, 64);
    let before = buffer.clone();
    assert_eq!(engine.process_in_place(&mut buffer), 0);
    assert_eq!(buffer, before);
}

#[test]
fn float_stream_is_not_limited() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EqConfig::default();
    config.enabled = true;
    config.gains_db = [12.0; BAND_COUNT];
    let (mut engine, _, _) = triggered_engine(&dir, &config);

    // Full-scale ~1 kHz, both channels
    let mut buffer: Vec<f32> = (0..4096).map(|i| ((i / 2) as f32 * 0.142).sin()).collect();
    engine.process_in_place(&mut buffer);

    assert!(buffer.iter().all(|s| s.is_finite()));
    assert!(buffer.iter().any(|s| s.abs() > 1.0));
}

#[test]
fn native_watch_reports_writes() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("config"));
    file.write(&EqConfig::default()).unwrap();

    let mut watch = NotifyWatch::subscribe(file.path()).unwrap();
    file.write(&boost_1k()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = false;
    while Instant::now() < deadline {
        if watch.poll() {
            seen = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(seen, "no change notification within 5 s");
}

#[test]
fn native_watch_ignores_other_files() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("config"));
    file.write(&EqConfig::default()).unwrap();

    let mut watch = NotifyWatch::subscribe(file.path()).unwrap();
    fs::write(dir.path().join("notes.txt"), "unrelated").unwrap();

    std::thread::sleep(Duration::from_millis(200));
    assert!(!watch.poll());
}

#[test]
fn engine_with_mtime_watch_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("config"));
    file.write(&EqConfig::default()).unwrap();

    let watch = MtimeWatch::subscribe(file.path()).unwrap();
    let mut engine =
        Engine::with_watch(StreamFormat::new(RATE, 2), file.clone(), Box::new(watch)).unwrap();

    let mut config = boost_1k();
    config.preamp_db = -2.5;
    // Longer file than the default, so the size alone flags the change
    file.write(&config).unwrap();

    let mut buffer = sine(1000.0, 8000.0, 64);
    engine.process_in_place(&mut buffer);
    assert_eq!(engine.config(), &config);
}
