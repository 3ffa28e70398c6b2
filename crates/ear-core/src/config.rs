use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Recognition engine configuration.
///
/// Serializable as TOML. Every field has a sane default; a partial file
/// overrides only what it names.
///
/// # Example
/// ```
/// use ear_core::EarConfig;
/// let config = EarConfig::default();
/// assert_eq!(config.chunks_per_second, 20);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EarConfig {
    /// Preferred capture sample rate (Hz). The device may impose its own.
    pub sample_rate: u32,
    /// Frequency-profile resolution: chunks per second of audio.
    pub chunks_per_second: u32,
    /// Amplitudes below this are treated as silence by the conditioner.
    pub noise_floor: f32,
    /// Maximum profile distance (0 = identical, 1 = maximally dissimilar)
    /// at which a capture counts as a match.
    pub recognition_threshold: f32,
    /// Duration of each capture cycle, in seconds.
    pub capture_seconds: f32,
}

impl Default for EarConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            chunks_per_second: 20,
            noise_floor: 0.001,
            recognition_threshold: 0.30,
            capture_seconds: 5.0,
        }
    }
}

impl EarConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.sample_rate = self.sample_rate.clamp(8_000, 192_000);
        self.chunks_per_second = self.chunks_per_second.clamp(1, 100);
        self.noise_floor = self.noise_floor.clamp(0.0, 0.1);
        self.recognition_threshold = self.recognition_threshold.clamp(0.0, 1.0);
        self.capture_seconds = self.capture_seconds.clamp(0.5, 60.0);
    }
}

/// TOML file shape: one optional `[recognition]` section, all fields optional
/// for partial override.
#[derive(Deserialize)]
struct ConfigFile {
    recognition: Option<RecognitionSection>,
}

#[derive(Deserialize)]
struct RecognitionSection {
    sample_rate: Option<u32>,
    chunks_per_second: Option<u32>,
    noise_floor: Option<f32>,
    recognition_threshold: Option<f32>,
    capture_seconds: Option<f32>,
}

/// Load a TOML file and merge it over the defaults.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ear_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/ear.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<EarConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config file {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("TOML parse error in {}", path.display()))?;

    let mut config = EarConfig::default();
    if let Some(r) = file.recognition {
        if let Some(v) = r.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = r.chunks_per_second {
            config.chunks_per_second = v;
        }
        if let Some(v) = r.noise_floor {
            config.noise_floor = v;
        }
        if let Some(v) = r.recognition_threshold {
            config.recognition_threshold = v;
        }
        if let Some(v) = r.capture_seconds {
            config.capture_seconds = v;
        }
    }
    config.clamp_all();
    Ok(config)
}
