//! Configuration management for the EEG analysis pipeline
//!
//! This module provides runtime configuration loading from JSON files.
//! Every default matches the standard pipeline constants, so an absent
//! or unreadable config file yields the standard behavior.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sampling rate assumed when a request does not declare one (Hz)
    pub sampling_rate: f64,
    /// Minimum samples per channel accepted by the pipeline
    pub min_samples: usize,
    /// Strategy identifier used when a request does not name one
    pub default_strategy: String,
    pub preprocess: PreprocessConfig,
    pub spectral: SpectralConfig,
    pub models: ModelsConfig,
}

/// Artifact suppression and band-limiting parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Lower corner of the band-pass filter (Hz)
    pub band_low_hz: f64,
    /// Upper corner of the band-pass filter (Hz)
    pub band_high_hz: f64,
    /// Butterworth prototype order
    pub filter_order: usize,
    /// Artifact threshold as a multiple of the channel IQR
    pub iqr_multiplier: f64,
    /// Threshold used when the IQR is negligible (amplitude units)
    pub fallback_threshold: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            band_low_hz: 0.5,
            band_high_hz: 50.0,
            filter_order: 4,
            iqr_multiplier: 5.0,
            fallback_threshold: 150.0,
        }
    }
}

/// Welch estimator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Segment length in seconds (capped at the signal length)
    pub segment_seconds: f64,
    /// Floor on segment length in samples
    pub min_segment_len: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            segment_seconds: 2.0,
            min_segment_len: 4,
        }
    }
}

/// Trained model location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory holding `*_model.json` and `ensemble_weights.json`
    pub models_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            sampling_rate: 128.0,
            min_samples: 64,
            default_strategy: "SVM".to_string(),
            preprocess: PreprocessConfig::default(),
            spectral: SpectralConfig::default(),
            models: ModelsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file doesn't exist
    /// or its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
