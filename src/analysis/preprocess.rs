// Preprocessor - artifact suppression and band-limiting
//
// Each channel is processed independently:
// 1. Adaptive artifact removal: samples further than k x IQR from the channel
//    median are replaced by the median (not zeroed, which would create DC steps)
// 2. Zero-phase Butterworth band-pass (forward-backward SOS filtering)
//
// No amplitude normalization happens here. Relative band powers downstream
// depend on the amplitude differences that z-scoring would erase.

use rayon::prelude::*;
use sci_rs::signal::filter::design::{
    butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, Sos, SosFormatFilter,
};
use sci_rs::signal::filter::sosfiltfilt_dyn;

use crate::analysis::signal::EegSignal;
use crate::config::PreprocessConfig;

/// IQR below which the fixed fallback threshold is used
const IQR_EPSILON: f64 = 1e-8;

/// Normalized corner frequencies are kept inside (0, 1) by this margin
const MIN_NORMALIZED_CORNER: f64 = 0.001;
const MAX_NORMALIZED_CORNER: f64 = 0.999;

/// Cleans raw EEG channels ahead of feature extraction
///
/// The band-pass sections are designed once per sampling rate. A `None`
/// filter means the clamped pass band collapsed (very low sampling rates) and
/// channels pass through the filter stage unchanged.
pub struct Preprocessor {
    config: PreprocessConfig,
    sampling_rate: f64,
    sos: Option<Vec<Sos<f64>>>,
}

impl Preprocessor {
    /// Create a preprocessor for one sampling rate
    ///
    /// # Arguments
    /// * `config` - Artifact and filter parameters
    /// * `sampling_rate` - Sampling rate in Hz (> 0)
    pub fn new(config: PreprocessConfig, sampling_rate: f64) -> Self {
        let sos = design_band_pass(&config, sampling_rate);
        Self {
            config,
            sampling_rate,
            sos,
        }
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Whether the band-pass stage is active at this sampling rate
    pub fn filters(&self) -> bool {
        self.sos.is_some()
    }

    /// Clean every channel of a signal; output has the same shape
    pub fn clean(&self, signal: &EegSignal) -> EegSignal {
        let cleaned: Vec<Vec<f64>> = signal
            .channels()
            .par_iter()
            .map(|channel| self.clean_channel(channel))
            .collect();
        signal.with_channels(cleaned)
    }

    /// Artifact removal followed by band-limiting for one channel
    pub fn clean_channel(&self, samples: &[f64]) -> Vec<f64> {
        let despiked = remove_artifacts(
            samples,
            self.config.iqr_multiplier,
            self.config.fallback_threshold,
        );
        self.band_limit(&despiked)
    }

    /// Apply the zero-phase band-pass to one channel
    pub fn band_limit(&self, samples: &[f64]) -> Vec<f64> {
        let Some(sos) = self.sos.as_ref() else {
            return samples.to_vec();
        };

        // Forward-backward filtering pads each end with an odd extension of
        // this length; shorter inputs cannot be filtered.
        let padlen = 3 * (2 * sos.len() + 1);
        if samples.len() <= padlen {
            tracing::debug!(
                "Skipping band-pass: {} samples <= pad length {}",
                samples.len(),
                padlen
            );
            return samples.to_vec();
        }

        sosfiltfilt_dyn(samples.iter().copied(), sos)
    }
}

/// Replace amplitude outliers with the channel median
///
/// Threshold is `iqr_multiplier x IQR`, or `fallback_threshold` when the IQR
/// is negligible (flat channels). Adaptive thresholds are needed because the
/// absolute scale differs between calibrated (uV) and raw ADC recordings.
pub fn remove_artifacts(samples: &[f64], iqr_multiplier: f64, fallback_threshold: f64) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let median = percentile_sorted(&sorted, 50.0);
    let iqr = percentile_sorted(&sorted, 75.0) - percentile_sorted(&sorted, 25.0);
    let threshold = if iqr > IQR_EPSILON {
        iqr_multiplier * iqr
    } else {
        fallback_threshold
    };

    let mut replaced = 0usize;
    let cleaned = samples
        .iter()
        .map(|&v| {
            if (v - median).abs() > threshold {
                replaced += 1;
                median
            } else {
                v
            }
        })
        .collect();

    if replaced > 0 {
        tracing::debug!(
            "Replaced {} artifact samples (median={:.4}, threshold={:.4})",
            replaced,
            median,
            threshold
        );
    }
    cleaned
}

/// Percentile with linear interpolation between closest ranks
///
/// `sorted` must be ascending and non-empty; `q` is in [0, 100].
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = (q / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Design the band-pass SOS cascade, or `None` for a degenerate pass band
fn design_band_pass(config: &PreprocessConfig, sampling_rate: f64) -> Option<Vec<Sos<f64>>> {
    let nyquist = sampling_rate / 2.0;
    let low = (config.band_low_hz / nyquist).clamp(MIN_NORMALIZED_CORNER, MAX_NORMALIZED_CORNER);
    let high = (config.band_high_hz / nyquist).clamp(MIN_NORMALIZED_CORNER, MAX_NORMALIZED_CORNER);

    if low >= high {
        tracing::warn!(
            "Band-pass disabled at {} Hz: clamped corners {:.4} >= {:.4}",
            sampling_rate,
            low,
            high
        );
        return None;
    }

    let filter = butter_dyn(
        config.filter_order,
        vec![low * nyquist, high * nyquist],
        Some(FilterBandType::Bandpass),
        Some(false),
        Some(FilterOutputType::Sos),
        Some(sampling_rate),
    );

    match filter {
        DigitalFilter::Sos(SosFormatFilter { sos }) => Some(sos),
        _ => {
            tracing::warn!("Butterworth design did not return SOS sections; filter disabled");
            None
        }
    }
}
