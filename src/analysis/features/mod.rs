// FeatureExtractor - EEG feature extraction for emotion classification
//
// This module turns a (cleaned) EEG signal into the 17-dimensional feature
// vector consumed by the classifiers. Features are computed per channel from
// the Welch PSD and from the time-domain samples, averaged across channels,
// and completed by one cross-channel feature (frontal alpha asymmetry).
//
// Module organization:
// - types: Data structures (Band, BandPowers, NeuroRatios, FeatureVector)
// - welch: Welch PSD estimation with Hann windowing
// - spectral: Frequency-domain features (band powers, entropy, edge, peak)
// - temporal: Time-domain features (Hjorth, skewness, kurtosis)
// - mod.rs: Coordinator (FeatureExtractor)
//
// Feature layout:
//  0-4   relative band powers (delta, theta, alpha, beta, gamma)
//  5-7   alpha/beta, theta/alpha, (alpha+theta)/beta from relative powers
//  8-10  Hjorth activity, mobility, complexity
//  11    spectral entropy (normalized)
//  12-13 skewness, excess kurtosis
//  14-15 spectral edge (95%) and peak frequency, rescaled to [0, 1]
//  16    frontal asymmetry index

mod spectral;
mod temporal;
mod types;
mod welch;

pub use spectral::{
    absolute_band_powers, band_power, normalize_frequency, peak_frequency,
    relative_band_powers, spectral_edge_frequency, spectral_entropy, ANALYSIS_HIGH_HZ,
    ANALYSIS_LOW_HZ,
};
pub use temporal::{excess_kurtosis, hjorth, skewness, variance, Hjorth};
pub use types::{
    Band, BandPowers, FeatureVector, NeuroRatios, CHANNEL_FEATURE_LEN, FEATURE_LEN,
    FEATURE_NAMES, RATIO_EPSILON,
};
pub use welch::{Psd, WelchEstimator};

use rayon::prelude::*;

use crate::analysis::signal::EegSignal;
use crate::config::SpectralConfig;

/// Floor applied to alpha power before taking its logarithm
const ASYMMETRY_POWER_FLOOR: f64 = 1e-12;

/// Bound on the asymmetry index
const ASYMMETRY_LIMIT: f64 = 3.0;

/// Per-channel outputs kept together so the asymmetry step can reuse the
/// absolute alpha power without recomputing the PSD
struct ChannelFeatures {
    values: [f64; CHANNEL_FEATURE_LEN],
    alpha_power: f64,
}

/// FeatureExtractor coordinates the feature extraction pipeline
///
/// Stateless apart from the Welch parameters, so one instance can be shared
/// by any number of concurrent requests.
pub struct FeatureExtractor {
    welch: WelchEstimator,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor
    ///
    /// # Arguments
    /// * `config` - Welch segment parameters
    pub fn new(config: &SpectralConfig) -> Self {
        Self {
            welch: WelchEstimator::new(config),
        }
    }

    /// Extract the 17-dimensional feature vector from a signal
    ///
    /// Channels are processed in parallel; the collected results keep
    /// channel-index order, so the element-wise average is deterministic.
    /// With a single channel, the asymmetry feature is exactly 0.0.
    pub fn extract(&self, signal: &EegSignal) -> FeatureVector {
        let fs = signal.sampling_rate();
        let per_channel: Vec<ChannelFeatures> = signal
            .channels()
            .par_iter()
            .map(|channel| self.extract_channel_features(channel, fs))
            .collect();

        let mut values = [0.0; FEATURE_LEN];
        let n = per_channel.len() as f64;
        for channel in &per_channel {
            for (acc, v) in values.iter_mut().zip(channel.values) {
                *acc += v / n;
            }
        }

        let alpha: Vec<f64> = per_channel.iter().map(|c| c.alpha_power).collect();
        values[FEATURE_LEN - 1] = frontal_asymmetry(&alpha);

        FeatureVector::new(values)
    }

    /// Absolute band powers of one 1-D signal
    pub fn band_powers(&self, samples: &[f64], sampling_rate: f64) -> BandPowers {
        absolute_band_powers(&self.welch.estimate(samples, sampling_rate))
    }

    fn extract_channel_features(&self, samples: &[f64], sampling_rate: f64) -> ChannelFeatures {
        let psd = self.welch.estimate(samples, sampling_rate);
        let absolute = absolute_band_powers(&psd);
        let relative = relative_band_powers(&absolute);
        let hjorth = hjorth(samples);

        let (delta, theta, alpha, beta, gamma) = (
            relative.delta,
            relative.theta,
            relative.alpha,
            relative.beta,
            relative.gamma,
        );

        let values = [
            delta,
            theta,
            alpha,
            beta,
            gamma,
            alpha / (beta + RATIO_EPSILON),
            theta / (alpha + RATIO_EPSILON),
            (alpha + theta) / (beta + RATIO_EPSILON),
            hjorth.activity,
            hjorth.mobility,
            hjorth.complexity,
            spectral_entropy(&psd),
            skewness(samples),
            excess_kurtosis(samples),
            normalize_frequency(spectral_edge_frequency(&psd)),
            normalize_frequency(peak_frequency(&psd)),
        ];

        ChannelFeatures {
            values,
            alpha_power: absolute.alpha,
        }
    }
}

/// Frontal alpha asymmetry from per-channel absolute alpha power
///
/// `ln(mean alpha, right half) - ln(mean alpha, left half)`, clipped to
/// [-3, 3]. The first half of the channels is taken as the left hemisphere and
/// the rest as the right; electrode positions are not checked. With an odd
/// count the middle channel belongs to the right half. Fewer than two
/// channels give 0.0.
pub fn frontal_asymmetry(alpha_powers: &[f64]) -> f64 {
    if alpha_powers.len() < 2 {
        return 0.0;
    }

    let (left, right) = alpha_powers.split_at(alpha_powers.len() / 2);
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;

    let left_log = mean(left).max(ASYMMETRY_POWER_FLOOR).ln();
    let right_log = mean(right).max(ASYMMETRY_POWER_FLOOR).ln();

    (right_log - left_log).clamp(-ASYMMETRY_LIMIT, ASYMMETRY_LIMIT)
}
