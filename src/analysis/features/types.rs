// Types module - Data structures for EEG features
//
// This module defines the band table, band-power maps, neurological ratios
// and the fixed-length feature vector consumed by the classifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of per-channel features (everything except asymmetry)
pub const CHANNEL_FEATURE_LEN: usize = 16;

/// Total feature vector length
pub const FEATURE_LEN: usize = 17;

/// Small additive epsilon used in ratio denominators
pub const RATIO_EPSILON: f64 = 1e-9;

/// Canonical EEG frequency bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// 0.5-4 Hz: deep sleep, unconscious processing
    Delta,
    /// 4-8 Hz: meditation, drowsiness
    Theta,
    /// 8-13 Hz: relaxed wakefulness
    Alpha,
    /// 13-30 Hz: active thinking, stress
    Beta,
    /// 30-50 Hz: high-level cognition
    Gamma,
}

impl Band {
    /// All bands in feature-vector order
    pub const ALL: [Band; 5] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta, Band::Gamma];

    /// Frequency interval `(fmin, fmax)` in Hz
    pub const fn range(self) -> (f64, f64) {
        match self {
            Band::Delta => (0.5, 4.0),
            Band::Theta => (4.0, 8.0),
            Band::Alpha => (8.0, 13.0),
            Band::Beta => (13.0, 30.0),
            Band::Gamma => (30.0, 50.0),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Band::Delta => "delta",
            Band::Theta => "theta",
            Band::Alpha => "alpha",
            Band::Beta => "beta",
            Band::Gamma => "gamma",
        }
    }
}

/// Power per band, either absolute (uV^2/Hz) or relative (fractions)
///
/// Absolute values depend on device gain and are meant for display.
/// Relative values sum to ~1.0 and are what the models consume.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandPowers {
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl BandPowers {
    /// Equal share for every band
    pub const UNIFORM: BandPowers = BandPowers {
        delta: 0.2,
        theta: 0.2,
        alpha: 0.2,
        beta: 0.2,
        gamma: 0.2,
    };

    pub fn from_array(values: [f64; 5]) -> Self {
        Self {
            delta: values[0],
            theta: values[1],
            alpha: values[2],
            beta: values[3],
            gamma: values[4],
        }
    }

    pub fn to_array(&self) -> [f64; 5] {
        [self.delta, self.theta, self.alpha, self.beta, self.gamma]
    }

    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Delta => self.delta,
            Band::Theta => self.theta,
            Band::Alpha => self.alpha,
            Band::Beta => self.beta,
            Band::Gamma => self.gamma,
        }
    }

    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }

    /// Band name -> power, for display payloads
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Band::ALL
            .iter()
            .map(|&band| (band.name().to_string(), self.get(band)))
            .collect()
    }
}

/// Ratios that correlate with emotional state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeuroRatios {
    /// Alpha/Beta: relaxation vs stress
    pub alpha_beta_ratio: f64,
    /// Theta/Alpha: mental effort
    pub theta_alpha_ratio: f64,
    /// (Alpha + Theta)/Beta: fatigue index
    pub fatigue_index: f64,
}

impl NeuroRatios {
    pub fn from_powers(powers: &BandPowers) -> Self {
        Self {
            alpha_beta_ratio: powers.alpha / (powers.beta + RATIO_EPSILON),
            theta_alpha_ratio: powers.theta / (powers.alpha + RATIO_EPSILON),
            fatigue_index: (powers.alpha + powers.theta) / (powers.beta + RATIO_EPSILON),
        }
    }
}

/// Names of the 17 feature positions, in order
pub const FEATURE_NAMES: [&str; FEATURE_LEN] = [
    "rel_delta",
    "rel_theta",
    "rel_alpha",
    "rel_beta",
    "rel_gamma",
    "alpha_beta_ratio",
    "theta_alpha_ratio",
    "alpha_theta_beta_ratio",
    "hjorth_activity",
    "hjorth_mobility",
    "hjorth_complexity",
    "spectral_entropy",
    "skewness",
    "kurtosis",
    "spectral_edge_95",
    "peak_frequency",
    "frontal_asymmetry",
];

/// Fixed-length feature vector; every element is finite
///
/// Construction replaces NaN/Inf with 0.0, so downstream classifiers never
/// see non-finite input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    /// Build from raw values, sanitizing non-finite entries
    pub fn new(mut values: [f64; FEATURE_LEN]) -> Self {
        let mut sanitized = Vec::new();
        for (i, v) in values.iter_mut().enumerate() {
            if !v.is_finite() {
                *v = 0.0;
                sanitized.push(i);
            }
        }
        if !sanitized.is_empty() {
            tracing::debug!("Sanitized non-finite features at indices {:?}", sanitized);
        }
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        FEATURE_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Relative band powers stored at positions 0-4
    pub fn relative_band_powers(&self) -> BandPowers {
        BandPowers::from_array([self.0[0], self.0[1], self.0[2], self.0[3], self.0[4]])
    }

    pub fn asymmetry(&self) -> f64 {
        self.0[FEATURE_LEN - 1]
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}
