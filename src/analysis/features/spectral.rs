// Spectral module - Frequency-domain feature extraction
//
// All functions operate on a Welch PSD. Band powers are trapezoidal integrals
// of the density; shape descriptors (entropy, edge, peak) are restricted to
// the analysis range 0.5-50 Hz.

use super::types::{Band, BandPowers};
use super::welch::Psd;

/// Lower edge of the analysis range (Hz)
pub const ANALYSIS_LOW_HZ: f64 = 0.5;

/// Upper edge of the analysis range (Hz)
pub const ANALYSIS_HIGH_HZ: f64 = 50.0;

/// Total band power below which relative powers fall back to uniform
pub const SILENT_POWER_THRESHOLD: f64 = 1e-10;

/// Total in-range density below which shape descriptors use fallbacks
const SHAPE_POWER_EPSILON: f64 = 1e-12;

/// Cumulative power fraction defining the spectral edge frequency
const SPECTRAL_EDGE_FRACTION: f64 = 0.95;

/// Integrate the PSD over `[fmin, fmax]` with the trapezoidal rule
///
/// Only bins with `fmin <= f <= fmax` participate. Returns 0.0 when no bin
/// falls in range (short or low-rate signals whose resolution misses the band)
/// and for a single bin, which spans no width.
pub fn band_power(psd: &Psd, fmin: f64, fmax: f64) -> f64 {
    let mut power = 0.0;
    let mut previous: Option<(f64, f64)> = None;

    for (&f, &p) in psd.frequencies.iter().zip(&psd.density) {
        if f < fmin || f > fmax {
            continue;
        }
        if let Some((f0, p0)) = previous {
            power += 0.5 * (p0 + p) * (f - f0);
        }
        previous = Some((f, p));
    }

    power
}

/// Absolute power of the five canonical bands
pub fn absolute_band_powers(psd: &Psd) -> BandPowers {
    let mut values = [0.0; 5];
    for (slot, band) in values.iter_mut().zip(Band::ALL) {
        let (fmin, fmax) = band.range();
        *slot = band_power(psd, fmin, fmax);
    }
    BandPowers::from_array(values)
}

/// Each band divided by the five-band total
///
/// A silent or degenerate signal (total below `SILENT_POWER_THRESHOLD`)
/// yields the uniform distribution instead of dividing by ~0.
pub fn relative_band_powers(absolute: &BandPowers) -> BandPowers {
    let total = absolute.total();
    if total < SILENT_POWER_THRESHOLD {
        return BandPowers::UNIFORM;
    }
    let values = absolute.to_array().map(|p| p / total);
    BandPowers::from_array(values)
}

/// Iterator over `(frequency, density)` pairs inside the analysis range
fn in_range(psd: &Psd) -> impl Iterator<Item = (f64, f64)> + '_ {
    psd.frequencies
        .iter()
        .zip(&psd.density)
        .filter(|(&f, _)| (ANALYSIS_LOW_HZ..=ANALYSIS_HIGH_HZ).contains(&f))
        .map(|(&f, &p)| (f, p))
}

/// Normalized Shannon entropy of the in-range spectrum
///
/// Formula: H = -sum(p_i * log2(p_i)) / log2(N), with p = PSD / sum(PSD)
///
/// Returns a value in [0, 1]: 0 for a pure tone concentrated in one bin, 1 for
/// a flat spectrum. Returns 0.0 with fewer than two bins or near-zero power.
pub fn spectral_entropy(psd: &Psd) -> f64 {
    let powers: Vec<f64> = in_range(psd).map(|(_, p)| p).collect();
    if powers.len() < 2 {
        return 0.0;
    }

    let total: f64 = powers.iter().sum();
    if total < SHAPE_POWER_EPSILON {
        return 0.0;
    }

    let entropy: f64 = powers
        .iter()
        .map(|&p| p / total)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.log2())
        .sum();

    entropy / (powers.len() as f64).log2()
}

/// Spectral edge frequency (SEF95) in Hz
///
/// Smallest in-range frequency at which the cumulative power reaches 95% of
/// the in-range total. Falls back to the middle of the analysis range when
/// the total is ~0.
pub fn spectral_edge_frequency(psd: &Psd) -> f64 {
    let midpoint = (ANALYSIS_LOW_HZ + ANALYSIS_HIGH_HZ) / 2.0;
    let total: f64 = in_range(psd).map(|(_, p)| p).sum();
    if total < SHAPE_POWER_EPSILON {
        return midpoint;
    }

    let threshold = SPECTRAL_EDGE_FRACTION * total;
    let mut cumulative = 0.0;
    let mut last = midpoint;
    for (f, p) in in_range(psd) {
        cumulative += p;
        last = f;
        if cumulative >= threshold {
            return f;
        }
    }

    // Only reachable through rounding; the last bin holds the remainder
    last
}

/// Frequency of the strongest in-range bin, in Hz
///
/// Ties resolve to the lowest frequency. Returns the bottom of the analysis
/// range when no bin falls inside it.
pub fn peak_frequency(psd: &Psd) -> f64 {
    let mut peak: Option<(f64, f64)> = None;
    for (f, p) in in_range(psd) {
        match peak {
            Some((_, best)) if p <= best => {}
            _ => peak = Some((f, p)),
        }
    }
    peak.map(|(f, _)| f).unwrap_or(ANALYSIS_LOW_HZ)
}

/// Linearly rescale a frequency from the analysis range onto [0, 1]
pub fn normalize_frequency(freq: f64) -> f64 {
    ((freq - ANALYSIS_LOW_HZ) / (ANALYSIS_HIGH_HZ - ANALYSIS_LOW_HZ)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat density on a 0.5 Hz grid from 0 to 64 Hz
    fn flat_psd(level: f64) -> Psd {
        let frequencies: Vec<f64> = (0..=128).map(|k| k as f64 * 0.5).collect();
        let density = vec![level; frequencies.len()];
        Psd {
            frequencies,
            density,
        }
    }

    /// Single non-zero bin at `freq` on the same grid
    fn tone_psd(freq: f64) -> Psd {
        let mut psd = flat_psd(0.0);
        let idx = (freq / 0.5) as usize;
        psd.density[idx] = 1.0;
        psd
    }

    #[test]
    fn test_band_power_trapezoid_on_flat_density() {
        let psd = flat_psd(2.0);
        // alpha: 8..=13 Hz, width 5 Hz, level 2
        assert!((band_power(&psd, 8.0, 13.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_band_power_without_bins_is_zero() {
        let psd = Psd {
            frequencies: vec![0.0, 32.0, 64.0],
            density: vec![1.0, 1.0, 1.0],
        };
        assert_eq!(band_power(&psd, 0.5, 4.0), 0.0);
        // one bin only: no width to integrate over
        assert_eq!(band_power(&psd, 30.0, 50.0), 0.0);
    }

    #[test]
    fn test_relative_powers_sum_to_one() {
        let absolute = BandPowers::from_array([3.0, 1.0, 4.0, 1.0, 5.0]);
        let relative = relative_band_powers(&absolute);
        assert!((relative.total() - 1.0).abs() < 1e-12);
        assert!((relative.gamma - 5.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_relative_powers_silent_signal_is_uniform() {
        let relative = relative_band_powers(&BandPowers::default());
        assert_eq!(relative, BandPowers::UNIFORM);
    }

    #[test]
    fn test_entropy_bounds() {
        let flat = spectral_entropy(&flat_psd(1.0));
        assert!((flat - 1.0).abs() < 1e-9, "flat entropy {}", flat);

        let tone = spectral_entropy(&tone_psd(10.0));
        assert_eq!(tone, 0.0);

        assert_eq!(spectral_entropy(&flat_psd(0.0)), 0.0);
    }

    #[test]
    fn test_spectral_edge_and_peak() {
        let psd = tone_psd(10.0);
        assert_eq!(spectral_edge_frequency(&psd), 10.0);
        assert_eq!(peak_frequency(&psd), 10.0);
        assert!((normalize_frequency(10.0) - 9.5 / 49.5).abs() < 1e-12);
    }

    #[test]
    fn test_silent_psd_fallbacks() {
        let psd = flat_psd(0.0);
        assert_eq!(spectral_edge_frequency(&psd), 25.25);
        assert_eq!(normalize_frequency(spectral_edge_frequency(&psd)), 0.5);
        assert_eq!(peak_frequency(&psd), 0.5);
        assert_eq!(normalize_frequency(peak_frequency(&psd)), 0.0);
    }

    #[test]
    fn test_normalize_frequency_clamps() {
        assert_eq!(normalize_frequency(0.0), 0.0);
        assert_eq!(normalize_frequency(64.0), 1.0);
    }
}
