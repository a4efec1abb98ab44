// Welch module - averaged-periodogram power spectral density
//
// The signal is split into 50%-overlapping segments; each segment is
// mean-removed, Hann-windowed and transformed, and the one-sided periodograms
// are averaged. Averaging trades frequency resolution for variance, which is
// what short, noisy EEG epochs need.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::config::SpectralConfig;

/// One-sided power spectral density (density scaling, units^2/Hz)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Psd {
    pub frequencies: Vec<f64>,
    pub density: Vec<f64>,
}

impl Psd {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequency resolution in Hz (0 for fewer than two bins)
    pub fn resolution(&self) -> f64 {
        if self.frequencies.len() < 2 {
            0.0
        } else {
            self.frequencies[1] - self.frequencies[0]
        }
    }
}

/// Welch PSD estimator
pub struct WelchEstimator {
    segment_seconds: f64,
    min_segment_len: usize,
}

impl WelchEstimator {
    /// Create an estimator
    ///
    /// # Arguments
    /// * `config` - Segment duration and floor on segment length
    pub fn new(config: &SpectralConfig) -> Self {
        Self {
            segment_seconds: config.segment_seconds,
            min_segment_len: config.min_segment_len.max(1),
        }
    }

    /// Segment length used for a signal of `n_samples`
    ///
    /// `min(segment_seconds x fs, n)`, floored at `min_segment_len`, and never
    /// longer than the signal itself.
    pub fn segment_len(&self, n_samples: usize, sampling_rate: f64) -> usize {
        let by_duration = (self.segment_seconds * sampling_rate) as usize;
        by_duration
            .min(n_samples)
            .max(self.min_segment_len)
            .min(n_samples)
    }

    /// Estimate the PSD of a 1-D signal
    ///
    /// # Arguments
    /// * `samples` - Time-domain signal
    /// * `sampling_rate` - Sampling rate in Hz
    ///
    /// # Returns
    /// Frequencies `k * fs / nperseg` for `k = 0..=nperseg/2` and the averaged
    /// density at each frequency. Empty for an empty signal.
    pub fn estimate(&self, samples: &[f64], sampling_rate: f64) -> Psd {
        let n = samples.len();
        if n == 0 {
            return Psd::default();
        }

        let nperseg = self.segment_len(n, sampling_rate);
        let noverlap = nperseg / 2;
        let step = nperseg - noverlap;
        let n_bins = nperseg / 2 + 1;

        let window = hann_window(nperseg);
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let scale = 1.0 / (sampling_rate * window_power);

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(nperseg);

        let mut accumulated = vec![0.0; n_bins];
        let mut n_segments = 0usize;
        let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(nperseg);

        for start in (0..=n - nperseg).step_by(step) {
            let segment = &samples[start..start + nperseg];
            let mean = segment.iter().sum::<f64>() / nperseg as f64;

            buffer.clear();
            buffer.extend(
                segment
                    .iter()
                    .zip(&window)
                    .map(|(&x, &w)| Complex::new((x - mean) * w, 0.0)),
            );
            fft.process(&mut buffer);

            for (acc, bin) in accumulated.iter_mut().zip(&buffer[..n_bins]) {
                *acc += bin.norm_sqr();
            }
            n_segments += 1;
        }

        // One-sided spectrum: fold negative frequencies onto positive ones,
        // except DC and (for even lengths) the Nyquist bin.
        let last_doubled = if nperseg % 2 == 0 {
            n_bins - 1
        } else {
            n_bins
        };
        let density = accumulated
            .iter()
            .enumerate()
            .map(|(k, &power)| {
                let fold = if k > 0 && k < last_doubled { 2.0 } else { 1.0 };
                fold * power * scale / n_segments as f64
            })
            .collect();

        let frequencies = (0..n_bins)
            .map(|k| k as f64 * sampling_rate / nperseg as f64)
            .collect();

        Psd {
            frequencies,
            density,
        }
    }
}

/// Periodic Hann window (the spectral-analysis variant)
fn hann_window(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * std::f64::consts::PI * i as f64) / n as f64).cos())
        .collect()
}
