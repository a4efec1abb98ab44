// EegSignal - validated multichannel sample buffer
//
// Channel order is meaningful: the first half of the channels is treated as
// the left hemisphere and the second half as the right hemisphere when the
// asymmetry feature is computed.

use crate::error::SignalError;

/// A finite multichannel EEG recording with a common sampling rate
///
/// Invariants (checked by the constructors):
/// - at least one channel, every channel non-empty and of equal length
/// - sampling rate is finite and > 0
/// - every sample is finite
#[derive(Debug, Clone, PartialEq)]
pub struct EegSignal {
    channels: Vec<Vec<f64>>,
    sampling_rate: f64,
}

impl EegSignal {
    /// Build a signal from per-channel sample vectors
    pub fn new(channels: Vec<Vec<f64>>, sampling_rate: f64) -> Result<Self, SignalError> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(SignalError::InvalidSamplingRate {
                rate: sampling_rate,
            });
        }

        let expected = match channels.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(SignalError::Empty),
        };

        for (channel, samples) in channels.iter().enumerate() {
            if samples.len() != expected {
                return Err(SignalError::ChannelLengthMismatch {
                    channel,
                    expected,
                    actual: samples.len(),
                });
            }
            if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
                return Err(SignalError::NonFiniteSample { channel, index });
            }
        }

        Ok(Self {
            channels,
            sampling_rate,
        })
    }

    /// Build a single-channel signal
    pub fn single(samples: Vec<f64>, sampling_rate: f64) -> Result<Self, SignalError> {
        Self::new(vec![samples], sampling_rate)
    }

    /// Build a signal from a flat, row-major `samples x channels` buffer
    ///
    /// This is the layout of CSV exports and of JSON requests that carry a
    /// flat `signal` array plus a `channels` count. Trailing values that do
    /// not fill a complete row are dropped.
    pub fn from_interleaved(
        samples: &[f64],
        n_channels: usize,
        sampling_rate: f64,
    ) -> Result<Self, SignalError> {
        if n_channels == 0 || samples.len() < n_channels {
            return Err(SignalError::Empty);
        }

        let rows = samples.len() / n_channels;
        if rows * n_channels != samples.len() {
            tracing::warn!(
                "Interleaved buffer of {} values is not a multiple of {} channels; dropping {} trailing values",
                samples.len(),
                n_channels,
                samples.len() - rows * n_channels
            );
        }

        let channels = (0..n_channels)
            .map(|ch| (0..rows).map(|row| samples[row * n_channels + ch]).collect())
            .collect();

        Self::new(channels, sampling_rate)
    }

    /// Reject signals shorter than `min_samples` per channel
    pub fn require_min_len(&self, min_samples: usize) -> Result<(), SignalError> {
        if self.len() < min_samples {
            return Err(SignalError::InsufficientSamples {
                required: min_samples,
                actual: self.len(),
            });
        }
        Ok(())
    }

    /// Same sampling rate, replacement channel data of identical shape
    pub(crate) fn with_channels(&self, channels: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(channels.len(), self.channels.len());
        debug_assert!(channels.iter().all(|ch| ch.len() == self.len()));
        Self {
            channels,
            sampling_rate: self.sampling_rate,
        }
    }

    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Always false for a constructed signal; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element-wise average across channels
    pub fn channel_mean(&self) -> Vec<f64> {
        let n = self.n_channels() as f64;
        (0..self.len())
            .map(|i| self.channels.iter().map(|ch| ch[i]).sum::<f64>() / n)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_bad_rate() {
        assert_eq!(EegSignal::new(vec![], 128.0), Err(SignalError::Empty));
        assert_eq!(EegSignal::single(vec![], 128.0), Err(SignalError::Empty));
        assert_eq!(
            EegSignal::single(vec![1.0; 8], 0.0),
            Err(SignalError::InvalidSamplingRate { rate: 0.0 })
        );
        assert!(EegSignal::single(vec![1.0; 8], f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_ragged_channels() {
        let err = EegSignal::new(vec![vec![0.0; 10], vec![0.0; 9]], 128.0).unwrap_err();
        assert_eq!(
            err,
            SignalError::ChannelLengthMismatch {
                channel: 1,
                expected: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn test_rejects_non_finite_samples() {
        let err = EegSignal::single(vec![0.0, 1.0, f64::INFINITY], 128.0).unwrap_err();
        assert_eq!(
            err,
            SignalError::NonFiniteSample {
                channel: 0,
                index: 2
            }
        );
    }

    #[test]
    fn test_from_interleaved_deinterleaves_rows() {
        let flat = [1.0, 10.0, 2.0, 20.0, 3.0, 30.0];
        let signal = EegSignal::from_interleaved(&flat, 2, 128.0).unwrap();

        assert_eq!(signal.n_channels(), 2);
        assert_eq!(signal.channels()[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(signal.channels()[1], vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_min_len_and_channel_mean() {
        let signal = EegSignal::new(vec![vec![1.0, 3.0], vec![3.0, 5.0]], 128.0).unwrap();
        assert_eq!(signal.channel_mean(), vec![2.0, 4.0]);
        assert!(signal.require_min_len(2).is_ok());
        assert_eq!(
            signal.require_min_len(64),
            Err(SignalError::InsufficientSamples {
                required: 64,
                actual: 2
            })
        );
    }
}
