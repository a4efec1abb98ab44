// Signal validation error types and constants

use crate::error::ErrorCode;
use thiserror::Error;

/// Signal error code constants
///
/// Error code range: 1001-1005
pub struct SignalErrorCodes {}

impl SignalErrorCodes {
    /// Signal buffer contains no channels or no samples
    pub const EMPTY: i32 = 1001;

    /// Sampling rate is zero, negative or not finite
    pub const INVALID_SAMPLING_RATE: i32 = 1002;

    /// Channels of one recording have different lengths
    pub const CHANNEL_LENGTH_MISMATCH: i32 = 1003;

    /// Signal is shorter than the minimum usable length
    pub const INSUFFICIENT_SAMPLES: i32 = 1004;

    /// A sample is NaN or infinite
    pub const NON_FINITE_SAMPLE: i32 = 1005;
}

/// Log a signal error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_signal_error(err: &SignalError, context: &str) {
    tracing::error!(
        "Signal error in {}: code={}, component=EegSignal, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while validating a raw EEG buffer
///
/// These are caller-side checks: once an `EegSignal` exists, every stage of
/// the pipeline accepts it without failing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    /// No channels, or channels without samples
    #[error("signal contains no samples")]
    Empty,

    /// Sampling rate must be a positive finite number of Hz
    #[error("sampling rate must be greater than zero (got {rate})")]
    InvalidSamplingRate { rate: f64 },

    /// All channels of one recording must have equal length
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    /// Too few samples for a meaningful spectral estimate
    #[error("signal too short: need at least {required} samples, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// Samples must be finite
    #[error("non-finite sample at channel {channel}, index {index}")]
    NonFiniteSample { channel: usize, index: usize },
}

impl ErrorCode for SignalError {
    fn code(&self) -> i32 {
        match self {
            SignalError::Empty => SignalErrorCodes::EMPTY,
            SignalError::InvalidSamplingRate { .. } => SignalErrorCodes::INVALID_SAMPLING_RATE,
            SignalError::ChannelLengthMismatch { .. } => {
                SignalErrorCodes::CHANNEL_LENGTH_MISMATCH
            }
            SignalError::InsufficientSamples { .. } => SignalErrorCodes::INSUFFICIENT_SAMPLES,
            SignalError::NonFiniteSample { .. } => SignalErrorCodes::NON_FINITE_SAMPLE,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
