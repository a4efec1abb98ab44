// Error types for the EEG emotion core
//
// Two families of errors exist: signal validation errors raised before a
// buffer enters the pipeline, and model artifact errors raised while loading
// or scoring trained classifiers. Numeric degeneracies inside the pipeline
// are never errors; they are absorbed with explicit fallbacks.

mod model;
mod signal;

pub use model::{log_model_error, ModelError, ModelErrorCodes};
pub use signal::{log_signal_error, SignalError, SignalErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, so callers (CLI, HTTP wrappers) can map
/// failures without matching on every variant.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
