// EmoHarmony Core - EEG emotion recognition engine
// Signal cleaning, Welch spectral features and emotion classification

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod models;

// Re-exports for convenience
pub use analysis::classifier::{ClassificationResult, Emotion, EmotionClassifier, Strategy};
pub use analysis::features::{FeatureExtractor, FeatureVector};
pub use analysis::preprocess::Preprocessor;
pub use analysis::signal::EegSignal;
pub use analysis::{AnalysisPipeline, AnalysisReport};
pub use config::PipelineConfig;
pub use error::{ErrorCode, ModelError, SignalError};
pub use models::{ModelKind, ModelRegistry};
