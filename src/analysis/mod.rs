// Analysis module - EEG emotion recognition pipeline
//
// This module orchestrates one analysis request end to end. Every stage is a
// pure function of its input except the classifier, which only reads the
// shared, immutable model registry.
//
// Architecture:
// - EegSignal: validated multichannel input
// - Pipeline: Preprocessor → FeatureExtractor → EmotionClassifier
// - Output: AnalysisReport (classification + display band powers + ratios)

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod features;
pub mod preprocess;
pub mod signal;

use crate::config::PipelineConfig;
use crate::error::SignalError;
use crate::models::ModelRegistry;
use classifier::{ClassificationResult, EmotionClassifier, Strategy};
use features::{relative_band_powers, BandPowers, FeatureExtractor, FeatureVector, NeuroRatios};
use preprocess::Preprocessor;
use signal::EegSignal;

/// Everything one request produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub classification: ClassificationResult,
    /// Absolute band powers of the channel-mean signal
    pub band_powers: BTreeMap<String, f64>,
    /// Relative band powers of the channel-mean signal
    pub relative_band_powers: BTreeMap<String, f64>,
    pub ratios: NeuroRatios,
    pub features: FeatureVector,
    pub samples_analyzed: usize,
    pub channels_analyzed: usize,
    pub sampling_rate: f64,
    /// Wall-clock time spent in `analyze`
    pub processing_time_ms: f64,
}

/// AnalysisPipeline runs preprocessing, feature extraction and classification
///
/// Holds no per-request state; share one instance across worker threads.
pub struct AnalysisPipeline {
    config: PipelineConfig,
    extractor: FeatureExtractor,
    classifier: EmotionClassifier,
}

impl AnalysisPipeline {
    /// Create a pipeline around an already-loaded model registry
    pub fn new(config: PipelineConfig, registry: Arc<ModelRegistry>) -> Self {
        let extractor = FeatureExtractor::new(&config.spectral);
        Self {
            config,
            extractor,
            classifier: EmotionClassifier::new(registry),
        }
    }

    /// Create a pipeline that loads models from `config.models.models_dir`
    ///
    /// Without a models directory every request uses the heuristic classifier.
    pub fn from_config(config: PipelineConfig) -> Self {
        let registry = match &config.models.models_dir {
            Some(dir) => ModelRegistry::load_from_dir(dir),
            None => ModelRegistry::empty(),
        };
        Self::new(config, Arc::new(registry))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &EmotionClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Analyze one signal
    ///
    /// # Errors
    /// `SignalError::InsufficientSamples` when the signal is shorter than
    /// `min_samples`. Nothing past that check can fail.
    pub fn analyze(
        &self,
        signal: &EegSignal,
        strategy: Strategy,
    ) -> Result<AnalysisReport, SignalError> {
        self.run(signal, |features, relative| {
            self.classifier.predict(features, relative, strategy)
        })
    }

    /// Analyze one signal for a strategy identifier as the caller sent it
    ///
    /// `None` uses the configured default. The identifier is echoed in
    /// `classification.model_used`.
    pub fn analyze_requested(
        &self,
        signal: &EegSignal,
        requested: Option<&str>,
    ) -> Result<AnalysisReport, SignalError> {
        let requested = requested.unwrap_or(&self.config.default_strategy);
        self.run(signal, |features, relative| {
            self.classifier.predict_named(features, relative, requested)
        })
    }

    fn run<F>(&self, signal: &EegSignal, classify: F) -> Result<AnalysisReport, SignalError>
    where
        F: FnOnce(&FeatureVector, &BandPowers) -> ClassificationResult,
    {
        let started = Instant::now();
        signal.require_min_len(self.config.min_samples)?;

        let preprocessor = Preprocessor::new(self.config.preprocess.clone(), signal.sampling_rate());
        let cleaned = preprocessor.clean(signal);

        let features = self.extractor.extract(&cleaned);

        let mean = cleaned.channel_mean();
        let absolute = self.extractor.band_powers(&mean, cleaned.sampling_rate());
        let relative = relative_band_powers(&absolute);

        let classification = classify(&features, &relative);

        let report = AnalysisReport {
            classification,
            band_powers: absolute.to_map(),
            relative_band_powers: relative.to_map(),
            ratios: NeuroRatios::from_powers(&relative),
            features,
            samples_analyzed: cleaned.len(),
            channels_analyzed: cleaned.n_channels(),
            sampling_rate: cleaned.sampling_rate(),
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        };

        tracing::debug!(
            "Analyzed {} x {} samples: {} ({:.3}) in {:.1} ms",
            report.channels_analyzed,
            report.samples_analyzed,
            report.classification.emotion,
            report.classification.confidence,
            report.processing_time_ms
        );

        Ok(report)
    }
}
