// Classifier - emotion classification dispatcher
//
// This module routes a 17-d feature vector through one of the scoring
// strategies and produces a labeled probability distribution:
//
// Single model: one trained artifact (SVM, forest, XGB or LGBM)
// Ensemble: weighted soft vote of the SVM, XGB and LGBM members; a member
//           without a model votes with the heuristic scores
// Heuristic: closed-form band-power scores, used whenever the requested
//            artifact is missing or fails to score
//
// Each strategy owns an affine confidence calibration (scale, shift). The
// heuristic path reuses the calibration of the strategy it stands in for, so
// confidence means the same thing whether or not a model is loaded.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::features::{BandPowers, FeatureVector};
use crate::error::{log_model_error, ModelError};
use crate::models::{ClassifierArtifact, EnsembleWeights, ModelKind, ModelRegistry};

/// Upper bound on any reported confidence
pub const MAX_CONFIDENCE: f64 = 0.98;

/// Added to the band sum when renormalizing heuristic inputs
const HEURISTIC_EPSILON: f64 = 1e-6;

/// Emotion labels known to the heuristic and the interpretation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Calm,
    Stress,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Calm,
        Emotion::Stress,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Calm => "Calm",
            Emotion::Stress => "Stress",
        }
    }

    /// Exact (case-sensitive) label lookup
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }

    pub const fn interpretation(self) -> &'static str {
        match self {
            Emotion::Happy => "EEG patterns indicate elevated alpha wave activity with balanced beta power, characteristic of positive emotional arousal and heightened energy.",
            Emotion::Calm => "Dominant alpha waves with suppressed beta activity suggest a relaxed, alert state. Theta presence indicates meditative calmness.",
            Emotion::Stress => "Significantly elevated beta and low-gamma activity with suppressed alpha waves, consistent with acute psychological stress response.",
            Emotion::Angry => "High beta-to-alpha ratio and elevated gamma power suggest emotional arousal and heightened cognitive processing associated with anger.",
            Emotion::Sad => "Elevated theta waves and reduced alpha/beta power are consistent with a low-arousal, negative valence emotional state.",
        }
    }

    /// Closed-form score from renormalized band powers
    fn heuristic_score(self, b: &BandPowers) -> f64 {
        match self {
            Emotion::Happy => 0.5 * b.alpha + 0.3 * b.beta + 0.2 * (1.0 - b.theta),
            Emotion::Calm => 0.6 * b.alpha + 0.2 * b.theta + 0.2 * (1.0 - b.beta),
            Emotion::Stress => 0.4 * b.beta + 0.4 * b.gamma + 0.2 * (1.0 - b.alpha),
            Emotion::Angry => 0.5 * b.beta + 0.3 * b.gamma + 0.2 * (1.0 - b.alpha),
            Emotion::Sad => 0.5 * b.theta + 0.3 * b.delta + 0.2 * (1.0 - b.beta),
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interpretation text for any label; empty for labels outside the known set
pub fn interpretation_for(label: &str) -> &'static str {
    Emotion::from_label(label)
        .map(Emotion::interpretation)
        .unwrap_or("")
}

/// Affine confidence calibration `scale * raw + shift`, capped at 0.98
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub scale: f64,
    pub shift: f64,
}

impl Calibration {
    pub fn apply(&self, raw: f64) -> f64 {
        (self.scale * raw + self.shift).clamp(0.0, MAX_CONFIDENCE)
    }
}

/// Scoring strategy selected by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Single(ModelKind),
    Ensemble,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Single(ModelKind::Svm)
    }
}

impl Strategy {
    /// Resolve a case-insensitive identifier
    ///
    /// Unknown identifiers resolve to the SVM strategy. The legacy "CNN" and
    /// "LSTM" names are served by the forest model.
    pub fn parse(id: &str) -> Self {
        match id.trim().to_ascii_uppercase().as_str() {
            "SVM" => Strategy::Single(ModelKind::Svm),
            "RF" | "FOREST" | "RANDOMFOREST" | "RANDOM_FOREST" | "CNN" | "LSTM" => {
                Strategy::Single(ModelKind::RandomForest)
            }
            "XGB" | "XGBOOST" => Strategy::Single(ModelKind::GradientBoosting),
            "LGBM" | "LIGHTGBM" => Strategy::Single(ModelKind::LeafwiseBoosting),
            "AUTO" | "ENSEMBLE" => Strategy::Ensemble,
            other => {
                tracing::warn!("Unknown strategy {:?}, using SVM", other);
                Strategy::default()
            }
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            Strategy::Single(kind) => kind.id(),
            Strategy::Ensemble => "ENSEMBLE",
        }
    }

    pub const fn calibration(self) -> Calibration {
        let (scale, shift) = match self {
            Strategy::Single(ModelKind::Svm) => (0.85, 0.10),
            Strategy::Single(ModelKind::RandomForest) => (0.88, 0.08),
            Strategy::Single(ModelKind::GradientBoosting) => (0.90, 0.07),
            Strategy::Single(ModelKind::LeafwiseBoosting) => (0.91, 0.06),
            Strategy::Ensemble => (0.94, 0.03),
        };
        Calibration { scale, shift }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which path produced the scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Model,
    Ensemble,
    Heuristic,
}

/// Output of one classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Winning label
    pub emotion: String,
    pub confidence: f64,
    /// Probability per label, summing to 1
    pub scores: BTreeMap<String, f64>,
    pub interpretation: String,
    /// Identifier of the strategy that produced the result
    pub strategy: String,
    /// Strategy name as requested (aliases and unknown names kept verbatim)
    pub model_used: String,
    pub source: ScoreSource,
}

/// EmotionClassifier dispatches feature vectors to the loaded artifacts
///
/// Holds the registry by shared ownership; cloning is cheap and instances can
/// be used from any number of threads.
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    registry: Arc<ModelRegistry>,
}

impl EmotionClassifier {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Classifier with no artifacts; every request uses the heuristic
    pub fn heuristic_only() -> Self {
        Self::new(Arc::new(ModelRegistry::empty()))
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Classify one feature vector
    ///
    /// # Arguments
    /// * `features` - 17-d feature vector (already sanitized)
    /// * `relative` - relative band powers used by the heuristic fallback
    /// * `strategy` - requested scoring strategy
    ///
    /// Never fails: missing or failing artifacts fall back to the heuristic.
    pub fn predict(
        &self,
        features: &FeatureVector,
        relative: &BandPowers,
        strategy: Strategy,
    ) -> ClassificationResult {
        self.predict_as(features, relative, strategy, strategy.id())
    }

    /// Resolve a strategy identifier and classify, reporting the identifier
    /// as given in `model_used`
    pub fn predict_named(
        &self,
        features: &FeatureVector,
        relative: &BandPowers,
        requested: &str,
    ) -> ClassificationResult {
        let strategy = Strategy::parse(requested);
        let name = requested.trim();
        let name = if name.is_empty() { strategy.id() } else { name };
        self.predict_as(features, relative, strategy, name)
    }

    fn predict_as(
        &self,
        features: &FeatureVector,
        relative: &BandPowers,
        strategy: Strategy,
        model_used: &str,
    ) -> ClassificationResult {
        let calibration = strategy.calibration();

        let scored = match strategy {
            Strategy::Single(kind) => self
                .score_single(kind, features)
                .map(|scores| (scores, ScoreSource::Model)),
            Strategy::Ensemble => self
                .score_ensemble(features, relative)
                .map(|scores| (scores, ScoreSource::Ensemble)),
        };

        // A missing artifact is an expected deployment state
        let (scores, source) = scored.unwrap_or_else(|| {
            tracing::debug!("No trained model for {}, using heuristic scores", strategy);
            (heuristic_scores(relative), ScoreSource::Heuristic)
        });

        let mut result = finish(scores, calibration, strategy, source);
        result.model_used = model_used.to_string();
        result
    }

    /// Scores from one artifact, or None if it is absent or fails
    fn score_single(&self, kind: ModelKind, features: &FeatureVector) -> Option<BTreeMap<String, f64>> {
        let artifact = self.registry.get(kind)?;
        match score_artifact(artifact, features) {
            Ok(scores) => Some(scores),
            Err(err) => {
                log_model_error(&err, kind.id());
                None
            }
        }
    }

    /// Weighted soft vote over all three ensemble members
    ///
    /// A member without a usable model contributes the heuristic distribution
    /// at its own weight. None when no member model scored at all.
    fn score_ensemble(
        &self,
        features: &FeatureVector,
        relative: &BandPowers,
    ) -> Option<BTreeMap<String, f64>> {
        let weights: &EnsembleWeights = self.registry.weights();
        let mut blended: BTreeMap<String, f64> = BTreeMap::new();
        let mut scored_by_model = 0;

        for kind in EnsembleWeights::MEMBERS {
            let scores = match self.score_single(kind, features) {
                Some(scores) => {
                    scored_by_model += 1;
                    scores
                }
                None => heuristic_scores(relative),
            };
            let weight = weights.weight(kind);
            for (label, p) in scores {
                *blended.entry(label).or_insert(0.0) += weight * p;
            }
        }

        if scored_by_model == 0 {
            return None;
        }

        let normalized = normalize(blended);
        if normalized.is_none() {
            tracing::warn!("Ensemble members carry zero total weight");
        }
        normalized
    }
}

/// Run an artifact and turn its output into a normalized label map
fn score_artifact(
    artifact: &ClassifierArtifact,
    features: &FeatureVector,
) -> Result<BTreeMap<String, f64>, ModelError> {
    let mut scores: BTreeMap<String, f64> = BTreeMap::new();
    for (label, p) in artifact.score(features.as_slice())? {
        let p = if p.is_finite() && p > 0.0 { p } else { 0.0 };
        *scores.entry(label).or_insert(0.0) += p;
    }
    normalize(scores).ok_or_else(|| ModelError::InvalidArtifact {
        reason: "model returned no probability mass".to_string(),
    })
}

/// Divide by the total; None when there is nothing to normalize
fn normalize(mut scores: BTreeMap<String, f64>) -> Option<BTreeMap<String, f64>> {
    let total: f64 = scores.values().sum();
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    scores.values_mut().for_each(|v| *v /= total);
    Some(scores)
}

/// Heuristic label distribution from relative band powers
///
/// Bands are renormalized by their sum before scoring, so the input does not
/// need to sum to exactly 1. The result always sums to 1.
pub fn heuristic_scores(relative: &BandPowers) -> BTreeMap<String, f64> {
    let clean = relative.to_array().map(|p| if p.is_finite() && p > 0.0 { p } else { 0.0 });
    let band_sum: f64 = clean.iter().sum::<f64>() + HEURISTIC_EPSILON;
    let bands = BandPowers::from_array(clean.map(|p| p / band_sum));

    let raw: Vec<(Emotion, f64)> = Emotion::ALL
        .iter()
        .map(|&e| (e, e.heuristic_score(&bands)))
        .collect();

    // Each score carries a 0.2 * (1 - band) term with band < 1, so the total is positive
    let total: f64 = raw.iter().map(|(_, s)| s).sum();
    raw.into_iter()
        .map(|(e, s)| (e.label().to_string(), s / total))
        .collect()
}

/// Pick the arg-max label and apply the calibration
///
/// Ties resolve to the alphabetically first label.
fn finish(
    scores: BTreeMap<String, f64>,
    calibration: Calibration,
    strategy: Strategy,
    source: ScoreSource,
) -> ClassificationResult {
    let mut best: Option<(&str, f64)> = None;
    for (label, &p) in &scores {
        match best {
            Some((_, top)) if p <= top => {}
            _ => best = Some((label.as_str(), p)),
        }
    }
    let (emotion, raw) = best.map(|(l, p)| (l.to_string(), p)).unwrap_or_default();

    ClassificationResult {
        interpretation: interpretation_for(&emotion).to_string(),
        confidence: calibration.apply(raw),
        emotion,
        scores,
        strategy: strategy.id().to_string(),
        model_used: strategy.id().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
