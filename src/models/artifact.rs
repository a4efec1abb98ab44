//! Classifier artifact contract.
//!
//! A trained artifact always presents the same face to the dispatcher: a
//! feature vector in, `(label, probability)` pairs out. Internally an artifact
//! is one of three bundles, applied in a fixed order:
//! scale -> infer -> decode labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A trained scoring function producing one probability per class
pub trait ProbabilisticModel: Send + Sync + fmt::Debug {
    /// Labels matching the positions of `predict_proba` output
    fn classes(&self) -> &[String];

    /// Probability for each class, in `classes()` order
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Multinomial linear model: `softmax(W x + b)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub classes: Vec<String>,
    /// One row of coefficients per class
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearModel {
    pub fn new(
        classes: Vec<String>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            classes,
            coefficients,
            intercepts,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check shape consistency (used after deserialization)
    pub fn validate(&self) -> Result<(), ModelError> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(ModelError::InvalidArtifact {
                reason: "model has no classes".to_string(),
            });
        }
        if self.coefficients.len() != n_classes || self.intercepts.len() != n_classes {
            return Err(ModelError::InvalidArtifact {
                reason: format!(
                    "{} classes but {} coefficient rows and {} intercepts",
                    n_classes,
                    self.coefficients.len(),
                    self.intercepts.len()
                ),
            });
        }
        let n_features = self.n_features();
        if n_features == 0 || self.coefficients.iter().any(|row| row.len() != n_features) {
            return Err(ModelError::InvalidArtifact {
                reason: "coefficient rows must be non-empty and of equal length".to_string(),
            });
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.first().map(Vec::len).unwrap_or(0)
    }
}

impl ProbabilisticModel for LinearModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features(),
                actual: features.len(),
            });
        }

        let logits: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();

        Ok(softmax(&logits))
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}

/// Per-feature standardization `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.mean.is_empty() || self.mean.len() != self.scale.len() {
            return Err(ModelError::InvalidArtifact {
                reason: format!(
                    "scaler has {} means and {} scales",
                    self.mean.len(),
                    self.scale.len()
                ),
            });
        }
        Ok(())
    }

    /// Standardize a feature vector; zero scales act as 1.0
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.mean.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.mean.len(),
                actual: features.len(),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect())
    }
}

/// Maps encoded class indices back to labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCodec {
    pub classes: Vec<String>,
}

impl LabelCodec {
    pub fn decode(&self, index: usize) -> Result<&str, ModelError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(ModelError::UnknownLabelIndex { index })
    }
}

/// A loaded classifier bundle
///
/// The variants cover the bundle shapes training produces: a bare model, a
/// model behind a feature scaler, and a scaled model whose outputs are
/// encoded class indices.
#[derive(Debug)]
pub enum ClassifierArtifact {
    Plain {
        model: Box<dyn ProbabilisticModel>,
    },
    Scaled {
        model: Box<dyn ProbabilisticModel>,
        scaler: StandardScaler,
    },
    ScaledEncoded {
        model: Box<dyn ProbabilisticModel>,
        scaler: StandardScaler,
        codec: LabelCodec,
    },
}

impl ClassifierArtifact {
    pub fn plain(model: impl ProbabilisticModel + 'static) -> Self {
        ClassifierArtifact::Plain {
            model: Box::new(model),
        }
    }

    pub fn scaled(model: impl ProbabilisticModel + 'static, scaler: StandardScaler) -> Self {
        ClassifierArtifact::Scaled {
            model: Box::new(model),
            scaler,
        }
    }

    pub fn scaled_encoded(
        model: impl ProbabilisticModel + 'static,
        scaler: StandardScaler,
        codec: LabelCodec,
    ) -> Self {
        ClassifierArtifact::ScaledEncoded {
            model: Box::new(model),
            scaler,
            codec,
        }
    }

    /// Score a feature vector: scale -> infer -> decode
    ///
    /// # Returns
    /// `(label, probability)` pairs in the model's class order
    pub fn score(&self, features: &[f64]) -> Result<Vec<(String, f64)>, ModelError> {
        match self {
            ClassifierArtifact::Plain { model } => {
                let proba = model.predict_proba(features)?;
                label_model_output(model.classes(), proba)
            }
            ClassifierArtifact::Scaled { model, scaler } => {
                let scaled = scaler.transform(features)?;
                let proba = model.predict_proba(&scaled)?;
                label_model_output(model.classes(), proba)
            }
            ClassifierArtifact::ScaledEncoded {
                model,
                scaler,
                codec,
            } => {
                let scaled = scaler.transform(features)?;
                let proba = model.predict_proba(&scaled)?;
                proba
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| Ok((codec.decode(i)?.to_string(), p)))
                    .collect()
            }
        }
    }
}

fn label_model_output(classes: &[String], proba: Vec<f64>) -> Result<Vec<(String, f64)>, ModelError> {
    if classes.len() != proba.len() {
        return Err(ModelError::InvalidArtifact {
            reason: format!(
                "model returned {} probabilities for {} classes",
                proba.len(),
                classes.len()
            ),
        });
    }
    Ok(classes.iter().cloned().zip(proba).collect())
}

/// On-disk JSON form of an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactFile {
    Plain {
        model: LinearModel,
    },
    Scaled {
        model: LinearModel,
        scaler: StandardScaler,
    },
    ScaledEncoded {
        model: LinearModel,
        scaler: StandardScaler,
        label_codec: LabelCodec,
    },
}

impl ArtifactFile {
    /// Validate shapes and build the runtime artifact
    pub fn into_artifact(self) -> Result<ClassifierArtifact, ModelError> {
        match self {
            ArtifactFile::Plain { model } => {
                model.validate()?;
                Ok(ClassifierArtifact::plain(model))
            }
            ArtifactFile::Scaled { model, scaler } => {
                model.validate()?;
                scaler.validate()?;
                check_scaler_fits(&model, &scaler)?;
                Ok(ClassifierArtifact::scaled(model, scaler))
            }
            ArtifactFile::ScaledEncoded {
                model,
                scaler,
                label_codec,
            } => {
                model.validate()?;
                scaler.validate()?;
                check_scaler_fits(&model, &scaler)?;
                if label_codec.classes.len() != model.classes.len() {
                    return Err(ModelError::InvalidArtifact {
                        reason: format!(
                            "label codec has {} labels for {} model outputs",
                            label_codec.classes.len(),
                            model.classes.len()
                        ),
                    });
                }
                Ok(ClassifierArtifact::scaled_encoded(model, scaler, label_codec))
            }
        }
    }
}

fn check_scaler_fits(model: &LinearModel, scaler: &StandardScaler) -> Result<(), ModelError> {
    if scaler.mean.len() != model.n_features() {
        return Err(ModelError::DimensionMismatch {
            expected: model.n_features(),
            actual: scaler.mean.len(),
        });
    }
    Ok(())
}
