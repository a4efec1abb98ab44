// Ensemble member weights
//
// The ensemble blends the SVM, gradient-boosted and leaf-wise boosted
// members. Weights are read from `ensemble_weights.json` when present and
// default to 0.30 / 0.35 / 0.35 otherwise.

use serde::{Deserialize, Serialize};

use super::ModelKind;

/// Non-negative blend weight per ensemble member
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub svm: f64,
    pub xgb: f64,
    pub lgbm: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            svm: 0.30,
            xgb: 0.35,
            lgbm: 0.35,
        }
    }
}

impl EnsembleWeights {
    /// Members in blend order
    pub const MEMBERS: [ModelKind; 3] = [
        ModelKind::Svm,
        ModelKind::GradientBoosting,
        ModelKind::LeafwiseBoosting,
    ];

    /// Weight assigned to a member; non-members weigh 0.0
    pub fn weight(&self, kind: ModelKind) -> f64 {
        match kind {
            ModelKind::Svm => self.svm,
            ModelKind::GradientBoosting => self.xgb,
            ModelKind::LeafwiseBoosting => self.lgbm,
            ModelKind::RandomForest => 0.0,
        }
    }

    /// Clamp negative or non-finite weights to 0.0
    ///
    /// If nothing positive remains, the defaults are restored.
    pub fn sanitized(self) -> Self {
        let fix = |name: &str, w: f64| {
            if w.is_finite() && w >= 0.0 {
                w
            } else {
                tracing::warn!("Ensemble weight for {} is invalid ({}), using 0.0", name, w);
                0.0
            }
        };

        let weights = Self {
            svm: fix("svm", self.svm),
            xgb: fix("xgb", self.xgb),
            lgbm: fix("lgbm", self.lgbm),
        };

        if weights.svm + weights.xgb + weights.lgbm <= 0.0 {
            tracing::warn!("All ensemble weights are zero, using defaults");
            return Self::default();
        }
        weights
    }
}
