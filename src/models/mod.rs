//! Trained classifier artifacts and the registry that owns them.
//!
//! Artifacts are produced by an offline training job and are only consumed
//! here: each one maps a feature vector to a probability per label. The
//! registry is built once at startup, never mutated afterwards, and shared by
//! reference between concurrent requests.

pub mod artifact;
pub mod registry;
pub mod weights;

pub use artifact::{
    ArtifactFile, ClassifierArtifact, LabelCodec, LinearModel, ProbabilisticModel, StandardScaler,
};
pub use registry::{shared, ModelRegistry, ModelStatus};
pub use weights::EnsembleWeights;

use serde::{Deserialize, Serialize};

/// Families of trained single-model classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// RBF support vector machine
    Svm,
    /// Random forest
    RandomForest,
    /// Gradient-boosted trees (XGBoost)
    GradientBoosting,
    /// Leaf-wise gradient boosting (LightGBM)
    LeafwiseBoosting,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Svm,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
        ModelKind::LeafwiseBoosting,
    ];

    /// Short identifier used in requests and reports
    pub const fn id(self) -> &'static str {
        match self {
            ModelKind::Svm => "SVM",
            ModelKind::RandomForest => "RF",
            ModelKind::GradientBoosting => "XGB",
            ModelKind::LeafwiseBoosting => "LGBM",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ModelKind::Svm => "Support Vector Machine",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::GradientBoosting => "XGBoost",
            ModelKind::LeafwiseBoosting => "LightGBM",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            ModelKind::Svm => "RBF kernel SVM on the 17-d EEG feature vector. Fast and reliable for small datasets.",
            ModelKind::RandomForest => "Random forest with axis-aligned splits; decision boundaries differ from the SVM hyperplanes.",
            ModelKind::GradientBoosting => "Gradient-boosted trees applied to standardized features with an explicit label codec.",
            ModelKind::LeafwiseBoosting => "Leaf-wise gradient boosting applied to standardized features.",
        }
    }

    /// Artifact file name inside the models directory
    pub const fn file_name(self) -> &'static str {
        match self {
            ModelKind::Svm => "svm_model.json",
            ModelKind::RandomForest => "rf_model.json",
            ModelKind::GradientBoosting => "xgb_model.json",
            ModelKind::LeafwiseBoosting => "lgbm_model.json",
        }
    }
}
