// ModelRegistry - loaded classifier artifacts and ensemble weights
//
// Built once (from a directory or programmatically), then read-only. A missing
// artifact file means "model absent"; a malformed one is logged and also
// treated as absent, so a broken deployment degrades to the heuristic
// classifier instead of refusing to start.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;

use super::artifact::{ArtifactFile, ClassifierArtifact};
use super::weights::EnsembleWeights;
use super::ModelKind;
use crate::error::{log_model_error, ModelError};

/// Weights file name inside the models directory
pub const ENSEMBLE_WEIGHTS_FILE: &str = "ensemble_weights.json";

static SHARED: OnceCell<Arc<ModelRegistry>> = OnceCell::new();

/// Availability entry for one selectable model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub available: bool,
}

/// Read-only set of loaded artifacts
#[derive(Debug, Default)]
pub struct ModelRegistry {
    artifacts: BTreeMap<ModelKind, ClassifierArtifact>,
    weights: EnsembleWeights,
}

impl ModelRegistry {
    /// Registry with no artifacts; every request takes the heuristic path
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add (or replace) the artifact for one model family
    pub fn with_artifact(mut self, kind: ModelKind, artifact: ClassifierArtifact) -> Self {
        self.artifacts.insert(kind, artifact);
        self
    }

    pub fn with_weights(mut self, weights: EnsembleWeights) -> Self {
        self.weights = weights.sanitized();
        self
    }

    /// Load every known artifact from `dir`
    ///
    /// Never fails: unreadable or invalid files are logged and skipped.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let mut registry = Self::empty();

        for kind in ModelKind::ALL {
            match load_artifact(&dir.join(kind.file_name())) {
                Ok(Some(artifact)) => {
                    tracing::info!("Loaded {} model from {}", kind.id(), dir.display());
                    registry.artifacts.insert(kind, artifact);
                }
                Ok(None) => {
                    tracing::info!("{} model not found in {}", kind.id(), dir.display());
                }
                Err(err) => log_model_error(&err, "load_from_dir"),
            }
        }

        match load_weights(&dir.join(ENSEMBLE_WEIGHTS_FILE)) {
            Ok(Some(weights)) => registry.weights = weights.sanitized(),
            Ok(None) => tracing::debug!("No ensemble weights file, using defaults"),
            Err(err) => log_model_error(&err, "load_from_dir"),
        }

        registry
    }

    pub fn get(&self, kind: ModelKind) -> Option<&ClassifierArtifact> {
        self.artifacts.get(&kind)
    }

    pub fn is_loaded(&self, kind: ModelKind) -> bool {
        self.artifacts.contains_key(&kind)
    }

    pub fn loaded_count(&self) -> usize {
        self.artifacts.len()
    }

    pub fn weights(&self) -> &EnsembleWeights {
        &self.weights
    }

    /// Catalog of selectable models with availability flags
    ///
    /// The ensemble counts as available when at least one of its members is.
    pub fn status(&self) -> Vec<ModelStatus> {
        let mut entries: Vec<ModelStatus> = ModelKind::ALL
            .iter()
            .map(|&kind| ModelStatus {
                id: kind.id().to_string(),
                name: kind.display_name().to_string(),
                description: kind.description().to_string(),
                available: self.is_loaded(kind),
            })
            .collect();

        entries.push(ModelStatus {
            id: "ENSEMBLE".to_string(),
            name: "Ensemble".to_string(),
            description: "Weighted soft vote of SVM, XGBoost and LightGBM probabilities."
                .to_string(),
            available: EnsembleWeights::MEMBERS
                .iter()
                .any(|&kind| self.is_loaded(kind)),
        });

        entries
    }
}

/// Process-wide registry, loaded on first use
///
/// Only the first call's `models_dir` is honored; later calls return the
/// already-loaded registry.
pub fn shared(models_dir: Option<&Path>) -> Arc<ModelRegistry> {
    SHARED
        .get_or_init(|| {
            let registry = match models_dir {
                Some(dir) => ModelRegistry::load_from_dir(dir),
                None => ModelRegistry::empty(),
            };
            Arc::new(registry)
        })
        .clone()
}

/// Read one artifact file; `Ok(None)` when it does not exist
pub fn load_artifact(path: &Path) -> Result<Option<ClassifierArtifact>, ModelError> {
    let Some(contents) = read_optional(path)? else {
        return Ok(None);
    };
    let file: ArtifactFile = serde_json::from_str(&contents).map_err(|e| ModelError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    file.into_artifact().map(Some)
}

fn load_weights(path: &Path) -> Result<Option<EnsembleWeights>, ModelError> {
    let Some(contents) = read_optional(path)? else {
        return Ok(None);
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn read_optional(path: &Path) -> Result<Option<String>, ModelError> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
