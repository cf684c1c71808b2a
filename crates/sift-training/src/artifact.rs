//! Model artifacts on disk: one immutable file per version plus a "latest"
//! pointer the live classifier loads. The latest pointer is replaced via
//! temp-file + rename so a failed run can never leave it half-written.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sift_core::errors::{SiftResult, TrainingError};
use sift_text::{SparseVector, TfidfVectorizer};

use crate::forest::RandomForest;

/// File name of the artifact the live classifier loads.
pub const LATEST_ARTIFACT: &str = "classifier_latest.json";

/// A fully trained model: vectorizer, forest, and the category order the
/// forest's class indices map to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub categories: Vec<String>,
    pub vectorizer: TfidfVectorizer,
    pub forest: RandomForest,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Probability vector over `self.categories` for a feature text.
    pub fn predict_proba(&self, text: &str) -> Vec<f64> {
        let vector = self.vectorizer.transform(text);
        self.forest.predict_proba(&vector)
    }

    /// (category, probabilities) for a feature text.
    pub fn predict(&self, text: &str) -> (&str, Vec<f64>) {
        let vector: SparseVector = self.vectorizer.transform(text);
        let probabilities = self.forest.predict_proba(&vector);
        let best = probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);
        (&self.categories[best], probabilities)
    }

    /// Write the immutable per-version artifact file.
    pub fn save_versioned(&self, model_dir: &Path, version: &str) -> SiftResult<PathBuf> {
        fs::create_dir_all(model_dir)?;
        let path = model_dir.join(format!("classifier_{version}.json"));
        let encoded = self.encode()?;
        fs::write(&path, encoded)?;
        Ok(path)
    }

    /// Atomically replace the latest pointer.
    pub fn replace_latest(&self, model_dir: &Path) -> SiftResult<PathBuf> {
        fs::create_dir_all(model_dir)?;
        let path = model_dir.join(LATEST_ARTIFACT);
        let tmp = model_dir.join(format!("{LATEST_ARTIFACT}.tmp"));
        let encoded = self.encode()?;
        fs::write(&tmp, encoded)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    /// Load the latest artifact, or None when no model has been trained yet.
    pub fn load_latest(model_dir: &Path) -> SiftResult<Option<Self>> {
        let path = model_dir.join(LATEST_ARTIFACT);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let artifact = serde_json::from_str(&raw).map_err(|e| TrainingError::ArtifactDecode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(artifact))
    }

    fn encode(&self) -> SiftResult<String> {
        Ok(serde_json::to_string(self).map_err(|e| TrainingError::ArtifactEncode {
            message: e.to_string(),
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{ForestConfig, RandomForest};
    use sift_text::TfidfConfig;

    fn tiny_artifact() -> ModelArtifact {
        let documents = vec![
            "airline flight booking".to_string(),
            "flight gate airline".to_string(),
            "invoice payment receipt".to_string(),
            "payment overdue invoice".to_string(),
        ];
        let vectorizer = TfidfVectorizer::fit(TfidfConfig::unigram(100), &documents);
        let samples: Vec<_> = documents.iter().map(|d| vectorizer.transform(d)).collect();
        let labels = vec![0, 0, 1, 1];
        let n_features = vectorizer.len();
        let forest = RandomForest::fit(
            &samples,
            &labels,
            2,
            n_features,
            &ForestConfig {
                tree_count: 10,
                max_depth: 6,
                min_leaf_samples: 1,
                seed: 42,
            },
        );
        ModelArtifact {
            categories: vec!["travel".to_string(), "finance_receipt".to_string()],
            vectorizer,
            forest,
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn load_latest_returns_none_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ModelArtifact::load_latest(dir.path()).unwrap().is_none());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = tiny_artifact();
        artifact.replace_latest(dir.path()).unwrap();

        let loaded = ModelArtifact::load_latest(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.categories, artifact.categories);
        let (category, proba) = loaded.predict("flight airline gate change");
        assert_eq!(category, "travel");
        assert!(proba[0] > proba[1]);
    }

    #[test]
    fn versioned_and_latest_files_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = tiny_artifact();
        let versioned = artifact.save_versioned(dir.path(), "v1_20240101_000000").unwrap();
        let latest = artifact.replace_latest(dir.path()).unwrap();
        assert!(versioned.exists());
        assert!(latest.exists());
        assert_ne!(versioned, latest);
    }

    #[test]
    fn corrupt_latest_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LATEST_ARTIFACT), "not json").unwrap();
        assert!(ModelArtifact::load_latest(dir.path()).is_err());
    }
}
