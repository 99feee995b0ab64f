// ============================================================
// Layer 6 — Feature Store
// ============================================================
// Persists the image→embedding-vector mapping so the expensive
// extraction pass runs once, not per training run.
//
// The artifact only stays valid as long as the encoder and its
// preprocessing stay fixed; delete features.json after swapping
// the encoder model.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::features::FeatureMap;
use crate::ml::extractor::FeatureExtractor;

pub struct FeatureStore {
    dir: PathBuf,
}

impl FeatureStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load the existing feature artifact, or run the extraction pass
    /// over the image directory and persist the result.
    pub fn load_or_extract(
        &self,
        images_dir:      &Path,
        extractor_model: Option<&Path>,
    ) -> Result<FeatureMap> {
        let path = self.features_path();
        if path.exists() {
            tracing::info!("Loading existing feature vectors from disk");
            self.load()
        } else {
            tracing::info!("Extracting features from '{}'", images_dir.display());
            let mut extractor = FeatureExtractor::new(extractor_model)?;
            let features = extractor.extract_dir(images_dir)?;
            self.save(&features)?;
            Ok(features)
        }
    }

    /// Load a previously saved feature mapping.
    pub fn load(&self) -> Result<FeatureMap> {
        let path = self.features_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!(
                "Cannot load features from '{}'. Have you run 'train' first?",
                path.display()
            ))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, features: &FeatureMap) -> Result<()> {
        fs::create_dir_all(&self.dir).ok();

        let path = self.features_path();
        fs::write(&path, serde_json::to_string(features)?)
            .with_context(|| format!("Cannot write features to '{}'", path.display()))?;

        tracing::info!("Saved {} feature vectors to '{}'", features.len(), path.display());
        Ok(())
    }

    fn features_path(&self) -> PathBuf {
        self.dir.join("features.json")
    }
}

/// Restrict a feature mapping to the given image names.
pub fn subset(features: &FeatureMap, photos: &[String]) -> FeatureMap {
    photos
        .iter()
        .filter_map(|p| features.get(p).map(|v| (p.clone(), v.clone())))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_keeps_only_listed_images() {
        let mut features = FeatureMap::new();
        features.insert("a.jpg".to_string(), vec![1.0]);
        features.insert("b.jpg".to_string(), vec![2.0]);

        let photos = vec!["a.jpg".to_string(), "missing.jpg".to_string()];
        let train = subset(&features, &photos);

        assert_eq!(train.len(), 1);
        assert!(train.contains_key("a.jpg"));
    }
}
