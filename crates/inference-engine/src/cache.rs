//! Lazy Model Cache
//!
//! Bundles are loaded from disk on first use and shared for the rest of the
//! process. Loading happens outside the lock; if two callers race on the
//! same key both may load, and the last insert wins.

use crate::bundle::ModelBundle;
use crate::InferenceError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use telemetry::normalize_key;
use tracing::{debug, info};

/// File extension of model artifacts
pub const ARTIFACT_EXTENSION: &str = "json";

/// Cache key; components are normalized and safe to use as path segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    pub brand: String,
    pub motorcycle_id: String,
    pub mode: String,
}

fn path_segment(raw: &str) -> Result<String, InferenceError> {
    let key = normalize_key(raw);
    if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(InferenceError::InvalidKey(raw.to_string()));
    }
    Ok(key)
}

impl ModelKey {
    pub fn new(brand: &str, motorcycle_id: &str, mode: &str) -> Result<Self, InferenceError> {
        Ok(Self {
            brand: path_segment(brand)?,
            motorcycle_id: path_segment(motorcycle_id)?,
            mode: path_segment(mode)?,
        })
    }

    /// `<brand>/<mode>_<motorcycle_id>.json`
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.brand).join(format!(
            "{}_{}.{}",
            self.mode, self.motorcycle_id, ARTIFACT_EXTENSION
        ))
    }
}

/// Process-wide map from vehicle to loaded bundle
#[derive(Debug)]
pub struct ModelCache {
    root: PathBuf,
    entries: RwLock<HashMap<ModelKey, Arc<ModelBundle>>>,
    loads: AtomicUsize,
}

impl ModelCache {
    /// Create an empty cache reading artifacts under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: RwLock::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the cached bundle, loading it from disk on first use
    pub fn get(&self, key: &ModelKey) -> Result<Arc<ModelBundle>, InferenceError> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|e| InferenceError::ModelLoadError(format!("Lock error: {}", e)))?;
            if let Some(bundle) = entries.get(key) {
                debug!("Model cache hit for {:?}", key);
                return Ok(Arc::clone(bundle));
            }
        }

        let path = self.root.join(key.relative_path());
        let bundle = Arc::new(ModelBundle::from_artifact(&path)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("model_cache_loads_total").increment(1);
        info!(
            "Loaded model for {}/{} ({}) from {}",
            key.brand,
            key.motorcycle_id,
            key.mode,
            path.display()
        );

        self.insert(key.clone(), Arc::clone(&bundle))?;
        Ok(bundle)
    }

    /// Install a bundle directly, replacing any cached entry
    pub fn insert(&self, key: ModelKey, bundle: Arc<ModelBundle>) -> Result<(), InferenceError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| InferenceError::ModelLoadError(format!("Lock error: {}", e)))?;
        entries.insert(key, bundle);
        Ok(())
    }

    /// Number of artifacts read from disk so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of cached bundles
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"{
        "model": {"max_samples": 4, "trees": [{"nodes": [{"type": "leaf", "n_samples": 4}]}]},
        "scaler": {"mean": [0, 0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1, 1]}
    }"#;

    fn cache_with_artifact() -> (tempfile::TempDir, ModelCache, ModelKey) {
        let dir = tempfile::tempdir().unwrap();
        let key = ModelKey::new("Honda", "MC-001", "idle").unwrap();
        let path = dir.path().join(key.relative_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, ARTIFACT).unwrap();
        let cache = ModelCache::new(dir.path());
        (dir, cache, key)
    }

    #[test]
    fn test_key_path_layout() {
        let key = ModelKey::new(" Honda ", "MC-001", "Idle").unwrap();
        assert_eq!(key.relative_path(), PathBuf::from("honda").join("idle_mc-001.json"));
    }

    #[test]
    fn test_key_rejects_traversal() {
        assert!(matches!(
            ModelKey::new("../etc", "mc", "idle"),
            Err(InferenceError::InvalidKey(_))
        ));
        assert!(ModelKey::new("honda", "a/b", "idle").is_err());
        assert!(ModelKey::new("honda", "a\\b", "idle").is_err());
        assert!(ModelKey::new("honda", "  ", "idle").is_err());
    }

    #[test]
    fn test_loads_once_and_shares() {
        let (_dir, cache, key) = cache_with_artifact();
        assert!(cache.is_empty());

        let first = cache.get(&key).unwrap();
        let second = cache.get(&key).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_model() {
        let (_dir, cache, _) = cache_with_artifact();
        let other = ModelKey::new("honda", "mc-404", "idle").unwrap();
        assert!(matches!(cache.get(&other), Err(InferenceError::ModelNotFound(_))));
        assert_eq!(cache.load_count(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_first_use() {
        let (_dir, cache, key) = cache_with_artifact();
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                std::thread::spawn(move || cache.get(&key).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.len(), 1);
        assert!(cache.load_count() >= 1);
    }
}
