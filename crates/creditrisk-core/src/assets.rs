// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Asset Resolution
// ─────────────────────────────────────────────────────────────────────
//! Resolves the artifacts the asset provider left on local disk.
//!
//! The core only consumes resolved paths. How the files arrived
//! (download, copy, baked into the image) is not its concern, and it
//! never retries or re-fetches: a missing required artifact is fatal.

use std::path::{Path, PathBuf};

use creditrisk_types::{RiskError, RiskResult, ServiceConfig};

/// Resolved local paths to the three artifacts the service needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub model_dir: PathBuf,
    pub dataset: PathBuf,
    pub explanation: PathBuf,
}

impl AssetPaths {
    pub fn new(
        model_dir: impl Into<PathBuf>,
        dataset: impl Into<PathBuf>,
        explanation: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model_dir: model_dir.into(),
            dataset: dataset.into(),
            explanation: explanation.into(),
        }
    }
}

/// Static artifacts that are served verbatim and may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalAssets {
    pub global_explanation: Option<PathBuf>,
    /// `(feature, path)` for every allow-listed histogram found on disk.
    pub distributions: Vec<(String, PathBuf)>,
}

/// Maps a [`ServiceConfig`] onto the on-disk asset layout.
pub struct AssetLayout<'a> {
    config: &'a ServiceConfig,
}

impl<'a> AssetLayout<'a> {
    pub fn new(config: &'a ServiceConfig) -> Self {
        Self { config }
    }

    /// Resolve the required artifacts, failing if any is missing.
    pub fn resolve(&self) -> RiskResult<AssetPaths> {
        let paths = AssetPaths::new(
            self.config.model_path(),
            self.config.dataset_path(),
            self.config.explanation_path(),
        );
        require_dir(&paths.model_dir, "model directory")?;
        require_file(&paths.dataset, "dataset")?;
        require_file(&paths.explanation, "explanation artifact")?;
        log::info!("Resolved model directory -> {}", paths.model_dir.display());
        log::info!("Resolved dataset -> {}", paths.dataset.display());
        log::info!("Resolved explanation -> {}", paths.explanation.display());
        Ok(paths)
    }

    /// Collect the static artifacts that exist, warning about the rest.
    pub fn optional(&self) -> OptionalAssets {
        let global = self.config.global_explanation_path();
        let global_explanation = if global.is_file() {
            Some(global)
        } else {
            log::warn!("Global explanation image not found at {}", global.display());
            None
        };

        let mut distributions = Vec::new();
        for feature in &self.config.distribution_features {
            let path = self.config.distribution_path(feature);
            if path.is_file() {
                distributions.push((feature.clone(), path));
            } else {
                log::warn!("Could not find distribution for {feature} at {}", path.display());
            }
        }
        log::info!(
            "{} of {} distribution files available",
            distributions.len(),
            self.config.distribution_features.len()
        );

        OptionalAssets {
            global_explanation,
            distributions,
        }
    }
}

fn require_dir(path: &Path, what: &str) -> RiskResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(RiskError::Asset(format!("{what} not found: {}", path.display())))
    }
}

fn require_file(path: &Path, what: &str) -> RiskResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RiskError::Asset(format!("{what} not found: {}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn layout_root() -> (tempfile::TempDir, ServiceConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            assets_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        (dir, config)
    }

    fn populate_required(config: &ServiceConfig) {
        fs::create_dir_all(config.model_path()).unwrap();
        fs::create_dir_all(config.dataset_path().parent().unwrap()).unwrap();
        fs::write(config.dataset_path(), "SK_ID_CURR\n").unwrap();
        fs::create_dir_all(config.explanation_path().parent().unwrap()).unwrap();
        fs::write(config.explanation_path(), "{}").unwrap();
    }

    #[test]
    fn test_resolve_all_present() {
        let (_dir, config) = layout_root();
        populate_required(&config);
        let paths = AssetLayout::new(&config).resolve().unwrap();
        assert_eq!(paths.dataset, config.dataset_path());
        assert_eq!(paths.model_dir, config.model_path());
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let (_dir, config) = layout_root();
        populate_required(&config);
        fs::remove_dir_all(config.model_path()).unwrap();
        let err = AssetLayout::new(&config).resolve().unwrap_err();
        assert!(err.is_fatal_load());
        assert!(err.to_string().contains("model directory"));
    }

    #[test]
    fn test_missing_explanation_is_fatal() {
        let (_dir, config) = layout_root();
        populate_required(&config);
        fs::remove_file(config.explanation_path()).unwrap();
        assert!(matches!(
            AssetLayout::new(&config).resolve(),
            Err(RiskError::Asset(_))
        ));
    }

    #[test]
    fn test_optional_skips_missing_distributions() {
        let (_dir, config) = layout_root();
        let plots = config.assets_root.join(&config.plots_dir);
        fs::create_dir_all(&plots).unwrap();
        fs::write(config.distribution_path("EXT_SOURCE_3"), "{}").unwrap();

        let optional = AssetLayout::new(&config).optional();
        assert!(optional.global_explanation.is_none());
        assert_eq!(optional.distributions.len(), 1);
        assert_eq!(optional.distributions[0].0, "EXT_SOURCE_3");
    }
}
