// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Service Configuration
// ─────────────────────────────────────────────────────────────────────

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, RiskResult};
use crate::score::DashboardFeature;

/// Runtime configuration for the inference cache and its HTTP surface.
///
/// Every field has a default, so a JSON file only needs the overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory the asset provider populated.
    pub assets_root: PathBuf,

    /// Model directory, relative to `assets_root`.
    pub model_dir: PathBuf,

    /// Customer CSV, relative to `assets_root`.
    pub dataset_file: PathBuf,

    /// Pre-computed explanation artifact, relative to `assets_root`.
    pub explanation_file: PathBuf,

    /// Global explanation image served as-is.
    pub global_explanation_file: PathBuf,

    /// Directory holding `<feature>_hist_data.json` files.
    pub plots_dir: PathBuf,

    /// Customer key column.
    pub id_column: String,

    /// Feature columns loaded from the CSV (the id column is implied).
    pub import_columns: Vec<String>,

    /// Features with a pre-computed histogram artifact.
    pub distribution_features: Vec<String>,

    /// "Not applicable" placeholder used upstream on `DAYS_EMPLOYED`.
    pub days_employed_sentinel: f64,

    /// Decision threshold used when the model metadata carries none.
    pub default_threshold: f64,

    pub host: String,
    pub port: u16,

    /// Run warmup in the background right after construction.
    pub eager_warmup: bool,
}

pub const DEFAULT_IMPORT_COLUMNS: [&str; 11] = [
    "EXT_SOURCE_1",
    "EXT_SOURCE_2",
    "EXT_SOURCE_3",
    "DAYS_BIRTH",
    "DAYS_EMPLOYED",
    "OWN_CAR_AGE",
    "AMT_INCOME_TOTAL",
    "AMT_CREDIT",
    "AMT_ANNUITY",
    "AMT_GOODS_PRICE",
    "CNT_FAM_MEMBERS",
];

pub const DEFAULT_DISTRIBUTION_FEATURES: [&str; 6] = [
    "EXT_SOURCE_1",
    "EXT_SOURCE_2",
    "EXT_SOURCE_3",
    "DAYS_EMPLOYED",
    "OWN_CAR_AGE",
    "AMT_CREDIT",
];

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("./assets"),
            model_dir: PathBuf::from("model"),
            dataset_file: PathBuf::from("data/customers.csv"),
            explanation_file: PathBuf::from("shap/explanation.json"),
            global_explanation_file: PathBuf::from("shap/shap_beeswarm.png"),
            plots_dir: PathBuf::from("plots"),
            id_column: "SK_ID_CURR".to_string(),
            import_columns: DEFAULT_IMPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            distribution_features: DEFAULT_DISTRIBUTION_FEATURES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            days_employed_sentinel: 365_243.0,
            default_threshold: 0.5,
            host: "0.0.0.0".to_string(),
            port: 8000,
            eager_warmup: false,
        }
    }
}

impl ServiceConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> RiskResult<()> {
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(RiskError::Config(format!(
                "default_threshold must be in [0, 1], got {}",
                self.default_threshold
            )));
        }
        if self.id_column.trim().is_empty() {
            return Err(RiskError::Config("id_column must not be empty".to_string()));
        }
        if self.import_columns.is_empty() {
            return Err(RiskError::Config(
                "import_columns must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for column in &self.import_columns {
            if column == &self.id_column {
                return Err(RiskError::Config(format!(
                    "import_columns must not repeat the id column '{column}'"
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(RiskError::Config(format!(
                    "duplicate import column '{column}'"
                )));
            }
        }
        let missing: Vec<&str> = DashboardFeature::ALL
            .iter()
            .map(|f| f.as_str())
            .filter(|name| !seen.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(RiskError::Config(format!(
                "import_columns must include dashboard features {missing:?}"
            )));
        }
        if !self.days_employed_sentinel.is_finite() {
            return Err(RiskError::Config(
                "days_employed_sentinel must be finite".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(RiskError::Config("port must be > 0".to_string()));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> RiskResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RiskError::Config(format!("JSON parse error: {e}")))
    }

    /// Load from a JSON file.
    pub fn from_path(path: &Path) -> RiskResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RiskError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Apply `CREDITRISK_*` overrides through `lookup` (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> RiskResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("CREDITRISK_ASSETS_ROOT") {
            self.assets_root = PathBuf::from(root);
        }
        if let Some(host) = lookup("CREDITRISK_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("CREDITRISK_PORT") {
            self.port = port
                .parse()
                .map_err(|_| RiskError::Config(format!("CREDITRISK_PORT is not a port: {port}")))?;
        }
        if let Some(flag) = lookup("CREDITRISK_EAGER_WARMUP") {
            self.eager_warmup = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Build the effective configuration from the process environment.
    ///
    /// `CREDITRISK_CONFIG` names an optional JSON file; the remaining
    /// variables override individual fields.
    pub fn from_env() -> RiskResult<Self> {
        let mut config = match std::env::var("CREDITRISK_CONFIG") {
            Ok(path) => Self::from_path(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn model_path(&self) -> PathBuf {
        self.assets_root.join(&self.model_dir)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.assets_root.join(&self.dataset_file)
    }

    pub fn explanation_path(&self) -> PathBuf {
        self.assets_root.join(&self.explanation_file)
    }

    pub fn global_explanation_path(&self) -> PathBuf {
        self.assets_root.join(&self.global_explanation_file)
    }

    pub fn distribution_path(&self, feature: &str) -> PathBuf {
        self.assets_root
            .join(&self.plots_dir)
            .join(format!("{feature}_hist_data.json"))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        log::info!("Assets root: {}", self.assets_root.display());
        log::info!("  model:       {}", self.model_path().display());
        log::info!("  dataset:     {}", self.dataset_path().display());
        log::info!("  explanation: {}", self.explanation_path().display());
        log::info!(
            "Import columns ({}): {}",
            self.import_columns.len(),
            self.import_columns.join(", ")
        );
        log::info!("Default threshold: {}", self.default_threshold);
        log::info!("Bind address: {}", self.bind_addr());
    }
}
