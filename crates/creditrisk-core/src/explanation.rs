// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Explanation Store
// ─────────────────────────────────────────────────────────────────────
//! Pre-computed per-customer attributions.
//!
//! The artifact is positional: row `i` belongs to the `i`-th customer of
//! the dataset in load order. The store resolves that coupling once at
//! construction by zipping the two orders into an id-keyed map, so the
//! query path never does positional arithmetic.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use creditrisk_types::{CustomerId, LocalExplanation, RiskError, RiskResult};

/// Base value(s): one shared scalar or one per row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BaseValues {
    Shared(Option<f64>),
    PerRow(Vec<Option<f64>>),
}

/// On-disk layout of the explanation artifact.
///
/// `null` cells are accepted here and rejected per customer at query time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplanationArtifact {
    pub base_values: BaseValues,
    pub values: Vec<Vec<Option<f64>>>,
    pub feature_names: Vec<String>,
}

#[derive(Debug, Clone)]
struct ExplanationRow {
    base_value: Option<f64>,
    values: Vec<Option<f64>>,
}

/// Id-keyed explanation rows sharing one feature-name list.
#[derive(Debug, Clone)]
pub struct ExplanationStore {
    feature_names: Vec<String>,
    rows: HashMap<CustomerId, ExplanationRow>,
}

impl ExplanationStore {
    /// Read the artifact and align it with `ids` (dataset load order).
    pub fn from_path(path: &Path, ids: &[CustomerId]) -> RiskResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            RiskError::ExplanationLoad(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text, ids)
    }

    pub fn from_json(json: &str, ids: &[CustomerId]) -> RiskResult<Self> {
        let artifact: ExplanationArtifact = serde_json::from_str(json)
            .map_err(|e| RiskError::ExplanationLoad(format!("JSON parse error: {e}")))?;
        Self::from_artifact(artifact, ids)
    }

    /// Zip artifact rows with `ids`, position by position.
    pub fn from_artifact(artifact: ExplanationArtifact, ids: &[CustomerId]) -> RiskResult<Self> {
        let n_rows = artifact.values.len();
        if let BaseValues::PerRow(ref base) = artifact.base_values {
            if base.len() != n_rows {
                return Err(RiskError::ExplanationLoad(format!(
                    "{} base values for {n_rows} rows",
                    base.len()
                )));
            }
        }
        if n_rows < ids.len() {
            log::warn!(
                "Explanation artifact covers {n_rows} of {} customers; the rest will fail lookup",
                ids.len()
            );
        } else if n_rows > ids.len() {
            log::warn!(
                "Explanation artifact has {} rows beyond the dataset; ignoring them",
                n_rows - ids.len()
            );
        }

        let base_at = |i: usize| match &artifact.base_values {
            BaseValues::Shared(v) => *v,
            BaseValues::PerRow(v) => v[i],
        };
        let rows = ids
            .iter()
            .zip(artifact.values.iter())
            .enumerate()
            .map(|(i, (id, values))| {
                (
                    *id,
                    ExplanationRow {
                        base_value: base_at(i),
                        values: values.clone(),
                    },
                )
            })
            .collect();

        Ok(Self {
            feature_names: artifact.feature_names,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Explanation for a customer known to the dataset.
    ///
    /// Errors with [`RiskError::Explanation`] when the artifact has no row
    /// for `id` or the row cannot be coerced to finite numbers.
    pub fn lookup(&self, id: CustomerId) -> RiskResult<LocalExplanation> {
        let fail = |reason: String| RiskError::Explanation {
            customer_id: id,
            reason,
        };
        let row = self
            .rows
            .get(&id)
            .ok_or_else(|| fail("no explanation row at this position".to_string()))?;
        let base_value = row
            .base_value
            .filter(|v| v.is_finite())
            .ok_or_else(|| fail("base value is not a number".to_string()))?;
        if row.values.len() != self.feature_names.len() {
            return Err(fail(format!(
                "{} values for {} feature names",
                row.values.len(),
                self.feature_names.len()
            )));
        }
        let values = row
            .values
            .iter()
            .enumerate()
            .map(|(j, v)| {
                v.filter(|x| x.is_finite()).ok_or_else(|| {
                    fail(format!("value for '{}' is not a number", self.feature_names[j]))
                })
            })
            .collect::<RiskResult<Vec<f64>>>()?;

        Ok(LocalExplanation {
            base_value,
            values,
            feature_names: self.feature_names.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"{
        "base_values": [-2.0, -2.1, -2.2],
        "values": [[0.1, 0.2], [0.3, null], [0.5, 0.6]],
        "feature_names": ["EXT_SOURCE_3", "DAYS_EMPLOYED"]
    }"#;

    #[test]
    fn test_rows_follow_load_order_not_id_order() {
        // load order 300, 100, 200
        let store = ExplanationStore::from_json(ARTIFACT, &[300, 100, 200]).unwrap();
        let e = store.lookup(300).unwrap();
        assert_eq!(e.base_value, -2.0);
        assert_eq!(e.values, vec![0.1, 0.2]);
        let e = store.lookup(200).unwrap();
        assert_eq!(e.base_value, -2.2);
        assert_eq!(e.values, vec![0.5, 0.6]);
        assert_eq!(e.feature_names.len(), e.values.len());
    }

    #[test]
    fn test_null_value_is_explanation_error() {
        let store = ExplanationStore::from_json(ARTIFACT, &[300, 100, 200]).unwrap();
        let err = store.lookup(100).unwrap_err();
        assert!(matches!(err, RiskError::Explanation { customer_id: 100, .. }));
    }

    #[test]
    fn test_shared_base_value() {
        let json = r#"{"base_values": -1.5, "values": [[1.0]], "feature_names": ["A"]}"#;
        let store = ExplanationStore::from_json(json, &[9]).unwrap();
        assert_eq!(store.lookup(9).unwrap().base_value, -1.5);
    }

    #[test]
    fn test_short_artifact_fails_lookup_for_uncovered_ids() {
        let json = r#"{"base_values": 0.0, "values": [[1.0]], "feature_names": ["A"]}"#;
        let store = ExplanationStore::from_json(json, &[1, 2]).unwrap();
        assert!(store.lookup(1).is_ok());
        assert!(matches!(
            store.lookup(2),
            Err(RiskError::Explanation { customer_id: 2, .. })
        ));
    }

    #[test]
    fn test_long_artifact_ignores_extra_rows() {
        let store = ExplanationStore::from_json(ARTIFACT, &[1]).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_width_mismatch_is_explanation_error() {
        let json = r#"{"base_values": 0.0, "values": [[1.0, 2.0]], "feature_names": ["A"]}"#;
        let store = ExplanationStore::from_json(json, &[1]).unwrap();
        assert!(store.lookup(1).is_err());
    }

    #[test]
    fn test_base_values_length_mismatch_is_fatal() {
        let json = r#"{"base_values": [0.0], "values": [[1.0], [2.0]], "feature_names": ["A"]}"#;
        let err = ExplanationStore::from_json(json, &[1, 2]).unwrap_err();
        assert!(err.is_fatal_load());
    }

    #[test]
    fn test_unreadable_artifact_is_fatal() {
        let err = ExplanationStore::from_json("not json", &[1]).unwrap_err();
        assert!(matches!(err, RiskError::ExplanationLoad(_)));
        let err = ExplanationStore::from_path(Path::new("/nonexistent.json"), &[1]).unwrap_err();
        assert!(err.is_fatal_load());
    }
}
