// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Feature Transform
// ─────────────────────────────────────────────────────────────────────
//! Maps the raw customer table onto the matrix the model accepts.
//!
//! Called exactly once per successful warmup, for every customer at
//! once. `StandardTransform` covers the raw columns plus the ratio
//! features the exported models are trained on.

use creditrisk_types::{RiskError, RiskResult};

use crate::dataset::CustomerTable;
use crate::model::FeatureMatrix;

/// Trait for feature transform backends.
pub trait FeatureTransform: Send + Sync {
    /// Build one matrix row per customer (load order), one column per
    /// entry of `expected_features` (same order).
    fn transform(
        &self,
        table: &CustomerTable,
        expected_features: &[String],
    ) -> RiskResult<FeatureMatrix>;
}

/// Ratio features computed from raw columns.
const DERIVED: [(&str, &str, &str); 5] = [
    ("DAYS_EMPLOYED_PERC", "DAYS_EMPLOYED", "DAYS_BIRTH"),
    ("INCOME_CREDIT_PERC", "AMT_INCOME_TOTAL", "AMT_CREDIT"),
    ("INCOME_PER_PERSON", "AMT_INCOME_TOTAL", "CNT_FAM_MEMBERS"),
    ("ANNUITY_INCOME_PERC", "AMT_ANNUITY", "AMT_INCOME_TOTAL"),
    ("PAYMENT_RATE", "AMT_ANNUITY", "AMT_CREDIT"),
];

enum Source {
    Raw(usize),
    Ratio(usize, usize),
}

/// Raw column copy, `DAYS_EMPLOYED` sentinel cleanup, ratio features.
#[derive(Debug, Clone)]
pub struct StandardTransform {
    days_employed_sentinel: f64,
}

impl StandardTransform {
    pub fn new(days_employed_sentinel: f64) -> Self {
        Self {
            days_employed_sentinel,
        }
    }

    fn source_for(&self, table: &CustomerTable, feature: &str) -> RiskResult<Source> {
        if let Some(idx) = table.column_index(feature) {
            return Ok(Source::Raw(idx));
        }
        let (_, num, den) = DERIVED
            .iter()
            .find(|(name, _, _)| *name == feature)
            .ok_or_else(|| {
                RiskError::Transform(format!(
                    "feature '{feature}' is neither a loaded column nor a derived feature"
                ))
            })?;
        let lookup = |col: &str| {
            table.column_index(col).ok_or_else(|| {
                RiskError::Transform(format!(
                    "derived feature '{feature}' needs column '{col}' which was not loaded"
                ))
            })
        };
        Ok(Source::Ratio(lookup(num)?, lookup(den)?))
    }

    fn raw(&self, row: &[Option<f64>], idx: usize, days_employed: Option<usize>) -> f64 {
        match row[idx] {
            Some(v) if Some(idx) == days_employed && v == self.days_employed_sentinel => f64::NAN,
            Some(v) => v,
            None => f64::NAN,
        }
    }
}

impl Default for StandardTransform {
    fn default() -> Self {
        Self::new(365_243.0)
    }
}

impl FeatureTransform for StandardTransform {
    fn transform(
        &self,
        table: &CustomerTable,
        expected_features: &[String],
    ) -> RiskResult<FeatureMatrix> {
        let sources = expected_features
            .iter()
            .map(|f| self.source_for(table, f))
            .collect::<RiskResult<Vec<_>>>()?;
        let days_employed = table.column_index("DAYS_EMPLOYED");

        let mut data = Vec::with_capacity(table.len() * sources.len());
        for position in 0..table.len() {
            let row = table.row(position).unwrap_or_default();
            for source in &sources {
                let value = match *source {
                    Source::Raw(idx) => self.raw(row, idx, days_employed),
                    Source::Ratio(num, den) => {
                        let d = self.raw(row, den, days_employed);
                        if d == 0.0 {
                            f64::NAN
                        } else {
                            self.raw(row, num, days_employed) / d
                        }
                    }
                };
                data.push(value);
            }
        }
        FeatureMatrix::new(expected_features.to_vec(), data)
    }
}

type TransformFn =
    Box<dyn Fn(&CustomerTable, &[String]) -> RiskResult<FeatureMatrix> + Send + Sync>;

/// Transform backed by a closure.
pub struct ExternalTransform {
    transform_fn: TransformFn,
}

impl ExternalTransform {
    pub fn new(
        transform_fn: impl Fn(&CustomerTable, &[String]) -> RiskResult<FeatureMatrix>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            transform_fn: Box::new(transform_fn),
        }
    }
}

impl FeatureTransform for ExternalTransform {
    fn transform(
        &self,
        table: &CustomerTable,
        expected_features: &[String],
    ) -> RiskResult<FeatureMatrix> {
        (self.transform_fn)(table, expected_features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn table() -> CustomerTable {
        CustomerTable::from_rows(
            names(&["DAYS_EMPLOYED", "DAYS_BIRTH", "AMT_ANNUITY", "AMT_CREDIT"]),
            vec![
                (1, vec![Some(-1000.0), Some(-10000.0), Some(2000.0), Some(40000.0)]),
                (2, vec![Some(365243.0), Some(-20000.0), None, Some(0.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_raw_columns_in_expected_order() {
        let m = StandardTransform::default()
            .transform(&table(), &names(&["AMT_CREDIT", "DAYS_BIRTH"]))
            .unwrap();
        assert_eq!(m.columns(), &names(&["AMT_CREDIT", "DAYS_BIRTH"])[..]);
        assert_eq!(m.row(0), &[40000.0, -10000.0]);
    }

    #[test]
    fn test_sentinel_becomes_nan() {
        let m = StandardTransform::default()
            .transform(&table(), &names(&["DAYS_EMPLOYED"]))
            .unwrap();
        assert_eq!(m.row(0), &[-1000.0]);
        assert!(m.row(1)[0].is_nan());
    }

    #[test]
    fn test_ratio_features() {
        let m = StandardTransform::default()
            .transform(
                &table(),
                &names(&["DAYS_EMPLOYED_PERC", "PAYMENT_RATE"]),
            )
            .unwrap();
        assert!((m.row(0)[0] - 0.1).abs() < 1e-12);
        assert!((m.row(0)[1] - 0.05).abs() < 1e-12);
        // sentinel numerator, zero denominator
        assert!(m.row(1)[0].is_nan());
        assert!(m.row(1)[1].is_nan());
    }

    #[test]
    fn test_unknown_feature_fails() {
        let err = StandardTransform::default()
            .transform(&table(), &names(&["EXT_SOURCE_1"]))
            .unwrap_err();
        assert!(matches!(err, RiskError::Transform(_)));
    }

    #[test]
    fn test_derived_feature_missing_input_fails() {
        let err = StandardTransform::default()
            .transform(&table(), &names(&["INCOME_CREDIT_PERC"]))
            .unwrap_err();
        assert!(err.to_string().contains("AMT_INCOME_TOTAL"));
    }

    #[test]
    fn test_external_transform() {
        let t = ExternalTransform::new(|table, features| {
            FeatureMatrix::new(features.to_vec(), vec![7.0; table.len() * features.len()])
        });
        let m = t.transform(&table(), &names(&["X"])).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.row(1), &[7.0]);
    }
}
