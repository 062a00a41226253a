// ─────────────────────────────────────────────────────────────────────
// Credit Risk Dashboard - Customer Dataset
// ─────────────────────────────────────────────────────────────────────
//! Customer table loaded once at construction.
//!
//! Rows keep the CSV load order; that order is the positional index the
//! explanation artifact is aligned to. Values are stored as explicit
//! `Option<f64>`, with missing and non-finite cells mapped to `None`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use creditrisk_types::{CustomerId, RiskError, RiskResult};

const MISSING_TOKENS: [&str; 6] = ["", "nan", "NaN", "NA", "null", "None"];

/// Immutable, id-indexed customer table.
#[derive(Debug, Clone)]
pub struct CustomerTable {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    ids: Vec<CustomerId>,
    positions: HashMap<CustomerId, usize>,
    rows: Vec<Vec<Option<f64>>>,
}

impl CustomerTable {
    /// Build from already-parsed rows, in load order.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<(CustomerId, Vec<Option<f64>>)>,
    ) -> RiskResult<Self> {
        let column_index: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        if column_index.len() != columns.len() {
            return Err(RiskError::DatasetLoad("duplicate column names".to_string()));
        }

        let mut ids = Vec::with_capacity(rows.len());
        let mut positions = HashMap::with_capacity(rows.len());
        let mut values = Vec::with_capacity(rows.len());
        for (position, (id, row)) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(RiskError::DatasetLoad(format!(
                    "row for customer {id} has {} values, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
            if positions.insert(id, position).is_some() {
                return Err(RiskError::DatasetLoad(format!("duplicate customer id {id}")));
            }
            ids.push(id);
            values.push(
                row.into_iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect(),
            );
        }

        Ok(Self {
            columns,
            column_index,
            ids,
            positions,
            rows: values,
        })
    }

    /// Load a CSV file restricted to `import_columns`, keyed by `id_column`.
    pub fn from_path(path: &Path, id_column: &str, import_columns: &[String]) -> RiskResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            RiskError::DatasetLoad(format!("cannot open {}: {e}", path.display()))
        })?;
        Self::from_reader(file, id_column, import_columns)
    }

    /// Load CSV from any reader. Extra columns are ignored.
    pub fn from_reader<R: Read>(
        reader: R,
        id_column: &str,
        import_columns: &[String],
    ) -> RiskResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| RiskError::DatasetLoad(format!("cannot read header: {e}")))?
            .clone();
        let find = |name: &str| headers.iter().position(|h| h == name);

        let mut missing = Vec::new();
        let id_idx = find(id_column);
        if id_idx.is_none() {
            missing.push(id_column.to_string());
        }
        let mut selected = Vec::with_capacity(import_columns.len());
        for column in import_columns {
            match find(column) {
                Some(idx) => selected.push(idx),
                None => missing.push(column.clone()),
            }
        }
        let id_idx = match id_idx {
            Some(idx) if missing.is_empty() => idx,
            _ => {
                return Err(RiskError::DatasetLoad(format!(
                    "missing required columns: {missing:?}"
                )))
            }
        };

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            // +2: one for the header, one for 1-based numbering
            let line = line + 2;
            let record = record
                .map_err(|e| RiskError::DatasetLoad(format!("line {line}: {e}")))?;
            let raw_id = record.get(id_idx).unwrap_or_default();
            let id: CustomerId = raw_id.parse().map_err(|_| {
                RiskError::DatasetLoad(format!(
                    "line {line}: invalid {id_column} value '{raw_id}'"
                ))
            })?;

            let mut values = Vec::with_capacity(selected.len());
            for (column, &idx) in import_columns.iter().zip(&selected) {
                let cell = record.get(idx).unwrap_or_default();
                values.push(parse_cell(cell).map_err(|_| {
                    RiskError::DatasetLoad(format!(
                        "line {line}: column {column} is not numeric: '{cell}'"
                    ))
                })?);
            }
            rows.push((id, values));
        }

        Self::from_rows(import_columns.to_vec(), rows)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Customer ids in load order.
    pub fn ids(&self) -> &[CustomerId] {
        &self.ids
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, id: CustomerId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Positional index of `id` in load order.
    pub fn position(&self, id: CustomerId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Row values at a load-order position.
    pub fn row(&self, position: usize) -> Option<&[Option<f64>]> {
        self.rows.get(position).map(Vec::as_slice)
    }

    /// Value of `column` at `position`; `None` if missing or unknown.
    pub fn value(&self, position: usize, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(position)?.get(idx).copied().flatten()
    }
}

fn parse_cell(cell: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    if MISSING_TOKENS.contains(&cell) {
        return Ok(None);
    }
    let value: f64 = cell.parse()?;
    Ok(Some(value).filter(|v| v.is_finite()))
}
