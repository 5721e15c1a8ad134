// crates/tabflow-core/src/contract.rs
//
// The declared column set every extract must satisfy. A pipeline states
// its columns once, up front; extraction conforms whatever it finds to
// that contract so downstream stages never see a frame with a missing
// or reordered column.

use polars::prelude::*;

use crate::error::{EtlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Str,
    Int,
    Float,
}

impl ColumnKind {
    pub fn dtype(&self) -> DataType {
        match self {
            ColumnKind::Str => DataType::String,
            ColumnKind::Int => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn str(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Str,
        }
    }

    pub fn int(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Int,
        }
    }

    pub fn float(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Float,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableContract {
    columns: Vec<ColumnSpec>,
}

impl TableContract {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// A frame with every declared column and zero rows. Extracting from
    /// an empty source set yields exactly this, not an error.
    pub fn empty_frame(&self) -> Result<DataFrame> {
        let cols: Vec<Column> = self
            .columns
            .iter()
            .map(|spec| Series::new_empty(spec.name.as_str().into(), &spec.kind.dtype()).into())
            .collect();
        Ok(DataFrame::new(cols)?)
    }

    /// Reshape `df` to match the contract: declared columns in declared
    /// order, cast to the declared types (unparseable cells become
    /// null), absent columns filled with nulls. Extra columns from the
    /// source are dropped.
    pub fn conform(&self, df: &DataFrame) -> Result<DataFrame> {
        let height = df.height();
        let mut cols: Vec<Column> = Vec::with_capacity(self.columns.len());
        for spec in &self.columns {
            let dtype = spec.kind.dtype();
            match df.column(spec.name.as_str()) {
                Ok(found) => {
                    let series = found.as_materialized_series().cast(&dtype)?;
                    cols.push(series.into());
                }
                Err(_) => {
                    cols.push(Series::full_null(spec.name.as_str().into(), height, &dtype).into());
                }
            }
        }
        Ok(DataFrame::new(cols)?)
    }

    /// Positional variant for headerless sources: the i-th source column
    /// is the i-th declared column. Column-count mismatch is a parse
    /// failure, not a silent truncation.
    pub fn conform_positional(&self, df: &DataFrame, source_name: &str) -> Result<DataFrame> {
        if df.width() != self.columns.len() {
            return Err(EtlError::Parse {
                source_name: source_name.to_string(),
                detail: format!(
                    "expected {} columns but found {}",
                    self.columns.len(),
                    df.width()
                ),
            });
        }
        let mut cols: Vec<Column> = Vec::with_capacity(self.columns.len());
        for (spec, found) in self.columns.iter().zip(df.get_columns()) {
            let mut series = found.as_materialized_series().cast(&spec.kind.dtype())?;
            series.rename(spec.name.as_str().into());
            cols.push(series.into());
        }
        Ok(DataFrame::new(cols)?)
    }
}

/// Column-wise accumulator used by the row-oriented extract adapters
/// (JSON lines, XML rows, web tables). Cells that fail to parse as the
/// declared type become null; the strict coercion policy lives in the
/// transform stage where the caller chooses it explicitly.
pub enum CellBuffer {
    Str(Vec<Option<String>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
}

impl CellBuffer {
    pub fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Str => CellBuffer::Str(Vec::new()),
            ColumnKind::Int => CellBuffer::Int(Vec::new()),
            ColumnKind::Float => CellBuffer::Float(Vec::new()),
        }
    }

    pub fn push_text(&mut self, raw: Option<&str>) {
        let trimmed = raw.map(str::trim).filter(|v| !v.is_empty());
        match self {
            CellBuffer::Str(values) => values.push(trimmed.map(|v| v.to_string())),
            CellBuffer::Int(values) => values.push(trimmed.and_then(|v| v.parse::<i64>().ok())),
            CellBuffer::Float(values) => values.push(trimmed.and_then(|v| v.parse::<f64>().ok())),
        }
    }

    pub fn push_json(&mut self, value: Option<&serde_json::Value>) {
        match self {
            CellBuffer::Str(values) => values.push(value.and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })),
            CellBuffer::Int(values) => values.push(value.and_then(|v| v.as_i64())),
            CellBuffer::Float(values) => values.push(value.and_then(|v| v.as_f64())),
        }
    }

    pub fn into_series(self, name: &str) -> Series {
        match self {
            CellBuffer::Str(values) => Series::new(name.into(), values),
            CellBuffer::Int(values) => Series::new(name.into(), values),
            CellBuffer::Float(values) => Series::new(name.into(), values),
        }
    }
}
