// crates/tabflow-core/src/transform.rs
//
// The transform stage: a pure, single-pass plan of operations applied
// in order. Every operation preserves row count; rows are only ever
// dropped during extraction. No I/O happens here beyond the reference
// mapping the caller loaded up front.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;

use crate::error::{EtlError, Result};

/// What to do when a cell cannot be coerced to a number: fail the run,
/// or record a null and keep going. The source scripts disagreed on
/// this, so each pipeline picks its policy explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercePolicy {
    Fail,
    Null,
}

/// Small key -> multiplier mapping (e.g. currency rates), loaded
/// wholesale from a delimited file before the run starts.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    rates: HashMap<String, f64>,
}

impl ReferenceTable {
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self {
            rates: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    /// Read `key_column` and `value_column` from a headered CSV file.
    pub fn from_csv_path(
        path: impl AsRef<Path>,
        key_column: &str,
        value_column: &str,
    ) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().from_path(path.as_ref())?;
        let headers = reader.headers()?.clone();
        let key_idx = position_of(&headers, key_column)?;
        let value_idx = position_of(&headers, value_column)?;

        let mut rates = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let key = record.get(key_idx).unwrap_or("").trim();
            let raw = record.get(value_idx).unwrap_or("").trim();
            if key.is_empty() {
                continue;
            }
            let value = raw.parse::<f64>().map_err(|_| EtlError::Format {
                column: value_column.to_string(),
                value: raw.to_string(),
            })?;
            rates.insert(key.to_string(), value);
        }
        Ok(Self { rates })
    }

    pub fn rate(&self, key: &str) -> Result<f64> {
        self.rates
            .get(key)
            .copied()
            .ok_or_else(|| EtlError::UnknownKey {
                key: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn position_of(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| EtlError::MissingColumn {
            column: name.to_string(),
            detail: "not present in reference file header".to_string(),
        })
}

#[derive(Debug, Clone)]
pub enum TransformOp {
    /// Round a numeric column to a fixed decimal precision. Idempotent.
    Round { column: String, decimals: u32 },
    /// Multiply a numeric column by a constant, then round.
    Scale {
        column: String,
        factor: f64,
        decimals: u32,
    },
    /// Add `output` = `source` x reference rate for `rate_key`. The run
    /// fails with `UnknownKey` when the mapping lacks the key.
    DeriveScaled {
        source: String,
        output: String,
        rate_key: String,
        decimals: u32,
    },
    /// Coerce a string column to floats, optionally stripping thousands
    /// separators first.
    ParseNumber {
        column: String,
        strip_thousands: bool,
        on_error: CoercePolicy,
    },
    Rename { from: String, to: String },
    Drop { column: String },
    Project { keep: Vec<String> },
}

/// Apply the plan in order. Row count in equals row count out.
pub fn apply(
    df: DataFrame,
    ops: &[TransformOp],
    reference: Option<&ReferenceTable>,
) -> Result<DataFrame> {
    let mut df = df;
    for op in ops {
        let before = df.height();
        df = apply_one(df, op, reference)?;
        debug_assert_eq!(df.height(), before);
    }
    Ok(df)
}

fn apply_one(
    mut df: DataFrame,
    op: &TransformOp,
    reference: Option<&ReferenceTable>,
) -> Result<DataFrame> {
    match op {
        TransformOp::Round { column, decimals } => {
            let values = float_values(&df, column)?;
            let rounded: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|x| round_to(x, *decimals)))
                .collect();
            df.with_column(Series::new(column.as_str().into(), rounded))?;
            Ok(df)
        }
        TransformOp::Scale {
            column,
            factor,
            decimals,
        } => {
            let values = float_values(&df, column)?;
            let scaled: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|x| round_to(x * factor, *decimals)))
                .collect();
            df.with_column(Series::new(column.as_str().into(), scaled))?;
            Ok(df)
        }
        TransformOp::DeriveScaled {
            source,
            output,
            rate_key,
            decimals,
        } => {
            let rate = reference
                .ok_or_else(|| EtlError::UnknownKey {
                    key: rate_key.clone(),
                })?
                .rate(rate_key)?;
            let values = float_values(&df, source)?;
            let derived: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|x| round_to(x * rate, *decimals)))
                .collect();
            df.with_column(Series::new(output.as_str().into(), derived))?;
            Ok(df)
        }
        TransformOp::ParseNumber {
            column,
            strip_thousands,
            on_error,
        } => {
            let parsed = parse_number_column(&df, column, *strip_thousands, *on_error)?;
            df.with_column(parsed)?;
            Ok(df)
        }
        TransformOp::Rename { from, to } => {
            df.rename(from, to.as_str().into())?;
            Ok(df)
        }
        TransformOp::Drop { column } => Ok(df.drop(column)?),
        TransformOp::Project { keep } => {
            Ok(df.select(keep.iter().map(|name| name.as_str()))?)
        }
    }
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| EtlError::MissingColumn {
        column: name.to_string(),
        detail: "required by transform plan".to_string(),
    })
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = required_column(df, name)?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn parse_number_column(
    df: &DataFrame,
    name: &str,
    strip_thousands: bool,
    on_error: CoercePolicy,
) -> Result<Series> {
    let column = required_column(df, name)?;
    let series = column.as_materialized_series();

    // Already numeric: nothing to coerce.
    if matches!(
        series.dtype(),
        DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32
    ) {
        return Ok(series.cast(&DataType::Float64)?);
    }

    let strings = series.str().map_err(|_| EtlError::Format {
        column: name.to_string(),
        value: format!("unsupported dtype {}", series.dtype()),
    })?;

    let mut values: Vec<Option<f64>> = Vec::with_capacity(strings.len());
    for cell in strings.into_iter() {
        match cell {
            None => values.push(None),
            Some(raw) => {
                let cleaned = if strip_thousands {
                    raw.replace(',', "")
                } else {
                    raw.to_string()
                };
                let cleaned = cleaned.trim().to_string();
                if cleaned.is_empty() {
                    values.push(None);
                    continue;
                }
                match cleaned.parse::<f64>() {
                    Ok(v) => values.push(Some(v)),
                    Err(_) => match on_error {
                        CoercePolicy::Fail => {
                            return Err(EtlError::Format {
                                column: name.to_string(),
                                value: raw.to_string(),
                            })
                        }
                        CoercePolicy::Null => values.push(None),
                    },
                }
            }
        }
    }
    Ok(Series::new(name.into(), values))
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
