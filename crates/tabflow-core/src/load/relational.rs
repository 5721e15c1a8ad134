// crates/tabflow-core/src/load/relational.rs

use std::path::Path;

use polars::prelude::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;

use crate::config::WriteMode;
use crate::error::{EtlError, Result};

/// Embedded relational sink: one database file per pipeline, one table
/// per load. The connection is scoped to this handle and closed when
/// it drops, error path included.
pub struct TableStore {
    conn: Connection,
}

impl TableStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Persist the frame. `Replace` drops and recreates the table so
    /// loading the same frame twice leaves the original row count;
    /// `Append` inserts without any uniqueness checking.
    pub fn save(&mut self, df: &DataFrame, table: &str, mode: WriteMode) -> Result<()> {
        let tx = self.conn.transaction()?;

        if mode == WriteMode::Replace {
            tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))?;
        }

        let column_defs: Vec<String> = df
            .get_columns()
            .iter()
            .map(|col| {
                format!(
                    "{} {}",
                    quote_ident(col.name().as_str()),
                    sql_type(col.dtype())
                )
            })
            .collect();
        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(table),
            column_defs.join(", ")
        ))?;

        let column_names: Vec<String> = df
            .get_columns()
            .iter()
            .map(|col| quote_ident(col.name().as_str()))
            .collect();
        let placeholders: Vec<String> = (1..=df.width()).map(|i| format!("?{i}")).collect();
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_names.join(", "),
            placeholders.join(", ")
        );

        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in 0..df.height() {
                let mut params: Vec<SqlValue> = Vec::with_capacity(df.width());
                for col in df.get_columns() {
                    params.push(sql_value(col.get(row)?));
                }
                stmt.execute(rusqlite::params_from_iter(params))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Execute arbitrary SQL text and hand the rows back as a frame.
    pub fn query(&self, sql: &str) -> Result<DataFrame> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut columns: Vec<Vec<SqlValue>> = vec![Vec::new(); names.len()];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (idx, column) in columns.iter_mut().enumerate() {
                column.push(row.get::<_, SqlValue>(idx)?);
            }
        }

        let cols: Vec<Column> = names
            .iter()
            .zip(columns)
            .map(|(name, values)| values_to_series(name, values).into())
            .collect();
        Ok(DataFrame::new(cols)?)
    }

    pub fn row_count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Boolean => "INTEGER",
        DataType::Float32 | DataType::Float64 => "REAL",
        _ => "TEXT",
    }
}

fn sql_value(value: AnyValue<'_>) -> SqlValue {
    match value {
        AnyValue::Null => SqlValue::Null,
        AnyValue::Boolean(v) => SqlValue::Integer(v as i64),
        AnyValue::Int8(v) => SqlValue::Integer(v as i64),
        AnyValue::Int16(v) => SqlValue::Integer(v as i64),
        AnyValue::Int32(v) => SqlValue::Integer(v as i64),
        AnyValue::Int64(v) => SqlValue::Integer(v),
        AnyValue::UInt8(v) => SqlValue::Integer(v as i64),
        AnyValue::UInt16(v) => SqlValue::Integer(v as i64),
        AnyValue::UInt32(v) => SqlValue::Integer(v as i64),
        AnyValue::UInt64(v) => SqlValue::Integer(v as i64),
        AnyValue::Float32(v) => SqlValue::Real(v as f64),
        AnyValue::Float64(v) => SqlValue::Real(v),
        AnyValue::String(v) => SqlValue::Text(v.to_string()),
        AnyValue::StringOwned(v) => SqlValue::Text(v.to_string()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Rebuild a typed series from dynamically typed SQLite cells: text
/// wins over real, real over integer, so mixed columns stay lossless.
fn values_to_series(name: &str, values: Vec<SqlValue>) -> Series {
    let has_text = values
        .iter()
        .any(|v| matches!(v, SqlValue::Text(_) | SqlValue::Blob(_)));
    let has_real = values.iter().any(|v| matches!(v, SqlValue::Real(_)));
    let has_integer = values.iter().any(|v| matches!(v, SqlValue::Integer(_)));

    if has_text {
        let data: Vec<Option<String>> = values
            .into_iter()
            .map(|v| match v {
                SqlValue::Text(s) => Some(s),
                SqlValue::Integer(i) => Some(i.to_string()),
                SqlValue::Real(r) => Some(r.to_string()),
                _ => None,
            })
            .collect();
        Series::new(name.into(), data)
    } else if has_real {
        let data: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| match v {
                SqlValue::Real(r) => Some(r),
                SqlValue::Integer(i) => Some(i as f64),
                _ => None,
            })
            .collect();
        Series::new(name.into(), data)
    } else if has_integer {
        let data: Vec<Option<i64>> = values
            .into_iter()
            .map(|v| match v {
                SqlValue::Integer(i) => Some(i),
                _ => None,
            })
            .collect();
        Series::new(name.into(), data)
    } else {
        Series::full_null(name.into(), values.len(), &DataType::String)
    }
}
