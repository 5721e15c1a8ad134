// crates/tabflow-core/src/extract/json_lines.rs

use polars::prelude::*;

use crate::contract::{CellBuffer, TableContract};
use crate::error::{EtlError, Result};

/// Parse a line-delimited JSON source: one object per line, fields
/// looked up by contract column name. A field absent from an object
/// becomes null; a malformed line fails the run.
pub fn parse(content: &str, contract: &TableContract, source_name: &str) -> Result<DataFrame> {
    let mut buffers: Vec<CellBuffer> = contract
        .columns()
        .iter()
        .map(|spec| CellBuffer::for_kind(spec.kind))
        .collect();

    for (line_index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|err| EtlError::Parse {
                source_name: source_name.to_string(),
                detail: format!("line {}: {err}", line_index + 1),
            })?;
        for (spec, buffer) in contract.columns().iter().zip(buffers.iter_mut()) {
            buffer.push_json(value.get(&spec.name));
        }
    }

    let cols: Vec<Column> = contract
        .columns()
        .iter()
        .zip(buffers)
        .map(|(spec, buffer)| buffer.into_series(&spec.name).into())
        .collect();
    Ok(DataFrame::new(cols)?)
}
