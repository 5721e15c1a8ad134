// crates/tabflow-core/src/load/flat_file.rs

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::error::{EtlError, Result};

/// Write the whole frame as delimited text, overwriting any existing
/// file. `include_index` prepends a positional row-index column.
pub fn write_flat_file(df: &DataFrame, path: &Path, include_index: bool) -> Result<()> {
    let mut out = df.clone();
    if include_index {
        let index: Vec<i64> = (0..df.height() as i64).collect();
        out.insert_column(0, Series::new("index".into(), index))?;
    }

    let file = File::create(path).map_err(|err| EtlError::Storage {
        detail: format!("cannot create {}: {err}", path.display()),
    })?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut out)
        .map_err(|err| EtlError::Storage {
            detail: format!("cannot write {}: {err}", path.display()),
        })
}
