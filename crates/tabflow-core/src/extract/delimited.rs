// crates/tabflow-core/src/extract/delimited.rs

use std::io::Cursor;

use polars::prelude::*;

use crate::contract::TableContract;
use crate::error::{EtlError, Result};

/// Parse a comma-separated source. With a header row the columns are
/// matched by name against the contract; without one the contract
/// names them positionally.
pub fn parse(
    content: &str,
    has_header: bool,
    contract: &TableContract,
    source_name: &str,
) -> Result<DataFrame> {
    let cursor = Cursor::new(content.as_bytes());
    let df = CsvReadOptions::default()
        .with_has_header(has_header)
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(|err| EtlError::Parse {
            source_name: source_name.to_string(),
            detail: err.to_string(),
        })?;

    if has_header {
        contract.conform(&df)
    } else {
        contract.conform_positional(&df, source_name)
    }
}
