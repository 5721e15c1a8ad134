// crates/tabflow-core/src/extract/mod.rs
//
// The extract stage: turn every configured source into one frame that
// satisfies the pipeline's column contract. Local files are enumerated
// by glob pattern and concatenated in enumeration order (the order of
// ties within a glob is not guaranteed; nothing downstream may assert
// on absolute row order across sources). Zero matching sources is a
// valid, empty result — never an error.

mod delimited;
mod json_lines;
mod web_table;
mod xml_rows;

pub use web_table::parse_web_table;

use polars::prelude::DataFrame;
use tracing::debug;

use crate::config::{FileFormat, SourceSpec};
use crate::contract::TableContract;
use crate::error::Result;
use crate::fetch;

/// Extract all configured sources into a single contract-conformant
/// frame.
pub fn run(sources: &[SourceSpec], contract: &TableContract) -> Result<DataFrame> {
    let mut combined = contract.empty_frame()?;
    for source in sources {
        let df = match source {
            SourceSpec::Files { pattern, format } => from_files(pattern, format, contract)?,
            SourceSpec::WebTable(spec) => {
                let body = fetch::fetch_document(&spec.url)?;
                parse_web_table(&body, spec, contract)?
            }
        };
        combined.vstack_mut(&df)?;
    }
    debug!(rows = combined.height(), "extract stage complete");
    Ok(combined)
}

fn from_files(pattern: &str, format: &FileFormat, contract: &TableContract) -> Result<DataFrame> {
    let mut combined = contract.empty_frame()?;
    for entry in glob::glob(pattern)? {
        let path = entry.map_err(|err| err.into_error())?;
        if !path.is_file() {
            continue;
        }
        let source_name = path.display().to_string();
        let content = std::fs::read_to_string(&path)?;
        let df = match format {
            FileFormat::Delimited { has_header } => {
                delimited::parse(&content, *has_header, contract, &source_name)?
            }
            FileFormat::JsonLines => json_lines::parse(&content, contract, &source_name)?,
            FileFormat::XmlRows { row_tag } => {
                xml_rows::parse(&content, row_tag, contract)?
            }
        };
        debug!(file = %source_name, rows = df.height(), "extracted source file");
        combined.vstack_mut(&df)?;
    }
    Ok(combined)
}
