// crates/tabflow-core/src/config.rs
//
// Everything script-specific lives here as data: where to read, what
// the columns are, which transforms to apply, where to write. A
// pipeline binary builds one immutable `PipelineConfig` in `main` and
// hands it to the runner; nothing is ambient module state.

use std::path::PathBuf;

use crate::contract::TableContract;
use crate::transform::TransformOp;

/// How rows are laid out inside a local source file.
#[derive(Debug, Clone)]
pub enum FileFormat {
    /// Comma-separated; `has_header = false` means the contract names
    /// the columns positionally.
    Delimited { has_header: bool },
    /// One JSON object per line.
    JsonLines,
    /// One `<row_tag>...</row_tag>` element per record, fields as child
    /// elements named after the contract columns.
    XmlRows { row_tag: String },
}

/// Declarative header-to-contract mapping for a scraped table: the
/// first header cell containing any of `matchers` (substring match)
/// supplies the values for `output`. Evaluated once at extract time;
/// no match is a hard `MissingColumn` failure.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub output: String,
    pub matchers: Vec<String>,
}

impl ColumnRule {
    pub fn new(output: &str, matchers: &[&str]) -> Self {
        Self {
            output: output.to_string(),
            matchers: matchers.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebTableSpec {
    pub url: String,
    /// Substring the table's `class` attribute must contain.
    pub table_class: String,
    pub columns: Vec<ColumnRule>,
    /// Keep only the first N data rows, when set.
    pub row_limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum SourceSpec {
    /// Glob-enumerated local files, concatenated in enumeration order.
    Files { pattern: String, format: FileFormat },
    /// One table scraped out of a remote document.
    WebTable(WebTableSpec),
}

/// Whether a relational load replaces the table wholesale or appends
/// rows without any uniqueness checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Replace,
    Append,
}

#[derive(Debug, Clone)]
pub enum TargetSpec {
    FlatFile {
        path: PathBuf,
        include_index: bool,
    },
    Table {
        db_path: PathBuf,
        table: String,
        mode: WriteMode,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub name: String,
    pub log_path: PathBuf,
    pub sources: Vec<SourceSpec>,
    pub contract: TableContract,
    pub transforms: Vec<TransformOp>,
    pub targets: Vec<TargetSpec>,
}
