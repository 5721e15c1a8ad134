// crates/tabflow-core/src/load/mod.rs
//
// Persistence sinks. Writes are wholesale: the flat-file sink
// overwrites its target, the relational sink either replaces a table's
// full contents or appends without deduplication. There is no
// partial-write recovery; a failed run is re-run from extraction.

mod flat_file;
mod relational;

pub use flat_file::write_flat_file;
pub use relational::TableStore;

use polars::prelude::DataFrame;
use tracing::debug;

use crate::config::TargetSpec;
use crate::error::Result;

/// Load the frame into every configured target, in order.
pub fn run(df: &DataFrame, targets: &[TargetSpec]) -> Result<()> {
    for target in targets {
        match target {
            TargetSpec::FlatFile {
                path,
                include_index,
            } => {
                write_flat_file(df, path, *include_index)?;
                debug!(path = %path.display(), rows = df.height(), "wrote flat file");
            }
            TargetSpec::Table {
                db_path,
                table,
                mode,
            } => {
                let mut store = TableStore::open(db_path)?;
                store.save(df, table, *mode)?;
                debug!(table = %table, rows = df.height(), "wrote relational table");
            }
        }
    }
    Ok(())
}
