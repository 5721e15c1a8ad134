pub mod config;
pub mod contract;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod load;
pub mod markup;
pub mod progress;
pub mod runner;
pub mod transform;

pub use config::{
    ColumnRule, FileFormat, PipelineConfig, SourceSpec, TargetSpec, WebTableSpec, WriteMode,
};
pub use contract::{ColumnKind, ColumnSpec, TableContract};
pub use error::{EtlError, Result};
pub use load::TableStore;
pub use progress::ProgressLog;
pub use runner::{execute, PipelineRunner, PipelineState};
pub use transform::{CoercePolicy, ReferenceTable, TransformOp};
