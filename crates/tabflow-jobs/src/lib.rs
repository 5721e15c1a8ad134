// crates/tabflow-jobs/src/lib.rs
//
// Shared glue for the pipeline binaries: console subscriber setup and
// report printing. Reporting stays out of the transform stage so the
// transforms remain pure and testable.

use polars::prelude::DataFrame;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

/// Print a report frame to stdout under a short title.
pub fn print_report(title: &str, df: &DataFrame) {
    println!("\n{title}");
    println!("{df}");
}
