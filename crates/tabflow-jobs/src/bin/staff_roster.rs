// Loads a headerless instructor roster into a relational table,
// runs the roster reports, then demonstrates an append-mode load of
// one additional row.

use anyhow::Result;
use polars::prelude::*;
use tabflow_core::{
    execute, ColumnSpec, FileFormat, PipelineConfig, SourceSpec, TableContract, TableStore,
    TargetSpec, WriteMode,
};

const DB_NAME: &str = "STAFF.db";
const TABLE_NAME: &str = "INSTRUCTOR";

fn config() -> PipelineConfig {
    PipelineConfig {
        name: "staff_roster".to_string(),
        log_path: "staff_log.txt".into(),
        sources: vec![SourceSpec::Files {
            pattern: "INSTRUCTOR.csv".to_string(),
            format: FileFormat::Delimited { has_header: false },
        }],
        contract: TableContract::new(vec![
            ColumnSpec::int("ID"),
            ColumnSpec::str("FNAME"),
            ColumnSpec::str("LNAME"),
            ColumnSpec::str("CITY"),
            ColumnSpec::str("CCODE"),
        ]),
        transforms: vec![],
        targets: vec![TargetSpec::Table {
            db_path: DB_NAME.into(),
            table: TABLE_NAME.to_string(),
            mode: WriteMode::Replace,
        }],
    }
}

fn new_hire() -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("ID".into(), &[100i64]).into(),
        Series::new("FNAME".into(), &["John"]).into(),
        Series::new("LNAME".into(), &["Doe"]).into(),
        Series::new("CITY".into(), &["Paris"]).into(),
        Series::new("CCODE".into(), &["FR"]).into(),
    ])
}

fn main() -> Result<()> {
    tabflow_jobs::init_tracing();
    let df = execute(&config(), None)?;
    tracing::info!(rows = df.height(), "staff_roster run complete");

    let mut store = TableStore::open(DB_NAME)?;
    tabflow_jobs::print_report(
        "All instructors:",
        &store.query(&format!("SELECT * FROM {TABLE_NAME}"))?,
    );
    tabflow_jobs::print_report(
        "First names:",
        &store.query(&format!("SELECT FNAME FROM {TABLE_NAME}"))?,
    );
    tabflow_jobs::print_report(
        "Total rows:",
        &store.query(&format!(
            "SELECT COUNT(*) AS total_rows FROM {TABLE_NAME}"
        ))?,
    );

    store.save(&new_hire()?, TABLE_NAME, WriteMode::Append)?;
    tabflow_jobs::print_report(
        "Total rows after append:",
        &store.query(&format!(
            "SELECT COUNT(*) AS total_rows FROM {TABLE_NAME}"
        ))?,
    );
    Ok(())
}
