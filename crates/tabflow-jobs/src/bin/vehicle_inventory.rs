// Consolidates used-car price files (CSV, line-delimited JSON, XML)
// from the working directory into one flat file, with prices rounded
// to two decimals.

use anyhow::Result;
use tabflow_core::{
    execute, ColumnSpec, FileFormat, PipelineConfig, SourceSpec, TableContract, TargetSpec,
    TransformOp,
};

fn config() -> PipelineConfig {
    PipelineConfig {
        name: "vehicle_inventory".to_string(),
        log_path: "etl_log.txt".into(),
        sources: vec![
            SourceSpec::Files {
                pattern: "*.csv".to_string(),
                format: FileFormat::Delimited { has_header: true },
            },
            SourceSpec::Files {
                pattern: "*.json".to_string(),
                format: FileFormat::JsonLines,
            },
            SourceSpec::Files {
                pattern: "*.xml".to_string(),
                format: FileFormat::XmlRows {
                    row_tag: "row".to_string(),
                },
            },
        ],
        contract: TableContract::new(vec![
            ColumnSpec::str("car_model"),
            ColumnSpec::int("year_of_manufacture"),
            ColumnSpec::float("price"),
            ColumnSpec::str("fuel"),
        ]),
        transforms: vec![TransformOp::Round {
            column: "price".to_string(),
            decimals: 2,
        }],
        targets: vec![TargetSpec::FlatFile {
            path: "target_data.txt".into(),
            include_index: true,
        }],
    }
}

fn main() -> Result<()> {
    tabflow_jobs::init_tracing();
    let df = execute(&config(), None)?;
    tracing::info!(rows = df.height(), "vehicle_inventory run complete");
    tabflow_jobs::print_report("Transformed data:", &df);
    Ok(())
}
