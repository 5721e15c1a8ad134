// Scrapes the archived list of countries by nominal GDP, converts the
// GDP column from millions to billions of USD, and persists the result
// to a flat file and a relational table, then reports every economy at
// or above 100 billion.

use anyhow::Result;
use tabflow_core::{
    execute, CoercePolicy, ColumnRule, ColumnSpec, PipelineConfig, SourceSpec, TableContract,
    TableStore, TargetSpec, TransformOp, WebTableSpec, WriteMode,
};

const URL: &str = "https://web.archive.org/web/20230902185326/https://en.wikipedia.org/wiki/List_of_countries_by_GDP_%28nominal%29";
const DB_NAME: &str = "World_Economies.db";
const TABLE_NAME: &str = "Countries_by_GDP";

fn config() -> PipelineConfig {
    PipelineConfig {
        name: "country_gdp".to_string(),
        log_path: "etl_project_log.txt".into(),
        sources: vec![SourceSpec::WebTable(WebTableSpec {
            url: URL.to_string(),
            table_class: "wikitable".to_string(),
            columns: vec![
                ColumnRule::new("Country", &["Country", "Territory"]),
                ColumnRule::new("GDP_USD_millions", &["Estimate", "GDP"]),
            ],
            row_limit: None,
        })],
        contract: TableContract::new(vec![
            ColumnSpec::str("Country"),
            ColumnSpec::str("GDP_USD_millions"),
        ]),
        transforms: vec![
            TransformOp::ParseNumber {
                column: "GDP_USD_millions".to_string(),
                strip_thousands: true,
                on_error: CoercePolicy::Fail,
            },
            TransformOp::Scale {
                column: "GDP_USD_millions".to_string(),
                factor: 1.0 / 1000.0,
                decimals: 2,
            },
            TransformOp::Rename {
                from: "GDP_USD_millions".to_string(),
                to: "GDP_USD_billions".to_string(),
            },
        ],
        targets: vec![
            TargetSpec::FlatFile {
                path: "Countries_by_GDP.csv".into(),
                include_index: false,
            },
            TargetSpec::Table {
                db_path: DB_NAME.into(),
                table: TABLE_NAME.to_string(),
                mode: WriteMode::Replace,
            },
        ],
    }
}

fn main() -> Result<()> {
    tabflow_jobs::init_tracing();
    let df = execute(&config(), None)?;
    tracing::info!(rows = df.height(), "country_gdp run complete");

    let store = TableStore::open(DB_NAME)?;
    let report = store.query(&format!(
        "SELECT * FROM {TABLE_NAME} WHERE GDP_USD_billions >= 100"
    ))?;
    tabflow_jobs::print_report("Economies of 100 billion USD or more:", &report);
    Ok(())
}
