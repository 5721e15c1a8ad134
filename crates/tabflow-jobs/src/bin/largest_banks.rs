// Scrapes the archived list of the world's largest banks, derives
// GBP/EUR/INR market-cap columns from a local exchange-rate file, and
// persists to CSV plus a relational table before running the report
// queries.

use anyhow::Result;
use tabflow_core::{
    execute, CoercePolicy, ColumnRule, ColumnSpec, PipelineConfig, ReferenceTable, SourceSpec,
    TableContract, TableStore, TargetSpec, TransformOp, WebTableSpec, WriteMode,
};

const URL: &str = "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";
const RATES_PATH: &str = "exchange_rate.csv";
const DB_NAME: &str = "Banks.db";
const TABLE_NAME: &str = "Largest_banks";

fn derive(output: &str, rate_key: &str) -> TransformOp {
    TransformOp::DeriveScaled {
        source: "MC_USD_Billion".to_string(),
        output: output.to_string(),
        rate_key: rate_key.to_string(),
        decimals: 2,
    }
}

fn config() -> PipelineConfig {
    PipelineConfig {
        name: "largest_banks".to_string(),
        log_path: "code_log.txt".into(),
        sources: vec![SourceSpec::WebTable(WebTableSpec {
            url: URL.to_string(),
            table_class: "wikitable".to_string(),
            columns: vec![
                ColumnRule::new("Name", &["Name", "Bank"]),
                ColumnRule::new("MC_USD_Billion", &["Market cap", "US$ billion"]),
            ],
            row_limit: Some(10),
        })],
        contract: TableContract::new(vec![
            ColumnSpec::str("Name"),
            ColumnSpec::float("MC_USD_Billion"),
        ]),
        transforms: vec![
            // This deployment coerces unparseable market caps to null
            // instead of failing the run.
            TransformOp::ParseNumber {
                column: "MC_USD_Billion".to_string(),
                strip_thousands: true,
                on_error: CoercePolicy::Null,
            },
            derive("MC_GBP_Billion", "GBP"),
            derive("MC_EUR_Billion", "EUR"),
            derive("MC_INR_Billion", "INR"),
        ],
        targets: vec![
            TargetSpec::FlatFile {
                path: "Largest_banks_data.csv".into(),
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
    let rates = ReferenceTable::from_csv_path(RATES_PATH, "Currency", "Rate")?;
    let df = execute(&config(), Some(&rates))?;
    tracing::info!(rows = df.height(), "largest_banks run complete");

    let store = TableStore::open(DB_NAME)?;
    tabflow_jobs::print_report(
        "All banks:",
        &store.query(&format!("SELECT * FROM {TABLE_NAME}"))?,
    );
    tabflow_jobs::print_report(
        "Average market cap in GBP billions:",
        &store.query(&format!(
            "SELECT AVG(MC_GBP_Billion) AS Avg_GBP FROM {TABLE_NAME}"
        ))?,
    );
    tabflow_jobs::print_report(
        "Largest bank by INR market cap:",
        &store.query(&format!(
            "SELECT Name, MAX(MC_INR_Billion) AS Max_INR FROM {TABLE_NAME}"
        ))?,
    );
    Ok(())
}
