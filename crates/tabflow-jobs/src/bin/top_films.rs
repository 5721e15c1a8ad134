// Scrapes the archived highly-ranked films table and persists the top
// fifty to CSV and a relational table. No numeric transformation.

use anyhow::Result;
use tabflow_core::{
    execute, ColumnRule, ColumnSpec, PipelineConfig, SourceSpec, TableContract, TargetSpec,
    WebTableSpec, WriteMode,
};

const URL: &str =
    "https://web.archive.org/web/20230902185655/https://en.everybodywiki.com/100_Most_Highly-Ranked_Films";

fn config() -> PipelineConfig {
    PipelineConfig {
        name: "top_films".to_string(),
        log_path: "films_log.txt".into(),
        sources: vec![SourceSpec::WebTable(WebTableSpec {
            url: URL.to_string(),
            table_class: "wikitable".to_string(),
            columns: vec![
                ColumnRule::new("Average_Rank", &["Average Rank", "Rank"]),
                ColumnRule::new("Film", &["Film", "Title"]),
                ColumnRule::new("Year", &["Year"]),
            ],
            row_limit: Some(50),
        })],
        contract: TableContract::new(vec![
            ColumnSpec::int("Average_Rank"),
            ColumnSpec::str("Film"),
            ColumnSpec::int("Year"),
        ]),
        transforms: vec![],
        targets: vec![
            TargetSpec::FlatFile {
                path: "top_50_films.csv".into(),
                include_index: false,
            },
            TargetSpec::Table {
                db_path: "Movies.db".into(),
                table: "Top_50".to_string(),
                mode: WriteMode::Replace,
            },
        ],
    }
}

fn main() -> Result<()> {
    tabflow_jobs::init_tracing();
    let df = execute(&config(), None)?;
    tracing::info!(rows = df.height(), "top_films run complete");
    tabflow_jobs::print_report("Top films:", &df);
    Ok(())
}
