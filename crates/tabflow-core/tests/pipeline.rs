// End-to-end runs of the extract -> transform -> load -> log sequence
// against local sources in a temporary directory.

use std::fs;

use tabflow_core::{
    execute, ColumnSpec, CoercePolicy, EtlError, FileFormat, PipelineConfig, ReferenceTable,
    SourceSpec, TableContract, TableStore, TargetSpec, TransformOp, WriteMode,
};

fn car_contract() -> TableContract {
    TableContract::new(vec![
        ColumnSpec::str("car_model"),
        ColumnSpec::int("year_of_manufacture"),
        ColumnSpec::float("price"),
        ColumnSpec::str("fuel"),
    ])
}

#[test]
fn empty_source_set_yields_schema_complete_empty_frame() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = dir.path().join("*.csv").display().to_string();

    let config = PipelineConfig {
        name: "cars".to_string(),
        log_path: dir.path().join("log.txt"),
        sources: vec![SourceSpec::Files {
            pattern,
            format: FileFormat::Delimited { has_header: true },
        }],
        contract: car_contract(),
        transforms: vec![],
        targets: vec![],
    };

    let df = execute(&config, None).unwrap();
    assert_eq!(df.height(), 0);
    assert_eq!(
        df.get_column_names_str(),
        vec!["car_model", "year_of_manufacture", "price", "fuel"]
    );
}

#[test]
fn multi_format_sources_concatenate_and_round_trip_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("prices1.csv"),
        "car_model,year_of_manufacture,price,fuel\nritz,2014,5000.5546,Petrol\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("prices2.json"),
        "{\"car_model\":\"sx4\",\"year_of_manufacture\":2013,\"price\":7089.549,\"fuel\":\"Diesel\"}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("prices3.xml"),
        "<data><row><car_model>ciaz</car_model><year_of_manufacture>2015</year_of_manufacture>\
         <price>10223.885</price><fuel>Diesel</fuel></row></data>",
    )
    .unwrap();

    let target = dir.path().join("target_data.csv");
    let file_sources = |suffix: &str, format: FileFormat| SourceSpec::Files {
        pattern: dir.path().join(suffix).display().to_string(),
        format,
    };

    let config = PipelineConfig {
        name: "cars".to_string(),
        log_path: dir.path().join("log.txt"),
        sources: vec![
            file_sources("*.csv", FileFormat::Delimited { has_header: true }),
            file_sources("*.json", FileFormat::JsonLines),
            file_sources(
                "*.xml",
                FileFormat::XmlRows {
                    row_tag: "row".to_string(),
                },
            ),
        ],
        contract: car_contract(),
        transforms: vec![TransformOp::Round {
            column: "price".to_string(),
            decimals: 2,
        }],
        targets: vec![TargetSpec::FlatFile {
            path: target.clone(),
            include_index: false,
        }],
    };

    let df = execute(&config, None).unwrap();
    assert_eq!(df.height(), 3);

    // Reload with the matching reader: same row count, same cells.
    let reload_config = PipelineConfig {
        name: "cars-reload".to_string(),
        log_path: dir.path().join("log.txt"),
        sources: vec![SourceSpec::Files {
            pattern: target.display().to_string(),
            format: FileFormat::Delimited { has_header: true },
        }],
        contract: car_contract(),
        transforms: vec![],
        targets: vec![],
    };
    let reloaded = execute(&reload_config, None).unwrap();
    assert_eq!(reloaded.height(), df.height());

    let mut prices: Vec<Option<f64>> = reloaded
        .column("price")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(
        prices,
        vec![Some(5000.55), Some(7089.55), Some(10223.89)]
    );
}

#[test]
fn relational_target_and_report_query() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("gdp.csv"),
        "Country,GDP_USD_millions\nAlpha,\"25,462,700\"\nBeta,\"89,400\"\n",
    )
    .unwrap();
    let db_path = dir.path().join("World_Economies.db");

    let config = PipelineConfig {
        name: "gdp".to_string(),
        log_path: dir.path().join("log.txt"),
        sources: vec![SourceSpec::Files {
            pattern: dir.path().join("gdp.csv").display().to_string(),
            format: FileFormat::Delimited { has_header: true },
        }],
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
        targets: vec![TargetSpec::Table {
            db_path: db_path.clone(),
            table: "Countries_by_GDP".to_string(),
            mode: WriteMode::Replace,
        }],
    };

    // Replace-mode loads are idempotent: run the whole pipeline twice.
    execute(&config, None).unwrap();
    execute(&config, None).unwrap();

    let store = TableStore::open(&db_path).unwrap();
    assert_eq!(store.row_count("Countries_by_GDP").unwrap(), 2);

    let report = store
        .query("SELECT Country FROM Countries_by_GDP WHERE GDP_USD_billions >= 100")
        .unwrap();
    assert_eq!(report.height(), 1);
    assert_eq!(
        report.column("Country").unwrap().str().unwrap().get(0),
        Some("Alpha")
    );
}

#[test]
fn currency_derivation_with_reference_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("banks.csv"),
        "Name,MC_USD_Billion\nBankX,100.004\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("exchange_rate.csv"),
        "Currency,Rate\nGBP,0.8\nEUR,0.93\n",
    )
    .unwrap();

    let rates =
        ReferenceTable::from_csv_path(dir.path().join("exchange_rate.csv"), "Currency", "Rate")
            .unwrap();

    let config = PipelineConfig {
        name: "banks".to_string(),
        log_path: dir.path().join("log.txt"),
        sources: vec![SourceSpec::Files {
            pattern: dir.path().join("banks.csv").display().to_string(),
            format: FileFormat::Delimited { has_header: true },
        }],
        contract: TableContract::new(vec![
            ColumnSpec::str("Name"),
            ColumnSpec::float("MC_USD_Billion"),
        ]),
        transforms: vec![
            TransformOp::DeriveScaled {
                source: "MC_USD_Billion".to_string(),
                output: "MC_GBP_Billion".to_string(),
                rate_key: "GBP".to_string(),
                decimals: 2,
            },
            TransformOp::DeriveScaled {
                source: "MC_USD_Billion".to_string(),
                output: "MC_EUR_Billion".to_string(),
                rate_key: "EUR".to_string(),
                decimals: 2,
            },
        ],
        targets: vec![],
    };

    let df = execute(&config, Some(&rates)).unwrap();
    assert_eq!(
        df.column("MC_GBP_Billion").unwrap().f64().unwrap().get(0),
        Some(80.0)
    );
    assert_eq!(
        df.column("MC_EUR_Billion").unwrap().f64().unwrap().get(0),
        Some(93.0)
    );

    // A currency the mapping lacks fails the run.
    let mut bad = config.clone();
    bad.transforms.push(TransformOp::DeriveScaled {
        source: "MC_USD_Billion".to_string(),
        output: "MC_INR_Billion".to_string(),
        rate_key: "INR".to_string(),
        decimals: 2,
    });
    let err = execute(&bad, Some(&rates)).unwrap_err();
    assert!(matches!(err, EtlError::UnknownKey { key } if key == "INR"));
}

#[test]
fn failed_run_keeps_partial_artifacts_and_logs_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("gdp.csv"),
        "Country,GDP_USD_millions\nAlpha,junk-value\n",
    )
    .unwrap();

    let config = PipelineConfig {
        name: "gdp".to_string(),
        log_path: dir.path().join("log.txt"),
        sources: vec![SourceSpec::Files {
            pattern: dir.path().join("gdp.csv").display().to_string(),
            format: FileFormat::Delimited { has_header: true },
        }],
        contract: TableContract::new(vec![
            ColumnSpec::str("Country"),
            ColumnSpec::str("GDP_USD_millions"),
        ]),
        transforms: vec![TransformOp::ParseNumber {
            column: "GDP_USD_millions".to_string(),
            strip_thousands: true,
            on_error: CoercePolicy::Fail,
        }],
        targets: vec![],
    };

    let err = execute(&config, None).unwrap_err();
    assert!(matches!(err, EtlError::Format { .. }));

    let log = fs::read_to_string(dir.path().join("log.txt")).unwrap();
    assert!(log.contains("gdp: Transform phase failed"));
}
