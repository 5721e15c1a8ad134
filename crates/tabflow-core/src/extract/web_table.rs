// crates/tabflow-core/src/extract/web_table.rs
//
// Extract one table out of a fetched document. The table is located by
// class-attribute selector, header cells are mapped to contract
// columns by explicit declarative rules, and data cells are read
// positionally. Rule evaluation happens once, against the resolved
// header grid (every leading all-<th> row, with rowspan/colspan laid
// out into data-cell positions); an unmatched rule is a hard
// MissingColumn failure rather than a null that would surface rows
// later.

use std::collections::HashMap;

use polars::prelude::*;

use crate::config::WebTableSpec;
use crate::contract::{CellBuffer, TableContract};
use crate::error::{EtlError, Result};
use crate::markup;

const EMPTY_CELL_PLACEHOLDER: &str = "\u{2014}"; // em dash used by the source tables

pub fn parse_web_table(
    html: &str,
    spec: &WebTableSpec,
    contract: &TableContract,
) -> Result<DataFrame> {
    let table = markup::tag_blocks(html, "table")
        .into_iter()
        .find(|block| markup::attr_contains(block.attrs, "class", &spec.table_class))
        .ok_or_else(|| EtlError::Parse {
            source_name: spec.url.clone(),
            detail: format!("no <table> with class containing '{}'", spec.table_class),
        })?;

    let rows = markup::tag_blocks(table.inner, "tr");
    let header_len = rows
        .iter()
        .take_while(|row| is_header_row(row.inner))
        .count();
    if header_len == 0 {
        return Err(EtlError::Parse {
            source_name: spec.url.clone(),
            detail: "table has no header row".to_string(),
        });
    }
    let (header_rows, data_rows) = rows.split_at(header_len);

    let headers = header_columns(header_rows);
    let mapping = map_columns(spec, &headers)?;

    let mut buffers: Vec<CellBuffer> = contract
        .columns()
        .iter()
        .map(|s| CellBuffer::for_kind(s.kind))
        .collect();

    let mut kept = 0usize;
    for row in data_rows {
        if let Some(limit) = spec.row_limit {
            if kept >= limit {
                break;
            }
        }
        let cells = markup::row_cells(row.inner);
        if !is_data_row(&cells, &mapping) {
            continue;
        }
        for (spec_col, buffer) in contract.columns().iter().zip(buffers.iter_mut()) {
            let text = mapping
                .get(spec_col.name.as_str())
                .and_then(|idx| cells.get(*idx))
                .map(String::as_str);
            buffer.push_text(text);
        }
        kept += 1;
    }

    let cols: Vec<Column> = contract
        .columns()
        .iter()
        .zip(buffers)
        .map(|(s, buffer)| buffer.into_series(&s.name).into())
        .collect();
    Ok(DataFrame::new(cols)?)
}

fn is_header_row(row_inner: &str) -> bool {
    let cells = markup::row_cell_blocks(row_inner);
    !cells.is_empty() && cells.iter().all(|cell| cell.header)
}

/// Lay the leading header rows out into data-cell positions, honoring
/// rowspan and colspan, and join the texts that stack over each
/// position. A two-row header of "IMF" (colspan 2) over
/// "Estimate"/"Year" yields "IMF Estimate" and "IMF Year".
fn header_columns(header_rows: &[markup::TagBlock<'_>]) -> Vec<String> {
    let mut columns: Vec<Vec<String>> = Vec::new();
    let mut occupied: Vec<usize> = Vec::new(); // remaining rowspan per position
    for row in header_rows {
        let mut pos = 0usize;
        for cell in markup::row_cell_blocks(row.inner) {
            while occupied.get(pos).copied().unwrap_or(0) > 0 {
                pos += 1;
            }
            let rowspan = span_attr(cell.attrs, "rowspan");
            let colspan = span_attr(cell.attrs, "colspan");
            let text = markup::cell_text(cell.inner);
            for slot in pos..pos + colspan {
                if columns.len() <= slot {
                    columns.resize_with(slot + 1, Vec::new);
                    occupied.resize(slot + 1, 0);
                }
                if !text.is_empty() {
                    columns[slot].push(text.clone());
                }
                occupied[slot] = rowspan;
            }
            pos += colspan;
        }
        for remaining in occupied.iter_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }
    columns.into_iter().map(|parts| parts.join(" ")).collect()
}

fn span_attr(attrs: &str, name: &str) -> usize {
    markup::attr_value(attrs, name)
        .and_then(|value| value.parse().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

/// Evaluate every column rule against the resolved headers once.
/// Substring matching mirrors how the source pages title their columns
/// ("Market cap (US$ billion)" matches "Market cap").
fn map_columns<'a>(spec: &'a WebTableSpec, headers: &[String]) -> Result<HashMap<&'a str, usize>> {
    let mut mapping = HashMap::new();
    for rule in &spec.columns {
        let index = headers.iter().position(|header| {
            rule.matchers.iter().any(|matcher| header.contains(matcher))
        });
        match index {
            Some(idx) => {
                mapping.insert(rule.output.as_str(), idx);
            }
            None => {
                return Err(EtlError::MissingColumn {
                    column: rule.output.clone(),
                    detail: format!(
                        "no header cell matched {:?}; headers were {:?}",
                        rule.matchers, headers
                    ),
                });
            }
        }
    }
    Ok(mapping)
}

/// Section-header and placeholder rows are skipped: every mapped cell
/// must exist and carry a real value.
fn is_data_row(cells: &[String], mapping: &HashMap<&str, usize>) -> bool {
    if cells.is_empty() {
        return false;
    }
    mapping.values().all(|idx| {
        cells
            .get(*idx)
            .map(|cell| !cell.is_empty() && cell != EMPTY_CELL_PLACEHOLDER)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnRule;
    use crate::contract::ColumnSpec;

    fn banks_spec(limit: Option<usize>) -> WebTableSpec {
        WebTableSpec {
            url: "https://example.test/banks".to_string(),
            table_class: "wikitable".to_string(),
            columns: vec![
                ColumnRule::new("Name", &["Name", "Bank"]),
                ColumnRule::new("MC_USD_Billion", &["Market cap", "US$ billion"]),
            ],
            row_limit: limit,
        }
    }

    fn banks_contract() -> TableContract {
        TableContract::new(vec![
            ColumnSpec::str("Name"),
            ColumnSpec::float("MC_USD_Billion"),
        ])
    }

    const BANKS_HTML: &str = r#"
        <html><body>
        <table class="sortable wikitable">
          <tr><th>Rank</th><th>Bank name</th><th>Market cap (US$ billion)</th></tr>
          <tr><td>1</td><td><a href="/w/JPM">JPMorgan Chase</a></td><td>432.92</td></tr>
          <tr><td>2</td><td>Bank of America</td><td>231.52</td></tr>
          <tr><td>3</td><td>ICBC</td><td>&#8212;</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn maps_headers_and_extracts_rows() {
        let html = BANKS_HTML.replace("&#8212;", "194.56");
        let df = parse_web_table(&html, &banks_spec(None), &banks_contract()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(
            df.column("Name").unwrap().str().unwrap().get(0),
            Some("JPMorgan Chase")
        );
        assert_eq!(
            df.column("MC_USD_Billion").unwrap().f64().unwrap().get(1),
            Some(231.52)
        );
    }

    #[test]
    fn placeholder_rows_are_skipped() {
        let html = BANKS_HTML.replace("&#8212;", "\u{2014}");
        let df = parse_web_table(&html, &banks_spec(None), &banks_contract()).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn entity_encoded_placeholder_rows_are_skipped() {
        // Same row, em dash left as the raw character reference the
        // pages actually serve.
        let df = parse_web_table(BANKS_HTML, &banks_spec(None), &banks_contract()).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn two_row_headers_resolve_through_spans() {
        let html = r#"
            <table class="wikitable">
              <tr>
                <th rowspan="2">Country/Territory</th>
                <th rowspan="2">UN region</th>
                <th colspan="2">IMF</th>
                <th colspan="2">World Bank</th>
              </tr>
              <tr><th>Estimate</th><th>Year</th><th>Estimate</th><th>Year</th></tr>
              <tr><td>United States</td><td>Americas</td><td>26,854,599</td><td>2023</td><td>25,462,700</td><td>2022</td></tr>
              <tr><td>China</td><td>Asia</td><td>19,373,586</td><td>2023</td><td>17,963,171</td><td>2022</td></tr>
            </table>"#;
        let spec = WebTableSpec {
            url: "https://example.test/gdp".to_string(),
            table_class: "wikitable".to_string(),
            columns: vec![
                ColumnRule::new("Country", &["Country", "Territory"]),
                ColumnRule::new("GDP_USD_millions", &["Estimate", "GDP"]),
            ],
            row_limit: None,
        };
        let contract = TableContract::new(vec![
            ColumnSpec::str("Country"),
            ColumnSpec::str("GDP_USD_millions"),
        ]);
        let df = parse_web_table(html, &spec, &contract).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column("Country").unwrap().str().unwrap().get(0),
            Some("United States")
        );
        // First matching position is the IMF estimate, not the year.
        assert_eq!(
            df.column("GDP_USD_millions").unwrap().str().unwrap().get(1),
            Some("19,373,586")
        );
    }

    #[test]
    fn row_limit_truncates() {
        let html = BANKS_HTML.replace("&#8212;", "194.56");
        let df = parse_web_table(&html, &banks_spec(Some(1)), &banks_contract()).unwrap();
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn unmatched_rule_is_missing_column() {
        let spec = WebTableSpec {
            columns: vec![ColumnRule::new("Founded", &["Founded", "Year established"])],
            ..banks_spec(None)
        };
        let err = parse_web_table(BANKS_HTML, &spec, &banks_contract()).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { column, .. } if column == "Founded"));
    }

    #[test]
    fn wrong_class_is_parse_error() {
        let html = BANKS_HTML.replace("sortable wikitable", "plain");
        let err = parse_web_table(&html, &banks_spec(None), &banks_contract()).unwrap_err();
        assert!(matches!(err, EtlError::Parse { .. }));
    }
}
