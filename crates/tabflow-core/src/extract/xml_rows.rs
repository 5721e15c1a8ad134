// crates/tabflow-core/src/extract/xml_rows.rs

use polars::prelude::*;

use crate::contract::{CellBuffer, TableContract};
use crate::error::Result;
use crate::markup;

/// Parse a hierarchical markup source laid out as repeated
/// `<row_tag>` elements with one child element per field. Fields the
/// contract declares but a row lacks become null.
pub fn parse(content: &str, row_tag: &str, contract: &TableContract) -> Result<DataFrame> {
    let mut buffers: Vec<CellBuffer> = contract
        .columns()
        .iter()
        .map(|spec| CellBuffer::for_kind(spec.kind))
        .collect();

    for row in markup::tag_blocks(content, row_tag) {
        for (spec, buffer) in contract.columns().iter().zip(buffers.iter_mut()) {
            let text = markup::child_text(row.inner, &spec.name).map(markup::cell_text);
            buffer.push_text(text.as_deref());
        }
    }

    let cols: Vec<Column> = contract
        .columns()
        .iter()
        .zip(buffers)
        .map(|(spec, buffer)| buffer.into_series(&spec.name).into())
        .collect();
    Ok(DataFrame::new(cols)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ColumnSpec;

    fn contract() -> TableContract {
        TableContract::new(vec![
            ColumnSpec::str("car_model"),
            ColumnSpec::int("year_of_manufacture"),
            ColumnSpec::float("price"),
            ColumnSpec::str("fuel"),
        ])
    }

    #[test]
    fn parses_row_elements() {
        let content = "<data>\
            <row><car_model>alto 800</car_model><year_of_manufacture>2017</year_of_manufacture><price>4253.73</price><fuel>Petrol</fuel></row>\
            <row><car_model>ciaz</car_model><year_of_manufacture>2015</year_of_manufacture><price>10223.88</price><fuel>Diesel</fuel></row>\
            </data>";
        let df = parse(content, "row", &contract()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.column("car_model").unwrap().str().unwrap().get(1),
            Some("ciaz")
        );
        assert_eq!(
            df.column("price").unwrap().f64().unwrap().get(0),
            Some(4253.73)
        );
    }

    #[test]
    fn missing_fields_become_null() {
        let content = "<data><row><car_model>ritz</car_model></row></data>";
        let df = parse(content, "row", &contract()).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("price").unwrap().null_count(), 1);
    }

    #[test]
    fn no_rows_yields_empty_frame_with_columns() {
        let df = parse("<data></data>", "row", &contract()).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 4);
    }
}
