//! Regression tests for building grid models

use super::*;
use crate::data::constants::MAX_COLUMNS;
use crate::dom::Document;
use crate::features::grid::{
    CellAttribute, GridPosition, GridSize, HorizontalAlignment, VerticalAlignment,
};
use pretty_assertions::assert_eq;

fn build(xml: &str) -> TableResult<GridModel> {
    build_with(xml, &CalsTableDefinition::default())
}

fn build_with(xml: &str, definition: &CalsTableDefinition) -> TableResult<GridModel> {
    let doc = Document::parse(xml).unwrap();
    let table = doc.document_element().unwrap();
    build_grid_model(&doc, table, definition)
}

fn body(cols: usize, rows: &str) -> String {
    format!(r#"<table><tgroup cols="{}"><tbody>{}</tbody></tgroup></table>"#, cols, rows)
}

#[test]
fn test_unspanned_table() {
    let grid = build(&body(
        3,
        "<row><entry>a</entry><entry>b</entry><entry>c</entry></row>\
         <row><entry>d</entry><entry>e</entry><entry>f</entry></row>",
    ))
    .unwrap();

    assert_eq!(grid.height(), 2);
    assert_eq!(grid.width(), 3);
    assert_eq!(grid.cells().count(), 6);
    assert_eq!(grid.header_row_count, 0);
    for row in 0..2 {
        for column in 0..3 {
            let cell = grid.cell_at(row, column).unwrap();
            assert_eq!(cell.origin, GridPosition::new(row, column));
            assert_eq!(cell.size, GridSize::new(1, 1));
        }
    }
}

#[test]
fn test_column_and_row_spans() {
    let grid = build(&body(
        3,
        r#"<row><entry morerows="1">a</entry><entry namest="column-1" nameend="column-2">b</entry></row>
           <row><entry>c</entry><entry>d</entry></row>"#,
    ))
    .unwrap();

    println!("{}", grid.render_ascii());

    let tall = grid.cell_id_at(0, 0).unwrap();
    assert_eq!(grid.cell_id_at(1, 0), Some(tall));
    let wide = grid.cell_id_at(0, 1).unwrap();
    assert_eq!(grid.cell_id_at(0, 2), Some(wide));
    assert_eq!(grid.cell(wide).unwrap().size, GridSize::new(1, 2));
    assert_eq!(grid.cell_at(1, 1).unwrap().origin, GridPosition::new(1, 1));
    assert_eq!(grid.cell_at(1, 2).unwrap().origin, GridPosition::new(1, 2));
    assert_eq!(grid.cells().count(), 4);
}

#[test]
fn test_named_colspecs() {
    let grid = build(
        r#"<table><tgroup cols="3">
            <colspec colname="a"/><colspec colname="b"/><colspec colname="c"/>
            <tbody>
              <row><entry colname="b">x</entry><entry>y</entry><entry colname="a">z</entry></row>
            </tbody></tgroup></table>"#,
    )
    .unwrap();

    let x = grid.cell_at(0, 1).unwrap();
    assert_eq!(x.data.column_name.as_deref(), Some("b"));
    let y = grid.cell_at(0, 2).unwrap();
    assert_eq!(y.origin.column, 2);
    let z = grid.cell_at(0, 0).unwrap();
    assert_eq!(z.data.column_name.as_deref(), Some("a"));
}

#[test]
fn test_sections_are_ordered() {
    let doc = Document::parse(
        r#"<table><tgroup cols="1">
            <tfoot><row><entry>foot</entry></row></tfoot>
            <tbody><row><entry>body</entry></row></tbody>
            <thead><row><entry>head</entry></row></thead>
           </tgroup></table>"#,
    )
    .unwrap();
    let table = doc.document_element().unwrap();
    let grid = build_grid_model(&doc, table, &CalsTableDefinition::default()).unwrap();

    let texts: Vec<_> = (0..3)
        .map(|r| doc.text_content(grid.cell_at(r, 0).unwrap().element.unwrap()))
        .collect();
    assert_eq!(texts, vec!["head", "body", "foot"]);
    assert_eq!(grid.header_row_count, 1);
    assert_eq!(grid.footer_row_count, 1);
    assert!(grid.is_header_row(0));
    assert!(grid.is_footer_row(2));
    let entry = grid.cell_at(1, 0).unwrap().element.unwrap();
    assert_eq!(grid.row_specifications[1].element, doc.parent(entry));
}

#[test]
fn test_missing_coordinate_is_rejected() {
    let err = build(&body(
        3,
        "<row><entry>a</entry><entry>b</entry><entry>c</entry></row>\
         <row><entry>d</entry><entry>e</entry></row>",
    ))
    .unwrap_err();
    assert_eq!(err, TableError::SpanInconsistency { row: 1, column: 2 });
    assert!(err.is_structural());
}

#[test]
fn test_overlapping_spans_are_rejected() {
    let err = build(&body(
        2,
        r#"<row><entry morerows="1">a</entry><entry>b</entry></row>
           <row><entry colname="column-0">c</entry><entry>d</entry></row>"#,
    ))
    .unwrap_err();
    assert_eq!(err, TableError::OverlappingCells { row: 1, column: 0 });
}

#[test]
fn test_row_span_past_last_row() {
    let err = build(&body(1, r#"<row><entry morerows="2">a</entry></row>"#)).unwrap_err();
    assert!(matches!(err, TableError::SpanOutOfBounds { rows: 3, .. }));
}

#[test]
fn test_unrepresentable_row_span() {
    let max = usize::MAX.to_string();
    let row = format!(r#"<row><entry morerows="{}"/></row>"#, max);
    let err = build(&body(1, &row)).unwrap_err();
    assert_eq!(err, TableError::invalid_attribute("morerows", max));

    let huge = (usize::MAX - 1).to_string();
    let row = format!(r#"<row><entry morerows="{}"/></row>"#, huge);
    let err = build(&body(1, &row)).unwrap_err();
    assert!(matches!(err, TableError::SpanOutOfBounds { rows: usize::MAX, .. }));
}

#[test]
fn test_column_count_limit() {
    let cols = (MAX_COLUMNS + 1).to_string();
    let xml = format!(r#"<table><tgroup cols="{}"><tbody/></tgroup></table>"#, cols);
    assert_eq!(build(&xml).unwrap_err(), TableError::invalid_attribute("cols", cols));
}

#[test]
fn test_too_many_entries() {
    let err = build(&body(1, "<row><entry>a</entry><entry>b</entry></row>")).unwrap_err();
    assert!(matches!(err, TableError::SpanOutOfBounds { row: 0, column: 1, .. }));
}

#[test]
fn test_unknown_column() {
    let err = build(&body(2, r#"<row><entry colname="nope">a</entry><entry>b</entry></row>"#))
        .unwrap_err();
    assert_eq!(
        err,
        TableError::UnknownColumn {
            name: "nope".to_string(),
            row: 0
        }
    );
}

#[test]
fn test_nameend_before_namest() {
    let err = build(&body(
        2,
        r#"<row><entry namest="column-1" nameend="column-0">a</entry></row>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, TableError::InvalidAttribute { .. }));
}

#[test]
fn test_missing_cols_attribute() {
    let err =
        build("<table><tgroup><tbody><row><entry/></row></tbody></tgroup></table>").unwrap_err();
    assert_eq!(err, TableError::missing_attribute("tgroup", "cols"));
}

#[test]
fn test_missing_tgroup() {
    let err = build("<table/>").unwrap_err();
    assert_eq!(err, TableError::MissingElement("tgroup".to_string()));
}

#[test]
fn test_legacy_zero_based_colnum() {
    let a = build(&format!(
        r#"<table><tgroup cols="2"><colspec colnum="1" colname="a"/><colspec colnum="2" colname="b"/>{}</tgroup></table>"#,
        r#"<tbody><row><entry colname="a">x</entry><entry colname="b">y</entry></row></tbody>"#
    ))
    .unwrap();
    let b = build(&format!(
        r#"<table><tgroup cols="2"><colspec colnum="0" colname="a"/><colspec colnum="1" colname="b"/>{}</tgroup></table>"#,
        r#"<tbody><row><entry colname="a">x</entry><entry colname="b">y</entry></row></tbody>"#
    ))
    .unwrap();
    assert_eq!(a.column_specifications, b.column_specifications);
    assert_eq!(a.column_specifications[1].column_number, 1);
}

#[test]
fn test_placeholder_columns_fill_gaps() {
    let grid = build(&format!(
        r#"<table><tgroup cols="4"><colspec colnum="3" colname="third" colwidth="2*"/>{}</tgroup></table>"#,
        body_rows(4)
    ))
    .unwrap();
    let names: Vec<_> = grid
        .column_specifications
        .iter()
        .map(|s| s.column_name.as_str())
        .collect();
    assert_eq!(names, vec!["column-0", "column-1", "third", "column-3"]);
    assert_eq!(grid.column_specifications[0].column_width, "1*");
    assert_eq!(grid.column_specifications[2].column_width, "2*");
}

fn body_rows(cols: usize) -> String {
    format!("<tbody><row>{}</row></tbody>", "<entry/>".repeat(cols))
}

#[test]
fn test_out_of_order_colnum() {
    let err = build(&format!(
        r#"<table><tgroup cols="3"><colspec colnum="2"/><colspec colnum="1"/>{}</tgroup></table>"#,
        body_rows(3)
    ))
    .unwrap_err();
    assert_eq!(
        err,
        TableError::OutOfOrderColumns {
            number: 1,
            previous: 2
        }
    );
}

#[test]
fn test_colnum_out_of_range() {
    let err = build(&format!(
        r#"<table><tgroup cols="2"><colspec colnum="3"/>{}</tgroup></table>"#,
        body_rows(2)
    ))
    .unwrap_err();
    assert_eq!(err, TableError::ColumnOutOfRange { number: 3, count: 2 });
}

#[test]
fn test_duplicate_column_names_normalized() {
    let xml = r#"<table><tgroup cols="3">
        <colspec colname="x"/><colspec colname="x"/><colspec colname="y"/>
        <tbody><row><entry namest="x" nameend="y">wide</entry></row></tbody>
        </tgroup></table>"#;
    let definition = CalsTableDefinition::default().with_normalized_column_names();
    let grid = build_with(xml, &definition).unwrap();

    let names: Vec<_> = grid
        .column_specifications
        .iter()
        .map(|s| s.column_name.clone())
        .collect();
    assert_eq!(names, vec!["column-0", "column-1", "column-2"]);
    let cell = grid.cell_at(0, 0).unwrap();
    assert_eq!(cell.size, GridSize::new(1, 3));
}

#[test]
fn test_duplicate_column_names_search_from_cursor() {
    let grid = build(
        r#"<table><tgroup cols="2">
        <colspec colname="x"/><colspec colname="x"/>
        <tbody><row><entry colname="x">a</entry><entry colname="x">b</entry></row></tbody>
        </tgroup></table>"#,
    )
    .unwrap();
    assert_eq!(grid.cell_at(0, 1).unwrap().origin.column, 1);
}

#[test]
fn test_separator_inheritance() {
    let grid = build(
        r#"<table colsep="0"><tgroup cols="3" rowsep="0" align="center">
            <colspec colname="a" colsep="1"/>
            <colspec colname="b" align="right"/>
            <tbody><row><entry rowsep="1">a</entry><entry>b</entry><entry valign="bottom">c</entry></row></tbody>
           </tgroup></table>"#,
    )
    .unwrap();

    let specs = &grid.column_specifications;
    assert!(specs[0].column_separator);
    assert!(!specs[1].column_separator);
    assert!(!specs[2].row_separator);
    assert_eq!(specs[1].alignment, Some(HorizontalAlignment::Right));
    assert_eq!(specs[2].alignment, Some(HorizontalAlignment::Center));

    let a = grid.cell_at(0, 0).unwrap();
    assert_eq!(a.data.row_separator, CellAttribute::Override(true));
    assert_eq!(a.data.column_separator, CellAttribute::Inherit);
    assert!(grid.column_separator(a));
    let c = grid.cell_at(0, 2).unwrap();
    assert_eq!(c.data.vertical_alignment, CellAttribute::Override(VerticalAlignment::Bottom));
}

#[test]
fn test_unrecognized_tokens_are_ignored() {
    let grid = build(&body(1, r#"<row><entry colsep="maybe" align="sideways">a</entry></row>"#))
        .unwrap();
    let cell = grid.cell_at(0, 0).unwrap();
    assert_eq!(cell.data.column_separator, CellAttribute::Inherit);
    assert_eq!(cell.data.horizontal_alignment, CellAttribute::Inherit);
}

#[test]
fn test_frame_attribute() {
    let framed = build(&body(1, "<row><entry/></row>")).unwrap();
    assert!(framed.borders);
    let bare = build(
        r#"<table frame="none"><tgroup cols="1"><tbody><row><entry/></row></tbody></tgroup></table>"#,
    )
    .unwrap();
    assert!(!bare.borders);
    let sides = build(
        r#"<table frame="sides"><tgroup cols="1"><tbody><row><entry/></row></tbody></tgroup></table>"#,
    )
    .unwrap();
    assert!(sides.borders);
}

#[test]
fn test_cell_widths_follow_spans() {
    let grid = build(
        r#"<table><tgroup cols="3">
            <colspec colwidth="1*"/><colspec colwidth="1*"/><colspec colwidth="2*"/>
            <tbody><row><entry namest="column-0" nameend="column-1">ab</entry><entry>c</entry></row></tbody>
           </tgroup></table>"#,
    )
    .unwrap();
    let wide = grid.cell_at(0, 0).unwrap();
    assert!((wide.data.computed_width - 0.5).abs() < 1e-9);
    assert!((grid.column_specifications[2].computed_width - 0.5).abs() < 1e-9);
}

#[test]
fn test_namespaced_table() {
    let xml = r#"<c:table xmlns:c="urn:x-cals"><c:tgroup cols="1"><c:tbody><c:row><c:entry/></c:row></c:tbody></c:tgroup></c:table>"#;
    let grid = build_with(xml, &CalsTableDefinition::with_namespace("urn:x-cals")).unwrap();
    assert_eq!(grid.height(), 1);
    assert!(build(xml).is_err());
}

#[test]
fn test_direct_rows_in_tgroup() {
    let grid = build(
        r#"<table><tgroup cols="1"><row><entry/></row><row><entry/></row></tgroup></table>"#,
    )
    .unwrap();
    assert_eq!(grid.height(), 2);
}
