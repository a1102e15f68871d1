//! Regression tests for writing grid models back to CALS

use super::*;
use crate::core::cals2grid::{build_grid_model, validate_grid};
use crate::dom::Document;
use crate::features::grid::{
    CellAttribute, GridPosition, GridSize, HorizontalAlignment, VerticalAlignment,
};
use crate::utils::error::TableError;
use pretty_assertions::assert_eq;

fn load(xml: &str) -> (Document, NodeId, GridModel) {
    let doc = Document::parse(xml).unwrap();
    let table = doc.document_element().unwrap();
    let grid = build_grid_model(&doc, table, &CalsTableDefinition::default()).unwrap();
    (doc, table, grid)
}

fn apply(doc: &mut Document, table: NodeId, grid: &mut GridModel) -> TableResult<bool> {
    apply_grid_model(grid, doc, table, &CalsTableDefinition::default())
}

fn plain_table(rows: usize, cols: usize) -> String {
    let mut xml = format!(r#"<table><tgroup cols="{}"><tbody>"#, cols);
    for r in 0..rows {
        xml.push_str("<row>");
        for c in 0..cols {
            xml.push_str(&format!("<entry>{}{}</entry>", r, c));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</tbody></tgroup></table>");
    xml
}

fn named(doc: &Document, node: NodeId, name: &str) -> Vec<NodeId> {
    doc.element_children(node)
        .into_iter()
        .filter(|&c| doc.element(c).map(|e| e.local_name.as_str()) == Some(name))
        .collect()
}

fn all_named(doc: &Document, node: NodeId, name: &str) -> Vec<NodeId> {
    doc.descendants(node)
        .into_iter()
        .filter(|&c| doc.element(c).map(|e| e.local_name.as_str()) == Some(name))
        .collect()
}

#[test]
fn test_unchanged_grid_round_trips() {
    let (mut doc, table, mut grid) = load(&plain_table(2, 3));
    let entries_before = all_named(&doc, table, "entry");

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    assert_eq!(all_named(&doc, table, "entry"), entries_before);
    let rebuilt = build_grid_model(&doc, table, &CalsTableDefinition::default()).unwrap();
    assert_eq!(rebuilt.height(), 2);
    assert_eq!(rebuilt.width(), 3);
    for (id, cell) in grid.cells() {
        let other = rebuilt.cell(id).unwrap();
        assert_eq!(other.origin, cell.origin);
        assert_eq!(other.size, cell.size);
        assert_eq!(other.element, cell.element);
    }
    let tgroup = named(&doc, table, "tgroup")[0];
    assert_eq!(named(&doc, tgroup, "colspec").len(), 3);
    assert_eq!(doc.attribute(tgroup, "cols"), Some("3"));
}

#[test]
fn test_merged_cell_serializes_as_span() {
    let (mut doc, table, mut grid) = load(&plain_table(4, 4));
    grid.merge_cells(GridPosition::new(1, 1), GridSize::new(2, 2)).unwrap();

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    let rows = all_named(&doc, table, "row");
    assert_eq!(rows.len(), 4);

    let second = named(&doc, rows[1], "entry");
    assert_eq!(second.len(), 3);
    let span = second[1];
    assert_eq!(doc.attribute(span, "namest"), Some("column-1"));
    assert_eq!(doc.attribute(span, "nameend"), Some("column-2"));
    assert_eq!(doc.attribute(span, "morerows"), Some("1"));
    assert_eq!(doc.attribute(span, "colname"), None);
    assert_eq!(doc.text_content(span), "11");

    let third = named(&doc, rows[2], "entry");
    let columns: Vec<_> = third.iter().map(|&e| doc.attribute(e, "colname")).collect();
    assert_eq!(columns, vec![Some("column-0"), Some("column-3")]);
    assert_eq!(doc.text_content(rows[2]), "2023");

    let rebuilt = build_grid_model(&doc, table, &CalsTableDefinition::default()).unwrap();
    assert_eq!(rebuilt.cell_at(2, 2).unwrap().element, Some(span));
}

#[test]
fn test_single_row_is_never_a_header() {
    let (mut doc, table, mut grid) = load(
        r#"<table><tgroup cols="1"><thead><row><entry>only</entry></row></thead></tgroup></table>"#,
    );
    assert_eq!(grid.header_row_count, 1);

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    assert_eq!(grid.header_row_count, 0);
    let tgroup = named(&doc, table, "tgroup")[0];
    assert!(named(&doc, tgroup, "thead").is_empty());
    let tbody = named(&doc, tgroup, "tbody");
    assert_eq!(tbody.len(), 1);
    assert_eq!(doc.text_content(tbody[0]), "only");
}

#[test]
fn test_moved_cell_keeps_its_entry() {
    let (mut doc, table, mut grid) = load(&plain_table(2, 2));
    let moved = grid.cell_at(0, 0).unwrap().element.unwrap();
    grid.move_cell(GridPosition::new(0, 0), GridPosition::new(1, 1)).unwrap();

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    let rows = all_named(&doc, table, "row");
    let last_row = named(&doc, rows[1], "entry");
    assert_eq!(last_row[1], moved);
    assert_eq!(doc.text_content(moved), "00");
    assert_eq!(doc.attribute(moved, "colname"), Some("column-1"));
    assert_eq!(doc.text_content(rows[0]), "1101");
}

#[test]
fn test_rejected_edit_is_discarded() {
    let (mut doc, table, mut grid) = load(&plain_table(2, 2));
    let before = doc.to_xml().unwrap();
    grid.insert_row(1).unwrap();
    let edited = grid.clone();
    doc.set_structure_check(|_, _| false);

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(false));

    assert_eq!(doc.to_xml().unwrap(), before);
    assert_eq!(grid, edited);
    assert_eq!(doc.batch_depth(), 0);
}

#[test]
fn test_minimal_structure_rejects_empty_row() {
    let (mut doc, table, mut grid) = load(&plain_table(2, 1));
    let definition = CalsTableDefinition::default();
    let check = definition.clone();
    doc.set_structure_check(move |d, t| check_minimal_structure(d, t, &check));
    assert!(check_minimal_structure(&doc, table, &definition));

    // The second row is fully covered from above and would hold no entry
    grid.merge_cells(GridPosition::new(0, 0), GridSize::new(2, 1)).unwrap();
    let before = doc.to_xml().unwrap();
    assert_eq!(apply(&mut doc, table, &mut grid), Ok(false));
    assert_eq!(doc.to_xml().unwrap(), before);
}

#[test]
fn test_inconsistent_grid_is_an_error() {
    let (mut doc, table, mut grid) = load(&plain_table(2, 2));
    let before = doc.to_xml().unwrap();
    grid.set_slot(1, 1, None);

    let err = apply(&mut doc, table, &mut grid).unwrap_err();
    assert_eq!(err, TableError::SpanInconsistency { row: 1, column: 1 });
    assert_eq!(doc.to_xml().unwrap(), before);
    assert_eq!(grid.cell_id_at(1, 1), None);
}

#[test]
fn test_cell_claiming_a_taken_coordinate_is_an_error() {
    let (mut doc, table, mut grid) = load(&plain_table(2, 2));
    let before = doc.to_xml().unwrap();
    let id = grid.cell_id_at(0, 0).unwrap();
    grid.cell_mut(id).unwrap().size = GridSize::new(1, 2);

    let overlap = TableError::OverlappingCells { row: 0, column: 1 };
    assert_eq!(validate_grid(&grid), Err(overlap.clone()));
    assert_eq!(apply(&mut doc, table, &mut grid), Err(overlap));
    assert_eq!(doc.to_xml().unwrap(), before);
    assert_eq!(doc.batch_depth(), 0);
}

#[test]
fn test_span_past_last_column_is_an_error() {
    let (mut doc, table, mut grid) = load(&plain_table(1, 2));
    let before = doc.to_xml().unwrap();
    let id = grid.cell_id_at(0, 1).unwrap();
    grid.cell_mut(id).unwrap().size = GridSize::new(1, 2);

    let err = apply(&mut doc, table, &mut grid).unwrap_err();
    assert_eq!(
        err,
        TableError::SpanOutOfBounds {
            row: 0,
            column: 1,
            rows: 1,
            columns: 2,
        }
    );
    assert_eq!(doc.to_xml().unwrap(), before);
    assert_eq!(doc.batch_depth(), 0);
    assert_eq!(grid.cell(id).unwrap().size, GridSize::new(1, 2));
}

#[test]
fn test_cell_attributes_written() {
    let (mut doc, table, mut grid) = load(
        r#"<table><tgroup cols="2"><colspec colname="a" colsep="0"/><colspec colname="b"/><tbody>
            <row><entry colname="a" align="left" outputclass="x">a</entry><entry colname="b">b</entry></row>
           </tbody></tgroup></table>"#,
    );
    let first = grid.cell_id_at(0, 0).unwrap();
    let second = grid.cell_id_at(0, 1).unwrap();
    {
        let cell = grid.cell_mut(first).unwrap();
        cell.data.horizontal_alignment = CellAttribute::Inherit;
        cell.data.output_class = CellAttribute::Inherit;
    }
    {
        let cell = grid.cell_mut(second).unwrap();
        cell.data.vertical_alignment = CellAttribute::Override(VerticalAlignment::Middle);
        cell.data.horizontal_alignment = CellAttribute::Override(HorizontalAlignment::Center);
        cell.data.row_separator = CellAttribute::Override(false);
    }

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    let a = grid.cell(first).unwrap().element.unwrap();
    assert_eq!(doc.attribute(a, "align"), None);
    assert_eq!(doc.attribute(a, "outputclass"), None);
    assert_eq!(doc.attribute(a, "colsep"), Some("0"));
    assert_eq!(doc.attribute(a, "rowsep"), Some("1"));

    let b = grid.cell(second).unwrap().element.unwrap();
    assert_eq!(doc.attribute(b, "valign"), Some("middle"));
    assert_eq!(doc.attribute(b, "align"), Some("center"));
    assert_eq!(doc.attribute(b, "rowsep"), Some("0"));
    assert_eq!(doc.attribute(b, "colname"), Some("b"));
}

#[test]
fn test_inserted_column_gets_new_entries() {
    let (mut doc, table, mut grid) = load(&plain_table(2, 2));
    grid.insert_column(1).unwrap();
    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    let tgroup = named(&doc, table, "tgroup")[0];
    assert_eq!(doc.attribute(tgroup, "cols"), Some("3"));
    let colspecs = named(&doc, tgroup, "colspec");
    let numbers: Vec<_> = colspecs.iter().map(|&c| doc.attribute(c, "colnum")).collect();
    assert_eq!(numbers, vec![Some("1"), Some("2"), Some("3")]);

    for row in all_named(&doc, table, "row") {
        let entries = named(&doc, row, "entry");
        assert_eq!(entries.len(), 3);
        assert_eq!(doc.text_content(entries[1]), "");
        assert_eq!(doc.attribute(entries[1], "colname"), Some("column-2"));
    }
    for (_, cell) in grid.cells() {
        assert!(cell.element.is_some());
    }
}

#[test]
fn test_deleted_row_is_removed() {
    let (mut doc, table, mut grid) = load(&plain_table(3, 1));
    let rows = all_named(&doc, table, "row");
    grid.delete_row(1).unwrap();

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    assert_eq!(all_named(&doc, table, "row"), vec![rows[0], rows[2]]);
    assert!(doc.parent(rows[1]).is_none());
}

#[test]
fn test_footer_section_created_in_order() {
    let (mut doc, table, mut grid) = load(&plain_table(3, 1));
    grid.header_row_count = 1;
    grid.footer_row_count = 1;

    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));

    let tgroup = named(&doc, table, "tgroup")[0];
    let sections: Vec<_> = doc
        .element_children(tgroup)
        .into_iter()
        .map(|c| doc.element(c).unwrap().local_name.clone())
        .collect();
    assert_eq!(sections, vec!["colspec", "thead", "tfoot", "tbody"]);
    assert_eq!(doc.text_content(named(&doc, tgroup, "tfoot")[0]), "20");

    let rebuilt = build_grid_model(&doc, table, &CalsTableDefinition::default()).unwrap();
    assert_eq!(rebuilt.header_row_count, 1);
    assert_eq!(rebuilt.footer_row_count, 1);
}

#[test]
fn test_frame_written_only_when_changed() {
    let (mut doc, table, mut grid) = load(
        r#"<table frame="topbot"><tgroup cols="1"><tbody><row><entry/></row></tbody></tgroup></table>"#,
    );
    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));
    assert_eq!(doc.attribute(table, "frame"), Some("topbot"));

    grid.borders = false;
    assert_eq!(apply(&mut doc, table, &mut grid), Ok(true));
    assert_eq!(doc.attribute(table, "frame"), Some("none"));
}

#[test]
fn test_created_nodes_use_namespace() {
    let xml = r#"<c:table xmlns:c="urn:x-cals"><c:tgroup cols="1"><c:tbody><c:row><c:entry/></c:row></c:tbody></c:tgroup></c:table>"#;
    let definition = CalsTableDefinition::with_namespace("urn:x-cals");
    let mut doc = Document::parse(xml).unwrap();
    let table = doc.document_element().unwrap();
    let mut grid = build_grid_model(&doc, table, &definition).unwrap();
    grid.insert_row(1).unwrap();

    assert_eq!(apply_grid_model(&mut grid, &mut doc, table, &definition), Ok(true));

    let created = grid.row_specifications[1].element.unwrap();
    assert_eq!(doc.element(created).unwrap().namespace.as_deref(), Some("urn:x-cals"));
    let out = doc.to_xml().unwrap();
    assert!(out.contains("<c:row>"), "{}", out);
}
