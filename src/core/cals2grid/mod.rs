//! CALS table to grid model
//!
//! Reads a CALS `table` element into a dense [`GridModel`]:
//!
//! ```text
//! table -> tgroup -> colspecs ─> column specifications
//!                 └> thead / tbody / tfoot rows ─> GridBuilder ─> validated grid
//! ```
//!
//! Column names are resolved against the column specifications; entries
//! without names fill the next free coordinate. Tables whose spans overlap
//! or leave holes are rejected, never repaired.
//!
//! # Example
//!
//! ```rust
//! use calsgrid::core::{cals2grid, CalsTableDefinition};
//! use calsgrid::dom::Document;
//!
//! let xml = r#"<table><tgroup cols="2"><tbody>
//!     <row><entry namest="column-0" nameend="column-1">wide</entry></row>
//!     <row><entry>a</entry><entry>b</entry></row>
//! </tbody></tgroup></table>"#;
//! let doc = Document::parse(xml).unwrap();
//! let table = doc.document_element().unwrap();
//! let grid = cals2grid::build_grid_model(&doc, table, &CalsTableDefinition::default()).unwrap();
//! assert_eq!(grid.cell_at(0, 1).unwrap().size.columns, 2);
//! ```

mod builder;
mod colspec;
mod validator;
mod widths;

#[cfg(test)]
mod tests;

// Re-export public API
pub use builder::{GridBuilder, RowSection};
pub use colspec::{ColumnSpecResolver, ResolvedColumns};
pub use validator::validate_grid;
pub use widths::{column_shares, compute_widths, ColumnWidth};

use crate::core::definition::CalsTableDefinition;
use crate::dom::{NodeId, TableHost};
use crate::features::grid::GridModel;
use crate::utils::error::{TableError, TableResult};

/// Build a grid model from a CALS `table` element
pub fn build_grid_model<H: TableHost + ?Sized>(
    host: &H,
    table: NodeId,
    definition: &CalsTableDefinition,
) -> TableResult<GridModel> {
    let ns = definition.namespace();
    let elements = &definition.elements;
    if !host.is_element(table, ns, &elements.table) {
        return Err(TableError::MissingElement(elements.table.clone()));
    }
    let tgroup = host
        .first_child_named(table, ns, &elements.tgroup)
        .ok_or_else(|| TableError::MissingElement(elements.tgroup.clone()))?;

    let columns = ColumnSpecResolver::new(definition).resolve(host, table, tgroup)?;
    let mut builder = GridBuilder::new(host, definition, columns);
    let borders = host
        .attribute(table, &definition.attributes.frame)
        .map_or(true, |frame| definition.parse_frame(&frame));
    builder.set_borders(borders);

    // Header rows first, then the body in document order, then the footer
    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();
    for child in host.element_children(tgroup) {
        if host.is_element(child, ns, &elements.thead) {
            head.extend(host.children_named(child, ns, &elements.row));
        } else if host.is_element(child, ns, &elements.tbody) {
            body.extend(host.children_named(child, ns, &elements.row));
        } else if host.is_element(child, ns, &elements.tfoot) {
            foot.extend(host.children_named(child, ns, &elements.row));
        } else if host.is_element(child, ns, &elements.row) {
            body.push(child);
        }
    }

    for row in head {
        builder.process_row(row, RowSection::Header)?;
    }
    for row in body {
        builder.process_row(row, RowSection::Body)?;
    }
    for row in foot {
        builder.process_row(row, RowSection::Footer)?;
    }
    builder.finish()
}
