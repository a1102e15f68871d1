//! # calsgrid
//!
//! Bidirectional conversion between CALS tables and a dense grid model.
//!
//! ## Features
//!
//! - **Grid model**: every logical coordinate resolves to the cell covering it,
//!   spanning cells are one identity at many coordinates
//! - **Bidirectional**: build a grid from CALS markup, edit it, write it back
//! - **Identity preserving**: entry and row nodes are moved, never recreated,
//!   so cell content survives merges, splits and reordering
//! - **Transactional**: writes run in one host batch and are discarded as a
//!   whole when the host rejects the result
//! - **Configurable dialect**: element names, attribute names, tokens and
//!   namespace come from a [`CalsTableDefinition`]
//! - **WASM Support**: compiles to WebAssembly for browser usage
//!
//! ## Usage Examples
//!
//! ### Inspecting a table
//!
//! ```rust
//! use calsgrid::{inspect_cals_xml, CalsTableDefinition};
//!
//! let xml = r#"<table><tgroup cols="2"><tbody>
//!   <row><entry morerows="1">tall</entry><entry>b</entry></row>
//!   <row><entry>d</entry></row>
//! </tbody></tgroup></table>"#;
//!
//! let grids = inspect_cals_xml(xml, &CalsTableDefinition::default()).unwrap();
//! let grid = &grids[0];
//! assert_eq!(grid.cell_id_at(0, 0), grid.cell_id_at(1, 0));
//! ```
//!
//! ### Editing and writing back
//!
//! ```rust
//! use calsgrid::dom::Document;
//! use calsgrid::{CalsTableStructure, GridPosition, GridSize, TableStructure};
//!
//! let mut doc = Document::parse(
//!     r#"<table><tgroup cols="2"><tbody><row><entry>a</entry><entry>b</entry></row></tbody></tgroup></table>"#,
//! ).unwrap();
//! let table = doc.document_element().unwrap();
//! let structure = CalsTableStructure::default();
//!
//! let mut grid = structure.build_grid_model(&doc, table).unwrap();
//! grid.merge_cells(GridPosition::new(0, 0), GridSize::new(1, 2)).unwrap();
//! assert!(structure.apply_grid_model(&mut grid, &mut doc, table).unwrap());
//! assert!(doc.to_xml().unwrap().contains(r#"namest="column-0""#));
//! ```

/// Core conversion modules
pub mod core;

/// Data layer - static defaults and constants
pub mod data;

/// In-memory host tree
pub mod dom;

/// Feature modules - grid model, edits and registry
pub mod features;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export core conversion functions
pub use core::{
    apply_grid_model, build_grid_model, check_minimal_structure, CalsTableDefinition,
    CalsTableStructure, TableStructure,
};

// Re-export the grid model
pub use features::{
    Cell, CellAttribute, CellData, CellId, ColumnSpecification, GridModel, GridPosition, GridSize,
    HorizontalAlignment, RowSpecification, TableModelRegistry, VerticalAlignment,
};

// Re-export utilities
pub use dom::{Document, NodeId, TableHost};
pub use utils::error::{TableError, TableResult};

/// Rewrite every table in an XML document through the grid model.
///
/// Each table is built and serialized back, which canonicalizes its column
/// definitions and entry attributes. Tables whose rewrite would break the
/// minimal CALS shape are left as they were.
pub fn normalize_cals_xml(xml: &str, definition: &CalsTableDefinition) -> TableResult<String> {
    let mut doc = Document::parse(xml)?;
    let structure = CalsTableStructure::new(definition.clone());
    let check = definition.clone();
    doc.set_structure_check(move |doc, table| check_minimal_structure(doc, table, &check));

    let tables = structure.find_tables(&doc, doc.root());
    for &table in &tables {
        let mut grid = structure.build_grid_model(&doc, table)?;
        if !structure.apply_grid_model(&mut grid, &mut doc, table)? {
            log::warn!("table {} left unchanged: rewrite failed the structure check", table);
        }
    }
    log::debug!("normalized {} tables", tables.len());
    doc.to_xml()
}

/// Build the grid model of every table in an XML document, in document
/// order
pub fn inspect_cals_xml(
    xml: &str,
    definition: &CalsTableDefinition,
) -> TableResult<Vec<GridModel>> {
    let doc = Document::parse(xml)?;
    let structure = CalsTableStructure::new(definition.clone());
    structure
        .find_tables(&doc, doc.root())
        .into_iter()
        .map(|table| structure.build_grid_model(&doc, table))
        .collect()
}

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
