//! Feature modules - The grid model and what can be done with it
//!
//! This module contains:
//! - The dense grid model (cells, spans, column and row specifications)
//! - Structural edits (insert/delete rows and columns, merge, split, move)
//! - A per-document registry of grid models keyed by table root

pub mod edits;
pub mod grid;
pub mod registry;

// Re-export commonly used types
pub use grid::{
    Cell, CellAttribute, CellData, CellId, ColumnSpecification, GridModel, GridPosition, GridSize,
    HorizontalAlignment, RowSpecification, VerticalAlignment,
};
pub use registry::TableModelRegistry;
