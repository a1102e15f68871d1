//! Error handling for grid model conversions
//!
//! This module provides a unified error type and result type for building
//! grid models from CALS trees and writing them back.

use thiserror::Error;

/// Conversion error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// A grid coordinate is not occupied by any cell
    #[error("Span inconsistency: no cell covers row {row}, column {column}")]
    SpanInconsistency { row: usize, column: usize },

    /// Two cells claim the same grid coordinate
    #[error("Span inconsistency: cells overlap at row {row}, column {column}")]
    OverlappingCells { row: usize, column: usize },

    /// A cell's span reaches past the edge of the table
    #[error("Span out of bounds: cell at row {row}, column {column} spans {rows}x{columns}")]
    SpanOutOfBounds {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    /// Column definitions are numbered out of order
    #[error("Column {number} is declared after column {previous}")]
    OutOfOrderColumns { number: usize, previous: usize },

    /// A column definition is numbered past the declared column count
    #[error("Column number {number} exceeds the declared column count {count}")]
    ColumnOutOfRange { number: usize, count: usize },

    /// An entry refers to a column name that no column definition resolves to
    #[error("Unknown column '{name}' referenced in row {row}")]
    UnknownColumn { name: String, row: usize },

    /// A required element is missing from the table
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// A required attribute is missing
    #[error("Missing attribute '{attribute}' on {element}")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute value could not be interpreted
    #[error("Invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttribute { attribute: String, value: String },

    /// A programmatic grid edit was rejected
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    /// XML could not be read or written
    #[error("XML error: {0}")]
    Xml(String),

    /// The host refused a tree mutation
    #[error("Host error: {0}")]
    Host(String),
}

impl From<quick_xml::Error> for TableError {
    fn from(err: quick_xml::Error) -> Self {
        TableError::Xml(err.to_string())
    }
}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::Xml(err.to_string())
    }
}

/// Result type for conversion operations
pub type TableResult<T> = Result<T, TableError>;

// Convenience constructors and classification
impl TableError {
    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        TableError::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    pub fn invalid_attribute(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        TableError::InvalidAttribute {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn invalid_edit(message: impl Into<String>) -> Self {
        TableError::InvalidEdit(message.into())
    }

    /// Whether this error reports geometrically inconsistent table markup.
    ///
    /// Such tables are unsupported and are never repaired by this crate.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TableError::SpanInconsistency { .. }
                | TableError::OverlappingCells { .. }
                | TableError::SpanOutOfBounds { .. }
                | TableError::OutOfOrderColumns { .. }
                | TableError::ColumnOutOfRange { .. }
                | TableError::UnknownColumn { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_inconsistency_display() {
        let err = TableError::SpanInconsistency { row: 1, column: 2 };
        let msg = err.to_string();
        assert!(msg.contains("row 1"));
        assert!(msg.contains("column 2"));
    }

    #[test]
    fn test_structural_classification() {
        assert!(TableError::SpanInconsistency { row: 0, column: 0 }.is_structural());
        assert!(TableError::OutOfOrderColumns {
            number: 1,
            previous: 3
        }
        .is_structural());
        assert!(!TableError::Xml("bad".to_string()).is_structural());
        assert!(!TableError::invalid_edit("merge").is_structural());
    }

    #[test]
    fn test_missing_attribute() {
        let err = TableError::missing_attribute("tgroup", "cols");
        let msg = err.to_string();
        assert!(msg.contains("cols"));
        assert!(msg.contains("tgroup"));
    }
}
