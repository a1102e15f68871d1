//! In-memory host tree
//!
//! A small arena-based XML tree that implements the [`TableHost`] contract,
//! so grid models can be built from and written back to real XML without an
//! editor around them.
//!
//! # Example
//!
//! ```rust
//! use calsgrid::dom::Document;
//!
//! let doc = Document::parse("<table><tgroup cols=\"1\"/></table>").unwrap();
//! let table = doc.document_element().unwrap();
//! assert_eq!(doc.element(table).unwrap().local_name, "table");
//! ```

mod document;
mod host;
mod xml;

// Re-export public API
pub use document::{Document, ElementData, NodeId, NodeKind, StructureCheck, XmlDeclaration};
pub use host::TableHost;
