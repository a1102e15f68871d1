//! Core conversion modules
//!
//! This module contains the two conversion engines and the dialect they
//! share:
//! - `cals2grid`: CALS table to grid model (state-aware builder)
//! - `grid2cals`: grid model back to CALS, in place and transactional
//! - `definition`: names, tokens and the `TableStructure` seam

pub mod cals2grid;
pub mod definition;
pub mod grid2cals;

// Re-export main types and functions
pub use cals2grid::{build_grid_model, validate_grid};
pub use definition::{
    CalsAttributeNames, CalsElementNames, CalsTableDefinition, CalsTableStructure, CalsTokens,
    TableStructure,
};
pub use grid2cals::{apply_grid_model, check_minimal_structure};
