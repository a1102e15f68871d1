//! Data layer - Static defaults and constants
//!
//! This module contains the static data used by the grid model engines:
//! - Default CALS element and attribute names
//! - Default separator, frame and alignment tokens
//! - Length unit conversion factors

pub mod constants;

// Re-export commonly used items
pub use constants::{column_name, DEFAULT_COLUMN_WIDTH, PIXELS_PER_UNIT};
