//! Default CALS vocabulary and unit tables
//!
//! Every name and token here is only a default: table definitions may
//! override each of them per table instance.

use phf::phf_map;

// ============================================================================
// Element local names
// ============================================================================

pub const TABLE: &str = "table";
pub const TGROUP: &str = "tgroup";
pub const COLSPEC: &str = "colspec";
pub const THEAD: &str = "thead";
pub const TBODY: &str = "tbody";
pub const TFOOT: &str = "tfoot";
pub const ROW: &str = "row";
pub const ENTRY: &str = "entry";

// ============================================================================
// Attribute names
// ============================================================================

pub const FRAME: &str = "frame";
pub const COLS: &str = "cols";
pub const COLNAME: &str = "colname";
pub const COLNUM: &str = "colnum";
pub const COLWIDTH: &str = "colwidth";
pub const COLSEP: &str = "colsep";
pub const ROWSEP: &str = "rowsep";
pub const ALIGN: &str = "align";
pub const VALIGN: &str = "valign";
pub const NAMEST: &str = "namest";
pub const NAMEEND: &str = "nameend";
pub const MOREROWS: &str = "morerows";
pub const OUTPUTCLASS: &str = "outputclass";

// ============================================================================
// Tokens
// ============================================================================

pub const YES: &str = "1";
pub const NO: &str = "0";
pub const FRAME_ALL: &str = "all";
pub const FRAME_NONE: &str = "none";

pub const ALIGN_LEFT: &str = "left";
pub const ALIGN_RIGHT: &str = "right";
pub const ALIGN_CENTER: &str = "center";
pub const ALIGN_JUSTIFY: &str = "justify";
pub const ALIGN_CHAR: &str = "char";

pub const VALIGN_TOP: &str = "top";
pub const VALIGN_MIDDLE: &str = "middle";
pub const VALIGN_BOTTOM: &str = "bottom";

/// Width given to columns that declare none
pub const DEFAULT_COLUMN_WIDTH: &str = "1*";

/// Largest `cols` value accepted on a table group
pub const MAX_COLUMNS: usize = 16_384;

/// Prefix of synthesized column names (`column-0`, `column-1`, ...)
pub const COLUMN_NAME_PREFIX: &str = "column-";

// ============================================================================
// Length units
// ============================================================================

/// CSS pixels per unit for fixed column widths
pub static PIXELS_PER_UNIT: phf::Map<&'static str, f64> = phf_map! {
    "px" => 1.0,
    "pt" => 96.0 / 72.0,
    "pc" => 16.0,
    "in" => 96.0,
    "cm" => 96.0 / 2.54,
    "mm" => 96.0 / 25.4,
    "em" => 16.0,
};

/// Synthesized name for the column at a 0-based position
pub fn column_name(index: usize) -> String {
    format!("{}{}", COLUMN_NAME_PREFIX, index)
}
