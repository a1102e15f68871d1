//! Column width computation
//!
//! Column widths are written as proportions (`2*`), fixed lengths (`30mm`)
//! or both (`1*+20px`). Each column gets a share of the table width:
//! proportions when any column has one, otherwise the fixed lengths, and an
//! equal split when neither is usable.

use lazy_static::lazy_static;
use regex::Regex;

use crate::data::constants::PIXELS_PER_UNIT;
use crate::features::grid::GridModel;

lazy_static! {
    static ref WIDTH_RE: Regex = Regex::new(
        r"^\s*(?:(?P<prop>\d*\.?\d*)\*)?\s*\+?\s*(?:(?P<len>\d+(?:\.\d+)?|\.\d+)\s*(?P<unit>[A-Za-z]+)?)?\s*$"
    )
    .unwrap();
}

/// Unit assumed for bare numbers
const DEFAULT_UNIT: &str = "pt";

/// Parsed column width
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnWidth {
    pub proportion: Option<f64>,
    /// Fixed part in CSS pixels
    pub fixed: Option<f64>,
}

impl ColumnWidth {
    pub fn parse(value: &str) -> Option<ColumnWidth> {
        let caps = WIDTH_RE.captures(value)?;
        let proportion = caps.name("prop").map(|m| match m.as_str() {
            "" | "." => 1.0,
            s => s.parse().unwrap_or(1.0),
        });
        let fixed = match caps.name("len") {
            Some(len) => {
                let unit = caps
                    .name("unit")
                    .map_or(DEFAULT_UNIT.to_string(), |u| u.as_str().to_ascii_lowercase());
                match PIXELS_PER_UNIT.get(unit.as_str()) {
                    Some(factor) => len.as_str().parse::<f64>().ok().map(|n| n * factor),
                    None => {
                        log::warn!("ignoring column width with unknown unit '{}'", value);
                        None
                    }
                }
            }
            None => None,
        };
        if proportion.is_none() && fixed.is_none() {
            return None;
        }
        Some(ColumnWidth { proportion, fixed })
    }
}

/// Share of the table width for each column, summing to 1
pub fn column_shares(widths: &[&str]) -> Vec<f64> {
    if widths.is_empty() {
        return Vec::new();
    }
    let parsed: Vec<ColumnWidth> = widths
        .iter()
        .map(|w| ColumnWidth::parse(w).unwrap_or_default())
        .collect();

    let total_proportion: f64 = parsed.iter().filter_map(|w| w.proportion).sum();
    if total_proportion > 0.0 {
        return parsed
            .iter()
            .map(|w| w.proportion.unwrap_or(0.0) / total_proportion)
            .collect();
    }
    let total_fixed: f64 = parsed.iter().filter_map(|w| w.fixed).sum();
    if total_fixed > 0.0 {
        return parsed.iter().map(|w| w.fixed.unwrap_or(0.0) / total_fixed).collect();
    }
    vec![1.0 / widths.len() as f64; widths.len()]
}

/// Fill in `computed_width` on every column and cell
pub fn compute_widths(grid: &mut GridModel) {
    let widths: Vec<&str> = grid
        .column_specifications
        .iter()
        .map(|s| s.column_width.as_str())
        .collect();
    let shares = column_shares(&widths);
    for (spec, share) in grid.column_specifications.iter_mut().zip(&shares) {
        spec.computed_width = *share;
    }

    let spans: Vec<_> = grid
        .cells()
        .map(|(id, cell)| (id, cell.origin.column, cell.size.columns))
        .collect();
    for (id, start, columns) in spans {
        let width = shares.iter().skip(start).take(columns).sum();
        if let Some(cell) = grid.cell_mut(id) {
            cell.data.computed_width = width;
        }
    }
}
