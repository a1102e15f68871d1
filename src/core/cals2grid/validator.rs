//! Grid consistency checks

use crate::features::grid::GridModel;
use crate::utils::error::{TableError, TableResult};

/// Check that every coordinate is covered by exactly one cell, and that
/// each cell's rectangle lies inside the grid and maps back to that cell.
pub fn validate_grid(grid: &GridModel) -> TableResult<()> {
    for row in 0..grid.height() {
        for column in 0..grid.width() {
            match grid.cell_at(row, column) {
                Some(cell) if cell.covers(row, column) => {}
                _ => return Err(TableError::SpanInconsistency { row, column }),
            }
        }
    }
    for (id, cell) in grid.cells() {
        let (origin, size) = (cell.origin, cell.size);
        if !grid.fits(origin, size) {
            return Err(TableError::SpanOutOfBounds {
                row: origin.row,
                column: origin.column,
                rows: size.rows,
                columns: size.columns,
            });
        }
        for row in origin.row..origin.row + size.rows {
            for column in origin.column..origin.column + size.columns {
                if grid.cell_id_at(row, column) != Some(id) {
                    return Err(TableError::OverlappingCells { row, column });
                }
            }
        }
    }
    Ok(())
}
