//! Structural edits on a grid model
//!
//! Each edit keeps origins, spans, header/footer counts and column names
//! consistent. A rejected edit leaves the grid untouched.

use super::grid::{
    Cell, CellId, ColumnSpecification, GridModel, GridPosition, GridSize, RowSpecification,
};
use crate::utils::error::{TableError, TableResult};

impl GridModel {
    /// Re-stamp the matrix from the stored cells, leaving uncovered
    /// coordinates empty
    fn rebuild_matrix(&mut self, height: usize) -> TableResult<()> {
        let width = self.width();
        *self.matrix_mut() = vec![vec![None; width]; height];
        let ids: Vec<CellId> = self.cells().map(|(id, _)| id).collect();
        for id in ids {
            self.place_cell(id)?;
        }
        Ok(())
    }

    /// Give every empty coordinate its own unspanned cell
    fn fill_holes(&mut self) -> Vec<CellId> {
        let mut created = Vec::new();
        for row in 0..self.height() {
            for column in 0..self.width() {
                if self.cell_id_at(row, column).is_none() {
                    let id = self.add_cell(Cell::new(
                        GridPosition::new(row, column),
                        GridSize::default(),
                    ));
                    self.set_slot(row, column, Some(id));
                    created.push(id);
                }
            }
        }
        created
    }

    fn renumber_columns(&mut self) {
        for (i, spec) in self.column_specifications.iter_mut().enumerate() {
            spec.column_number = i;
        }
    }

    /// Insert an empty row before `index`. Cells spanning across the
    /// insertion point grow to cover the new row.
    pub fn insert_row(&mut self, index: usize) -> TableResult<()> {
        if index > self.height() {
            return Err(TableError::invalid_edit(format!(
                "row {} is past the end of a {}-row table",
                index,
                self.height()
            )));
        }
        let mut next = self.clone();
        let ids: Vec<CellId> = next.cells().map(|(id, _)| id).collect();
        for id in ids {
            if let Some(cell) = next.cell_mut(id) {
                if cell.origin.row >= index {
                    cell.origin.row += 1;
                } else if cell.last_row() >= index {
                    cell.size.rows += 1;
                }
            }
        }
        let footer_start = self.height() - self.footer_row_count.min(self.height());
        next.row_specifications.insert(index, RowSpecification::default());
        if index < self.header_row_count {
            next.header_row_count += 1;
        }
        if self.footer_row_count > 0 && index > footer_start {
            next.footer_row_count += 1;
        }
        next.rebuild_matrix(self.height() + 1)?;
        next.fill_holes();
        *self = next;
        Ok(())
    }

    /// Delete the row at `index`. Cells spanning it shrink; cells confined to
    /// it are dropped.
    pub fn delete_row(&mut self, index: usize) -> TableResult<()> {
        if index >= self.height() {
            return Err(TableError::invalid_edit(format!("no row {}", index)));
        }
        let mut next = self.clone();
        let ids: Vec<CellId> = next.cells().map(|(id, _)| id).collect();
        for id in ids {
            let Some(cell) = next.cell_mut(id) else {
                continue;
            };
            if cell.origin.row <= index && cell.last_row() >= index {
                if cell.size.rows == 1 {
                    next.drop_cell(id);
                } else {
                    cell.size.rows -= 1;
                }
            } else if cell.origin.row > index {
                cell.origin.row -= 1;
            }
        }
        next.row_specifications.remove(index);
        if index < self.header_row_count {
            next.header_row_count -= 1;
        }
        if self.is_footer_row(index) {
            next.footer_row_count -= 1;
        }
        next.rebuild_matrix(self.height() - 1)?;
        *self = next;
        Ok(())
    }

    /// Insert a column before `index` with a fresh, unused name
    pub fn insert_column(&mut self, index: usize) -> TableResult<()> {
        if index > self.width() {
            return Err(TableError::invalid_edit(format!(
                "column {} is past the end of a {}-column table",
                index,
                self.width()
            )));
        }
        let mut next = self.clone();
        let mut spec = ColumnSpecification::placeholder(index);
        spec.column_name = self.unused_column_name();
        next.column_specifications.insert(index, spec);
        next.renumber_columns();

        let ids: Vec<CellId> = next.cells().map(|(id, _)| id).collect();
        for id in ids {
            if let Some(cell) = next.cell_mut(id) {
                if cell.origin.column >= index {
                    cell.origin.column += 1;
                } else if cell.last_column() >= index {
                    cell.size.columns += 1;
                }
            }
        }
        next.rebuild_matrix(self.height())?;
        next.fill_holes();
        *self = next;
        Ok(())
    }

    /// Delete the column at `index`. The last remaining column cannot be
    /// deleted.
    pub fn delete_column(&mut self, index: usize) -> TableResult<()> {
        if index >= self.width() {
            return Err(TableError::invalid_edit(format!("no column {}", index)));
        }
        if self.width() == 1 {
            return Err(TableError::invalid_edit("cannot delete the only column"));
        }
        let mut next = self.clone();
        let ids: Vec<CellId> = next.cells().map(|(id, _)| id).collect();
        for id in ids {
            let Some(cell) = next.cell_mut(id) else {
                continue;
            };
            if cell.origin.column <= index && cell.last_column() >= index {
                if cell.size.columns == 1 {
                    next.drop_cell(id);
                } else {
                    cell.size.columns -= 1;
                }
            } else if cell.origin.column > index {
                cell.origin.column -= 1;
            }
        }
        next.column_specifications.remove(index);
        next.renumber_columns();
        next.rebuild_matrix(self.height())?;
        *self = next;
        Ok(())
    }

    /// Merge every cell inside the rectangle into the cell at its top-left
    /// corner. Cells crossing the rectangle's edge make the merge invalid.
    pub fn merge_cells(&mut self, top_left: GridPosition, size: GridSize) -> TableResult<CellId> {
        if !self.fits(top_left, size) {
            return Err(TableError::invalid_edit("merge area is outside the table"));
        }
        let area = Cell::new(top_left, size);
        let mut members = Vec::new();
        for row in top_left.row..top_left.row + size.rows {
            for column in top_left.column..top_left.column + size.columns {
                let id = self
                    .cell_id_at(row, column)
                    .ok_or(TableError::SpanInconsistency { row, column })?;
                if !members.contains(&id) {
                    members.push(id);
                }
            }
        }
        for &id in &members {
            let cell = self
                .cell(id)
                .ok_or_else(|| TableError::invalid_edit(format!("unknown cell {}", id.index())))?;
            if !(area.covers(cell.origin.row, cell.origin.column)
                && area.covers(cell.last_row(), cell.last_column()))
            {
                return Err(TableError::invalid_edit(format!(
                    "cell at row {}, column {} crosses the merge area",
                    cell.origin.row, cell.origin.column
                )));
            }
        }

        let mut next = self.clone();
        let survivor = members[0];
        for &id in &members[1..] {
            next.drop_cell(id);
        }
        if let Some(cell) = next.cell_mut(survivor) {
            cell.origin = top_left;
            cell.size = size;
        }
        next.rebuild_matrix(self.height())?;
        *self = next;
        Ok(survivor)
    }

    /// Split a spanning cell into unspanned cells. The original keeps its
    /// origin and backing node; the other coordinates get new cells carrying
    /// the same overrides.
    pub fn split_cell(&mut self, position: GridPosition) -> TableResult<Vec<CellId>> {
        let id = self
            .cell_id_at(position.row, position.column)
            .ok_or_else(|| {
                TableError::invalid_edit(format!(
                    "no cell at row {}, column {}",
                    position.row, position.column
                ))
            })?;
        let mut next = self.clone();
        let Some(cell) = next.cell_mut(id) else {
            return Err(TableError::invalid_edit(format!("unknown cell {}", id.index())));
        };
        cell.size = GridSize::default();
        let mut data = cell.data.clone();
        data.column_name = None;
        data.name_start = None;
        data.name_end = None;

        next.rebuild_matrix(self.height())?;
        let created = next.fill_holes();
        for &new_id in &created {
            if let Some(new_cell) = next.cell_mut(new_id) {
                new_cell.data = data.clone();
            }
        }
        *self = next;
        Ok(created)
    }

    /// Exchange two unspanned cells, moving each (with its backing node) to
    /// the other's coordinate
    pub fn move_cell(&mut self, from: GridPosition, to: GridPosition) -> TableResult<()> {
        let lookup = |p: GridPosition| {
            self.cell_id_at(p.row, p.column)
                .ok_or_else(|| {
                    TableError::invalid_edit(format!(
                        "no cell at row {}, column {}",
                        p.row, p.column
                    ))
                })
        };
        let (a, b) = (lookup(from)?, lookup(to)?);
        if a == b {
            return Ok(());
        }
        for id in [a, b] {
            if self.cell(id).map(|c| c.size) != Some(GridSize::default()) {
                return Err(TableError::invalid_edit("only unspanned cells can be moved"));
            }
        }
        if let Some(cell) = self.cell_mut(a) {
            cell.origin = to;
        }
        if let Some(cell) = self.cell_mut(b) {
            cell.origin = from;
        }
        self.set_slot(to.row, to.column, Some(a));
        self.set_slot(from.row, from.column, Some(b));
        Ok(())
    }
}
