//! State-aware grid builder
//!
//! Entries only say where they start when they name a column. The builder
//! keeps a cursor per row and a coverage vector of row-spans still hanging
//! down from earlier rows, so unnamed entries land on the next free
//! coordinate.

use crate::core::definition::CalsTableDefinition;
use crate::dom::{NodeId, TableHost};
use crate::features::grid::{
    Cell, CellData, GridModel, GridPosition, GridSize, RowSpecification,
};
use crate::utils::error::{TableError, TableResult};

use super::colspec::ResolvedColumns;
use super::validator::validate_grid;
use super::widths::compute_widths;

/// Section a row is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSection {
    Header,
    Body,
    Footer,
}

/// Builds a grid model one row at a time
pub struct GridBuilder<'a, H: TableHost + ?Sized> {
    host: &'a H,
    definition: &'a CalsTableDefinition,
    columns: ResolvedColumns,
    grid: GridModel,
    /// Remaining rows each column is covered by a row-span from above
    coverage: Vec<usize>,
}

impl<'a, H: TableHost + ?Sized> GridBuilder<'a, H> {
    pub fn new(host: &'a H, definition: &'a CalsTableDefinition, columns: ResolvedColumns) -> Self {
        let width = columns.specifications.len();
        let grid = GridModel::new(columns.specifications.clone());
        GridBuilder {
            host,
            definition,
            columns,
            grid,
            coverage: vec![0; width],
        }
    }

    pub fn set_borders(&mut self, borders: bool) {
        self.grid.borders = borders;
    }

    /// Read one `row` element into the next grid row
    pub fn process_row(&mut self, row: NodeId, section: RowSection) -> TableResult<()> {
        let def = self.definition;
        let host = self.host;
        let width = self.grid.width();

        let vertical_alignment = host
            .attribute(row, &def.attributes.valign)
            .and_then(|v| def.parse_vertical_alignment(&v));
        let row_index = self.grid.push_row(RowSpecification {
            vertical_alignment,
            element: Some(row),
        });
        match section {
            RowSection::Header => self.grid.header_row_count += 1,
            RowSection::Footer => self.grid.footer_row_count += 1,
            RowSection::Body => {}
        }

        let covered: Vec<bool> = self.coverage.iter().map(|&c| c > 0).collect();
        for remaining in self.coverage.iter_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        let mut claimed = vec![false; width];
        let mut cursor = 0;

        for entry in host.children_named(row, def.namespace(), &def.elements.entry) {
            let (start, end) = self.entry_columns(entry, row_index, cursor, &covered, &claimed)?;
            let rows = self.row_span(entry)?;

            for column in start..=end {
                if covered[column] || claimed[column] {
                    return Err(TableError::OverlappingCells {
                        row: row_index,
                        column,
                    });
                }
            }

            let mut cell = Cell::new(
                GridPosition::new(row_index, start),
                GridSize::new(rows, end - start + 1),
            );
            cell.element = Some(entry);
            cell.data = self.read_cell_data(entry);
            let id = self.grid.add_cell(cell);
            log::trace!(
                "entry {} at ({}, {}) spans {}x{}",
                entry,
                row_index,
                start,
                rows,
                end - start + 1
            );

            for column in start..=end {
                self.grid.set_slot(row_index, column, Some(id));
                claimed[column] = true;
                self.coverage[column] = rows - 1;
            }
            cursor = end + 1;
        }
        Ok(())
    }

    /// Expand spans, validate and compute widths
    pub fn finish(mut self) -> TableResult<GridModel> {
        let ids: Vec<_> = self.grid.cells().map(|(id, _)| id).collect();
        for id in ids {
            self.grid.place_cell(id)?;
        }
        validate_grid(&self.grid)?;
        compute_widths(&mut self.grid);
        log::debug!(
            "built {}x{} grid ({} header, {} footer rows)",
            self.grid.height(),
            self.grid.width(),
            self.grid.header_row_count,
            self.grid.footer_row_count
        );
        Ok(self.grid)
    }

    /// First and last column an entry occupies
    fn entry_columns(
        &self,
        entry: NodeId,
        row: usize,
        cursor: usize,
        covered: &[bool],
        claimed: &[bool],
    ) -> TableResult<(usize, usize)> {
        let attrs = &self.definition.attributes;
        let named = |name: &str| self.host.attribute(entry, name).filter(|v| !v.trim().is_empty());
        let width = self.grid.width();

        let start = match named(&attrs.namest).or_else(|| named(&attrs.colname)) {
            Some(name) => self.find_column(&name, cursor, row)?,
            None => {
                let mut free = cursor;
                while free < width && (covered[free] || claimed[free]) {
                    free += 1;
                }
                if free >= width {
                    return Err(TableError::SpanOutOfBounds {
                        row,
                        column: free,
                        rows: 1,
                        columns: 1,
                    });
                }
                free
            }
        };

        let end = match named(&attrs.nameend) {
            Some(name) => {
                let canonical = self.columns.canonical_name(&name);
                match self.grid.column_index_from(canonical, start) {
                    Some(end) => end,
                    None if self.grid.column_index_from(canonical, 0).is_some() => {
                        return Err(TableError::invalid_attribute(&attrs.nameend, name))
                    }
                    None => return Err(TableError::UnknownColumn { name, row }),
                }
            }
            None => start,
        };
        Ok((start, end))
    }

    /// Column named `name`, searched from the cursor first
    fn find_column(&self, name: &str, cursor: usize, row: usize) -> TableResult<usize> {
        let canonical = self.columns.canonical_name(name);
        self.grid
            .column_index_from(canonical, cursor)
            .or_else(|| self.grid.column_index_from(canonical, 0))
            .ok_or_else(|| TableError::UnknownColumn {
                name: name.to_string(),
                row,
            })
    }

    /// Number of rows an entry spans, `morerows` plus one
    fn row_span(&self, entry: NodeId) -> TableResult<usize> {
        let attr = &self.definition.attributes.morerows;
        match self.host.attribute(entry, attr) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|more| more.checked_add(1))
                .ok_or_else(|| TableError::invalid_attribute(attr, raw)),
            None => Ok(1),
        }
    }

    fn read_cell_data(&self, entry: NodeId) -> CellData {
        let def = self.definition;
        let attrs = &def.attributes;
        let get = |name: &str| self.host.attribute(entry, name);
        CellData {
            horizontal_alignment: get(&attrs.align)
                .and_then(|v| def.parse_alignment(&v))
                .into(),
            vertical_alignment: get(&attrs.valign)
                .and_then(|v| def.parse_vertical_alignment(&v))
                .into(),
            column_separator: get(&attrs.colsep).and_then(|v| def.parse_separator(&v)).into(),
            row_separator: get(&attrs.rowsep).and_then(|v| def.parse_separator(&v)).into(),
            output_class: get(&attrs.outputclass).into(),
            computed_width: 0.0,
            column_name: get(&attrs.colname),
            name_start: get(&attrs.namest),
            name_end: get(&attrs.nameend),
        }
    }
}
