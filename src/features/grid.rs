//! Dense grid model of a table
//!
//! The grid is a rectangular matrix of cell references. A spanning cell is
//! stored once and referenced from every coordinate it covers, so identity
//! survives edits that move or resize it.

use std::fmt::Write;

use crate::data::constants::{column_name, COLUMN_NAME_PREFIX, DEFAULT_COLUMN_WIDTH};
use crate::dom::NodeId;
use crate::utils::error::{TableError, TableResult};

/// Horizontal cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub enum HorizontalAlignment {
    Left,
    Right,
    Center,
    Justify,
    Char,
}

/// Vertical cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

/// A cell attribute that is either set on the cell itself or inherited from
/// the column (or row) defaults
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub enum CellAttribute<T> {
    #[default]
    Inherit,
    Override(T),
}

impl<T> CellAttribute<T> {
    pub fn as_override(&self) -> Option<&T> {
        match self {
            CellAttribute::Override(value) => Some(value),
            CellAttribute::Inherit => None,
        }
    }
}

impl<T: Clone> CellAttribute<T> {
    /// The cell's own value, or `default` when inherited
    pub fn resolve(&self, default: T) -> T {
        match self {
            CellAttribute::Override(value) => value.clone(),
            CellAttribute::Inherit => default,
        }
    }
}

impl<T> From<Option<T>> for CellAttribute<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => CellAttribute::Override(value),
            None => CellAttribute::Inherit,
        }
    }
}

/// A (row, column) coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct GridPosition {
    pub row: usize,
    pub column: usize,
}

impl GridPosition {
    pub fn new(row: usize, column: usize) -> Self {
        GridPosition { row, column }
    }
}

/// Span extents of a cell, each at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct GridSize {
    pub rows: usize,
    pub columns: usize,
}

impl GridSize {
    pub fn new(rows: usize, columns: usize) -> Self {
        GridSize { rows, columns }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize::new(1, 1)
    }
}

/// Per-column defaults
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct ColumnSpecification {
    /// Unique within a table; `column-<index>` when the source names none
    pub column_name: String,
    /// 0-based position
    pub column_number: usize,
    /// `N*`, `Nunit` or `N*+Nunit`
    pub column_width: String,
    pub column_separator: bool,
    pub row_separator: bool,
    pub alignment: Option<HorizontalAlignment>,
    /// Share of the table width, filled in after building
    pub computed_width: f64,
}

impl ColumnSpecification {
    /// Placeholder specification for a column the source does not declare
    pub fn placeholder(index: usize) -> Self {
        ColumnSpecification {
            column_name: column_name(index),
            column_number: index,
            column_width: DEFAULT_COLUMN_WIDTH.to_string(),
            column_separator: true,
            row_separator: true,
            alignment: None,
            computed_width: 0.0,
        }
    }
}

/// Per-row defaults
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct RowSpecification {
    pub vertical_alignment: Option<VerticalAlignment>,
    /// Row node this row was read from
    pub element: Option<NodeId>,
}

/// Semantic attributes of a cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct CellData {
    pub horizontal_alignment: CellAttribute<HorizontalAlignment>,
    pub vertical_alignment: CellAttribute<VerticalAlignment>,
    pub column_separator: CellAttribute<bool>,
    pub row_separator: CellAttribute<bool>,
    pub output_class: CellAttribute<String>,
    /// Share of the table width covered by this cell
    pub computed_width: f64,
    /// Column linkage as read from the source
    pub column_name: Option<String>,
    pub name_start: Option<String>,
    pub name_end: Option<String>,
}

/// A logical table cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct Cell {
    /// Top-left coordinate, authoritative for placement
    pub origin: GridPosition,
    pub size: GridSize,
    /// Backing entry node; `None` for cells created by edits
    pub element: Option<NodeId>,
    pub data: CellData,
}

impl Cell {
    pub fn new(origin: GridPosition, size: GridSize) -> Self {
        Cell {
            origin,
            size,
            element: None,
            data: CellData::default(),
        }
    }

    /// Whether the cell covers the coordinate
    pub fn covers(&self, row: usize, column: usize) -> bool {
        row >= self.origin.row
            && row - self.origin.row < self.size.rows
            && column >= self.origin.column
            && column - self.origin.column < self.size.columns
    }

    pub fn last_row(&self) -> usize {
        self.origin.row.saturating_add(self.size.rows.saturating_sub(1))
    }

    pub fn last_column(&self) -> usize {
        self.origin.column.saturating_add(self.size.columns.saturating_sub(1))
    }
}

/// Identity of a cell within one grid model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct CellId(usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Dense grid representation of a table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct GridModel {
    /// Cell storage; removed cells leave a hole so ids stay stable
    cells: Vec<Option<Cell>>,
    /// height x width matrix of cell ids
    matrix: Vec<Vec<Option<CellId>>>,
    pub column_specifications: Vec<ColumnSpecification>,
    pub row_specifications: Vec<RowSpecification>,
    /// Rows `[0, header_row_count)` are header rows
    pub header_row_count: usize,
    /// The last `footer_row_count` rows are footer rows
    pub footer_row_count: usize,
    /// Table-level frame flag
    pub borders: bool,
}

impl GridModel {
    /// Create a grid with the given columns and no rows
    pub fn new(column_specifications: Vec<ColumnSpecification>) -> Self {
        GridModel {
            cells: Vec::new(),
            matrix: Vec::new(),
            column_specifications,
            row_specifications: Vec::new(),
            header_row_count: 0,
            footer_row_count: 0,
            borders: true,
        }
    }

    /// Create a rows x columns grid of unspanned cells
    pub fn with_dimensions(rows: usize, columns: usize) -> Self {
        let specs = (0..columns).map(ColumnSpecification::placeholder).collect();
        let mut grid = GridModel::new(specs);
        for row in 0..rows {
            grid.push_row(RowSpecification::default());
            for column in 0..columns {
                let id = grid.add_cell(Cell::new(
                    GridPosition::new(row, column),
                    GridSize::default(),
                ));
                grid.matrix[row][column] = Some(id);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.column_specifications.len()
    }

    pub fn height(&self) -> usize {
        self.matrix.len()
    }

    /// Append an empty row and return its index
    pub fn push_row(&mut self, spec: RowSpecification) -> usize {
        self.matrix.push(vec![None; self.width()]);
        self.row_specifications.push(spec);
        self.matrix.len() - 1
    }

    /// Store a cell without placing it
    pub fn add_cell(&mut self, cell: Cell) -> CellId {
        self.cells.push(Some(cell));
        CellId(self.cells.len() - 1)
    }

    pub(crate) fn drop_cell(&mut self, id: CellId) -> Option<Cell> {
        self.cells.get_mut(id.0).and_then(Option::take)
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0).and_then(Option::as_ref)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live cells in creation order
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (CellId(i), c)))
    }

    pub fn cell_id_at(&self, row: usize, column: usize) -> Option<CellId> {
        self.matrix.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    pub fn cell_at(&self, row: usize, column: usize) -> Option<&Cell> {
        self.cell_id_at(row, column).and_then(|id| self.cell(id))
    }

    pub(crate) fn set_slot(&mut self, row: usize, column: usize, id: Option<CellId>) {
        if let Some(slot) = self.matrix.get_mut(row).and_then(|r| r.get_mut(column)) {
            *slot = id;
        }
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut Vec<Vec<Option<CellId>>> {
        &mut self.matrix
    }

    /// Fill every coordinate of a stored cell's rectangle with its id
    pub fn place_cell(&mut self, id: CellId) -> TableResult<()> {
        let cell = self
            .cell(id)
            .ok_or_else(|| TableError::invalid_edit(format!("unknown cell {}", id.0)))?;
        let (origin, size) = (cell.origin, cell.size);
        if !self.fits(origin, size) {
            return Err(TableError::SpanOutOfBounds {
                row: origin.row,
                column: origin.column,
                rows: size.rows,
                columns: size.columns,
            });
        }
        for row in origin.row..origin.row + size.rows {
            for column in origin.column..origin.column + size.columns {
                match self.matrix[row][column] {
                    Some(other) if other != id => {
                        return Err(TableError::OverlappingCells { row, column })
                    }
                    _ => self.matrix[row][column] = Some(id),
                }
            }
        }
        Ok(())
    }

    /// Whether a non-empty rectangle lies inside the grid
    pub fn fits(&self, origin: GridPosition, size: GridSize) -> bool {
        let within = |start: usize, extent: usize, limit: usize| {
            extent > 0 && start.checked_add(extent).map_or(false, |end| end <= limit)
        };
        within(origin.row, size.rows, self.height())
            && within(origin.column, size.columns, self.width())
    }

    pub fn is_header_row(&self, row: usize) -> bool {
        row < self.header_row_count
    }

    pub fn is_footer_row(&self, row: usize) -> bool {
        row < self.height() && row >= self.height() - self.footer_row_count.min(self.height())
    }

    /// Index of the first column named `name`, searching from `from`
    pub fn column_index_from(&self, name: &str, from: usize) -> Option<usize> {
        self.column_specifications
            .iter()
            .skip(from)
            .position(|spec| spec.column_name == name)
            .map(|i| i + from)
    }

    /// A `column-<n>` name not used by any column
    pub fn unused_column_name(&self) -> String {
        let taken = |name: &str| self.column_specifications.iter().any(|s| s.column_name == name);
        let mut n = self.width();
        while taken(&column_name(n)) {
            n += 1;
        }
        column_name(n)
    }

    /// Column separator in effect for a cell
    pub fn column_separator(&self, cell: &Cell) -> bool {
        let default = self
            .column_specifications
            .get(cell.origin.column)
            .map_or(true, |s| s.column_separator);
        cell.data.column_separator.resolve(default)
    }

    /// Row separator in effect for a cell
    pub fn row_separator(&self, cell: &Cell) -> bool {
        let default = self
            .column_specifications
            .get(cell.origin.column)
            .map_or(true, |s| s.row_separator);
        cell.data.row_separator.resolve(default)
    }

    /// Horizontal alignment in effect for a cell
    pub fn horizontal_alignment(&self, cell: &Cell) -> Option<HorizontalAlignment> {
        let default = self
            .column_specifications
            .get(cell.origin.column)
            .and_then(|s| s.alignment);
        cell.data.horizontal_alignment.as_override().copied().or(default)
    }

    /// Vertical alignment in effect for a cell
    pub fn vertical_alignment(&self, cell: &Cell) -> Option<VerticalAlignment> {
        let default = self
            .row_specifications
            .get(cell.origin.row)
            .and_then(|s| s.vertical_alignment);
        cell.data.vertical_alignment.as_override().copied().or(default)
    }

    /// Text picture of the grid, one line per row. Each coordinate shows the
    /// id of the cell covering it; header and footer rows are marked.
    pub fn render_ascii(&self) -> String {
        let label_width = self
            .cells()
            .map(|(id, _)| id.0.to_string().len())
            .max()
            .unwrap_or(1)
            .max(1);
        let mut out = String::new();
        let _ = write!(out, "   ");
        for spec in &self.column_specifications {
            let name = spec
                .column_name
                .strip_prefix(COLUMN_NAME_PREFIX)
                .unwrap_or(&spec.column_name);
            let _ = write!(out, " {:>w$.w$}", name, w = label_width);
        }
        out.push('\n');
        for row in 0..self.height() {
            let marker = if self.is_header_row(row) {
                'H'
            } else if self.is_footer_row(row) {
                'F'
            } else {
                ' '
            };
            let _ = write!(out, "{:>2}{}", row, marker);
            for column in 0..self.width() {
                match self.cell_id_at(row, column) {
                    Some(id) => {
                        let _ = write!(out, " {:>w$}", id.0, w = label_width);
                    }
                    None => {
                        let _ = write!(out, " {:>w$}", "?", w = label_width);
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}
