//! Grid model to CALS markup
//!
//! The serializer rewrites a table in place. Row and entry nodes recorded
//! on the grid are reused and moved, so their content and identity survive
//! edits; anything the grid no longer references is removed.

use fxhash::FxHashSet;
use indexmap::IndexSet;

use crate::core::definition::CalsTableDefinition;
use crate::dom::{NodeId, TableHost};
use crate::features::grid::{CellAttribute, CellId, GridModel};
use crate::utils::error::{TableError, TableResult};

use crate::core::cals2grid::{validate_grid, RowSection};

/// Row containers of a table group, created on demand
#[derive(Debug, Default)]
struct Sections {
    head: Option<NodeId>,
    body: Option<NodeId>,
    foot: Option<NodeId>,
}

/// Writes one grid model into one table element
pub struct GridSerializer<'a, H: TableHost + ?Sized> {
    host: &'a mut H,
    definition: &'a CalsTableDefinition,
    table: NodeId,
}

impl<'a, H: TableHost + ?Sized> GridSerializer<'a, H> {
    pub fn new(host: &'a mut H, definition: &'a CalsTableDefinition, table: NodeId) -> Self {
        GridSerializer {
            host,
            definition,
            table,
        }
    }

    /// Rewrite the table from the grid. Records reused and created nodes on
    /// the grid. An inconsistent grid is rejected before the tree is touched;
    /// host failures past that point leave it half-written, so callers run
    /// this inside a batch.
    pub fn write(&mut self, grid: &mut GridModel) -> TableResult<()> {
        validate_grid(grid)?;
        let def = self.definition;
        let ns = def.namespace();

        let tgroup = match self.host.first_child_named(self.table, ns, &def.elements.tgroup) {
            Some(tgroup) => tgroup,
            None => {
                let tgroup = self.host.create_element(ns, &def.elements.tgroup);
                self.host.insert_before(self.table, tgroup, None)?;
                tgroup
            }
        };

        let framed = self
            .host
            .attribute(self.table, &def.attributes.frame)
            .map_or(true, |frame| def.parse_frame(&frame));
        if framed != grid.borders {
            let frame = def.frame_token(grid.borders);
            self.host.set_attribute(self.table, &def.attributes.frame, Some(frame));
        }
        let cols = grid.width().to_string();
        self.host.set_attribute(tgroup, &def.attributes.cols, Some(&cols));
        self.write_column_specifications(tgroup, grid)?;

        let height = grid.height();
        if height == 1 {
            grid.header_row_count = 0;
            grid.footer_row_count = 0;
        }
        grid.header_row_count = grid.header_row_count.min(height);
        grid.footer_row_count = grid.footer_row_count.min(height - grid.header_row_count);

        // Everything currently in the table that the grid may or may not keep
        let mut containers = Vec::new();
        let mut sections = Sections::default();
        let mut unseen_rows = IndexSet::new();
        for child in self.host.element_children(tgroup) {
            if self.is(child, &def.elements.row) {
                unseen_rows.insert(child);
                continue;
            }
            let section = if self.is(child, &def.elements.thead) {
                &mut sections.head
            } else if self.is(child, &def.elements.tbody) {
                &mut sections.body
            } else if self.is(child, &def.elements.tfoot) {
                &mut sections.foot
            } else {
                continue;
            };
            section.get_or_insert(child);
            containers.push(child);
            unseen_rows.extend(self.host.children_named(child, ns, &def.elements.row));
        }
        let mut unseen_entries = IndexSet::new();
        for &row in &unseen_rows {
            unseen_entries.extend(self.host.children_named(row, ns, &def.elements.entry));
        }
        let live: FxHashSet<NodeId> = grid.cells().filter_map(|(_, cell)| cell.element).collect();

        let mut used_rows = FxHashSet::default();
        let mut used_entries = FxHashSet::default();
        let mut previous_rows: [Option<NodeId>; 3] = [None; 3];

        for row in 0..height {
            let section = if grid.is_header_row(row) {
                RowSection::Header
            } else if grid.is_footer_row(row) {
                RowSection::Footer
            } else {
                RowSection::Body
            };
            let container = self.section_container(&mut sections, section, tgroup)?;

            let row_node = match grid.row_specifications[row].element {
                Some(node) if !used_rows.contains(&node) => node,
                _ => {
                    log::trace!("creating row node for grid row {}", row);
                    self.host.create_element(ns, &def.elements.row)
                }
            };
            used_rows.insert(row_node);
            unseen_rows.shift_remove(&row_node);
            grid.row_specifications[row].element = Some(row_node);

            let valign = grid.row_specifications[row]
                .vertical_alignment
                .map(|v| def.vertical_alignment_token(v).to_string());
            self.host.set_attribute(row_node, &def.attributes.valign, valign.as_deref());

            let slot = section as usize;
            self.place_after(container, row_node, previous_rows[slot])?;
            previous_rows[slot] = Some(row_node);

            let mut previous_entry = None;
            let mut column = 0;
            while column < grid.width() {
                let id = grid
                    .cell_id_at(row, column)
                    .ok_or(TableError::SpanInconsistency { row, column })?;
                let (origin, size, element) = match grid.cell(id) {
                    Some(cell) if cell.covers(row, column) => {
                        (cell.origin, cell.size, cell.element)
                    }
                    _ => return Err(TableError::SpanInconsistency { row, column }),
                };
                if origin.row < row {
                    column = origin.column + size.columns;
                    continue;
                }
                if origin.column != column {
                    return Err(TableError::SpanInconsistency { row, column });
                }

                let entry = match element {
                    Some(node) if !used_entries.contains(&node) => node,
                    _ => {
                        log::trace!("creating entry node for cell at ({}, {})", row, column);
                        self.host.create_element(ns, &def.elements.entry)
                    }
                };
                used_entries.insert(entry);
                unseen_entries.shift_remove(&entry);
                if let Some(cell) = grid.cell_mut(id) {
                    cell.element = Some(entry);
                }
                self.write_entry_attributes(grid, id, entry)?;
                self.place_after(row_node, entry, previous_entry)?;
                previous_entry = Some(entry);
                column += size.columns;
            }

            // Stale entries left behind in a reused row
            for child in self.host.children_named(row_node, ns, &def.elements.entry) {
                if unseen_entries.contains(&child) && !live.contains(&child) {
                    self.host.remove(child);
                    unseen_entries.shift_remove(&child);
                }
            }
        }

        for row in unseen_rows {
            self.host.remove(row);
        }
        for container in containers {
            let primary_body = Some(container) == sections.body;
            if self.host.parent(container).is_some()
                && (!primary_body || height == 0)
                && self.host.children_named(container, ns, &def.elements.row).is_empty()
            {
                self.host.remove(container);
            }
        }

        log::debug!(
            "wrote {}x{} grid into table {}",
            height,
            grid.width(),
            self.table.index()
        );
        Ok(())
    }

    fn is(&self, node: NodeId, local_name: &str) -> bool {
        self.definition.is(&*self.host, node, local_name)
    }

    /// Replace every column definition with fresh ones
    fn write_column_specifications(&mut self, tgroup: NodeId, grid: &GridModel) -> TableResult<()> {
        let def = self.definition;
        let ns = def.namespace();
        let attrs = &def.attributes;
        for colspec in self.host.children_named(tgroup, ns, &def.elements.colspec) {
            self.host.remove(colspec);
        }
        let reference = self.host.element_children(tgroup).into_iter().next();
        for spec in &grid.column_specifications {
            let colspec = self.host.create_element(ns, &def.elements.colspec);
            let number = (spec.column_number + 1).to_string();
            self.host.set_attribute(colspec, &attrs.colname, Some(&spec.column_name));
            self.host.set_attribute(colspec, &attrs.colnum, Some(&number));
            self.host.set_attribute(colspec, &attrs.colwidth, Some(&spec.column_width));
            let column_separator = def.separator_token(spec.column_separator);
            let row_separator = def.separator_token(spec.row_separator);
            self.host.set_attribute(colspec, &attrs.colsep, Some(column_separator));
            self.host.set_attribute(colspec, &attrs.rowsep, Some(row_separator));
            let align = spec.alignment.map(|a| def.alignment_token(a).to_string());
            self.host.set_attribute(colspec, &attrs.align, align.as_deref());
            self.host.insert_before(tgroup, colspec, reference)?;
        }
        Ok(())
    }

    /// Container for a section, creating it in CALS order when missing
    fn section_container(
        &mut self,
        sections: &mut Sections,
        section: RowSection,
        tgroup: NodeId,
    ) -> TableResult<NodeId> {
        let existing = match section {
            RowSection::Header => sections.head,
            RowSection::Body => sections.body,
            RowSection::Footer => sections.foot,
        };
        if let Some(container) = existing {
            return Ok(container);
        }

        let def = self.definition;
        let elements = &def.elements;
        // thead precedes tfoot, which precedes the body
        let (name, before): (&String, Vec<&String>) = match section {
            RowSection::Header => (
                &elements.thead,
                vec![&elements.tfoot, &elements.tbody, &elements.row],
            ),
            RowSection::Footer => (&elements.tfoot, vec![&elements.tbody, &elements.row]),
            RowSection::Body => (&elements.tbody, Vec::new()),
        };
        let reference = self
            .host
            .element_children(tgroup)
            .into_iter()
            .find(|&child| before.iter().any(|candidate| self.is(child, candidate)));
        let container = self.host.create_element(def.namespace(), name);
        self.host.insert_before(tgroup, container, reference)?;

        match section {
            RowSection::Header => sections.head = Some(container),
            RowSection::Body => sections.body = Some(container),
            RowSection::Footer => sections.foot = Some(container),
        }
        Ok(container)
    }

    /// Move `node` directly after `previous` among the element children of
    /// `parent`, or first when `previous` is `None`. Nodes already in place
    /// are left alone.
    fn place_after(
        &mut self,
        parent: NodeId,
        node: NodeId,
        previous: Option<NodeId>,
    ) -> TableResult<()> {
        let siblings = self.host.element_children(parent);
        let reference = match previous {
            Some(previous) => siblings
                .iter()
                .position(|&c| c == previous)
                .and_then(|i| siblings.get(i + 1).copied()),
            None => siblings.first().copied(),
        };
        if reference == Some(node) {
            return Ok(());
        }
        log::trace!("moving {} into {}", node, parent);
        self.host.insert_before(parent, node, reference)
    }

    fn write_entry_attributes(
        &mut self,
        grid: &mut GridModel,
        id: CellId,
        entry: NodeId,
    ) -> TableResult<()> {
        let def = self.definition;
        let attrs = &def.attributes;
        let Some(cell) = grid.cell(id) else {
            return Ok(());
        };

        let out_of_bounds = || TableError::SpanOutOfBounds {
            row: cell.origin.row,
            column: cell.origin.column,
            rows: cell.size.rows,
            columns: cell.size.columns,
        };
        let name_at = |index: usize| {
            grid.column_specifications
                .get(index)
                .map(|spec| spec.column_name.as_str())
                .ok_or_else(out_of_bounds)
        };
        let first = name_at(cell.origin.column)?.to_string();
        let last = name_at(cell.last_column())?.to_string();
        let (column_name, name_start, name_end) = if cell.size.columns > 1 {
            (None, Some(first), Some(last))
        } else {
            (Some(first), None, None)
        };
        let more_rows = (cell.size.rows > 1).then(|| (cell.size.rows - 1).to_string());
        let column_separator = def.separator_token(grid.column_separator(cell)).to_string();
        let row_separator = def.separator_token(grid.row_separator(cell)).to_string();
        let align = cell
            .data
            .horizontal_alignment
            .as_override()
            .map(|a| def.alignment_token(*a).to_string());
        let valign = cell
            .data
            .vertical_alignment
            .as_override()
            .map(|v| def.vertical_alignment_token(*v).to_string());
        let output_class = match &cell.data.output_class {
            CellAttribute::Override(class) => Some(class.clone()),
            CellAttribute::Inherit => None,
        };

        let host = &mut *self.host;
        host.set_attribute(entry, &attrs.colname, column_name.as_deref());
        host.set_attribute(entry, &attrs.namest, name_start.as_deref());
        host.set_attribute(entry, &attrs.nameend, name_end.as_deref());
        host.set_attribute(entry, &attrs.morerows, more_rows.as_deref());
        host.set_attribute(entry, &attrs.colsep, Some(&column_separator));
        host.set_attribute(entry, &attrs.rowsep, Some(&row_separator));
        host.set_attribute(entry, &attrs.align, align.as_deref());
        host.set_attribute(entry, &attrs.valign, valign.as_deref());
        host.set_attribute(entry, &attrs.outputclass, output_class.as_deref());

        if let Some(cell) = grid.cell_mut(id) {
            cell.data.column_name = column_name;
            cell.data.name_start = name_start;
            cell.data.name_end = name_end;
        }
        Ok(())
    }
}
