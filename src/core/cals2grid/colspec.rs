//! Column specification resolution
//!
//! Reads the `colspec` children of a `tgroup` into exactly `cols` column
//! specifications. Undeclared columns get placeholders; declared ones may
//! be numbered explicitly (1-based, or 0-based in legacy documents) or
//! implicitly by position.

use fxhash::FxHashMap;

use crate::core::definition::CalsTableDefinition;
use crate::data::constants::{column_name, MAX_COLUMNS};
use crate::dom::{NodeId, TableHost};
use crate::features::grid::{ColumnSpecification, HorizontalAlignment};
use crate::utils::error::{TableError, TableResult};

/// Resolved columns of one table group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedColumns {
    pub specifications: Vec<ColumnSpecification>,
    /// Source column name to the name used in the grid. Only filled when
    /// names are normalized.
    pub name_map: FxHashMap<String, String>,
}

impl ResolvedColumns {
    /// Name an entry should be matched against
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.name_map.get(name).map_or(name, String::as_str)
    }
}

/// Defaults a table group hands down to its columns
#[derive(Debug, Clone, Copy)]
struct GroupDefaults {
    column_separator: bool,
    row_separator: bool,
    alignment: Option<HorizontalAlignment>,
}

/// A `colspec` as read from the source
struct DeclaredColumn {
    node: NodeId,
    number: Option<usize>,
}

/// Reads column specifications for one table group
pub struct ColumnSpecResolver<'d> {
    definition: &'d CalsTableDefinition,
}

impl<'d> ColumnSpecResolver<'d> {
    pub fn new(definition: &'d CalsTableDefinition) -> Self {
        ColumnSpecResolver { definition }
    }

    /// Number of columns a table group declares
    pub fn column_count<H: TableHost + ?Sized>(
        &self,
        host: &H,
        tgroup: NodeId,
    ) -> TableResult<usize> {
        let def = self.definition;
        let raw = host
            .attribute(tgroup, &def.attributes.cols)
            .ok_or_else(|| {
                TableError::missing_attribute(&def.elements.tgroup, &def.attributes.cols)
            })?;
        match raw.trim().parse::<usize>() {
            Ok(count) if count > 0 && count <= MAX_COLUMNS => Ok(count),
            _ => Err(TableError::invalid_attribute(&def.attributes.cols, raw)),
        }
    }

    pub fn resolve<H: TableHost + ?Sized>(
        &self,
        host: &H,
        table: NodeId,
        tgroup: NodeId,
    ) -> TableResult<ResolvedColumns> {
        let def = self.definition;
        let count = self.column_count(host, tgroup)?;
        let defaults = self.group_defaults(host, table, tgroup);

        let declared = host
            .children_named(tgroup, def.namespace(), &def.elements.colspec)
            .into_iter()
            .map(|node| -> TableResult<DeclaredColumn> {
                let number = match host.attribute(node, &def.attributes.colnum) {
                    Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                        TableError::invalid_attribute(&def.attributes.colnum, raw)
                    })?),
                    None => None,
                };
                Ok(DeclaredColumn { node, number })
            })
            .collect::<TableResult<Vec<_>>>()?;

        // Legacy documents count from 0. The first explicit number decides.
        let offset = match declared.iter().find_map(|d| d.number) {
            Some(0) => 0,
            _ => 1,
        };

        let mut resolved = ResolvedColumns::default();
        let mut position = 0;
        for column in &declared {
            let index = match column.number {
                Some(number) => {
                    if number < offset {
                        return Err(TableError::OutOfOrderColumns {
                            number,
                            previous: position + offset - 1,
                        });
                    }
                    number - offset
                }
                None => position,
            };
            if index < position {
                return Err(TableError::OutOfOrderColumns {
                    number: index + offset,
                    previous: position + offset - 1,
                });
            }
            if index >= count {
                return Err(TableError::ColumnOutOfRange {
                    number: index + offset,
                    count,
                });
            }

            while position < index {
                resolved.specifications.push(self.placeholder(position, &defaults));
                position += 1;
            }
            let spec =
                self.read_column(host, column.node, index, &defaults, &mut resolved.name_map);
            resolved.specifications.push(spec);
            position = index + 1;
        }
        while position < count {
            resolved.specifications.push(self.placeholder(position, &defaults));
            position += 1;
        }

        log::trace!(
            "resolved {} columns from {} colspecs",
            resolved.specifications.len(),
            declared.len()
        );
        Ok(resolved)
    }

    fn group_defaults<H: TableHost + ?Sized>(
        &self,
        host: &H,
        table: NodeId,
        tgroup: NodeId,
    ) -> GroupDefaults {
        let def = self.definition;
        let separator = |name: &str| {
            host.attribute(tgroup, name)
                .and_then(|v| def.parse_separator(&v))
                .or_else(|| host.attribute(table, name).and_then(|v| def.parse_separator(&v)))
                .unwrap_or(true)
        };
        GroupDefaults {
            column_separator: separator(def.attributes.colsep.as_str()),
            row_separator: separator(def.attributes.rowsep.as_str()),
            alignment: host
                .attribute(tgroup, &def.attributes.align)
                .and_then(|v| def.parse_alignment(&v)),
        }
    }

    fn placeholder(&self, index: usize, defaults: &GroupDefaults) -> ColumnSpecification {
        ColumnSpecification {
            column_width: self.definition.default_column_width.clone(),
            column_separator: defaults.column_separator,
            row_separator: defaults.row_separator,
            alignment: defaults.alignment,
            ..ColumnSpecification::placeholder(index)
        }
    }

    fn read_column<H: TableHost + ?Sized>(
        &self,
        host: &H,
        node: NodeId,
        index: usize,
        defaults: &GroupDefaults,
        name_map: &mut FxHashMap<String, String>,
    ) -> ColumnSpecification {
        let def = self.definition;
        let attrs = &def.attributes;
        let declared_name = host.attribute(node, &attrs.colname).filter(|n| !n.trim().is_empty());

        let column_name = if def.normalize_column_names {
            let canonical = column_name(index);
            if let Some(name) = declared_name {
                // Entries naming a duplicate resolve to its first column
                name_map.entry(name).or_insert_with(|| canonical.clone());
            }
            canonical
        } else {
            declared_name.unwrap_or_else(|| column_name(index))
        };

        ColumnSpecification {
            column_name,
            column_number: index,
            column_width: host
                .attribute(node, &attrs.colwidth)
                .filter(|w| !w.trim().is_empty())
                .unwrap_or_else(|| def.default_column_width.clone()),
            column_separator: host
                .attribute(node, &attrs.colsep)
                .and_then(|v| def.parse_separator(&v))
                .unwrap_or(defaults.column_separator),
            row_separator: host
                .attribute(node, &attrs.rowsep)
                .and_then(|v| def.parse_separator(&v))
                .unwrap_or(defaults.row_separator),
            alignment: host
                .attribute(node, &attrs.align)
                .and_then(|v| def.parse_alignment(&v))
                .or(defaults.alignment),
            computed_width: 0.0,
        }
    }
}
