//! Minimal CALS content model check
//!
//! Hosts without a schema can install this as their structure check: a
//! table needs a group with a non-empty body, every section needs a row
//! and every row needs an entry.

use crate::core::definition::CalsTableDefinition;
use crate::dom::{NodeId, TableHost};

pub fn check_minimal_structure<H: TableHost + ?Sized>(
    host: &H,
    table: NodeId,
    definition: &CalsTableDefinition,
) -> bool {
    let ns = definition.namespace();
    let elements = &definition.elements;
    let Some(tgroup) = host.first_child_named(table, ns, &elements.tgroup) else {
        return false;
    };

    let mut has_body = false;
    let mut rows = host.children_named(tgroup, ns, &elements.row);
    for section in [&elements.thead, &elements.tbody, &elements.tfoot] {
        for container in host.children_named(tgroup, ns, section) {
            let section_rows = host.children_named(container, ns, &elements.row);
            if section_rows.is_empty() {
                return false;
            }
            has_body |= section == &elements.tbody;
            rows.extend(section_rows);
        }
    }
    if !has_body {
        return false;
    }
    rows.iter()
        .all(|&row| host.first_child_named(row, ns, &elements.entry).is_some())
}
