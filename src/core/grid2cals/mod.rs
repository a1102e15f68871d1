//! Grid model to CALS table
//!
//! Writes a [`GridModel`] back into an existing CALS `table` element as one
//! host batch:
//!
//! ```text
//! begin batch -> tgroup/cols -> colspecs -> rows and entries -> prune
//!             -> host structure check -> commit | discard
//! ```
//!
//! Entry and row nodes recorded on the grid are moved rather than
//! recreated, so cell content survives merges, splits and reordering.

mod completion;
mod serializer;

#[cfg(test)]
mod tests;

// Re-export public API
pub use completion::check_minimal_structure;
pub use serializer::GridSerializer;

use crate::core::definition::CalsTableDefinition;
use crate::dom::{NodeId, TableHost};
use crate::features::grid::GridModel;
use crate::utils::error::TableResult;

/// Write `grid` into `table`.
///
/// Returns `Ok(true)` when the edits were committed and `Ok(false)` when
/// the host's structure check rejected them. On `Ok(false)` and on error
/// the pending edits are discarded and `grid` is restored to its state on
/// entry.
pub fn apply_grid_model<H: TableHost + ?Sized>(
    grid: &mut GridModel,
    host: &mut H,
    table: NodeId,
    definition: &CalsTableDefinition,
) -> TableResult<bool> {
    let snapshot = grid.clone();
    host.begin_batch();

    let written = GridSerializer::new(&mut *host, definition, table).write(grid);
    match written {
        Ok(()) if host.complete_structure(table) => {
            host.commit_batch();
            Ok(true)
        }
        Ok(()) => {
            log::debug!("host rejected the serialized table, discarding");
            host.discard_batch();
            *grid = snapshot;
            Ok(false)
        }
        Err(err) => {
            log::warn!("failed to serialize grid model: {}", err);
            host.discard_batch();
            *grid = snapshot;
            Err(err)
        }
    }
}
