//! Grid models of the tables in one document
//!
//! Editors keep the grid of every table they are working on so edits can
//! be staged on the model and written back in one go.

use fxhash::FxHashMap;

use crate::core::definition::TableStructure;
use crate::dom::{NodeId, TableHost};
use crate::features::grid::GridModel;
use crate::utils::error::{TableError, TableResult};

/// Grid models keyed by table root node
#[derive(Debug, Clone, Default)]
pub struct TableModelRegistry {
    models: FxHashMap<NodeId, GridModel>,
}

impl TableModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, returning the one it replaces
    pub fn insert(&mut self, table: NodeId, grid: GridModel) -> Option<GridModel> {
        self.models.insert(table, grid)
    }

    pub fn get(&self, table: NodeId) -> Option<&GridModel> {
        self.models.get(&table)
    }

    pub fn get_mut(&mut self, table: NodeId) -> Option<&mut GridModel> {
        self.models.get_mut(&table)
    }

    pub fn remove(&mut self, table: NodeId) -> Option<GridModel> {
        self.models.remove(&table)
    }

    pub fn contains(&self, table: NodeId) -> bool {
        self.models.contains_key(&table)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    /// Registered table roots in ascending node order
    pub fn tables(&self) -> Vec<NodeId> {
        let mut tables: Vec<_> = self.models.keys().copied().collect();
        tables.sort();
        tables
    }

    /// Build and register the grid of `table`, replacing any stale model
    pub fn load<S, H>(
        &mut self,
        structure: &S,
        host: &H,
        table: NodeId,
    ) -> TableResult<&mut GridModel>
    where
        S: TableStructure,
        H: TableHost + ?Sized,
    {
        let grid = structure.build_grid_model(host, table)?;
        self.models.insert(table, grid);
        self.models
            .get_mut(&table)
            .ok_or_else(|| TableError::Host(format!("table {} vanished from the registry", table)))
    }

    /// Write the registered grid of `table` back into the host.
    ///
    /// The model stays registered either way; after a rejection it is
    /// unchanged and can be edited further.
    pub fn store<S, H>(&mut self, structure: &S, host: &mut H, table: NodeId) -> TableResult<bool>
    where
        S: TableStructure,
        H: TableHost + ?Sized,
    {
        let grid = self
            .models
            .get_mut(&table)
            .ok_or_else(|| TableError::MissingElement(format!("grid model for table {}", table)))?;
        structure.apply_grid_model(grid, host, table)
    }
}
