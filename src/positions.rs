use std::collections::{HashMap, HashSet};

use crate::config::GridLayout;
use crate::state::{Position, TaskRecord};

/// Result of matching a new task list against stored positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    /// Ids that received a fresh grid slot, in list order.
    pub added: Vec<String>,
    /// Ids present in the previous list but not in this one.
    pub removed: Vec<String>,
    /// First non-empty list this store has seen.
    pub first_population: bool,
}

/// Node id to canvas position, kept across task-list refreshes so nodes do
/// not jump when the host re-supplies its data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionStore {
    positions: HashMap<String, Position>,
    previous_ids: Vec<String>,
    populated: bool,
}

/// Grid slot for the `index`-th stored position.
pub fn grid_slot(index: usize, grid: &GridLayout) -> Position {
    let columns = grid.columns.max(1);
    let column = (index % columns) as f64;
    let row = (index / columns) as f64;
    Position::new(
        grid.origin_x + column * grid.column_spacing,
        grid.origin_y + row * grid.row_spacing,
    )
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with known positions, e.g. restored from a saved layout.
    pub fn with_positions(positions: impl IntoIterator<Item = (String, Position)>) -> Self {
        Self {
            positions: positions.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn set(&mut self, id: &str, position: Position) {
        self.positions.insert(id.to_string(), position);
    }

    pub fn translate(&mut self, id: &str, dx: f64, dy: f64) {
        if let Some(p) = self.positions.get_mut(id) {
            p.x += dx;
            p.y += dy;
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Position> {
        self.positions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Position)> {
        self.positions.iter()
    }

    pub fn has_populated(&self) -> bool {
        self.populated
    }

    /// Mark the store as already populated, so no seeding runs for it.
    pub fn mark_populated(&mut self) {
        self.populated = true;
    }

    pub fn reconcile(&mut self, tasks: &[TaskRecord], grid: &GridLayout) -> Reconciliation {
        let mut outcome = Reconciliation {
            first_population: !self.populated && !tasks.is_empty(),
            ..Reconciliation::default()
        };

        for task in tasks {
            if self.positions.contains_key(&task.id) {
                continue;
            }
            // Stored immediately so the next new task in this batch gets the next slot.
            let slot = grid_slot(self.positions.len(), grid);
            self.positions.insert(task.id.clone(), slot);
            outcome.added.push(task.id.clone());
        }

        let current: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        outcome.removed = self
            .previous_ids
            .iter()
            .filter(|id| !current.contains(id.as_str()))
            .cloned()
            .collect();

        // Also drops entries restored for ids that never showed up.
        self.positions.retain(|id, _| current.contains(id.as_str()));

        self.previous_ids = tasks.iter().map(|t| t.id.clone()).collect();
        if !tasks.is_empty() {
            self.populated = true;
        }
        outcome
    }
}
