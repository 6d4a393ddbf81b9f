use std::collections::VecDeque;

/// Bounded undo/redo stack of full snapshots.
///
/// `record` is called with the state *before* an edit; `undo` and `redo`
/// take the current state and hand back the one to restore.
#[derive(Clone, Debug)]
pub struct History<T: Clone> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    depth: usize,
}

impl<T: Clone> History<T> {
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth,
        }
    }

    /// Remember `before` and forget anything that could be redone.
    pub fn record(&mut self, before: T) {
        self.redo.clear();
        if self.depth == 0 {
            return;
        }
        self.push_undo(before);
    }

    fn push_undo(&mut self, state: T) {
        if self.undo.len() >= self.depth {
            self.undo.pop_front();
        }
        self.undo.push_back(state);
    }

    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
