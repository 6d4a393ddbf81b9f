use std::collections::HashSet;

/// Currently selected node ids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click on node `id`.
    ///
    /// Shift toggles membership. A plain click on an unselected node selects
    /// only that node; on an already selected node it keeps the group so the
    /// whole selection can be dragged.
    pub fn click_node(&mut self, id: &str, shift: bool) {
        if shift {
            self.toggle(id);
        } else if !self.ids.contains(id) {
            self.select_only(id);
        }
    }

    /// Apply a click on empty canvas.
    pub fn click_canvas(&mut self, shift: bool) {
        if !shift {
            self.clear();
        }
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn select_only(&mut self, id: &str) {
        self.ids.clear();
        self.ids.insert(id.to_string());
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.ids.iter()
    }

    /// Drop ids whose nodes no longer exist.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    /// Nodes moved by a drag anchored on `anchor`: the selection plus the anchor.
    pub fn drag_set(&self, anchor: &str) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        if !self.ids.contains(anchor) {
            ids.push(anchor.to_string());
        }
        ids.sort();
        ids
    }
}
