//! Serialize/deserialize hook for canvas layouts.
//!
//! The canvas itself is session-only: it never writes a layout anywhere. A
//! host that wants layouts to outlive the session exports them (or listens
//! for [`CanvasEvent::LayoutChanged`](crate::controller::CanvasEvent)) and
//! hands them to a [`LayoutStore`] of its choosing.

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::connections::validate;
use crate::error::LayoutError;
use crate::state::{Connection, Position};
use crate::viewport::Transform;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CanvasLayout {
    #[serde(default)]
    pub positions: BTreeMap<String, Position>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub transform: Transform,
}

impl CanvasLayout {
    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and structurally check a layout. Connections referring to nodes
    /// that are not on the canvas are accepted here and pruned on the next
    /// reconciliation.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layout: CanvasLayout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        for c in &self.connections {
            validate(&c.from, &c.to).map_err(LayoutError::InvalidConnection)?;
        }
        Ok(())
    }
}

/// Where a host keeps layouts between sessions.
pub trait LayoutStore {
    fn load(&self) -> Result<Option<CanvasLayout>, LayoutError>;
    fn save(&self, layout: &CanvasLayout) -> Result<(), LayoutError>;
}

/// Keeps the serialized layout in memory.
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    json: RefCell<Option<String>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn load(&self) -> Result<Option<CanvasLayout>, LayoutError> {
        self.json
            .borrow()
            .as_deref()
            .map(CanvasLayout::from_json)
            .transpose()
    }

    fn save(&self, layout: &CanvasLayout) -> Result<(), LayoutError> {
        *self.json.borrow_mut() = Some(layout.to_json()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SocketId;

    fn sample() -> CanvasLayout {
        CanvasLayout {
            positions: [("a".to_string(), Position::new(10.0, 20.0))].into_iter().collect(),
            connections: vec![Connection::between("a", "b")],
            transform: Transform { scale: 1.5, translate_x: -30.0, translate_y: 8.0 },
        }
    }

    #[test]
    fn json_round_trip() {
        let layout = sample();
        let parsed = CanvasLayout::from_json(&layout.to_json().unwrap()).unwrap();
        assert_eq!(parsed, layout);
    }

    #[test]
    fn missing_sections_default() {
        let layout = CanvasLayout::from_json("{}").unwrap();
        assert!(layout.positions.is_empty());
        assert!(layout.connections.is_empty());
        assert_eq!(layout.transform, Transform::new());
    }

    #[test]
    fn rejects_reversed_connection() {
        let mut layout = sample();
        layout.connections = vec![Connection {
            from: SocketId::input("a"),
            to: SocketId::output("b"),
        }];
        let json = layout.to_json().unwrap();
        assert!(matches!(
            CanvasLayout::from_json(&json),
            Err(LayoutError::InvalidConnection(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(CanvasLayout::from_json("{not json"), Err(LayoutError::Json(_))));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryLayoutStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
    }
}
