//! Failure reasons for connection edits and layout persistence.
//!
//! Gesture-driven edits never surface these to the user; they are logged and
//! the canvas state is left unchanged.

/// Why a connection could not be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("node {0} cannot connect to itself")]
    SelfLoop(String),

    #[error("connection {from} -> {to} already exists")]
    Duplicate { from: String, to: String },

    #[error("input socket of {0} already has a connection")]
    InputOccupied(String),

    /// Connections run from an output socket to an input socket.
    #[error("connection must run from an output socket to an input socket")]
    WrongDirection,

    #[error("unknown node {0}")]
    UnknownNode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("layout json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid connection in layout: {0}")]
    InvalidConnection(#[source] ConnectError),

    #[error("layout storage: {0}")]
    Storage(String),
}
