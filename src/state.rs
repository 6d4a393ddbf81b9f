use serde::{Deserialize, Serialize};

pub const NODE_WIDTH: f64 = 320.0;
pub const NODE_HEIGHT: f64 = 170.0;
pub const SOCKET_HIT_RADIUS: f64 = 10.0;

pub const GRID_ORIGIN_X: f64 = 100.0;
pub const GRID_ORIGIN_Y: f64 = 100.0;
pub const GRID_COLUMN_SPACING: f64 = 420.0;
pub const GRID_ROW_SPACING: f64 = 250.0;
pub const GRID_COLUMNS: usize = 3;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

pub const HISTORY_DEPTH: usize = 100;

/// A task as the surrounding application stores it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default)]
    pub execute_workflow: bool,
    #[serde(default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub assigned_agent: Option<String>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AgentRef {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Display-name lookup for agents and workflows referenced by tasks.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Lookup {
    #[serde(default)]
    pub agents: Vec<AgentRef>,
    #[serde(default)]
    pub workflows: Vec<WorkflowRef>,
}

impl Lookup {
    /// Agent name for `id`, or the raw id when the agent is unknown.
    pub fn agent_label(&self, id: &str) -> String {
        self.agents
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn workflow_label(&self, id: &str) -> String {
        self.workflows
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SocketDirection {
    Input,
    Output,
}

/// Identity of a socket: the owning node plus which side of it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct SocketId {
    pub node_id: String,
    pub direction: SocketDirection,
}

impl SocketId {
    pub fn input(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            direction: SocketDirection::Input,
        }
    }

    pub fn output(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            direction: SocketDirection::Output,
        }
    }
}

/// A directed edge from one node's output socket to another node's input socket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: SocketId,
    pub to: SocketId,
}

impl Connection {
    pub fn between(from_node: impl Into<String>, to_node: impl Into<String>) -> Self {
        Self {
            from: SocketId::output(from_node),
            to: SocketId::input(to_node),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from.node_id == node_id || self.to.node_id == node_id
    }

    /// Stable key for keyed rendering.
    pub fn key(&self) -> String {
        format!("{}->{}", self.from.node_id, self.to.node_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
    OutputSocket,
    InputSocket,
    Body,
}

/// A task placed on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub selected: bool,
}

impl Node {
    pub fn new(id: String, position: Position, width: f64, height: f64) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            width,
            height,
            selected: false,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn input_socket(&self) -> SocketId {
        SocketId::input(self.id.clone())
    }

    pub fn output_socket(&self) -> SocketId {
        SocketId::output(self.id.clone())
    }

    /// Canvas-space anchor of a socket: left edge for input, right edge for output.
    pub fn socket_anchor(&self, direction: SocketDirection) -> (f64, f64) {
        let y = self.y + self.height / 2.0;
        match direction {
            SocketDirection::Input => (self.x, y),
            SocketDirection::Output => (self.x + self.width, y),
        }
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// Sockets sit on the box edge, so they are checked before the body.
    pub fn hit(&self, px: f64, py: f64, socket_radius: f64) -> Option<Hit> {
        let near = |(sx, sy): (f64, f64)| ((px - sx).powi(2) + (py - sy).powi(2)).sqrt() <= socket_radius;

        if near(self.socket_anchor(SocketDirection::Output)) {
            return Some(Hit::OutputSocket);
        }
        if near(self.socket_anchor(SocketDirection::Input)) {
            return Some(Hit::InputSocket);
        }
        if self.contains_point(px, py) {
            return Some(Hit::Body);
        }
        None
    }
}

/// The preview edge while the user drags from an output socket.
#[derive(Clone, Debug, PartialEq)]
pub struct DragConnection {
    pub from: SocketId,
    /// Pointer position in screen space, relative to the canvas element.
    pub pointer_x: f64,
    pub pointer_y: f64,
}
