//! Framework-agnostic canvas engine.
//!
//! The host forwards raw pointer, wheel and keyboard input together with the
//! canvas element's bounding rect; the controller owns every piece of canvas
//! state and reports outward-facing requests through [`CanvasEvent`]s. The
//! host never mutates tasks on its own behalf here: edit and delete are
//! requests, and the task list only changes when the host calls
//! [`CanvasController::set_tasks`].

use std::collections::{BTreeMap, HashSet};
use std::mem;

use tracing::{debug, info, warn};

use crate::config::CanvasConfig;
use crate::connections::ConnectionGraph;
use crate::error::{ConnectError, LayoutError};
use crate::history::History;
use crate::layout::CanvasLayout;
use crate::menu::{entries_for, ContextMenuState, MenuEntry};
use crate::positions::PositionStore;
use crate::render::{render_scene, Scene};
use crate::selection::Selection;
use crate::state::{
    Connection, DragConnection, Hit, Lookup, Node, Position, SocketDirection, SocketId, TaskRecord,
};
use crate::viewport::{Transform, ViewportRect};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer input in client (document) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    pub client_x: f64,
    pub client_y: f64,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn primary(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            ..Self::default()
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyInput {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_command(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// Outward-facing notifications.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
    TaskEditRequested(String),
    TaskDeleteRequested(String),
    /// Positions, connections or the transform changed.
    LayoutChanged(CanvasLayout),
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Idle,
    Panning {
        last_x: f64,
        last_y: f64,
        moved: bool,
    },
    DraggingNodes {
        anchor: String,
        /// Pointer offset from the anchor's top-left corner, canvas space.
        offset_x: f64,
        offset_y: f64,
        recorded: bool,
    },
    Connecting(DragConnection),
}

/// What undo/redo restores: positions and connections, never the transform.
#[derive(Clone, Debug, PartialEq)]
struct LayoutSnapshot {
    positions: Vec<(String, Position)>,
    connections: Vec<Connection>,
}

type Observer = Box<dyn FnMut(&CanvasEvent)>;

pub struct CanvasController {
    config: CanvasConfig,
    tasks: Vec<TaskRecord>,
    lookup: Lookup,
    nodes: Vec<Node>,
    positions: PositionStore,
    selection: Selection,
    connections: ConnectionGraph,
    transform: Transform,
    viewport: Option<ViewportRect>,
    gesture: Gesture,
    context_menu: Option<ContextMenuState>,
    history: History<LayoutSnapshot>,
    observers: Vec<Observer>,
}

impl CanvasController {
    pub fn new(config: CanvasConfig) -> Self {
        let config = config.normalized();
        let history = History::new(config.history_depth);
        Self {
            config,
            tasks: Vec::new(),
            lookup: Lookup::default(),
            nodes: Vec::new(),
            positions: PositionStore::new(),
            selection: Selection::new(),
            connections: ConnectionGraph::new(),
            transform: Transform::new(),
            viewport: None,
            gesture: Gesture::Idle,
            context_menu: None,
            history,
            observers: Vec::new(),
        }
    }

    /// Start from an existing position store instead of an empty one.
    pub fn with_positions(mut self, positions: PositionStore) -> Self {
        self.positions = positions;
        self
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&CanvasEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn publish(&mut self, event: CanvasEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event);
        }
    }

    fn publish_layout(&mut self) {
        let layout = self.export_layout();
        self.publish(CanvasEvent::LayoutChanged(layout));
    }

    // ---- inputs from the host ----

    /// Replace the task list and reconcile every piece of canvas state with it.
    pub fn set_tasks(&mut self, tasks: Vec<TaskRecord>) {
        let outcome = self.positions.reconcile(&tasks, &self.config.grid);
        self.tasks = tasks;

        for id in &outcome.removed {
            let dropped = self.connections.remove_node(id);
            if dropped > 0 {
                debug!(node = %id, dropped, "removed connections of deleted task");
            }
        }

        let ids: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let dangling = self.connections.retain_nodes(&ids);
        if dangling > 0 {
            debug!(dangling, "pruned connections to unknown tasks");
        }
        self.selection.retain(|id| ids.contains(id));
        if self
            .context_menu
            .as_ref()
            .is_some_and(|m| !ids.contains(m.node_id.as_str()))
        {
            self.context_menu = None;
        }
        let stale = match &self.gesture {
            Gesture::DraggingNodes { anchor, .. } => !ids.contains(anchor.as_str()),
            Gesture::Connecting(drag) => !ids.contains(drag.from.node_id.as_str()),
            _ => false,
        };
        if stale {
            debug!("cancelled gesture on a removed task");
            self.gesture = Gesture::Idle;
        }

        let seeded = outcome.first_population && self.config.seed_chain && self.seed_chain();

        self.materialize();
        info!(
            tasks = self.tasks.len(),
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            "reconciled task list"
        );

        if seeded || !outcome.added.is_empty() || !outcome.removed.is_empty() {
            self.publish_layout();
        }
    }

    /// Connect `tasks[i] -> tasks[i + 1]` for the whole list. Not undoable.
    fn seed_chain(&mut self) -> bool {
        let pairs: Vec<(String, String)> = self
            .tasks
            .windows(2)
            .map(|w| (w[0].id.clone(), w[1].id.clone()))
            .collect();
        let mut seeded = false;
        for (from, to) in pairs {
            match self.connections.connect(
                SocketId::output(from),
                SocketId::input(to),
                self.config.input_policy,
            ) {
                Ok(_) => seeded = true,
                Err(e) => debug!(error = %e, "skipped seed connection"),
            }
        }
        if seeded {
            info!(connections = self.connections.len(), "seeded default chain");
        }
        seeded
    }

    pub fn set_lookup(&mut self, lookup: Lookup) {
        self.lookup = lookup;
    }

    /// Bounding rect of the canvas element. `None` while it is not measurable;
    /// gestures are ignored until it is.
    pub fn set_viewport(&mut self, viewport: Option<ViewportRect>) {
        self.viewport = viewport;
    }

    // ---- geometry ----

    fn materialize(&mut self) {
        let (width, height) = (self.config.node_width, self.config.node_height);
        self.nodes = self
            .tasks
            .iter()
            .filter_map(|t| {
                let position = self.positions.get(&t.id)?;
                let mut node = Node::new(t.id.clone(), position, width, height);
                node.selected = self.selection.contains(&t.id);
                Some(node)
            })
            .collect();
    }

    fn sync_selection(&mut self) {
        for node in &mut self.nodes {
            node.selected = self.selection.contains(&node.id);
        }
    }

    fn local_point(&self, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
        self.viewport.and_then(|v| v.to_local(client_x, client_y))
    }

    /// Topmost node under a screen point. Later nodes paint over earlier ones.
    fn hit_test(&self, screen_x: f64, screen_y: f64) -> Option<(String, Hit)> {
        let (x, y) = self.transform.screen_to_canvas(screen_x, screen_y);
        let radius = self.config.socket_radius / self.transform.scale;
        self.nodes
            .iter()
            .rev()
            .find_map(|n| n.hit(x, y, radius).map(|hit| (n.id.clone(), hit)))
    }

    fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    // ---- pointer ----

    pub fn pointer_down(&mut self, input: PointerInput) {
        let Some((sx, sy)) = self.local_point(input.client_x, input.client_y) else {
            debug!("pointer down without a measurable viewport");
            return;
        };

        // Menu clicks are handled by the menu itself; anything reaching the
        // canvas dismisses it.
        self.context_menu = None;
        self.gesture = Gesture::Idle;
        let hit = self.hit_test(sx, sy);

        match input.button {
            PointerButton::Middle => {
                self.gesture = Gesture::Panning { last_x: sx, last_y: sy, moved: false };
            }
            PointerButton::Secondary => {
                if let Some((node_id, _)) = hit {
                    debug!(node = %node_id, "opened context menu");
                    self.context_menu = Some(ContextMenuState { node_id, x: sx, y: sy });
                }
            }
            PointerButton::Primary => match hit {
                Some((id, Hit::OutputSocket)) => self.start_connection(&id),
                Some((id, Hit::InputSocket)) if self.connections.incoming(&SocketId::input(&id)).is_some() => {
                    self.detach_input(&id);
                }
                Some((id, _)) => {
                    self.selection.click_node(&id, input.modifiers.shift);
                    self.start_node_drag(id, sx, sy);
                }
                None => {
                    self.selection.click_canvas(input.modifiers.shift);
                    self.gesture = Gesture::Panning { last_x: sx, last_y: sy, moved: false };
                }
            },
        }
        self.sync_selection();
    }

    fn start_connection(&mut self, id: &str) {
        let Some(node) = self.node(id) else { return };
        let (ax, ay) = node.socket_anchor(SocketDirection::Output);
        let (pointer_x, pointer_y) = self.transform.canvas_to_screen(ax, ay);
        debug!(node = %id, "started connection drag");
        self.gesture = Gesture::Connecting(DragConnection {
            from: SocketId::output(id),
            pointer_x,
            pointer_y,
        });
    }

    fn detach_input(&mut self, id: &str) {
        let Some(existing) = self.connections.incoming(&SocketId::input(id)).cloned() else {
            return;
        };
        let before = self.snapshot();
        if self.connections.disconnect(&existing) {
            self.history.record(before);
            info!(connection = %existing.key(), "detached connection from input");
            self.publish_layout();
        }
    }

    fn start_node_drag(&mut self, anchor: String, sx: f64, sy: f64) {
        let Some(position) = self.positions.get(&anchor) else { return };
        let (cx, cy) = self.transform.screen_to_canvas(sx, sy);
        self.gesture = Gesture::DraggingNodes {
            anchor,
            offset_x: cx - position.x,
            offset_y: cy - position.y,
            recorded: false,
        };
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let Some((sx, sy)) = self.local_point(input.client_x, input.client_y) else {
            return;
        };

        let gesture = mem::replace(&mut self.gesture, Gesture::Idle);
        self.gesture = match gesture {
            Gesture::Idle => Gesture::Idle,
            Gesture::Panning { last_x, last_y, moved } => {
                let (dx, dy) = (sx - last_x, sy - last_y);
                self.transform.pan(dx, dy);
                Gesture::Panning {
                    last_x: sx,
                    last_y: sy,
                    moved: moved || dx != 0.0 || dy != 0.0,
                }
            }
            Gesture::DraggingNodes {
                anchor,
                offset_x,
                offset_y,
                mut recorded,
            } => {
                let Some(current) = self.positions.get(&anchor) else {
                    return;
                };
                let (cx, cy) = self.transform.screen_to_canvas(sx, sy);
                let dx = cx - offset_x - current.x;
                let dy = cy - offset_y - current.y;
                if dx != 0.0 || dy != 0.0 {
                    if !recorded {
                        let before = self.snapshot();
                        self.history.record(before);
                        recorded = true;
                    }
                    for id in self.selection.drag_set(&anchor) {
                        self.positions.translate(&id, dx, dy);
                    }
                    self.materialize();
                }
                Gesture::DraggingNodes {
                    anchor,
                    offset_x,
                    offset_y,
                    recorded,
                }
            }
            Gesture::Connecting(mut drag) => {
                drag.pointer_x = sx;
                drag.pointer_y = sy;
                Gesture::Connecting(drag)
            }
        };
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        match mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Connecting(drag) => {
                let target = self
                    .local_point(input.client_x, input.client_y)
                    .and_then(|(sx, sy)| self.hit_test(sx, sy));
                match target {
                    Some((id, Hit::InputSocket)) => {
                        let _ = self.connect_sockets(drag.from, SocketId::input(id));
                    }
                    _ => debug!(from = %drag.from.node_id, "connection drag dropped on nothing"),
                }
            }
            Gesture::DraggingNodes { recorded: true, .. } | Gesture::Panning { moved: true, .. } => {
                self.publish_layout();
            }
            _ => {}
        }
    }

    /// The pointer left the canvas: connection drags are abandoned, other
    /// gestures end where they are.
    pub fn pointer_leave(&mut self) {
        match mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Connecting(_) => debug!("connection drag cancelled"),
            Gesture::DraggingNodes { recorded: true, .. } | Gesture::Panning { moved: true, .. } => {
                self.publish_layout();
            }
            _ => {}
        }
    }

    /// Wheel zoom anchored at the pointer. Only the sign of `delta_y` counts;
    /// scrolling up zooms in.
    pub fn wheel(&mut self, input: PointerInput, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let Some((sx, sy)) = self.local_point(input.client_x, input.client_y) else {
            return;
        };
        let sign = if delta_y < 0.0 { 1.0 } else { -1.0 };
        self.transform.zoom_at(sx, sy, sign, &self.config.zoom);
        self.publish_layout();
    }

    pub fn double_click(&mut self, input: PointerInput) {
        let Some((sx, sy)) = self.local_point(input.client_x, input.client_y) else {
            return;
        };
        if let Some((id, _)) = self.hit_test(sx, sy) {
            self.request_edit(&id);
        }
    }

    // ---- keyboard ----

    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, input: &KeyInput) -> bool {
        let command = input.modifiers.command();
        match input.key.as_str() {
            "Escape" => {
                if matches!(self.gesture, Gesture::Connecting(_)) {
                    self.gesture = Gesture::Idle;
                }
                self.context_menu = None;
                self.selection.clear();
                self.sync_selection();
                true
            }
            "Delete" | "Backspace" => {
                let mut ids: Vec<String> = self.selection.iter().cloned().collect();
                ids.sort();
                for id in &ids {
                    self.request_delete(id);
                }
                !ids.is_empty()
            }
            "z" | "Z" if command => {
                if input.modifiers.shift {
                    self.redo()
                } else {
                    self.undo()
                }
            }
            "y" | "Y" if command => self.redo(),
            "+" | "=" => {
                self.zoom_in();
                true
            }
            "-" => {
                self.zoom_out();
                true
            }
            "0" => {
                self.reset_view();
                true
            }
            _ => false,
        }
    }

    // ---- context menu ----

    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        match &self.context_menu {
            Some(menu) => entries_for(&menu.node_id, &self.nodes, &self.connections, &self.tasks),
            None => Vec::new(),
        }
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    pub fn choose_menu_entry(&mut self, entry: &MenuEntry) {
        let Some(menu) = self.context_menu.take() else {
            return;
        };
        match entry {
            MenuEntry::ConnectTo { target, .. } => {
                let _ = self.connect(&menu.node_id, target);
            }
            MenuEntry::RemoveConnection { connection, .. } => {
                self.disconnect(connection);
            }
            MenuEntry::EditTask(id) => self.request_edit(id),
            MenuEntry::DeleteTask(id) => self.request_delete(id),
            MenuEntry::Cancel => {}
        }
    }

    // ---- commands ----

    pub fn request_edit(&mut self, id: &str) {
        if self.tasks.iter().any(|t| t.id == id) {
            info!(task = %id, "edit requested");
            self.publish(CanvasEvent::TaskEditRequested(id.to_string()));
        }
    }

    pub fn request_delete(&mut self, id: &str) {
        if self.tasks.iter().any(|t| t.id == id) {
            info!(task = %id, "delete requested");
            self.publish(CanvasEvent::TaskDeleteRequested(id.to_string()));
        }
    }

    /// Connect `from_node`'s output to `to_node`'s input.
    pub fn connect(&mut self, from_node: &str, to_node: &str) -> Result<(), ConnectError> {
        self.connect_sockets(SocketId::output(from_node), SocketId::input(to_node))
    }

    fn connect_sockets(&mut self, from: SocketId, to: SocketId) -> Result<(), ConnectError> {
        for id in [&from.node_id, &to.node_id] {
            if self.node(id).is_none() {
                return Err(ConnectError::UnknownNode(id.clone()));
            }
        }

        let before = self.snapshot();
        match self.connections.connect(from, to, self.config.input_policy) {
            Ok(displaced) => {
                self.history.record(before);
                if let Some(old) = displaced {
                    info!(connection = %old.key(), "replaced connection");
                }
                info!(connections = self.connections.len(), "connected");
                self.publish_layout();
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "connection rejected");
                Err(e)
            }
        }
    }

    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let before = self.snapshot();
        if !self.connections.disconnect(connection) {
            return false;
        }
        self.history.record(before);
        info!(connection = %connection.key(), "disconnected");
        self.publish_layout();
        true
    }

    pub fn zoom_in(&mut self) {
        self.transform.zoom_in(&self.config.zoom);
        self.publish_layout();
    }

    pub fn zoom_out(&mut self) {
        self.transform.zoom_out(&self.config.zoom);
        self.publish_layout();
    }

    pub fn reset_view(&mut self) {
        self.transform.reset();
        self.publish_layout();
    }

    // ---- history ----

    fn snapshot(&self) -> LayoutSnapshot {
        let mut positions: Vec<(String, Position)> =
            self.positions.iter().map(|(id, p)| (id.clone(), *p)).collect();
        positions.sort_by(|a, b| a.0.cmp(&b.0));
        LayoutSnapshot {
            positions,
            connections: self.connections.to_vec(),
        }
    }

    /// Restore a snapshot against the current task list: nodes added since
    /// keep their place, edges to removed nodes are not resurrected.
    fn restore(&mut self, snapshot: LayoutSnapshot) {
        let ids: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        for (id, position) in &snapshot.positions {
            if ids.contains(id.as_str()) {
                self.positions.set(id, *position);
            }
        }
        self.connections = ConnectionGraph::from_connections(snapshot.connections);
        self.connections.retain_nodes(&ids);
        self.materialize();
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        self.restore(previous);
        info!("undo");
        self.publish_layout();
        true
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        self.restore(next);
        info!("redo");
        self.publish_layout();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- layout hook ----

    pub fn export_layout(&self) -> CanvasLayout {
        CanvasLayout {
            positions: self
                .positions
                .iter()
                .map(|(id, p)| (id.clone(), *p))
                .collect::<BTreeMap<_, _>>(),
            connections: self.connections.to_vec(),
            transform: self.transform,
        }
    }

    /// Adopt a saved layout. Suppresses the default chain, since the layout
    /// already says what is connected. Unknown ids are pruned against the
    /// current (or next) task list.
    pub fn import_layout(&mut self, layout: CanvasLayout) -> Result<(), LayoutError> {
        layout.validate()?;

        let mut positions = PositionStore::with_positions(layout.positions);
        positions.mark_populated();
        self.positions = positions;
        self.connections = ConnectionGraph::from_connections(layout.connections);
        self.transform = Transform {
            scale: self.config.zoom.clamp(layout.transform.scale),
            ..layout.transform
        };
        self.history.clear();
        self.gesture = Gesture::Idle;
        self.context_menu = None;

        if !self.tasks.is_empty() {
            self.positions.reconcile(&self.tasks, &self.config.grid);
            let ids: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
            self.connections.retain_nodes(&ids);
            self.selection.retain(|id| ids.contains(id));
        }
        self.materialize();
        info!(
            positions = self.positions.len(),
            connections = self.connections.len(),
            "imported layout"
        );
        Ok(())
    }

    /// Import from JSON, logging and ignoring anything unusable.
    pub fn import_layout_json(&mut self, json: &str) -> Result<(), LayoutError> {
        let layout = CanvasLayout::from_json(json).inspect_err(|e| {
            warn!(error = %e, "discarding saved layout");
        })?;
        self.import_layout(layout)
    }

    // ---- read access ----

    pub fn scene(&self) -> Scene {
        let drag = match &self.gesture {
            Gesture::Connecting(drag) => Some(drag),
            _ => None,
        };
        let menu = self
            .context_menu
            .as_ref()
            .map(|m| (m, self.menu_entries()));
        render_scene(
            &self.nodes,
            &self.connections,
            &self.transform,
            &self.selection,
            drag,
            menu,
            &self.tasks,
            &self.lookup,
        )
    }

    /// CSS cursor for the current gesture.
    pub fn cursor(&self) -> &'static str {
        match self.gesture {
            Gesture::Idle => "default",
            Gesture::Panning { .. } => "grabbing",
            Gesture::DraggingNodes { .. } => "move",
            Gesture::Connecting(_) => "crosshair",
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id)
    }

    pub fn connections(&self) -> &ConnectionGraph {
        &self.connections
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn drag_connection(&self) -> Option<&DragConnection> {
        match &self.gesture {
            Gesture::Connecting(drag) => Some(drag),
            _ => None,
        }
    }

    pub fn context_menu(&self) -> Option<&ContextMenuState> {
        self.context_menu.as_ref()
    }
}
