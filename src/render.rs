//! Pure projection of canvas state into a framework-neutral visual tree.
//!
//! Node boxes and connection paths are in canvas space and live inside a
//! layer carrying [`Scene::layer_transform`], so the whole layer scales
//! together while node-local geometry stays untransformed. The context menu
//! is in screen space.

use pulldown_cmark::{html, Event, Parser};

use crate::connections::{bezier_path, ConnectionGraph};
use crate::menu::{ContextMenuState, MenuEntry};
use crate::selection::Selection;
use crate::state::{DragConnection, Lookup, Node, SocketDirection, TaskRecord};
use crate::viewport::Transform;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub selected: bool,
    pub name: String,
    pub agent: Option<String>,
    pub workflow: Option<String>,
    pub description_html: String,
    pub expected_output: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionPath {
    pub key: String,
    pub d: String,
    /// Either endpoint is selected.
    pub emphasized: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MenuView {
    pub x: f64,
    pub y: f64,
    pub entries: Vec<MenuEntry>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub layer_transform: String,
    pub scale: f64,
    pub nodes: Vec<NodeBox>,
    pub connections: Vec<ConnectionPath>,
    /// Dashed path from the dragged output socket to the pointer.
    pub preview: Option<String>,
    pub menu: Option<MenuView>,
}

/// Markdown to HTML for a task description. Raw HTML in the source is
/// escaped as text, since descriptions come from the host's data.
pub fn render_markdown(md: &str) -> String {
    let parser = Parser::new(md).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

fn node_box(node: &Node, task: Option<&TaskRecord>, lookup: &Lookup, selected: bool) -> NodeBox {
    let (name, agent, workflow, description_html, expected_output) = match task {
        Some(t) => (
            t.name.clone(),
            t.assigned_agent.as_deref().map(|id| lookup.agent_label(id)),
            t.workflow_id
                .as_deref()
                .filter(|_| t.execute_workflow)
                .map(|id| lookup.workflow_label(id)),
            render_markdown(&t.description),
            t.expected_output.clone(),
        ),
        None => (node.id.clone(), None, None, String::new(), String::new()),
    };

    NodeBox {
        id: node.id.clone(),
        x: node.x,
        y: node.y,
        width: node.width,
        height: node.height,
        selected,
        name,
        agent,
        workflow,
        description_html,
        expected_output,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn render_scene(
    nodes: &[Node],
    connections: &ConnectionGraph,
    transform: &Transform,
    selection: &Selection,
    drag: Option<&DragConnection>,
    menu: Option<(&ContextMenuState, Vec<MenuEntry>)>,
    tasks: &[TaskRecord],
    lookup: &Lookup,
) -> Scene {
    let find = |id: &str| nodes.iter().find(|n| n.id == id);

    let node_boxes = nodes
        .iter()
        .map(|n| {
            let task = tasks.iter().find(|t| t.id == n.id);
            node_box(n, task, lookup, selection.contains(&n.id))
        })
        .collect();

    let paths = connections
        .iter()
        .filter_map(|c| {
            let from = find(&c.from.node_id)?;
            let to = find(&c.to.node_id)?;
            let (x1, y1) = from.socket_anchor(SocketDirection::Output);
            let (x2, y2) = to.socket_anchor(SocketDirection::Input);
            Some(ConnectionPath {
                key: c.key(),
                d: bezier_path(x1, y1, x2, y2),
                emphasized: selection.contains(&from.id) || selection.contains(&to.id),
            })
        })
        .collect();

    let preview = drag.and_then(|d| {
        let from = find(&d.from.node_id)?;
        let (x1, y1) = from.socket_anchor(d.from.direction);
        let (x2, y2) = transform.screen_to_canvas(d.pointer_x, d.pointer_y);
        Some(bezier_path(x1, y1, x2, y2))
    });

    let menu = menu.map(|(state, entries)| MenuView {
        x: state.x,
        y: state.y,
        entries,
    });

    Scene {
        layer_transform: transform.css_transform(),
        scale: transform.scale,
        nodes: node_boxes,
        connections: paths,
        preview,
        menu,
    }
}
