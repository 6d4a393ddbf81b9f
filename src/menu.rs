use crate::connections::ConnectionGraph;
use crate::state::{Connection, Node, SocketId, TaskRecord};

/// Right-click menu opened on a node. Present means visible.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextMenuState {
    pub node_id: String,
    /// Screen position, relative to the canvas element.
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MenuEntry {
    ConnectTo {
        target: String,
        label: String,
        /// The edge already exists; choosing it again changes nothing.
        connected: bool,
    },
    RemoveConnection {
        connection: Connection,
        label: String,
    },
    EditTask(String),
    DeleteTask(String),
    Cancel,
}

impl MenuEntry {
    pub fn label(&self) -> String {
        match self {
            MenuEntry::ConnectTo { label, .. } => format!("Connect to {label}"),
            MenuEntry::RemoveConnection { label, .. } => format!("Remove {label}"),
            MenuEntry::EditTask(_) => "Edit task".to_string(),
            MenuEntry::DeleteTask(_) => "Delete task".to_string(),
            MenuEntry::Cancel => "Cancel".to_string(),
        }
    }
}

fn task_name<'a>(tasks: &'a [TaskRecord], id: &'a str) -> &'a str {
    tasks
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.name.as_str())
        .unwrap_or(id)
}

/// Entries for a menu opened on `node_id`: one connect target per other node,
/// one removal per edge touching the node, then edit, delete and cancel.
pub fn entries_for(
    node_id: &str,
    nodes: &[Node],
    connections: &ConnectionGraph,
    tasks: &[TaskRecord],
) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = nodes
        .iter()
        .filter(|n| n.id != node_id)
        .map(|n| MenuEntry::ConnectTo {
            target: n.id.clone(),
            label: task_name(tasks, &n.id).to_string(),
            connected: connections.contains(&Connection {
                from: SocketId::output(node_id),
                to: n.input_socket(),
            }),
        })
        .collect();

    entries.extend(connections.touching(node_id).map(|c| MenuEntry::RemoveConnection {
        connection: c.clone(),
        label: format!(
            "{} → {}",
            task_name(tasks, &c.from.node_id),
            task_name(tasks, &c.to.node_id)
        ),
    }));

    entries.push(MenuEntry::EditTask(node_id.to_string()));
    entries.push(MenuEntry::DeleteTask(node_id.to_string()));
    entries.push(MenuEntry::Cancel);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputPolicy;
    use crate::state::Position;

    fn fixture() -> (Vec<Node>, ConnectionGraph, Vec<TaskRecord>) {
        let tasks: Vec<TaskRecord> = ["a", "b", "c"]
            .iter()
            .map(|id| TaskRecord::new(*id, id.to_uppercase()))
            .collect();
        let nodes = tasks
            .iter()
            .map(|t| Node::new(t.id.clone(), Position::default(), 100.0, 50.0))
            .collect();
        let mut graph = ConnectionGraph::new();
        graph
            .connect(SocketId::output("a"), SocketId::input("b"), InputPolicy::Reject)
            .unwrap();
        (nodes, graph, tasks)
    }

    #[test]
    fn lists_other_nodes_as_targets() {
        let (nodes, graph, tasks) = fixture();
        let entries = entries_for("a", &nodes, &graph, &tasks);
        let targets: Vec<(&str, bool)> = entries
            .iter()
            .filter_map(|e| match e {
                MenuEntry::ConnectTo { target, connected, .. } => Some((target.as_str(), *connected)),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![("b", true), ("c", false)]);
    }

    #[test]
    fn lists_touching_connections_for_removal() {
        let (nodes, graph, tasks) = fixture();
        let entries = entries_for("b", &nodes, &graph, &tasks);
        let removals: Vec<&MenuEntry> = entries
            .iter()
            .filter(|e| matches!(e, MenuEntry::RemoveConnection { .. }))
            .collect();
        assert_eq!(removals.len(), 1);
        assert_eq!(removals[0].label(), "Remove A → B");
    }

    #[test]
    fn ends_with_edit_delete_cancel() {
        let (nodes, graph, tasks) = fixture();
        let entries = entries_for("c", &nodes, &graph, &tasks);
        let tail = &entries[entries.len() - 3..];
        assert_eq!(
            tail,
            &[
                MenuEntry::EditTask("c".to_string()),
                MenuEntry::DeleteTask("c".to_string()),
                MenuEntry::Cancel,
            ]
        );
    }
}
