use std::collections::HashSet;

use crate::config::InputPolicy;
use crate::error::ConnectError;
use crate::state::{Connection, SocketDirection, SocketId};

/// Directed edges between node sockets.
///
/// Invariants held by every mutation:
/// - an edge never starts and ends on the same node,
/// - each ordered `(from, to)` socket pair appears at most once,
/// - under [`InputPolicy::Reject`] and [`InputPolicy::Replace`] an input
///   socket has at most one incoming edge.
///
/// Output sockets may fan out to any number of inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionGraph {
    connections: Vec<Connection>,
}

/// Cubic bezier between two socket anchors, control points pulled
/// horizontally by half the horizontal distance.
pub fn bezier_path(x1: f64, y1: f64, x2: f64, y2: f64) -> String {
    let dx = (x2 - x1).abs() * 0.5;
    format!("M {x1} {y1} C {} {y1}, {} {y2}, {x2} {y2}", x1 + dx, x2 - dx)
}

/// Structural check shared by gesture edits and layout import.
pub fn validate(from: &SocketId, to: &SocketId) -> Result<(), ConnectError> {
    if from.direction != SocketDirection::Output || to.direction != SocketDirection::Input {
        return Err(ConnectError::WrongDirection);
    }
    if from.node_id == to.node_id {
        return Err(ConnectError::SelfLoop(from.node_id.clone()));
    }
    Ok(())
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_connections(connections: impl IntoIterator<Item = Connection>) -> Self {
        let mut graph = Self::new();
        for c in connections {
            if validate(&c.from, &c.to).is_ok()
                && !graph.contains(&c)
                && graph.incoming(&c.to).is_none()
            {
                graph.connections.push(c);
            }
        }
        graph
    }

    /// Add `from -> to`.
    ///
    /// Returns the edge displaced from the input socket when the policy is
    /// [`InputPolicy::Replace`].
    pub fn connect(
        &mut self,
        from: SocketId,
        to: SocketId,
        policy: InputPolicy,
    ) -> Result<Option<Connection>, ConnectError> {
        validate(&from, &to)?;

        let connection = Connection { from, to };
        if self.contains(&connection) {
            return Err(ConnectError::Duplicate {
                from: connection.from.node_id,
                to: connection.to.node_id,
            });
        }

        let displaced = match (self.incoming(&connection.to).cloned(), policy) {
            (Some(_), InputPolicy::Reject) => {
                return Err(ConnectError::InputOccupied(connection.to.node_id));
            }
            (Some(existing), InputPolicy::Replace) => {
                self.disconnect(&existing);
                Some(existing)
            }
            (None, _) => None,
        };

        self.connections.push(connection);
        Ok(displaced)
    }

    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c != connection);
        self.connections.len() != before
    }

    pub fn contains(&self, connection: &Connection) -> bool {
        self.connections.contains(connection)
    }

    /// The edge ending at `input`, if any.
    pub fn incoming(&self, input: &SocketId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.to == input)
    }

    pub fn touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(node_id))
    }

    /// Remove every edge with an endpoint on `node_id`. Returns how many went.
    pub fn remove_node(&mut self, node_id: &str) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(node_id));
        before - self.connections.len()
    }

    /// Keep only edges whose both endpoints are in `ids`.
    pub fn retain_nodes(&mut self, ids: &HashSet<&str>) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|c| ids.contains(c.from.node_id.as_str()) && ids.contains(c.to.node_id.as_str()));
        before - self.connections.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn to_vec(&self) -> Vec<Connection> {
        self.connections.clone()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(graph: &mut ConnectionGraph, from: &str, to: &str) -> Result<Option<Connection>, ConnectError> {
        graph.connect(SocketId::output(from), SocketId::input(to), InputPolicy::Reject)
    }

    mod invariants {
        use super::*;

        #[test]
        fn self_loop_is_rejected() {
            let mut graph = ConnectionGraph::new();
            assert_eq!(connect(&mut graph, "a", "a"), Err(ConnectError::SelfLoop("a".to_string())));
            assert!(graph.is_empty());
        }

        #[test]
        fn duplicate_leaves_one_edge() {
            let mut graph = ConnectionGraph::new();
            assert_eq!(connect(&mut graph, "a", "b"), Ok(None));
            assert!(matches!(connect(&mut graph, "a", "b"), Err(ConnectError::Duplicate { .. })));
            assert_eq!(graph.len(), 1);
        }

        #[test]
        fn wrong_direction_is_rejected() {
            let mut graph = ConnectionGraph::new();
            let result = graph.connect(SocketId::input("a"), SocketId::output("b"), InputPolicy::Reject);
            assert_eq!(result, Err(ConnectError::WrongDirection));
        }

        #[test]
        fn fan_out_is_allowed() {
            let mut graph = ConnectionGraph::new();
            connect(&mut graph, "a", "b").unwrap();
            connect(&mut graph, "a", "c").unwrap();
            assert_eq!(graph.len(), 2);
        }
    }

    mod input_policy {
        use super::*;

        #[test]
        fn reject_keeps_existing_incoming_edge() {
            let mut graph = ConnectionGraph::new();
            connect(&mut graph, "a", "c").unwrap();
            assert_eq!(connect(&mut graph, "b", "c"), Err(ConnectError::InputOccupied("c".to_string())));
            assert!(graph.contains(&Connection::between("a", "c")));
            assert_eq!(graph.len(), 1);
        }

        #[test]
        fn replace_swaps_incoming_edge() {
            let mut graph = ConnectionGraph::new();
            connect(&mut graph, "a", "c").unwrap();
            let displaced = graph
                .connect(SocketId::output("b"), SocketId::input("c"), InputPolicy::Replace)
                .unwrap();
            assert_eq!(displaced, Some(Connection::between("a", "c")));
            assert!(graph.contains(&Connection::between("b", "c")));
            assert_eq!(graph.len(), 1);
        }
    }

    mod removal {
        use super::*;

        #[test]
        fn remove_node_cascades_both_directions() {
            let mut graph = ConnectionGraph::new();
            connect(&mut graph, "a", "b").unwrap();
            connect(&mut graph, "b", "c").unwrap();
            assert_eq!(graph.remove_node("b"), 2);
            assert!(graph.is_empty());
        }

        #[test]
        fn disconnect_reports_whether_edge_existed() {
            let mut graph = ConnectionGraph::new();
            connect(&mut graph, "a", "b").unwrap();
            assert!(graph.disconnect(&Connection::between("a", "b")));
            assert!(!graph.disconnect(&Connection::between("a", "b")));
        }

        #[test]
        fn retain_nodes_drops_dangling_edges() {
            let mut graph = ConnectionGraph::new();
            connect(&mut graph, "a", "b").unwrap();
            connect(&mut graph, "b", "c").unwrap();
            let ids: HashSet<&str> = ["a", "b"].into_iter().collect();
            assert_eq!(graph.retain_nodes(&ids), 1);
            assert!(graph.contains(&Connection::between("a", "b")));
        }

        #[test]
        fn touching_lists_edges_on_either_end() {
            let mut graph = ConnectionGraph::new();
            connect(&mut graph, "a", "b").unwrap();
            connect(&mut graph, "b", "c").unwrap();
            connect(&mut graph, "a", "c").unwrap_err();
            assert_eq!(graph.touching("b").count(), 2);
            assert_eq!(graph.touching("a").count(), 1);
        }
    }

    #[test]
    fn from_connections_skips_invalid_and_duplicate_edges() {
        let graph = ConnectionGraph::from_connections([
            Connection::between("a", "b"),
            Connection::between("a", "b"),
            Connection::between("c", "c"),
        ]);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn bezier_control_points_follow_horizontal_distance() {
        assert_eq!(bezier_path(0.0, 0.0, 100.0, 50.0), "M 0 0 C 50 0, 50 50, 100 50");
        assert_eq!(bezier_path(100.0, 10.0, 0.0, 20.0), "M 100 10 C 150 10, -50 20, 0 20");
    }
}
