use std::collections::HashSet;

use proptest::prelude::*;
use task_canvas::config::{CanvasConfig, GridLayout, InputPolicy, ZoomLimits};
use task_canvas::connections::ConnectionGraph;
use task_canvas::controller::{CanvasController, PointerInput};
use task_canvas::positions::{grid_slot, PositionStore};
use task_canvas::state::{Position, SocketId, TaskRecord};
use task_canvas::viewport::{Transform, ViewportRect};

const IDS: [&str; 5] = ["a", "b", "c", "d", "e"];

fn tasks(ids: &[&str]) -> Vec<TaskRecord> {
    ids.iter().map(|id| TaskRecord::new(*id, id.to_uppercase())).collect()
}

proptest! {
    #[test]
    fn prop_wheel_zoom_stays_in_limits(
        steps in proptest::collection::vec((-1.0f64..1.0, 0.0f64..1600.0, 0.0f64..1000.0), 0..200)
    ) {
        let limits = ZoomLimits::default();
        let mut t = Transform::new();
        for (delta, x, y) in steps {
            t.zoom_at(x, y, delta, &limits);
            prop_assert!(t.scale >= limits.min && t.scale <= limits.max);
        }
    }

    #[test]
    fn prop_screen_canvas_round_trip(
        scale in 0.1f64..2.0,
        tx in -10_000.0f64..10_000.0,
        ty in -10_000.0f64..10_000.0,
        x in -10_000.0f64..10_000.0,
        y in -10_000.0f64..10_000.0,
    ) {
        let t = Transform { scale, translate_x: tx, translate_y: ty };
        let (cx, cy) = t.screen_to_canvas(x, y);
        let (sx, sy) = t.canvas_to_screen(cx, cy);
        prop_assert!((sx - x).abs() < 1e-6);
        prop_assert!((sy - y).abs() < 1e-6);
    }

    #[test]
    fn prop_new_tasks_fill_distinct_grid_slots(count in 0..40usize) {
        let ids: Vec<String> = (0..count).map(|i| format!("t{i}")).collect();
        let records: Vec<TaskRecord> = ids.iter().map(|id| TaskRecord::new(id.clone(), id.clone())).collect();
        let grid = GridLayout::default();
        let mut store = PositionStore::new();
        store.reconcile(&records, &grid);

        let mut seen = HashSet::new();
        for (i, id) in ids.iter().enumerate() {
            let p = store.get(id).unwrap();
            prop_assert_eq!(p, grid_slot(i, &grid));
            prop_assert!(seen.insert((p.x as i64, p.y as i64)));
        }
    }

    #[test]
    fn prop_multi_drag_preserves_relative_offsets(dx in -300i32..300, dy in -300i32..300) {
        let (dx, dy) = (dx as f64, dy as f64);
        let mut canvas = CanvasController::new(CanvasConfig::default());
        canvas.set_viewport(Some(ViewportRect::new(0.0, 0.0, 1600.0, 1000.0)));
        canvas.set_tasks(tasks(&["a", "b", "c", "d"]));

        // Select a and b, then drag from a's body.
        canvas.pointer_down(PointerInput::primary(200.0, 150.0));
        canvas.pointer_up(PointerInput::primary(200.0, 150.0));
        canvas.pointer_down(PointerInput::primary(600.0, 150.0).with_shift());
        canvas.pointer_up(PointerInput::primary(600.0, 150.0));
        canvas.pointer_down(PointerInput::primary(200.0, 150.0));
        canvas.pointer_move(PointerInput::primary(200.0 + dx, 150.0 + dy));
        canvas.pointer_up(PointerInput::primary(200.0 + dx, 150.0 + dy));

        prop_assert_eq!(canvas.position("a"), Some(Position::new(100.0 + dx, 100.0 + dy)));
        prop_assert_eq!(canvas.position("b"), Some(Position::new(520.0 + dx, 100.0 + dy)));
        prop_assert_eq!(canvas.position("c"), Some(Position::new(940.0, 100.0)));
        prop_assert_eq!(canvas.position("d"), Some(Position::new(100.0, 350.0)));
    }

    #[test]
    fn prop_connection_invariants_hold(
        attempts in proptest::collection::vec((0..5usize, 0..5usize, any::<bool>()), 0..60)
    ) {
        let mut graph = ConnectionGraph::new();
        for (from, to, replace) in attempts {
            let policy = if replace { InputPolicy::Replace } else { InputPolicy::Reject };
            let _ = graph.connect(SocketId::output(IDS[from]), SocketId::input(IDS[to]), policy);
        }

        let mut pairs = HashSet::new();
        let mut inputs = HashSet::new();
        for c in graph.iter() {
            prop_assert_ne!(&c.from.node_id, &c.to.node_id);
            prop_assert!(pairs.insert(c.key()));
            prop_assert!(inputs.insert(c.to.node_id.clone()));
        }
    }

    #[test]
    fn prop_removed_tasks_leave_no_connections(keep in proptest::collection::vec(any::<bool>(), 5)) {
        let mut canvas = CanvasController::new(CanvasConfig::default());
        canvas.set_tasks(tasks(&IDS));
        for (from, to) in [("a", "c"), ("b", "d"), ("a", "e")] {
            let _ = canvas.connect(from, to);
        }

        let remaining: Vec<&str> = IDS.iter().zip(&keep).filter(|(_, k)| **k).map(|(id, _)| *id).collect();
        canvas.set_tasks(tasks(&remaining));

        for c in canvas.connections().iter() {
            prop_assert!(remaining.contains(&c.from.node_id.as_str()));
            prop_assert!(remaining.contains(&c.to.node_id.as_str()));
        }
        for id in IDS.iter().filter(|id| !remaining.contains(*id)) {
            prop_assert_eq!(canvas.position(id), None);
        }
    }
}
