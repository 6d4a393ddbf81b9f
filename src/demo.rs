use leptos::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use crate::app::TaskCanvas;
use crate::state::{Lookup, TaskRecord};

const DEMO_JSON: &str = include_str!("demo_tasks.json");
const LAYOUT_KEY: &str = "task-canvas-layout";

#[derive(Deserialize, Default)]
struct DemoData {
    #[serde(default)]
    tasks: Vec<TaskRecord>,
    #[serde(default)]
    lookup: Lookup,
}

fn demo_data() -> DemoData {
    serde_json::from_str(DEMO_JSON).unwrap_or_else(|e| {
        warn!(error = %e, "bundled demo data is invalid, starting empty");
        DemoData::default()
    })
}

/// Stand-in for the surrounding application: owns the task list and
/// answers the canvas's edit/delete requests.
#[component]
pub fn Workspace() -> impl IntoView {
    let data = demo_data();
    let (tasks, set_tasks) = signal(data.tasks);
    let lookup = Signal::stored(data.lookup);

    let on_task_edit = Callback::new(move |id: String| {
        info!(task = %id, "edit requested");
    });

    let on_task_delete = Callback::new(move |id: String| {
        set_tasks.update(|list| list.retain(|t| t.id != id));
        info!(task = %id, "task deleted");
    });

    let add_task = move |_| {
        set_tasks.update(|list| {
            let id = uuid::Uuid::new_v4().to_string();
            let name = format!("New task {}", list.len() + 1);
            info!(task = %id, "task added");
            list.push(TaskRecord::new(id, name));
        });
    };

    view! {
        <div style="width: 100vw; height: 100vh; display: flex; flex-direction: column; \
                    background: #020202; color: #66cc88; \
                    font-family: 'JetBrains Mono', 'Fira Code', Consolas, monospace;">
            <div style="display: flex; align-items: center; gap: 16px; padding: 8px 12px; \
                        border-bottom: 1px solid #33aa55; font-size: 12px;">
                <strong style="color: #44dd66;">"TASK CANVAS"</strong>
                <button
                    style="background: #44dd66; color: #020202; border: none; padding: 4px 12px; \
                           cursor: pointer; font-family: inherit; font-size: 12px; font-weight: bold;"
                    on:click=add_task
                >
                    "+ add task"
                </button>
                <span>{move || format!("{} tasks", tasks.with(Vec::len))}</span>
            </div>
            <div style="flex: 1; position: relative; min-height: 0;">
                <TaskCanvas
                    tasks=tasks
                    lookup=lookup
                    on_task_edit=on_task_edit
                    on_task_delete=on_task_delete
                    persist_key=LAYOUT_KEY
                />
            </div>
            <div style="padding: 6px 12px; font-size: 11px; letter-spacing: 0.5px; border-top: 1px solid #33aa55;">
                "[DRAG] move  [SHIFT+CLICK] select  [DRAG ●] connect  [RIGHT-CLICK] menu  \
                 [DBLCLK] edit  [DEL] delete  [CTRL+Z] undo  [+/-/0] zoom"
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_demo_data_parses() {
        let data: DemoData = serde_json::from_str(DEMO_JSON).unwrap();
        assert_eq!(data.tasks.len(), 4);
        assert_eq!(data.lookup.agent_label("agent-writer"), "Writer");
        assert_eq!(data.lookup.agent_label("agent-unknown"), "agent-unknown");
        assert!(data.tasks[1].execute_workflow);
    }

    #[test]
    fn bundled_task_ids_are_unique() {
        let data = demo_data();
        let mut ids: Vec<&str> = data.tasks.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), data.tasks.len());
    }
}
