use leptos::prelude::*;
use tracing::{debug, warn};

use crate::components::{ContextMenu, TaskNode, ZoomControls};
use crate::config::CanvasConfig;
use crate::controller::{
    CanvasController, CanvasEvent, KeyInput, Modifiers, PointerButton, PointerInput,
};
use crate::error::LayoutError;
use crate::layout::{CanvasLayout, LayoutStore};
use crate::render::Scene;
use crate::state::{Lookup, TaskRecord};
use crate::viewport::ViewportRect;

/// Keeps layouts in the browser's localStorage under one key.
#[derive(Clone, Debug)]
pub struct LocalStorageLayoutStore {
    key: String,
}

impl LocalStorageLayoutStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

fn local_storage() -> Result<web_sys::Storage, LayoutError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| LayoutError::Storage("localStorage unavailable".to_string()))
}

impl LayoutStore for LocalStorageLayoutStore {
    fn load(&self) -> Result<Option<CanvasLayout>, LayoutError> {
        let json = local_storage()?
            .get_item(&self.key)
            .map_err(|e| LayoutError::Storage(format!("{e:?}")))?;
        json.as_deref().map(CanvasLayout::from_json).transpose()
    }

    fn save(&self, layout: &CanvasLayout) -> Result<(), LayoutError> {
        local_storage()?
            .set_item(&self.key, &layout.to_json()?)
            .map_err(|e| LayoutError::Storage(format!("{e:?}")))
    }
}

/// Handle shared by the canvas components: the controller plus the last
/// scene it produced.
#[derive(Clone, Copy)]
pub struct CanvasCtx {
    controller: StoredValue<CanvasController, LocalStorage>,
    pub scene: RwSignal<Scene>,
    pub cursor: RwSignal<&'static str>,
}

impl CanvasCtx {
    fn new(controller: CanvasController) -> Self {
        let scene = RwSignal::new(controller.scene());
        let cursor = RwSignal::new(controller.cursor());
        Self {
            controller: StoredValue::new_local(controller),
            scene,
            cursor,
        }
    }

    /// Run `f` against the controller, then refresh the scene.
    pub fn apply(&self, f: impl FnOnce(&mut CanvasController)) {
        let refreshed = self.controller.try_update_value(|c| {
            f(c);
            (c.scene(), c.cursor())
        });
        if let Some((scene, cursor)) = refreshed {
            self.scene.set(scene);
            self.cursor.set(cursor);
        }
    }
}

fn modifiers(shift: bool, ctrl: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, meta }
}

fn pointer_input(ev: &web_sys::MouseEvent) -> PointerInput {
    PointerInput {
        client_x: ev.client_x() as f64,
        client_y: ev.client_y() as f64,
        button: PointerButton::from_dom(ev.button()),
        modifiers: modifiers(ev.shift_key(), ev.ctrl_key(), ev.meta_key()),
    }
}

fn load_layout(controller: &mut CanvasController, store: &impl LayoutStore) {
    match store.load() {
        Ok(Some(layout)) => {
            if let Err(e) = controller.import_layout(layout) {
                warn!(error = %e, "discarding saved layout");
            }
        }
        Ok(None) => debug!("no saved layout"),
        Err(e) => warn!(error = %e, "could not read saved layout"),
    }
}

/// Interactive node-graph view of a task list.
///
/// The canvas never changes `tasks`: edit and delete gestures call
/// `on_task_edit` / `on_task_delete` and the host decides what to do. With a
/// `persist_key` the layout is restored from and saved to localStorage;
/// without one it lives only as long as the component.
#[component]
pub fn TaskCanvas(
    #[prop(into)] tasks: Signal<Vec<TaskRecord>>,
    #[prop(optional, into)] lookup: Option<Signal<Lookup>>,
    #[prop(into)] on_task_edit: Callback<String>,
    #[prop(into)] on_task_delete: Callback<String>,
    #[prop(optional, into)] persist_key: Option<String>,
    #[prop(optional)] config: Option<CanvasConfig>,
) -> impl IntoView {
    let mut controller = CanvasController::new(config.unwrap_or_default());

    let store = persist_key.map(LocalStorageLayoutStore::new);
    if let Some(store) = &store {
        load_layout(&mut controller, store);
    }

    controller.subscribe(move |event| match event {
        CanvasEvent::TaskEditRequested(id) => on_task_edit.run(id.clone()),
        CanvasEvent::TaskDeleteRequested(id) => on_task_delete.run(id.clone()),
        CanvasEvent::LayoutChanged(layout) => {
            if let Some(store) = &store {
                if let Err(e) = store.save(layout) {
                    warn!(error = %e, "could not save layout");
                }
            }
        }
    });

    let ctx = CanvasCtx::new(controller);
    let root_ref = NodeRef::<leptos::html::Div>::new();

    Effect::new(move || {
        let current = tasks.get();
        ctx.apply(|c| c.set_tasks(current));
    });

    Effect::new(move || {
        if let Some(lookup) = lookup {
            let current = lookup.get();
            ctx.apply(|c| c.set_lookup(current));
        }
    });

    // Measured on every event; the element can move or resize at any time.
    let viewport = move || {
        root_ref.get_untracked().map(|el| {
            let rect = el.get_bounding_client_rect();
            ViewportRect::new(rect.left(), rect.top(), rect.width(), rect.height())
        })
    };

    let on_mouse_down = move |ev: web_sys::MouseEvent| {
        if let Some(el) = root_ref.get_untracked() {
            let _ = el.focus();
        }
        // Middle-click would otherwise start autoscroll.
        if ev.button() == 1 {
            ev.prevent_default();
        }
        let input = pointer_input(&ev);
        let rect = viewport();
        ctx.apply(|c| {
            c.set_viewport(rect);
            c.pointer_down(input);
        });
    };

    let on_mouse_move = move |ev: web_sys::MouseEvent| {
        let input = pointer_input(&ev);
        let rect = viewport();
        ctx.apply(|c| {
            c.set_viewport(rect);
            c.pointer_move(input);
        });
    };

    let on_mouse_up = move |ev: web_sys::MouseEvent| {
        let input = pointer_input(&ev);
        let rect = viewport();
        ctx.apply(|c| {
            c.set_viewport(rect);
            c.pointer_up(input);
        });
    };

    let on_mouse_leave = move |_: web_sys::MouseEvent| {
        ctx.apply(|c| c.pointer_leave());
    };

    let on_wheel = move |ev: web_sys::WheelEvent| {
        ev.prevent_default();
        let input = pointer_input(&ev);
        let rect = viewport();
        ctx.apply(|c| {
            c.set_viewport(rect);
            c.wheel(input, ev.delta_y());
        });
    };

    let on_double_click = move |ev: web_sys::MouseEvent| {
        let input = pointer_input(&ev);
        let rect = viewport();
        ctx.apply(|c| {
            c.set_viewport(rect);
            c.double_click(input);
        });
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        let input = KeyInput {
            key: ev.key(),
            modifiers: modifiers(ev.shift_key(), ev.ctrl_key(), ev.meta_key()),
        };
        let mut consumed = false;
        ctx.apply(|c| consumed = c.key_down(&input));
        if consumed {
            ev.prevent_default();
        }
    };

    let connection_paths = move || {
        ctx.scene.with(|s| {
            s.connections
                .iter()
                .map(|c| {
                    let (stroke, width) = if c.emphasized {
                        ("#44dd66", "3")
                    } else {
                        ("#33aa55", "2")
                    };
                    view! { <path d=c.d.clone() fill="none" stroke=stroke stroke-width=width /> }
                })
                .collect::<Vec<_>>()
        })
    };

    let preview_path = move || {
        ctx.scene.with(|s| s.preview.clone()).map(|d| {
            view! {
                <path d=d fill="none" stroke="#66cc88" stroke-width="2" stroke-dasharray="6 4" />
            }
        })
    };

    view! {
        <div
            node_ref=root_ref
            tabindex="0"
            style=move || format!(
                "position: absolute; inset: 0; overflow: hidden; outline: none; \
                 background: #020202; user-select: none; cursor: {};",
                ctx.cursor.get()
            )
            on:mousedown=on_mouse_down
            on:mousemove=on_mouse_move
            on:mouseup=on_mouse_up
            on:mouseleave=on_mouse_leave
            on:wheel=on_wheel
            on:dblclick=on_double_click
            on:keydown=on_keydown
            on:contextmenu=move |ev: web_sys::MouseEvent| ev.prevent_default()
        >
            <div style=move || ctx.scene.with(|s| format!(
                "position: absolute; left: 0; top: 0; transform-origin: 0 0; transform: {};",
                s.layer_transform
            ))>
                <svg style="position: absolute; left: 0; top: 0; width: 1px; height: 1px; \
                            overflow: visible; pointer-events: none;">
                    {connection_paths}
                    {preview_path}
                </svg>
                <For
                    each=move || ctx.scene.with(|s| s.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>())
                    key=|id: &String| id.clone()
                    children=move |id: String| view! { <TaskNode id=id ctx=ctx /> }
                />
            </div>
            <ContextMenu ctx=ctx />
            <ZoomControls ctx=ctx />
        </div>
    }
}
