use leptos::prelude::*;

use crate::app::CanvasCtx;
use crate::menu::MenuEntry;

fn entry_view(ctx: CanvasCtx, entry: MenuEntry) -> impl IntoView {
    let inert = matches!(entry, MenuEntry::ConnectTo { connected: true, .. });
    let label = if inert {
        format!("✓ {}", entry.label())
    } else {
        entry.label()
    };
    let color = match entry {
        MenuEntry::DeleteTask(_) => "#ff6666",
        _ if inert => "#336644",
        _ => "#ccffdd",
    };

    view! {
        <div
            style=format!("padding: 6px 14px; cursor: pointer; white-space: nowrap; color: {color};")
            on:click=move |_| ctx.apply(|c| c.choose_menu_entry(&entry))
        >
            {label}
        </div>
    }
}

/// Menu for the node that was right-clicked, in screen space.
#[component]
pub fn ContextMenu(ctx: CanvasCtx) -> impl IntoView {
    move || {
        ctx.scene.with(|s| s.menu.clone()).map(|menu| {
            view! {
                <div
                    style=format!(
                        "position: absolute; left: {}px; top: {}px; z-index: 10; \
                         background: #020202; border: 1px solid #44dd66; \
                         box-shadow: 0 0 20px rgba(68, 221, 102, 0.25); padding: 4px 0; \
                         font-family: 'JetBrains Mono', 'Fira Code', Consolas, monospace; \
                         font-size: 12px;",
                        menu.x, menu.y
                    )
                    on:mousedown=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                    on:dblclick=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                    on:wheel=move |ev: web_sys::WheelEvent| ev.stop_propagation()
                >
                    {menu.entries.into_iter().map(|entry| entry_view(ctx, entry)).collect::<Vec<_>>()}
                </div>
            }
        })
    }
}
