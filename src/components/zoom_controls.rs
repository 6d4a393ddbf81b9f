use leptos::prelude::*;

use crate::app::CanvasCtx;

#[component]
pub fn ZoomControls(ctx: CanvasCtx) -> impl IntoView {
    let button_style = "background: transparent; color: #66cc88; border: 1px solid #33aa55; \
                        width: 28px; height: 24px; cursor: pointer; font-family: inherit;";
    let percent = move || ctx.scene.with(|s| format!("{:.0}%", s.scale * 100.0));

    view! {
        <div
            style="position: absolute; right: 12px; bottom: 12px; display: flex; gap: 4px; \
                   align-items: center; color: #66cc88; font-size: 11px; \
                   font-family: 'JetBrains Mono', 'Fira Code', Consolas, monospace;"
            on:mousedown=move |ev: web_sys::MouseEvent| ev.stop_propagation()
            on:dblclick=move |ev: web_sys::MouseEvent| ev.stop_propagation()
        >
            <button style=button_style on:click=move |_| ctx.apply(|c| c.zoom_out())>"-"</button>
            <span style="min-width: 44px; text-align: center;">{percent}</span>
            <button style=button_style on:click=move |_| ctx.apply(|c| c.zoom_in())>"+"</button>
            <button
                style=format!("{button_style} width: auto; padding: 0 8px;")
                on:click=move |_| ctx.apply(|c| c.reset_view())
            >
                "reset"
            </button>
        </div>
    }
}
