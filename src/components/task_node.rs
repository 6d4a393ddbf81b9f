use leptos::prelude::*;

use crate::app::CanvasCtx;
use crate::render::NodeBox;

const SOCKET_SIZE: f64 = 12.0;

fn socket_style(left: bool) -> String {
    let side = if left { "left" } else { "right" };
    format!(
        "position: absolute; {side}: {}px; top: calc(50% - {}px); \
         width: {SOCKET_SIZE}px; height: {SOCKET_SIZE}px; border-radius: 50%; \
         background: #020202; border: 2px solid #44dd66; box-sizing: border-box; \
         pointer-events: none;",
        -SOCKET_SIZE / 2.0,
        SOCKET_SIZE / 2.0,
    )
}

fn card_style(node: Option<&NodeBox>) -> String {
    let Some(n) = node else {
        return "display: none;".to_string();
    };
    let border = if n.selected { "#44dd66" } else { "#33aa55" };
    let glow = if n.selected {
        "box-shadow: 0 0 16px rgba(68, 221, 102, 0.35);"
    } else {
        ""
    };
    format!(
        "position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; \
         box-sizing: border-box; padding: 10px 14px; background: #050a06; \
         border: 1px solid {border}; {glow} color: #ccffdd; font-size: 12px; \
         line-height: 1.4; font-family: 'JetBrains Mono', 'Fira Code', Consolas, monospace; \
         display: flex; flex-direction: column; gap: 4px;",
        n.x, n.y, n.width, n.height
    )
}

/// One task card. Geometry is canvas space; the parent layer scales it.
///
/// Hit-testing for drags and sockets happens in the controller, so the card
/// and its socket dots only paint. The buttons are the exception.
#[component]
pub fn TaskNode(id: String, ctx: CanvasCtx) -> impl IntoView {
    let node = {
        let id = id.clone();
        Memo::new(move |_| ctx.scene.with(|s| s.nodes.iter().find(|n| n.id == id).cloned()))
    };

    let text = move |f: fn(&NodeBox) -> String| move || node.with(|n| n.as_ref().map(f).unwrap_or_default());

    let agent = move || {
        node.with(|n| n.as_ref().and_then(|n| n.agent.clone()))
            .map(|label| view! { <span style="color: #66cc88;">"agent: " {label}</span> })
    };
    let workflow = move || {
        node.with(|n| n.as_ref().and_then(|n| n.workflow.clone()))
            .map(|label| view! { <span style="color: #66cc88;">"workflow: " {label}</span> })
    };
    let expected = move || {
        node.with(|n| n.as_ref().map(|n| n.expected_output.clone()))
            .filter(|s| !s.is_empty())
            .map(|out| view! { <div style="color: #66cc88; font-size: 11px;">"→ " {out}</div> })
    };

    let edit_id = id.clone();
    let delete_id = id;

    let button_style = "background: transparent; color: #66cc88; border: 1px solid #33aa55; \
                        padding: 2px 8px; cursor: pointer; font-family: inherit; font-size: 11px;";

    view! {
        <div style=move || node.with(|n| card_style(n.as_ref()))>
            <div style=socket_style(true) />
            <div style=socket_style(false) />
            <div style="display: flex; justify-content: space-between; align-items: center; gap: 8px;">
                <strong style="color: #44dd66; overflow: hidden; text-overflow: ellipsis; white-space: nowrap;">
                    {text(|n| n.name.clone())}
                </strong>
                <div style="display: flex; gap: 4px;">
                    <button
                        style=button_style
                        on:mousedown=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                        on:dblclick=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                        on:click=move |_| ctx.apply(|c| c.request_edit(&edit_id))
                    >
                        "edit"
                    </button>
                    <button
                        style=button_style
                        on:mousedown=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                        on:dblclick=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                        on:click=move |_| ctx.apply(|c| c.request_delete(&delete_id))
                    >
                        "del"
                    </button>
                </div>
            </div>
            <div style="display: flex; gap: 12px; font-size: 11px;">
                {agent}
                {workflow}
            </div>
            <div
                style="flex: 1; overflow: hidden; min-height: 0;"
                inner_html=text(|n| n.description_html.clone())
            />
            {expected}
        </div>
    }
}
