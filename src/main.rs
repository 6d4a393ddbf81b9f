use task_canvas::demo::Workspace;

fn main() {
    console_error_panic_hook::set_once();
    task_canvas::logging::init(tracing::Level::DEBUG);
    leptos::mount::mount_to_body(Workspace);
}
