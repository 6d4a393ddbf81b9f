mod context_menu;
mod task_node;
mod zoom_controls;

pub use context_menu::ContextMenu;
pub use task_node::TaskNode;
pub use zoom_controls::ZoomControls;
