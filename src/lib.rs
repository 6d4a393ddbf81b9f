pub mod config;
pub mod connections;
pub mod controller;
pub mod error;
pub mod history;
pub mod layout;
pub mod menu;
pub mod positions;
pub mod render;
pub mod selection;
pub mod state;
pub mod viewport;

pub mod app;
pub mod components;
pub mod demo;
pub mod logging;

pub use app::{LocalStorageLayoutStore, TaskCanvas};
pub use config::{CanvasConfig, InputPolicy};
pub use controller::{CanvasController, CanvasEvent};
pub use layout::{CanvasLayout, LayoutStore, MemoryLayoutStore};
pub use state::{Lookup, TaskRecord};
