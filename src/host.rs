use anyhow::Result;
use std::sync::Arc;

use crate::display::DisplaySurface;

pub type ChangeListener = Box<dyn Fn() + Send + Sync>;

// Listeners fire on host-side edits only, never on set_value writes
// coming from this crate.
pub trait Widget: Send + Sync {
    fn get_value(&self) -> String;
    fn set_value(&self, value: String);
    fn on_change(&self, listener: ChangeListener);
}

pub trait HostNode: Send + Sync {
    fn widget(&self, name: &str) -> Option<Arc<dyn Widget>>;
    fn mount_surface(&self, name: &str) -> Result<Box<dyn DisplaySurface>>;
    fn request_redraw(&self);
}
