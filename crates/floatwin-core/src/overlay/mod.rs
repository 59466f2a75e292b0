pub mod attributes;
pub mod compositor;
pub mod config;
pub mod drag;
pub mod surface;

pub use attributes::{Gravity, WindowAttributes, WindowFlags};
pub use compositor::{Compositor, SurfaceId};
pub use config::*;
pub use drag::{DragState, DragTracker, PointerEvent};
pub use surface::{CloseReason, OverlaySurfaceController, SurfaceEvent, SurfaceObserver, SurfaceState};
