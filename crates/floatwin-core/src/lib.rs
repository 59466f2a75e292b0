//! Overlay window lifecycle and drag-interaction manager.
//!
//! One overlay surface per process, rendered by a content engine and placed
//! through a platform [`Compositor`]. Hosts drive it through
//! [`CommandRouter::dispatch`].

pub mod channel;
pub mod commands;
pub mod engine;
pub mod error;
pub mod host;
pub mod logging;
pub mod overlay;
pub mod settings;
pub mod ui;

pub use channel::*;
pub use commands::{Command, CommandRouter, PROTOCOL_VERSION, ShowOverlayArgs};
pub use engine::*;
pub use error::*;
pub use host::*;
pub use overlay::*;
pub use settings::*;
pub use ui::{UiAffinity, UiHandle, UiQueue, UiRequest};
