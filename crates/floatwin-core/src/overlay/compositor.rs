use std::fmt;

use serde::Serialize;

use crate::{
    engine::ContentEngineHandle,
    error::CompositorError,
    overlay::{attributes::WindowAttributes, config::Size},
};

/// Identifies one attached surface. Every successful show gets a new one, so
/// a late report about a replaced surface can be told apart from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// The OS window manager that owns the overlay surface.
///
/// Calls are synchronous and expected to return quickly. Any of them may fail
/// when the platform state changes underneath us (permission revoked, host
/// torn down); callers report such failures and never retry.
pub trait Compositor {
    fn add_surface(
        &mut self,
        surface: SurfaceId,
        content: &ContentEngineHandle,
        attributes: &WindowAttributes,
    ) -> Result<(), CompositorError>;

    fn update_surface(&mut self, attributes: &WindowAttributes) -> Result<(), CompositorError>;

    fn remove_surface(&mut self) -> Result<(), CompositorError>;

    /// Size of the display the overlay lives on.
    fn screen_size(&self) -> Size;

    /// Laid-out size of the live surface, when the platform can measure it.
    fn measured_size(&self) -> Option<Size> {
        None
    }

    /// The live surface went away without `remove_surface`; forget it.
    fn surface_lost(&mut self) {}
}

impl<C: Compositor + ?Sized> Compositor for Box<C> {
    fn add_surface(
        &mut self,
        surface: SurfaceId,
        content: &ContentEngineHandle,
        attributes: &WindowAttributes,
    ) -> Result<(), CompositorError> {
        (**self).add_surface(surface, content, attributes)
    }

    fn update_surface(&mut self, attributes: &WindowAttributes) -> Result<(), CompositorError> {
        (**self).update_surface(attributes)
    }

    fn remove_surface(&mut self) -> Result<(), CompositorError> {
        (**self).remove_surface()
    }

    fn screen_size(&self) -> Size {
        (**self).screen_size()
    }

    fn measured_size(&self) -> Option<Size> {
        (**self).measured_size()
    }

    fn surface_lost(&mut self) {
        (**self).surface_lost()
    }
}
