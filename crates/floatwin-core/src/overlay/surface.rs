use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    engine::{ContentEngineHandle, EngineId, EngineLifecycleBridge},
    error::{Error, Result, SurfaceOp},
    overlay::{
        attributes::{self, WindowAttributes},
        compositor::{Compositor, SurfaceId},
        config::{
            Dimension, InteractionMode, MATCH_PARENT, OverlayConfig, Position, Size, SnapPolicy,
            WRAP_CONTENT,
        },
        drag::{DEFAULT_DRAG_THRESHOLD, DragEffect, DragState, DragTracker, PointerEvent},
    },
    ui::UiAffinity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    /// `close()` was called by the host or the overlay content.
    Requested,
    /// A new overlay was shown in its place.
    Replaced,
    /// The window manager dropped the surface on its own.
    Removed,
}

/// Lifecycle notifications published by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    Shown {
        surface: SurfaceId,
        engine: EngineId,
        position: Position,
    },
    Moved { position: Position },
    DragEnded { position: Position },
    Closed { reason: CloseReason },
}

pub trait SurfaceObserver: Send {
    fn on_event(&mut self, event: &SurfaceEvent);
}

impl<F> SurfaceObserver for F
where
    F: FnMut(&SurfaceEvent) + Send,
{
    fn on_event(&mut self, event: &SurfaceEvent) {
        self(event)
    }
}

/// The live overlay surface.
#[derive(Debug)]
pub struct AttachedSurface {
    id: SurfaceId,
    config: OverlayConfig,
    attributes: WindowAttributes,
    engine: ContentEngineHandle,
}

impl AttachedSurface {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn attributes(&self) -> &WindowAttributes {
        &self.attributes
    }

    pub fn engine(&self) -> &ContentEngineHandle {
        &self.engine
    }

    pub fn position(&self) -> Position {
        self.attributes.position()
    }

    /// Raw size, possibly holding the fill/fit sentinels.
    pub fn size(&self) -> Size {
        Size::new(self.attributes.width, self.attributes.height)
    }
}

#[derive(Debug, Default)]
pub enum SurfaceState {
    #[default]
    Absent,
    Attached(AttachedSurface),
}

impl SurfaceState {
    pub fn is_attached(&self) -> bool {
        matches!(self, SurfaceState::Attached(_))
    }

    pub fn surface(&self) -> Option<&AttachedSurface> {
        match self {
            SurfaceState::Attached(surface) => Some(surface),
            SurfaceState::Absent => None,
        }
    }
}

/// Owns the single overlay surface of the process.
///
/// Every method must run on the thread that created the controller; requests
/// from elsewhere go through [`crate::ui::UiHandle`].
pub struct OverlaySurfaceController<C> {
    compositor: C,
    engines: EngineLifecycleBridge,
    state: SurfaceState,
    next_surface: u64,
    drag: Option<DragTracker>,
    drag_threshold: f32,
    observers: Vec<Box<dyn SurfaceObserver>>,
    affinity: UiAffinity,
}

impl<C: Compositor> OverlaySurfaceController<C> {
    pub fn new(compositor: C, engines: EngineLifecycleBridge) -> Self {
        Self {
            compositor,
            engines,
            state: SurfaceState::Absent,
            next_surface: 1,
            drag: None,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            observers: Vec::new(),
            affinity: UiAffinity::current(),
        }
    }

    pub fn with_drag_threshold(mut self, threshold: f32) -> Self {
        self.drag_threshold = threshold;
        self
    }

    pub fn subscribe(&mut self, observer: impl SurfaceObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: SurfaceEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    pub fn engines(&self) -> &EngineLifecycleBridge {
        &self.engines
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn is_showing(&self) -> bool {
        self.state.is_attached()
    }

    pub fn current_position(&self) -> Position {
        self.state
            .surface()
            .map(AttachedSurface::position)
            .unwrap_or(Position::ZERO)
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
            .as_ref()
            .map(DragTracker::state)
            .unwrap_or(DragState::Idle)
    }

    /// Show an overlay rendering `entrypoint`. A live overlay is closed first.
    pub fn show(&mut self, config: OverlayConfig, entrypoint: &str) -> Result<()> {
        self.affinity.check("show");

        if self.is_showing() {
            info!("Replacing the live overlay");
            if let Err(e) = self.close_with(CloseReason::Replaced) {
                warn!(error = %e, "Previous overlay did not detach cleanly");
            }
        }

        let attributes = attributes::build(&config);
        let engine = self.engines.acquire(entrypoint)?;
        if let Err(e) = self.engines.activate(&engine) {
            let attached = self
                .engines
                .active()
                .is_some_and(|active| active.same_engine(&engine));
            if !attached {
                self.engines.release(engine);
            }
            return Err(e);
        }
        engine.engine().resume();

        let surface = SurfaceId(self.next_surface);
        if let Err(reason) = self.compositor.add_surface(surface, &engine, &attributes) {
            error!(%reason, entrypoint, "Window manager rejected the overlay surface");
            self.engines.deactivate();
            self.engines.release(engine);
            return Err(Error::surface(SurfaceOp::Add, reason));
        }

        self.next_surface += 1;
        self.drag = config
            .drag_enabled
            .then(|| DragTracker::new(self.drag_threshold));

        let engine_id = engine.id();
        let position = attributes.position();
        info!(
            %surface,
            engine = %engine_id,
            width = attributes.width,
            height = attributes.height,
            x = position.x,
            y = position.y,
            flags = attributes.flags.bits(),
            "Overlay shown"
        );
        self.state = SurfaceState::Attached(AttachedSurface {
            id: surface,
            config,
            attributes,
            engine,
        });
        self.emit(SurfaceEvent::Shown {
            surface,
            engine: engine_id,
            position,
        });
        Ok(())
    }

    /// Remove the overlay. Succeeds without doing anything when none is shown.
    ///
    /// The surface is forgotten even when the window manager fails to remove
    /// it; that failure is still reported.
    pub fn close(&mut self) -> Result<()> {
        self.close_with(CloseReason::Requested)
    }

    fn close_with(&mut self, reason: CloseReason) -> Result<()> {
        self.affinity.check("close");

        if !self.is_showing() {
            debug!("No overlay to close");
            return Ok(());
        }

        let removed = self.compositor.remove_surface();
        self.detach(reason);
        removed.map_err(|reason| {
            warn!(%reason, "Failed to remove the overlay surface");
            Error::surface(SurfaceOp::Remove, reason)
        })
    }

    /// The window manager removed `surface` without being asked. Reports
    /// about a surface that is no longer the live one are ignored.
    pub fn on_surface_removed(&mut self, surface: SurfaceId) {
        self.affinity.check("on_surface_removed");
        match self.state.surface().map(AttachedSurface::id) {
            Some(live) if live == surface => {
                warn!(%surface, "Overlay surface was removed by the window manager");
                self.compositor.surface_lost();
                self.detach(CloseReason::Removed);
            }
            live => debug!(%surface, ?live, "Ignoring removal of a stale surface"),
        }
    }

    fn detach(&mut self, reason: CloseReason) {
        let SurfaceState::Attached(surface) = std::mem::take(&mut self.state) else {
            return;
        };
        self.drag = None;
        self.engines.deactivate();
        info!(engine = %surface.engine.id(), ?reason, "Overlay closed");
        self.engines.release(surface.engine);
        self.emit(SurfaceEvent::Closed { reason });
    }

    /// Apply `change` to the live attributes and push them to the window
    /// manager. State only changes when the window manager accepts.
    fn update_surface(
        &mut self,
        op: &'static str,
        change: impl FnOnce(&mut WindowAttributes, &mut OverlayConfig),
    ) -> bool {
        self.affinity.check(op);

        let SurfaceState::Attached(surface) = &mut self.state else {
            debug!(op, "No overlay attached");
            return false;
        };

        let mut attributes = surface.attributes;
        let mut config = surface.config.clone();
        change(&mut attributes, &mut config);

        match self.compositor.update_surface(&attributes) {
            Ok(()) => {
                surface.attributes = attributes;
                surface.config = config;
                true
            }
            Err(reason) => {
                warn!(op, %reason, "Window manager rejected the overlay update");
                false
            }
        }
    }

    pub fn update_flags(&mut self, mode: InteractionMode) -> bool {
        let updated = self.update_surface("update_flags", |attributes, config| {
            config.interaction_mode = mode;
            attributes.flags = attributes::flags_for(mode, config.drag_enabled);
        });
        if updated {
            debug!(?mode, "Overlay interaction mode updated");
        }
        updated
    }

    pub fn resize(&mut self, width: Dimension, height: Dimension) -> bool {
        let updated = self.update_surface("resize", |attributes, config| {
            config.width = width;
            config.height = height;
            attributes.width = width.to_raw();
            attributes.height = height.to_raw();
        });
        if updated {
            debug!(?width, ?height, "Overlay resized");
        }
        updated
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> bool {
        let moved = self.update_surface("move_to", |attributes, _| {
            attributes.x = x;
            attributes.y = y;
        });
        if moved {
            self.emit(SurfaceEvent::Moved {
                position: Position::new(x, y),
            });
        }
        moved
    }

    /// Width used for edge snapping, with size sentinels resolved.
    fn surface_width(&self, surface: &AttachedSurface, screen_width: i32) -> i32 {
        match surface.attributes.width {
            MATCH_PARENT => screen_width,
            WRAP_CONTENT => self
                .compositor
                .measured_size()
                .map(|size| size.width)
                .unwrap_or(0),
            px => px,
        }
    }

    /// Move the overlay horizontally to a screen edge.
    pub fn snap_to_edge(&mut self, policy: SnapPolicy, screen_width: i32) -> bool {
        let Some(surface) = self.state.surface() else {
            return false;
        };
        let width = self.surface_width(surface, screen_width);
        let Position { x, y } = surface.position();

        let right = screen_width - width;
        let target = match policy {
            SnapPolicy::None => return false,
            SnapPolicy::Left => 0,
            SnapPolicy::Right => right,
            SnapPolicy::Auto if x > screen_width / 2 => right,
            SnapPolicy::Auto => 0,
        };
        debug!(?policy, from = x, to = target, "Snapping overlay to edge");
        self.move_to(target, y)
    }

    /// Route a pointer event from the surface. Returns whether the event was
    /// consumed and must be hidden from the overlay content.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        self.affinity.check("handle_pointer");

        let Some(surface) = self.state.surface() else {
            return false;
        };
        let origin = surface.position();
        let snap = surface.config.snap_policy;
        let Some(tracker) = self.drag.as_mut() else {
            return false;
        };

        let outcome = tracker.handle(event, origin);
        match outcome.effect {
            DragEffect::None => {}
            DragEffect::MoveSurface(position) => {
                self.move_to(position.x, position.y);
            }
            DragEffect::DragEnded(_) => {
                // Where the compositor actually left it, not where the
                // pointer asked for.
                let position = self.current_position();
                self.emit(SurfaceEvent::DragEnded { position });
                if snap != SnapPolicy::None {
                    let screen = self.compositor.screen_size();
                    self.snap_to_edge(snap, screen.width);
                }
            }
        }
        outcome.consumed
    }

    /// Create the cached engine ahead of the first show.
    pub fn preload_engine(&mut self, entrypoint: &str) -> Result<bool> {
        self.affinity.check("preload_engine");
        self.engines.preload(entrypoint)
    }

    /// Close any live overlay and destroy every cached engine.
    pub fn dispose_engines(&mut self) -> Result<usize> {
        let closed = self.close();
        let destroyed = self.engines.teardown();
        info!(destroyed, "Disposed content engines");
        closed.map(|()| destroyed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        engine::{EnginePolicy, tests::recording_factory},
        error::CompositorError,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Add(WindowAttributes),
        Update(WindowAttributes),
        Remove,
        Lost,
    }

    /// Compositor that records every call and can be told to fail.
    #[derive(Default)]
    pub(crate) struct RecordingCompositor {
        pub calls: Vec<Call>,
        pub screen: Size,
        pub measured: Option<Size>,
        pub fail_add: Option<CompositorError>,
        pub fail_update: Option<CompositorError>,
        pub fail_remove: Option<CompositorError>,
    }

    impl RecordingCompositor {
        pub fn new(screen_width: i32) -> Self {
            Self {
                screen: Size::new(screen_width, 2000),
                ..Default::default()
            }
        }

        pub fn updates(&self) -> Vec<Position> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Update(attrs) => Some(attrs.position()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Compositor for RecordingCompositor {
        fn add_surface(
            &mut self,
            _surface: SurfaceId,
            _content: &ContentEngineHandle,
            attributes: &WindowAttributes,
        ) -> Result<(), CompositorError> {
            if let Some(err) = self.fail_add.clone() {
                return Err(err);
            }
            self.calls.push(Call::Add(*attributes));
            Ok(())
        }

        fn update_surface(&mut self, attributes: &WindowAttributes) -> Result<(), CompositorError> {
            if let Some(err) = self.fail_update.clone() {
                return Err(err);
            }
            self.calls.push(Call::Update(*attributes));
            Ok(())
        }

        fn remove_surface(&mut self) -> Result<(), CompositorError> {
            self.calls.push(Call::Remove);
            match self.fail_remove.clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn screen_size(&self) -> Size {
            self.screen
        }

        fn measured_size(&self) -> Option<Size> {
            self.measured
        }

        fn surface_lost(&mut self) {
            self.calls.push(Call::Lost);
        }
    }

    fn controller(policy: EnginePolicy) -> OverlaySurfaceController<RecordingCompositor> {
        let (factory, _) = recording_factory();
        OverlaySurfaceController::new(
            RecordingCompositor::new(1000),
            EngineLifecycleBridge::new(policy, factory),
        )
    }

    fn draggable(width: u32) -> OverlayConfig {
        OverlayConfig::sized(Dimension::Exact(width), Dimension::Exact(100))
            .with_drag(SnapPolicy::None)
            .at(50, 60)
    }

    #[test]
    fn close_without_surface_is_a_noop() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.close().unwrap();
        assert!(ctl.compositor().calls.is_empty());
    }

    #[test]
    fn show_twice_replaces_surface() {
        let mut ctl = controller(EnginePolicy::OnDemand);
        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();
        ctl.show(OverlayConfig::default().at(5, 5), "overlayMain").unwrap();

        let calls = &ctl.compositor().calls;
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], Call::Add(_)));
        assert_eq!(calls[1], Call::Remove);
        assert!(matches!(calls[2], Call::Add(a) if a.position() == Position::new(5, 5)));
        assert!(ctl.is_showing());
    }

    #[test]
    fn operations_without_surface_return_false() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        assert!(!ctl.move_to(10, 10));
        assert!(!ctl.resize(Dimension::Exact(10), Dimension::Fit));
        assert!(!ctl.update_flags(InteractionMode::ClickThrough));
        assert!(!ctl.snap_to_edge(SnapPolicy::Left, 1000));
        assert_eq!(ctl.current_position(), Position::ZERO);
        assert!(ctl.compositor().calls.is_empty());
    }

    #[test]
    fn failed_add_reports_and_stays_absent() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.compositor_mut().fail_add = Some(CompositorError::PermissionRevoked);

        let err = ctl.show(OverlayConfig::default(), "overlayMain").unwrap_err();
        assert!(matches!(
            err,
            Error::SurfaceOperationFailed {
                op: SurfaceOp::Add,
                ..
            }
        ));
        assert!(!ctl.is_showing());
        assert!(ctl.engines().active().is_none());
    }

    #[test]
    fn failed_remove_still_clears_state() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();
        ctl.compositor_mut().fail_remove = Some(CompositorError::ContextDestroyed);

        assert!(ctl.close().is_err());
        assert!(!ctl.is_showing());
        ctl.close().unwrap();
    }

    #[test]
    fn rejected_update_keeps_previous_state() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(OverlayConfig::default().at(1, 2), "overlayMain").unwrap();
        ctl.compositor_mut().fail_update = Some(CompositorError::Rejected("busy".into()));

        assert!(!ctl.move_to(300, 300));
        assert_eq!(ctl.current_position(), Position::new(1, 2));
    }

    #[test]
    fn update_flags_keeps_drag_setting() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(draggable(100), "overlayMain").unwrap();

        assert!(ctl.update_flags(InteractionMode::Default));
        let surface = ctl.state().surface().unwrap();
        assert_eq!(
            surface.attributes().flags,
            attributes::flags_for(InteractionMode::Default, true)
        );
    }

    #[test]
    fn resize_updates_size() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();

        assert!(ctl.resize(Dimension::Exact(300), Dimension::Fit));
        let surface = ctl.state().surface().unwrap();
        assert_eq!(surface.size(), Size::new(300, WRAP_CONTENT));
        assert_eq!(surface.config().height, Dimension::Fit);
    }

    #[test]
    fn auto_snap_picks_nearest_edge() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(
            OverlayConfig::sized(Dimension::Exact(120), Dimension::Exact(80)).at(200, 40),
            "overlayMain",
        )
        .unwrap();

        assert!(ctl.snap_to_edge(SnapPolicy::Auto, 1000));
        assert_eq!(ctl.current_position(), Position::new(0, 40));

        assert!(ctl.move_to(800, 40));
        assert!(ctl.snap_to_edge(SnapPolicy::Auto, 1000));
        assert_eq!(ctl.current_position(), Position::new(880, 40));
    }

    #[test]
    fn snapping_resolves_size_sentinels() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(OverlayConfig::sized(Dimension::Fit, Dimension::Fit), "overlayMain")
            .unwrap();
        ctl.compositor_mut().measured = Some(Size::new(64, 64));
        assert!(ctl.snap_to_edge(SnapPolicy::Right, 1000));
        assert_eq!(ctl.current_position().x, 936);

        assert!(ctl.resize(Dimension::Fill, Dimension::Fit));
        assert!(ctl.snap_to_edge(SnapPolicy::Right, 1000));
        assert_eq!(ctl.current_position().x, 0);
    }

    #[test]
    fn drag_moves_then_snaps_once() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(
            OverlayConfig::sized(Dimension::Exact(100), Dimension::Exact(100))
                .with_drag(SnapPolicy::Right)
                .at(50, 60),
            "overlayMain",
        )
        .unwrap();

        assert!(!ctl.handle_pointer(PointerEvent::Down { x: 10.0, y: 10.0 }));
        assert!(ctl.handle_pointer(PointerEvent::Move { x: 20.0, y: 10.0 }));
        assert_eq!(ctl.drag_state(), DragState::Dragging);
        assert!(ctl.handle_pointer(PointerEvent::Up { x: 20.0, y: 10.0 }));

        assert_eq!(
            ctl.compositor().updates(),
            vec![Position::new(60, 60), Position::new(900, 60)]
        );
    }

    #[test]
    fn tap_on_draggable_surface_is_not_consumed() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(draggable(100), "overlayMain").unwrap();

        assert!(!ctl.handle_pointer(PointerEvent::Down { x: 10.0, y: 10.0 }));
        assert!(!ctl.handle_pointer(PointerEvent::Move { x: 13.0, y: 10.0 }));
        assert!(!ctl.handle_pointer(PointerEvent::Up { x: 13.0, y: 10.0 }));
        assert!(ctl.compositor().updates().is_empty());
    }

    #[test]
    fn pointer_events_ignored_without_drag() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();

        assert!(!ctl.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 }));
        assert!(!ctl.handle_pointer(PointerEvent::Move { x: 90.0, y: 0.0 }));
        assert!(ctl.compositor().updates().is_empty());
    }

    #[test]
    fn abnormal_removal_releases_engine_without_remove_call() {
        let mut ctl = controller(EnginePolicy::OnDemand);
        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();
        let live = ctl.state().surface().unwrap().id();

        ctl.on_surface_removed(live);
        assert!(!ctl.is_showing());
        assert!(ctl.engines().active().is_none());
        assert!(!ctl.compositor().calls.contains(&Call::Remove));
        assert_eq!(ctl.compositor().calls.last(), Some(&Call::Lost));
    }

    #[test]
    fn late_removal_of_replaced_surface_is_ignored() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();
        let replaced = ctl.state().surface().unwrap().id();
        ctl.show(OverlayConfig::default().at(5, 5), "overlayMain").unwrap();
        let live = ctl.state().surface().unwrap().id();
        assert_ne!(replaced, live);

        ctl.on_surface_removed(replaced);
        assert!(ctl.is_showing());
        assert_eq!(ctl.state().surface().unwrap().id(), live);
        assert!(!ctl.compositor().calls.contains(&Call::Lost));
    }

    #[test]
    fn rejected_drag_move_ends_at_applied_position() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.subscribe(move |event: &SurfaceEvent| sink.lock().unwrap().push(event.clone()));
        ctl.show(draggable(100), "overlayMain").unwrap();
        ctl.compositor_mut().fail_update = Some(CompositorError::Rejected("busy".into()));

        ctl.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
        assert!(ctl.handle_pointer(PointerEvent::Move { x: 40.0, y: 0.0 }));
        assert!(ctl.handle_pointer(PointerEvent::Up { x: 40.0, y: 0.0 }));

        assert_eq!(
            events.lock().unwrap().last(),
            Some(&SurfaceEvent::DragEnded {
                position: Position::new(50, 60)
            })
        );
    }

    #[test]
    fn extreme_drag_saturates_instead_of_overflowing() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.show(draggable(100), "overlayMain").unwrap();

        ctl.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
        assert!(ctl.handle_pointer(PointerEvent::Move { x: 3.0e9, y: -3.0e9 }));
        assert_eq!(ctl.current_position(), Position::new(i32::MAX, i32::MIN + 60));
    }

    #[test]
    fn observers_see_lifecycle() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.subscribe(move |event: &SurfaceEvent| sink.lock().unwrap().push(event.clone()));

        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();
        ctl.move_to(3, 4);
        ctl.close().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SurfaceEvent::Shown { .. }));
        assert_eq!(
            events[1],
            SurfaceEvent::Moved {
                position: Position::new(3, 4)
            }
        );
        assert_eq!(
            events[2],
            SurfaceEvent::Closed {
                reason: CloseReason::Requested
            }
        );
    }

    #[test]
    fn dispose_closes_and_tears_down() {
        let mut ctl = controller(EnginePolicy::Preloaded);
        ctl.preload_engine("overlayMain").unwrap();
        ctl.show(OverlayConfig::default(), "overlayMain").unwrap();

        assert_eq!(ctl.dispose_engines().unwrap(), 1);
        assert!(!ctl.is_showing());
        assert!(!ctl.engines().is_preloaded("overlayMain"));
    }
}
