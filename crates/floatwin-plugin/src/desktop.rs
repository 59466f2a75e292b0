//! Desktop backend: the overlay surface is a frameless, transparent webview
//! window that floats above every other window.

use std::sync::Arc;

use floatwin_core::{
    CommandRouter, Compositor, CompositorError, ContentEngine, ContentEngineHandle, EngineError,
    HostContext, NoForegroundService, PermissionAuthority, PermissionIntent, PluginSettings, Size,
    SurfaceId, UiRequest, WindowAttributes, WindowFlags,
};
use serde_json::{Map, Value, json};
use tauri::{
    AppHandle, Emitter, Manager, PhysicalPosition, PhysicalSize, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, WindowEvent, window::Color,
};
use tracing::{debug, info, warn};

use crate::{
    LIFECYCLE_EVENT, OPEN_MAIN_APP_EVENT, OVERLAY_MESSAGE_EVENT, Result, Router, layout, platform,
};

/// Label of the overlay webview window.
pub const OVERLAY_LABEL: &str = "floatwin-overlay";
const MAIN_LABEL: &str = "main";

/// Used when no monitor can be queried.
const FALLBACK_SCREEN: Size = Size {
    width: 1920,
    height: 1080,
};

/// Content rendered by the overlay webview. Lifecycle changes are forwarded
/// to the page as events.
struct WebviewContent {
    entrypoint: String,
    app: AppHandle,
}

impl WebviewContent {
    fn notify(&self, state: &str) {
        let payload = json!({ "entrypoint": self.entrypoint, "state": state });
        if let Err(e) = self.app.emit_to(OVERLAY_LABEL, LIFECYCLE_EVENT, payload) {
            debug!(error = %e, state, "Overlay page missed lifecycle event");
        }
    }
}

impl ContentEngine for WebviewContent {
    fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    fn resume(&self) {
        self.notify("resumed");
    }

    fn pause(&self) {
        self.notify("paused");
    }

    fn destroy(&self) {
        self.notify("destroyed");
    }
}

/// Resolve an entrypoint to the page the overlay loads.
///
/// - `http(s)://` URLs load as-is (dev servers)
/// - bare names load `<name>.html` from the bundled assets
/// - anything else is a bundled asset path
fn content_url(entrypoint: &str) -> std::result::Result<WebviewUrl, CompositorError> {
    if entrypoint.starts_with("http://") || entrypoint.starts_with("https://") {
        let url = entrypoint
            .parse()
            .map_err(|e| CompositorError::Rejected(format!("Invalid URL: {}", e)))?;
        return Ok(WebviewUrl::External(url));
    }
    if entrypoint.contains('.') || entrypoint.contains('/') {
        return Ok(WebviewUrl::App(entrypoint.into()));
    }
    Ok(WebviewUrl::App(format!("{}.html", entrypoint).into()))
}

fn rejected(e: impl ToString) -> CompositorError {
    CompositorError::Rejected(e.to_string())
}

fn apply_flags(window: &WebviewWindow, flags: WindowFlags) -> tauri::Result<()> {
    window.set_ignore_cursor_events(!flags.is_touchable())?;
    window.set_focusable(flags.is_focusable())?;
    window.set_visible_on_all_workspaces(flags.contains(WindowFlags::SHOW_WHEN_LOCKED))?;
    window.set_shadow(false)?;
    Ok(())
}

pub struct WebviewCompositor {
    app: AppHandle,
    window: Option<WebviewWindow>,
}

impl WebviewCompositor {
    pub fn new(app: AppHandle) -> Self {
        Self { app, window: None }
    }

    fn place(&self, window: &WebviewWindow, attributes: &WindowAttributes) -> tauri::Result<()> {
        let frame = layout::resolve(attributes, self.screen_size(), self.measured_size());
        window.set_size(PhysicalSize::new(frame.width, frame.height))?;
        window.set_position(PhysicalPosition::new(frame.x, frame.y))?;
        Ok(())
    }
}

impl Compositor for WebviewCompositor {
    fn add_surface(
        &mut self,
        surface: SurfaceId,
        content: &ContentEngineHandle,
        attributes: &WindowAttributes,
    ) -> std::result::Result<(), CompositorError> {
        if let Some(stale) = self.window.take() {
            warn!("Destroying a stale overlay window");
            stale.destroy().map_err(rejected)?;
        }

        let url = content_url(content.entrypoint())?;

        // Built hidden and shown once it has its final frame and flags.
        let window = WebviewWindowBuilder::new(&self.app, OVERLAY_LABEL, url)
            .title(content.entrypoint())
            .decorations(false)
            .transparent(true)
            .background_color(Color(0, 0, 0, 0))
            .always_on_top(true)
            .skip_taskbar(true)
            .resizable(false)
            .visible(false)
            .build()
            .map_err(rejected)?;

        let placed = self
            .place(&window, attributes)
            .and_then(|()| apply_flags(&window, attributes.flags))
            .map_err(rejected)
            .and_then(|()| {
                platform::configure_surface(&window, attributes.flags)
                    .map_err(CompositorError::Rejected)
            })
            .and_then(|()| window.show().map_err(rejected));
        if let Err(e) = placed {
            let _ = window.destroy();
            return Err(e);
        }

        let app = self.app.clone();
        window.on_window_event(move |event| {
            if matches!(event, WindowEvent::Destroyed) {
                crate::post_to_ui(&app, UiRequest::SurfaceRemoved(surface));
            }
        });

        self.window = Some(window);
        Ok(())
    }

    fn update_surface(
        &mut self,
        attributes: &WindowAttributes,
    ) -> std::result::Result<(), CompositorError> {
        let window = self.window.as_ref().ok_or(CompositorError::NotAttached)?;
        self.place(window, attributes).map_err(rejected)?;
        apply_flags(window, attributes.flags).map_err(rejected)?;
        platform::configure_surface(window, attributes.flags).map_err(CompositorError::Rejected)
    }

    fn remove_surface(&mut self) -> std::result::Result<(), CompositorError> {
        let window = self.window.take().ok_or(CompositorError::NotAttached)?;
        window.destroy().map_err(rejected)
    }

    fn screen_size(&self) -> Size {
        let monitor = match &self.window {
            Some(window) => window.current_monitor(),
            None => self.app.primary_monitor(),
        };
        match monitor {
            Ok(Some(monitor)) => {
                let size = monitor.size();
                Size::new(size.width as i32, size.height as i32)
            }
            Ok(None) => FALLBACK_SCREEN,
            Err(e) => {
                warn!(error = %e, "Failed to query the monitor size");
                FALLBACK_SCREEN
            }
        }
    }

    fn measured_size(&self) -> Option<Size> {
        let size = self.window.as_ref()?.inner_size().ok()?;
        Some(Size::new(size.width as i32, size.height as i32))
    }

    fn surface_lost(&mut self) {
        self.window = None;
    }
}

/// Desktop systems let any app keep a window on top.
struct AlwaysGranted {
    identifier: String,
}

impl PermissionAuthority for AlwaysGranted {
    fn is_overlay_permission_granted(&self) -> bool {
        true
    }

    fn build_permission_request_intent(&self) -> PermissionIntent {
        PermissionIntent::manage_overlay(&self.identifier)
    }
}

/// The app's main window acts as host context.
struct MainWindowHost {
    app: AppHandle,
}

impl HostContext for MainWindowHost {
    fn start_intent(&self, intent: &PermissionIntent) -> std::result::Result<(), String> {
        debug!(action = %intent.action, "No permission screen to open on desktop");
        Ok(())
    }

    fn open_main_app(&self, extras: &Map<String, Value>) -> std::result::Result<(), String> {
        let window = self
            .app
            .get_webview_window(MAIN_LABEL)
            .ok_or_else(|| format!("window {} not found", MAIN_LABEL))?;
        window.unminimize().map_err(|e| e.to_string())?;
        window.show().map_err(|e| e.to_string())?;
        window.set_focus().map_err(|e| e.to_string())?;
        self.app
            .emit_to(MAIN_LABEL, OPEN_MAIN_APP_EVENT, extras.clone())
            .map_err(|e| e.to_string())
    }
}

pub fn router(app: &AppHandle, settings: PluginSettings) -> Result<Router> {
    let content_app = app.clone();
    let factory = move |entrypoint: &str| -> std::result::Result<Arc<dyn ContentEngine>, EngineError> {
        Ok(Arc::new(WebviewContent {
            entrypoint: entrypoint.to_string(),
            app: content_app.clone(),
        }))
    };

    let permissions = AlwaysGranted {
        identifier: app.config().identifier.clone(),
    };
    let mut router = CommandRouter::new(
        WebviewCompositor::new(app.clone()),
        factory,
        permissions,
        NoForegroundService,
        settings,
    );
    router.attach_host(MainWindowHost { app: app.clone() });
    info!("Desktop overlay backend ready");
    Ok(router)
}

/// Push host data into the overlay page.
pub fn deliver_to_overlay(app: &AppHandle, payload: Value) {
    if let Err(e) = app.emit_to(OVERLAY_LABEL, OVERLAY_MESSAGE_EVENT, payload) {
        warn!(error = %e, "Failed to deliver data to the overlay page");
    }
}
