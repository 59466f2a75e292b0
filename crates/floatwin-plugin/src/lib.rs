pub mod commands;
pub mod error;
pub mod layout;

#[cfg(desktop)]
pub mod desktop;
#[cfg(desktop)]
mod platform;

#[cfg(target_os = "android")]
pub mod mobile;

#[cfg(target_os = "ios")]
compile_error!("floatwin-plugin has no iOS backend: iOS offers no system overlay window");

pub use error::*;
pub use floatwin_core;

use std::sync::{Mutex, MutexGuard};

use floatwin_core::{
    CommandRouter, PluginSettings, SurfaceEvent, UiHandle, UiQueue, UiRequest, logging, ui,
};
use serde_json::Value;
use tauri::{
    AppHandle, Emitter, Manager, Wry,
    plugin::{Builder, TauriPlugin},
};
use tracing::{debug, info, warn};

/// Overlay lifecycle events, payload is a `SurfaceEvent`.
pub const SURFACE_EVENT: &str = "floatwin://surface";
/// Data the overlay content shared with the host.
pub const HOST_MESSAGE_EVENT: &str = "floatwin://message";
/// Data the host shared with the overlay content.
pub const OVERLAY_MESSAGE_EVENT: &str = "floatwin://overlay-message";
/// Content engine resumed/paused/destroyed, sent to the overlay page.
pub const LIFECYCLE_EVENT: &str = "floatwin://lifecycle";
pub const OPEN_MAIN_APP_EVENT: &str = "floatwin://open-main-app";

#[cfg(desktop)]
pub type PlatformCompositor = desktop::WebviewCompositor;
#[cfg(target_os = "android")]
pub type PlatformCompositor = mobile::AndroidCompositor;

pub type Router = CommandRouter<PlatformCompositor>;

/// State wrapper for the overlay router
pub struct OverlayState(pub Mutex<Router>);

impl OverlayState {
    pub fn router(&self) -> Result<MutexGuard<'_, Router>> {
        self.0.lock().map_err(|_| Error::StatePoisoned)
    }
}

/// Requests posted from other threads, run on the main thread.
pub struct UiState {
    handle: UiHandle,
    queue: Mutex<UiQueue>,
}

/// Queue `request` and schedule a drain on the main thread.
///
/// The drain is scheduled from a task so it never runs inside a call that
/// already holds the router, such as a window being destroyed by
/// `remove_surface`.
pub fn post_to_ui(app: &AppHandle, request: UiRequest) {
    let Some(ui) = app.try_state::<UiState>() else {
        return;
    };
    if !ui.handle.post(request) {
        return;
    }
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let handle = app.clone();
        if let Err(e) = app.run_on_main_thread(move || drain_ui(&handle)) {
            warn!(error = %e, "Failed to schedule UI drain");
        }
    });
}

fn drain_ui(app: &AppHandle) {
    let (Some(overlay), Some(ui)) = (app.try_state::<OverlayState>(), app.try_state::<UiState>())
    else {
        return;
    };
    let Ok(mut router) = overlay.router() else {
        warn!("Overlay state poisoned, dropping UI requests");
        return;
    };
    let Ok(mut queue) = ui.queue.lock() else {
        return;
    };
    let handled = queue.drain(&mut router);
    debug!(handled, "Drained UI requests");
}

fn deliver_to_overlay(app: &AppHandle, payload: Value) {
    #[cfg(desktop)]
    desktop::deliver_to_overlay(app, payload);
    #[cfg(target_os = "android")]
    mobile::deliver_to_overlay(app, payload);
}

pub fn init() -> TauriPlugin<Wry, Option<PluginSettings>> {
    Builder::<Wry, Option<PluginSettings>>::new("floatwin")
        .invoke_handler(tauri::generate_handler![
            commands::show_overlay,
            commands::close_overlay,
            commands::update_flag,
            commands::resize_overlay,
            commands::move_overlay,
            commands::get_overlay_position,
            commands::is_showing,
            commands::share_data,
            commands::share_with_host,
            commands::initialize_engine,
            commands::dispose_engine,
            commands::is_engine_initialized,
            commands::is_permission_granted,
            commands::request_permission,
            commands::open_main_app,
            commands::pointer_event,
            commands::overlay_control,
            commands::invoke
        ])
        .setup(|app, api| {
            let settings = api.config().clone().unwrap_or_default();
            logging::init(settings.debug_logging);

            #[cfg(desktop)]
            let mut router = {
                let _ = api;
                desktop::router(app, settings)?
            };
            #[cfg(target_os = "android")]
            let mut router = mobile::router(app, api, settings)?;

            let events = app.clone();
            router.controller_mut().subscribe(move |event: &SurfaceEvent| {
                if let Err(e) = events.emit(SURFACE_EVENT, event) {
                    warn!(error = %e, "Failed to emit overlay event");
                }
            });

            let mut to_host = router.listen_host_data();
            let host_app = app.clone();
            tauri::async_runtime::spawn(async move {
                while let Some(payload) = to_host.recv().await {
                    if let Err(e) = host_app.emit(HOST_MESSAGE_EVENT, payload) {
                        warn!(error = %e, "Failed to deliver overlay data to the host");
                    }
                }
            });

            let mut to_overlay = router.listen_overlay_data();
            let overlay_app = app.clone();
            tauri::async_runtime::spawn(async move {
                while let Some(payload) = to_overlay.recv().await {
                    deliver_to_overlay(&overlay_app, payload);
                }
            });

            let (handle, queue) = ui::channel();
            app.manage(OverlayState(Mutex::new(router)));
            app.manage(UiState {
                handle,
                queue: Mutex::new(queue),
            });

            info!("floatwin plugin initialized");
            Ok(())
        })
        .build()
}
