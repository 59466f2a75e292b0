//! Android backend. The window manager, the overlay content and the
//! foreground service live on the Kotlin side of the plugin; every call is
//! forwarded through the mobile plugin bridge.

use std::sync::Arc;

use floatwin_core::{
    CommandRouter, Compositor, CompositorError, ContentEngine, ContentEngineHandle, EngineError,
    ForegroundService, HostContext, NotificationConfig, PermissionAuthority, PermissionIntent,
    PluginSettings, Size, SurfaceId, WindowAttributes,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use tauri::{
    AppHandle, Manager, Wry,
    plugin::{
        PluginApi, PluginHandle,
        mobile::{ErrorResponse, PluginInvokeError},
    },
};
use tracing::{info, warn};

use crate::{Result, Router};

const PLUGIN_IDENTIFIER: &str = "dev.floatwin";
const PLUGIN_CLASS: &str = "FloatwinPlugin";

/// Used when the Kotlin side cannot report the display size.
const FALLBACK_SCREEN: Size = Size {
    width: 1080,
    height: 1920,
};

/// Shared handle to the Kotlin plugin instance.
#[derive(Clone)]
pub struct MobileBridge(PluginHandle<Wry>);

impl MobileBridge {
    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: impl Serialize,
    ) -> std::result::Result<T, PluginInvokeError> {
        self.0.run_mobile_plugin(method, payload)
    }

    /// Fire-and-forget call; failures are only logged.
    fn notify(&self, method: &str, payload: impl Serialize) {
        if let Err(e) = self.call::<Value>(method, payload) {
            warn!(method, error = %e, "Android plugin call failed");
        }
    }
}

fn compositor_error(e: PluginInvokeError) -> CompositorError {
    match e {
        PluginInvokeError::InvokeRejected(ErrorResponse { code, message, .. }) => {
            match code.as_deref() {
                Some("PERMISSION_DENIED") => CompositorError::PermissionRevoked,
                Some("NO_ACTIVITY") => CompositorError::ContextDestroyed,
                Some("NOT_ATTACHED") => CompositorError::NotAttached,
                _ => CompositorError::Rejected(message.unwrap_or_default()),
            }
        }
        other => CompositorError::Rejected(other.to_string()),
    }
}

pub struct AndroidCompositor {
    bridge: MobileBridge,
}

impl Compositor for AndroidCompositor {
    fn add_surface(
        &mut self,
        surface: SurfaceId,
        content: &ContentEngineHandle,
        attributes: &WindowAttributes,
    ) -> std::result::Result<(), CompositorError> {
        self.bridge
            .call::<Value>(
                "addSurface",
                json!({
                    "surface": surface,
                    "engine": content.id(),
                    "entrypoint": content.entrypoint(),
                    "attributes": attributes,
                }),
            )
            .map(drop)
            .map_err(compositor_error)
    }

    fn update_surface(
        &mut self,
        attributes: &WindowAttributes,
    ) -> std::result::Result<(), CompositorError> {
        self.bridge
            .call::<Value>("updateSurface", json!({ "attributes": attributes }))
            .map(drop)
            .map_err(compositor_error)
    }

    fn remove_surface(&mut self) -> std::result::Result<(), CompositorError> {
        self.bridge
            .call::<Value>("removeSurface", json!({}))
            .map(drop)
            .map_err(compositor_error)
    }

    fn screen_size(&self) -> Size {
        self.bridge
            .call("screenSize", json!({}))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to query the screen size");
                FALLBACK_SCREEN
            })
    }

    fn measured_size(&self) -> Option<Size> {
        self.bridge.call("measuredSize", json!({})).ok().flatten()
    }
}

/// Content engine hosted by the Kotlin side.
struct AndroidEngine {
    entrypoint: String,
    bridge: MobileBridge,
}

impl AndroidEngine {
    fn lifecycle(&self, state: &str) {
        self.bridge.notify(
            "engineLifecycle",
            json!({ "entrypoint": self.entrypoint, "state": state }),
        );
    }
}

impl ContentEngine for AndroidEngine {
    fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    fn resume(&self) {
        self.lifecycle("resumed");
    }

    fn pause(&self) {
        self.lifecycle("paused");
    }

    fn destroy(&self) {
        self.lifecycle("destroyed");
    }
}

struct AndroidPermissions {
    bridge: MobileBridge,
    package: String,
}

impl PermissionAuthority for AndroidPermissions {
    fn is_overlay_permission_granted(&self) -> bool {
        self.bridge
            .call("isPermissionGranted", json!({}))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Permission check failed, assuming not granted");
                false
            })
    }

    fn build_permission_request_intent(&self) -> PermissionIntent {
        PermissionIntent::manage_overlay(&self.package)
    }
}

/// The current activity, reached through the Kotlin side.
struct ActivityHost {
    bridge: MobileBridge,
}

impl HostContext for ActivityHost {
    fn start_intent(&self, intent: &PermissionIntent) -> std::result::Result<(), String> {
        self.bridge
            .call::<Value>("startIntent", intent)
            .map(drop)
            .map_err(|e| e.to_string())
    }

    fn open_main_app(&self, extras: &Map<String, Value>) -> std::result::Result<(), String> {
        self.bridge
            .call::<Value>("openMainApp", extras)
            .map(drop)
            .map_err(|e| e.to_string())
    }
}

struct NotificationService {
    bridge: MobileBridge,
}

impl ForegroundService for NotificationService {
    fn start(&self, notification: &NotificationConfig) {
        self.bridge.notify("startForegroundService", notification);
    }

    fn stop(&self) {
        self.bridge.notify("stopForegroundService", json!({}));
    }
}

pub fn router(
    app: &AppHandle,
    api: PluginApi<Wry, Option<PluginSettings>>,
    settings: PluginSettings,
) -> Result<Router> {
    let bridge = MobileBridge(api.register_android_plugin(PLUGIN_IDENTIFIER, PLUGIN_CLASS)?);
    app.manage(bridge.clone());

    let engine_bridge = bridge.clone();
    let factory = move |entrypoint: &str| -> std::result::Result<Arc<dyn ContentEngine>, EngineError> {
        engine_bridge
            .call::<Value>("createEngine", json!({ "entrypoint": entrypoint }))
            .map_err(|e| EngineError::Startup {
                entrypoint: entrypoint.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Arc::new(AndroidEngine {
            entrypoint: entrypoint.to_string(),
            bridge: engine_bridge.clone(),
        }))
    };

    let permissions = AndroidPermissions {
        bridge: bridge.clone(),
        package: app.config().identifier.clone(),
    };
    let mut router = CommandRouter::new(
        AndroidCompositor {
            bridge: bridge.clone(),
        },
        factory,
        permissions,
        NotificationService {
            bridge: bridge.clone(),
        },
        settings,
    );
    router.attach_host(ActivityHost { bridge });
    info!("Android overlay backend ready");
    Ok(router)
}

/// Push host data into the overlay content.
pub fn deliver_to_overlay(app: &AppHandle, payload: Value) {
    match app.try_state::<MobileBridge>() {
        Some(bridge) => bridge.notify("deliverToOverlay", json!({ "data": payload })),
        None => warn!("Android bridge missing, dropping overlay data"),
    }
}
