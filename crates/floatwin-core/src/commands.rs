//! Command surface exposed to the host app.
//!
//! Calls arrive as a method name plus a loosely typed JSON argument object.
//! [`Command::decode`] turns them into typed commands, rejecting unknown
//! fields and protocol versions newer than [`PROTOCOL_VERSION`], before
//! [`CommandRouter`] runs them against the overlay controller.

use std::sync::Arc;

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::{
    channel::{ControlCommand, MessageBridge},
    engine::{EngineFactory, EngineLifecycleBridge},
    error::{Error, Result},
    host::{
        ForegroundService, HostContext, NotificationConfig, NotificationVisibility,
        PermissionAuthority,
    },
    overlay::{
        compositor::Compositor,
        config::{Alignment, Dimension, InteractionMode, OverlayConfig, Position, SnapPolicy},
        surface::{CloseReason, OverlaySurfaceController, SurfaceEvent},
    },
    settings::PluginSettings,
    ui::UiRequest,
};

/// Highest argument layout this build understands.
pub const PROTOCOL_VERSION: u64 = 1;

pub const IS_PERMISSION_GRANTED: &str = "isPermissionGranted";
pub const REQUEST_PERMISSION: &str = "requestPermission";
pub const SHOW_OVERLAY: &str = "showOverlay";
pub const CLOSE_OVERLAY: &str = "closeOverlay";
pub const UPDATE_FLAG: &str = "updateFlag";
pub const RESIZE_OVERLAY: &str = "resizeOverlay";
pub const MOVE_OVERLAY: &str = "moveOverlay";
pub const GET_OVERLAY_POSITION: &str = "getOverlayPosition";
pub const IS_SHOWING: &str = "isShowing";
pub const SHARE_DATA: &str = "shareData";
pub const INITIALIZE_ENGINE: &str = "initializeEngine";
pub const DISPOSE_ENGINE: &str = "disposeEngine";
pub const IS_ENGINE_INITIALIZED: &str = "isEngineInitialized";
pub const OPEN_MAIN_APP: &str = "openMainApp";

/// Point given with fractional or integral coordinates.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct WirePoint {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

impl From<WirePoint> for Position {
    fn from(p: WirePoint) -> Self {
        Position::new(p.x as i32, p.y as i32)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ShowOverlayArgs {
    pub width: Dimension,
    pub height: Dimension,
    pub alignment: Alignment,
    pub flag: InteractionMode,
    pub enable_drag: bool,
    pub position_gravity: SnapPolicy,
    #[serde(deserialize_with = "deserialize_point")]
    pub start_position: Option<Position>,
    pub overlay_title: Option<String>,
    pub overlay_content: Option<String>,
    pub notification_visibility: Option<NotificationVisibility>,
    pub entrypoint: Option<String>,
}

fn deserialize_point<'de, D>(d: D) -> std::result::Result<Option<Position>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<WirePoint>::deserialize(d)?.map(Position::from))
}

impl ShowOverlayArgs {
    pub fn config(&self) -> OverlayConfig {
        OverlayConfig {
            width: self.width,
            height: self.height,
            alignment: self.alignment,
            interaction_mode: self.flag,
            drag_enabled: self.enable_drag,
            snap_policy: self.position_gravity,
            initial_position: self.start_position,
        }
    }

    /// Notification for this show, with unset fields taken from `defaults`.
    pub fn notification(&self, defaults: &NotificationConfig) -> NotificationConfig {
        NotificationConfig {
            title: self
                .overlay_title
                .clone()
                .unwrap_or_else(|| defaults.title.clone()),
            content: self
                .overlay_content
                .clone()
                .or_else(|| defaults.content.clone()),
            visibility: self.notification_visibility.unwrap_or(defaults.visibility),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct FlagArgs {
    flag: InteractionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct ResizeArgs {
    width: Dimension,
    height: Dimension,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct ShareArgs {
    data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct EngineArgs {
    entrypoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct Empty {}

/// A decoded host command.
#[derive(Debug, Clone)]
pub enum Command {
    IsPermissionGranted,
    RequestPermission,
    ShowOverlay(Box<ShowOverlayArgs>),
    CloseOverlay,
    UpdateFlag(InteractionMode),
    ResizeOverlay { width: Dimension, height: Dimension },
    MoveOverlay(Position),
    GetOverlayPosition,
    IsShowing,
    ShareData(Value),
    InitializeEngine { entrypoint: Option<String> },
    DisposeEngine,
    IsEngineInitialized { entrypoint: Option<String> },
    OpenMainApp(Map<String, Value>),
}

/// Strip and check the optional `version` field of an argument object.
fn check_version(method: &str, args: &mut Value) -> Result<()> {
    let Value::Object(map) = args else {
        return Ok(());
    };
    let Some(version) = map.remove("version") else {
        return Ok(());
    };
    match version.as_u64() {
        Some(v) if (1..=PROTOCOL_VERSION).contains(&v) => Ok(()),
        Some(v) => Err(Error::InvalidArgument(format!(
            "{method}: unsupported protocol version {v}"
        ))),
        None => Err(Error::InvalidArgument(format!(
            "{method}: version must be a positive integer"
        ))),
    }
}

fn decode_args<T: DeserializeOwned>(method: &str, args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| Error::InvalidArgument(format!("{method}: {e}")))
}

impl Command {
    pub fn decode(method: &str, mut args: Value) -> Result<Self> {
        check_version(method, &mut args)?;

        let command = match method {
            IS_PERMISSION_GRANTED => {
                decode_args::<Empty>(method, args)?;
                Command::IsPermissionGranted
            }
            REQUEST_PERMISSION => {
                decode_args::<Empty>(method, args)?;
                Command::RequestPermission
            }
            SHOW_OVERLAY => Command::ShowOverlay(Box::new(decode_args(method, args)?)),
            CLOSE_OVERLAY => {
                decode_args::<Empty>(method, args)?;
                Command::CloseOverlay
            }
            UPDATE_FLAG => Command::UpdateFlag(decode_args::<FlagArgs>(method, args)?.flag),
            RESIZE_OVERLAY => {
                let ResizeArgs { width, height } = decode_args(method, args)?;
                Command::ResizeOverlay { width, height }
            }
            MOVE_OVERLAY => {
                Command::MoveOverlay(decode_args::<WirePoint>(method, args)?.into())
            }
            GET_OVERLAY_POSITION => {
                decode_args::<Empty>(method, args)?;
                Command::GetOverlayPosition
            }
            IS_SHOWING => {
                decode_args::<Empty>(method, args)?;
                Command::IsShowing
            }
            SHARE_DATA => Command::ShareData(decode_args::<ShareArgs>(method, args)?.data),
            INITIALIZE_ENGINE => Command::InitializeEngine {
                entrypoint: decode_args::<EngineArgs>(method, args)?.entrypoint,
            },
            DISPOSE_ENGINE => {
                decode_args::<Empty>(method, args)?;
                Command::DisposeEngine
            }
            IS_ENGINE_INITIALIZED => Command::IsEngineInitialized {
                entrypoint: decode_args::<EngineArgs>(method, args)?.entrypoint,
            },
            OPEN_MAIN_APP => Command::OpenMainApp(decode_args(method, args)?),
            other => return Err(Error::UnsupportedCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// Glue between the host app, the overlay controller and the platform
/// services.
pub struct CommandRouter<C> {
    controller: OverlaySurfaceController<C>,
    permissions: Box<dyn PermissionAuthority>,
    foreground: Arc<dyn ForegroundService>,
    host: Option<Box<dyn HostContext>>,
    messages: MessageBridge,
    settings: PluginSettings,
}

impl<C: Compositor> CommandRouter<C> {
    pub fn new(
        compositor: C,
        factory: impl EngineFactory + 'static,
        permissions: impl PermissionAuthority + 'static,
        foreground: impl ForegroundService + 'static,
        settings: PluginSettings,
    ) -> Self {
        let engines = EngineLifecycleBridge::new(settings.engine_policy, factory);
        let mut controller = OverlaySurfaceController::new(compositor, engines)
            .with_drag_threshold(settings.drag_threshold);

        let foreground: Arc<dyn ForegroundService> = Arc::new(foreground);
        let service = foreground.clone();
        controller.subscribe(move |event: &SurfaceEvent| {
            if matches!(event, SurfaceEvent::Closed { reason } if *reason != CloseReason::Replaced) {
                service.stop();
            }
        });

        let mut router = Self {
            controller,
            permissions: Box::new(permissions),
            foreground,
            host: None,
            messages: MessageBridge::default(),
            settings,
        };

        if router.settings.preload_on_startup {
            let entrypoint = router.settings.entrypoint.clone();
            if let Err(e) = router.controller.preload_engine(&entrypoint) {
                warn!(error = %e, %entrypoint, "Failed to preload content engine");
            }
        }
        router
    }

    pub fn controller(&self) -> &OverlaySurfaceController<C> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut OverlaySurfaceController<C> {
        &mut self.controller
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn attach_host(&mut self, host: impl HostContext + 'static) {
        self.host = Some(Box::new(host));
    }

    pub fn detach_host(&mut self) {
        self.host = None;
    }

    /// Receiver for data the host shares with the overlay content.
    pub fn listen_overlay_data(&mut self) -> UnboundedReceiver<Value> {
        self.messages.to_overlay.listen()
    }

    /// Receiver for data the overlay content shares with the host.
    pub fn listen_host_data(&mut self) -> UnboundedReceiver<Value> {
        self.messages.to_host.listen()
    }

    pub fn share_with_host(&mut self, payload: Value) -> bool {
        self.messages.to_host.send(payload)
    }

    /// Decode and run one host command.
    pub fn dispatch(&mut self, method: &str, args: Value) -> Result<Value> {
        debug!(method, "Dispatching command");
        let command = Command::decode(method, args)?;
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> Result<Value> {
        match command {
            Command::IsPermissionGranted => {
                Ok(json!(self.permissions.is_overlay_permission_granted()))
            }
            Command::RequestPermission => {
                let host = self.host.as_ref().ok_or(Error::NoHostContext)?;
                let intent = self.permissions.build_permission_request_intent();
                match host.start_intent(&intent) {
                    Ok(()) => Ok(json!(true)),
                    Err(reason) => {
                        warn!(%reason, "Host failed to open the permission screen");
                        Ok(json!(false))
                    }
                }
            }
            Command::ShowOverlay(args) => self.show(&args),
            Command::CloseOverlay => {
                self.controller.close()?;
                Ok(json!(true))
            }
            Command::UpdateFlag(mode) => Ok(json!(self.controller.update_flags(mode))),
            Command::ResizeOverlay { width, height } => {
                Ok(json!(self.controller.resize(width, height)))
            }
            Command::MoveOverlay(Position { x, y }) => Ok(json!(self.controller.move_to(x, y))),
            Command::GetOverlayPosition => Ok(serde_json::to_value(
                self.controller.current_position(),
            )?),
            Command::IsShowing => Ok(json!(self.controller.is_showing())),
            Command::ShareData(data) => self.share_with_overlay(data).map(Value::Bool),
            Command::InitializeEngine { entrypoint } => {
                let entrypoint = entrypoint.unwrap_or_else(|| self.settings.entrypoint.clone());
                self.controller.preload_engine(&entrypoint)?;
                Ok(json!(true))
            }
            Command::DisposeEngine => {
                self.controller.dispose_engines()?;
                Ok(json!(true))
            }
            Command::IsEngineInitialized { entrypoint } => {
                let entrypoint = entrypoint.as_deref().unwrap_or(&self.settings.entrypoint);
                Ok(json!(self.controller.engines().is_preloaded(entrypoint)))
            }
            Command::OpenMainApp(extras) => {
                let host = self.host.as_ref().ok_or(Error::NoHostContext)?;
                match host.open_main_app(&extras) {
                    Ok(()) => Ok(json!(true)),
                    Err(reason) => {
                        warn!(%reason, "Host failed to open the main app");
                        Ok(json!(false))
                    }
                }
            }
        }
    }

    fn show(&mut self, args: &ShowOverlayArgs) -> Result<Value> {
        if !self.permissions.is_overlay_permission_granted() {
            return Err(Error::PermissionDenied);
        }
        let entrypoint = args
            .entrypoint
            .clone()
            .unwrap_or_else(|| self.settings.entrypoint.clone());
        // A failed replacement still closes the old overlay.
        let was_showing = self.controller.is_showing();
        if let Err(e) = self.controller.show(args.config(), &entrypoint) {
            if was_showing {
                self.foreground.stop();
            }
            return Err(e);
        }

        let notification = args.notification(&self.settings.notification);
        self.foreground.start(&notification);
        info!(title = %notification.title, "Foreground notification started");
        Ok(json!(true))
    }

    /// Push `data` into the overlay content. Needs an engine to deliver to.
    pub fn share_with_overlay(&mut self, data: Value) -> Result<bool> {
        let engines = self.controller.engines();
        let has_engine =
            engines.active().is_some() || engines.is_preloaded(&self.settings.entrypoint);
        if !has_engine {
            return Err(Error::EngineNotFound(self.settings.entrypoint.clone()));
        }
        Ok(self.messages.to_overlay.send(data))
    }

    /// Control request sent by the overlay content about its own window.
    pub fn handle_control(&mut self, method: &str) -> Result<Value> {
        match ControlCommand::parse(method)? {
            ControlCommand::Close => {
                info!("Overlay content requested close");
                self.controller.close()?;
                Ok(json!(true))
            }
        }
    }

    /// Run a request that was marshaled onto the UI thread.
    pub fn apply(&mut self, request: UiRequest) -> Result<()> {
        match request {
            UiRequest::Close => self.controller.close(),
            UiRequest::SurfaceRemoved(surface) => {
                self.controller.on_surface_removed(surface);
                Ok(())
            }
            UiRequest::ShareWithHost(payload) => {
                if !self.share_with_host(payload) {
                    debug!("No host listener for overlay data");
                }
                Ok(())
            }
            UiRequest::ShareWithOverlay(payload) => self.share_with_overlay(payload).map(|_| ()),
        }
    }
}
