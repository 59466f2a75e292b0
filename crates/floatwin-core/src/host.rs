//! Platform services the overlay core talks to but does not own.

use serde::{Deserialize, Serialize};

/// Settings screen action the host opens to let the user grant the overlay
/// permission.
pub const MANAGE_OVERLAY_PERMISSION: &str = "android.settings.action.MANAGE_OVERLAY_PERMISSION";

/// Opaque navigation request built by the permission authority and started by
/// the host context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionIntent {
    pub action: String,
    pub target: String,
    pub new_task: bool,
}

impl PermissionIntent {
    pub fn manage_overlay(package: &str) -> Self {
        Self {
            action: MANAGE_OVERLAY_PERMISSION.to_string(),
            target: format!("package:{}", package),
            new_task: true,
        }
    }
}

pub trait PermissionAuthority: Send {
    fn is_overlay_permission_granted(&self) -> bool;

    fn build_permission_request_intent(&self) -> PermissionIntent;
}

/// A live UI context of the host app (an activity, a main window).
pub trait HostContext: Send {
    fn start_intent(&self, intent: &PermissionIntent) -> Result<(), String>;

    /// Bring the host app to the foreground, passing `extras` along.
    fn open_main_app(&self, extras: &serde_json::Map<String, serde_json::Value>)
    -> Result<(), String>;
}

/// Lock-screen visibility of the persistent notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotificationVisibility {
    #[serde(rename = "VISIBILITY_PUBLIC")]
    Public,
    #[serde(rename = "VISIBILITY_PRIVATE")]
    Private,
    #[default]
    #[serde(rename = "VISIBILITY_SECRET")]
    Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationConfig {
    pub title: String,
    pub content: Option<String>,
    pub visibility: NotificationVisibility,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Floating Window Activated".to_string(),
            content: None,
            visibility: NotificationVisibility::Secret,
        }
    }
}

/// Keeps the persistent notification in step with the overlay. Calls are fire
/// and forget: the core never waits on them and ignores their outcome.
pub trait ForegroundService: Send + Sync {
    fn start(&self, notification: &NotificationConfig);

    fn stop(&self);
}

/// Foreground service for hosts that keep no notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoForegroundService;

impl ForegroundService for NoForegroundService {
    fn start(&self, _notification: &NotificationConfig) {}

    fn stop(&self) {}
}
