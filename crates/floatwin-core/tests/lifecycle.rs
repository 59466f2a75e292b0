use std::sync::{Arc, Mutex};

use floatwin_core::{
    CommandRouter, Compositor, CompositorError, ContentEngine, ContentEngineHandle, EngineError,
    EnginePolicy, ForegroundService, NotificationConfig, PermissionAuthority, PermissionIntent,
    PluginSettings, PointerEvent, Position, Size, SurfaceId, UiRequest, WindowAttributes, WindowFlags, ui,
};
use serde_json::{Value, json};

type Log = Arc<Mutex<Vec<String>>>;

fn record(log: &Log, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

struct FakeWindowManager {
    log: Log,
    live: Option<WindowAttributes>,
}

impl Compositor for FakeWindowManager {
    fn add_surface(
        &mut self,
        _surface: SurfaceId,
        content: &ContentEngineHandle,
        attributes: &WindowAttributes,
    ) -> Result<(), CompositorError> {
        record(&self.log, format!("add:{}", content.entrypoint()));
        self.live = Some(*attributes);
        Ok(())
    }

    fn update_surface(&mut self, attributes: &WindowAttributes) -> Result<(), CompositorError> {
        if self.live.is_none() {
            return Err(CompositorError::NotAttached);
        }
        record(&self.log, format!("update:{},{}", attributes.x, attributes.y));
        self.live = Some(*attributes);
        Ok(())
    }

    fn remove_surface(&mut self) -> Result<(), CompositorError> {
        record(&self.log, "remove");
        self.live.take().map(|_| ()).ok_or(CompositorError::NotAttached)
    }

    fn screen_size(&self) -> Size {
        Size::new(720, 1280)
    }
}

struct FakeEngine {
    entrypoint: String,
    log: Log,
}

impl ContentEngine for FakeEngine {
    fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    fn resume(&self) {
        record(&self.log, "resume");
    }

    fn pause(&self) {
        record(&self.log, "pause");
    }

    fn destroy(&self) {
        record(&self.log, "destroy");
    }
}

struct Granted;

impl PermissionAuthority for Granted {
    fn is_overlay_permission_granted(&self) -> bool {
        true
    }

    fn build_permission_request_intent(&self) -> PermissionIntent {
        PermissionIntent::manage_overlay("dev.floatwin.demo")
    }
}

struct Notification(Log);

impl ForegroundService for Notification {
    fn start(&self, notification: &NotificationConfig) {
        record(&self.0, format!("notify:{}", notification.title));
    }

    fn stop(&self) {
        record(&self.0, "notify:stop");
    }
}

fn router(policy: EnginePolicy) -> (CommandRouter<FakeWindowManager>, Log) {
    let log = Log::default();
    let engine_log = log.clone();
    let factory = move |entrypoint: &str| -> Result<Arc<dyn ContentEngine>, EngineError> {
        record(&engine_log, format!("create:{entrypoint}"));
        Ok(Arc::new(FakeEngine {
            entrypoint: entrypoint.to_string(),
            log: engine_log.clone(),
        }))
    };
    let settings = PluginSettings {
        engine_policy: policy,
        ..PluginSettings::default()
    };
    let router = CommandRouter::new(
        FakeWindowManager {
            log: log.clone(),
            live: None,
        },
        factory,
        Granted,
        Notification(log.clone()),
        settings,
    );
    (router, log)
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

#[test]
fn drag_and_snap_a_chat_head() {
    let (mut router, log) = router(EnginePolicy::Preloaded);

    router
        .dispatch(
            "showOverlay",
            json!({
                "width": 100,
                "height": 100,
                "alignment": "topLeft",
                "enableDrag": true,
                "positionGravity": "auto",
                "startPosition": { "x": 20, "y": 300 },
                "overlayTitle": "Chat"
            }),
        )
        .unwrap();
    assert_eq!(
        take(&log),
        ["create:overlayMain", "resume", "add:overlayMain", "notify:Chat"]
    );

    let live = router.controller().state().surface().unwrap().attributes().flags;
    assert!(live.contains(WindowFlags::NOT_FOCUSABLE | WindowFlags::NOT_TOUCH_MODAL));

    let controller = router.controller_mut();
    assert!(!controller.handle_pointer(PointerEvent::Down { x: 60.0, y: 350.0 }));
    assert!(controller.handle_pointer(PointerEvent::Move { x: 460.0, y: 380.0 }));
    assert!(controller.handle_pointer(PointerEvent::Up { x: 460.0, y: 380.0 }));

    // Dropped past the middle of a 720 px screen, so it snaps right.
    assert_eq!(take(&log), ["update:420,330", "update:620,330"]);
    assert_eq!(
        router.dispatch("getOverlayPosition", Value::Null).unwrap(),
        json!({ "x": 620, "y": 330 })
    );

    router.dispatch("closeOverlay", Value::Null).unwrap();
    assert_eq!(take(&log), ["remove", "pause", "notify:stop"]);
    assert_eq!(router.dispatch("isShowing", Value::Null).unwrap(), json!(false));
}

#[test]
fn on_demand_engines_die_with_their_surface() {
    let (mut router, log) = router(EnginePolicy::OnDemand);

    router.dispatch("showOverlay", json!({})).unwrap();
    router.dispatch("showOverlay", json!({})).unwrap();
    router.dispatch("closeOverlay", json!({})).unwrap();

    let log = take(&log);
    assert_eq!(log.iter().filter(|e| e.starts_with("create")).count(), 2);
    assert_eq!(log.iter().filter(|e| *e == "destroy").count(), 2);
    assert_eq!(log.last().map(String::as_str), Some("notify:stop"));
}

#[test]
fn window_manager_removal_is_observed_from_another_thread() {
    let (mut router, log) = router(EnginePolicy::Preloaded);
    router.dispatch("showOverlay", json!({})).unwrap();
    take(&log);
    let surface = router.controller().state().surface().unwrap().id();

    let (handle, mut queue) = ui::channel();
    std::thread::spawn(move || handle.post(UiRequest::SurfaceRemoved(surface)))
        .join()
        .unwrap();
    assert_eq!(queue.drain(&mut router), 1);

    assert!(!router.controller().is_showing());
    assert_eq!(take(&log), ["pause", "notify:stop"]);
    assert_eq!(router.controller().current_position(), Position::ZERO);
}

#[test]
fn errors_carry_stable_codes() {
    let (mut router, _) = router(EnginePolicy::OnDemand);

    let cases = [
        ("initializeEngine", json!({}), "INVALID_ARGUMENT"),
        ("shareData", json!({ "data": 1 }), "ENGINE_NOT_FOUND"),
        ("requestPermission", json!({}), "NO_HOST_CONTEXT"),
        ("minimize", json!({}), "NOT_IMPLEMENTED"),
    ];
    for (method, args, code) in cases {
        let err = router.dispatch(method, args).unwrap_err();
        assert_eq!(err.code(), code, "{method}");
    }
}
