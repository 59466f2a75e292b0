const COMMANDS: &[&str] = &[
    "show_overlay",
    "close_overlay",
    "update_flag",
    "resize_overlay",
    "move_overlay",
    "get_overlay_position",
    "is_showing",
    "share_data",
    "share_with_host",
    "initialize_engine",
    "dispose_engine",
    "is_engine_initialized",
    "is_permission_granted",
    "request_permission",
    "open_main_app",
    "pointer_event",
    "overlay_control",
    "invoke",
];

fn main() {
    tauri_plugin::Builder::new(COMMANDS).build();
}
