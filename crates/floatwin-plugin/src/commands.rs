use floatwin_core::{
    CommandError, Dimension, InteractionMode, PointerEvent, Position, commands as wire,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tauri::{State, command};

use crate::{Error, OverlayState};

/// Run a wire command and decode its reply.
fn dispatch<T: DeserializeOwned>(
    state: &OverlayState,
    method: &str,
    args: Value,
) -> Result<T, CommandError> {
    let reply = state.router()?.dispatch(method, args).map_err(Error::from)?;
    Ok(serde_json::from_value(reply).map_err(Error::from)?)
}

#[command]
pub fn show_overlay(
    state: State<'_, OverlayState>,
    options: Option<Value>,
) -> Result<bool, CommandError> {
    dispatch(&state, wire::SHOW_OVERLAY, options.unwrap_or_default())
}

#[command]
pub fn close_overlay(state: State<'_, OverlayState>) -> Result<bool, CommandError> {
    dispatch(&state, wire::CLOSE_OVERLAY, Value::Null)
}

#[command]
pub fn update_flag(
    state: State<'_, OverlayState>,
    flag: InteractionMode,
) -> Result<bool, CommandError> {
    dispatch(&state, wire::UPDATE_FLAG, json!({ "flag": flag }))
}

#[command]
pub fn resize_overlay(
    state: State<'_, OverlayState>,
    width: Dimension,
    height: Dimension,
) -> Result<bool, CommandError> {
    dispatch(
        &state,
        wire::RESIZE_OVERLAY,
        json!({ "width": width, "height": height }),
    )
}

#[command]
pub fn move_overlay(
    state: State<'_, OverlayState>,
    x: f64,
    y: f64,
) -> Result<bool, CommandError> {
    dispatch(&state, wire::MOVE_OVERLAY, json!({ "x": x, "y": y }))
}

#[command]
pub fn get_overlay_position(state: State<'_, OverlayState>) -> Result<Position, CommandError> {
    dispatch(&state, wire::GET_OVERLAY_POSITION, Value::Null)
}

#[command]
pub fn is_showing(state: State<'_, OverlayState>) -> Result<bool, CommandError> {
    dispatch(&state, wire::IS_SHOWING, Value::Null)
}

/// Host to overlay.
#[command]
pub fn share_data(state: State<'_, OverlayState>, data: Value) -> Result<bool, CommandError> {
    dispatch(&state, wire::SHARE_DATA, json!({ "data": data }))
}

/// Overlay to host.
#[command]
pub fn share_with_host(state: State<'_, OverlayState>, data: Value) -> Result<bool, CommandError> {
    Ok(state.router()?.share_with_host(data))
}

#[command]
pub fn initialize_engine(
    state: State<'_, OverlayState>,
    entrypoint: Option<String>,
) -> Result<bool, CommandError> {
    dispatch(
        &state,
        wire::INITIALIZE_ENGINE,
        json!({ "entrypoint": entrypoint }),
    )
}

#[command]
pub fn dispose_engine(state: State<'_, OverlayState>) -> Result<bool, CommandError> {
    dispatch(&state, wire::DISPOSE_ENGINE, Value::Null)
}

#[command]
pub fn is_engine_initialized(
    state: State<'_, OverlayState>,
    entrypoint: Option<String>,
) -> Result<bool, CommandError> {
    dispatch(
        &state,
        wire::IS_ENGINE_INITIALIZED,
        json!({ "entrypoint": entrypoint }),
    )
}

#[command]
pub fn is_permission_granted(state: State<'_, OverlayState>) -> Result<bool, CommandError> {
    dispatch(&state, wire::IS_PERMISSION_GRANTED, Value::Null)
}

#[command]
pub fn request_permission(state: State<'_, OverlayState>) -> Result<bool, CommandError> {
    dispatch(&state, wire::REQUEST_PERMISSION, Value::Null)
}

#[command]
pub fn open_main_app(
    state: State<'_, OverlayState>,
    extras: Option<Map<String, Value>>,
) -> Result<bool, CommandError> {
    dispatch(
        &state,
        wire::OPEN_MAIN_APP,
        Value::Object(extras.unwrap_or_default()),
    )
}

/// Pointer input from the overlay page. Returns whether the drag consumed it.
#[command]
pub fn pointer_event(
    state: State<'_, OverlayState>,
    event: PointerEvent,
) -> Result<bool, CommandError> {
    Ok(state.router()?.controller_mut().handle_pointer(event))
}

/// Control request from the overlay page about its own window.
#[command]
pub fn overlay_control(
    state: State<'_, OverlayState>,
    method: String,
) -> Result<Value, CommandError> {
    Ok(state.router()?.handle_control(&method)?)
}

/// Untyped entry point taking wire method names.
#[command]
pub fn invoke(
    state: State<'_, OverlayState>,
    method: String,
    args: Option<Value>,
) -> Result<Value, CommandError> {
    dispatch(&state, &method, args.unwrap_or_default())
}
