//! Native window tweaks that Tauri does not expose.
//!
//! Keeps the overlay above normal windows, out of window switchers and, when
//! the flags ask for it, transparent to pointer input or unable to take focus.

use floatwin_core::WindowFlags;
use tauri::WebviewWindow;
use tracing::debug;

pub fn configure_surface(window: &WebviewWindow, flags: WindowFlags) -> Result<(), String> {
    debug!(
        touchable = flags.is_touchable(),
        focusable = flags.is_focusable(),
        "Configuring native overlay window"
    );

    #[cfg(target_os = "macos")]
    configure_macos(window, flags)?;

    #[cfg(target_os = "windows")]
    configure_windows(window, flags)?;

    // Elsewhere the builder's always-on-top and skip-taskbar are enough.
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let _ = (window, flags);

    Ok(())
}

#[cfg(target_os = "macos")]
fn configure_macos(window: &WebviewWindow, flags: WindowFlags) -> Result<(), String> {
    use objc2::rc::Retained;
    use objc2_app_kit::{NSMainMenuWindowLevel, NSWindow, NSWindowCollectionBehavior};

    let ptr = window
        .ns_window()
        .map_err(|e| format!("Failed to get NSWindow handle: {}", e))?;

    // SAFETY: the pointer stays valid while `window` is alive and we retain it
    // for the duration of the calls below.
    let ns_window: Retained<NSWindow> = unsafe { Retained::retain(ptr as *mut NSWindow) }
        .ok_or("NSWindow pointer was null")?;

    ns_window.setLevel(NSMainMenuWindowLevel);

    let passthrough = !flags.is_touchable();
    ns_window.setIgnoresMouseEvents(passthrough);
    ns_window.setAcceptsMouseMovedEvents(!passthrough);
    ns_window.setHasShadow(false);

    ns_window.setCollectionBehavior(
        NSWindowCollectionBehavior::CanJoinAllSpaces
            | NSWindowCollectionBehavior::Stationary
            | NSWindowCollectionBehavior::IgnoresCycle
            | NSWindowCollectionBehavior::FullScreenAuxiliary
            | NSWindowCollectionBehavior::Transient,
    );
    Ok(())
}

#[cfg(target_os = "windows")]
fn configure_windows(window: &WebviewWindow, flags: WindowFlags) -> Result<(), String> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        GWL_EXSTYLE, GetWindowLongPtrW, HWND_TOPMOST, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
        SetWindowLongPtrW, SetWindowPos, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
        WS_EX_TRANSPARENT,
    };

    let hwnd = window
        .hwnd()
        .map_err(|e| format!("Failed to get HWND handle: {}", e))?;

    // Styles recomputed from the flags on every call.
    let managed = (WS_EX_LAYERED.0 | WS_EX_TRANSPARENT.0 | WS_EX_NOACTIVATE.0) as isize;

    unsafe {
        let hwnd = HWND(hwnd.0);

        let mut ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE) & !managed;
        ex_style |= WS_EX_TOOLWINDOW.0 as isize;
        if !flags.is_touchable() {
            ex_style |= (WS_EX_LAYERED.0 | WS_EX_TRANSPARENT.0) as isize;
        }
        if !flags.is_focusable() {
            ex_style |= WS_EX_NOACTIVATE.0 as isize;
        }
        SetWindowLongPtrW(hwnd, GWL_EXSTYLE, ex_style);

        SetWindowPos(
            hwnd,
            Some(HWND_TOPMOST),
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
        )
        .map_err(|e| format!("Failed to raise overlay window: {}", e))?;
    }
    Ok(())
}
