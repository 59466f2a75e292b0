//! Mapping from a declarative [`OverlayConfig`] to the attributes the window
//! manager understands.
//!
//! Flag and gravity values match the Android `WindowManager.LayoutParams`
//! constants so the attributes can be handed to the platform side unchanged.

use bitflags::bitflags;
use serde::{Serialize, Serializer};

use crate::overlay::config::{Alignment, InteractionMode, OverlayConfig, Position};

bitflags! {
    /// Event-routing flags of an overlay window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        const NOT_FOCUSABLE = 0x0000_0008;
        const NOT_TOUCHABLE = 0x0000_0010;
        const NOT_TOUCH_MODAL = 0x0000_0020;
        const WATCH_OUTSIDE_TOUCH = 0x0004_0000;
        const SHOW_WHEN_LOCKED = 0x0008_0000;
        const TURN_SCREEN_ON = 0x0020_0000;
        const DISMISS_KEYGUARD = 0x0040_0000;
    }
}

impl WindowFlags {
    /// Whether the surface receives pointer input at all.
    pub fn is_touchable(self) -> bool {
        !self.contains(WindowFlags::NOT_TOUCHABLE)
    }

    pub fn is_focusable(self) -> bool {
        !self.contains(WindowFlags::NOT_FOCUSABLE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HorizontalAnchor {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Two-axis anchor resolved from an [`Alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gravity {
    pub horizontal: HorizontalAnchor,
    pub vertical: VerticalAnchor,
}

impl Gravity {
    pub fn from_alignment(alignment: Alignment) -> Self {
        use HorizontalAnchor as H;
        use VerticalAnchor as V;

        let (horizontal, vertical) = match alignment {
            Alignment::Top => (H::Center, V::Top),
            Alignment::Bottom => (H::Center, V::Bottom),
            Alignment::Left => (H::Start, V::Center),
            Alignment::Right => (H::End, V::Center),
            Alignment::Center => (H::Center, V::Center),
            Alignment::TopLeft => (H::Start, V::Top),
            Alignment::TopRight => (H::End, V::Top),
            Alignment::BottomLeft => (H::Start, V::Bottom),
            Alignment::BottomRight => (H::End, V::Bottom),
        };
        Self {
            horizontal,
            vertical,
        }
    }

    /// Android `Gravity` bit pattern.
    pub fn to_raw(self) -> i32 {
        let h = match self.horizontal {
            HorizontalAnchor::Start => 0x0080_0003,
            HorizontalAnchor::Center => 0x01,
            HorizontalAnchor::End => 0x0080_0005,
        };
        let v = match self.vertical {
            VerticalAnchor::Top => 0x30,
            VerticalAnchor::Center => 0x10,
            VerticalAnchor::Bottom => 0x50,
        };
        h | v
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowType {
    ApplicationOverlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PixelFormat {
    Translucent,
}

/// Everything the compositor needs to place and route an overlay surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowAttributes {
    pub width: i32,
    pub height: i32,
    pub gravity: Gravity,
    #[serde(serialize_with = "serialize_flags")]
    pub flags: WindowFlags,
    pub x: i32,
    pub y: i32,
    pub window_type: WindowType,
    pub format: PixelFormat,
}

impl WindowAttributes {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

fn serialize_flags<S: Serializer>(flags: &WindowFlags, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u32(flags.bits())
}

/// Flag set for an interaction mode. Total over every combination.
pub fn flags_for(mode: InteractionMode, drag_enabled: bool) -> WindowFlags {
    match (mode, drag_enabled) {
        (InteractionMode::ClickThrough, _) => {
            WindowFlags::NOT_TOUCHABLE | WindowFlags::NOT_FOCUSABLE
        }
        (InteractionMode::FocusPointer, _) => WindowFlags::NOT_TOUCH_MODAL,
        (InteractionMode::LockScreen, _) => {
            WindowFlags::NOT_TOUCH_MODAL
                | WindowFlags::NOT_FOCUSABLE
                | WindowFlags::WATCH_OUTSIDE_TOUCH
                | WindowFlags::SHOW_WHEN_LOCKED
                | WindowFlags::TURN_SCREEN_ON
                | WindowFlags::DISMISS_KEYGUARD
        }
        (InteractionMode::Default, false) => WindowFlags::empty(),
        // Non-modal so taps outside and drag gestures both reach their targets.
        (InteractionMode::Default, true) => {
            WindowFlags::NOT_TOUCH_MODAL
                | WindowFlags::NOT_FOCUSABLE
                | WindowFlags::WATCH_OUTSIDE_TOUCH
        }
    }
}

pub fn build(config: &OverlayConfig) -> WindowAttributes {
    let position = config.initial_position.unwrap_or(Position::ZERO);
    WindowAttributes {
        width: config.width.to_raw(),
        height: config.height.to_raw(),
        gravity: Gravity::from_alignment(config.alignment),
        flags: flags_for(config.interaction_mode, config.drag_enabled),
        x: position.x,
        y: position.y,
        window_type: WindowType::ApplicationOverlay,
        format: PixelFormat::Translucent,
    }
}
