use serde::{Deserialize, Serialize};

/// Size sentinel the window manager reads as "fill the available space".
pub const MATCH_PARENT: i32 = -1;
/// Size sentinel the window manager reads as "size to the content".
pub const WRAP_CONTENT: i32 = -2;

/// One axis of the overlay size.
///
/// On the wire a dimension is a plain integer: a non-negative pixel count, or
/// one of the [`MATCH_PARENT`] / [`WRAP_CONTENT`] sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Dimension {
    Exact(u32),
    #[default]
    Fill,
    Fit,
}

impl Dimension {
    /// Value written into the window attributes.
    pub fn to_raw(self) -> i32 {
        match self {
            Dimension::Exact(px) => i32::try_from(px).unwrap_or(i32::MAX),
            Dimension::Fill => MATCH_PARENT,
            Dimension::Fit => WRAP_CONTENT,
        }
    }
}

impl TryFrom<i32> for Dimension {
    type Error = String;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            MATCH_PARENT => Ok(Dimension::Fill),
            WRAP_CONTENT => Ok(Dimension::Fit),
            px if px >= 0 => Ok(Dimension::Exact(px as u32)),
            other => Err(format!("invalid overlay dimension {}", other)),
        }
    }
}

impl From<Dimension> for i32 {
    fn from(d: Dimension) -> Self {
        d.to_raw()
    }
}

/// Where the overlay is anchored on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Alignment {
    pub const ALL: [Alignment; 9] = [
        Alignment::Top,
        Alignment::Bottom,
        Alignment::Left,
        Alignment::Right,
        Alignment::Center,
        Alignment::TopLeft,
        Alignment::TopRight,
        Alignment::BottomLeft,
        Alignment::BottomRight,
    ];
}

/// Touch and focus routing of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[serde(rename = "clickThrough")]
    ClickThrough,
    #[serde(rename = "focusPointer")]
    FocusPointer,
    #[serde(rename = "lockScreen")]
    LockScreen,
    #[default]
    #[serde(rename = "defaultFlag")]
    Default,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 4] = [
        InteractionMode::ClickThrough,
        InteractionMode::FocusPointer,
        InteractionMode::LockScreen,
        InteractionMode::Default,
    ];
}

/// Edge the overlay snaps to once a drag is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapPolicy {
    #[default]
    None,
    Left,
    Right,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Declarative description of an overlay, fixed once the surface is shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    pub width: Dimension,
    pub height: Dimension,
    pub alignment: Alignment,
    pub interaction_mode: InteractionMode,
    pub drag_enabled: bool,
    pub snap_policy: SnapPolicy,
    pub initial_position: Option<Position>,
}

impl OverlayConfig {
    pub fn sized(width: Dimension, height: Dimension) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_drag(mut self, snap_policy: SnapPolicy) -> Self {
        self.drag_enabled = true;
        self.snap_policy = snap_policy;
        self
    }

    pub fn with_mode(mut self, mode: InteractionMode) -> Self {
        self.interaction_mode = mode;
        self
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.initial_position = Some(Position::new(x, y));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dimension_sentinels() {
        assert_eq!(Dimension::try_from(-1), Ok(Dimension::Fill));
        assert_eq!(Dimension::try_from(-2), Ok(Dimension::Fit));
        assert_eq!(Dimension::try_from(320), Ok(Dimension::Exact(320)));
        assert!(Dimension::try_from(-7).is_err());
        assert_eq!(Dimension::Exact(48).to_raw(), 48);
    }

    #[test]
    fn config_reads_wire_names() {
        let config: OverlayConfig = serde_json::from_value(json!({
            "width": 200,
            "height": -2,
            "alignment": "bottomRight",
            "interactionMode": "clickThrough",
            "dragEnabled": true,
            "snapPolicy": "auto",
            "initialPosition": { "x": 10, "y": 20 }
        }))
        .unwrap();

        assert_eq!(config.width, Dimension::Exact(200));
        assert_eq!(config.height, Dimension::Fit);
        assert_eq!(config.alignment, Alignment::BottomRight);
        assert_eq!(config.interaction_mode, InteractionMode::ClickThrough);
        assert_eq!(config.snap_policy, SnapPolicy::Auto);
        assert_eq!(config.initial_position, Some(Position::new(10, 20)));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: OverlayConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.width, Dimension::Fill);
        assert_eq!(config.interaction_mode, InteractionMode::Default);
    }
}
