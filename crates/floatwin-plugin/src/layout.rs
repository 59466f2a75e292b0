//! Resolves overlay attributes to an absolute window frame on a screen.
//!
//! `x`/`y` are offsets from the edge the gravity anchors to, as on Android:
//! with an end anchor `x` counts leftwards from the right edge, with a center
//! anchor it shifts from the centered position.

use floatwin_core::{
    Size, WindowAttributes,
    overlay::{
        attributes::{HorizontalAnchor, VerticalAnchor},
        config::{MATCH_PARENT, WRAP_CONTENT},
    },
};

/// Edge length used for a fit-content dimension before the content has been
/// measured.
pub const FIT_FALLBACK: i32 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

fn extent(raw: i32, screen: i32, measured: Option<i32>) -> i32 {
    match raw {
        MATCH_PARENT => screen,
        WRAP_CONTENT => measured.unwrap_or(FIT_FALLBACK).min(screen),
        px => px,
    }
}

pub fn resolve(attributes: &WindowAttributes, screen: Size, measured: Option<Size>) -> Frame {
    let width = extent(
        attributes.width,
        screen.width,
        measured.map(|size| size.width),
    );
    let height = extent(
        attributes.height,
        screen.height,
        measured.map(|size| size.height),
    );

    let x = match attributes.gravity.horizontal {
        HorizontalAnchor::Start => attributes.x,
        HorizontalAnchor::Center => ((screen.width - width) / 2).saturating_add(attributes.x),
        HorizontalAnchor::End => (screen.width - width).saturating_sub(attributes.x),
    };
    let y = match attributes.gravity.vertical {
        VerticalAnchor::Top => attributes.y,
        VerticalAnchor::Center => ((screen.height - height) / 2).saturating_add(attributes.y),
        VerticalAnchor::Bottom => (screen.height - height).saturating_sub(attributes.y),
    };

    Frame {
        x,
        y,
        width: width.max(1) as u32,
        height: height.max(1) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floatwin_core::{Alignment, Dimension, OverlayConfig, overlay::attributes};

    const SCREEN: Size = Size {
        width: 1000,
        height: 800,
    };

    fn frame(config: OverlayConfig) -> Frame {
        resolve(&attributes::build(&config), SCREEN, None)
    }

    fn sized(alignment: Alignment) -> OverlayConfig {
        OverlayConfig {
            alignment,
            ..OverlayConfig::sized(Dimension::Exact(100), Dimension::Exact(50))
        }
    }

    #[test]
    fn top_left_uses_offsets_directly() {
        let f = frame(sized(Alignment::TopLeft).at(30, 40));
        assert_eq!((f.x, f.y, f.width, f.height), (30, 40, 100, 50));
    }

    #[test]
    fn end_anchors_count_from_far_edges() {
        let f = frame(sized(Alignment::BottomRight).at(10, 20));
        assert_eq!((f.x, f.y), (890, 730));
    }

    #[test]
    fn center_shifts_from_middle() {
        let f = frame(sized(Alignment::Center).at(-10, 0));
        assert_eq!((f.x, f.y), (440, 375));
    }

    #[test]
    fn extreme_offsets_saturate() {
        let f = frame(sized(Alignment::BottomRight).at(i32::MIN, i32::MIN));
        assert_eq!((f.x, f.y), (i32::MAX, i32::MAX));
    }

    #[test]
    fn sentinels_resolve_against_screen_and_content() {
        let attrs = attributes::build(&OverlayConfig {
            alignment: Alignment::TopLeft,
            ..OverlayConfig::sized(Dimension::Fill, Dimension::Fit)
        });
        assert_eq!(resolve(&attrs, SCREEN, None).height, FIT_FALLBACK as u32);

        let f = resolve(&attrs, SCREEN, Some(Size::new(64, 72)));
        assert_eq!((f.width, f.height), (1000, 72));
    }
}
