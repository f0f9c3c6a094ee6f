//! Camera focus and unfocus around the detail panel.
//!
//! Focusing eases the camera onto a point while reserving the panel's strip
//! of the viewport as padding, so the point stays centered in the part of
//! the map the panel leaves visible.

use crate::selection::PanelSide;
use eventmap_core::engine::{EaseOptions, MapContext};
use eventmap_core::types::{GeoPoint, Padding, ScreenPoint};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Camera parameters for focus transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraCoordinator {
    /// Margin kept on every edge while focused
    pub margin: f64,
    /// Zoom floor when focusing; focus never zooms out
    pub min_focus_zoom: f64,
    pub focus_duration: Duration,
    pub unfocus_duration: Duration,
}

impl Default for CameraCoordinator {
    fn default() -> Self {
        Self {
            margin: 24.0,
            min_focus_zoom: 10.0,
            focus_duration: Duration::from_millis(400),
            unfocus_duration: Duration::from_millis(300),
        }
    }
}

/// The transition issued by [`CameraCoordinator::focus_on`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusOutcome {
    pub panel_side: PanelSide,
    pub ease: EaseOptions,
}

impl CameraCoordinator {
    /// Computes the focus transition from the point's current screen position.
    ///
    /// The panel opens on the side away from the point. Its width plus the
    /// margin is added as padding on that side, and a horizontal offset of a
    /// quarter panel width shifts the point away from the panel.
    pub fn plan_focus(
        &self,
        point: GeoPoint,
        projected: ScreenPoint,
        viewport_width: f64,
        current_zoom: f64,
        panel_width: f64,
    ) -> FocusOutcome {
        let panel_side = if projected.x < viewport_width / 2.0 {
            PanelSide::Right
        } else {
            PanelSide::Left
        };

        let mut padding = Padding::uniform(self.margin);
        let offset_x = match panel_side {
            PanelSide::Right => {
                padding.right = panel_width + self.margin;
                -panel_width / 4.0
            }
            PanelSide::Left => {
                padding.left = panel_width + self.margin;
                panel_width / 4.0
            }
        };

        FocusOutcome {
            panel_side,
            ease: EaseOptions {
                center: Some(point),
                zoom: Some(current_zoom.max(self.min_focus_zoom)),
                padding: Some(padding),
                offset: Some(ScreenPoint::new(offset_x, 0.0)),
                duration: self.focus_duration,
            },
        }
    }

    /// Eases the camera onto `point` for a panel of `panel_width` pixels.
    /// Returns `None` and does nothing before the map is ready.
    pub fn focus_on(
        &self,
        ctx: &MapContext,
        point: GeoPoint,
        panel_width: f64,
    ) -> Option<FocusOutcome> {
        ctx.with(|engine| {
            let outcome = self.plan_focus(
                point,
                engine.project(point),
                engine.viewport_size().width,
                engine.zoom(),
                panel_width,
            );
            debug!(
                %point,
                side = %outcome.panel_side,
                zoom = ?outcome.ease.zoom,
                "Focusing camera"
            );
            engine.ease_to(outcome.ease.clone());
            outcome
        })
    }

    /// Clears padding and offset, leaving center and zoom untouched.
    pub fn unfocus(&self, ctx: &MapContext) -> Option<EaseOptions> {
        let ease = EaseOptions {
            center: None,
            zoom: None,
            padding: Some(Padding::ZERO),
            offset: Some(ScreenPoint::default()),
            duration: self.unfocus_duration,
        };
        ctx.with(|engine| {
            debug!("Unfocusing camera");
            engine.ease_to(ease.clone());
            ease
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventmap_core::headless::HeadlessMap;
    use eventmap_core::types::ScreenSize;

    fn mounted(zoom: f64) -> (MapContext, HeadlessMap) {
        let map = HeadlessMap::with_view(ScreenSize::new(1200.0, 800.0), GeoPoint::ORIGIN, zoom);
        let ctx = MapContext::new();
        ctx.attach(Box::new(map.clone()));
        (ctx, map)
    }

    #[test]
    fn test_point_left_of_center_opens_right_panel() {
        let camera = CameraCoordinator::default();
        let outcome = camera.plan_focus(
            GeoPoint::new(10.0, 10.0),
            ScreenPoint::new(300.0, 400.0),
            1200.0,
            4.0,
            400.0,
        );

        assert_eq!(outcome.panel_side, PanelSide::Right);
        let padding = outcome.ease.padding.unwrap();
        assert_eq!(padding.right, 424.0);
        assert_eq!(padding.left, 24.0);
        assert_eq!(padding.top, 24.0);
        assert_eq!(padding.bottom, 24.0);
        assert_eq!(outcome.ease.offset, Some(ScreenPoint::new(-100.0, 0.0)));
        assert_eq!(outcome.ease.zoom, Some(10.0));
        assert_eq!(outcome.ease.duration, Duration::from_millis(400));
    }

    #[test]
    fn test_point_right_of_center_opens_left_panel() {
        let camera = CameraCoordinator::default();
        let outcome = camera.plan_focus(
            GeoPoint::ORIGIN,
            ScreenPoint::new(600.0, 10.0),
            1200.0,
            12.5,
            320.0,
        );

        assert_eq!(outcome.panel_side, PanelSide::Left);
        let padding = outcome.ease.padding.unwrap();
        assert_eq!(padding.left, 344.0);
        assert_eq!(padding.right, 24.0);
        assert_eq!(outcome.ease.offset, Some(ScreenPoint::new(80.0, 0.0)));
        // never zooms out
        assert_eq!(outcome.ease.zoom, Some(12.5));
    }

    #[test]
    fn test_focus_on_issues_ease() {
        let (ctx, map) = mounted(3.0);
        let camera = CameraCoordinator::default();

        // west of the centered origin projects left of the middle
        let target = GeoPoint::new(-20.0, 5.0);
        let outcome = camera.focus_on(&ctx, target, 400.0).unwrap();
        assert_eq!(outcome.panel_side, PanelSide::Right);

        let viewport = map.viewport();
        assert_eq!(viewport.center, target);
        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.padding.right, 424.0);
        assert_eq!(viewport.pixel_offset, ScreenPoint::new(-100.0, 0.0));
    }

    #[test]
    fn test_unfocus_resets_padding_and_offset() {
        let (ctx, map) = mounted(3.0);
        let camera = CameraCoordinator::default();
        camera.focus_on(&ctx, GeoPoint::new(40.0, 0.0), 400.0);
        let focused = map.viewport();

        let ease = camera.unfocus(&ctx).unwrap();
        assert_eq!(ease.duration, Duration::from_millis(300));

        let viewport = map.viewport();
        assert_eq!(viewport.padding, Padding::ZERO);
        assert_eq!(viewport.pixel_offset, ScreenPoint::default());
        assert_eq!(viewport.center, focused.center);
        assert_eq!(viewport.zoom, focused.zoom);
    }

    #[test]
    fn test_noop_before_ready() {
        let ctx = MapContext::new();
        let camera = CameraCoordinator::default();
        assert!(camera.focus_on(&ctx, GeoPoint::ORIGIN, 400.0).is_none());
        assert!(camera.unfocus(&ctx).is_none());
    }
}
