//! Drag-to-resize state machine for the bottom sheet.
//!
//! # Responsibility
//! - Track the settled snap point, the animated base offset and the live
//!   drag offset.
//! - Clamp drags between fully expanded and fully closed.
//! - Resolve a snap decision from release position and velocity.
//!
//! # Invariants
//! - Rendered offset is always `base_position + gesture_offset`.
//! - `gesture_offset` is reset to 0 whenever a drag ends.
//! - Malformed events never change state and never panic; they are logged
//!   and dropped.
//!
//! Offsets are measured from the top of the viewport: `viewport_height` is
//! fully closed and `viewport_height - open_height` is an open snap point.

use crate::config::SheetConfig;
use crate::sheet::animation::{AnimatedValue, Easing, Tick};
use log::{debug, warn};

/// Allowed resting heights of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapPoint {
    Half,
    Full,
    /// Transient: resolving to it dismisses the sheet.
    Closed,
}

impl SnapPoint {
    /// Visible height of the sheet when resting at this point.
    pub fn open_height(self, config: &SheetConfig) -> f64 {
        match self {
            Self::Half => config.half_height(),
            Self::Full => config.full_height(),
            Self::Closed => 0.0,
        }
    }

    /// Vertical offset of the sheet top when resting at this point.
    pub fn offset(self, config: &SheetConfig) -> f64 {
        config.viewport_height - self.open_height(config)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Half => "half",
            Self::Full => "full",
            Self::Closed => "closed",
        }
    }
}

/// Pan gesture phase reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Began,
    Active,
    End,
}

/// Continuous pan update while a drag is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragUpdate {
    /// Vertical translation since the drag began; positive is downward.
    pub translation_y: f64,
}

/// Gesture phase change. Fields are optional because platforms may omit them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragStateChange {
    pub state: Option<DragState>,
    pub translation_y: Option<f64>,
    /// Release velocity in px/s; positive is downward.
    pub velocity_y: Option<f64>,
}

impl DragStateChange {
    pub fn began() -> Self {
        Self {
            state: Some(DragState::Began),
            ..Self::default()
        }
    }

    pub fn end(translation_y: f64, velocity_y: f64) -> Self {
        Self {
            state: Some(DragState::End),
            translation_y: Some(translation_y),
            velocity_y: Some(velocity_y),
        }
    }
}

/// Outcome of a released drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapDecision {
    /// The sheet animates to an open snap point.
    Settle(SnapPoint),
    /// The sheet should be dismissed; the caller runs its close path.
    Dismiss,
}

/// Sheet position state machine.
#[derive(Debug, Clone)]
pub struct SheetEngine {
    config: SheetConfig,
    snap_point: SnapPoint,
    base_position: AnimatedValue,
    backdrop_opacity: AnimatedValue,
    gesture_offset: f64,
}

impl SheetEngine {
    /// Creates a closed engine.
    ///
    /// Invalid fields of `config` are logged and reset to their defaults;
    /// `gestures_enabled` is always taken as given.
    pub fn new(config: SheetConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!("event=sheet_config module=sheet status=skip reason=invalid_config error={err}");
                config.sanitized()
            }
        };
        let closed = config.viewport_height;
        Self {
            config,
            snap_point: SnapPoint::Closed,
            base_position: AnimatedValue::new(closed),
            backdrop_opacity: AnimatedValue::new(0.0),
            gesture_offset: 0.0,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn snap_point(&self) -> SnapPoint {
        self.snap_point
    }

    pub fn gesture_offset(&self) -> f64 {
        self.gesture_offset
    }

    pub fn gestures_enabled(&self) -> bool {
        self.config.gestures_enabled
    }

    pub fn base_position(&self, now: Tick) -> f64 {
        self.base_position.value_at(now)
    }

    /// Offset the sheet is drawn at: settled base plus live drag delta.
    pub fn sheet_offset(&self, now: Tick) -> f64 {
        self.base_position.value_at(now) + self.gesture_offset
    }

    pub fn backdrop_opacity(&self, now: Tick) -> f64 {
        self.backdrop_opacity.value_at(now)
    }

    pub fn is_animating(&self) -> bool {
        self.base_position.is_animating() || self.backdrop_opacity.is_animating()
    }

    /// Slides the sheet up to `Half` and fades the backdrop in.
    pub fn open(&mut self, now: Tick) {
        self.snap_point = SnapPoint::Half;
        self.gesture_offset = 0.0;
        let duration = self.config.open_duration_ms;
        self.base_position.animate_to(
            SnapPoint::Half.offset(&self.config),
            duration,
            Easing::EaseInOut,
            now,
        );
        self.backdrop_opacity.animate_to(
            self.config.backdrop_opacity,
            duration,
            Easing::EaseInOut,
            now,
        );
    }

    /// Slides the sheet below the viewport and fades the backdrop out.
    pub fn close(&mut self, now: Tick) {
        self.snap_point = SnapPoint::Closed;
        self.gesture_offset = 0.0;
        let duration = self.config.close_duration_ms;
        self.base_position
            .animate_to(self.config.viewport_height, duration, Easing::EaseInOut, now);
        self.backdrop_opacity
            .animate_to(0.0, duration, Easing::EaseInOut, now);
    }

    /// Settles on an open snap point. `Closed` is routed to `close`.
    pub fn snap_to(&mut self, point: SnapPoint, now: Tick) {
        if point == SnapPoint::Closed {
            self.close(now);
            return;
        }
        self.snap_point = point;
        self.gesture_offset = 0.0;
        self.base_position.animate_to(
            point.offset(&self.config),
            self.config.open_duration_ms,
            Easing::EaseInOut,
            now,
        );
    }

    /// Advances animations. Returns `true` when the last running one finished.
    pub fn tick(&mut self, now: Tick) -> bool {
        let was_animating = self.is_animating();
        self.base_position.tick(now);
        self.backdrop_opacity.tick(now);
        was_animating && !self.is_animating()
    }

    /// Applies a live drag update.
    ///
    /// Missing payloads and non-finite translations are dropped.
    pub fn drag_update(&mut self, event: Option<&DragUpdate>) {
        if !self.config.gestures_enabled {
            return;
        }
        let Some(event) = event else {
            warn!("event=sheet_drag module=sheet status=skip reason=missing_payload");
            return;
        };
        if !event.translation_y.is_finite() {
            warn!("event=sheet_drag module=sheet status=skip reason=invalid_translation");
            return;
        }
        if self.snap_point == SnapPoint::Closed {
            debug!("event=sheet_drag module=sheet status=skip reason=sheet_closed");
            return;
        }

        let settled = self.snap_point.offset(&self.config);
        self.gesture_offset = self.clamp_position(event.translation_y) - settled;
    }

    /// Handles a gesture phase change.
    ///
    /// Returns the snap decision on `End`, `None` otherwise. Missing or
    /// non-finite translation/velocity on `End` count as 0.
    pub fn handle_state_change(
        &mut self,
        event: Option<&DragStateChange>,
        now: Tick,
    ) -> Option<SnapDecision> {
        if !self.config.gestures_enabled {
            return None;
        }
        let Some(event) = event else {
            warn!("event=sheet_drag_state module=sheet status=skip reason=missing_payload");
            return None;
        };
        let Some(state) = event.state else {
            warn!("event=sheet_drag_state module=sheet status=skip reason=missing_state");
            return None;
        };
        if self.snap_point == SnapPoint::Closed {
            debug!("event=sheet_drag_state module=sheet status=skip reason=sheet_closed");
            return None;
        }

        match state {
            DragState::Began => {
                debug!(
                    "event=sheet_drag_begin module=sheet status=ok snap={}",
                    self.snap_point.label()
                );
                None
            }
            DragState::Active => None,
            DragState::End => {
                let translation = finite_or_zero(event.translation_y);
                let velocity = finite_or_zero(event.velocity_y);
                let final_position = self.clamp_position(translation);
                let target = self.resolve_snap(final_position, velocity);

                // The drawn offset is unchanged by the release itself.
                let drawn = self.sheet_offset(now);
                self.base_position.set_value(drawn);
                self.gesture_offset = 0.0;
                debug!(
                    "event=sheet_release module=sheet status=ok position={final_position:.1} velocity={velocity:.1} target={}",
                    target.label()
                );

                if target == SnapPoint::Closed {
                    Some(SnapDecision::Dismiss)
                } else {
                    self.snap_to(target, now);
                    Some(SnapDecision::Settle(target))
                }
            }
        }
    }

    /// Clamps `settled offset + translation` to `[viewport - full, viewport]`.
    pub fn clamp_position(&self, translation_y: f64) -> f64 {
        let min = SnapPoint::Full.offset(&self.config);
        let max = self.config.viewport_height;
        (self.snap_point.offset(&self.config) + translation_y)
            .max(min)
            .min(max)
    }

    /// Picks the snap target for a release at `final_position`.
    ///
    /// Fast flings win over position. Otherwise a release below half of the
    /// half height dismisses, and anything else snaps to the nearer of
    /// `Half`/`Full`, with ties going to `Half`.
    pub fn resolve_snap(&self, final_position: f64, velocity_y: f64) -> SnapPoint {
        if velocity_y > self.config.fling_velocity {
            return SnapPoint::Closed;
        }
        if velocity_y < -self.config.fling_velocity {
            return SnapPoint::Full;
        }

        let open_height = self.config.viewport_height - final_position;
        if open_height < self.config.half_height() * self.config.dismiss_ratio {
            return SnapPoint::Closed;
        }

        let half_distance = (open_height - self.config.half_height()).abs();
        let full_distance = (open_height - self.config.full_height()).abs();
        if full_distance < half_distance {
            SnapPoint::Full
        } else {
            SnapPoint::Half
        }
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::{finite_or_zero, DragStateChange, SheetEngine, SnapPoint};
    use crate::config::SheetConfig;

    fn open_engine() -> SheetEngine {
        let mut engine = SheetEngine::new(SheetConfig::for_viewport(1_000.0));
        engine.open(0);
        engine
    }

    #[test]
    fn snap_offsets_follow_viewport() {
        let config = SheetConfig::for_viewport(1_000.0);
        assert_eq!(SnapPoint::Half.offset(&config), 500.0);
        assert_eq!(SnapPoint::Full.offset(&config), 200.0);
        assert_eq!(SnapPoint::Closed.offset(&config), 1_000.0);
    }

    #[test]
    fn clamp_position_stays_inside_bounds() {
        let engine = open_engine();
        assert_eq!(engine.clamp_position(-900.0), 200.0);
        assert_eq!(engine.clamp_position(900.0), 1_000.0);
        assert_eq!(engine.clamp_position(-100.0), 400.0);
    }

    #[test]
    fn resolve_snap_covers_thresholds() {
        let engine = open_engine();
        // open height 240 < 250: dismiss
        assert_eq!(engine.resolve_snap(760.0, 0.0), SnapPoint::Closed);
        // open height exactly 250 is not below the threshold
        assert_eq!(engine.resolve_snap(750.0, 0.0), SnapPoint::Half);
        // open height 650 is equidistant from 500 and 800
        assert_eq!(engine.resolve_snap(350.0, 0.0), SnapPoint::Half);
        assert_eq!(engine.resolve_snap(340.0, 0.0), SnapPoint::Full);
        // velocity exactly at the threshold is not a fling
        assert_eq!(engine.resolve_snap(500.0, 1_000.0), SnapPoint::Half);
    }

    #[test]
    fn invalid_geometry_falls_back_but_keeps_gesture_flag() {
        let mut config = SheetConfig::for_viewport(f64::NAN);
        config.gestures_enabled = false;
        config.close_duration_ms = 180;
        let engine = SheetEngine::new(config);
        assert_eq!(engine.config().viewport_height, 800.0);
        assert_eq!(engine.config().close_duration_ms, 180);
        assert!(!engine.gestures_enabled());
    }

    #[test]
    fn unmeasured_viewport_with_gestures_off_ignores_flings() {
        let mut config = SheetConfig::for_viewport(0.0);
        config.gestures_enabled = false;
        let mut engine = SheetEngine::new(config);
        engine.open(0);
        engine.tick(300);

        let decision = engine.handle_state_change(Some(&DragStateChange::end(0.0, 5_000.0)), 400);
        assert_eq!(decision, None);
        assert_eq!(engine.snap_point(), SnapPoint::Half);
    }

    #[test]
    fn finite_or_zero_replaces_missing_and_nan() {
        assert_eq!(finite_or_zero(None), 0.0);
        assert_eq!(finite_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(finite_or_zero(Some(f64::INFINITY)), 0.0);
        assert_eq!(finite_or_zero(Some(-12.5)), -12.5);
    }
}
