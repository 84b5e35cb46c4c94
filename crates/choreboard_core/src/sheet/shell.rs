//! Modal overlay that hosts caller content on a draggable sheet.
//!
//! # Responsibility
//! - Own the content payload and the open/closing/hidden lifecycle.
//! - Route backdrop taps, gesture dismissals and explicit closes through one
//!   close path.
//!
//! # Invariants
//! - While hidden, `frame` returns `None` and no content is held.
//! - The close callback fires at most once per open cycle.
//! - Input is ignored unless the sheet is fully open (not closing).

use crate::config::SheetConfig;
use crate::sheet::animation::Tick;
use crate::sheet::engine::{DragStateChange, DragUpdate, SheetEngine, SnapDecision, SnapPoint};
use log::{debug, error, info};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What started a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Explicit,
    Backdrop,
    Gesture,
}

impl CloseReason {
    fn label(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Backdrop => "backdrop",
            Self::Gesture => "gesture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Hidden,
    Open,
    Closing,
}

/// Everything a renderer needs to draw one frame of the sheet.
#[derive(Debug, PartialEq)]
pub struct SheetFrame<'a, T> {
    /// Offset of the sheet top from the viewport top.
    pub sheet_offset: f64,
    pub backdrop_opacity: f64,
    /// Drawn height of the sheet body; equals the expanded open height.
    pub sheet_height: f64,
    pub snap_point: SnapPoint,
    /// The drag handle is shown only where pan gestures work.
    pub show_handle: bool,
    /// `false` while the close animation runs.
    pub interactive: bool,
    pub content: &'a T,
}

/// Overlay shell around `SheetEngine`.
pub struct BottomSheet<T> {
    engine: SheetEngine,
    phase: Phase,
    content: Option<T>,
    on_close: Option<Box<dyn FnMut()>>,
}

impl<T> BottomSheet<T> {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            engine: SheetEngine::new(config),
            phase: Phase::Hidden,
            content: None,
            on_close: None,
        }
    }

    /// Registers the callback invoked when the sheet starts closing.
    pub fn set_on_close(&mut self, callback: impl FnMut() + 'static) {
        self.on_close = Some(Box::new(callback));
    }

    pub fn engine(&self) -> &SheetEngine {
        &self.engine
    }

    /// `true` from `open` until the close animation has finished.
    pub fn is_visible(&self) -> bool {
        self.phase != Phase::Hidden
    }

    /// `true` while the sheet accepts input.
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// Shows `content` at the half snap point.
    ///
    /// Opening an already open sheet only swaps the content. Opening during the
    /// close animation reverses it from the current position.
    pub fn open(&mut self, content: T, now: Tick) {
        self.content = Some(content);
        if self.phase == Phase::Open {
            debug!("event=sheet_open module=sheet status=ok reason=content_replaced");
            return;
        }
        self.phase = Phase::Open;
        self.engine.open(now);
        info!("event=sheet_open module=sheet status=ok");
    }

    /// Closes the sheet. Returns `false` when it was not open.
    pub fn close(&mut self, now: Tick) -> bool {
        self.begin_close(CloseReason::Explicit, now)
    }

    /// Backdrop tap: same close path as `close`.
    pub fn backdrop_tap(&mut self, now: Tick) -> bool {
        self.begin_close(CloseReason::Backdrop, now)
    }

    /// Forwards a live drag update to the engine.
    pub fn on_drag(&mut self, event: Option<&DragUpdate>) {
        if self.phase != Phase::Open {
            return;
        }
        self.engine.drag_update(event);
    }

    /// Forwards a gesture phase change and closes on a dismiss decision.
    pub fn on_drag_state(&mut self, event: Option<&DragStateChange>, now: Tick) -> Option<SnapDecision> {
        if self.phase != Phase::Open {
            return None;
        }
        let decision = self.engine.handle_state_change(event, now);
        if decision == Some(SnapDecision::Dismiss) {
            self.begin_close(CloseReason::Gesture, now);
        }
        decision
    }

    /// Advances animations and unmounts content once closing completes.
    pub fn tick(&mut self, now: Tick) {
        self.engine.tick(now);
        if self.phase == Phase::Closing && !self.engine.is_animating() {
            self.phase = Phase::Hidden;
            self.content = None;
            info!("event=sheet_unmount module=sheet status=ok");
        }
    }

    /// Frame to draw at `now`, or `None` while hidden.
    pub fn frame(&self, now: Tick) -> Option<SheetFrame<'_, T>> {
        if self.phase == Phase::Hidden {
            return None;
        }
        let content = self.content.as_ref()?;
        Some(SheetFrame {
            sheet_offset: self.engine.sheet_offset(now),
            backdrop_opacity: self.engine.backdrop_opacity(now),
            sheet_height: self.engine.config().full_height(),
            snap_point: self.engine.snap_point(),
            show_handle: self.engine.gestures_enabled(),
            interactive: self.phase == Phase::Open,
            content,
        })
    }

    fn begin_close(&mut self, reason: CloseReason, now: Tick) -> bool {
        if self.phase != Phase::Open {
            debug!(
                "event=sheet_close module=sheet status=skip reason=not_open trigger={}",
                reason.label()
            );
            return false;
        }
        self.phase = Phase::Closing;
        self.engine.close(now);
        info!(
            "event=sheet_close module=sheet status=ok trigger={}",
            reason.label()
        );

        if let Some(callback) = self.on_close.as_deref_mut() {
            if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                error!("event=sheet_close_callback module=sheet status=error reason=callback_panicked");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::BottomSheet;
    use crate::config::SheetConfig;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn hidden_sheet_renders_nothing() {
        let sheet: BottomSheet<&str> = BottomSheet::new(SheetConfig::default());
        assert!(sheet.frame(0).is_none());
        assert!(!sheet.is_visible());
    }

    #[test]
    fn close_on_hidden_sheet_does_not_fire_callback() {
        let calls = Rc::new(Cell::new(0));
        let mut sheet: BottomSheet<&str> = BottomSheet::new(SheetConfig::default());
        let counter = Rc::clone(&calls);
        sheet.set_on_close(move || counter.set(counter.get() + 1));

        assert!(!sheet.close(0));
        assert!(!sheet.backdrop_tap(0));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn reopening_while_open_swaps_content_only() {
        let mut sheet = BottomSheet::new(SheetConfig::default());
        sheet.open("first", 0);
        sheet.tick(300);
        sheet.open("second", 400);
        let frame = sheet.frame(400).expect("open sheet renders");
        assert_eq!(*frame.content, "second");
        assert_eq!(frame.sheet_offset, 400.0);
    }
}
