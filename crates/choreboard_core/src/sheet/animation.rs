//! Timed value transitions for sheet position and backdrop opacity.
//!
//! Time is passed in explicitly as millisecond ticks, so callers decide
//! whether it comes from a frame clock or a test.
//!
//! # Invariants
//! - A value has at most one in-flight transition.
//! - Starting a new transition replaces the old one from the value sampled at
//!   that tick, so there is never a jump.

/// Monotonic animation time in milliseconds.
pub type Tick = u64;

/// Progress curve applied to a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Easing {
    Linear,
    /// Cubic ease-in-out.
    #[default]
    EaseInOut,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn apply(self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: f64,
    to: f64,
    start: Tick,
    duration_ms: u64,
    easing: Easing,
}

impl Transition {
    fn sample(&self, now: Tick) -> f64 {
        let elapsed = now.saturating_sub(self.start);
        if elapsed >= self.duration_ms {
            return self.to;
        }
        let progress = elapsed as f64 / self.duration_ms as f64;
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    fn is_finished(&self, now: Tick) -> bool {
        now.saturating_sub(self.start) >= self.duration_ms
    }
}

/// A scalar that is either at rest or moving toward a target.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedValue {
    value: f64,
    transition: Option<Transition>,
}

impl AnimatedValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            transition: None,
        }
    }

    /// Samples the value at `now` without advancing state.
    pub fn value_at(&self, now: Tick) -> f64 {
        match &self.transition {
            Some(transition) => transition.sample(now),
            None => self.value,
        }
    }

    /// Where the value will rest once any in-flight transition completes.
    pub fn target(&self) -> f64 {
        self.transition.map_or(self.value, |transition| transition.to)
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Jumps to `value`, cancelling any in-flight transition.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.transition = None;
    }

    /// Starts a transition to `to` beginning at `now`.
    ///
    /// A zero duration jumps immediately.
    pub fn animate_to(&mut self, to: f64, duration_ms: u64, easing: Easing, now: Tick) {
        let from = self.value_at(now);
        if duration_ms == 0 {
            self.set_value(to);
            return;
        }
        self.value = from;
        self.transition = Some(Transition {
            from,
            to,
            start: now,
            duration_ms,
            easing,
        });
    }

    /// Advances to `now`. Returns `true` when a transition finished on this tick.
    pub fn tick(&mut self, now: Tick) -> bool {
        let Some(transition) = self.transition else {
            return false;
        };
        self.value = transition.sample(now);
        if transition.is_finished(now) {
            self.transition = None;
            return true;
        }
        false
    }
}
