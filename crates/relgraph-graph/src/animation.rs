use crate::viewport::ViewTransform;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                let t = t * 2.0;
                if t <= 1.0 {
                    t * t * t / 2.0
                } else {
                    let t = t - 2.0;
                    (t * t * t + 2.0) / 2.0
                }
            }
        }
    }
}

/// Timed interpolation between two view transforms. Sampling is driven by
/// the caller's clock, so it runs independently of simulation ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    from: ViewTransform,
    to: ViewTransform,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl Transition {
    pub fn new(
        from: ViewTransform,
        to: ViewTransform,
        start: Instant,
        duration: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    pub fn target(&self) -> ViewTransform {
        self.to
    }

    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn sample(&self, now: Instant) -> ViewTransform {
        let t = self.progress(now);
        if t >= 1.0 {
            return self.to;
        }
        ViewTransform::interpolate(self.from, self.to, self.easing.apply(t))
    }
}
