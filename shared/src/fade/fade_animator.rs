use std::time::Duration;

/// Result of advancing a [`FadeAnimator`] by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FadeTick {
    /// The fade is still running; carries the alpha for this tick.
    Running(f32),
    /// The fade reached its end on this tick; carries exactly the end alpha.
    /// Reported once per fade.
    Completed(f32),
    /// The fade already completed or was cancelled; nothing to apply.
    Finished,
}

/// Linearly drives an opacity value from a start to an end over a fixed
/// duration.
///
/// The animator does not own a clock. The host advances it with the elapsed
/// time of each frame, so a fade is sampled exactly once per tick.
#[derive(Clone, Debug)]
pub struct FadeAnimator {
    start_alpha: f32,
    end_alpha: f32,
    duration: Duration,
    elapsed: Duration,
    alpha: f32,
    finished: bool,
}

impl FadeAnimator {
    /// Alphas outside `0.0..=1.0` are clamped.
    pub fn new(start_alpha: f32, end_alpha: f32, duration: Duration) -> Self {
        let start_alpha = start_alpha.clamp(0.0, 1.0);
        Self {
            start_alpha,
            end_alpha: end_alpha.clamp(0.0, 1.0),
            duration,
            elapsed: Duration::ZERO,
            alpha: start_alpha,
            finished: false,
        }
    }

    /// Samples the fade at its starting instant.
    ///
    /// A zero-length fade completes right here, in the same step it was
    /// started in.
    pub fn start(&mut self) -> FadeTick {
        self.tick(Duration::ZERO)
    }

    /// Advances the fade by `delta`.
    pub fn tick(&mut self, delta: Duration) -> FadeTick {
        if self.finished {
            return FadeTick::Finished;
        }

        self.elapsed = self.elapsed.saturating_add(delta);

        if self.duration.is_zero() || self.elapsed >= self.duration {
            self.alpha = self.end_alpha;
            self.finished = true;
            return FadeTick::Completed(self.end_alpha);
        }

        let t = (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        self.alpha = lerp(self.start_alpha, self.end_alpha, t);
        FadeTick::Running(self.alpha)
    }

    /// Stops the fade where it is. The alpha already applied stays applied
    /// and completion is never reported.
    pub fn cancel(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The most recently sampled alpha.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn end_alpha(&self) -> f32 {
        self.end_alpha
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
