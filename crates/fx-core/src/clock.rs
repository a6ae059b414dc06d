use crate::constants::MAX_FRAME_DT;
use instant::Instant;

/// Snapshot of the clock taken once per frame and handed to every simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock was created.
    pub elapsed: f32,
    /// Seconds since the previous frame, clamped to `[0, MAX_FRAME_DT]`.
    pub delta: f32,
    /// Number of completed ticks.
    pub frame: u64,
}

impl FrameTime {
    /// The snapshot one step of `dt` later. Used when a teardown is
    /// fast-forwarded outside the display loop.
    pub fn advanced(self, dt: f32) -> Self {
        Self {
            elapsed: self.elapsed + dt,
            delta: dt,
            frame: self.frame + 1,
        }
    }
}

/// Process-wide monotonic time source sampled once per frame.
#[derive(Debug)]
pub struct FrameClock {
    now: FrameTime,
    last_instant: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            now: FrameTime::default(),
            last_instant: None,
        }
    }

    /// Advance by an explicit step.
    pub fn tick(&mut self, dt: f32) -> FrameTime {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.now = self.now.advanced(dt);
        self.now
    }

    /// Advance by the wall-clock time since the previous call. The first call
    /// only primes the clock and reports a zero step.
    pub fn tick_now(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = match self.last_instant {
            Some(prev) => (now - prev).as_secs_f32(),
            None => 0.0,
        };
        self.last_instant = Some(now);
        self.tick(dt)
    }

    pub fn time(&self) -> FrameTime {
        self.now
    }
}
