use std::time::{Duration, Instant};

/// Length of one frame-rate sampling window.
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Frames counted in the sampling window that closed on this tick.
    /// `None` on every other tick.
    pub fps: Option<u32>,
}

/// Delta time plus a once-per-second frame rate.
///
/// Delta time is clamped so a stall (debugger, minimized window) does not
/// produce a huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,

    window_start: Instant,
    window_frames: u32,
    fps: Option<u32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            dt_min,
            dt_max,
            ..Self::new()
        }
    }

    pub(crate) fn starting_at(now: Instant) -> Self {
        Self {
            last: now,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
            window_start: now,
            window_frames: 0,
            fps: None,
        }
    }

    /// Resets the delta-time baseline and the frame-rate window.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last = now;
        self.window_start = now;
        self.window_frames = 0;
    }

    /// Frame rate of the last completed sampling window.
    #[inline]
    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    /// Advances the clock by one frame.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        self.window_frames += 1;
        let mut fps = None;
        if now.saturating_duration_since(self.window_start) >= FPS_WINDOW {
            fps = Some(self.window_frames);
            self.fps = fps;
            self.window_frames = 0;
            self.window_start += FPS_WINDOW;
            // Long stall: start over instead of reporting empty windows.
            if now.saturating_duration_since(self.window_start) >= FPS_WINDOW {
                self.window_start = now;
            }
        }

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
            fps,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
