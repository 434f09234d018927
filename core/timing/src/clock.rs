use std::time::{Duration, Instant};

/// Paces a producer loop at a fixed emulated frame rate.
///
/// The emulation side is expected to render exactly one chunk of audio per
/// frame tick, so the clock hands out wall-clock deadlines spaced
/// `1 / frame_rate` apart. Missed deadlines are skipped forward rather than
/// accumulated, so a stalled producer catches up to "now" instead of
/// bursting a backlog of late frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_rate: f64,
    origin: Instant,
    frame_counter: u64,
}

impl FrameClock {
    /// `frame_rate` is in frames per second and must be positive.
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            origin: Instant::now(),
            frame_counter: 0,
        }
    }

    /// Restarts the deadline schedule from the current instant.
    pub fn start(&mut self) {
        self.origin = Instant::now();
        self.frame_counter = 0;
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Frames completed since the last `start`.
    pub fn current_frame(&self) -> u64 {
        self.frame_counter
    }

    /// Audio samples per channel that one frame tick is worth.
    pub fn samples_per_frame(&self, sample_rate: u32) -> usize {
        (f64::from(sample_rate) / self.frame_rate).round() as usize
    }

    fn deadline_for(&self, frame: u64) -> Instant {
        self.origin + Duration::from_secs_f64(frame as f64 / self.frame_rate)
    }

    /// Blocks until the next frame deadline and advances the frame counter.
    ///
    /// If the caller has fallen behind by one or more whole frames, the
    /// counter jumps past the missed deadlines and the number of skipped
    /// frames is returned without sleeping.
    pub fn sleep_until_next_frame(&mut self) -> u64 {
        self.frame_counter += 1;
        let deadline = self.deadline_for(self.frame_counter);
        let now = Instant::now();

        if let Some(wait) = deadline.checked_duration_since(now) {
            std::thread::sleep(wait);
            return 0;
        }

        let behind = now.duration_since(deadline);
        let skipped = (behind.as_secs_f64() * self.frame_rate) as u64;
        self.frame_counter += skipped;
        skipped
    }
}
