use crate::source::FrameSource;

/// Square-wave source standing in for an emulator sound channel.
///
/// Emits the same value on every channel of an interleaved frame, switching
/// between `+volume` and `-volume` according to the duty cycle.
#[derive(Debug, Clone, Copy)]
pub struct ToneSource {
    freq: f32,
    sample_rate: f32,
    channels: usize,
    wave_duty: f32,
    volume: i16,
    phase: f32,
}

impl ToneSource {
    pub fn new(freq: f32, sample_rate: f32) -> Self {
        Self {
            freq,
            sample_rate,
            channels: 2,
            wave_duty: 0.5,
            volume: 8_192,
            phase: 0.0,
        }
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_duty(mut self, wave_duty: f32) -> Self {
        self.wave_duty = wave_duty;
        self
    }

    pub fn with_volume(mut self, volume: i16) -> Self {
        self.volume = volume;
        self
    }
}

impl FrameSource for ToneSource {
    fn render_frame(&mut self, out: &mut [i16]) {
        let phase_increment = self.freq / self.sample_rate;

        for frame in out.chunks_mut(self.channels) {
            let value = if self.phase < self.wave_duty {
                self.volume
            } else {
                -self.volume
            };
            for sample in frame {
                *sample = value;
            }
            self.phase = (self.phase + phase_increment) % 1.0;
        }
    }
}
