use std::{io::Read, path::Path};

use hound::WavReader;

use crate::source::FrameSource;

/// In-memory stereo PCM buffer decoded from a `.wav` file, replayed one
/// interleaved `i16` frame chunk at a time.
///
/// Supports mono (duplicated into both channels) and stereo files with
/// 16-bit integer or 32-bit float samples. Once the buffer is exhausted the
/// source renders silence, like an emulator with its sound channels off.
#[derive(Debug)]
pub struct WavSource {
    /// Interleaved stereo frames.
    frames: Vec<(i16, i16)>,
    /// Current read position (frame index).
    position: usize,
}

impl WavSource {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let reader =
            WavReader::open(path).map_err(|e| format!("Failed to open WAV file: {e}"))?;
        Self::from_reader(reader)
    }

    pub fn from_stream<R: Read>(stream: R) -> Result<Self, String> {
        let reader =
            WavReader::new(stream).map_err(|e| format!("Failed to parse WAV stream: {e}"))?;
        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(reader: WavReader<R>) -> Result<Self, String> {
        let spec = reader.spec();
        let channels = spec.channels;
        if channels == 0 || channels > 2 {
            return Err("Only mono or stereo WAVs are supported".into());
        }

        let raw_samples = match spec.sample_format {
            hound::SampleFormat::Int => reader
                .into_samples::<i16>()
                .filter_map(Result::ok)
                .collect::<Vec<i16>>(),
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .filter_map(Result::ok)
                .map(|s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
                .collect::<Vec<i16>>(),
        };

        Ok(Self {
            frames: Self::stereo_frames(raw_samples, channels as usize),
            position: 0,
        })
    }

    /// Mono is duplicated into both channels.
    fn stereo_frames(samples: Vec<i16>, channels: usize) -> Vec<(i16, i16)> {
        match channels {
            1 => samples.into_iter().map(|s| (s, s)).collect(),
            2 => samples
                .chunks_exact(2)
                .map(|frame| (frame[0], frame[1]))
                .collect(),
            _ => unreachable!("Unsupported channel count"),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.frames.len()
    }
}

impl FrameSource for WavSource {
    fn render_frame(&mut self, out: &mut [i16]) {
        out.fill(0);
        let requested = out.len() / 2;
        let end = (self.position + requested).min(self.frames.len());

        for (slot, &(left, right)) in out
            .chunks_exact_mut(2)
            .zip(&self.frames[self.position..end])
        {
            slot[0] = left;
            slot[1] = right;
        }
        self.position = end;
    }
}
