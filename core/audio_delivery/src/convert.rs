use std::error::Error;
use std::fmt;

/// Scale between the producer's signed 16-bit samples and normalized floats.
const I16_SCALE: f32 = 32_768.0;

/// One emulated frame's worth of planar float samples.
///
/// Allocated once and reused across frames; the delivery pipeline copies out
/// of it during push and never retains it.
#[derive(Debug, Clone)]
pub struct PlanarChunk {
    planes: Vec<Vec<f32>>,
}

impl PlanarChunk {
    pub fn new(channels: usize, chunk_size: usize) -> Self {
        Self {
            planes: vec![vec![0.0; chunk_size]; channels],
        }
    }

    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    /// Samples per channel.
    pub fn chunk_size(&self) -> usize {
        self.planes.first().map_or(0, Vec::len)
    }

    pub fn planes(&self) -> &[Vec<f32>] {
        &self.planes
    }

    pub fn planes_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.planes
    }
}

/// Input to a conversion did not match the configured chunk shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} interleaved samples, got {}",
            self.expected, self.actual
        )
    }
}

impl Error for ShapeError {}

/// De-interleaves `[L0, R0, L1, R1, ...]` into `chunk`'s planar channels,
/// normalizing each sample to [-1.0, 1.0] via division by 32768.
///
/// Pure and stateless; kept separate from push so the buffering contract
/// stays purely about buffering.
pub fn deinterleave_into(interleaved: &[i16], chunk: &mut PlanarChunk) -> Result<(), ShapeError> {
    let channels = chunk.channel_count();
    let expected = channels * chunk.chunk_size();
    if interleaved.len() != expected {
        return Err(ShapeError {
            expected,
            actual: interleaved.len(),
        });
    }

    for (channel, plane) in chunk.planes.iter_mut().enumerate() {
        for (i, sample) in plane.iter_mut().enumerate() {
            *sample = f32::from(interleaved[i * channels + channel]) / I16_SCALE;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUDIO_SAMPLE_EPSILON;

    #[test]
    fn test_deinterleave_normalizes_and_splits_channels() {
        let interleaved = [16_384_i16, -16_384, 0, 32_767];
        let mut chunk = PlanarChunk::new(2, 2);
        deinterleave_into(&interleaved, &mut chunk).unwrap();

        let left = &chunk.planes()[0];
        let right = &chunk.planes()[1];
        assert!((left[0] - 0.5).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((left[1] - 0.0).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((right[0] + 0.5).abs() < AUDIO_SAMPLE_EPSILON);
        assert!((right[1] - 32_767.0 / 32_768.0).abs() < AUDIO_SAMPLE_EPSILON);
    }

    #[test]
    fn test_extremes_stay_within_unit_range() {
        let interleaved = [i16::MIN, i16::MAX];
        let mut chunk = PlanarChunk::new(2, 1);
        deinterleave_into(&interleaved, &mut chunk).unwrap();

        assert!((chunk.planes()[0][0] + 1.0).abs() < AUDIO_SAMPLE_EPSILON);
        assert!(chunk.planes()[1][0] < 1.0);
    }

    #[test]
    fn test_wrong_length_input_is_rejected() {
        let interleaved = [0_i16; 3];
        let mut chunk = PlanarChunk::new(2, 2);
        let err = deinterleave_into(&interleaved, &mut chunk).unwrap_err();
        assert_eq!(
            err,
            ShapeError {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_order_is_preserved_per_channel() {
        // L: 1, 2, 3  R: -1, -2, -3 (in i16 steps).
        let interleaved = [1_i16, -1, 2, -2, 3, -3];
        let mut chunk = PlanarChunk::new(2, 3);
        deinterleave_into(&interleaved, &mut chunk).unwrap();

        for i in 0..3 {
            let step = (i as f32 + 1.0) / I16_SCALE;
            assert!((chunk.planes()[0][i] - step).abs() < AUDIO_SAMPLE_EPSILON);
            assert!((chunk.planes()[1][i] + step).abs() < AUDIO_SAMPLE_EPSILON);
        }
    }
}
