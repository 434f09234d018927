/// Fixed-capacity planar circular buffer shared between the push and pull
/// sides of the delivery pipeline.
///
/// `remaining` is the single source of truth for how much unread audio is
/// queued. The raw distance between `write_index` and `read_index` is
/// ambiguous once both positions have lapped the buffer, so it is never used
/// for overrun/underrun decisions.
#[derive(Debug)]
pub struct ChannelRing {
    planes: Vec<Vec<f32>>,
    capacity: usize,
    write_index: usize,
    read_index: usize,
    remaining: usize,
}

impl ChannelRing {
    /// Callers must size `capacity` strictly larger than the largest write
    /// they intend to make; `DeliveryConfig` enforces this.
    pub fn new(channels: usize, capacity: usize) -> Self {
        Self {
            planes: vec![vec![0.0; capacity]; channels],
            capacity,
            write_index: 0,
            read_index: 0,
            remaining: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Unread samples per channel currently queued.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Copies one chunk per channel in at the write position, splitting the
    /// copy across the wrap boundary when needed.
    ///
    /// If the chunk does not fit, the oldest unread samples are dropped to
    /// make room; the number dropped (per channel) is returned so the caller
    /// can account for the overrun.
    pub fn write_chunk(&mut self, chunk: &[Vec<f32>]) -> usize {
        let len = chunk[0].len();

        let dropped = (self.remaining + len).saturating_sub(self.capacity);
        if dropped > 0 {
            self.read_index = (self.read_index + dropped) % self.capacity;
            self.remaining -= dropped;
        }

        for (plane, src) in self.planes.iter_mut().zip(chunk) {
            copy_in(plane, self.write_index, src);
        }
        self.write_index = (self.write_index + len) % self.capacity;
        self.remaining += len;
        dropped
    }

    /// Copies one block per channel out at the read position, splitting the
    /// copy across the wrap boundary when needed.
    ///
    /// The caller must have checked `remaining` first; reading past the
    /// unread region is a contract violation on the pull side.
    pub fn read_block(&mut self, out: &mut [Vec<f32>]) {
        let len = out[0].len();
        debug_assert!(len <= self.remaining);

        for (plane, dst) in self.planes.iter().zip(out.iter_mut()) {
            copy_out(plane, self.read_index, dst);
        }
        self.read_index = (self.read_index + len) % self.capacity;
        self.remaining -= len;
    }
}

fn copy_in(plane: &mut [f32], write_index: usize, src: &[f32]) {
    let first = src.len().min(plane.len() - write_index);
    plane[write_index..write_index + first].copy_from_slice(&src[..first]);
    plane[..src.len() - first].copy_from_slice(&src[first..]);
}

fn copy_out(plane: &[f32], read_index: usize, dst: &mut [f32]) {
    let len = dst.len();
    let first = len.min(plane.len() - read_index);
    dst[..first].copy_from_slice(&plane[read_index..read_index + first]);
    dst[first..].copy_from_slice(&plane[..len - first]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_of(channels: usize, samples: &[f32]) -> Vec<Vec<f32>> {
        vec![samples.to_vec(); channels]
    }

    fn ramp(start: f32, len: usize) -> Vec<f32> {
        (0..len).map(|i| start + i as f32).collect()
    }

    fn read(ring: &mut ChannelRing, channels: usize, len: usize) -> Vec<Vec<f32>> {
        let mut out = vec![vec![0.0; len]; channels];
        ring.read_block(&mut out);
        out
    }

    #[test]
    fn test_write_then_read_round_trips_in_order() {
        let mut ring = ChannelRing::new(2, 16);
        ring.write_chunk(&chunk_of(2, &ramp(1.0, 8)));

        let out = read(&mut ring, 2, 8);
        assert_eq!(out[0], ramp(1.0, 8));
        assert_eq!(out[1], ramp(1.0, 8));
        assert_eq!(ring.remaining(), 0);
    }

    #[test]
    fn test_round_trip_across_wrap_boundary() {
        // Capacity 8: advance positions to 6, then write a 5-sample chunk so
        // the copy splits into [6, 8) and [0, 3).
        let mut ring = ChannelRing::new(1, 8);
        ring.write_chunk(&chunk_of(1, &ramp(0.0, 6)));
        read(&mut ring, 1, 6);

        ring.write_chunk(&chunk_of(1, &ramp(100.0, 5)));
        assert_eq!(ring.remaining(), 5);

        let out = read(&mut ring, 1, 5);
        assert_eq!(out[0], ramp(100.0, 5));
    }

    #[test]
    fn test_reads_split_across_wrap_boundary() {
        let mut ring = ChannelRing::new(1, 8);
        ring.write_chunk(&chunk_of(1, &ramp(0.0, 5)));
        read(&mut ring, 1, 5);

        ring.write_chunk(&chunk_of(1, &ramp(10.0, 6)));
        let first = read(&mut ring, 1, 3);
        let second = read(&mut ring, 1, 3);
        assert_eq!(first[0], ramp(10.0, 3));
        assert_eq!(second[0], ramp(13.0, 3));
    }

    #[test]
    fn test_remaining_never_exceeds_capacity() {
        let mut ring = ChannelRing::new(2, 16);
        for i in 0..10 {
            ring.write_chunk(&chunk_of(2, &ramp(i as f32 * 8.0, 8)));
            assert!(ring.remaining() <= ring.capacity());
        }
    }

    #[test]
    fn test_overflowing_write_drops_oldest_samples() {
        let mut ring = ChannelRing::new(1, 8);
        ring.write_chunk(&chunk_of(1, &ramp(0.0, 6)));

        // Only 2 free: 4 oldest samples must be dropped to fit.
        let dropped = ring.write_chunk(&chunk_of(1, &ramp(6.0, 6)));
        assert_eq!(dropped, 4);
        assert_eq!(ring.remaining(), 8);

        // The survivors are the newest 8 samples of the 12 written.
        let out = read(&mut ring, 1, 8);
        assert_eq!(out[0], ramp(4.0, 8));
    }

    #[test]
    fn test_channels_stay_independent() {
        let mut ring = ChannelRing::new(2, 8);
        let chunk = vec![ramp(0.0, 4), ramp(50.0, 4)];
        ring.write_chunk(&chunk);

        let out = read(&mut ring, 2, 4);
        assert_eq!(out[0], ramp(0.0, 4));
        assert_eq!(out[1], ramp(50.0, 4));
    }
}
