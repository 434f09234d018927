pub mod tone;
pub mod wav;

/// Upstream collaborator: anything that renders one emulated frame's worth
/// of interleaved signed 16-bit samples per tick.
///
/// Ticks must arrive in order; skipping or reordering them desynchronizes
/// the time base the delivery pipeline assumes.
pub trait FrameSource
where
    Self: Send,
{
    /// Fills `out` (`channels * chunk_size` interleaved samples) for the
    /// next frame.
    fn render_frame(&mut self, out: &mut [i16]);
}
