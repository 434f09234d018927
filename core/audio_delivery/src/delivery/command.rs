use rtrb::{Consumer, Producer};

/// Control messages sent from the host side into the pull callback.
///
/// The puller drains pending commands at the top of each pull, so a pause
/// takes effect on the next driver callback at the latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Freeze the read position; buffered audio is kept, not discarded.
    Pause,
    /// Continue from exactly where playback was frozen.
    Resume,
}

pub type PlaybackCommandProducer = Producer<PlaybackCommand>;
pub type PlaybackCommandConsumer = Consumer<PlaybackCommand>;
