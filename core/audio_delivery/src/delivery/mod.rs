use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rtrb::RingBuffer;

use crate::constants::{
    DEFAULT_BLOCK_SIZE, DEFAULT_CAPACITY_MULTIPLIER, DEFAULT_CHUNK_SIZE, DEFAULT_DRIFT_FACTOR,
    STEREO_CHANNELS,
};
use crate::convert::PlanarChunk;
use crate::delivery::command::{
    PlaybackCommand, PlaybackCommandConsumer, PlaybackCommandProducer,
};
use crate::ring::ChannelRing;

pub mod command;

/// Pause/resume bursts beyond this depth are coalesced by dropping; the
/// newest queued command still decides the final state.
const COMMAND_QUEUE_CAPACITY: usize = 16;

/// Sizing and tuning knobs for the delivery pipeline.
///
/// `chunk_size` is what the producer pushes per emulated frame, `block_size`
/// what the driver pulls per callback. Capacity per channel is
/// `chunk_size * capacity_multiplier`.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryConfig {
    pub chunk_size: usize,
    pub block_size: usize,
    pub channels: usize,
    /// Backlog high-water mark, in blocks, past which pull skips ahead.
    pub drift_factor: usize,
    pub capacity_multiplier: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            channels: STEREO_CHANNELS,
            drift_factor: DEFAULT_DRIFT_FACTOR,
            capacity_multiplier: DEFAULT_CAPACITY_MULTIPLIER,
        }
    }
}

impl DeliveryConfig {
    /// Default configuration with the chunk size derived from the emulated
    /// frame pacing (one chunk per frame tick).
    pub fn for_frame_rate(sample_rate: u32, frame_rate: f64) -> Self {
        let clock = timing::clock::FrameClock::new(frame_rate);
        Self {
            chunk_size: clock.samples_per_frame(sample_rate),
            ..Self::default()
        }
    }

    /// Validates the configuration and builds the pipeline handles.
    ///
    /// Fails fast: a config that could starve or stall the driver callback
    /// is rejected here, never deferred to the first push or pull.
    pub fn build(self) -> Result<DeliveryPipeline, ConfigError> {
        if self.chunk_size == 0 || self.block_size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if self.chunk_size < self.block_size {
            // A single callback could consume more than one push supplies,
            // starving the driver right after the very first frame.
            return Err(ConfigError::ChunkSmallerThanBlock {
                chunk_size: self.chunk_size,
                block_size: self.block_size,
            });
        }
        if self.drift_factor == 0 {
            return Err(ConfigError::ZeroDriftFactor);
        }
        if self.capacity_multiplier < 2 {
            return Err(ConfigError::InsufficientCapacity {
                capacity_multiplier: self.capacity_multiplier,
            });
        }

        let capacity = self.chunk_size * self.capacity_multiplier;
        let shared = Arc::new(Shared {
            ring: Mutex::new(ChannelRing::new(self.channels, capacity)),
            underruns: AtomicU64::new(0),
            drift_skips: AtomicU64::new(0),
            dropped_samples: AtomicU64::new(0),
        });
        let (command_tx, command_rx) = RingBuffer::new(COMMAND_QUEUE_CAPACITY);

        log::debug!(
            "delivery pipeline built: chunk={} block={} channels={} capacity={capacity}",
            self.chunk_size,
            self.block_size,
            self.channels,
        );

        Ok(DeliveryPipeline {
            pusher: ChunkPusher {
                shared: Arc::clone(&shared),
                chunk_size: self.chunk_size,
                channels: self.channels,
            },
            puller: BlockPuller {
                shared: Arc::clone(&shared),
                block_size: self.block_size,
                channels: self.channels,
                drift_limit: self.block_size * self.drift_factor,
                running: true,
                commands: command_rx,
            },
            control: PlaybackControl {
                commands: command_tx,
            },
            diagnostics: Diagnostics { shared },
        })
    }
}

/// The three handles plus diagnostics, ready to be moved to their threads.
#[derive(Debug)]
pub struct DeliveryPipeline {
    pub pusher: ChunkPusher,
    pub puller: BlockPuller,
    pub control: PlaybackControl,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroSize,
    ZeroChannels,
    ZeroDriftFactor,
    ChunkSmallerThanBlock {
        chunk_size: usize,
        block_size: usize,
    },
    InsufficientCapacity {
        capacity_multiplier: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "chunk_size and block_size must be non-zero"),
            Self::ZeroChannels => write!(f, "at least one channel is required"),
            Self::ZeroDriftFactor => write!(f, "drift_factor must be at least 1"),
            Self::ChunkSmallerThanBlock {
                chunk_size,
                block_size,
            } => write!(
                f,
                "chunk_size ({chunk_size}) must be at least block_size ({block_size})"
            ),
            Self::InsufficientCapacity {
                capacity_multiplier,
            } => write!(
                f,
                "capacity_multiplier ({capacity_multiplier}) leaves no jitter margin; need at least 2"
            ),
        }
    }
}

impl Error for ConfigError {}

/// A push was shaped differently from what the pipeline was built for.
/// The failed call is an atomic no-op; the pipeline state is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    ChannelCountMismatch { expected: usize, actual: usize },
    ChunkSizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelCountMismatch { expected, actual } => {
                write!(f, "expected {expected} channels, got {actual}")
            }
            Self::ChunkSizeMismatch { expected, actual } => {
                write!(f, "expected {expected} samples per channel, got {actual}")
            }
        }
    }
}

impl Error for PushError {}

/// Outcome of a single pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStatus {
    /// The output block holds the next `block_size` samples per channel.
    Filled,
    /// Playback is paused; nothing was consumed and the read position is
    /// frozen exactly where it was.
    Paused,
    /// Not enough buffered audio for a full block; nothing was consumed and
    /// the caller must supply its own silence.
    Underrun,
}

struct Shared {
    ring: Mutex<ChannelRing>,
    underruns: AtomicU64,
    drift_skips: AtomicU64,
    dropped_samples: AtomicU64,
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("underruns", &self.underruns)
            .field("drift_skips", &self.drift_skips)
            .field("dropped_samples", &self.dropped_samples)
            .finish_non_exhaustive()
    }
}

/// Producer-side handle: exactly one exists, called once per emulated frame
/// tick from the frame loop.
#[derive(Debug)]
pub struct ChunkPusher {
    shared: Arc<Shared>,
    chunk_size: usize,
    channels: usize,
}

impl ChunkPusher {
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Copies the chunk into the ring and advances the write position.
    ///
    /// If the consumer has stalled and the chunk does not fit, the oldest
    /// queued samples are dropped to make room (bounded latency wins over
    /// completeness) and counted in the `dropped_samples` diagnostic.
    pub fn push(&mut self, chunk: &PlanarChunk) -> Result<(), PushError> {
        if chunk.channel_count() != self.channels {
            return Err(PushError::ChannelCountMismatch {
                expected: self.channels,
                actual: chunk.channel_count(),
            });
        }
        if chunk.chunk_size() != self.chunk_size {
            return Err(PushError::ChunkSizeMismatch {
                expected: self.chunk_size,
                actual: chunk.chunk_size(),
            });
        }

        let dropped = {
            let mut ring = self.shared.ring.lock().unwrap();
            ring.write_chunk(chunk.planes())
        };
        if dropped > 0 {
            self.shared
                .dropped_samples
                .fetch_add(dropped as u64, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Consumer-side handle: exactly one exists, called from the audio driver
/// callback. Never blocks on anything but the brief ring lock.
#[derive(Debug)]
pub struct BlockPuller {
    shared: Arc<Shared>,
    block_size: usize,
    channels: usize,
    drift_limit: usize,
    running: bool,
    commands: PlaybackCommandConsumer,
}

impl BlockPuller {
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Fills `out` (one plane per channel, each `block_size` long) with the
    /// next block of audio.
    ///
    /// On `Paused` and `Underrun`, `out` is left untouched and no state
    /// advances, so a later pull resumes from the exact same sample.
    pub fn pull(&mut self, out: &mut [Vec<f32>]) -> PullStatus {
        self.drain_commands();
        if !self.running {
            return PullStatus::Paused;
        }

        debug_assert_eq!(out.len(), self.channels);
        debug_assert!(out.iter().all(|plane| plane.len() == self.block_size));

        let mut ring = self.shared.ring.lock().unwrap();
        if ring.remaining() < self.block_size {
            drop(ring);
            self.shared.underruns.fetch_add(1, Ordering::Relaxed);
            return PullStatus::Underrun;
        }

        ring.read_block(out);

        // The producer has run ahead of schedule. Keep reading over the same
        // output (discarding the earlier block each time) until the backlog
        // is back under the high-water mark, trading a brief skip for
        // bounded latency.
        while ring.remaining() > self.drift_limit {
            ring.read_block(out);
            self.shared.drift_skips.fetch_add(1, Ordering::Relaxed);
        }

        PullStatus::Filled
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                PlaybackCommand::Pause => self.running = false,
                PlaybackCommand::Resume => self.running = true,
            }
        }
    }
}

/// Host-side playback switch: maps focus/blur style lifecycle signals onto
/// the pull side without touching buffered data.
#[derive(Debug)]
pub struct PlaybackControl {
    commands: PlaybackCommandProducer,
}

impl PlaybackControl {
    pub fn pause(&mut self) {
        self.send(PlaybackCommand::Pause);
    }

    pub fn resume(&mut self) {
        self.send(PlaybackCommand::Resume);
    }

    fn send(&mut self, command: PlaybackCommand) {
        if self.commands.push(command).is_err() {
            log::warn!("playback command queue full, dropped {command:?}");
        }
    }
}

/// Read-only counters observable from any thread.
///
/// Underrun and drift are expected, recoverable conditions; the counters
/// exist so the host can notice a persistently mis-paced producer.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    shared: Arc<Shared>,
}

impl Diagnostics {
    /// Pulls that found less than a full block queued.
    pub fn underruns(&self) -> u64 {
        self.shared.underruns.load(Ordering::Relaxed)
    }

    /// Blocks discarded by drift correction.
    pub fn drift_skips(&self) -> u64 {
        self.shared.drift_skips.load(Ordering::Relaxed)
    }

    /// Oldest samples (per channel) dropped by overflowing pushes.
    pub fn dropped_samples(&self) -> u64 {
        self.shared.dropped_samples.load(Ordering::Relaxed)
    }

    /// Unread samples per channel currently queued.
    pub fn queued(&self) -> usize {
        self.shared.ring.lock().unwrap().remaining()
    }
}
