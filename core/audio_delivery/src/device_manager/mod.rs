use std::error::Error;
use std::fmt;

use crate::delivery::BlockPuller;

pub mod cpal_dm;

#[derive(Clone, Debug)]
pub enum AudioDeviceError {
    DeviceNotFound,
    StreamBuildFailed(String),
    StreamStartFailed(String),
}

impl fmt::Display for AudioDeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotFound => write!(f, "no default output device"),
            Self::StreamBuildFailed(reason) => write!(f, "failed to build stream: {reason}"),
            Self::StreamStartFailed(reason) => write!(f, "failed to start stream: {reason}"),
        }
    }
}

impl Error for AudioDeviceError {}

/// Owns the downstream driver connection. The puller is moved into the
/// driver's callback, which must respond without blocking; on underrun or
/// pause the callback degrades to silence, never to an error.
pub trait AudioDeviceManager {
    fn start_output_stream(&mut self, puller: BlockPuller) -> Result<(), AudioDeviceError>;
}
