use cpal::{
    OutputCallbackInfo, Sample as _,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};

use super::AudioDeviceManager;
use crate::delivery::{BlockPuller, PullStatus};
use crate::device_manager::AudioDeviceError;

/// Feeds the default cpal output device from a `BlockPuller`.
///
/// The device callback asks for whatever buffer size it negotiated, which is
/// rarely an exact multiple of the pipeline's block size, so the callback
/// keeps a cursor into the most recently pulled block and only pulls again
/// once that block is spent.
pub struct CpalAudioDeviceManager {
    stream: Option<cpal::Stream>,
}

impl CpalAudioDeviceManager {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn build_output_stream<T>(
        &self,
        device: &cpal::Device,
        config: cpal::SupportedStreamConfig,
        mut puller: BlockPuller,
    ) -> Result<cpal::Stream, AudioDeviceError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let error_cb = move |err| {
            log::error!("audio stream error: {err}");
        };

        let device_channels = config.channels() as usize;
        let block_size = puller.block_size();
        let source_channels = puller.channels();
        let mut scratch = vec![vec![0.0_f32; block_size]; source_channels];
        // Start spent so the first frame triggers a pull.
        let mut cursor = block_size;

        let data_cb = move |data: &mut [T], _: &OutputCallbackInfo| {
            for frame in data.chunks_mut(device_channels) {
                if cursor == block_size {
                    match puller.pull(&mut scratch) {
                        PullStatus::Filled => {}
                        PullStatus::Paused | PullStatus::Underrun => {
                            // One block of silence, then try again.
                            for plane in &mut scratch {
                                plane.fill(0.0);
                            }
                        }
                    }
                    cursor = 0;
                }
                for (channel, sample) in frame.iter_mut().enumerate() {
                    // Mono devices take the left channel; extra device
                    // channels mirror the last source channel.
                    let value = scratch[channel.min(source_channels - 1)][cursor];
                    *sample = value.to_sample::<T>();
                }
                cursor += 1;
            }
        };

        let stream = device
            .build_output_stream(&config.into(), data_cb, error_cb, None)
            .map_err(|e| AudioDeviceError::StreamBuildFailed(e.to_string()))?;

        Ok(stream)
    }
}

impl Default for CpalAudioDeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDeviceManager for CpalAudioDeviceManager {
    fn start_output_stream(&mut self, puller: BlockPuller) -> Result<(), AudioDeviceError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioDeviceError::DeviceNotFound)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioDeviceError::StreamBuildFailed(e.to_string()))?;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => self.build_output_stream::<f32>(&device, config, puller)?,
            cpal::SampleFormat::I16 => self.build_output_stream::<i16>(&device, config, puller)?,
            cpal::SampleFormat::U16 => self.build_output_stream::<u16>(&device, config, puller)?,
            format => {
                return Err(AudioDeviceError::StreamBuildFailed(format!(
                    "Unsupported sample format '{format}'"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| AudioDeviceError::StreamStartFailed(e.to_string()))?;

        log::debug!("audio output stream started");
        self.stream = Some(stream);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryConfig;

    #[test]
    fn test_starting_a_stream_does_not_panic() {
        // Headless machines have no output device; either way the call must
        // return instead of panicking.
        let result = std::panic::catch_unwind(|| {
            let pipeline = DeliveryConfig::default().build().unwrap();
            let mut manager = CpalAudioDeviceManager::new();
            manager.start_output_stream(pipeline.puller)
        });

        assert!(result.is_ok(), "Stream setup should not panic");
    }
}
