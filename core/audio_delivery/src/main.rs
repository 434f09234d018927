use audio_delivery::{
    constants::{DEFAULT_FRAME_RATE, DEFAULT_SAMPLE_RATE, STEREO_CHANNELS},
    convert::{PlanarChunk, deinterleave_into},
    delivery::{DeliveryConfig, DeliveryPipeline},
    device_manager::{AudioDeviceManager as _, cpal_dm::CpalAudioDeviceManager},
    source::{FrameSource, tone::ToneSource, wav::WavSource},
};
use timing::clock::FrameClock;

/// Plays a WAV file (first argument) or a 440 Hz square wave through the
/// delivery pipeline, pacing pushes at the emulated frame rate while cpal
/// pulls at its own cadence.
fn main() {
    env_logger::init();

    let config = DeliveryConfig::for_frame_rate(DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_RATE);
    let chunk_size = config.chunk_size;
    let DeliveryPipeline {
        mut pusher,
        puller,
        control: _control,
        diagnostics,
    } = config.build().expect("default configuration is valid");

    let mut manager = CpalAudioDeviceManager::new();
    match manager.start_output_stream(puller) {
        Ok(()) => println!("Audio stream started."),
        Err(e) => {
            eprintln!("Failed to start audio stream: {e}");
            return;
        }
    }

    let mut source: Box<dyn FrameSource> = match std::env::args().nth(1) {
        Some(path) => Box::new(WavSource::from_file(path).expect("Failed to load WAV")),
        None => Box::new(ToneSource::new(440.0, DEFAULT_SAMPLE_RATE as f32).with_volume(4_096)),
    };

    let mut interleaved = vec![0_i16; STEREO_CHANNELS * chunk_size];
    let mut chunk = PlanarChunk::new(STEREO_CHANNELS, chunk_size);
    let mut clock = FrameClock::new(DEFAULT_FRAME_RATE);

    clock.start();
    loop {
        source.render_frame(&mut interleaved);
        deinterleave_into(&interleaved, &mut chunk).expect("chunk shape is fixed at startup");
        pusher.push(&chunk).expect("chunk shape is fixed at startup");

        let skipped = clock.sleep_until_next_frame();
        if skipped > 0 {
            log::warn!("frame loop fell behind, skipped {skipped} frames");
        }

        // Once a second, report how the two clocks are drifting apart.
        if clock.current_frame() % 60 == 0 {
            log::debug!(
                "queued={} underruns={} drift_skips={} dropped={}",
                diagnostics.queued(),
                diagnostics.underruns(),
                diagnostics.drift_skips(),
                diagnostics.dropped_samples(),
            );
        }
    }
}
