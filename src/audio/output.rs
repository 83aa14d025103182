use crate::{ParleyError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info};

/// Playback on the default output device.
///
/// Mono samples are queued with `enqueue`; the stream plays silence when the queue
/// runs dry. Like `AudioInput`, this is bound to the thread that created it.
pub struct AudioOutput {
    config: StreamConfig,
    queue: Arc<Mutex<VecDeque<f32>>>,
    _stream: Stream,
}

impl AudioOutput {
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| ParleyError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| ParleyError::AudioDeviceError(format!("Failed to get output config: {}", e)))?
            .into();

        let channels = config.channels as usize;
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let playback = Arc::clone(&queue);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut queue = playback.lock();
                    for frame in data.chunks_mut(channels) {
                        let sample = queue.pop_front().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                |err: cpal::StreamError| error!("Audio output stream error: {}", err),
                None,
            )
            .map_err(|e| ParleyError::AudioDeviceError(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| ParleyError::AudioDeviceError(format!("Failed to start output stream: {}", e)))?;

        Ok(Self {
            config,
            queue,
            _stream: stream,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    pub fn enqueue(&self, samples: &[f32]) {
        self.queue.lock().extend(samples.iter().copied());
    }

    /// Drop everything not yet played
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    pub fn is_drained(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_clear() {
        // CI machines usually have no speakers
        if let Ok(output) = AudioOutput::open() {
            assert!(output.sample_rate() > 0);
            assert!(output.channels() > 0);
            output.enqueue(&[0.0; 64]);
            output.clear();
            assert!(output.is_drained());
        }
    }
}
