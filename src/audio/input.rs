use crate::{ParleyError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Microphone capture on the default input device.
///
/// `cpal::Stream` is not `Send`, so an `AudioInput` lives on the thread that opened it.
pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    capturing: Arc<AtomicBool>,
}

impl AudioInput {
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| ParleyError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| ParleyError::AudioDeviceError(format!("Failed to get input config: {}", e)))?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            capturing: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start capturing; mono blocks are sent to `samples_tx`
    pub fn start(&mut self, samples_tx: Sender<Vec<f32>>) -> Result<()> {
        if self.capturing.load(Ordering::SeqCst) {
            warn!("Already capturing");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let capturing = Arc::clone(&self.capturing);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !capturing.load(Ordering::Relaxed) {
                        return;
                    }

                    let mono = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = samples_tx.try_send(mono) {
                        debug!("Dropped input block: {}", e);
                    }
                },
                |err: cpal::StreamError| error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| ParleyError::AudioDeviceError(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| ParleyError::AudioDeviceError(format!("Failed to start input stream: {}", e)))?;

        self.capturing.store(true, Ordering::SeqCst);
        self.stream = Some(stream);
        debug!("Microphone capture started at {} Hz", self.sample_rate());
        Ok(())
    }

    pub fn stop(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
        if self.stream.take().is_some() {
            debug!("Microphone capture stopped");
        }
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_open_and_stop() {
        // CI machines usually have no microphone
        if let Ok(mut input) = AudioInput::open() {
            assert!(input.sample_rate() > 0);
            let (tx, _rx) = bounded(4);
            if input.start(tx).is_ok() {
                input.stop();
                input.stop();
            }
        }
    }
}
