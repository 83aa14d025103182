use crate::{ParleyError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

const CHUNK_FRAMES: usize = 1024;

/// Streaming mono resampler
///
/// Samples are pushed in arbitrary block sizes and converted once a full chunk is
/// buffered. `flush` converts whatever is left.
pub struct AudioResampler {
    resampler: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(ParleyError::AudioProcessingError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        // Equal rates pass samples straight through
        let resampler = if input_rate == output_rate {
            None
        } else {
            let params = SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            };

            let resampler = SincFixedIn::<f32>::new(
                output_rate as f64 / input_rate as f64,
                2.0,
                params,
                CHUNK_FRAMES,
                1,
            )
            .map_err(|e| {
                ParleyError::AudioProcessingError(format!("Failed to create resampler: {}", e))
            })?;
            Some(resampler)
        };

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler,
            pending: Vec::with_capacity(CHUNK_FRAMES * 2),
            input_rate,
            output_rate,
        })
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Feed samples, returning whatever output is ready
    pub fn push(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(samples.to_vec());
        };

        self.pending.extend_from_slice(samples);
        let mut output = Vec::new();

        while self.pending.len() >= resampler.input_frames_next() {
            let needed = resampler.input_frames_next();
            let chunk: Vec<Vec<f32>> = vec![self.pending.drain(..needed).collect()];
            let converted = resampler
                .process(&chunk, None)
                .map_err(|e| ParleyError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&converted[0]);
        }

        Ok(output)
    }

    /// Convert the buffered remainder
    pub fn flush(&mut self) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(Vec::new());
        };
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let remainder = std::mem::take(&mut self.pending);
        let wave: Vec<&[f32]> = vec![remainder.as_slice()];
        let converted = resampler
            .process_partial(Some(wave.as_slice()), None)
            .map_err(|e| ParleyError::AudioProcessingError(format!("Resampling failed: {}", e)))?;

        // Trim the zero padding added to fill the last chunk
        let expected = (remainder.len() as f64 * self.output_rate as f64 / self.input_rate as f64)
            .ceil() as usize;
        let mut tail = converted.into_iter().next().unwrap_or_default();
        tail.truncate(expected);

        resampler.reset();
        Ok(tail)
    }
}

/// Resample a complete mono buffer
pub fn resample_all(samples: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = AudioResampler::new(input_rate, output_rate)?;
    let mut output = resampler.push(samples)?;
    output.extend(resampler.flush()?);
    Ok(output)
}
