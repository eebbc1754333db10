pub mod decode;
pub mod energy;
pub mod resample;
pub mod segment;

/// Decoded multi-channel audio, planar layout (one Vec per channel).
///
/// All pipeline stages exchange this type: decoded source tracks,
/// resampled tracks, extracted segments and the final rendered mix.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// Zero-filled buffer with the given shape.
    pub fn silent(channel_count: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channel_count],
            sample_rate,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }
}
