/// Window length for the loudness profile, in seconds.
const ENERGY_WINDOW_SECS: f32 = 0.5;

/// One window of the coarse loudness profile.
#[derive(Clone, Copy, Debug)]
pub struct EnergyWindow {
    pub start_frame: usize,
    /// Mean absolute sample value over the window (>= 0).
    pub energy: f32,
}

/// Compute a coarse loudness profile over one channel of a track.
///
/// The signal is partitioned into consecutive non-overlapping 0.5 s windows;
/// each window's energy is the mean absolute sample value. The last window
/// may be shorter. An empty signal yields an empty profile.
pub fn analyze_energy(samples: &[f32], sample_rate: u32) -> Vec<EnergyWindow> {
    let window_len = (ENERGY_WINDOW_SECS * sample_rate as f32).round() as usize;
    if window_len == 0 || samples.is_empty() {
        return Vec::new();
    }

    let mut profile = Vec::with_capacity(samples.len() / window_len + 1);
    let mut start = 0;
    while start < samples.len() {
        let end = (start + window_len).min(samples.len());
        let sum: f32 = samples[start..end].iter().map(|s| s.abs()).sum();
        profile.push(EnergyWindow {
            start_frame: start,
            energy: sum / (end - start) as f32,
        });
        start += window_len;
    }

    profile
}
