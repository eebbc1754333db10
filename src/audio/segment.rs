use super::energy::EnergyWindow;
use super::AudioData;

/// Fraction of a track excluded from segment selection at each end.
const SKIP_FRACTION: f64 = 0.15;

/// The chosen extraction window for one track.
///
/// `start_frame + frame_len` may exceed the track length; extraction
/// zero-pads past the end rather than clamping the start.
#[derive(Clone, Copy, Debug)]
pub struct SegmentSpec {
    pub start_frame: usize,
    pub frame_len: usize,
}

/// Pick the start frame of the most energetic segment of `needed_frames`
/// length, given a track's loudness profile.
///
/// The first and last 15% of the track are excluded to avoid intros and
/// outros. For every profile window whose candidate span fits inside the
/// usable range, the average energy of all windows starting within the span
/// is computed; the candidate with the strictly greatest average wins
/// (first seen wins ties). If the usable range cannot contain a full
/// segment, falls back to a centered segment ignoring the skip policy.
pub fn select_segment(
    profile: &[EnergyWindow],
    needed_frames: usize,
    total_frames: usize,
) -> usize {
    let skip_start = (total_frames as f64 * SKIP_FRACTION) as usize;
    let skip_end = (total_frames as f64 * (1.0 - SKIP_FRACTION)) as usize;

    if skip_end - skip_start < needed_frames {
        // Track too short for the usable range; take the middle
        return total_frames.saturating_sub(needed_frames) / 2;
    }

    let mut max_energy = -1.0f32;
    let mut best_start = skip_start;

    for (i, window) in profile.iter().enumerate() {
        let start = window.start_frame;
        let end = start + needed_frames;

        if start < skip_start || end > skip_end || end > total_frames {
            continue;
        }

        let mut total = 0.0f32;
        let mut count = 0usize;
        for later in &profile[i..] {
            if later.start_frame >= end {
                break;
            }
            total += later.energy;
            count += 1;
        }

        let avg = if count > 0 { total / count as f32 } else { 0.0 };
        if avg > max_energy {
            max_energy = avg;
            best_start = start;
        }
    }

    best_start
}

/// Extract a fixed-length segment across `target_channels` channels.
///
/// Reads past the end of the source become zeros. Sources with fewer
/// channels than the target are upmixed by duplicating their last channel.
pub fn extract_segment(
    track: &AudioData,
    spec: SegmentSpec,
    target_channels: usize,
) -> AudioData {
    let src_channels = track.channel_count().max(1);
    let mut channels = Vec::with_capacity(target_channels);

    for ch in 0..target_channels {
        let src = &track.channels[ch.min(src_channels - 1)];
        let mut out = vec![0.0f32; spec.frame_len];
        for (k, sample) in out.iter_mut().enumerate() {
            let idx = spec.start_frame + k;
            if idx < src.len() {
                *sample = src[idx];
            }
        }
        channels.push(out);
    }

    AudioData::new(channels, track.sample_rate)
}
