pub mod effects;
pub mod render;
pub mod sequence;

use rayon::prelude::*;

use crate::audio::energy::analyze_energy;
use crate::audio::resample::resample;
use crate::audio::segment::{extract_segment, select_segment, SegmentSpec};
use crate::audio::AudioData;
use crate::error::MixError;
use effects::EffectsConfig;

pub const MIN_TRACKS: usize = 2;
pub const MAX_TRACKS: usize = 5;

/// Number of alternating slots in duet mode (A, B, A, B).
const DUET_SLOTS: usize = 4;
/// Minimum per-track length required by duet mode.
pub const DUET_MIN_TRACK_SECS: f32 = 30.0;

/// The working set of decoded tracks, capped at [`MAX_TRACKS`].
#[derive(Debug, Default)]
pub struct TrackSet {
    tracks: Vec<AudioData>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track, rejecting the push once the set holds [`MAX_TRACKS`].
    /// A rejected push leaves the set unchanged.
    pub fn push(&mut self, track: AudioData) -> Result<(), MixError> {
        if self.tracks.len() >= MAX_TRACKS {
            return Err(MixError::TrackLimitExceeded {
                limit: MAX_TRACKS,
                attempted: self.tracks.len() + 1,
            });
        }
        self.tracks.push(track);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[AudioData] {
        &self.tracks
    }
}

/// Timing and determinism parameters for one render invocation.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub total_duration_secs: f32,
    pub crossfade_secs: f32,
    /// Seeds the reverb impulse-response generator.
    pub seed: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            total_duration_secs: 30.0,
            crossfade_secs: 1.5,
            seed: 0,
        }
    }
}

fn validate_timing(opts: &RenderOptions) -> Result<(), MixError> {
    if !(opts.total_duration_secs > 0.0) {
        return Err(MixError::InvalidDuration(opts.total_duration_secs));
    }
    if !(opts.crossfade_secs >= 0.0) {
        return Err(MixError::InvalidCrossfade(opts.crossfade_secs));
    }
    Ok(())
}

/// Render a mashup from 2-5 tracks.
///
/// Each track contributes one segment of `D / N` seconds, selected by the
/// energy heuristic after normalizing every track to the first track's
/// sample rate. Per-track preparation (resample, analyze, extract) runs in
/// parallel; sequencing and effects wait for all tracks.
pub fn render(
    tracks: &[AudioData],
    opts: &RenderOptions,
    config: &EffectsConfig,
) -> Result<AudioData, MixError> {
    if tracks.len() < MIN_TRACKS {
        return Err(MixError::InsufficientTracks(tracks.len()));
    }
    if tracks.len() > MAX_TRACKS {
        return Err(MixError::TrackLimitExceeded {
            limit: MAX_TRACKS,
            attempted: tracks.len(),
        });
    }
    validate_timing(opts)?;

    let target_rate = tracks[0].sample_rate;
    let target_channels = tracks.iter().map(|t| t.channel_count()).max().unwrap_or(1);
    let segment_secs = opts.total_duration_secs / tracks.len() as f32;
    let segment_frames = (segment_secs as f64 * target_rate as f64) as usize;

    log::info!(
        "Preparing {} tracks: {}s segments at {}Hz, {} channels",
        tracks.len(),
        segment_secs,
        target_rate,
        target_channels
    );

    let segments: Vec<AudioData> = tracks
        .par_iter()
        .map(|track| -> Result<AudioData, MixError> {
            let normalized =
                resample(track, target_rate).map_err(|e| MixError::Resample(e.to_string()))?;
            let profile = analyze_energy(&normalized.channels[0], target_rate);
            let start_frame = select_segment(&profile, segment_frames, normalized.frames());
            Ok(extract_segment(
                &normalized,
                SegmentSpec {
                    start_frame,
                    frame_len: segment_frames,
                },
                target_channels,
            ))
        })
        .collect::<Result<_, _>>()?;

    let plan = sequence::plan(segments, opts.total_duration_secs, opts.crossfade_secs);
    Ok(render::render_plan(&plan, config, opts.seed))
}

/// Render the fixed two-track alternating variant: segments A, B, A, B of
/// `D / 4` seconds each, no resampling.
///
/// Both tracks must share the exact same sample rate and be at least 30 s
/// long. Each track's two occurrences select from its first and second half
/// respectively, so the mashup does not repeat one segment.
pub fn render_duet(
    a: &AudioData,
    b: &AudioData,
    opts: &RenderOptions,
    config: &EffectsConfig,
) -> Result<AudioData, MixError> {
    if a.sample_rate != b.sample_rate {
        return Err(MixError::SampleRateMismatch(a.sample_rate, b.sample_rate));
    }
    for track in [a, b] {
        if track.duration_secs() < DUET_MIN_TRACK_SECS {
            return Err(MixError::DurationTooShort {
                actual: track.duration_secs(),
                required: DUET_MIN_TRACK_SECS,
            });
        }
    }
    validate_timing(opts)?;

    let sample_rate = a.sample_rate;
    let target_channels = a.channel_count().max(b.channel_count());
    let segment_frames =
        ((opts.total_duration_secs / DUET_SLOTS as f32) as f64 * sample_rate as f64) as usize;

    let segments: Vec<AudioData> = (0..DUET_SLOTS)
        .map(|slot| {
            let track = if slot % 2 == 0 { a } else { b };
            let half = slot / 2;
            let total = track.frames();
            let offset = half * (total / 2);
            let half_len = if half == 0 { total / 2 } else { total - total / 2 };

            let slice = &track.channels[0][offset..offset + half_len];
            let profile = analyze_energy(slice, sample_rate);
            let start_frame = offset + select_segment(&profile, segment_frames, half_len);

            extract_segment(
                track,
                SegmentSpec {
                    start_frame,
                    frame_len: segment_frames,
                },
                target_channels,
            )
        })
        .collect();

    let plan = sequence::plan(segments, opts.total_duration_secs, opts.crossfade_secs);
    Ok(render::render_plan(&plan, config, opts.seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 8_000;

    fn tone_track(secs: f32, channels: usize, freq: f32) -> AudioData {
        let frames = (secs * SR as f32) as usize;
        let channel: Vec<f32> = (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SR as f32).sin() * 0.4)
            .collect();
        AudioData::new(vec![channel; channels], SR)
    }

    #[test]
    fn sixth_push_is_rejected_and_leaves_the_set_unchanged() {
        let mut set = TrackSet::new();
        for _ in 0..MAX_TRACKS {
            set.push(tone_track(1.0, 1, 220.0)).unwrap();
        }
        let err = set.push(tone_track(1.0, 1, 220.0)).unwrap_err();
        assert!(matches!(err, MixError::TrackLimitExceeded { .. }));
        assert_eq!(set.len(), MAX_TRACKS);
    }

    #[test]
    fn too_few_tracks_are_rejected_before_rendering() {
        let tracks = vec![tone_track(40.0, 1, 220.0)];
        let err = render(&tracks, &RenderOptions::default(), &EffectsConfig::default())
            .unwrap_err();
        assert!(matches!(err, MixError::InsufficientTracks(1)));
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        let tracks = vec![tone_track(40.0, 1, 220.0), tone_track(40.0, 1, 330.0)];
        let opts = RenderOptions {
            total_duration_secs: 0.0,
            ..RenderOptions::default()
        };
        let err = render(&tracks, &opts, &EffectsConfig::default()).unwrap_err();
        assert!(matches!(err, MixError::InvalidDuration(_)));
    }

    #[test]
    fn three_track_mashup_has_the_fixed_shape() {
        // 3 tracks of 40s, D=30, C=1.5, bass shelf only
        let tracks = vec![
            tone_track(40.0, 2, 220.0),
            tone_track(40.0, 1, 330.0),
            tone_track(40.0, 2, 440.0),
        ];
        let opts = RenderOptions {
            total_duration_secs: 30.0,
            crossfade_secs: 1.5,
            seed: 0,
        };
        let mix = render(&tracks, &opts, &EffectsConfig::default()).unwrap();
        assert_eq!(mix.frames(), (30.0 * SR as f32) as usize);
        assert_eq!(mix.channel_count(), 2);
        assert_eq!(mix.sample_rate, SR);
    }

    #[test]
    fn duet_rejects_short_tracks() {
        let a = tone_track(29.0, 1, 220.0);
        let b = tone_track(40.0, 1, 330.0);
        let err = render_duet(&a, &b, &RenderOptions::default(), &EffectsConfig::default())
            .unwrap_err();
        assert!(matches!(err, MixError::DurationTooShort { .. }));
    }

    #[test]
    fn duet_rejects_mismatched_sample_rates() {
        let a = tone_track(40.0, 1, 220.0);
        let mut b = tone_track(40.0, 1, 330.0);
        b.sample_rate = 44_100;
        let err = render_duet(&a, &b, &RenderOptions::default(), &EffectsConfig::default())
            .unwrap_err();
        assert!(matches!(err, MixError::SampleRateMismatch(SR, 44_100)));
    }

    #[test]
    fn duet_renders_the_fixed_duration() {
        let a = tone_track(35.0, 2, 220.0);
        let b = tone_track(32.0, 1, 330.0);
        let opts = RenderOptions {
            total_duration_secs: 20.0,
            crossfade_secs: 1.0,
            seed: 0,
        };
        let mix = render_duet(&a, &b, &opts, &EffectsConfig::default()).unwrap();
        assert_eq!(mix.frames(), (20.0 * SR as f32) as usize);
        assert_eq!(mix.channel_count(), 2);
    }
}
