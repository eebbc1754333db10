use rand::rngs::StdRng;
use rand::SeedableRng;

use super::effects::{self, EffectStage, EffectsConfig};
use super::sequence::{fade_in_curve, fade_out_curve, sample_curve, MixPlan};
use crate::audio::AudioData;

/// Evaluate a mix plan through the effects pipeline.
///
/// Segments are laid onto a program bus of exactly
/// `floor(totalDuration * sampleRate)` frames with their equal-power gain
/// envelopes applied, then the bus runs through the stage list: the bass
/// shelf first, the echo branch tapped in parallel where it appears, the
/// remaining stages in series, and one final sum of the serial tail with
/// the parallel branch.
pub fn render_plan(plan: &MixPlan, config: &EffectsConfig, seed: u64) -> AudioData {
    let sr = plan.sample_rate;
    let out_frames = (plan.total_duration_secs as f64 * sr as f64) as usize;
    let channel_count = plan
        .entries
        .iter()
        .map(|e| e.segment.channel_count())
        .max()
        .unwrap_or(1);

    let mut bus = vec![vec![0.0f32; out_frames]; channel_count];
    let fade_in = fade_in_curve();
    let fade_out = fade_out_curve();

    for entry in &plan.entries {
        let seg = &entry.segment;
        let seg_frames = seg.frames();
        if seg_frames == 0 {
            continue;
        }
        let start_frame = (entry.start_time_secs as f64 * sr as f64).round() as usize;
        let fade_frames = (entry.crossfade_secs as f64 * sr as f64).round() as usize;
        let fade_out_start = seg_frames.saturating_sub(fade_frames);

        for k in 0..seg_frames {
            let frame = start_frame + k;
            if frame >= out_frames {
                break;
            }

            let gain = if fade_frames == 0 {
                1.0
            } else if k < fade_frames {
                sample_curve(&fade_in, k as f32 / fade_frames as f32)
            } else if k >= fade_out_start {
                sample_curve(&fade_out, (k - fade_out_start) as f32 / fade_frames as f32)
            } else {
                1.0
            };

            for (ch, bus_channel) in bus.iter_mut().enumerate() {
                let src = &seg.channels[ch.min(seg.channel_count() - 1)];
                bus_channel[frame] += src[k] * gain;
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut serial = bus;
    let mut parallel: Option<Vec<Vec<f32>>> = None;

    for stage in config.stages() {
        match stage {
            EffectStage::Bass { gain_db } => {
                effects::bass_shelf(&mut serial, sr, gain_db);
            }
            EffectStage::Echo {
                delay_secs,
                feedback,
                mix,
            } => {
                parallel = Some(effects::echo(&serial, sr, delay_secs, feedback, mix));
            }
            EffectStage::Flanger {
                base_delay_secs,
                depth_secs,
                rate_hz,
            } => {
                serial = effects::flanger(&serial, sr, base_delay_secs, depth_secs, rate_hz);
            }
            EffectStage::Reverb { ir_secs } => {
                serial = effects::reverb(&serial, sr, ir_secs, &mut rng);
            }
        }
    }

    if let Some(branch) = parallel {
        for (out_channel, branch_channel) in serial.iter_mut().zip(branch.iter()) {
            for (out, &wet) in out_channel.iter_mut().zip(branch_channel.iter()) {
                *out += wet;
            }
        }
    }

    log::info!(
        "Rendered mix: {} channels, {} frames, {}Hz",
        serial.len(),
        out_frames,
        sr
    );

    AudioData::new(serial, sr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mix::sequence::plan;

    const SR: u32 = 8_000;

    fn constant_segment(level: f32, frames: usize, channels: usize) -> AudioData {
        AudioData::new(vec![vec![level; frames]; channels], SR)
    }

    #[test]
    fn output_frame_count_is_fixed_by_duration() {
        for (n, crossfade) in [(2usize, 0.0f32), (3, 1.5), (5, 4.0)] {
            let segments: Vec<AudioData> = (0..n)
                .map(|_| constant_segment(0.2, (10.0 * SR as f32) as usize, 2))
                .collect();
            let p = plan(segments, 7.25, crossfade);
            let mix = render_plan(&p, &EffectsConfig::default(), 0);
            assert_eq!(mix.frames(), (7.25 * SR as f32) as usize);
            assert_eq!(mix.channel_count(), 2);
        }
    }

    #[test]
    fn plateau_passes_signal_through_unchanged() {
        // Single segment, no crossfade, 0 dB shelf: bus equals segment
        let p = plan(vec![constant_segment(0.25, SR as usize, 1)], 1.0, 0.0);
        let mix = render_plan(&p, &EffectsConfig::default(), 0);
        let mid = mix.channels[0][SR as usize / 2];
        assert!((mid - 0.25).abs() < 1e-5);
    }

    #[test]
    fn segment_tail_is_truncated_at_the_output_length() {
        // 2s segment into a 1s output: the tail simply disappears
        let p = plan(vec![constant_segment(0.5, 2 * SR as usize, 1)], 1.0, 0.0);
        let mix = render_plan(&p, &EffectsConfig::default(), 0);
        assert_eq!(mix.frames(), SR as usize);
    }

    #[test]
    fn renders_are_bit_identical_with_reverb_disabled() {
        let segments = vec![
            constant_segment(0.3, SR as usize, 2),
            constant_segment(-0.2, SR as usize, 2),
        ];
        let config = EffectsConfig {
            bass_gain_db: 4.0,
            echo_amount: 30.0,
            flanger: true,
            reverb: false,
        };
        let p = plan(segments, 1.5, 0.25);
        let a = render_plan(&p, &config, 1);
        let b = render_plan(&p, &config, 2);
        assert_eq!(a.channels, b.channels);
    }

    #[test]
    fn renders_with_reverb_reproduce_under_the_same_seed() {
        let segments = vec![
            constant_segment(0.3, SR as usize, 2),
            constant_segment(-0.2, SR as usize, 2),
        ];
        let config = EffectsConfig {
            reverb: true,
            ..EffectsConfig::default()
        };
        let p = plan(segments, 1.5, 0.25);
        let a = render_plan(&p, &config, 42);
        let b = render_plan(&p, &config, 42);
        assert_eq!(a.channels, b.channels);
    }

    #[test]
    fn crossfade_envelope_starts_and_ends_at_zero() {
        let seg_frames = SR as usize; // 1s segment, 0.25s fades
        let p = plan(
            vec![constant_segment(1.0, seg_frames, 1); 2],
            2.0,
            0.25,
        );
        let mix = render_plan(&p, &EffectsConfig::default(), 0);

        // First sample of the first segment is faded fully down
        assert!(mix.channels[0][0].abs() < 1e-6);
        // Middle of the first segment sits at full level
        assert!((mix.channels[0][SR as usize / 2] - 1.0).abs() < 1e-5);
    }
}
