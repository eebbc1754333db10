use crate::audio::AudioData;

/// Number of control points in the fade curves.
const FADE_CURVE_POINTS: usize = 128;

/// One timed entry of the mix plan.
#[derive(Clone, Debug)]
pub struct PlanEntry {
    pub segment: AudioData,
    pub start_time_secs: f32,
    /// Effective crossfade for this segment, `min(C, segDur / 2)`.
    pub crossfade_secs: f32,
}

/// Ordered placement of segments on the output timeline.
#[derive(Clone, Debug)]
pub struct MixPlan {
    pub entries: Vec<PlanEntry>,
    pub total_duration_secs: f32,
    pub sample_rate: u32,
}

/// Lay segments end-to-end with overlapping crossfades.
///
/// Step placement is `step = (D + (N-1)*C)/N - C`. Tails that land past the
/// fixed output length are truncated at render time; the fixed total
/// duration wins over extending the output for crossfades.
pub fn plan(segments: Vec<AudioData>, total_duration_secs: f32, crossfade_secs: f32) -> MixPlan {
    let n = segments.len();
    let sample_rate = segments.first().map_or(0, |s| s.sample_rate);
    let step =
        (total_duration_secs + (n as f32 - 1.0) * crossfade_secs) / n as f32 - crossfade_secs;

    let entries = segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let seg_dur = segment.duration_secs();
            PlanEntry {
                segment,
                start_time_secs: i as f32 * step,
                crossfade_secs: crossfade_secs.min(seg_dur / 2.0),
            }
        })
        .collect();

    MixPlan {
        entries,
        total_duration_secs,
        sample_rate,
    }
}

/// Equal-power fade-in curve: `sin(theta * pi/2)` over 128 control points.
pub fn fade_in_curve() -> Vec<f32> {
    (0..FADE_CURVE_POINTS)
        .map(|k| {
            let theta = k as f32 / (FADE_CURVE_POINTS - 1) as f32;
            (theta * std::f32::consts::FRAC_PI_2).sin()
        })
        .collect()
}

/// Equal-power fade-out curve: `cos(theta * pi/2)` over 128 control points.
pub fn fade_out_curve() -> Vec<f32> {
    (0..FADE_CURVE_POINTS)
        .map(|k| {
            let theta = k as f32 / (FADE_CURVE_POINTS - 1) as f32;
            (theta * std::f32::consts::FRAC_PI_2).cos()
        })
        .collect()
}

/// Sample a control-point curve at `t` in [0, 1] with linear interpolation.
pub fn sample_curve(curve: &[f32], t: f32) -> f32 {
    let pos = t.clamp(0.0, 1.0) * (curve.len() - 1) as f32;
    let i = pos as usize;
    if i + 1 >= curve.len() {
        return curve[curve.len() - 1];
    }
    let frac = pos - i as f32;
    curve[i] * (1.0 - frac) + curve[i + 1] * frac
}
