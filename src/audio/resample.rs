use anyhow::{Context, Result};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use super::AudioData;

/// Resample a track to `target_rate` with band-limited sinc interpolation.
///
/// Whole-buffer offline pass. The output is normalized to exactly
/// `ceil(duration * target_rate)` frames so downstream frame math is
/// independent of the resampler's internal chunking. No-op when the rates
/// already match.
pub fn resample(track: &AudioData, target_rate: u32) -> Result<AudioData> {
    if track.sample_rate == target_rate {
        return Ok(track.clone());
    }
    if track.frames() == 0 {
        return Ok(AudioData::new(
            vec![Vec::new(); track.channel_count()],
            target_rate,
        ));
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / track.sample_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0, // max relative ratio
        params,
        track.frames(),
        track.channel_count(),
    )
    .context("Failed to create resampler")?;

    let mut output = resampler
        .process(&track.channels, None)
        .context("Resampling failed")?;

    // Pin the frame count to the duration-preserving length
    let expected = (track.duration_secs() as f64 * target_rate as f64).ceil() as usize;
    for channel in output.iter_mut() {
        channel.resize(expected, 0.0);
    }

    log::debug!(
        "Resampled {} -> {} Hz ({} frames)",
        track.sample_rate,
        target_rate,
        expected
    );

    Ok(AudioData::new(output, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_rates_are_a_no_op() {
        let track = AudioData::new(vec![vec![0.1f32; 480]], 48_000);
        let out = resample(&track, 48_000).unwrap();
        assert_eq!(out.sample_rate, 48_000);
        assert_eq!(out.channels, track.channels);
    }

    #[test]
    fn duration_is_preserved_across_rates() {
        // 1s of a low-frequency ramp at 44.1k down to 22.05k
        let samples: Vec<f32> = (0..44_100).map(|i| (i as f32 / 44_100.0) * 0.5).collect();
        let track = AudioData::new(vec![samples.clone(), samples], 44_100);
        let out = resample(&track, 22_050).unwrap();
        assert_eq!(out.sample_rate, 22_050);
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.frames(), 22_050);
    }
}
