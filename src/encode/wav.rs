use crate::audio::AudioData;

/// Serialize a rendered mix as a 16-bit PCM RIFF/WAVE byte stream.
///
/// Samples are clamped to [-1, 1] and scaled asymmetrically: negative
/// values by 32768, non-negative by 32767, so both full-scale extremes map
/// onto representable int16 values. Frames are interleaved frame-major,
/// channel-minor, little-endian throughout.
pub fn encode_wav(mix: &AudioData) -> Vec<u8> {
    let channel_count = mix.channel_count() as u32;
    let frames = mix.frames() as u32;
    let sample_rate = mix.sample_rate;
    let data_bytes = frames * channel_count * 2;

    let mut out = Vec::with_capacity(44 + data_bytes as usize);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_bytes).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM format tag
    out.extend_from_slice(&(channel_count as u16).to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * channel_count * 2).to_le_bytes());
    out.extend_from_slice(&((channel_count * 2) as u16).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_bytes.to_le_bytes());

    for frame in 0..frames as usize {
        for channel in &mix.channels {
            let sample = channel[frame].clamp(-1.0, 1.0);
            let quantized = if sample < 0.0 {
                (sample * 32768.0) as i16
            } else {
                (sample * 32767.0) as i16
            };
            out.extend_from_slice(&quantized.to_le_bytes());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn header_layout_matches_the_riff_spec() {
        let mix = AudioData::new(vec![vec![0.0f32; 100], vec![0.0f32; 100]], 44_100);
        let bytes = encode_wav(&mix);

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[36..40], b"data");

        let data_bytes = 100 * 2 * 2;
        assert_eq!(u32_at(&bytes, 4), 36 + data_bytes);
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1);
        assert_eq!(u16_at(&bytes, 22), 2);
        assert_eq!(u32_at(&bytes, 24), 44_100);
        assert_eq!(u32_at(&bytes, 28), 44_100 * 2 * 2);
        assert_eq!(u16_at(&bytes, 32), 4);
        assert_eq!(u16_at(&bytes, 34), 16);
        assert_eq!(u32_at(&bytes, 40), data_bytes);
        assert_eq!(bytes.len(), 44 + data_bytes as usize);
    }

    #[test]
    fn samples_round_trip_within_quantization_error() {
        let samples = vec![0.0f32, 0.5, -0.5, 1.0, -1.0, 0.123, -0.987];
        let mix = AudioData::new(vec![samples.clone()], 8_000);
        let bytes = encode_wav(&mix);

        for (i, &expected) in samples.iter().enumerate() {
            let raw = i16::from_le_bytes([bytes[44 + i * 2], bytes[44 + i * 2 + 1]]);
            let decoded = if raw < 0 {
                raw as f32 / 32768.0
            } else {
                raw as f32 / 32767.0
            };
            assert!(
                (decoded - expected).abs() < 1.0 / 32767.0,
                "sample {i}: {decoded} vs {expected}"
            );
        }
    }

    #[test]
    fn out_of_range_samples_are_clamped_to_full_scale() {
        let mix = AudioData::new(vec![vec![2.0f32, -2.0]], 8_000);
        let bytes = encode_wav(&mix);

        let hi = i16::from_le_bytes([bytes[44], bytes[45]]);
        let lo = i16::from_le_bytes([bytes[46], bytes[47]]);
        assert_eq!(hi, i16::MAX);
        assert_eq!(lo, i16::MIN);
    }

    #[test]
    fn interleaving_is_frame_major_channel_minor() {
        let mix = AudioData::new(vec![vec![0.25f32, 0.25], vec![-0.75f32, -0.75]], 8_000);
        let bytes = encode_wav(&mix);

        let first = i16::from_le_bytes([bytes[44], bytes[45]]);
        let second = i16::from_le_bytes([bytes[46], bytes[47]]);
        assert_eq!(first, (0.25f32 * 32767.0) as i16);
        assert_eq!(second, (-0.75f32 * 32768.0) as i16);
    }
}
