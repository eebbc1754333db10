use rand::rngs::StdRng;
use rand::Rng;
use rustfft::{num_complex::Complex, FftPlanner};

/// Corner frequency of the always-present bass shelf.
const BASS_CORNER_HZ: f64 = 120.0;
const SHELF_Q: f64 = 0.707;

const ECHO_DELAY_SECS: f32 = 0.3;
const FLANGER_BASE_DELAY_SECS: f32 = 0.005;
const FLANGER_DEPTH_SECS: f32 = 0.002;
const FLANGER_RATE_HZ: f32 = 0.5;
const REVERB_IR_SECS: f32 = 2.0;

/// Caller-supplied effects configuration.
#[derive(Clone, Copy, Debug)]
pub struct EffectsConfig {
    pub bass_gain_db: f32,
    /// Echo amount in percent, 0..=100. Zero disables the echo branch.
    pub echo_amount: f32,
    pub flanger: bool,
    pub reverb: bool,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            bass_gain_db: 0.0,
            echo_amount: 0.0,
            flanger: false,
            reverb: false,
        }
    }
}

/// One stage of the effects pipeline description.
///
/// The chain is an ordered list of tagged variants evaluated by pure buffer
/// transforms, not a mutable node graph. `Echo` is the single parallel
/// branch: it taps the chain where it appears and is summed into the final
/// output alongside the serial tail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectStage {
    Bass { gain_db: f32 },
    Echo { delay_secs: f32, feedback: f32, mix: f32 },
    Flanger { base_delay_secs: f32, depth_secs: f32, rate_hz: f32 },
    Reverb { ir_secs: f32 },
}

impl EffectsConfig {
    /// Expand the configuration into the ordered pipeline description.
    /// The bass shelf is always present, even at 0 dB.
    pub fn stages(&self) -> Vec<EffectStage> {
        let mut stages = vec![EffectStage::Bass {
            gain_db: self.bass_gain_db,
        }];
        if self.echo_amount > 0.0 {
            stages.push(EffectStage::Echo {
                delay_secs: ECHO_DELAY_SECS,
                feedback: self.echo_amount / 200.0,
                mix: self.echo_amount / 100.0,
            });
        }
        if self.flanger {
            stages.push(EffectStage::Flanger {
                base_delay_secs: FLANGER_BASE_DELAY_SECS,
                depth_secs: FLANGER_DEPTH_SECS,
                rate_hz: FLANGER_RATE_HZ,
            });
        }
        if self.reverb {
            stages.push(EffectStage::Reverb {
                ir_secs: REVERB_IR_SECS,
            });
        }
        stages
    }
}

/// RBJ biquad coefficients, normalized by a0.
#[derive(Clone, Copy, Debug)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    fn low_shelf(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        let a = 10.0_f64.powf(gain_db / 40.0);
        let omega = 2.0 * std::f64::consts::PI * freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha);
        let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega);
        let b2 = a * ((a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha);
        let a0 = (a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha;
        let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega);
        let a2 = (a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Apply the 120 Hz low-shelf in place, Transposed Direct Form II.
pub fn bass_shelf(buffer: &mut [Vec<f32>], sample_rate: u32, gain_db: f32) {
    let coeffs = BiquadCoeffs::low_shelf(BASS_CORNER_HZ, SHELF_Q, gain_db as f64, sample_rate as f64);

    for channel in buffer.iter_mut() {
        let mut z1 = 0.0f64;
        let mut z2 = 0.0f64;
        for sample in channel.iter_mut() {
            let x = *sample as f64;
            let y = coeffs.b0 * x + z1;
            z1 = coeffs.b1 * x - coeffs.a1 * y + z2;
            z2 = coeffs.b2 * x - coeffs.a2 * y;
            *sample = y as f32;
        }
    }
}

/// Feedback echo branch.
///
/// Topology: the delay line self-feeds through a feedback gain, and the
/// delayed signal passes through a wet gain. The returned buffer is the wet
/// branch only; the caller sums it into the output bus.
pub fn echo(
    input: &[Vec<f32>],
    sample_rate: u32,
    delay_secs: f32,
    feedback: f32,
    mix: f32,
) -> Vec<Vec<f32>> {
    let delay_frames = ((delay_secs * sample_rate as f32).round() as usize).max(1);

    input
        .iter()
        .map(|channel| {
            let mut ring = vec![0.0f32; delay_frames];
            let mut out = vec![0.0f32; channel.len()];
            for n in 0..channel.len() {
                // ring holds the delay-line output from delay_frames ago
                let fed_back = ring[n % delay_frames];
                let delayed_in = if n >= delay_frames {
                    channel[n - delay_frames]
                } else {
                    0.0
                };
                let y = delayed_in + feedback * fed_back;
                ring[n % delay_frames] = y;
                out[n] = mix * y;
            }
            out
        })
        .collect()
}

/// Modulated-delay flanger: a short delay swept by a low-frequency sine.
///
/// The delay time is `base + depth * sin(2*pi*rate*t)`, read with linear
/// interpolation. The output replaces the input signal (no dry mix), the
/// same wiring as a serial delay node.
pub fn flanger(
    input: &[Vec<f32>],
    sample_rate: u32,
    base_delay_secs: f32,
    depth_secs: f32,
    rate_hz: f32,
) -> Vec<Vec<f32>> {
    let sr = sample_rate as f32;

    input
        .iter()
        .map(|channel| {
            let mut out = vec![0.0f32; channel.len()];
            for n in 0..channel.len() {
                let t = n as f32 / sr;
                let delay = base_delay_secs
                    + depth_secs * (2.0 * std::f32::consts::PI * rate_hz * t).sin();
                let pos = n as f32 - delay * sr;
                if pos < 0.0 {
                    continue;
                }
                let i = pos as usize;
                let frac = pos - i as f32;
                let a = channel.get(i).copied().unwrap_or(0.0);
                let b = channel.get(i + 1).copied().unwrap_or(0.0);
                out[n] = a * (1.0 - frac) + b * frac;
            }
            out
        })
        .collect()
}

/// Synthetic convolution reverb.
///
/// The impulse response is a 2 s stereo exponentially decaying noise tail:
/// each sample uniform in [-1, 1] scaled by `(1 - i/len)^2`, drawn from the
/// injected generator so renders are reproducible under a fixed seed. The
/// IR is scaled to unit energy before convolution; the tail past the input
/// length is discarded.
pub fn reverb(
    input: &[Vec<f32>],
    sample_rate: u32,
    ir_secs: f32,
    rng: &mut StdRng,
) -> Vec<Vec<f32>> {
    let ir_frames = (ir_secs * sample_rate as f32) as usize;
    let ir = generate_impulse_response(ir_frames, rng);

    input
        .iter()
        .enumerate()
        .map(|(ch, channel)| {
            let h = &ir[ch.min(ir.len() - 1)];
            let mut out = fft_convolve(channel, h);
            out.truncate(channel.len());
            out
        })
        .collect()
}

/// Draw the decaying-noise impulse response, two channels, unit energy.
fn generate_impulse_response(frames: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut ir: Vec<Vec<f32>> = (0..2)
        .map(|_| {
            (0..frames)
                .map(|i| {
                    let envelope = (1.0 - i as f32 / frames as f32).powi(2);
                    rng.random_range(-1.0f32..1.0) * envelope
                })
                .collect()
        })
        .collect();

    let energy: f32 = ir
        .iter()
        .flat_map(|ch| ch.iter())
        .map(|s| s * s)
        .sum::<f32>()
        / ir.len() as f32;
    if energy > 0.0 {
        let scale = 1.0 / energy.sqrt();
        for ch in ir.iter_mut() {
            for s in ch.iter_mut() {
                *s *= scale;
            }
        }
    }

    ir
}

/// Linear convolution via a single zero-padded FFT round trip.
fn fft_convolve(x: &[f32], h: &[f32]) -> Vec<f32> {
    if x.is_empty() || h.is_empty() {
        return vec![0.0; x.len()];
    }

    let out_len = x.len() + h.len() - 1;
    let n = out_len.next_power_of_two();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut fx: Vec<Complex<f32>> = x
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(n)
        .collect();
    let mut fh: Vec<Complex<f32>> = h
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(n)
        .collect();

    fft.process(&mut fx);
    fft.process(&mut fh);

    for (a, b) in fx.iter_mut().zip(fh.iter()) {
        *a *= *b;
    }

    ifft.process(&mut fx);

    let scale = 1.0 / n as f32;
    fx[..out_len].iter().map(|c| c.re * scale).collect()
}
