use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "remixa", about = "Offline audio mashup generator")]
pub struct Cli {
    /// Input audio files, 2-5 tracks (WAV, MP3, FLAC, OGG, AAC)
    pub inputs: Vec<PathBuf>,

    /// Output WAV file
    #[arg(short, long, default_value = "mashup.wav")]
    pub output: PathBuf,

    /// Total mashup duration in seconds
    #[arg(short, long, default_value_t = 30.0)]
    pub duration: f32,

    /// Crossfade between segments in seconds
    #[arg(long, default_value_t = 1.5)]
    pub crossfade: f32,

    /// Bass shelf gain in dB (low-shelf at 120 Hz)
    #[arg(long, default_value_t = 0.0)]
    pub bass: f32,

    /// Echo amount in percent (0 disables the echo branch)
    #[arg(long, default_value_t = 0.0)]
    pub echo: f32,

    /// Enable the flanger
    #[arg(long)]
    pub flanger: bool,

    /// Enable the convolution reverb
    #[arg(long)]
    pub reverb: bool,

    /// Two-track alternating mode: segments A, B, A, B, no resampling.
    /// Requires exactly 2 inputs with identical sample rates, each >= 30s.
    #[arg(long)]
    pub duet: bool,

    /// Seed for the reverb impulse response (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Config file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
