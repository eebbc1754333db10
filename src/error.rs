use thiserror::Error;

/// Validation and render errors surfaced by the mix pipeline.
///
/// All validation variants are detected before any render buffer is
/// allocated. Decode failures are handled at the decode boundary (the
/// failing track is dropped from the working set) and only surface here as
/// `InsufficientTracks` when fewer than two valid tracks remain.
#[derive(Debug, Error)]
pub enum MixError {
    #[error("at least 2 tracks are required, got {0}")]
    InsufficientTracks(usize),

    #[error("track limit is {limit}, cannot add track {attempted}")]
    TrackLimitExceeded { limit: usize, attempted: usize },

    #[error("sample rate mismatch: {0} Hz vs {1} Hz (duet mode performs no resampling)")]
    SampleRateMismatch(u32, u32),

    #[error("track is {actual:.1}s long, at least {required:.1}s required")]
    DurationTooShort { actual: f32, required: f32 },

    #[error("total duration must be positive, got {0}")]
    InvalidDuration(f32),

    #[error("crossfade duration must be non-negative, got {0}")]
    InvalidCrossfade(f32),

    #[error("resampling failed: {0}")]
    Resample(String),
}
