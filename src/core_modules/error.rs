// THEORY:
// Every failure in the engine is a deterministic function of its input, so there
// is exactly one error type and no retry logic anywhere. Detector failures,
// projection failures and ephemeris failures all surface through `SunFinderError`
// unchanged, and no stage ever returns a partial result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SunFinderError {
    /// No pixel has a positive red channel, so there is nothing to rank.
    #[error("radiance image has no valid pixels (every R value is 0)")]
    EmptyImage,

    /// Thresholding left no connected bright component.
    #[error("no bright region found above the intensity threshold")]
    NoBrightRegion,

    #[error("projection reports ({u:.4}, {v:.4}) as outside its valid domain")]
    InvalidDirection { u: f64, v: f64 },

    #[error("percentile must lie strictly between 0 and 100, got {0}")]
    InvalidPercentile(f64),

    /// Blur width and truncation must both be finite and positive.
    #[error("invalid smoothing parameters: sigma {sigma}, truncate {truncate}")]
    InvalidSmoothing { sigma: f64, truncate: f64 },

    #[error("invalid radiance image shape: {0}")]
    InvalidShape(String),

    #[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("ephemeris failure: {0}")]
    Ephemeris(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SunFinderError>;
