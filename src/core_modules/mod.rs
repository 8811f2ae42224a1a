pub mod direction;
pub mod ephemeris;
pub mod error;
pub mod gaussian;
pub mod labeling;
pub mod percentile;
pub mod projection;
pub mod radiance;
pub mod spot_detector;
pub mod utils;
