// THEORY:
// The `pipeline` module is the top-level API of the engine. It bundles the tunable
// parameters of both paths into one `FinderConfig` and exposes the three stages
// (spot detection, image-based angles, analytic angles) as methods of `SunFinder`.
// It owns no per-call state: every method is a pure function of its inputs and the
// configuration, so one `SunFinder` can be shared freely between threads.

use crate::core_modules::direction::{spot_to_angles, sun_position_from_envmap_with};
use crate::core_modules::ephemeris::{Spa, sun_position_from_coord_with};
use crate::core_modules::spot_detector::spot_detector::find_brightest_spot_with;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

// Re-export key data structures for the public API.
pub use crate::core_modules::direction::{SunAngles, angles_from_direction, direction_from_angles};
pub use crate::core_modules::ephemeris::{SolarEphemeris, SpaConfig};
pub use crate::core_modules::error::{Result, SunFinderError};
pub use crate::core_modules::projection::{
    EnvironmentMap, LatLong, Projection, ProjectionKind, SkyAngular, SkyLatLong, WorldSample,
};
pub use crate::core_modules::radiance::RadianceImage;
pub use crate::core_modules::spot_detector::{DetectorConfig, SpotLocation};

/// Configuration for the `SunFinder`, covering both the image and analytic paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub detector: DetectorConfig,
    pub ephemeris: SpaConfig,
}

/// A spot together with the angles it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunSighting {
    pub spot: SpotLocation,
    pub angles: SunAngles,
}

/// The main, top-level struct for the engine.
#[derive(Debug, Clone, Default)]
pub struct SunFinder {
    config: FinderConfig,
    ephemeris: Spa,
}

impl SunFinder {
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            ephemeris: Spa::new(config.ephemeris),
        }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Pixel location of the sun in `image`.
    pub fn find_spot(&self, image: &RadianceImage) -> Result<SpotLocation> {
        find_brightest_spot_with(image, &self.config.detector)
    }

    /// Sun angles from a light probe and its projection.
    pub fn from_envmap<P: Projection + ?Sized>(
        &self,
        image: &RadianceImage,
        projection: &P,
    ) -> Result<SunAngles> {
        sun_position_from_envmap_with(image, projection, &self.config.detector)
    }

    /// Like `from_envmap`, but also returns the pixel-space detection.
    pub fn sight<P: Projection + ?Sized>(
        &self,
        image: &RadianceImage,
        projection: &P,
    ) -> Result<SunSighting> {
        let spot = self.find_spot(image)?;
        let angles = spot_to_angles(&spot, image.width(), image.height(), projection)?;
        log::info!(
            "sun at pixel ({:.2}, {:.2}), elevation {:.4} rad, azimuth {:.4} rad",
            spot.row,
            spot.col,
            angles.elevation,
            angles.azimuth
        );
        Ok(SunSighting { spot, angles })
    }

    /// Sun angles for an observer at (`latitude`, `longitude`) degrees at `time`.
    pub fn from_coord<Tz: TimeZone>(
        &self,
        latitude: f64,
        longitude: f64,
        time: &DateTime<Tz>,
    ) -> Result<SunAngles> {
        sun_position_from_coord_with(&self.ephemeris, latitude, longitude, time)
    }
}
