// THEORY:
// The `direction` module is the second stage of the image path. It takes the pixel
// location from the spot detector, turns it into a texture coordinate, asks the
// projection for the world direction through that point and expresses it as
// spherical angles.
//
// Angle conventions (shared with the analytic path):
// - elevation is measured from the zenith (+Y): 0 overhead, pi/2 on the horizon,
//   pi straight down. `acos` is fed a clamped y so rounding can never leave its domain.
// - azimuth is atan2(x, -z), in (-pi, pi].

use crate::core_modules::error::{Result, SunFinderError};
use crate::core_modules::projection::{EnvironmentMap, Projection, texture_coords};
use crate::core_modules::radiance::RadianceImage;
use crate::core_modules::spot_detector::spot_detector::find_brightest_spot_with;
use crate::core_modules::spot_detector::{DetectorConfig, SpotLocation};

/// Sun position as (elevation from zenith, azimuth), both in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunAngles {
    pub elevation: f64,
    pub azimuth: f64,
}

pub fn angles_from_direction(x: f64, y: f64, z: f64) -> SunAngles {
    SunAngles {
        elevation: y.clamp(-1.0, 1.0).acos(),
        azimuth: x.atan2(-z),
    }
}

/// Unit direction for the given angles; the inverse of `angles_from_direction`.
pub fn direction_from_angles(angles: SunAngles) -> [f64; 3] {
    let (sin_e, cos_e) = angles.elevation.sin_cos();
    let (sin_a, cos_a) = angles.azimuth.sin_cos();
    [sin_e * sin_a, cos_e, -sin_e * cos_a]
}

/// Converts a detected spot to angles through `projection`.
pub fn spot_to_angles<P: Projection + ?Sized>(
    spot: &SpotLocation,
    width: usize,
    height: usize,
    projection: &P,
) -> Result<SunAngles> {
    let (u, v) = texture_coords(spot.row, spot.col, width, height);

    let sample = projection.image2world(u, v);
    if !sample.valid {
        log::warn!("sun spot at ({:.2}, {:.2}) falls outside the projection", spot.row, spot.col);
        return Err(SunFinderError::InvalidDirection { u, v });
    }

    Ok(angles_from_direction(sample.x, sample.y, sample.z))
}

pub fn sun_position_from_envmap<P: Projection + ?Sized>(
    image: &RadianceImage,
    projection: &P,
) -> Result<SunAngles> {
    sun_position_from_envmap_with(image, projection, &DetectorConfig::default())
}

pub fn sun_position_from_envmap_with<P: Projection + ?Sized>(
    image: &RadianceImage,
    projection: &P,
    config: &DetectorConfig,
) -> Result<SunAngles> {
    let spot = find_brightest_spot_with(image, config)?;
    spot_to_angles(&spot, image.width(), image.height(), projection)
}

impl<P: Projection> EnvironmentMap<P> {
    pub fn sun_position(&self) -> Result<SunAngles> {
        sun_position_from_envmap(&self.image, &self.projection)
    }

    pub fn sun_position_with(&self, config: &DetectorConfig) -> Result<SunAngles> {
        sun_position_from_envmap_with(&self.image, &self.projection, config)
    }
}
