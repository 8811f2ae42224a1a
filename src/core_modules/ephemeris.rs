// THEORY:
// The analytic path needs no image at all: given where the observer stands and when,
// an astronomical ephemeris tells us where the sun is. The ephemeris itself is an
// external collaborator behind the `SolarEphemeris` trait; `Spa` implements it with
// the NREL Solar Position Algorithm from the `solar-positioning` crate.
//
// Conversions into the engine's angle convention:
// - elevation = (90 - altitude) * pi / 180, i.e. the zenith angle.
// - azimuth   = (azimuth + 360) * pi / 180. This is deliberately *not* wrapped
//   modulo 360: an ephemeris azimuth in [0, 360) lands in [2 pi, 4 pi). Callers that
//   need a canonical range must wrap it themselves.
//
// Timestamps must carry a timezone. `DateTime<Tz>` enforces that at compile time;
// the instant is converted to UTC before it reaches the ephemeris.

use crate::core_modules::direction::SunAngles;
use crate::core_modules::error::{Result, SunFinderError};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use solar_positioning::spa;
use std::f64::consts::PI;

/// Source of solar azimuth and altitude, both in degrees.
pub trait SolarEphemeris {
    /// Azimuth in degrees, clockwise from north.
    fn azimuth_deg(&self, latitude: f64, longitude: f64, time: DateTime<Utc>) -> Result<f64>;

    /// Altitude above the horizon in degrees.
    fn altitude_deg(&self, latitude: f64, longitude: f64, time: DateTime<Utc>) -> Result<f64>;
}

/// Observer and atmosphere parameters for the SPA ephemeris.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaConfig {
    /// Observer height above sea level, metres.
    pub observer_height_m: f64,
    /// TT - UT1, seconds.
    pub delta_t_s: f64,
    /// Surface pressure for refraction, millibars.
    pub pressure_mbar: f64,
    /// Surface temperature for refraction, degrees Celsius.
    pub temperature_c: f64,
}

impl Default for SpaConfig {
    fn default() -> Self {
        Self {
            observer_height_m: 0.0,
            delta_t_s: 69.0,
            pressure_mbar: 1013.25,
            temperature_c: 15.0,
        }
    }
}

/// NREL SPA ephemeris with refraction correction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spa {
    pub config: SpaConfig,
}

impl Spa {
    pub fn new(config: SpaConfig) -> Self {
        Self { config }
    }

    fn position(
        &self,
        latitude: f64,
        longitude: f64,
        time: DateTime<Utc>,
    ) -> Result<solar_positioning::SolarPosition> {
        check_coordinates(latitude, longitude)?;
        spa::solar_position(
            time,
            latitude,
            longitude,
            self.config.observer_height_m,
            self.config.delta_t_s,
            self.config.pressure_mbar,
            self.config.temperature_c,
        )
        .map_err(|e| SunFinderError::Ephemeris(e.to_string()))
    }
}

impl SolarEphemeris for Spa {
    fn azimuth_deg(&self, latitude: f64, longitude: f64, time: DateTime<Utc>) -> Result<f64> {
        Ok(self.position(latitude, longitude, time)?.azimuth())
    }

    fn altitude_deg(&self, latitude: f64, longitude: f64, time: DateTime<Utc>) -> Result<f64> {
        Ok(self.position(latitude, longitude, time)?.elevation_angle())
    }
}

fn check_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
        Ok(())
    } else {
        Err(SunFinderError::InvalidCoordinates {
            latitude,
            longitude,
        })
    }
}

/// Sun angles for an observer at (`latitude`, `longitude`) degrees at `time`,
/// using the default SPA ephemeris.
pub fn sun_position_from_coord<Tz: TimeZone>(
    latitude: f64,
    longitude: f64,
    time: &DateTime<Tz>,
) -> Result<SunAngles> {
    sun_position_from_coord_with(&Spa::default(), latitude, longitude, time)
}

pub fn sun_position_from_coord_with<E: SolarEphemeris + ?Sized, Tz: TimeZone>(
    ephemeris: &E,
    latitude: f64,
    longitude: f64,
    time: &DateTime<Tz>,
) -> Result<SunAngles> {
    check_coordinates(latitude, longitude)?;
    let utc = time.with_timezone(&Utc);

    let azimuth = ephemeris.azimuth_deg(latitude, longitude, utc)?;
    let altitude = ephemeris.altitude_deg(latitude, longitude, utc)?;
    log::debug!("ephemeris at ({latitude}, {longitude}) {utc}: azimuth {azimuth:.4}, altitude {altitude:.4}");

    Ok(SunAngles {
        elevation: (90.0 - altitude) * PI / 180.0,
        azimuth: (azimuth + 360.0) * PI / 180.0,
    })
}
