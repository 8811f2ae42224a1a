// THEORY:
// A panoramic light probe is only meaningful together with its projection: the rule
// that maps a normalised texture coordinate (u, v) in [0, 1] to a unit direction in
// the world. The world frame is fixed for the whole engine: +Y is the zenith and an
// azimuth of 0 looks down -Z.
//
// The `Projection` trait is the seam for that mapping. Callers may plug in any
// projection they already have; the three classic light-probe layouts are provided:
//
// - `LatLong`     full-sphere equirectangular: u spans azimuth, v spans zenith angle 0..pi
// - `SkyLatLong`  upper hemisphere only:       v spans zenith angle 0..pi/2
// - `SkyAngular`  hemispherical fisheye looking up, zenith at the image centre
//
// `EnvironmentMap` pairs a `RadianceImage` with its projection.

use crate::core_modules::radiance::RadianceImage;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// A world direction produced by a projection, with its validity flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// `false` when (u, v) lies outside the projection's domain.
    pub valid: bool,
}

impl WorldSample {
    fn invalid() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            valid: false,
        }
    }
}

pub trait Projection {
    /// Maps normalised texture coordinates to a unit world direction.
    fn image2world(&self, u: f64, v: f64) -> WorldSample;
}

impl<P: Projection + ?Sized> Projection for &P {
    fn image2world(&self, u: f64, v: f64) -> WorldSample {
        (**self).image2world(u, v)
    }
}

impl<P: Projection + ?Sized> Projection for Box<P> {
    fn image2world(&self, u: f64, v: f64) -> WorldSample {
        (**self).image2world(u, v)
    }
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Direction for a zenith angle `theta` and azimuth `phi` (atan2(x, -z) convention).
fn spherical(theta: f64, phi: f64) -> WorldSample {
    WorldSample {
        x: theta.sin() * phi.sin(),
        y: theta.cos(),
        z: -theta.sin() * phi.cos(),
        valid: true,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatLong;

impl Projection for LatLong {
    fn image2world(&self, u: f64, v: f64) -> WorldSample {
        if !in_unit_range(u) || !in_unit_range(v) {
            return WorldSample::invalid();
        }
        spherical(PI * v, PI * (2.0 * u - 1.0))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkyLatLong;

impl Projection for SkyLatLong {
    fn image2world(&self, u: f64, v: f64) -> WorldSample {
        if !in_unit_range(u) || !in_unit_range(v) {
            return WorldSample::invalid();
        }
        spherical(FRAC_PI_2 * v, PI * (2.0 * u - 1.0))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkyAngular;

impl Projection for SkyAngular {
    fn image2world(&self, u: f64, v: f64) -> WorldSample {
        let a = 2.0 * u - 1.0;
        let b = 2.0 * v - 1.0;
        let radius = a.hypot(b);
        if radius > 1.0 {
            return WorldSample::invalid();
        }
        let theta = FRAC_PI_2 * radius;
        let phi = b.atan2(a);
        WorldSample {
            x: theta.sin() * phi.cos(),
            y: theta.cos(),
            z: theta.sin() * phi.sin(),
            valid: true,
        }
    }
}

/// Runtime selection of a built-in projection, e.g. from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionKind {
    #[default]
    LatLong,
    SkyLatLong,
    SkyAngular,
}

impl Projection for ProjectionKind {
    fn image2world(&self, u: f64, v: f64) -> WorldSample {
        match self {
            ProjectionKind::LatLong => LatLong.image2world(u, v),
            ProjectionKind::SkyLatLong => SkyLatLong.image2world(u, v),
            ProjectionKind::SkyAngular => SkyAngular.image2world(u, v),
        }
    }
}

/// A radiance image together with the projection that gives its pixels meaning.
#[derive(Debug, Clone)]
pub struct EnvironmentMap<P> {
    pub image: RadianceImage,
    pub projection: P,
}

impl<P: Projection> EnvironmentMap<P> {
    pub fn new(image: RadianceImage, projection: P) -> Self {
        Self { image, projection }
    }

    /// Direction through the fractional pixel position (row, col).
    pub fn pixel_direction(&self, row: f64, col: f64) -> WorldSample {
        let (u, v) = texture_coords(row, col, self.image.width(), self.image.height());
        self.projection.image2world(u, v)
    }
}

/// Normalises a fractional pixel position into `(u, v)` texture coordinates.
pub fn texture_coords(row: f64, col: f64, width: usize, height: usize) -> (f64, f64) {
    (col / width as f64, row / height as f64)
}
