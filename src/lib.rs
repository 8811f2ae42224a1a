// THEORY:
// This file is the main entry point for the `sun_finder` library crate.
//
// The engine answers one question, "where is the sun?", along two independent paths:
// - from a panoramic light probe: find the largest compact patch of extreme
//   brightness, then turn its pixel location into a world direction through the
//   probe's projection;
// - from an observer's latitude, longitude and a timezone-aware timestamp, through
//   an astronomical ephemeris.
//
// Both paths report `SunAngles` in the same convention: elevation measured from the
// zenith (+Y) and azimuth as atan2(x, -z), in radians. `pipeline` is the high-level
// interface; `core_modules` holds the individual stages.

pub mod core_modules;
pub mod pipeline;

pub use core_modules::direction::sun_position_from_envmap;
pub use core_modules::ephemeris::sun_position_from_coord;
pub use core_modules::spot_detector::spot_detector::find_brightest_spot;
pub use pipeline::{FinderConfig, SunFinder, SunFinderError};
