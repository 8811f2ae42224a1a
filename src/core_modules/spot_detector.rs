// THEORY:
// The `spot_detector` is the engine of the image path. It finds the sun in a
// panoramic radiance image by looking for the largest compact patch of extreme
// brightness, then reports that patch's intensity-weighted centre of mass.
//
// Key architectural principles & algorithm steps:
// 1.  **Smoothing**: a Gaussian blur (sigma = 5 px by default) suppresses sensor
//     noise and single hot pixels before anything is ranked.
// 2.  **Intensity**: the smoothed channels collapse into Rec. 601 luma.
// 3.  **Adaptive threshold**: the threshold is a high percentile (99.99 by default)
//     of intensity over the *valid* pixels only, i.e. those whose original red
//     channel is positive. Masked regions never drag the percentile down.
// 4.  **Grouping**: pixels strictly above the threshold are labelled into
//     8-connected components.
// 5.  **Selection**: the sun is assumed to be the single largest bright patch, even
//     when saturated or partly occluded. Specular glints and noise form smaller
//     patches and lose. Equal areas resolve to the component that starts first in
//     raster order.
// 6.  **Localisation**: the centre of mass of the winning patch, weighted by
//     intensity, gives a sub-pixel (row, col).
// 7.  **Stateless Utility**: every call allocates its own temporaries and keeps
//     nothing afterwards.

use crate::core_modules::error::{Result, SunFinderError};
use crate::core_modules::gaussian::{DEFAULT_TRUNCATE, gaussian_filter_spatial};
use crate::core_modules::labeling::{component_areas, connected_components, largest_component};
use crate::core_modules::percentile::percentile;
use crate::core_modules::radiance::RadianceImage;
use crate::core_modules::radiance::luma::intensity_map;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIGMA: f64 = 5.0;
pub const DEFAULT_MIN_PERCENTILE: f64 = 99.99;

/// Tunable parameters of the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Standard deviation of the Gaussian blur, in pixels.
    pub sigma: f64,
    /// Kernel half-width in multiples of `sigma`.
    pub truncate: f64,
    /// Percentile of valid-pixel intensity used as the brightness threshold.
    pub min_percentile: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            truncate: DEFAULT_TRUNCATE,
            min_percentile: DEFAULT_MIN_PERCENTILE,
        }
    }
}

/// The detected sun location in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLocation {
    /// Fractional row of the centre of mass.
    pub row: f64,
    /// Fractional column of the centre of mass.
    pub col: f64,
    /// Number of pixels in the selected component.
    pub area: usize,
    /// Intensity threshold the component was cut at.
    pub threshold: f64,
}

pub mod spot_detector {
    use super::*;

    /// Finds the sun with default smoothing and the given percentile.
    pub fn find_brightest_spot(image: &RadianceImage, min_percentile: f64) -> Result<SpotLocation> {
        find_brightest_spot_with(
            image,
            &DetectorConfig {
                min_percentile,
                ..DetectorConfig::default()
            },
        )
    }

    pub fn find_brightest_spot_with(
        image: &RadianceImage,
        config: &DetectorConfig,
    ) -> Result<SpotLocation> {
        let min_percentile = config.min_percentile;
        if !min_percentile.is_finite() || min_percentile <= 0.0 || min_percentile >= 100.0 {
            return Err(SunFinderError::InvalidPercentile(min_percentile));
        }
        let (sigma, truncate) = (config.sigma, config.truncate);
        if !(sigma.is_finite() && sigma > 0.0 && truncate.is_finite() && truncate > 0.0) {
            return Err(SunFinderError::InvalidSmoothing { sigma, truncate });
        }

        // --- 1. Smoothing & Intensity ---
        let smoothed = gaussian_filter_spatial(&image.data(), sigma, truncate);
        let intensity = intensity_map(&smoothed.view());

        // --- 2. Threshold over valid pixels only ---
        let mut valid_intensity = Vec::with_capacity(image.valid_pixel_count());
        Zip::from(&intensity)
            .and(&image.channel(0))
            .for_each(|&value, &red| {
                if red > 0.0 {
                    valid_intensity.push(value);
                }
            });
        let threshold =
            percentile(&mut valid_intensity, min_percentile).ok_or(SunFinderError::EmptyImage)?;

        // --- 3. Grouping ---
        let bright = intensity.mapv(|value| (value as f64) > threshold);
        let labels = connected_components(&bright.view());

        // --- 4. Selection ---
        let areas = component_areas(&labels);
        let (label, area) = largest_component(&areas).ok_or(SunFinderError::NoBrightRegion)?;
        log::debug!(
            "threshold {threshold:.6} at p{min_percentile}: {} components, largest is #{label} with {area} px",
            labels.count
        );

        // --- 5. Localisation ---
        let (row, col) =
            center_of_mass(&intensity, &labels.map, label).ok_or(SunFinderError::NoBrightRegion)?;

        Ok(SpotLocation {
            row,
            col,
            area,
            threshold,
        })
    }

    /// Intensity-weighted centre of mass of the pixels carrying `label`.
    /// `None` when the region has no positive weight.
    pub fn center_of_mass(
        intensity: &Array2<f32>,
        label_map: &Array2<usize>,
        label: usize,
    ) -> Option<(f64, f64)> {
        let mut total = 0.0;
        let mut row_moment = 0.0;
        let mut col_moment = 0.0;

        Zip::indexed(intensity)
            .and(label_map)
            .for_each(|(row, col), &weight, &pixel_label| {
                if pixel_label == label {
                    let weight = weight as f64;
                    total += weight;
                    row_moment += row as f64 * weight;
                    col_moment += col as f64 * weight;
                }
            });

        if total > 0.0 {
            Some((row_moment / total, col_moment / total))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::spot_detector::*;
    use super::*;
    use approx::assert_abs_diff_eq;

    const SUN: [f32; 3] = [1000.0, 1000.0, 1000.0];
    const SKY: [f32; 3] = [0.2, 0.3, 0.6];

    fn sky(height: usize, width: usize) -> RadianceImage {
        let mut image = RadianceImage::zeros(height, width).unwrap();
        image.fill_region(0..height, 0..width, SKY);
        image
    }

    #[test]
    fn single_square_is_found_at_its_center() {
        let mut image = RadianceImage::zeros(80, 80).unwrap();
        image.fill_region(20..35, 40..55, SUN);

        let spot = find_brightest_spot(&image, DEFAULT_MIN_PERCENTILE).unwrap();
        assert_abs_diff_eq!(spot.row, 27.0, epsilon = 1.0);
        assert_abs_diff_eq!(spot.col, 47.0, epsilon = 1.0);
    }

    #[test]
    fn even_square_gives_fractional_center() {
        let mut image = sky(80, 80);
        image.fill_region(30..46, 30..46, SUN);

        let spot = find_brightest_spot(&image, 99.0).unwrap();
        assert_abs_diff_eq!(spot.row, 37.5, epsilon = 0.25);
        assert_abs_diff_eq!(spot.col, 37.5, epsilon = 0.25);
        assert!(spot.row.fract() != 0.0);
    }

    #[test]
    fn larger_patch_wins_over_brighter_smaller_patch() {
        let mut image = sky(120, 120);
        image.fill_region(28..33, 28..33, [50.0, 50.0, 50.0]);
        image.fill_region(68..93, 68..93, [1.0, 1.0, 1.0]);

        let spot = find_brightest_spot(&image, 90.0).unwrap();
        assert_abs_diff_eq!(spot.row, 80.0, epsilon = 1.0);
        assert_abs_diff_eq!(spot.col, 80.0, epsilon = 1.0);
    }

    #[test]
    fn masked_pixels_do_not_lower_the_threshold() {
        // Only the upper band is valid; the sun sits inside it.
        let mut image = RadianceImage::zeros(100, 100).unwrap();
        image.fill_region(0..30, 0..100, SKY);
        image.fill_region(8..23, 60..75, SUN);
        image.fill_region(60..100, 0..100, [0.0, 5.0, 5.0]);

        let spot = find_brightest_spot(&image, DEFAULT_MIN_PERCENTILE).unwrap();
        assert_abs_diff_eq!(spot.col, 67.0, epsilon = 1.0);
        assert!(spot.row < 30.0);
    }

    #[test]
    fn no_valid_pixels_is_an_empty_image() {
        let mut image = RadianceImage::zeros(20, 20).unwrap();
        image.fill_region(0..20, 0..20, [0.0, 1.0, 1.0]);

        let result = find_brightest_spot(&image, DEFAULT_MIN_PERCENTILE);
        assert!(matches!(result, Err(SunFinderError::EmptyImage)));
    }

    #[test]
    fn uniform_image_has_no_bright_region() {
        let image = sky(30, 30);
        let result = find_brightest_spot(&image, 50.0);
        assert!(matches!(result, Err(SunFinderError::NoBrightRegion)));
    }

    #[test]
    fn percentile_must_be_inside_open_interval() {
        let image = sky(10, 10);
        for pct in [0.0, 100.0, -1.0, f64::NAN] {
            let result = find_brightest_spot(&image, pct);
            assert!(matches!(result, Err(SunFinderError::InvalidPercentile(_))));
        }
    }

    #[test]
    fn smoothing_parameters_must_be_finite_and_positive() {
        let image = sky(10, 10);
        let bad = [
            (f64::INFINITY, DEFAULT_TRUNCATE),
            (f64::NAN, DEFAULT_TRUNCATE),
            (-1.0, DEFAULT_TRUNCATE),
            (0.0, DEFAULT_TRUNCATE),
            (DEFAULT_SIGMA, f64::INFINITY),
            (DEFAULT_SIGMA, 0.0),
        ];
        for (sigma, truncate) in bad {
            let config = DetectorConfig {
                sigma,
                truncate,
                ..DetectorConfig::default()
            };
            let result = find_brightest_spot_with(&image, &config);
            assert!(matches!(result, Err(SunFinderError::InvalidSmoothing { .. })));
        }
    }

    #[test]
    fn center_of_mass_weights_by_intensity() {
        let intensity = Array2::from_shape_vec((1, 3), vec![1.0f32, 0.0, 3.0]).unwrap();
        let labels = Array2::from_shape_vec((1, 3), vec![1usize, 1, 1]).unwrap();
        let (row, col) = center_of_mass(&intensity, &labels, 1).unwrap();
        assert_abs_diff_eq!(row, 0.0);
        assert_abs_diff_eq!(col, 1.5);
        assert_eq!(center_of_mass(&intensity, &labels, 2), None);
    }
}
