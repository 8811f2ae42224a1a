// THEORY:
// The `radiance` module holds the two "dumb" data containers of the engine: the raw
// HDR light probe (`RadianceImage`) and the single-channel intensity map derived
// from it. Nothing here looks at neighbours; spatial reasoning lives in the
// filtering, labeling and detection modules.
//
// Key architectural principles:
// 1.  **Shape is validated once**: a `RadianceImage` is always (height, width, 3)
//     with non-zero spatial extent, so downstream stages never re-check it.
// 2.  **Masking by convention**: a pixel whose red channel is exactly 0 lies outside
//     the valid field of view (below the horizon, masked by the projection, ...).
//     The image carries no separate mask; `valid_mask` derives it on demand.
// 3.  **Perceptual brightness**: intensity is the Rec. 601 luma of the three
//     channels, the same weighting the rest of the vision stack uses for brightness.

use crate::core_modules::error::{Result, SunFinderError};
use image::Rgb32FImage;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, s};
use std::ops::Range;

pub const CHANNELS: usize = 3;

/// An HDR radiance image, shape (height, width, 3), channel order R, G, B.
#[derive(Debug, Clone, PartialEq)]
pub struct RadianceImage {
    data: Array3<f32>,
}

impl RadianceImage {
    pub fn new(data: Array3<f32>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        if channels != CHANNELS {
            return Err(SunFinderError::InvalidShape(format!(
                "expected {CHANNELS} channels, got {channels}"
            )));
        }
        if height == 0 || width == 0 {
            return Err(SunFinderError::InvalidShape(format!(
                "image has no pixels ({height}x{width})"
            )));
        }
        Ok(Self { data })
    }

    /// A black image. Every pixel starts out masked (R = 0).
    pub fn zeros(height: usize, width: usize) -> Result<Self> {
        Self::new(Array3::zeros((height, width, CHANNELS)))
    }

    /// Converts a decoded float image from the `image` crate.
    pub fn from_rgb32f(buffer: &Rgb32FImage) -> Result<Self> {
        let (width, height) = buffer.dimensions();
        let data = Array3::from_shape_vec(
            (height as usize, width as usize, CHANNELS),
            buffer.as_raw().clone(),
        )
        .map_err(|e| SunFinderError::InvalidShape(e.to_string()))?;
        Self::new(data)
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    pub fn channel(&self, index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(2), index)
    }

    /// Pixels that take part in brightness statistics: red channel strictly positive.
    pub fn valid_mask(&self) -> Array2<bool> {
        self.channel(0).mapv(|r| r > 0.0)
    }

    pub fn valid_pixel_count(&self) -> usize {
        self.channel(0).iter().filter(|&&r| r > 0.0).count()
    }

    /// Paints a rectangular region with a constant colour. Ranges are clipped to
    /// the image bounds.
    pub fn fill_region(&mut self, rows: Range<usize>, cols: Range<usize>, rgb: [f32; 3]) {
        let rows = rows.start.min(self.height())..rows.end.min(self.height());
        let cols = cols.start.min(self.width())..cols.end.min(self.width());
        let mut region = self.data.slice_mut(s![rows, cols, ..]);
        for mut pixel in region.lanes_mut(Axis(2)) {
            pixel[0] = rgb[0];
            pixel[1] = rgb[1];
            pixel[2] = rgb[2];
        }
    }
}

pub mod luma {
    use super::*;

    pub const LUMA_RED: f32 = 0.299;
    pub const LUMA_GREEN: f32 = 0.587;
    pub const LUMA_BLUE: f32 = 0.114;

    /// Rec. 601 luma of a single linear RGB triple.
    pub fn luminance(red: f32, green: f32, blue: f32) -> f32 {
        LUMA_RED * red + LUMA_GREEN * green + LUMA_BLUE * blue
    }

    /// Collapses an (height, width, 3) array into its intensity map.
    pub fn intensity_map(rgb: &ArrayView3<f32>) -> Array2<f32> {
        rgb.map_axis(Axis(2), |pixel| luminance(pixel[0], pixel[1], pixel[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::luma::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_wrong_channel_count() {
        let result = RadianceImage::new(Array3::zeros((4, 4, 4)));
        assert!(matches!(result, Err(SunFinderError::InvalidShape(_))));
    }

    #[test]
    fn rejects_empty_extent() {
        let result = RadianceImage::new(Array3::zeros((0, 8, 3)));
        assert!(matches!(result, Err(SunFinderError::InvalidShape(_))));
    }

    #[test]
    fn converts_from_image_buffer_in_row_major_order() {
        let mut buffer = Rgb32FImage::new(5, 3);
        buffer.put_pixel(4, 1, image::Rgb([1.0, 2.0, 3.0]));
        let radiance = RadianceImage::from_rgb32f(&buffer).unwrap();

        assert_eq!(radiance.height(), 3);
        assert_eq!(radiance.width(), 5);
        assert_eq!(radiance.data()[[1, 4, 0]], 1.0);
        assert_eq!(radiance.data()[[1, 4, 2]], 3.0);
    }

    #[test]
    fn fill_region_clips_and_marks_valid_pixels() {
        let mut radiance = RadianceImage::zeros(10, 10).unwrap();
        radiance.fill_region(8..20, 0..2, [1.0, 0.0, 0.0]);

        assert_eq!(radiance.valid_pixel_count(), 4);
        assert!(radiance.valid_mask()[[9, 1]]);
        assert!(!radiance.valid_mask()[[7, 1]]);
    }

    #[test]
    fn luma_weights_sum_to_one() {
        assert_relative_eq!(luminance(1.0, 1.0, 1.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn intensity_map_weights_each_channel() {
        let mut radiance = RadianceImage::zeros(2, 2).unwrap();
        radiance.fill_region(0..1, 0..1, [1.0, 0.0, 0.0]);
        radiance.fill_region(0..1, 1..2, [0.0, 1.0, 0.0]);
        radiance.fill_region(1..2, 0..1, [0.0, 0.0, 1.0]);

        let intensity = intensity_map(&radiance.data());
        assert_relative_eq!(intensity[[0, 0]], LUMA_RED);
        assert_relative_eq!(intensity[[0, 1]], LUMA_GREEN);
        assert_relative_eq!(intensity[[1, 0]], LUMA_BLUE);
        assert_eq!(intensity[[1, 1]], 0.0);
    }
}
