pub mod image_helper {
    use crate::core_modules::error::Result;
    use crate::core_modules::radiance::RadianceImage;
    use crate::core_modules::spot_detector::SpotLocation;
    use image::ImageEncoder;
    use std::path::Path;

    const MARKER_RADIUS: isize = 6;
    const MARKER_COLOR: [u8; 4] = [255, 0, 255, 255];

    /// Decodes any format the `image` crate understands (Radiance HDR, OpenEXR,
    /// PNG, ...) into linear float radiance.
    pub fn load_radiance<P: AsRef<Path>>(path: P) -> Result<RadianceImage> {
        let decoded = image::open(path)?;
        RadianceImage::from_rgb32f(&decoded.into_rgb32f())
    }

    /// Reinhard tone mapping followed by a 2.2 gamma, into an RGBA8 buffer.
    pub fn tone_map(image: &RadianceImage, exposure: f32) -> Vec<u8> {
        let data = image.data();
        let mut buffer = Vec::with_capacity(image.width() * image.height() * 4);
        for row in 0..image.height() {
            for col in 0..image.width() {
                for channel in 0..3 {
                    let value = (data[[row, col, channel]] * exposure).max(0.0);
                    let mapped = (value / (1.0 + value)).powf(1.0 / 2.2);
                    buffer.push((mapped * 255.0).round() as u8);
                }
                buffer.push(255);
            }
        }
        buffer
    }

    /// Draws a cross centred on the spot.
    pub fn mark_spot(buffer: &mut [u8], width: usize, height: usize, spot: &SpotLocation) {
        let center_row = spot.row.round() as isize;
        let center_col = spot.col.round() as isize;
        for offset in -MARKER_RADIUS..=MARKER_RADIUS {
            for (row, col) in [
                (center_row + offset, center_col),
                (center_row, center_col + offset),
            ] {
                if row < 0 || col < 0 || row >= height as isize || col >= width as isize {
                    continue;
                }
                let index = (row as usize * width + col as usize) * 4;
                buffer[index..index + 4].copy_from_slice(&MARKER_COLOR);
            }
        }
    }

    pub fn save(path: &Path, width: u32, height: u32, buffer: &[u8]) -> Result<()> {
        let output = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

        Ok(())
    }

    /// Writes a tone-mapped PNG of the probe, with the sun marked when known.
    pub fn save_preview(
        path: &Path,
        image: &RadianceImage,
        spot: Option<&SpotLocation>,
        exposure: f32,
    ) -> Result<()> {
        let mut buffer = tone_map(image, exposure);
        if let Some(spot) = spot {
            mark_spot(&mut buffer, image.width(), image.height(), spot);
        }
        save(path, image.width() as u32, image.height() as u32, &buffer)
    }
}
