// THEORY:
// Sensor noise and isolated hot pixels would otherwise win the brightness ranking,
// so the detector first blurs the probe with a Gaussian. The 2D kernel is
// separable: one 1D pass along the columns of every row, then one along the rows
// of every column. Channels are filtered independently and never mixed.
//
// Borders use half-sample symmetric reflection (`d c b a | a b c d | d c b a`),
// and the kernel is truncated at `truncate` standard deviations and renormalised,
// so a constant image stays exactly constant.

use ndarray::{Array3, ArrayView1, ArrayView3, ArrayViewMut1, Axis, Zip};

pub const DEFAULT_TRUNCATE: f64 = 4.0;

/// Builds a normalised 1D Gaussian kernel of length `2 * radius + 1`,
/// with `radius = floor(truncate * sigma + 0.5)`.
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as usize;
    let denominator = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / denominator).exp()
        })
        .collect();

    let total: f64 = kernel.iter().sum();
    for weight in kernel.iter_mut() {
        *weight /= total;
    }
    kernel
}

/// Maps an out-of-range index back into `0..len` by mirroring about the edges.
fn reflect_index(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let period = 2 * len;
    let mut wrapped = index.rem_euclid(period);
    if wrapped >= len {
        wrapped = period - 1 - wrapped;
    }
    wrapped as usize
}

fn convolve_lane(input: ArrayView1<f32>, mut output: ArrayViewMut1<f32>, kernel: &[f64]) {
    let len = input.len();
    let radius = (kernel.len() / 2) as isize;
    for i in 0..len {
        let mut acc = 0.0;
        for (k, &weight) in kernel.iter().enumerate() {
            let source = reflect_index(i as isize + k as isize - radius, len);
            acc += weight * input[source] as f64;
        }
        output[i] = acc as f32;
    }
}

/// Smooths every channel of an (height, width, channels) array over its two
/// spatial axes. A non-positive `sigma` returns an unfiltered copy.
pub fn gaussian_filter_spatial(image: &ArrayView3<f32>, sigma: f64, truncate: f64) -> Array3<f32> {
    if sigma <= 0.0 {
        return image.to_owned();
    }
    let kernel = gaussian_kernel(sigma, truncate);

    let mut horizontal = Array3::zeros(image.raw_dim());
    Zip::from(image.lanes(Axis(1)))
        .and(horizontal.lanes_mut(Axis(1)))
        .for_each(|src, dst| convolve_lane(src, dst, &kernel));

    let mut smoothed = Array3::zeros(image.raw_dim());
    Zip::from(horizontal.lanes(Axis(0)))
        .and(smoothed.lanes_mut(Axis(0)))
        .for_each(|src, dst| convolve_lane(src, dst, &kernel));

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let kernel = gaussian_kernel(5.0, DEFAULT_TRUNCATE);
        assert_eq!(kernel.len(), 41);
        assert_relative_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for i in 0..kernel.len() / 2 {
            assert_relative_eq!(kernel[i], kernel[kernel.len() - 1 - i]);
        }
        assert!(kernel[20] > kernel[19]);
    }

    #[test]
    fn reflection_mirrors_about_the_edges() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(-7, 1), 0);
    }

    #[test]
    fn constant_image_is_preserved() {
        let image = Array3::from_elem((12, 9, 3), 2.5f32);
        let smoothed = gaussian_filter_spatial(&image.view(), 5.0, DEFAULT_TRUNCATE);
        for &value in smoothed.iter() {
            assert_abs_diff_eq!(value, 2.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn channels_are_not_mixed() {
        let mut image = Array3::zeros((15, 15, 3));
        image[[7, 7, 1]] = 100.0f32;
        let smoothed = gaussian_filter_spatial(&image.view(), 2.0, DEFAULT_TRUNCATE);

        assert!(smoothed[[7, 7, 1]] > 0.0);
        assert!(smoothed.index_axis(Axis(2), 0).iter().all(|&v| v == 0.0));
        assert!(smoothed.index_axis(Axis(2), 2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn impulse_spreads_symmetrically_and_keeps_energy() {
        let mut image = Array3::zeros((61, 61, 3));
        image[[30, 30, 0]] = 1.0f32;
        let smoothed = gaussian_filter_spatial(&image.view(), 5.0, DEFAULT_TRUNCATE);
        let red = smoothed.index_axis(Axis(2), 0);

        assert_relative_eq!(red[[30, 25]], red[[30, 35]], epsilon = 1e-7);
        assert_relative_eq!(red[[25, 30]], red[[35, 30]], epsilon = 1e-7);
        assert!(red[[30, 30]] > red[[30, 31]]);
        assert_abs_diff_eq!(red.sum(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn zero_sigma_is_identity() {
        let mut image = Array3::zeros((4, 4, 3));
        image[[1, 2, 0]] = 3.0f32;
        let smoothed = gaussian_filter_spatial(&image.view(), 0.0, DEFAULT_TRUNCATE);
        assert_eq!(smoothed, image);
    }
}
