// THEORY:
// The detector's threshold is an order statistic of the valid-pixel intensities.
// It interpolates linearly between the two closest ranks, `rank = (n - 1) * p / 100`,
// and uses selection rather than a full sort, so it runs in expected linear time.

/// Returns the `pct`-th percentile of `values`, or `None` when there are no
/// samples. `values` is reordered in place. `pct` is clamped to `[0, 100]`.
pub fn percentile(values: &mut [f32], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let pct = pct.clamp(0.0, 100.0);
    let rank = (values.len() - 1) as f64 * pct / 100.0;
    let lower_rank = rank.floor() as usize;
    let fraction = rank - lower_rank as f64;

    let (_, lower, above) = values.select_nth_unstable_by(lower_rank, |a, b| a.total_cmp(b));
    let lower = *lower as f64;

    if fraction == 0.0 || above.is_empty() {
        return Some(lower);
    }

    // Everything above the selected rank is >= it, so the next rank is their minimum.
    let upper = above
        .iter()
        .copied()
        .fold(f32::INFINITY, f32::min) as f64;

    Some(lower + (upper - lower) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_input_has_no_percentile() {
        assert_eq!(percentile(&mut [], 50.0), None);
    }

    #[test]
    fn single_value_is_every_percentile() {
        assert_eq!(percentile(&mut [4.0], 0.0), Some(4.0));
        assert_eq!(percentile(&mut [4.0], 99.99), Some(4.0));
    }

    #[test]
    fn interpolates_between_closest_ranks() {
        let mut values = [4.0, 1.0, 3.0, 2.0];
        // rank = 3 * 0.5 = 1.5 -> halfway between 2 and 3
        assert_relative_eq!(percentile(&mut values, 50.0).unwrap(), 2.5);

        let mut values = [10.0, 0.0, 5.0, 20.0, 15.0];
        // rank = 4 * 0.9 = 3.6 -> 15 + 0.6 * 5
        assert_relative_eq!(percentile(&mut values, 90.0).unwrap(), 18.0, epsilon = 1e-9);
    }

    #[test]
    fn extremes_are_min_and_max() {
        let mut values = [7.0, -2.0, 9.5, 3.0];
        assert_eq!(percentile(&mut values, 0.0), Some(-2.0));
        assert_eq!(percentile(&mut values, 100.0), Some(9.5));
    }

    #[test]
    fn high_percentile_sits_between_the_two_largest() {
        let mut values: Vec<f32> = (0..10_000).map(|i| i as f32).collect();
        values.reverse();
        let p = percentile(&mut values, 99.99).unwrap();
        assert!(p > 9998.0 && p < 9999.0);
    }

    #[test]
    fn repeated_values_are_stable() {
        let mut values = [1.0; 16];
        assert_eq!(percentile(&mut values, 99.0), Some(1.0));
    }
}
