//! Slicing, resampling and smoothing kernels.

/// Evenly spaced samples over `[start, stop]`, both endpoints included.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + i as f64 * step).collect();
            values[count - 1] = stop;
            values
        }
    }
}

/// Piecewise-linear interpolation of `(xp, fp)` at each of `x`.
///
/// `xp` must be increasing. Points outside the table take the value at the
/// nearest end. An empty table yields zeros.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    let len = xp.len().min(fp.len());
    if len == 0 {
        return vec![0.0; x.len()];
    }
    let (xp, fp) = (&xp[..len], &fp[..len]);

    x.iter()
        .map(|&x| {
            if x.is_nan() {
                return f64::NAN;
            }
            if x <= xp[0] {
                return fp[0];
            }
            if x >= xp[len - 1] {
                return fp[len - 1];
            }
            let upper = xp.partition_point(|&p| p <= x);
            let lower = upper - 1;
            let span = xp[upper] - xp[lower];
            if span == 0.0 {
                return fp[lower];
            }
            let t = (x - xp[lower]) / span;
            fp[lower] + t * (fp[upper] - fp[lower])
        })
        .collect()
}

/// Bucketed maximum of `y` over the target `points`.
///
/// Bucket `j` collects the samples with `points[j] <= x < points[j + 1]`;
/// the last bucket is open above and samples below `points[0]` are dropped.
/// Buckets nothing falls into resolve to 0.
pub fn resample(x: &[f64], y: &[f64], points: &[f64]) -> Vec<f64> {
    let mut buckets: Vec<Option<f64>> = vec![None; points.len()];

    for (&x, &y) in x.iter().zip(y) {
        let index = points.partition_point(|&p| p <= x);
        if index == 0 {
            continue;
        }
        let bucket = &mut buckets[index - 1];
        *bucket = Some(bucket.map_or(y, |current| current.max(y)));
    }

    buckets.into_iter().map(|b| b.unwrap_or(0.0)).collect()
}

fn slice_index(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        (index as usize).min(len)
    }
}

/// `input[start:stop]` with negative indices counting from the end.
pub fn slice(input: &[f64], start: Option<isize>, stop: Option<isize>) -> Vec<f64> {
    let len = input.len();
    let start = start.map_or(0, |i| slice_index(i, len));
    let stop = stop.map_or(len, |i| slice_index(i, len));
    if start >= stop {
        return Vec::new();
    }
    input[start..stop].to_vec()
}

/// `input` followed by its reverse, or preceded by it when `right_side` is
/// false.
pub fn mirror(input: &[f64], right_side: bool) -> Vec<f64> {
    let reversed = input.iter().rev();
    if right_side {
        input.iter().chain(reversed).copied().collect()
    } else {
        reversed.chain(input.iter()).copied().collect()
    }
}

/// Circular shift towards higher indices by `amount`.
pub fn roll(input: &[f64], amount: isize) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut output = input.to_vec();
    let shift = amount.rem_euclid(input.len() as isize) as usize;
    output.rotate_right(shift);
    output
}

/// Split `input` into rows of `width` and take the maximum of each column.
///
/// A trailing partial row is ignored.
pub fn fold_max(input: &[f64], width: usize) -> Vec<f64> {
    if width == 0 {
        return Vec::new();
    }
    if input.len() % width != 0 {
        tracing::warn!(len = input.len(), width, "fold width does not divide input");
    }

    let mut rows = input.chunks_exact(width);
    let Some(first) = rows.next() else {
        return vec![0.0; width];
    };
    let mut folded = first.to_vec();
    for row in rows {
        for (acc, &value) in folded.iter_mut().zip(row) {
            *acc = acc.max(value);
        }
    }
    folded
}

fn reflect(index: isize, len: isize) -> usize {
    let period = 2 * len;
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i - 1;
    }
    i as usize
}

/// One-dimensional gaussian smoothing with reflect boundaries.
///
/// The kernel extends `int(4 * sigma + 0.5)` samples to either side.
pub fn gaussian_filter(input: &[f64], sigma: f64) -> Vec<f64> {
    if input.is_empty() || sigma <= 0.0 || !sigma.is_finite() {
        return input.to_vec();
    }

    let radius = (4.0 * sigma + 0.5) as isize;
    let mut weights: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }

    let len = input.len() as isize;
    (0..len)
        .map(|i| {
            weights
                .iter()
                .zip(-radius..=radius)
                .map(|(w, k)| w * input[reflect(i + k, len)])
                .sum()
        })
        .collect()
}

/// Replace NaN and infinities with 0.
pub fn mask_non_finite(input: &[f64]) -> Vec<f64> {
    input
        .iter()
        .map(|&x| if x.is_finite() { x } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn interp_is_linear_and_clamped() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 30.0];
        assert_eq!(
            interp(&[-1.0, 0.5, 1.5, 2.0, 5.0], &xp, &fp),
            vec![0.0, 5.0, 20.0, 30.0, 30.0]
        );
    }

    #[test]
    fn resample_takes_bucket_maximum() {
        let x = [0.0, 0.5, 1.0, 1.2, 2.5];
        let y = [1.0, 4.0, 2.0, 3.0, 7.0];
        let points = [0.0, 1.0, 2.0];
        assert_eq!(resample(&x, &y, &points), vec![4.0, 3.0, 7.0]);
    }

    #[test]
    fn resample_fills_empty_buckets_with_zero() {
        let x = [0.1, 3.5];
        let y = [5.0, 6.0];
        let points = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(resample(&x, &y, &points), vec![5.0, 0.0, 0.0, 6.0]);
    }

    #[test]
    fn resample_drops_samples_below_first_point() {
        assert_eq!(resample(&[-1.0], &[9.0], &[0.0, 1.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn slice_follows_array_conventions() {
        let data = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(slice(&data, None, None), data.to_vec());
        assert_eq!(slice(&data, Some(1), Some(3)), vec![1.0, 2.0]);
        assert_eq!(slice(&data, Some(-2), None), vec![3.0, 4.0]);
        assert_eq!(slice(&data, None, Some(-4)), vec![0.0]);
        assert_eq!(slice(&data, Some(4), Some(2)), Vec::<f64>::new());
        assert_eq!(slice(&data, Some(-10), Some(10)), data.to_vec());
    }

    #[test]
    fn mirror_both_sides() {
        assert_eq!(mirror(&[1.0, 2.0, 3.0], true), vec![1.0, 2.0, 3.0, 3.0, 2.0, 1.0]);
        assert_eq!(mirror(&[1.0, 2.0, 3.0], false), vec![3.0, 2.0, 1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn roll_wraps_in_both_directions() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(roll(&data, 1), vec![4.0, 1.0, 2.0, 3.0]);
        assert_eq!(roll(&data, -1), vec![2.0, 3.0, 4.0, 1.0]);
        assert_eq!(roll(&data, 6), vec![3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn fold_max_reduces_columns() {
        let data = [1.0, 5.0, 3.0, 4.0, 2.0, 6.0];
        assert_eq!(fold_max(&data, 3), vec![4.0, 5.0, 6.0]);
        assert_eq!(fold_max(&data, 2), vec![3.0, 6.0]);
        assert_eq!(fold_max(&[], 2), vec![0.0, 0.0]);
    }

    #[test]
    fn gaussian_preserves_constant_signal() {
        let smoothed = gaussian_filter(&[2.0; 7], 2.0);
        assert!(smoothed.iter().all(|&x| (x - 2.0).abs() < 1e-12));
    }

    #[test]
    fn gaussian_spreads_an_impulse_symmetrically() {
        let mut impulse = vec![0.0; 21];
        impulse[10] = 1.0;
        let smoothed = gaussian_filter(&impulse, 1.0);
        let total: f64 = smoothed.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((smoothed[9] - smoothed[11]).abs() < 1e-12);
        assert!(smoothed[10] > smoothed[9]);
    }

    #[test]
    fn reflect_mirrors_about_the_edges() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
    }

    #[test]
    fn mask_non_finite_zeroes_nan_and_inf() {
        assert_eq!(
            mask_non_finite(&[1.0, f64::NAN, f64::INFINITY, -2.0]),
            vec![1.0, 0.0, 0.0, -2.0]
        );
    }
}
