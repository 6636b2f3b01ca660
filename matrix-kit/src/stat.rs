use nalgebra::DVector;

/// Median of `values` (sorts the slice). Average of the middle two for
/// an even count; `0.0` for an empty slice, which callers should guard.
pub fn median_inplace(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    let nn = values.len();
    if nn % 2 == 0 {
        (values[nn / 2 - 1] + values[nn / 2]) / 2.0
    } else {
        values[nn / 2]
    }
}

/// Mean after discarding `floor(trim_fraction * n)` values from each
/// tail (sorts the slice). Falls back to the untrimmed mean when the
/// trim would discard everything.
pub fn trimmed_mean_inplace(values: &mut [f32], trim_fraction: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    let nn = values.len();
    let cut = (nn as f32 * trim_fraction).floor() as usize;

    let kept = if 2 * cut >= nn {
        &values[..]
    } else {
        &values[cut..(nn - cut)]
    };

    kept.iter().sum::<f32>() / kept.len() as f32
}

/// Coordinate-wise median over a set of equal-length vectors
pub fn column_median(columns: &[&DVector<f32>]) -> DVector<f32> {
    if columns.is_empty() {
        return DVector::zeros(0);
    }

    let dd = columns[0].len();
    debug_assert!(
        columns.iter().all(|x| x.len() == dd),
        "ragged vectors in column_median"
    );

    DVector::from_fn(dd, |d, _| {
        let mut values = columns.iter().map(|x| x[d]).collect::<Vec<_>>();
        median_inplace(&mut values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_even_singleton() {
        assert_eq!(median_inplace(&mut [1.0, 3.0, 2.0]), 2.0);
        assert_eq!(median_inplace(&mut [1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median_inplace(&mut [5.0]), 5.0);
    }

    #[test]
    fn trimmed_mean_drops_tails() {
        // cut = floor(5 * 0.2) = 1 from each side -> mean of [2,3,4]
        let mut values = [100.0, 2.0, 3.0, 4.0, -50.0];
        assert_eq!(trimmed_mean_inplace(&mut values, 0.2), 3.0);
    }

    #[test]
    fn trimmed_mean_full_trim_falls_back() {
        let mut values = [1.0, 3.0];
        // cut = floor(2 * 0.5) = 1 each side would drop both values
        assert_eq!(trimmed_mean_inplace(&mut values, 0.5), 2.0);
    }

    #[test]
    fn trimmed_mean_zero_fraction_is_mean() {
        let mut values = [1.0, 2.0, 3.0];
        assert_eq!(trimmed_mean_inplace(&mut values, 0.0), 2.0);
    }

    #[test]
    fn column_median_per_dimension() {
        let aa = DVector::from_vec(vec![1.0, 10.0]);
        let bb = DVector::from_vec(vec![2.0, 30.0]);
        let cc = DVector::from_vec(vec![3.0, 20.0]);

        let med = column_median(&[&aa, &bb, &cc]);
        assert_eq!(med, DVector::from_vec(vec![2.0, 20.0]));
    }
}
