/// Discrete acceleration `a[k] = x[k+1] - 2 x[k] + x[k-1]` for interior samples.
///
/// Both ends are zero-padded, and inputs shorter than three samples map to
/// an all-zero sequence of the same length.
pub fn second_difference(position: &[f64]) -> Vec<f64> {
    let mut accel = vec![0.0; position.len()];
    if position.len() < 3 {
        return accel;
    }

    for (k, window) in position.windows(3).enumerate() {
        accel[k + 1] = window[2] - 2.0 * window[1] + window[0];
    }

    accel
}
