//! Moving-average smoothing with edge-replication padding.

/// Apply a centered moving average of window `2 * half_window + 1`.
///
/// The series is padded by repeating its first value `half_window` times on
/// the left and its last value on the right, so the output has the same
/// length as the input and the boundaries are not biased toward zero.
/// `half_window == 0` is the identity.
pub fn moving_average(values: &[f64], half_window: usize) -> Vec<f64> {
    if half_window == 0 || values.is_empty() {
        return values.to_vec();
    }

    let window = 2 * half_window + 1;

    let mut padded = Vec::with_capacity(values.len() + 2 * half_window);
    padded.extend(std::iter::repeat(values[0]).take(half_window));
    padded.extend_from_slice(values);
    padded.extend(std::iter::repeat(values[values.len() - 1]).take(half_window));

    padded
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}
