//! Signal transforms applied before and after differentiation.
//!
//! - Angle unwrapping for circular heading signals
//! - Exponential moving average smoothing

/// Remove ±360° jumps from a heading sequence.
///
/// A step of more than +180° between consecutive raw values is read as a wrap
/// in the negative direction, a step of less than -180° as a wrap in the
/// positive direction. Corrections accumulate in a running offset that is
/// added to every later value, so the output is continuous and the first
/// value passes through unchanged.
///
/// # Arguments
///
/// * `angles_deg` - Raw heading samples in degrees
///
/// # Returns
///
/// Unwrapped headings, same length as the input.
///
/// # Example
///
/// ```
/// use motion_pipeline::core::transforms::unwrap_angles;
///
/// assert_eq!(unwrap_angles(&[179.0, -179.0, 179.0]), vec![179.0, 181.0, 179.0]);
/// ```
pub fn unwrap_angles(angles_deg: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(angles_deg.len());
    let Some(&first) = angles_deg.first() else {
        return out;
    };

    let mut offset = 0.0;
    let mut prev = first;
    out.push(first);

    for &raw in &angles_deg[1..] {
        let delta = raw - prev;
        if delta > 180.0 {
            offset -= 360.0;
        } else if delta < -180.0 {
            offset += 360.0;
        }
        out.push(raw + offset);
        prev = raw;
    }

    out
}

/// Exponential moving average.
///
/// `out[0] = values[0]` and `out[i] = alpha * values[i] + (1 - alpha) * out[i - 1]`.
/// Higher alpha follows the input more closely; `alpha = 1.0` is the identity.
///
/// # Arguments
///
/// * `values` - Input samples
/// * `alpha` - Smoothing factor in (0, 1]
pub fn ema(values: &[f64], alpha: f64) -> Vec<f64> {
    debug_assert!(alpha > 0.0 && alpha <= 1.0, "alpha must be in (0, 1]");

    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter().copied();

    if let Some(first) = iter.next() {
        let mut acc = first;
        out.push(acc);
        for v in iter {
            acc = alpha * v + (1.0 - alpha) * acc;
            out.push(acc);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_positive_to_negative_wrap() {
        let out = unwrap_angles(&[179.0, -179.0, 179.0]);
        assert_eq!(out, vec![179.0, 181.0, 179.0]);
    }

    #[test]
    fn test_unwrap_negative_to_positive_wrap() {
        let out = unwrap_angles(&[-170.0, 170.0, 160.0]);
        assert_eq!(out, vec![-170.0, -190.0, -200.0]);
    }

    #[test]
    fn test_unwrap_accumulates_over_full_turns() {
        // Steady clockwise spin through two wraps
        let raw = [150.0, -150.0, -90.0, 0.0, 90.0, 179.0, -120.0];
        let out = unwrap_angles(&raw);
        assert_eq!(out, vec![150.0, 210.0, 270.0, 360.0, 450.0, 539.0, 600.0]);
    }

    #[test]
    fn test_unwrap_is_idempotent() {
        let raw = [10.0, 170.0, -175.0, -20.0, 175.0, -178.0, 179.0];
        let once = unwrap_angles(&raw);
        let twice = unwrap_angles(&once);
        assert_eq!(once, twice);

        for pair in once.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 180.0);
        }
    }

    #[test]
    fn test_unwrap_exact_half_turn_not_corrected() {
        assert_eq!(unwrap_angles(&[0.0, 180.0, 0.0]), vec![0.0, 180.0, 0.0]);
    }

    #[test]
    fn test_unwrap_empty_and_single() {
        assert!(unwrap_angles(&[]).is_empty());
        assert_eq!(unwrap_angles(&[-42.0]), vec![-42.0]);
    }

    #[test]
    fn test_ema_first_value_passes_through() {
        let out = ema(&[7.0, 0.0, 0.0], 0.2);
        assert_eq!(out[0], 7.0);
        assert!((out[1] - 5.6).abs() < 1e-12);
        assert!((out[2] - 4.48).abs() < 1e-12);
    }

    #[test]
    fn test_ema_constant_input() {
        let out = ema(&[3.25; 20], 0.2);
        assert_eq!(out.len(), 20);
        assert!(out.iter().all(|&v| (v - 3.25).abs() < 1e-12));

        // Exactly representable split stays exact
        let out = ema(&[8.0; 5], 0.5);
        assert!(out.iter().all(|&v| v == 8.0));
    }

    #[test]
    fn test_ema_alpha_one_is_identity() {
        let input = [1.0, -4.0, 9.5, 0.0];
        assert_eq!(ema(&input, 1.0), input.to_vec());
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema(&[], 0.5).is_empty());
    }
}
