//! Exercise-boundary post-processing filters.
//!
//! Fixed-point iteration of the double-boundary integral equations leaves
//! small non-monotonicities and high-frequency noise on the boundary curves.
//! Two passes repair them: Pool-Adjacent-Violators isotonic regression
//! restores monotonicity with minimal mean-squared deviation, and a 5-point
//! Savitzky-Golay filter suppresses the remaining iteration noise.

use am_core::Real;

/// In-place isotonic regression to a non-decreasing sequence.
///
/// Pool-Adjacent-Violators: adjacent pools whose means violate the ordering
/// are merged into their weighted average. O(n) with flat pool-sum /
/// pool-size arrays.
pub fn isotonic_non_decreasing(y: &mut [Real]) {
    let n = y.len();
    if n <= 1 {
        return;
    }

    // pool_sum[p] / pool_len[p] is the mean of pool p
    let mut pool_sum = vec![0.0; n];
    let mut pool_len = vec![0usize; n];
    let mut pools = 0usize;

    for i in 0..n {
        pool_sum[pools] = y[i];
        pool_len[pools] = 1;
        pools += 1;
        while pools > 1
            && pool_sum[pools - 2] * pool_len[pools - 1] as Real
                > pool_sum[pools - 1] * pool_len[pools - 2] as Real
        {
            pool_sum[pools - 2] += pool_sum[pools - 1];
            pool_len[pools - 2] += pool_len[pools - 1];
            pools -= 1;
        }
    }

    let mut i = 0;
    for p in 0..pools {
        let mean = pool_sum[p] / pool_len[p] as Real;
        for _ in 0..pool_len[p] {
            y[i] = mean;
            i += 1;
        }
    }
}

/// In-place isotonic regression to a non-increasing sequence.
pub fn isotonic_non_increasing(y: &mut [Real]) {
    for v in y.iter_mut() {
        *v = -*v;
    }
    isotonic_non_decreasing(y);
    for v in y.iter_mut() {
        *v = -*v;
    }
}

/// In-place 5-point Savitzky-Golay smoothing.
///
/// Interior points use the quadratic/cubic least-squares weights
/// `[−3, 12, 17, 12, −3]/35`; the second point from each end falls back to a
/// 3-point average, and the endpoints are left untouched (they carry the
/// τ→0 limit and the terminal value consumed by the acceptance gate).
/// Sequences shorter than 5 are returned unchanged.
pub fn savitzky_golay_5(y: &mut [Real]) {
    let n = y.len();
    if n < 5 {
        return;
    }
    let src = y.to_vec();
    for i in 2..n - 2 {
        y[i] = (-3.0 * (src[i - 2] + src[i + 2]) + 12.0 * (src[i - 1] + src[i + 1])
            + 17.0 * src[i])
            / 35.0;
    }
    y[1] = (src[0] + src[1] + src[2]) / 3.0;
    y[n - 2] = (src[n - 3] + src[n - 2] + src[n - 1]) / 3.0;
}
