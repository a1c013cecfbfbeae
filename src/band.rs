//! Discretization of the observing band into channel and subband edges.
//!
//! Edges are ordered by increasing frequency. The ordering matters: "high
//! frequency arrives first" is baked into the delay sign convention in
//! [`crate::delay`].

/// Split `[f_low, f_high]` into `n` equal-width, contiguous (lo, hi)
/// pairs. `n` must be at least 1.
pub fn uniform_edges(f_low_mhz: f64, f_high_mhz: f64, n: usize) -> Vec<(f64, f64)> {
    assert!(n >= 1, "cannot split a band into 0 subbands");
    let width = (f_high_mhz - f_low_mhz) / n as f64;
    (0..n)
        .map(|k| {
            // Both edges come from the same expression so that
            // edge[i].1 == edge[i + 1].0 exactly.
            (
                f_low_mhz + k as f64 * width,
                f_low_mhz + (k + 1) as f64 * width,
            )
        })
        .collect()
}

/// Build fine-channel (lo, hi) pairs by stepping from `f_low` towards
/// `f_high` in increments of `df`.
///
/// Only full-width channels are emitted; a trailing partial channel (when
/// `df` doesn't exactly divide the bandwidth) is discarded rather than
/// searched at reduced width. The last kept channel's upper edge is
/// clipped to `f_high` so rounding can't push it past the band.
pub fn channel_edges(f_low_mhz: f64, f_high_mhz: f64, df_mhz: f64) -> Vec<(f64, f64)> {
    // Tolerance so an exactly-dividing df isn't lost to accumulated
    // rounding in f_low + k * df.
    let tol = df_mhz * 1e-9;

    let mut edges = Vec::new();
    let mut k = 0usize;
    loop {
        let lo = f_low_mhz + k as f64 * df_mhz;
        let hi = f_low_mhz + (k + 1) as f64 * df_mhz;
        if hi > f_high_mhz + tol {
            break;
        }
        edges.push((lo, hi.min(f_high_mhz)));
        k += 1;
    }
    edges
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn uniform_edges_cover_the_band_contiguously() {
        let edges = uniform_edges(110.0, 190.0, 32);
        assert_eq!(edges.len(), 32);
        assert_eq!(edges[0].0, 110.0);
        assert_abs_diff_eq!(edges[31].1, 190.0);
        for pair in edges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        let width = edges[0].1 - edges[0].0;
        assert_abs_diff_eq!(width, 80.0 / 32.0);
    }

    #[test]
    fn exactly_dividing_df_gives_full_coverage() {
        // 0.25 MHz divides the 80 MHz band into exactly 320 channels.
        let edges = channel_edges(110.0, 190.0, 0.25);
        assert_eq!(edges.len(), 320);
        assert_eq!(edges[0], (110.0, 110.25));
        assert_abs_diff_eq!(edges[319].1, 190.0);
    }

    #[test]
    fn partial_tail_channel_is_discarded() {
        // 80 / 0.195 = 410.256...; the 0.05 MHz remainder is dropped.
        let edges = channel_edges(110.0, 190.0, 0.195);
        assert_eq!(edges.len(), 410);
        let (last_lo, last_hi) = edges[409];
        assert_abs_diff_eq!(last_lo, 110.0 + 409.0 * 0.195, epsilon = 1e-9);
        assert!(last_hi <= 190.0);
        assert_abs_diff_eq!(last_hi - last_lo, 0.195, epsilon = 1e-9);
    }

    #[test]
    fn channels_are_contiguous_and_increasing() {
        let edges = channel_edges(110.0, 190.0, 0.195);
        for pair in edges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
            assert!(pair[1].0 > pair[0].0);
        }
    }
}
