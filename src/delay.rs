//! The cold-plasma dispersion delay law and an empirical scattering-time
//! estimator.

use ndarray::Array2;
use rayon::prelude::*;

/// The dispersion constant \[MHz^2 pc^-1 cm^3 s\].
pub const DM_CONSTANT: f64 = 4.148064239e3;

/// The smallest DM the scattering fit may be evaluated at. The fit is
/// log-log and blows up at DM <= 0, so callers substitute this floor.
pub const SCATTER_DM_FLOOR: f64 = 0.1;

/// The exact cold-plasma dispersion delay between two frequencies
/// \[seconds\]: the time by which a pulse at `f_low_mhz` lags one at
/// `f_high_mhz`.
///
/// Callers must guarantee `f_high_mhz >= f_low_mhz > 0` and `dm >= 0`; an
/// inverted frequency pair yields a physically-meaningless negative delay.
pub fn dm_delay(dm: f64, f_high_mhz: f64, f_low_mhz: f64) -> f64 {
    DM_CONSTANT * dm * (1.0 / (f_low_mhz * f_low_mhz) - 1.0 / (f_high_mhz * f_high_mhz))
}

/// The dispersion delay \[seconds\] across every (lo, hi) edge pair for
/// every DM, as an (n_dms, n_edges) matrix. Rows are filled in parallel;
/// for a typical grid (1e3 DMs x 1e3 channels) this is the only part of
/// the computation with any real work in it.
pub fn delay_matrix(dms: &[f64], edges: &[(f64, f64)]) -> Array2<f64> {
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(dms.len());
    dms.par_iter()
        .map(|&dm| {
            edges
                .iter()
                .map(|&(lo, hi)| dm_delay(dm, hi, lo))
                .collect()
        })
        .collect_into_vec(&mut rows);

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((dms.len(), edges.len()), flat)
        .expect("shape matches by construction")
}

/// The scattering time \[seconds\] at a DM and observing frequency
/// \[GHz\], from the Bhat et al. (2004) empirical log-log fit.
///
/// The fit is undefined at `dm <= 0`; callers substitute
/// [`SCATTER_DM_FLOOR`] there. `crate::smear` does this for the
/// diagnostics curves.
pub fn scattering_time(dm: f64, f_ghz: f64) -> f64 {
    let log_dm = dm.log10();
    let log_t_us = -6.46 + 0.154 * log_dm + 1.07 * log_dm * log_dm - 3.86 * f_ghz.log10();
    10_f64.powf(log_t_us) * 1e-6
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn zero_dm_has_zero_delay() {
        assert_eq!(dm_delay(0.0, 190.0, 110.0), 0.0);
    }

    #[test]
    fn delay_is_positive_and_increases_with_dm() {
        let d1 = dm_delay(10.0, 190.0, 110.0);
        let d2 = dm_delay(20.0, 190.0, 110.0);
        assert!(d1 > 0.0);
        assert!(d2 > d1);
    }

    #[test]
    fn delay_decreases_as_f_low_approaches_f_high() {
        // Closer frequencies disperse less.
        let wide = dm_delay(100.0, 190.0, 110.0);
        let narrow = dm_delay(100.0, 190.0, 150.0);
        assert!(narrow < wide);
    }

    #[test]
    fn delay_agrees_with_hand_computed_value() {
        // DM 100 across the lowest 0.195 MHz channel of a 110-190 MHz band.
        let expected = DM_CONSTANT * 100.0 * (1.0 / (110.0 * 110.0) - 1.0 / (110.195 * 110.195));
        assert_abs_diff_eq!(dm_delay(100.0, 110.195, 110.0), expected);
    }

    #[test]
    fn delay_matrix_is_dms_by_edges() {
        let dms = [0.0, 50.0, 100.0];
        let edges = [(110.0, 150.0), (150.0, 190.0)];
        let mat = delay_matrix(&dms, &edges);
        assert_eq!(mat.dim(), (3, 2));
        for (i, &dm) in dms.iter().enumerate() {
            for (j, &(lo, hi)) in edges.iter().enumerate() {
                assert_abs_diff_eq!(mat[(i, j)], dm_delay(dm, hi, lo));
            }
        }
    }

    #[test]
    fn scattering_is_finite_above_the_floor() {
        let t = scattering_time(SCATTER_DM_FLOOR, 0.15);
        assert!(t.is_finite());
        assert!(t > 0.0);
    }

    #[test]
    fn scattering_blows_up_at_zero_dm() {
        assert!(!scattering_time(0.0, 0.15).is_finite());
    }

    #[test]
    fn scattering_grows_with_dm_at_high_dm() {
        let t1 = scattering_time(100.0, 0.15);
        let t2 = scattering_time(800.0, 0.15);
        assert!(t2 > t1);
    }
}
