//! Combining the individual smearing contributions into a total smearing
//! time per DM.
//!
//! Intra-channel and subband smears take the **maximum** over their edge
//! sets, not a mean; the worst channel governs the usable time resolution
//! at a given DM.

use log::debug;
use ndarray::Array1;

use crate::{
    band,
    delay::{self, SCATTER_DM_FLOOR},
    SearchSetup,
};

/// Quadrature sum of the sampling time and the three smearing terms
/// \[seconds\]. The sampling time comes in as milliseconds, everything
/// else as seconds.
pub fn total_smear(dt_ms: f64, t_chan_s: f64, t_subband_s: f64, t_bw_s: f64) -> f64 {
    let dt_s = dt_ms * 1e-3;
    (dt_s * dt_s + t_chan_s * t_chan_s + t_subband_s * t_subband_s + t_bw_s * t_bw_s).sqrt()
}

/// The worst-case intra-channel smearing time \[seconds\] at a DM: the
/// maximum dispersion delay across all channel edge pairs. With channels
/// ordered by increasing frequency this is always the lowest channel,
/// where 1/f^2 is steepest, but the reduction doesn't rely on that.
pub fn worst_channel_smear(dm: f64, channel_edges: &[(f64, f64)]) -> f64 {
    channel_edges
        .iter()
        .map(|&(lo, hi)| delay::dm_delay(dm, hi, lo))
        .fold(0.0, f64::max)
}

/// The worst-case subband smearing time \[seconds\] for a DM trial step:
/// a trial can be wrong by at most half a step, and the worst subband
/// governs.
pub fn subband_smear(delta_dm: f64, f_low_mhz: f64, f_high_mhz: f64, n_sub: usize) -> f64 {
    let dm_err = 0.5 * delta_dm;
    band::uniform_edges(f_low_mhz, f_high_mhz, n_sub)
        .iter()
        .map(|&(lo, hi)| delay::dm_delay(dm_err, hi, lo))
        .fold(0.0, f64::max)
}

/// The smearing time \[seconds\] from the same half-step DM error applied
/// across the full band.
pub fn bandwidth_smear(delta_dm: f64, f_low_mhz: f64, f_high_mhz: f64) -> f64 {
    delay::dm_delay(0.5 * delta_dm, f_high_mhz, f_low_mhz)
}

/// Per-DM smearing curves, all in milliseconds, for diagnostic display.
/// Purely derived from the setup and the DM grid; nothing here feeds back
/// into the plan except through the same underlying delay law.
#[derive(Debug, Clone)]
pub struct SmearingCurves {
    /// The DM grid the curves are evaluated on \[pc cm^-3\].
    pub dms: Array1<f64>,

    /// Worst-channel intra-channel smearing \[ms\].
    pub channel_ms: Array1<f64>,

    /// Full-band DM-step smearing \[ms\]. Constant over DM for a fixed
    /// trial step.
    pub bandwidth_ms: Array1<f64>,

    /// Worst-subband DM-step smearing \[ms\]. Also constant over DM.
    pub subband_ms: Array1<f64>,

    /// Quadrature total of sampling, channel, subband and bandwidth terms
    /// \[ms\].
    pub total_ms: Array1<f64>,

    /// Scattering at the band centre frequency \[ms\].
    pub scattering_ms: Array1<f64>,

    /// Quadrature combination of `total_ms` and `scattering_ms` \[ms\].
    /// Scattering at the centre frequency is the conventional choice for
    /// this combination.
    pub total_with_scattering_ms: Array1<f64>,
}

/// Evaluate all smearing contributions over a DM grid, for a fixed
/// reference trial step `delta_dm`.
///
/// DMs at or below zero are floored to [`SCATTER_DM_FLOOR`] before the
/// scattering fit is evaluated, so the fit never sees a non-positive DM.
pub fn smearing_curves(setup: &SearchSetup, dms: &Array1<f64>, delta_dm: f64) -> SmearingCurves {
    let channel_edges = band::channel_edges(setup.f_low_mhz, setup.f_high_mhz, setup.freq_res_mhz);
    debug!(
        "Evaluating smearing over {} DMs x {} channels",
        dms.len(),
        channel_edges.len()
    );

    let dm_slice = dms.as_slice().expect("owned 1-D arrays are contiguous");
    let delay_mat = delay::delay_matrix(dm_slice, &channel_edges);
    let channel_s: Array1<f64> = delay_mat.map_axis(ndarray::Axis(1), |row| {
        row.iter().copied().fold(0.0, f64::max)
    });

    let bw_s = bandwidth_smear(delta_dm, setup.f_low_mhz, setup.f_high_mhz);
    let sub_s = subband_smear(delta_dm, setup.f_low_mhz, setup.f_high_mhz, setup.num_subbands);

    let total_s = channel_s.mapv(|t_chan| total_smear(setup.time_res_ms, t_chan, sub_s, bw_s));

    let f_ctr_ghz = setup.centre_freq_mhz() / 1e3;
    let scatter_s = dms.mapv(|dm| delay::scattering_time(dm.max(SCATTER_DM_FLOOR), f_ctr_ghz));

    let total_with_scatter_s: Array1<f64> = total_s
        .iter()
        .zip(scatter_s.iter())
        .map(|(&t, &s)| (t * t + s * s).sqrt())
        .collect();

    SmearingCurves {
        dms: dms.clone(),
        channel_ms: channel_s * 1e3,
        bandwidth_ms: Array1::from_elem(dms.len(), bw_s * 1e3),
        subband_ms: Array1::from_elem(dms.len(), sub_s * 1e3),
        total_ms: total_s * 1e3,
        scattering_ms: scatter_s * 1e3,
        total_with_scattering_ms: total_with_scatter_s * 1e3,
    }
}
