//! The ΔDM optimizer and plan segmenter.
//!
//! For every DM on a trial grid, work out the coarsest trial spacing whose
//! own full-band smear stays within the channelization's intrinsic
//! resolution, then collapse the resulting spacing curve into a small
//! table of piecewise-uniform plan segments.

use std::fmt;

use itertools::Itertools;
use log::{debug, info};
use ndarray::{Array1, Axis};
use vec1::Vec1;

use crate::{
    band,
    delay::{self, DM_CONSTANT},
    error::PlanError,
    SearchSetup,
};

/// One row of the dedispersion plan: search `[dm_start, dm_stop)` with a
/// uniform trial spacing of `delta_dm`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSegment {
    /// The first DM of the segment \[pc cm^-3\].
    pub dm_start: f64,

    /// The DM the segment runs up to \[pc cm^-3\].
    pub dm_stop: f64,

    /// The uniform trial spacing within the segment \[pc cm^-3\].
    pub delta_dm: f64,

    /// `ceil((dm_stop - dm_start) / delta_dm)`; at least 1.
    pub n_trials: u64,
}

impl PlanSegment {
    fn new(dm_start: f64, dm_stop: f64, delta_dm: f64) -> PlanSegment {
        PlanSegment {
            dm_start,
            dm_stop,
            delta_dm,
            n_trials: ((dm_stop - dm_start) / delta_dm).ceil() as u64,
        }
    }
}

/// A complete dedispersion plan: an ordered set of segments partitioning
/// `[dm_min, dm_max]`.
#[derive(Debug, Clone)]
pub struct Plan {
    pub segments: Vec1<PlanSegment>,
}

/// Build the uniform DM trial grid the optimizer runs over. The last
/// sample is pinned to `dm_max` so the plan terminates exactly there
/// rather than a rounding error short of it. `n` must be at least 2.
pub fn dm_grid(dm_min: f64, dm_max: f64, n: usize) -> Array1<f64> {
    let step = (dm_max - dm_min) / (n - 1) as f64;
    let mut samples: Vec<f64> = (0..n).map(|i| dm_min + i as f64 * step).collect();
    samples[n - 1] = dm_max;
    Array1::from(samples)
}

/// For each DM on the grid, the optimal trial spacing: the ΔDM whose
/// worst-case full-band residual delay is exactly twice the worst-channel
/// smearing at that DM.
///
/// Anything finer over-samples the DM axis, since channel smearing
/// already limits the time resolution there. The result is monotonically
/// non-decreasing in DM, and is 0 at DM = 0 (no channel smearing means no
/// tolerable trial error; the segmenter never reads a spacing there).
pub fn optimize_ddm(
    dms: &[f64],
    channel_edges: &[(f64, f64)],
    f_low_mhz: f64,
    f_high_mhz: f64,
) -> Array1<f64> {
    let delay_mat = delay::delay_matrix(dms, channel_edges);
    let t_chan_max =
        delay_mat.map_axis(Axis(1), |row| row.iter().copied().fold(0.0, f64::max));

    // The delay a DM error of 1 pc cm^-3 causes across the full band.
    let band_delay_per_dm =
        DM_CONSTANT * (1.0 / (f_low_mhz * f_low_mhz) - 1.0 / (f_high_mhz * f_high_mhz));

    t_chan_max.mapv(|t| 2.0 * t / band_delay_per_dm)
}

/// Trials needed per unit DM: the reciprocal of the trial spacing.
/// Monotonically non-increasing; +inf where the spacing is 0 (DM = 0),
/// which the breakpoint walk handles without special cases.
pub fn trials_density(ddms: &Array1<f64>) -> Array1<f64> {
    ddms.mapv(f64::recip)
}

/// Walk the (non-increasing) trials-density curve and keep a point only
/// when `log10(density)` has dropped by at least `log_step` since the
/// last kept point. The first point is always kept.
///
/// This spaces the breakpoints geometrically in density, so the number of
/// plan segments is bounded by the dynamic range of the curve, not by the
/// grid resolution.
pub fn select_breakpoints(density: &Array1<f64>, log_step: f64) -> Vec<usize> {
    let mut kept = vec![0];
    let mut last_log = density[0].log10();
    for (i, &d) in density.iter().enumerate().skip(1) {
        let log_d = d.log10();
        if last_log - log_d >= log_step {
            kept.push(i);
            last_log = log_d;
        }
    }
    debug!(
        "Kept {} of {} grid samples as plan breakpoints",
        kept.len(),
        density.len()
    );
    kept
}

/// Assemble plan segments from consecutive breakpoint pairs.
///
/// Each segment takes the ΔDM at its *stop* breakpoint: the spacing that
/// is tolerable at the segment's high-DM end, a conservative choice
/// applied uniformly. If the last breakpoint undershoots the grid's
/// maximum DM, one trailing segment extends to it, reusing the last grid
/// sample's ΔDM.
pub fn build_plan(
    dms: &Array1<f64>,
    ddms: &Array1<f64>,
    breakpoints: &[usize],
) -> Result<Vec1<PlanSegment>, PlanError> {
    if dms.len() < 2 {
        return Err(PlanError::DegenerateDmGrid { len: dms.len() });
    }

    let mut segments: Vec<PlanSegment> = breakpoints
        .iter()
        .tuple_windows()
        .map(|(&i, &j)| PlanSegment::new(dms[i], dms[j], ddms[j]))
        .collect();

    let last_kept = *breakpoints.last().expect("first point is always kept");
    let last_sample = dms.len() - 1;
    if dms[last_kept] < dms[last_sample] {
        segments.push(PlanSegment::new(
            dms[last_kept],
            dms[last_sample],
            ddms[last_sample],
        ));
    }

    Ok(Vec1::try_from_vec(segments).expect("a trailing segment exists whenever no pair does"))
}

impl Plan {
    /// Run the whole chain: DM grid, channel edges, spacing optimizer,
    /// breakpoint selection, segment assembly.
    pub fn compute(
        setup: &SearchSetup,
        n_dm_samples: usize,
        log_step: f64,
    ) -> Result<Plan, PlanError> {
        if n_dm_samples < 2 {
            return Err(PlanError::DegenerateDmGrid { len: n_dm_samples });
        }

        let dms = dm_grid(setup.dm_min, setup.dm_max, n_dm_samples);
        let channel_edges =
            band::channel_edges(setup.f_low_mhz, setup.f_high_mhz, setup.freq_res_mhz);
        debug!(
            "Optimizing trial spacing over {} DMs x {} channels",
            dms.len(),
            channel_edges.len()
        );

        let ddms = optimize_ddm(
            dms.as_slice().expect("owned 1-D arrays are contiguous"),
            &channel_edges,
            setup.f_low_mhz,
            setup.f_high_mhz,
        );
        let density = trials_density(&ddms);
        let breakpoints = select_breakpoints(&density, log_step);
        let segments = build_plan(&dms, &ddms, &breakpoints)?;

        let plan = Plan { segments };
        info!(
            "Plan: {} segment(s), {} DM trials in total",
            plan.segments.len(),
            plan.total_trials()
        );
        Ok(plan)
    }

    /// The number of DM trials summed over all segments.
    pub fn total_trials(&self) -> u64 {
        self.segments.iter().map(|s| s.n_trials).sum()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:>10} | {:>10} | {:>10} | {:>16}",
            "DM Start", "DM Stop", "ΔDM", "Number of Trials"
        )?;
        for s in &self.segments {
            writeln!(
                f,
                "{:>10.3} | {:>10.3} | {:>10.4} | {:>16}",
                s.dm_start, s.dm_stop, s.delta_dm, s.n_trials
            )?;
        }
        Ok(())
    }
}
