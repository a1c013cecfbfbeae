//! Dedispersion-plan calculator for pulsar/FRB searches.
//!
//! Given a telescope's frequency band, channelization and sampling time,
//! work out how finely the DM axis must be sampled to keep dispersive
//! smearing bounded, and emit a piecewise-uniform table of DM trial
//! spacings for a downstream search pipeline.

pub mod band;
pub mod delay;
pub mod error;
pub mod plan;
pub mod smear;

use error::PlanError;

/// The observational setup a dedispersion plan is computed for.
///
/// All quantities are validated on construction; the rest of the crate may
/// assume a well-formed band, channelization and DM range.
#[derive(Debug, Clone)]
pub struct SearchSetup {
    /// The lower edge of the observing band \[MHz\].
    pub f_low_mhz: f64,

    /// The upper edge of the observing band \[MHz\]. Strictly greater than
    /// `f_low_mhz`.
    pub f_high_mhz: f64,

    /// The fine-channel width \[MHz\]. Channels are assumed contiguous
    /// across the band; a trailing partial channel is not searched.
    pub freq_res_mhz: f64,

    /// The sampling time of the input time series \[ms\].
    pub time_res_ms: f64,

    /// The number of subbands used for partial coherent dedispersion
    /// before incoherent combination.
    pub num_subbands: usize,

    /// The lowest DM of interest \[pc cm^-3\]. Non-negative.
    pub dm_min: f64,

    /// The highest DM of interest \[pc cm^-3\]. Strictly greater than
    /// `dm_min`.
    pub dm_max: f64,
}

impl SearchSetup {
    /// Validate the supplied scalars and build a [`SearchSetup`].
    ///
    /// Any violated precondition is a configuration mistake, not a
    /// transient condition; it is reported immediately and nothing is
    /// computed.
    pub fn new(
        f_low_mhz: f64,
        f_high_mhz: f64,
        freq_res_mhz: f64,
        time_res_ms: f64,
        num_subbands: usize,
        dm_min: f64,
        dm_max: f64,
    ) -> Result<SearchSetup, PlanError> {
        if !(f_low_mhz > 0.0) || !(f_high_mhz > f_low_mhz) {
            return Err(PlanError::InvalidBand {
                f_low_mhz,
                f_high_mhz,
            });
        }
        let bandwidth_mhz = f_high_mhz - f_low_mhz;
        if !(freq_res_mhz > 0.0) || freq_res_mhz > bandwidth_mhz {
            return Err(PlanError::InvalidChannelWidth {
                df_mhz: freq_res_mhz,
                bandwidth_mhz,
            });
        }
        if !(time_res_ms > 0.0) {
            return Err(PlanError::InvalidTimeRes { dt_ms: time_res_ms });
        }
        if num_subbands == 0 {
            return Err(PlanError::InvalidSubbandCount);
        }
        if !(dm_min >= 0.0) || !(dm_max > dm_min) {
            return Err(PlanError::InvalidDmRange { dm_min, dm_max });
        }

        Ok(SearchSetup {
            f_low_mhz,
            f_high_mhz,
            freq_res_mhz,
            time_res_ms,
            num_subbands,
            dm_min,
            dm_max,
        })
    }

    /// The total bandwidth \[MHz\].
    pub fn bandwidth_mhz(&self) -> f64 {
        self.f_high_mhz - self.f_low_mhz
    }

    /// The band centre frequency \[MHz\].
    pub fn centre_freq_mhz(&self) -> f64 {
        0.5 * (self.f_low_mhz + self.f_high_mhz)
    }

    /// The number of full-width fine channels across the band.
    pub fn num_channels(&self) -> usize {
        band::channel_edges(self.f_low_mhz, self.f_high_mhz, self.freq_res_mhz).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_setup_passes() {
        let setup = SearchSetup::new(110.0, 190.0, 0.195, 0.655, 32, 0.0, 800.0).unwrap();
        assert_eq!(setup.bandwidth_mhz(), 80.0);
        assert_eq!(setup.centre_freq_mhz(), 150.0);
    }

    #[test]
    fn inverted_band_is_rejected() {
        let result = SearchSetup::new(190.0, 110.0, 0.195, 0.655, 32, 0.0, 800.0);
        assert!(matches!(result, Err(PlanError::InvalidBand { .. })));
    }

    #[test]
    fn zero_f_low_is_rejected() {
        let result = SearchSetup::new(0.0, 190.0, 0.195, 0.655, 32, 0.0, 800.0);
        assert!(matches!(result, Err(PlanError::InvalidBand { .. })));
    }

    #[test]
    fn oversized_channel_width_is_rejected() {
        let result = SearchSetup::new(110.0, 190.0, 100.0, 0.655, 32, 0.0, 800.0);
        assert!(matches!(result, Err(PlanError::InvalidChannelWidth { .. })));
    }

    #[test]
    fn non_positive_sampling_time_is_rejected() {
        let result = SearchSetup::new(110.0, 190.0, 0.195, 0.0, 32, 0.0, 800.0);
        assert!(matches!(result, Err(PlanError::InvalidTimeRes { .. })));
    }

    #[test]
    fn zero_subbands_is_rejected() {
        let result = SearchSetup::new(110.0, 190.0, 0.195, 0.655, 0, 0.0, 800.0);
        assert!(matches!(result, Err(PlanError::InvalidSubbandCount)));
    }

    #[test]
    fn empty_dm_range_is_rejected() {
        let result = SearchSetup::new(110.0, 190.0, 0.195, 0.655, 32, 800.0, 800.0);
        assert!(matches!(result, Err(PlanError::InvalidDmRange { .. })));

        let result = SearchSetup::new(110.0, 190.0, 0.195, 0.655, 32, -1.0, 800.0);
        assert!(matches!(result, Err(PlanError::InvalidDmRange { .. })));
    }
}
