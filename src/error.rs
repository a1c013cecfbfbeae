//! Error type for everything that can go wrong while building a plan.
//!
//! All of these are configuration mistakes; none are recoverable and no
//! partial results are produced.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid band: f_low {f_low_mhz} MHz, f_high {f_high_mhz} MHz; need 0 < f_low < f_high")]
    InvalidBand { f_low_mhz: f64, f_high_mhz: f64 },

    #[error("Invalid channel width {df_mhz} MHz; need 0 < df <= bandwidth ({bandwidth_mhz} MHz)")]
    InvalidChannelWidth { df_mhz: f64, bandwidth_mhz: f64 },

    #[error("Invalid sampling time {dt_ms} ms; need dt > 0")]
    InvalidTimeRes { dt_ms: f64 },

    #[error("The number of subbands cannot be 0")]
    InvalidSubbandCount,

    #[error("Invalid DM range [{dm_min}, {dm_max}]; need 0 <= DM_min < DM_max")]
    InvalidDmRange { dm_min: f64, dm_max: f64 },

    #[error("The DM grid has {len} sample(s); breakpoint search needs at least 2")]
    DegenerateDmGrid { len: usize },
}
