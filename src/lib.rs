#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod carrier;
mod cfg;
mod connection;
mod error;
mod filter;
mod observation;
mod scenario;
mod sparse;
mod tick_map;

pub mod constants;
pub mod tec;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::carrier::{Carrier, GLONASS_CHANNELS};
    pub use crate::cfg::Config;
    pub use crate::connection::{Connection, Correction};
    pub use crate::error::Error;
    pub use crate::filter::{bpfilter, Butterworth};
    pub use crate::observation::{
        from_raw_obs, merge_data, secondary_code_band, DenseMeasurement, DenseMeasurements,
        Observable, RawMeasurement,
    };
    pub use crate::scenario::Scenario;
    pub use crate::sparse::{SparseList, TickLookup};
    pub use crate::tick_map::ConnTickMap;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Epoch, TimeScale};
    pub use nalgebra::Vector3;
}
