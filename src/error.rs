use thiserror::Error;

use crate::prelude::SV;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No [Connection](crate::prelude::Connection) covers this tick.
    /// This is the routine "no data" outcome of tick lookups.
    #[error("no connection covers tick {0}")]
    NoConnection(u32),

    /// Dual frequency pair could not be determined for this [SV].
    #[error("unknown frequencies for {0}")]
    UnknownFrequencies(SV),

    /// GLONASS connection without a frequency channel number.
    #[error("missing glonass frequency channel for {0}")]
    MissingGlonassChannel(SV),

    /// Carrier correction requested prior any correction mechanism.
    #[error("carrier correction attempted with no correction mechanism")]
    UncorrectedConnection,

    #[error("unknown station \"{0}\"")]
    UnknownStation(String),

    #[error("no observations for {0}")]
    UnknownSatellite(SV),

    /// Connection index range does not fit the observation sequence.
    #[error("invalid index range [{start}, {end}] ({len} observations)")]
    InvalidIndexRange { start: usize, end: usize, len: usize },

    /// Observations of a connection must have strictly increasing ticks.
    #[error("{sv}: non chronological observations (tick {tick} after {previous})")]
    NonChronological { sv: SV, tick: u32, previous: u32 },

    /// Not a single sample can contribute to the offset estimate.
    #[error("no usable sample in connection")]
    EmptyConnection,

    #[error("unknown observable \"{0}\"")]
    UnknownObservable(String),
}
