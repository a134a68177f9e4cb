//! Periods of continuous lock between a satellite and a ground station
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use itertools::Itertools;
use log::{debug, error, warn};
use once_cell::sync::OnceCell;

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    observation::{gaps, secondary_code_band},
    prelude::{Constellation, DenseMeasurement, Error, Observable, Scenario, Vector3, SV},
    tec,
};

/// Carrier phase [Correction] of a [Connection].
/// Only one mechanism is authoritative at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Integer ambiguities on both carriers
    Ambiguities { n_chan1: i64, n_chan2: i64 },
    /// Code phase smoothed offset, in meters, and its standard deviation
    Offset { offset: f64, offset_error: f64 },
}

/// Each time a receiver acquires lock on a GNSS satellite, an unknown
/// number of carrier cycles accumulates in its phase measurements.
/// That number remains constant during a period of continuous lock:
/// the [Connection]. Each [Connection] needs its own correction, before
/// phase measurements can be turned into TEC.
#[derive(Debug)]
pub struct Connection<'a> {
    scenario: &'a Scenario,
    /// Station name
    pub station: String,
    /// Observed [SV]
    pub sv: SV,
    /// First data index in the station observations of this [SV]
    pub idx_start: usize,
    /// Last data index (included)
    pub idx_end: usize,
    /// Tick of the first observation
    pub tick_start: u32,
    /// Tick of the last observation
    pub tick_end: u32,
    /// Ticks within [tick_start, tick_end] that were never recorded
    pub missing_ticks: BTreeSet<u32>,
    observations: &'a [DenseMeasurement],
    station_loc: Vector3<f64>,
    correction: Option<Correction>,
    frequencies: OnceCell<(f64, f64)>,
    glonass_chan: OnceCell<i8>,
}

impl<'a> Connection<'a> {
    /// Builds a new [Connection] over observations [idx_start, idx_end]
    /// of this station and [SV], within the [Scenario].
    pub fn new(
        scenario: &'a Scenario,
        station: &str,
        sv: SV,
        idx_start: usize,
        idx_end: usize,
    ) -> Result<Self, Error> {
        let all = scenario.observations(station, sv)?;
        let station_loc = scenario.station_loc(station)?;

        if idx_start > idx_end || idx_end >= all.len() {
            return Err(Error::InvalidIndexRange {
                start: idx_start,
                end: idx_end,
                len: all.len(),
            });
        }

        let observations = &all[idx_start..=idx_end];

        if let Some((prev, next)) = observations
            .iter()
            .tuple_windows()
            .find(|(prev, next)| next.tick <= prev.tick)
        {
            error!(
                "{}({}): non chronological observations (tick {} after {})",
                station, sv, next.tick, prev.tick
            );
            return Err(Error::NonChronological {
                sv,
                tick: next.tick,
                previous: prev.tick,
            });
        }

        let missing_ticks = gaps(observations).collect::<BTreeSet<_>>();

        let s = Self {
            scenario,
            station: station.to_string(),
            sv,
            idx_start,
            idx_end,
            tick_start: observations[0].tick,
            tick_end: observations[observations.len() - 1].tick,
            missing_ticks,
            observations,
            station_loc,
            correction: None,
            frequencies: OnceCell::new(),
            glonass_chan: OnceCell::new(),
        };

        debug!(
            "{}({}): connection [{}, {}] ({} missing ticks)",
            s.station,
            s.sv,
            s.tick_start,
            s.tick_end,
            s.missing_ticks.len()
        );
        Ok(s)
    }

    /// [Scenario] this [Connection] belongs to
    pub fn scenario(&self) -> &'a Scenario {
        self.scenario
    }

    /// Raw observations of this [Connection]
    pub fn observations(&self) -> &'a [DenseMeasurement] {
        self.observations
    }

    /// Station position, ECEF (m)
    pub fn station_loc(&self) -> Vector3<f64> {
        self.station_loc
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All ticks from start to end, missing ones included
    pub fn ticks(&self) -> RangeInclusive<u32> {
        self.tick_start..=self.tick_end
    }

    /// True if tick lies within [tick_start, tick_end], whether it is missing or not.
    pub fn contains(&self, tick: u32) -> bool {
        self.tick_start <= tick && tick <= self.tick_end
    }

    /// Maps this tick to its index within [Self::observations].
    /// None when the tick is missing or outside this [Connection].
    pub fn tick_idx(&self, tick: u32) -> Option<usize> {
        if !self.contains(tick) || self.missing_ticks.contains(&tick) {
            return None;
        }
        let skipped = self.missing_ticks.range(..tick).count();
        ((tick - self.tick_start) as usize).checked_sub(skipped)
    }

    pub fn is_glonass(&self) -> bool {
        self.sv.constellation == Constellation::Glonass
    }

    /// GLONASS frequency channel, 0 for other constellations.
    pub fn glonass_chan(&self) -> Result<i8, Error> {
        self.glonass_chan
            .get_or_try_init(|| {
                if !self.is_glonass() {
                    return Ok(0);
                }
                self.scenario.get_glonass_chan(self.sv).ok_or_else(|| {
                    error!("{}({}): glonass connection without channel", self.station, self.sv);
                    Error::MissingGlonassChannel(self.sv)
                })
            })
            .copied()
    }

    /// (f1, f2) carrier frequencies, in Hz
    pub fn frequencies(&self) -> Result<(f64, f64), Error> {
        self.frequencies
            .get_or_try_init(|| {
                self.glonass_chan()?;
                self.scenario
                    .get_frequencies(self.sv)
                    .ok_or(Error::UnknownFrequencies(self.sv))
            })
            .copied()
    }

    /// Elevation of the satellite (radians), for each observation
    pub fn elevation(&self) -> Result<Vec<f64>, Error> {
        self.scenario
            .station_el(&self.station, self.observations.iter().map(|obs| &obs.sat_pos))
    }

    /// Code phase smoothing: the carrier offset is the average difference
    /// between code and carrier phase differences.
    fn correct_ambiguities_avg(&mut self) -> Result<(), Error> {
        let (f1, f2) = self.frequencies()?;
        let chan2 = secondary_code_band(self.observations).unwrap_or(Observable::C2C);

        // the ionosphere delays code and advances carrier phase:
        // subtracting one from the other is correct as is
        let residuals = self
            .observations
            .iter()
            .filter_map(|obs| {
                let code = obs.value(chan2)? - obs.c1c?;
                let carrier = SPEED_OF_LIGHT_M_S * (obs.l1c? / f1 - obs.l2c? / f2);
                Some(code - carrier)
            })
            .collect::<Vec<_>>();

        if residuals.is_empty() {
            return Err(Error::EmptyConnection);
        }

        let n = residuals.len() as f64;
        let offset = residuals.iter().sum::<f64>() / n;
        let offset_error = (residuals
            .iter()
            .map(|r| (r - offset).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();

        debug!(
            "{}({}): offset={:.3}m (σ={:.3}m, {} samples)",
            self.station, self.sv, offset, offset_error, residuals.len()
        );

        self.replace_correction(Correction::Offset {
            offset,
            offset_error,
        });
        Ok(())
    }

    /// Determines the carrier phase correction of this [Connection].
    /// Integer ambiguity resolution is not supported: code phase smoothing is used.
    pub fn correct_ambiguities(&mut self) -> Result<(), Error> {
        self.correct_ambiguities_avg()
    }

    /// Defines externally resolved integer ambiguities,
    /// which take precedence over any smoothed offset.
    pub fn set_ambiguities(&mut self, n_chan1: i64, n_chan2: i64) {
        self.replace_correction(Correction::Ambiguities { n_chan1, n_chan2 });
    }

    /// Replaces the current correction, warning when one was already set.
    fn replace_correction(&mut self, correction: Correction) {
        if let Some(prior) = self.correction.replace(correction) {
            warn!(
                "{}({}): overwriting prior correction {:?} with {:?}",
                self.station, self.sv, prior, correction
            );
        }
    }

    pub fn correction(&self) -> Option<Correction> {
        self.correction
    }

    pub fn n_chan1(&self) -> Option<i64> {
        match self.correction {
            Some(Correction::Ambiguities { n_chan1, .. }) => Some(n_chan1),
            _ => None,
        }
    }

    pub fn n_chan2(&self) -> Option<i64> {
        match self.correction {
            Some(Correction::Ambiguities { n_chan2, .. }) => Some(n_chan2),
            _ => None,
        }
    }

    /// Code phase smoothed offset (m)
    pub fn offset(&self) -> Option<f64> {
        match self.correction {
            Some(Correction::Offset { offset, .. }) => Some(offset),
            _ => None,
        }
    }

    /// Standard deviation of [Self::offset] (m)
    pub fn offset_error(&self) -> Option<f64> {
        match self.correction {
            Some(Correction::Offset { offset_error, .. }) => Some(offset_error),
            _ => None,
        }
    }

    /// Correction of the chan1 / chan2 carrier difference, in meters.
    pub fn carrier_correction_meters(&self) -> Result<f64, Error> {
        match self.correction {
            Some(Correction::Ambiguities { n_chan1, n_chan2 }) => {
                let (f1, f2) = self.frequencies()?;
                Ok(SPEED_OF_LIGHT_M_S * (n_chan2 as f64 / f2 - n_chan1 as f64 / f1))
            },
            Some(Correction::Offset { offset, .. }) => Ok(offset),
            None => {
                error!(
                    "{}({}): carrier correction attempted with no correction mechanism",
                    self.station, self.sv
                );
                Err(Error::UncorrectedConnection)
            },
        }
    }

    /// Locations where the signals of this [Connection] pierce the ionosphere,
    /// ECEF (m).
    pub fn ipps(&self) -> Vec<Vector3<f64>> {
        tec::ion_locs(
            &self.station_loc,
            self.observations.iter().map(|obs| &obs.sat_pos),
            self.scenario.cfg.ionosphere_radius_m(),
        )
    }

    /// (VTEC in TECu, unitless slant to vertical factor) for each observation
    pub fn vtecs(&self) -> Result<Vec<(f64, f64)>, Error> {
        tec::calculate_vtecs(self)
    }
}
