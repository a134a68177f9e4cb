//! Compact per satellite observation storage
use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, warn};

use crate::prelude::{Epoch, Error, TimeScale, Vector3, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Signal observables we retain. Code phases are expressed in meters,
/// carrier phases in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Observable {
    C1C,
    C2C,
    C2P,
    C5C,
    L1C,
    L2C,
    L5C,
}

impl std::fmt::Display for Observable {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::C1C => write!(fmt, "C1C"),
            Self::C2C => write!(fmt, "C2C"),
            Self::C2P => write!(fmt, "C2P"),
            Self::C5C => write!(fmt, "C5C"),
            Self::L1C => write!(fmt, "L1C"),
            Self::L2C => write!(fmt, "L2C"),
            Self::L5C => write!(fmt, "L5C"),
        }
    }
}

impl std::str::FromStr for Observable {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "C1C" => Ok(Self::C1C),
            "C2C" => Ok(Self::C2C),
            "C2P" => Ok(Self::C2P),
            "C5C" => Ok(Self::C5C),
            "L1C" => Ok(Self::L1C),
            "L2C" => Ok(Self::L2C),
            "L5C" => Ok(Self::L5C),
            _ => Err(Error::UnknownObservable(s.to_string())),
        }
    }
}

/// Measurement as delivered by the observation source,
/// prior conversion to [DenseMeasurement].
#[derive(Debug, Clone, Default)]
pub struct RawMeasurement {
    /// [SV] that was observed
    pub sv: SV,
    /// Tick number this observation was made at
    pub tick: u32,
    /// Available signal observations
    pub observables: HashMap<Observable, f64>,
    /// Receiver time of week (s)
    pub recv_time_sec: f64,
    /// Receiver GPS week
    pub recv_time_week: u32,
    /// Satellite clock error (s)
    pub sat_clock_err: f64,
    /// Satellite position, ECEF (m)
    pub sat_pos: Vector3<f64>,
    /// Satellite velocity, ECEF (m/s)
    pub sat_vel: Vector3<f64>,
    /// Corrected satellite position, ECEF (m)
    pub sat_pos_final: Vector3<f64>,
    pub processed: bool,
    pub corrected: bool,
}

/// One row per station, satellite and tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseMeasurement {
    /// Tick number the observation was made at
    pub tick: u32,
    pub c1c: Option<f64>,
    pub c2c: Option<f64>,
    pub c2p: Option<f64>,
    pub c5c: Option<f64>,
    pub l1c: Option<f64>,
    pub l2c: Option<f64>,
    pub l5c: Option<f64>,
    /// Receiver time of week (s)
    pub recv_time_sec: f64,
    /// Receiver GPS week
    pub recv_time_week: u32,
    /// Satellite clock error (s)
    pub sat_clock_err: f64,
    /// Satellite position, ECEF (m)
    pub sat_pos: Vector3<f64>,
    /// Satellite velocity, ECEF (m/s)
    pub sat_vel: Vector3<f64>,
    /// Satellite position after corrections, ECEF (m)
    pub sat_pos_final: Vector3<f64>,
    /// Initial processing was applied
    pub is_processed: bool,
    /// Final position was calculated
    pub is_corrected: bool,
}

impl DenseMeasurement {
    /// Returns value observed for this [Observable], if any
    pub fn value(&self, observable: Observable) -> Option<f64> {
        match observable {
            Observable::C1C => self.c1c,
            Observable::C2C => self.c2c,
            Observable::C2P => self.c2p,
            Observable::C5C => self.c5c,
            Observable::L1C => self.l1c,
            Observable::L2C => self.l2c,
            Observable::L5C => self.l5c,
        }
    }

    /// Receiver sampling [Epoch], in GPST.
    pub fn recv_epoch(&self) -> Epoch {
        let nanos = (self.recv_time_sec * 1.0E9).round().max(0.0) as u64;
        Epoch::from_time_of_week(self.recv_time_week, nanos, TimeScale::GPST)
    }
}

impl From<&RawMeasurement> for DenseMeasurement {
    fn from(raw: &RawMeasurement) -> Self {
        let obs = |observable: Observable| raw.observables.get(&observable).copied();
        Self {
            tick: raw.tick,
            c1c: obs(Observable::C1C),
            c2c: obs(Observable::C2C),
            c2p: obs(Observable::C2P),
            c5c: obs(Observable::C5C),
            l1c: obs(Observable::L1C),
            l2c: obs(Observable::L2C),
            l5c: obs(Observable::L5C),
            recv_time_sec: raw.recv_time_sec,
            recv_time_week: raw.recv_time_week,
            sat_clock_err: raw.sat_clock_err,
            sat_pos: raw.sat_pos,
            sat_vel: raw.sat_vel,
            sat_pos_final: raw.sat_pos_final,
            is_processed: raw.processed,
            is_corrected: raw.corrected,
        }
    }
}

/// Observations of a single station, per [SV], sorted by increasing tick.
pub type DenseMeasurements = HashMap<SV, Vec<DenseMeasurement>>;

/// C2C is our canonical secondary code band: swap with C2P when
/// C2C was never observed.
fn normalize_bands(observations: &mut [DenseMeasurement]) {
    if observations.iter().all(|obs| obs.c2c.is_none()) {
        for obs in observations.iter_mut() {
            std::mem::swap(&mut obs.c2c, &mut obs.c2p);
        }
    }
}

/// Converts the observations of one station (grouped per epoch)
/// into [DenseMeasurements].
pub fn from_raw_obs(raw_obs: &[Vec<RawMeasurement>]) -> DenseMeasurements {
    let mut dense = DenseMeasurements::with_capacity(32);

    for raw in raw_obs.iter().flatten() {
        dense
            .entry(raw.sv)
            .or_insert_with(Vec::new)
            .push(DenseMeasurement::from(raw));
    }

    for (sv, observations) in dense.iter_mut() {
        normalize_bands(observations);
        debug!("{}: {} dense observations", sv, observations.len());
    }

    dense
}

/// Merges two sets of [DenseMeasurements], `data1` being chronologically
/// prior `data2`.
pub fn merge_data(data1: DenseMeasurements, data2: DenseMeasurements) -> DenseMeasurements {
    let mut combined = data1;
    for (sv, observations) in data2 {
        let series = combined.entry(sv).or_insert_with(Vec::new);
        if let (Some(last), Some(first)) = (series.last(), observations.first()) {
            if first.tick <= last.tick {
                warn!(
                    "{}: merging non chronological data (tick {} after {})",
                    sv, first.tick, last.tick
                );
            }
        }
        series.extend(observations);
    }
    combined
}

/// Returns the secondary code [Observable] available in these observations:
/// C2C first, C2P otherwise. None when neither was observed.
pub fn secondary_code_band(observations: &[DenseMeasurement]) -> Option<Observable> {
    [Observable::C2C, Observable::C2P]
        .into_iter()
        .find(|band| observations.iter().any(|obs| obs.value(*band).is_some()))
}

/// Returns the ticks never recorded in between these chronological observations.
pub(crate) fn gaps(observations: &[DenseMeasurement]) -> impl Iterator<Item = u32> + '_ {
    observations
        .iter()
        .tuple_windows()
        .filter(|(prev, next)| next.tick > prev.tick + 1)
        .flat_map(|(prev, next)| prev.tick + 1..next.tick)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::{Constellation, SV};
    use std::str::FromStr;

    fn raw(sv: SV, tick: u32, observables: &[(Observable, f64)]) -> RawMeasurement {
        RawMeasurement {
            sv,
            tick,
            observables: observables.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn observable_parsing() {
        assert_eq!(Observable::from_str("C1C"), Ok(Observable::C1C));
        assert_eq!(Observable::from_str(" l2c"), Ok(Observable::L2C));
        assert!(Observable::from_str("D1C").is_err());
        assert_eq!(Observable::C2P.to_string(), "C2P");
    }

    #[test]
    fn band_swap() {
        let g01 = SV::new(Constellation::GPS, 1);
        let g02 = SV::new(Constellation::GPS, 2);
        let raw_obs = vec![
            vec![
                raw(g01, 0, &[(Observable::C1C, 1.0), (Observable::C2P, 2.0)]),
                raw(g02, 0, &[(Observable::C2C, 3.0), (Observable::C2P, 4.0)]),
            ],
            vec![
                raw(g01, 1, &[(Observable::C1C, 1.5), (Observable::C2P, 2.5)]),
                raw(g02, 1, &[(Observable::C2P, 5.0)]),
            ],
        ];

        let dense = from_raw_obs(&raw_obs);

        let g01_obs = &dense[&g01];
        assert_eq!(g01_obs.len(), 2);
        assert_eq!(g01_obs[0].c2c, Some(2.0));
        assert_eq!(g01_obs[0].c2p, None);
        assert_eq!(g01_obs[1].c2c, Some(2.5));

        // C2C partially observed: untouched
        let g02_obs = &dense[&g02];
        assert_eq!(g02_obs[0].c2c, Some(3.0));
        assert_eq!(g02_obs[1].c2c, None);
        assert_eq!(g02_obs[1].c2p, Some(5.0));
    }

    #[test]
    fn merging() {
        let g01 = SV::new(Constellation::GPS, 1);
        let r02 = SV::new(Constellation::Glonass, 2);

        let data1 = from_raw_obs(&[vec![raw(g01, 0, &[]), raw(g01, 1, &[])]]);
        let data2 = from_raw_obs(&[vec![raw(g01, 2, &[]), raw(r02, 2, &[])]]);

        let merged = merge_data(data1, data2);
        let ticks = merged[&g01].iter().map(|obs| obs.tick).collect::<Vec<_>>();
        assert_eq!(ticks, vec![0, 1, 2]);
        assert_eq!(merged[&r02].len(), 1);
    }

    #[test]
    fn secondary_band() {
        let mut obs = vec![DenseMeasurement::default(); 3];
        assert_eq!(secondary_code_band(&obs), None);
        obs[1].c2p = Some(1.0);
        assert_eq!(secondary_code_band(&obs), Some(Observable::C2P));
        obs[2].c2c = Some(1.0);
        assert_eq!(secondary_code_band(&obs), Some(Observable::C2C));
    }

    #[test]
    fn tick_gaps() {
        let obs = [100, 101, 103, 104, 108]
            .into_iter()
            .map(|tick| DenseMeasurement {
                tick,
                ..Default::default()
            })
            .collect::<Vec<_>>();
        assert_eq!(gaps(&obs).collect::<Vec<_>>(), vec![102, 105, 106, 107]);
    }

    #[test]
    fn receiver_epoch() {
        let obs = DenseMeasurement {
            recv_time_week: 2000,
            recv_time_sec: 30.0,
            ..Default::default()
        };
        let expected = Epoch::from_time_of_week(2000, 30_000_000_000, TimeScale::GPST);
        assert_eq!(obs.recv_epoch(), expected);
    }
}
