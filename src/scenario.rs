//! Station / satellite dataset that connections refer to
use std::collections::HashMap;

use log::debug;
use map_3d::{ecef2aer, ecef2geodetic, Ellipsoid};

use crate::{
    carrier::Carrier,
    prelude::{Config, DenseMeasurement, DenseMeasurements, Error, Vector3, SV},
};

/// [Scenario] gathers all observations for a set of stations over a time window,
/// the external data we need (station positions, GLONASS channels),
/// and the biases once they have been resolved.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    /// Processing [Config]
    pub cfg: Config,
    /// Approximate station positions, ECEF (m)
    pub station_locs: HashMap<String, Vector3<f64>>,
    /// Observations per station
    pub station_data: HashMap<String, DenseMeasurements>,
    /// GLONASS FDMA frequency channels
    pub glonass_channels: HashMap<SV, i8>,
    /// Satellite biases (m)
    pub sat_biases: HashMap<SV, f64>,
    /// Receiver biases (m)
    pub rcvr_biases: HashMap<String, f64>,
}

impl Scenario {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ..Default::default()
        }
    }

    /// Copies and returns [Scenario] with one more station.
    pub fn with_station(&self, station: &str, ecef_m: Vector3<f64>, data: DenseMeasurements) -> Self {
        let mut s = self.clone();
        s.station_locs.insert(station.to_string(), ecef_m);
        s.station_data.insert(station.to_string(), data);
        s
    }

    /// Copies and returns [Scenario] with GLONASS frequency channel defined for this [SV].
    pub fn with_glonass_channel(&self, sv: SV, channel: i8) -> Self {
        let mut s = self.clone();
        s.glonass_channels.insert(sv, channel);
        s
    }

    /// Copies and returns [Scenario] with resolved biases,
    /// as provided by the bias solver.
    pub fn with_biases(&self, sat_biases: HashMap<SV, f64>, rcvr_biases: HashMap<String, f64>) -> Self {
        let mut s = self.clone();
        s.sat_biases = sat_biases;
        s.rcvr_biases = rcvr_biases;
        s
    }

    /// Returns all observations of this [SV] by this station.
    pub fn observations(&self, station: &str, sv: SV) -> Result<&[DenseMeasurement], Error> {
        let data = self
            .station_data
            .get(station)
            .ok_or_else(|| Error::UnknownStation(station.to_string()))?;
        let observations = data.get(&sv).ok_or(Error::UnknownSatellite(sv))?;
        Ok(observations)
    }

    /// Returns station position, ECEF (m)
    pub fn station_loc(&self, station: &str) -> Result<Vector3<f64>, Error> {
        self.station_locs
            .get(station)
            .copied()
            .ok_or_else(|| Error::UnknownStation(station.to_string()))
    }

    /// GLONASS frequency channel of this [SV], if known
    pub fn get_glonass_chan(&self, sv: SV) -> Option<i8> {
        self.glonass_channels.get(&sv).copied()
    }

    /// (f1, f2) frequency pair in Hz, None when it cannot be determined
    /// (unsupported constellation, unknown GLONASS channel).
    pub fn get_frequencies(&self, sv: SV) -> Option<(f64, f64)> {
        let (c1, c2) = Carrier::dual_frequency(sv, self.get_glonass_chan(sv))?;
        Some((c1.frequency(), c2.frequency()))
    }

    /// Satellite bias (m), 0 when not resolved yet
    pub fn sat_bias(&self, sv: SV) -> f64 {
        self.sat_biases.get(&sv).copied().unwrap_or_default()
    }

    /// Receiver bias (m), 0 when not resolved yet
    pub fn rcvr_bias(&self, station: &str) -> f64 {
        self.rcvr_biases.get(station).copied().unwrap_or_default()
    }

    /// Elevation (in radians) of satellites at these ECEF positions (m),
    /// seen from this station.
    pub fn station_el<'a>(
        &self,
        station: &str,
        sat_pos: impl IntoIterator<Item = &'a Vector3<f64>>,
    ) -> Result<Vec<f64>, Error> {
        let loc = self.station_loc(station)?;
        let (lat, lon, alt) = ecef2geodetic(loc.x, loc.y, loc.z, Ellipsoid::WGS84);
        debug!(
            "{}: lat={:.4}° lon={:.4}° alt={:.1}m",
            station,
            lat.to_degrees(),
            lon.to_degrees(),
            alt
        );
        Ok(sat_pos
            .into_iter()
            .map(|pos| {
                let (_, elev, _) = ecef2aer(pos.x, pos.y, pos.z, lat, lon, alt, Ellipsoid::WGS84);
                elev
            })
            .collect())
    }
}
