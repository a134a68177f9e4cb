//! Tick to [Connection] lookups, over a set of connections
use log::debug;
use map_3d::{ecef2geodetic, rad2deg, Ellipsoid};

use crate::{
    filter::{bpfilter, fill_gaps},
    prelude::{Connection, Error, Vector3},
    sparse::{SparseList, TickLookup},
};

/// [ConnTickMap] efficiently converts a tick back into a [Connection],
/// and exposes per tick views of the data of all its connections.
pub struct ConnTickMap<'c, 'a> {
    connections: Vec<&'c Connection<'a>>,
}

impl<'c, 'a> ConnTickMap<'c, 'a> {
    pub fn new(connections: impl IntoIterator<Item = &'c Connection<'a>>) -> Self {
        Self {
            connections: connections.into_iter().collect(),
        }
    }

    pub fn connections(&self) -> &[&'c Connection<'a>] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Returns the [Connection] this tick belongs to.
    /// [Error::NoConnection] simply means we have no data for that tick.
    pub fn get(&self, tick: u32) -> Result<&'c Connection<'a>, Error> {
        self.connections
            .iter()
            .find(|conn| conn.contains(tick))
            .copied()
            .ok_or(Error::NoConnection(tick))
    }

    fn ranges(&self) -> Vec<(u32, u32)> {
        self.connections
            .iter()
            .map(|conn| (conn.tick_start, conn.tick_end))
            .collect()
    }

    fn lookups(&self) -> Vec<TickLookup<'c>> {
        self.connections
            .iter()
            .copied()
            .map(|conn| Box::new(move |tick| conn.tick_idx(tick)) as TickLookup<'c>)
            .collect()
    }

    /// Raw VTEC (TECu) per tick, 0.0 when unknown.
    /// Incomplete samples are unknown too.
    pub fn get_vtecs(&self) -> Result<SparseList<'c, f64>, Error> {
        let data = self
            .connections
            .iter()
            .map(|conn| -> Result<Vec<f64>, Error> {
                Ok(conn
                    .vtecs()?
                    .into_iter()
                    .map(|(vtec, _)| if vtec.is_finite() { vtec } else { 0.0 })
                    .collect())
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(SparseList::new(self.ranges(), data, self.lookups(), 0.0))
    }

    /// Band-pass filtered VTEC (TECu) per tick, 0.0 when unknown.
    /// Connections too short to be filtered do not contribute.
    /// Incomplete samples are interpolated prior filtering, then reported as unknown.
    pub fn get_filtered_vtecs(&self) -> Result<SparseList<'c, f64>, Error> {
        let mut ranges = Vec::with_capacity(self.connections.len());
        let mut data = Vec::with_capacity(self.connections.len());
        let mut lookups: Vec<TickLookup<'c>> = Vec::with_capacity(self.connections.len());

        for conn in self.connections.iter().copied() {
            let cfg = &conn.scenario().cfg;
            if conn.len() < cfg.min_filter_length {
                debug!(
                    "{}({}): [{}, {}] too short to be filtered",
                    conn.station, conn.sv, conn.tick_start, conn.tick_end
                );
                continue;
            }

            let vtecs = conn
                .vtecs()?
                .into_iter()
                .map(|(vtec, _)| vtec)
                .collect::<Vec<_>>();

            let Some(filled) = fill_gaps(&vtecs) else {
                debug!("{}({}): no valid sample to filter", conn.station, conn.sv);
                continue;
            };

            let (low, high) = cfg.bandpass_cutoffs_hz();
            let filtered: Vec<f64> = match bpfilter(&filled, low, high, cfg.sampling_rate_hz()) {
                Some(filtered) => filtered
                    .into_iter()
                    .zip(vtecs.iter())
                    .map(|(value, raw)| if raw.is_finite() { value } else { 0.0 })
                    .collect(),
                None => {
                    debug!("{}({}): could not be filtered", conn.station, conn.sv);
                    continue;
                },
            };

            ranges.push((conn.tick_start, conn.tick_end));
            data.push(filtered);
            lookups.push(Box::new(move |tick| conn.tick_idx(tick)));
        }

        Ok(SparseList::new(ranges, data, lookups, 0.0))
    }

    /// Ionospheric pierce points per tick (ECEF, m), None when unknown.
    pub fn get_ipps(&self) -> SparseList<'c, Option<Vector3<f64>>> {
        let data = self
            .connections
            .iter()
            .map(|conn| conn.ipps().into_iter().map(Some).collect())
            .collect();
        SparseList::new(self.ranges(), data, self.lookups(), None)
    }

    /// Ionospheric pierce points per tick as (latitude, longitude) in degrees,
    /// None when unknown.
    pub fn get_ipps_latlon(&self) -> SparseList<'c, Option<(f64, f64)>> {
        let data = self
            .connections
            .iter()
            .map(|conn| {
                conn.ipps()
                    .into_iter()
                    .map(|ipp| {
                        let (lat, lon, _) = ecef2geodetic(ipp.x, ipp.y, ipp.z, Ellipsoid::WGS84);
                        Some((rad2deg(lat), rad2deg(lon)))
                    })
                    .collect()
            })
            .collect();
        SparseList::new(self.ranges(), data, self.lookups(), None)
    }
}
