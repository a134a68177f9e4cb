
use log::LevelFilter;
use std::collections::HashMap;
use std::sync::Once;

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::{Config, DenseMeasurement, Scenario, Vector3, SV},
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

pub const STATION: &str = "STA1";

pub const GPS_FREQUENCIES: (f64, f64) = (1575.42E6, 1227.60E6);

/// Integer ambiguities of our synthetic carrier phases
pub const AMBIGUITIES: (i64, i64) = (1234, -5678);

/// Station on the equator, WGS84 surface
pub fn station_ecef() -> Vector3<f64> {
    Vector3::new(6378137.0, 0.0, 0.0)
}

/// Satellite right above [station_ecef]
pub fn zenith_sat() -> Vector3<f64> {
    Vector3::new(26_560.0E3, 0.0, 0.0)
}

/// Noiseless dual frequency observations of a satellite at zenith,
/// through an ionosphere of `tec(tick)` TECu.
pub fn synthetic_observations(
    frequencies: (f64, f64),
    ticks: &[u32],
    tec: impl Fn(u32) -> f64,
) -> Vec<DenseMeasurement> {
    let (f1, f2) = frequencies;
    let (n1, n2) = (AMBIGUITIES.0 as f64, AMBIGUITIES.1 as f64);
    let rho = (zenith_sat() - station_ecef()).norm();

    ticks
        .iter()
        .map(|tick| {
            let iono1 = 40.308E16 * tec(*tick) / f1.powi(2);
            let iono2 = 40.308E16 * tec(*tick) / f2.powi(2);
            DenseMeasurement {
                tick: *tick,
                c1c: Some(rho + iono1),
                c2c: Some(rho + iono2),
                l1c: Some((rho - iono1) * f1 / SPEED_OF_LIGHT_M_S + n1),
                l2c: Some((rho - iono2) * f2 / SPEED_OF_LIGHT_M_S + n2),
                recv_time_week: 2300,
                recv_time_sec: *tick as f64 * 30.0,
                sat_pos: zenith_sat(),
                sat_pos_final: zenith_sat(),
                is_processed: true,
                is_corrected: true,
                ..Default::default()
            }
        })
        .collect()
}

/// [Scenario] with a single station observing these satellites
pub fn scenario(data: Vec<(SV, Vec<DenseMeasurement>)>) -> Scenario {
    Scenario::new(Config::default()).with_station(
        STATION,
        station_ecef(),
        data.into_iter().collect::<HashMap<_, _>>(),
    )
}

/// GPS [Scenario] at 10 TECu, sampled at these ticks
pub fn scenario_with_ticks(sv: SV, ticks: &[u32]) -> Scenario {
    scenario(vec![(
        sv,
        synthetic_observations(GPS_FREQUENCIES, ticks, |_| 10.0),
    )])
}
