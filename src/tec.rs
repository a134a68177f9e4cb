//! Total Electron Content: the signal combinations and the
//! ionosphere geometry used to turn phase observations into TEC
use log::debug;

use crate::{
    constants::{EARTH_MEAN_RADIUS_M, K_TECU, SPEED_OF_LIGHT_M_S},
    observation::secondary_code_band,
    prelude::{Connection, DenseMeasurement, Error, Vector3},
};

/// Melbourne-Wübbena combination (m) for each observation. It should remain
/// constant during a single connection. None when frequencies are unknown
/// (GLONASS FDMA) or no secondary code phase was observed.
/// Incomplete observations yield NaN.
pub fn melbourne_wubbena(
    frequencies: Option<(f64, f64)>,
    observations: &[DenseMeasurement],
) -> Option<Vec<f64>> {
    let (f1, f2) = frequencies?;
    let chan2 = secondary_code_band(observations)?;

    Some(
        observations
            .iter()
            .map(|obs| {
                let (l1, l2) = (obs.l1c?, obs.l2c?);
                let (c1, c2) = (obs.c1c?, obs.value(chan2)?);
                let phase = SPEED_OF_LIGHT_M_S / (f1 - f2) * (l1 - l2);
                let pseudo_range = (f1 * c1 + f2 * c2) / (f1 + f2);
                Some(phase - pseudo_range)
            })
            .map(|mw| mw.unwrap_or(f64::NAN))
            .collect(),
    )
}

/// Strength of the ionospheric delay experienced by this frequency pair,
/// (f1² f2²) / (f1² - f2²), in s⁻².
pub fn delay_factor(f1: f64, f2: f64) -> f64 {
    (f1.powi(2) * f2.powi(2)) / (f1.powi(2) - f2.powi(2))
}

/// [delay_factor] of this [Connection]
pub fn calc_delay_factor(connection: &Connection) -> Result<f64, Error> {
    let (f1, f2) = connection.frequencies()?;
    Ok(delay_factor(f1, f2))
}

/// Calibrated delay difference (m) between both carriers, for each
/// observation: carrier difference, corrected by the connection
/// carrier correction and the satellite and receiver biases.
/// Incomplete observations yield NaN.
pub fn calc_carrier_delays(connection: &Connection) -> Result<Vec<f64>, Error> {
    let (f1, f2) = connection.frequencies()?;
    let correction = connection.carrier_correction_meters()?;

    let scenario = connection.scenario();
    let sat_bias = scenario.sat_bias(connection.sv);
    let station_bias = scenario.rcvr_bias(&connection.station);

    Ok(connection
        .observations()
        .iter()
        .map(|obs| match (obs.l1c, obs.l2c) {
            (Some(l1), Some(l2)) => {
                let raw_phase_difference_m = SPEED_OF_LIGHT_M_S * (l1 / f1 - l2 / f2);
                raw_phase_difference_m + correction + sat_bias - station_bias
            },
            _ => f64::NAN,
        })
        .collect())
}

/// Unitless factor scaling slant ionospheric measurements to their vertical
/// value, for this elevation (radians) and ionosphere shell radius (m).
pub fn s_to_v_factor(elevation: f64, ionosphere_radius: f64) -> f64 {
    (1.0 - (elevation.cos() * EARTH_MEAN_RADIUS_M / ionosphere_radius).powi(2)).sqrt()
}

/// Intersections of the receiver to satellite lines with the ionosphere shell
/// (ECEF, m), one per satellite position. Of both intersections, the one closest
/// to the receiver is retained.
pub fn ion_locs<'a>(
    rec_pos: &Vector3<f64>,
    sat_pos: impl IntoIterator<Item = &'a Vector3<f64>>,
    ionosphere_radius: f64,
) -> Vec<Vector3<f64>> {
    let c = rec_pos.norm_squared() - ionosphere_radius.powi(2);
    sat_pos
        .into_iter()
        .map(|sat| {
            let delta = sat - rec_pos;
            let a = delta.norm_squared();
            let b = 2.0 * delta.dot(rec_pos);

            let common = (b.powi(2) - 4.0 * a * c).sqrt() / (2.0 * a);
            let b_scaled = -b / (2.0 * a);
            let (t1, t2) = (b_scaled + common, b_scaled - common);
            let t = if t1.abs() < t2.abs() { t1 } else { t2 };

            rec_pos + delta * t
        })
        .collect()
}

/// (VTEC in TECu, slant to vertical factor) for each observation of this
/// [Connection]. STEC = delay factor × carrier delay / K, scaled to vertical.
pub fn calculate_vtecs(connection: &Connection) -> Result<Vec<(f64, f64)>, Error> {
    let factor = calc_delay_factor(connection)?;
    let delays = calc_carrier_delays(connection)?;
    let elevations = connection.elevation()?;
    let ionosphere_radius = connection.scenario().cfg.ionosphere_radius_m();

    debug!(
        "{}({}): delay factor {:.6E}, {} samples",
        connection.station,
        connection.sv,
        factor,
        delays.len()
    );

    Ok(delays
        .iter()
        .zip(elevations.iter())
        .map(|(delay, elevation)| {
            let stec = factor * delay / K_TECU;
            let s_to_v = s_to_v_factor(*elevation, ionosphere_radius);
            (stec * s_to_v, s_to_v)
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::IONOSPHERE_RADIUS_M;
    use rstest::rstest;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn gps_delay_factor() {
        let (f1, f2) = (1575.42e6_f64, 1227.60e6_f64);
        assert_eq!(
            delay_factor(f1, f2),
            (f1.powi(2) * f2.powi(2)) / (f1.powi(2) - f2.powi(2))
        );
        // 1m of P2-P1 is roughly 9.52 TECu
        let tecu_per_m = delay_factor(f1, f2) / K_TECU;
        assert!((tecu_per_m - 9.52).abs() < 0.01, "{}", tecu_per_m);
    }

    #[rstest]
    #[case(FRAC_PI_2, 1.0)]
    #[case(0.0, (1.0 - (EARTH_MEAN_RADIUS_M / IONOSPHERE_RADIUS_M).powi(2)).sqrt())]
    fn slant_to_vertical(#[case] elevation: f64, #[case] expected: f64) {
        let factor = s_to_v_factor(elevation, IONOSPHERE_RADIUS_M);
        assert!((factor - expected).abs() < 1.0E-12);
    }

    #[test]
    fn slant_to_vertical_decreasing() {
        let factors = (0..=90)
            .rev()
            .map(|deg| s_to_v_factor((deg as f64).to_radians(), IONOSPHERE_RADIUS_M))
            .collect::<Vec<_>>();
        assert_eq!(factors[0], 1.0);
        for pair in factors.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        // grazing limit when the shell reaches the surface
        assert!(s_to_v_factor(0.0, EARTH_MEAN_RADIUS_M).abs() < 1.0E-12);
    }

    #[rstest]
    #[case(Vector3::new(0.0, 0.0, 26_000.0E3))]
    #[case(Vector3::new(15_000.0E3, 5_000.0E3, 20_000.0E3))]
    #[case(Vector3::new(10_000.0E3, -5_000.0E3, 22_000.0E3))]
    fn pierce_points(#[case] sat: Vector3<f64>) {
        let receiver = Vector3::new(0.0, 0.0, EARTH_MEAN_RADIUS_M);
        let ipps = ion_locs(&receiver, [&sat], IONOSPHERE_RADIUS_M);
        assert_eq!(ipps.len(), 1);

        let ipp = ipps[0];
        assert!((ipp.norm() - IONOSPHERE_RADIUS_M).abs() < 1.0E-3);

        // between receiver and satellite
        let t = (ipp - receiver).dot(&(sat - receiver)) / (sat - receiver).norm_squared();
        assert!(t > 0.0 && t < 1.0);
        let on_line = receiver + (sat - receiver) * t;
        assert!((on_line - ipp).norm() < 1.0E-3);
    }

    #[test]
    fn pierce_points_zenith() {
        let receiver = Vector3::new(EARTH_MEAN_RADIUS_M, 0.0, 0.0);
        let sats = [
            Vector3::new(26_000.0E3, 0.0, 0.0),
            Vector3::new(20_000.0E3, 10_000.0E3, 0.0),
        ];
        let ipps = ion_locs(&receiver, sats.iter(), IONOSPHERE_RADIUS_M);
        assert_eq!(ipps.len(), 2);
        assert!((ipps[0] - Vector3::new(IONOSPHERE_RADIUS_M, 0.0, 0.0)).norm() < 1.0E-6);
        assert!((ipps[1].norm() - IONOSPHERE_RADIUS_M).abs() < 1.0E-3);
    }

    #[test]
    fn mw_not_computable() {
        let obs = vec![
            DenseMeasurement {
                c1c: Some(20.0E6),
                l1c: Some(1.0E8),
                l2c: Some(0.8E8),
                ..Default::default()
            };
            4
        ];
        assert!(melbourne_wubbena(None, &obs).is_none());
        // no secondary code phase
        assert!(melbourne_wubbena(Some((1575.42E6, 1227.60E6)), &obs).is_none());
    }

    #[test]
    fn mw_constant() {
        let (f1, f2) = (1575.42E6, 1227.60E6);
        let (lambda1, lambda2) = (SPEED_OF_LIGHT_M_S / f1, SPEED_OF_LIGHT_M_S / f2);
        let (n1, n2) = (1234.0, -567.0);

        // varying geometry and ionosphere, constant ambiguities
        let obs = (0..10)
            .map(|i| {
                let rho = 21.0E6 + i as f64 * 1.0E3;
                let iono1 = 3.0 + 0.1 * i as f64;
                let iono2 = iono1 * (f1 / f2).powi(2);
                DenseMeasurement {
                    tick: i,
                    c1c: Some(rho + iono1),
                    c2c: Some(rho + iono2),
                    l1c: Some((rho - iono1) / lambda1 + n1),
                    l2c: Some((rho - iono2) / lambda2 + n2),
                    ..Default::default()
                }
            })
            .collect::<Vec<_>>();

        let mw = melbourne_wubbena(Some((f1, f2)), &obs).unwrap();
        assert_eq!(mw.len(), 10);

        let expected = SPEED_OF_LIGHT_M_S / (f1 - f2) * (n1 - n2);
        for value in mw {
            assert!((value - expected).abs() < 1.0E-4, "{} != {}", value, expected);
        }
    }
}
