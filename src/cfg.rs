#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_MEAN_RADIUS_M, IONOSPHERE_ALTITUDE_M};

fn default_ionosphere_altitude() -> f64 {
    IONOSPHERE_ALTITUDE_M
}

fn default_sampling_interval() -> f64 {
    30.0
}

fn default_bandpass_min_period() -> f64 {
    600.0
}

fn default_bandpass_max_period() -> f64 {
    3600.0
}

fn default_min_filter_length() -> usize {
    16
}

/// Processing [Config]uration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Altitude of the thin ionosphere shell, above Earth mean radius, in meters.
    /// This is where pierce points are located.
    #[cfg_attr(feature = "serde", serde(default = "default_ionosphere_altitude"))]
    pub ionosphere_altitude_m: f64,
    /// Duration of one tick, in seconds.
    #[cfg_attr(feature = "serde", serde(default = "default_sampling_interval"))]
    pub sampling_interval_s: f64,
    /// Shortest disturbance period (in seconds) the band-pass filter lets through.
    #[cfg_attr(feature = "serde", serde(default = "default_bandpass_min_period"))]
    pub bandpass_min_period_s: f64,
    /// Longest disturbance period (in seconds) the band-pass filter lets through.
    #[cfg_attr(feature = "serde", serde(default = "default_bandpass_max_period"))]
    pub bandpass_max_period_s: f64,
    /// Connections with fewer samples are excluded from filtered views.
    /// Must exceed the padding of the zero phase filter.
    #[cfg_attr(feature = "serde", serde(default = "default_min_filter_length"))]
    pub min_filter_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ionosphere_altitude_m: default_ionosphere_altitude(),
            sampling_interval_s: default_sampling_interval(),
            bandpass_min_period_s: default_bandpass_min_period(),
            bandpass_max_period_s: default_bandpass_max_period(),
            min_filter_length: default_min_filter_length(),
        }
    }
}

impl Config {
    /// Ionosphere shell radius, in meters
    pub fn ionosphere_radius_m(&self) -> f64 {
        EARTH_MEAN_RADIUS_M + self.ionosphere_altitude_m
    }

    /// Sampling rate in Hz
    pub fn sampling_rate_hz(&self) -> f64 {
        1.0 / self.sampling_interval_s
    }

    /// Band-pass (low, high) cut-off frequencies, in Hz
    pub fn bandpass_cutoffs_hz(&self) -> (f64, f64) {
        (
            1.0 / self.bandpass_max_period_s,
            1.0 / self.bandpass_min_period_s,
        )
    }
}

#[cfg(test)]
mod test {
    use super::Config;
    use crate::constants::IONOSPHERE_RADIUS_M;

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.ionosphere_radius_m(), IONOSPHERE_RADIUS_M);
        let (low, high) = cfg.bandpass_cutoffs_hz();
        assert!(low < high);
        assert!(high < cfg.sampling_rate_hz() / 2.0);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn config_deserialization() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "ionosphere_altitude_m": 450000.0,
                "min_filter_length": 32
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.ionosphere_altitude_m, 450.0E3);
        assert_eq!(cfg.min_filter_length, 32);
        assert_eq!(cfg.sampling_interval_s, 30.0);
        assert_eq!(cfg.bandpass_min_period_s, 600.0);
    }
}
