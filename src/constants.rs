use anise::constants::SPEED_OF_LIGHT_KM_S;

/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = SPEED_OF_LIGHT_KM_S * 1000.0;

/// Earth mean radius (meters)
pub const EARTH_MEAN_RADIUS_M: f64 = 6371.0E3;

/// Default ionosphere shell altitude above [EARTH_MEAN_RADIUS_M] (meters)
pub const IONOSPHERE_ALTITUDE_M: f64 = 350.0E3;

/// Default ionosphere shell radius (meters), where pierce points are located
pub const IONOSPHERE_RADIUS_M: f64 = EARTH_MEAN_RADIUS_M + IONOSPHERE_ALTITUDE_M;

/// Ionospheric refraction constant scaled to TEC units: 40.308 m³.s⁻² × 10¹⁶ e⁻.m⁻²
pub const K_TECU: f64 = 40.308E16;
