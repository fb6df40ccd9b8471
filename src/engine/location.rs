//! Climate-zone irradiance and performance-adjustment lookup.

use serde::Serialize;

use crate::config::{ClimateZone, SiteConditions};

/// Documented fallback irradiance for unrecognized climate zones
/// (kWh/m²/yr).
pub const DEFAULT_IRRADIANCE_KWH_M2_YR: f64 = 1200.0;

/// Climate-derived multipliers and loss factors for one site.
#[derive(Debug, Clone, Serialize)]
pub struct LocationFactors {
    /// Annual plane-of-array irradiance (kWh/m²/yr).
    pub solar_irradiance_kwh_m2_yr: f64,
    /// Relative output retained under high cell temperatures.
    pub high_temp_multiplier: f64,
    /// Relative output retained under low cell temperatures.
    pub low_temp_multiplier: f64,
    /// Annual module degradation rate (fraction per year).
    pub degradation_rate_per_yr: f64,
    /// Annual soiling loss (fraction).
    pub soiling_loss_fraction: f64,
    /// System availability (fraction of the year producing).
    pub availability: f64,
}

/// Pure lookup from site conditions to [`LocationFactors`].
///
/// No side effects and no failure modes: unknown climate zones fall back
/// to [`DEFAULT_IRRADIANCE_KWH_M2_YR`] with temperate adjustments.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationFactorCalculator;

impl LocationFactorCalculator {
    /// Derives climate factors for a site.
    pub fn derive(site: &SiteConditions) -> LocationFactors {
        let base_irradiance = match site.climate_zone {
            ClimateZone::Mediterranean => 1650.0,
            ClimateZone::Oceanic => 1250.0,
            ClimateZone::Continental => 1350.0,
            ClimateZone::Mountain => 1450.0,
            ClimateZone::Tropical => 1800.0,
            ClimateZone::SemiArid => 1900.0,
            ClimateZone::Unknown => DEFAULT_IRRADIANCE_KWH_M2_YR,
        };

        // Latitude refinement: low latitudes gain, high latitudes lose.
        let abs_lat = site.latitude.abs();
        let latitude_factor = if abs_lat < 25.0 {
            1.05
        } else if abs_lat > 50.0 {
            0.95
        } else {
            1.0
        };

        if site.climate_zone.is_hot() {
            LocationFactors {
                solar_irradiance_kwh_m2_yr: base_irradiance * latitude_factor,
                high_temp_multiplier: 0.92,
                low_temp_multiplier: 1.00,
                degradation_rate_per_yr: 0.006,
                soiling_loss_fraction: 0.04,
                availability: 0.98,
            }
        } else {
            LocationFactors {
                solar_irradiance_kwh_m2_yr: base_irradiance * latitude_factor,
                high_temp_multiplier: 0.97,
                low_temp_multiplier: 1.02,
                degradation_rate_per_yr: 0.005,
                soiling_loss_fraction: 0.02,
                availability: 0.99,
            }
        }
    }
}
