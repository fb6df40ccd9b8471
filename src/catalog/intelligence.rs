use serde::{Deserialize, Serialize};

/// Fallback reliability score when no profile exists (0–100 scale).
pub const DEFAULT_RELIABILITY: f64 = 70.0;
/// Fallback panel price per STC watt (currency units / W).
pub const DEFAULT_PANEL_PRICE_PER_W: f64 = 0.55;
/// Fallback inverter price per rated AC watt (currency units / W).
pub const DEFAULT_INVERTER_PRICE_PER_W: f64 = 0.18;
/// Fallback hot-climate performance multiplier.
pub const DEFAULT_HOT_MULTIPLIER: f64 = 0.92;
/// Fallback cold-climate performance multiplier.
pub const DEFAULT_COLD_MULTIPLIER: f64 = 1.00;

/// Derived quality signals for one catalog component.
///
/// Produced by a market-intelligence job outside this engine; coverage is
/// partial by design, so every consumer goes through [`QualitySignals`]
/// rather than reading a profile directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceProfile {
    /// Reliability score on a 0–100 scale.
    pub reliability_score: f64,
    /// Estimated street price (currency units).
    pub market_price: f64,
    /// Relative output retained in hot climates (around 1.0).
    pub hot_climate_multiplier: f64,
    /// Relative output retained in cold climates (around 1.0).
    pub cold_climate_multiplier: f64,
}

/// Quality signals resolved to concrete values.
///
/// The explicit "present or documented default" contract: a missing
/// [`IntelligenceProfile`] degrades to the `DEFAULT_*` constants and
/// never fails the pipeline. `from_profile` records which side of the
/// contract produced the values.
#[derive(Debug, Clone, Serialize)]
pub struct QualitySignals {
    /// Reliability score on a 0–100 scale.
    pub reliability: f64,
    /// Estimated street price (currency units).
    pub price: f64,
    /// Relative output retained in hot climates.
    pub hot_multiplier: f64,
    /// Relative output retained in cold climates.
    pub cold_multiplier: f64,
    /// Whether a real profile backed these values.
    pub from_profile: bool,
}

impl QualitySignals {
    /// Resolves signals for a panel rated `power_w`.
    pub fn for_panel(profile: Option<&IntelligenceProfile>, power_w: f64) -> Self {
        Self::resolve(profile, DEFAULT_PANEL_PRICE_PER_W * power_w)
    }

    /// Resolves signals for an inverter rated `max_ac_power_w`.
    pub fn for_inverter(profile: Option<&IntelligenceProfile>, max_ac_power_w: f64) -> Self {
        Self::resolve(profile, DEFAULT_INVERTER_PRICE_PER_W * max_ac_power_w)
    }

    fn resolve(profile: Option<&IntelligenceProfile>, default_price: f64) -> Self {
        match profile {
            Some(p) => Self {
                reliability: p.reliability_score.clamp(0.0, 100.0),
                price: p.market_price.max(0.0),
                hot_multiplier: p.hot_climate_multiplier,
                cold_multiplier: p.cold_climate_multiplier,
                from_profile: true,
            },
            None => Self {
                reliability: DEFAULT_RELIABILITY,
                price: default_price,
                hot_multiplier: DEFAULT_HOT_MULTIPLIER,
                cold_multiplier: DEFAULT_COLD_MULTIPLIER,
                from_profile: false,
            },
        }
    }
}
