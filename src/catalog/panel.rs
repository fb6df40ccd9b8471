use serde::{Deserialize, Serialize};

/// Cell temperature used for voltage ceilings (worst cold morning).
pub const COLD_EXTREME_C: f64 = -10.0;
/// Cell temperature used for current ceilings (worst hot operation).
pub const HOT_EXTREME_C: f64 = 85.0;
/// Standard Test Conditions cell temperature, the nameplate rating basis.
pub const STC_TEMP_C: f64 = 25.0;

/// An immutable PV module catalog record with STC electrical ratings.
///
/// All voltage/current accessors that feed safety envelopes go through
/// [`PanelSpec::voc_at`] / [`PanelSpec::isc_at`] so that compliance and
/// protection sizing always see temperature-corrected figures, never the
/// nameplate values.
///
/// # Examples
///
/// ```
/// use pv_design::catalog::PanelSpec;
///
/// let p = PanelSpec {
///     maker: "Helios".into(),
///     model: "HS-350M".into(),
///     power_w: 350.0,
///     voc_v: 45.0,
///     isc_a: 8.0,
///     vmp_v: 37.0,
///     imp_a: 9.46,
///     temp_coeff_voc_pct_per_c: -0.30,
///     temp_coeff_isc_pct_per_c: 0.05,
///     efficiency_pct: 19.8,
///     width_mm: 1046.0,
///     height_mm: 1690.0,
///     weight_kg: 19.5,
///     warranty_years: 25,
/// };
/// assert!((p.voc_at(-10.0) - 49.725).abs() < 1e-9);
/// assert!((p.isc_at(85.0) - 8.24).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSpec {
    /// Manufacturer name.
    pub maker: String,
    /// Model designation.
    pub model: String,
    /// Maximum power at STC (W).
    pub power_w: f64,
    /// Open-circuit voltage at STC (V).
    pub voc_v: f64,
    /// Short-circuit current at STC (A).
    pub isc_a: f64,
    /// Voltage at the maximum-power point at STC (V).
    pub vmp_v: f64,
    /// Current at the maximum-power point at STC (A).
    pub imp_a: f64,
    /// Voc temperature coefficient (%/°C, negative for silicon).
    pub temp_coeff_voc_pct_per_c: f64,
    /// Isc temperature coefficient (%/°C, positive for silicon).
    pub temp_coeff_isc_pct_per_c: f64,
    /// Module efficiency at STC (%).
    pub efficiency_pct: f64,
    /// Module width (mm).
    pub width_mm: f64,
    /// Module height (mm).
    pub height_mm: f64,
    /// Module weight (kg).
    pub weight_kg: f64,
    /// Product warranty (years).
    pub warranty_years: u32,
}

impl PanelSpec {
    /// Stable catalog key, `"<maker> <model>"`.
    pub fn key(&self) -> String {
        format!("{} {}", self.maker, self.model)
    }

    /// Open-circuit voltage corrected to the given cell temperature (V).
    pub fn voc_at(&self, temp_c: f64) -> f64 {
        self.voc_v * (1.0 + self.temp_coeff_voc_pct_per_c / 100.0 * (temp_c - STC_TEMP_C))
    }

    /// Short-circuit current corrected to the given cell temperature (A).
    pub fn isc_at(&self, temp_c: f64) -> f64 {
        self.isc_a * (1.0 + self.temp_coeff_isc_pct_per_c / 100.0 * (temp_c - STC_TEMP_C))
    }

    /// Maximum-power-point voltage corrected to the given cell temperature (V).
    ///
    /// Uses the Voc coefficient, the standard approximation when a
    /// dedicated Vmp coefficient is not published.
    pub fn vmp_at(&self, temp_c: f64) -> f64 {
        self.vmp_v * (1.0 + self.temp_coeff_voc_pct_per_c / 100.0 * (temp_c - STC_TEMP_C))
    }

    /// Maximum-power-point current corrected to the given cell temperature (A).
    pub fn imp_at(&self, temp_c: f64) -> f64 {
        self.imp_a * (1.0 + self.temp_coeff_isc_pct_per_c / 100.0 * (temp_c - STC_TEMP_C))
    }

    /// Module face area (m²).
    pub fn area_m2(&self) -> f64 {
        self.width_mm / 1000.0 * (self.height_mm / 1000.0)
    }

    /// STC power per square metre of module face (W/m²).
    pub fn power_density_w_m2(&self) -> f64 {
        let area = self.area_m2();
        if area > 0.0 { self.power_w / area } else { 0.0 }
    }
}
