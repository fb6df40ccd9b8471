//! Human-readable and JSON rendering of a design outcome.

use std::fmt;

use crate::engine::types::DesignOutcome;

impl fmt::Display for DesignOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selection = &self.selection;
        let array = &selection.array;

        writeln!(f, "--- Equipment Selection ---")?;
        writeln!(
            f,
            "Panel:                 {} ({:.0} W, {:.1}% eff)",
            selection.panel.key(),
            selection.panel.power_w,
            selection.panel.efficiency_pct
        )?;
        writeln!(
            f,
            "Inverter:              {} ({:.0} W AC, {} MPPT)",
            selection.inverter.key(),
            selection.inverter.max_ac_power_w,
            selection.inverter.mppt_count
        )?;
        writeln!(
            f,
            "Array:                 {} × {} panels = {:.0} W DC (ratio {:.2})",
            array.string_count, array.panels_per_string, array.total_power_w, array.power_ratio
        )?;
        writeln!(
            f,
            "Envelope:              {:.1} V max / {:.1} V min, {:.2} A max",
            array.max_string_voltage_v, array.min_string_voltage_v, array.max_array_current_a
        )?;
        writeln!(
            f,
            "Combination score:     {:.1} (ratio {:.0}, compat {:.0}, reliab {:.0}, \
             priority {:.0}, climate {:.0})",
            selection.score,
            selection.breakdown.ratio_score,
            selection.breakdown.compatibility_score,
            selection.breakdown.reliability_score,
            selection.breakdown.priority_score,
            selection.breakdown.climate_score
        )?;
        writeln!(
            f,
            "Site factors:          {:.0} kWh/m²/yr, {} zone",
            self.location.solar_irradiance_kwh_m2_yr, self.requirements.site.climate_zone
        )?;

        if let Some(production) = &self.production {
            writeln!(
                f,
                "Simulated yield:       {:.0} kWh/yr (CF {:.1}%, PR {:.2})",
                production.annual_energy_kwh,
                production.capacity_factor * 100.0,
                production.performance_ratio
            )?;
        }

        writeln!(f)?;
        writeln!(f, "{}", self.compliance)?;
        writeln!(f)?;
        write!(f, "{}", self.financial)
    }
}

/// Serializes the complete outcome as pretty-printed JSON.
///
/// Non-finite metrics (payback that never occurs, LCOE with zero
/// production) serialize as `null`.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails.
pub fn to_json(outcome: &DesignOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}
