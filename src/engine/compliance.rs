//! Electrical, building, and utility rule evaluation plus protection
//! device sizing for the winning selection.

use std::fmt;

use serde::Serialize;

use crate::catalog::panel::{COLD_EXTREME_C, HOT_EXTREME_C};
use crate::config::{DesignRequirements, RoofKind, Shading};
use crate::engine::array::{POWER_RATIO_MAX, POWER_RATIO_MIN};
use crate::engine::types::EquipmentSelection;

/// Copper resistivity (Ω·mm²/m) for the voltage-drop model.
const COPPER_RESISTIVITY: f64 = 0.01724;
/// Modeled one-way DC cable run (m).
const DC_RUN_LENGTH_M: f64 = 25.0;
/// Modeled one-way AC cable run (m).
const AC_RUN_LENGTH_M: f64 = 10.0;
/// Nominal single-phase grid voltage (V).
const GRID_NOMINAL_V: f64 = 230.0;
/// Tolerated inverter/grid voltage mismatch (V).
const GRID_TOLERANCE_V: f64 = 10.0;
/// DC power above which residential interconnection needs utility review (W).
const RESIDENTIAL_DC_CAP_W: f64 = 9000.0;

/// Standard cable sections (mm²) and their ampacity ceilings (A).
const AMPACITY_LADDER: &[(f64, f64)] = &[
    (2.5, 16.0),
    (4.0, 25.0),
    (6.0, 32.0),
    (10.0, 50.0),
    (16.0, 63.0),
    (25.0, 80.0),
    (35.0, 100.0),
    (50.0, 125.0),
];

/// Issue severity; only the first three reduce the compliance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Advisory,
}

impl Severity {
    fn score_deduction(self) -> f64 {
        match self {
            Self::Critical => 25.0,
            Self::Error => 15.0,
            Self::Warning => 5.0,
            Self::Advisory => 0.0,
        }
    }
}

/// Which rule family raised an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    Electrical,
    Building,
    Utility,
}

/// One violated or advisory rule.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceIssue {
    /// Rule family.
    pub family: RuleFamily,
    /// Severity tag.
    pub severity: Severity,
    /// What was violated.
    pub description: String,
    /// Standard the rule is modeled on.
    pub standard: String,
    /// Suggested remedy.
    pub recommendation: String,
}

/// Protection-device ratings derived from temperature-corrected figures.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectionRequirements {
    /// String fuse rating, `1.25 × Isc(85 °C)` (A).
    pub dc_fuse_current_a: f64,
    /// String fuse voltage rating, `ceil(string Voc(−10 °C))` (V).
    pub dc_fuse_voltage_v: f64,
    /// AC breaker rating, `1.25 × inverter max output current` (A).
    pub ac_breaker_current_a: f64,
    /// DC disconnect voltage rating (V).
    pub dc_disconnect_voltage_v: f64,
    /// Surge-protection device requirement.
    pub surge_protection: String,
    /// String cable section from the ampacity ladder (mm²).
    pub dc_cable_section_mm2: f64,
    /// AC cable section from the ampacity ladder (mm²).
    pub ac_cable_section_mm2: f64,
    /// DC-side voltage drop over the modeled run (% of string Vmp).
    pub dc_voltage_drop_pct: f64,
    /// AC-side voltage drop over the modeled run (% of grid nominal).
    pub ac_voltage_drop_pct: f64,
}

/// Aggregate rule-evaluation result.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceResult {
    /// No blocking electrical issue (critical severity).
    pub electrical_code_compliant: bool,
    /// Building rules are advisory-only and always pass.
    pub building_code_compliant: bool,
    /// No utility error.
    pub utility_compliant: bool,
    /// Ordered issue list, evaluation order.
    pub issues: Vec<ComplianceIssue>,
    /// 100 minus per-issue deductions, floored at 0.
    pub score: f64,
    /// Advisory recommendations (building and siting).
    pub recommendations: Vec<String>,
    /// Derived protection-device ratings.
    pub protection: ProtectionRequirements,
}

impl fmt::Display for ComplianceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Compliance ---")?;
        writeln!(f, "Score:                 {:.0}/100", self.score)?;
        writeln!(
            f,
            "Electrical code:       {}",
            if self.electrical_code_compliant { "pass" } else { "FAIL" }
        )?;
        writeln!(
            f,
            "Utility connection:    {}",
            if self.utility_compliant { "pass" } else { "FAIL" }
        )?;
        writeln!(f, "Issues:                {}", self.issues.len())?;
        for issue in &self.issues {
            writeln!(
                f,
                "  [{:?}/{:?}] {} ({})",
                issue.family, issue.severity, issue.description, issue.standard
            )?;
        }
        write!(
            f,
            "Protection:            DC fuse {:.0} A / {:.0} V, AC breaker {:.0} A, \
             cables {:.1}/{:.1} mm², DC drop {:.2}%",
            self.protection.dc_fuse_current_a.ceil(),
            self.protection.dc_fuse_voltage_v,
            self.protection.ac_breaker_current_a.ceil(),
            self.protection.dc_cable_section_mm2,
            self.protection.ac_cable_section_mm2,
            self.protection.dc_voltage_drop_pct,
        )
    }
}

/// State-free rule evaluator over the winning selection.
///
/// Electrical limits are re-derived here from the panel's
/// temperature-corrected figures even though the topology search already
/// enforced them: a deliberate double-check against configuration
/// drift.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComplianceChecker;

impl ComplianceChecker {
    /// Evaluates all three rule families and sizes protection devices.
    pub fn check(
        selection: &EquipmentSelection,
        requirements: &DesignRequirements,
    ) -> ComplianceResult {
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        Self::check_electrical(selection, &mut issues);
        Self::check_building(selection, requirements, &mut recommendations);
        Self::check_utility(selection, &mut issues, &mut recommendations);

        let score = (100.0
            - issues
                .iter()
                .map(|i| i.severity.score_deduction())
                .sum::<f64>())
        .max(0.0);

        let electrical_code_compliant = !issues
            .iter()
            .any(|i| i.family == RuleFamily::Electrical && i.severity == Severity::Critical);
        let utility_compliant = !issues.iter().any(|i| {
            i.family == RuleFamily::Utility
                && matches!(i.severity, Severity::Critical | Severity::Error)
        });

        ComplianceResult {
            electrical_code_compliant,
            building_code_compliant: true,
            utility_compliant,
            issues,
            score,
            recommendations,
            protection: Self::protection(selection),
        }
    }

    fn check_electrical(selection: &EquipmentSelection, issues: &mut Vec<ComplianceIssue>) {
        let panel = &selection.panel;
        let inverter = &selection.inverter;
        let array = &selection.array;

        let voc_cold = panel.voc_at(COLD_EXTREME_C);
        let vmp_hot = panel.vmp_at(HOT_EXTREME_C);
        let isc_hot = panel.isc_at(HOT_EXTREME_C);
        let pps = f64::from(array.panels_per_string);

        let string_voc_cold = pps * voc_cold;
        if string_voc_cold > inverter.max_dc_voltage_v {
            issues.push(ComplianceIssue {
                family: RuleFamily::Electrical,
                severity: Severity::Critical,
                description: format!(
                    "string open-circuit voltage {string_voc_cold:.1} V at -10 °C exceeds the \
                     inverter maximum of {:.0} V",
                    inverter.max_dc_voltage_v
                ),
                standard: "UTE C15-712-1".to_string(),
                recommendation: "reduce panels per string".to_string(),
            });
        }

        let string_vmp_hot = pps * vmp_hot;
        if string_vmp_hot < inverter.mppt_min_v {
            issues.push(ComplianceIssue {
                family: RuleFamily::Electrical,
                severity: Severity::Error,
                description: format!(
                    "string operating voltage {string_vmp_hot:.1} V at 85 °C falls below the \
                     MPPT floor of {:.0} V",
                    inverter.mppt_min_v
                ),
                standard: "UTE C15-712-1".to_string(),
                recommendation: "add panels per string".to_string(),
            });
        }

        let strings_per_tracker =
            (array.string_count).div_ceil(selection.inverter.mppt_count.max(1));
        let tracker_current = isc_hot * f64::from(strings_per_tracker);
        if tracker_current > inverter.max_input_current_a {
            issues.push(ComplianceIssue {
                family: RuleFamily::Electrical,
                severity: Severity::Critical,
                description: format!(
                    "tracker current {tracker_current:.2} A at 85 °C exceeds the MPPT input \
                     rating of {:.1} A",
                    inverter.max_input_current_a
                ),
                standard: "UTE C15-712-1".to_string(),
                recommendation: "reduce parallel strings per tracker".to_string(),
            });
        }

        let array_isc = isc_hot * f64::from(array.string_count);
        if array_isc > inverter.max_short_circuit_current_a {
            issues.push(ComplianceIssue {
                family: RuleFamily::Electrical,
                severity: Severity::Critical,
                description: format!(
                    "array short-circuit current {array_isc:.2} A at 85 °C exceeds the \
                     inverter ceiling of {:.1} A",
                    inverter.max_short_circuit_current_a
                ),
                standard: "UTE C15-712-1".to_string(),
                recommendation: "reduce parallel strings".to_string(),
            });
        }

        if array.power_ratio < POWER_RATIO_MIN || array.power_ratio > POWER_RATIO_MAX {
            issues.push(ComplianceIssue {
                family: RuleFamily::Electrical,
                severity: Severity::Warning,
                description: format!(
                    "DC/AC ratio {:.2} lies outside the {POWER_RATIO_MIN}-{POWER_RATIO_MAX} \
                     oversizing band",
                    array.power_ratio
                ),
                standard: "UTE C15-712-1".to_string(),
                recommendation: "resize the array toward a 1.1 ratio".to_string(),
            });
        }
    }

    fn check_building(
        selection: &EquipmentSelection,
        requirements: &DesignRequirements,
        recommendations: &mut Vec<String>,
    ) {
        let panel = &selection.panel;
        let array = &selection.array;
        let area = panel.area_m2() * f64::from(array.total_panels);
        let load_kg_m2 = if area > 0.0 {
            panel.weight_kg * f64::from(array.total_panels) / area
        } else {
            0.0
        };

        let roof_allowance_kg_m2 = match requirements.roof.kind {
            RoofKind::Tile => 20.0,
            RoofKind::Metal => 18.0,
            RoofKind::Flat => 25.0,
            RoofKind::Ground => 40.0,
        };
        if load_kg_m2 > roof_allowance_kg_m2 * 0.8 {
            recommendations.push(format!(
                "array load {load_kg_m2:.1} kg/m² approaches the {roof_allowance_kg_m2:.0} kg/m² \
                 allowance for this roof; request a structural assessment"
            ));
        } else {
            recommendations.push(format!(
                "confirm the roof structure carries the {load_kg_m2:.1} kg/m² array load"
            ));
        }

        recommendations.push(
            "keep fire-service setbacks clear along the ridge and array perimeter".to_string(),
        );
        recommendations.push(match requirements.roof.kind {
            RoofKind::Tile => "use through-tile hooks rated for the local wind zone".to_string(),
            RoofKind::Metal => "use seam clamps; do not pierce the weather membrane".to_string(),
            RoofKind::Flat => "use ballasted mounting and verify drainage paths".to_string(),
            RoofKind::Ground => "anchor the ground mount per the geotechnical survey".to_string(),
        });
        recommendations
            .push("leave a maintenance corridor reaching every string connector".to_string());

        if requirements.roof.shading == Shading::Heavy {
            recommendations.push(
                "heavy shading reported: consider per-module optimizers before finalizing"
                    .to_string(),
            );
        }
    }

    fn check_utility(
        selection: &EquipmentSelection,
        issues: &mut Vec<ComplianceIssue>,
        recommendations: &mut Vec<String>,
    ) {
        let inverter = &selection.inverter;

        let mismatch = (inverter.output_voltage_v - GRID_NOMINAL_V).abs();
        if mismatch > GRID_TOLERANCE_V {
            issues.push(ComplianceIssue {
                family: RuleFamily::Utility,
                severity: Severity::Error,
                description: format!(
                    "inverter output {:.0} V differs from the {GRID_NOMINAL_V:.0} V grid \
                     nominal by more than {GRID_TOLERANCE_V:.0} V",
                    inverter.output_voltage_v
                ),
                standard: "EN 50160".to_string(),
                recommendation: "select an inverter matched to the local grid voltage".to_string(),
            });
        }

        if selection.array.total_power_w > RESIDENTIAL_DC_CAP_W {
            issues.push(ComplianceIssue {
                family: RuleFamily::Utility,
                severity: Severity::Advisory,
                description: format!(
                    "array DC power {:.0} W exceeds the {RESIDENTIAL_DC_CAP_W:.0} W residential \
                     cap and needs utility review",
                    selection.array.total_power_w
                ),
                standard: "Enedis DIN".to_string(),
                recommendation: "file a three-phase interconnection request".to_string(),
            });
        }

        recommendations
            .push("inverter must carry VDE 0126-1-1 anti-islanding certification".to_string());
        recommendations
            .push("fit a production meter on the AC side of the main breaker".to_string());
    }

    fn protection(selection: &EquipmentSelection) -> ProtectionRequirements {
        let panel = &selection.panel;
        let array = &selection.array;

        let string_isc_hot = panel.isc_at(HOT_EXTREME_C);
        let dc_fuse_current_a = 1.25 * string_isc_hot;
        let dc_fuse_voltage_v =
            (f64::from(array.panels_per_string) * panel.voc_at(COLD_EXTREME_C)).ceil();
        let ac_breaker_current_a = 1.25 * selection.inverter.max_output_current_a();

        let dc_cable_section_mm2 = cable_section_mm2(dc_fuse_current_a);
        let ac_cable_section_mm2 = cable_section_mm2(ac_breaker_current_a);

        // Resistive drop over the out-and-back runs at operating current.
        let string_vmp = f64::from(array.panels_per_string) * panel.vmp_v;
        let dc_drop_v =
            panel.imp_a * COPPER_RESISTIVITY * 2.0 * DC_RUN_LENGTH_M / dc_cable_section_mm2;
        let dc_voltage_drop_pct = if string_vmp > 0.0 {
            dc_drop_v / string_vmp * 100.0
        } else {
            0.0
        };
        let ac_drop_v = selection.inverter.max_output_current_a()
            * COPPER_RESISTIVITY
            * 2.0
            * AC_RUN_LENGTH_M
            / ac_cable_section_mm2;
        let ac_voltage_drop_pct = ac_drop_v / GRID_NOMINAL_V * 100.0;

        ProtectionRequirements {
            dc_fuse_current_a,
            dc_fuse_voltage_v,
            ac_breaker_current_a,
            dc_disconnect_voltage_v: dc_fuse_voltage_v,
            surge_protection: format!("Type II SPD, Uc >= {dc_fuse_voltage_v:.0} V DC"),
            dc_cable_section_mm2,
            ac_cable_section_mm2,
            dc_voltage_drop_pct,
            ac_voltage_drop_pct,
        }
    }
}

/// Smallest ladder section whose ampacity covers `current_a`; currents
/// beyond the ladder take the largest section.
fn cable_section_mm2(current_a: f64) -> f64 {
    for &(section, ampacity) in AMPACITY_LADDER {
        if current_a <= ampacity {
            return section;
        }
    }
    AMPACITY_LADDER[AMPACITY_LADDER.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::compatibility::CompatibilityRecord;
    use crate::catalog::intelligence::QualitySignals;
    use crate::catalog::inverter::InverterSpec;
    use crate::catalog::panel::PanelSpec;
    use crate::engine::array::ArrayConfigurator;
    use crate::engine::types::{ArrayConfiguration, ScoreBreakdown};

    fn panel() -> PanelSpec {
        PanelSpec {
            maker: "Helios".to_string(),
            model: "HS-350M".to_string(),
            power_w: 350.0,
            voc_v: 45.0,
            isc_a: 8.0,
            vmp_v: 37.0,
            imp_a: 9.46,
            temp_coeff_voc_pct_per_c: -0.30,
            temp_coeff_isc_pct_per_c: 0.05,
            efficiency_pct: 19.8,
            width_mm: 1046.0,
            height_mm: 1690.0,
            weight_kg: 19.5,
            warranty_years: 25,
        }
    }

    fn inverter() -> InverterSpec {
        InverterSpec {
            maker: "Vertex".to_string(),
            model: "VX-5000".to_string(),
            max_ac_power_w: 5000.0,
            max_dc_voltage_v: 600.0,
            mppt_min_v: 150.0,
            mppt_max_v: 550.0,
            max_input_current_a: 15.0,
            max_short_circuit_current_a: 20.0,
            mppt_count: 2,
            output_voltage_v: 230.0,
            output_frequency_hz: 50.0,
            warranty_years: 10,
        }
    }

    fn selection_with(array: ArrayConfiguration) -> EquipmentSelection {
        let p = panel();
        let i = inverter();
        EquipmentSelection {
            panel_signals: QualitySignals::for_panel(None, p.power_w),
            inverter_signals: QualitySignals::for_inverter(None, i.max_ac_power_w),
            compatibility: CompatibilityRecord::clean_fallback(p.key(), i.key()),
            panel: p,
            inverter: i,
            array,
            score: 0.0,
            breakdown: ScoreBreakdown {
                ratio_score: 0.0,
                compatibility_score: 0.0,
                reliability_score: 0.0,
                priority_score: 0.0,
                climate_score: 0.0,
            },
        }
    }

    fn admissible_selection() -> EquipmentSelection {
        let req = DesignRequirements::baseline();
        let array = ArrayConfigurator::configure(&panel(), &inverter(), &req);
        assert!(array.compatible, "fixture must be admissible");
        selection_with(array)
    }

    #[test]
    fn admissible_design_has_no_blocking_issues() {
        let result =
            ComplianceChecker::check(&admissible_selection(), &DesignRequirements::baseline());
        assert!(result.electrical_code_compliant);
        assert!(result.utility_compliant);
        assert!(result.building_code_compliant);
        assert_eq!(result.score, 100.0);
        // Building rules always emit recommendations.
        assert!(!result.recommendations.is_empty());
    }

    #[test]
    fn overvoltage_string_is_critical_and_non_compliant() {
        let mut selection = admissible_selection();
        // 13 × 49.725 V = 646.4 V, above the 600 V ceiling.
        selection.array.panels_per_string = 13;
        let result = ComplianceChecker::check(&selection, &DesignRequirements::baseline());
        assert!(!result.electrical_code_compliant);
        assert!(result.issues.iter().any(|i| {
            i.family == RuleFamily::Electrical
                && i.severity == Severity::Critical
                && i.description.contains("open-circuit voltage")
        }));
        assert!(result.score <= 75.0);
    }

    #[test]
    fn short_string_below_mppt_floor_is_an_error() {
        let mut selection = admissible_selection();
        // 4 × 30.34 V = 121.4 V, below the 150 V MPPT floor.
        selection.array.panels_per_string = 4;
        let result = ComplianceChecker::check(&selection, &DesignRequirements::baseline());
        assert!(result.issues.iter().any(|i| {
            i.family == RuleFamily::Electrical && i.severity == Severity::Error
        }));
        // An error alone does not revoke electrical-code compliance.
        assert!(result.electrical_code_compliant);
        assert!(result.score <= 85.0);
    }

    #[test]
    fn excess_strings_trip_both_current_rules() {
        let mut selection = admissible_selection();
        selection.array.string_count = 4; // 32.96 A array, 16.48 A per tracker
        let result = ComplianceChecker::check(&selection, &DesignRequirements::baseline());
        let criticals = result
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count();
        assert_eq!(criticals, 2);
        assert!(!result.electrical_code_compliant);
    }

    #[test]
    fn off_band_ratio_is_a_warning_only() {
        let mut selection = admissible_selection();
        selection.array.power_ratio = 1.45;
        let result = ComplianceChecker::check(&selection, &DesignRequirements::baseline());
        assert!(result.issues.iter().any(|i| i.severity == Severity::Warning));
        assert!(result.electrical_code_compliant);
        assert_eq!(result.score, 95.0);
    }

    #[test]
    fn grid_voltage_mismatch_is_a_utility_error() {
        let mut selection = admissible_selection();
        selection.inverter.output_voltage_v = 208.0;
        let result = ComplianceChecker::check(&selection, &DesignRequirements::baseline());
        assert!(!result.utility_compliant);
        assert!(result.issues.iter().any(|i| {
            i.family == RuleFamily::Utility && i.severity == Severity::Error
        }));
    }

    #[test]
    fn oversized_array_gets_utility_advisory_without_deduction() {
        let mut selection = admissible_selection();
        selection.array.total_power_w = 9600.0;
        let result = ComplianceChecker::check(&selection, &DesignRequirements::baseline());
        assert!(result.issues.iter().any(|i| {
            i.family == RuleFamily::Utility && i.severity == Severity::Advisory
        }));
        assert_eq!(result.score, 100.0);
        assert!(result.utility_compliant);
    }

    #[test]
    fn protection_sizing_uses_corrected_figures() {
        let result =
            ComplianceChecker::check(&admissible_selection(), &DesignRequirements::baseline());
        let p = &result.protection;
        // 1.25 × 8.24 A and ceil(8 × 49.725 V)
        assert!((p.dc_fuse_current_a - 10.3).abs() < 1e-9);
        assert_eq!(p.dc_fuse_voltage_v, 398.0);
        // 1.25 × 5000/230 A
        assert!((p.ac_breaker_current_a - 1.25 * 5000.0 / 230.0).abs() < 1e-9);
        assert_eq!(p.dc_cable_section_mm2, 2.5);
        assert_eq!(p.ac_cable_section_mm2, 6.0);
        assert!(p.dc_voltage_drop_pct > 0.0 && p.dc_voltage_drop_pct < 3.0);
        assert!(p.ac_voltage_drop_pct > 0.0 && p.ac_voltage_drop_pct < 1.0);
    }

    #[test]
    fn cable_ladder_maps_current_bands() {
        assert_eq!(cable_section_mm2(10.0), 2.5);
        assert_eq!(cable_section_mm2(16.0), 2.5);
        assert_eq!(cable_section_mm2(16.1), 4.0);
        assert_eq!(cable_section_mm2(30.0), 6.0);
        assert_eq!(cable_section_mm2(45.0), 10.0);
        assert_eq!(cable_section_mm2(70.0), 25.0);
        assert_eq!(cable_section_mm2(99.0), 35.0);
        assert_eq!(cable_section_mm2(500.0), 50.0);
    }

    #[test]
    fn score_is_floored_at_zero() {
        let mut selection = admissible_selection();
        selection.array.panels_per_string = 30; // overvoltage critical
        selection.array.string_count = 6; // two current criticals
        selection.array.power_ratio = 3.0; // warning
        selection.inverter.mppt_min_v = 1000.0; // MPPT floor error
        selection.inverter.output_voltage_v = 120.0; // utility error
        let result = ComplianceChecker::check(&selection, &DesignRequirements::baseline());
        assert_eq!(result.score, 0.0);
        assert!(!result.electrical_code_compliant);
    }

    #[test]
    fn heavy_shading_adds_optimizer_recommendation() {
        let mut req = DesignRequirements::baseline();
        req.roof.shading = Shading::Heavy;
        let result = ComplianceChecker::check(&admissible_selection(), &req);
        assert!(
            result
                .recommendations
                .iter()
                .any(|r| r.contains("optimizers"))
        );
    }
}
