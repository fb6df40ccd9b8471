//! Read-only catalog store with CSV loaders and a built-in demo set.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::catalog::compatibility::CompatibilityRecord;
use crate::catalog::intelligence::IntelligenceProfile;
use crate::catalog::inverter::InverterSpec;
use crate::catalog::panel::PanelSpec;

/// Catalog loading error with source context.
#[derive(Debug)]
pub struct CatalogError {
    /// What was being loaded (file path or logical source plus row).
    pub context: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "catalog error: {} — {}", self.context, self.message)
    }
}

/// Read-only snapshot of the equipment catalog for one design run.
///
/// Panels and inverters keep their load order (ranking ties break on it);
/// intelligence and compatibility lookups are keyed by the stable
/// `"<maker> <model>"` catalog key. The engine only ever borrows the
/// store immutably, so independent design runs may share one snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    panels: Vec<PanelSpec>,
    inverters: Vec<InverterSpec>,
    intelligence: BTreeMap<String, IntelligenceProfile>,
    compatibility: BTreeMap<(String, String), CompatibilityRecord>,
}

impl CatalogStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All panels, in catalog order.
    pub fn panels(&self) -> &[PanelSpec] {
        &self.panels
    }

    /// All inverters, in catalog order.
    pub fn inverters(&self) -> &[InverterSpec] {
        &self.inverters
    }

    /// Intelligence profile for a component key, if one exists.
    pub fn intelligence(&self, key: &str) -> Option<&IntelligenceProfile> {
        self.intelligence.get(key)
    }

    /// Precomputed compatibility record for a pair, if one exists.
    pub fn compatibility(&self, panel_key: &str, inverter_key: &str) -> Option<&CompatibilityRecord> {
        self.compatibility
            .get(&(panel_key.to_string(), inverter_key.to_string()))
    }

    /// Adds a panel to the catalog.
    pub fn push_panel(&mut self, panel: PanelSpec) {
        self.panels.push(panel);
    }

    /// Adds an inverter to the catalog.
    pub fn push_inverter(&mut self, inverter: InverterSpec) {
        self.inverters.push(inverter);
    }

    /// Attaches an intelligence profile to a component key.
    pub fn set_intelligence(&mut self, key: &str, profile: IntelligenceProfile) {
        self.intelligence.insert(key.to_string(), profile);
    }

    /// Stores a precomputed compatibility record (keyed by its pair).
    pub fn set_compatibility(&mut self, record: CompatibilityRecord) {
        self.compatibility.insert(
            (record.panel_key.clone(), record.inverter_key.clone()),
            record,
        );
    }

    /// Loads panels from CSV (header row expected, one panel per row).
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` naming the offending row on parse or
    /// validation failure.
    pub fn load_panels_csv(&mut self, reader: impl Read, source: &str) -> Result<(), CatalogError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for (i, row) in rdr.deserialize::<PanelSpec>().enumerate() {
            let row_no = i + 2; // header is row 1
            let panel = row.map_err(|e| CatalogError {
                context: format!("{source} row {row_no}"),
                message: e.to_string(),
            })?;
            validate_panel(&panel).map_err(|message| CatalogError {
                context: format!("{source} row {row_no}"),
                message,
            })?;
            self.panels.push(panel);
        }
        Ok(())
    }

    /// Loads inverters from CSV (header row expected, one inverter per row).
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` naming the offending row on parse or
    /// validation failure.
    pub fn load_inverters_csv(
        &mut self,
        reader: impl Read,
        source: &str,
    ) -> Result<(), CatalogError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for (i, row) in rdr.deserialize::<InverterSpec>().enumerate() {
            let row_no = i + 2;
            let inverter = row.map_err(|e| CatalogError {
                context: format!("{source} row {row_no}"),
                message: e.to_string(),
            })?;
            validate_inverter(&inverter).map_err(|message| CatalogError {
                context: format!("{source} row {row_no}"),
                message,
            })?;
            self.inverters.push(inverter);
        }
        Ok(())
    }

    /// Loads `panels.csv` and `inverters.csv` from a directory.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if either file is missing or invalid.
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), CatalogError> {
        let panels_path = dir.join("panels.csv");
        let file = File::open(&panels_path).map_err(|e| CatalogError {
            context: panels_path.display().to_string(),
            message: e.to_string(),
        })?;
        self.load_panels_csv(file, &panels_path.display().to_string())?;

        let inverters_path = dir.join("inverters.csv");
        let file = File::open(&inverters_path).map_err(|e| CatalogError {
            context: inverters_path.display().to_string(),
            message: e.to_string(),
        })?;
        self.load_inverters_csv(file, &inverters_path.display().to_string())?;
        Ok(())
    }

    /// Built-in demo catalog: six panels, five inverters, partial
    /// intelligence and compatibility coverage (absence paths stay
    /// exercised).
    pub fn demo() -> Self {
        let mut store = Self::new();

        for panel in demo_panels() {
            store.push_panel(panel);
        }
        for inverter in demo_inverters() {
            store.push_inverter(inverter);
        }

        store.set_intelligence(
            "Helios HS-350M",
            IntelligenceProfile {
                reliability_score: 84.0,
                market_price: 168.0,
                hot_climate_multiplier: 0.94,
                cold_climate_multiplier: 1.01,
            },
        );
        store.set_intelligence(
            "Helios HS-410M",
            IntelligenceProfile {
                reliability_score: 86.0,
                market_price: 205.0,
                hot_climate_multiplier: 0.95,
                cold_climate_multiplier: 1.01,
            },
        );
        store.set_intelligence(
            "Altena AP-450B",
            IntelligenceProfile {
                reliability_score: 90.0,
                market_price: 252.0,
                hot_climate_multiplier: 0.96,
                cold_climate_multiplier: 1.02,
            },
        );
        store.set_intelligence(
            "Boreal BS-500N",
            IntelligenceProfile {
                reliability_score: 92.0,
                market_price: 310.0,
                hot_climate_multiplier: 0.97,
                cold_climate_multiplier: 1.02,
            },
        );
        store.set_intelligence(
            "Boreal BS-600X",
            IntelligenceProfile {
                reliability_score: 88.0,
                market_price: 342.0,
                hot_climate_multiplier: 0.96,
                cold_climate_multiplier: 1.01,
            },
        );
        // Meridian M-330P intentionally has no profile.

        store.set_intelligence(
            "Vertex VX-5000",
            IntelligenceProfile {
                reliability_score: 82.0,
                market_price: 870.0,
                hot_climate_multiplier: 0.95,
                cold_climate_multiplier: 1.00,
            },
        );
        store.set_intelligence(
            "Grid Harmony GH-6000",
            IntelligenceProfile {
                reliability_score: 89.0,
                market_price: 1140.0,
                hot_climate_multiplier: 0.96,
                cold_climate_multiplier: 1.00,
            },
        );
        store.set_intelligence(
            "Grid Harmony GH-8000",
            IntelligenceProfile {
                reliability_score: 89.0,
                market_price: 1460.0,
                hot_climate_multiplier: 0.96,
                cold_climate_multiplier: 1.00,
            },
        );
        // Vertex VX-3000 and VX-10K intentionally have no profile.

        store.set_compatibility(CompatibilityRecord {
            panel_key: "Helios HS-350M".to_string(),
            inverter_key: "Vertex VX-5000".to_string(),
            overall_score: 92.0,
            voltage_score: 95.0,
            current_score: 90.0,
            power_score: 92.0,
            temperature_score: 90.0,
            limitations: vec!["two strings maximum at hot-site currents".to_string()],
            recommendations: vec!["use both MPPT inputs for balanced strings".to_string()],
            precomputed: true,
        });
        store.set_compatibility(CompatibilityRecord {
            panel_key: "Helios HS-410M".to_string(),
            inverter_key: "Grid Harmony GH-6000".to_string(),
            overall_score: 88.0,
            voltage_score: 92.0,
            current_score: 84.0,
            power_score: 90.0,
            temperature_score: 86.0,
            limitations: Vec::new(),
            recommendations: vec!["verify tracker current margin above 40 °C".to_string()],
            precomputed: true,
        });

        store
    }
}

fn validate_panel(panel: &PanelSpec) -> Result<(), String> {
    if panel.maker.is_empty() || panel.model.is_empty() {
        return Err("maker and model must be non-empty".to_string());
    }
    for (name, value) in [
        ("power_w", panel.power_w),
        ("voc_v", panel.voc_v),
        ("isc_a", panel.isc_a),
        ("vmp_v", panel.vmp_v),
        ("imp_a", panel.imp_a),
        ("efficiency_pct", panel.efficiency_pct),
        ("width_mm", panel.width_mm),
        ("height_mm", panel.height_mm),
        ("weight_kg", panel.weight_kg),
    ] {
        if !(value > 0.0) {
            return Err(format!("{name} must be > 0"));
        }
    }
    if panel.vmp_v >= panel.voc_v {
        return Err("vmp_v must be < voc_v".to_string());
    }
    Ok(())
}

fn validate_inverter(inverter: &InverterSpec) -> Result<(), String> {
    if inverter.maker.is_empty() || inverter.model.is_empty() {
        return Err("maker and model must be non-empty".to_string());
    }
    for (name, value) in [
        ("max_ac_power_w", inverter.max_ac_power_w),
        ("max_dc_voltage_v", inverter.max_dc_voltage_v),
        ("mppt_min_v", inverter.mppt_min_v),
        ("mppt_max_v", inverter.mppt_max_v),
        ("max_input_current_a", inverter.max_input_current_a),
        (
            "max_short_circuit_current_a",
            inverter.max_short_circuit_current_a,
        ),
        ("output_voltage_v", inverter.output_voltage_v),
        ("output_frequency_hz", inverter.output_frequency_hz),
    ] {
        if !(value > 0.0) {
            return Err(format!("{name} must be > 0"));
        }
    }
    if inverter.mppt_min_v >= inverter.mppt_max_v {
        return Err("mppt_min_v must be < mppt_max_v".to_string());
    }
    if inverter.mppt_count == 0 {
        return Err("mppt_count must be > 0".to_string());
    }
    Ok(())
}

fn demo_panels() -> Vec<PanelSpec> {
    vec![
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
        },
        PanelSpec {
            maker: "Helios".to_string(),
            model: "HS-410M".to_string(),
            power_w: 410.0,
            voc_v: 37.1,
            isc_a: 13.87,
            vmp_v: 31.1,
            imp_a: 13.18,
            temp_coeff_voc_pct_per_c: -0.26,
            temp_coeff_isc_pct_per_c: 0.048,
            efficiency_pct: 21.0,
            width_mm: 1134.0,
            height_mm: 1722.0,
            weight_kg: 21.5,
            warranty_years: 25,
        },
        PanelSpec {
            maker: "Altena".to_string(),
            model: "AP-450B".to_string(),
            power_w: 450.0,
            voc_v: 41.5,
            isc_a: 13.9,
            vmp_v: 34.6,
            imp_a: 13.0,
            temp_coeff_voc_pct_per_c: -0.25,
            temp_coeff_isc_pct_per_c: 0.046,
            efficiency_pct: 20.8,
            width_mm: 1134.0,
            height_mm: 1909.0,
            weight_kg: 24.0,
            warranty_years: 30,
        },
        PanelSpec {
            maker: "Boreal".to_string(),
            model: "BS-500N".to_string(),
            power_w: 500.0,
            voc_v: 45.2,
            isc_a: 14.1,
            vmp_v: 37.6,
            imp_a: 13.3,
            temp_coeff_voc_pct_per_c: -0.24,
            temp_coeff_isc_pct_per_c: 0.045,
            efficiency_pct: 21.1,
            width_mm: 1134.0,
            height_mm: 2094.0,
            weight_kg: 26.0,
            warranty_years: 30,
        },
        PanelSpec {
            maker: "Meridian".to_string(),
            model: "M-330P".to_string(),
            power_w: 330.0,
            voc_v: 40.9,
            isc_a: 10.2,
            vmp_v: 33.6,
            imp_a: 9.82,
            temp_coeff_voc_pct_per_c: -0.35,
            temp_coeff_isc_pct_per_c: 0.06,
            efficiency_pct: 17.0,
            width_mm: 992.0,
            height_mm: 1956.0,
            weight_kg: 22.0,
            warranty_years: 12,
        },
        PanelSpec {
            maker: "Boreal".to_string(),
            model: "BS-600X".to_string(),
            power_w: 600.0,
            voc_v: 41.7,
            isc_a: 18.1,
            vmp_v: 34.4,
            imp_a: 17.4,
            temp_coeff_voc_pct_per_c: -0.25,
            temp_coeff_isc_pct_per_c: 0.044,
            efficiency_pct: 21.2,
            width_mm: 1303.0,
            height_mm: 2172.0,
            weight_kg: 31.0,
            warranty_years: 25,
        },
    ]
}

fn demo_inverters() -> Vec<InverterSpec> {
    vec![
        InverterSpec {
            maker: "Vertex".to_string(),
            model: "VX-3000".to_string(),
            max_ac_power_w: 3000.0,
            max_dc_voltage_v: 550.0,
            mppt_min_v: 120.0,
            mppt_max_v: 500.0,
            max_input_current_a: 14.0,
            max_short_circuit_current_a: 18.0,
            mppt_count: 1,
            output_voltage_v: 230.0,
            output_frequency_hz: 50.0,
            warranty_years: 10,
        },
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
        },
        InverterSpec {
            maker: "Grid Harmony".to_string(),
            model: "GH-6000".to_string(),
            max_ac_power_w: 6000.0,
            max_dc_voltage_v: 1000.0,
            mppt_min_v: 200.0,
            mppt_max_v: 850.0,
            max_input_current_a: 16.0,
            max_short_circuit_current_a: 22.0,
            mppt_count: 2,
            output_voltage_v: 230.0,
            output_frequency_hz: 50.0,
            warranty_years: 12,
        },
        InverterSpec {
            maker: "Grid Harmony".to_string(),
            model: "GH-8000".to_string(),
            max_ac_power_w: 8000.0,
            max_dc_voltage_v: 1000.0,
            mppt_min_v: 200.0,
            mppt_max_v: 850.0,
            max_input_current_a: 20.0,
            max_short_circuit_current_a: 27.0,
            mppt_count: 2,
            output_voltage_v: 230.0,
            output_frequency_hz: 50.0,
            warranty_years: 12,
        },
        InverterSpec {
            maker: "Vertex".to_string(),
            model: "VX-10K".to_string(),
            max_ac_power_w: 10_000.0,
            max_dc_voltage_v: 1000.0,
            mppt_min_v: 180.0,
            mppt_max_v: 950.0,
            max_input_current_a: 26.0,
            max_short_circuit_current_a: 34.0,
            mppt_count: 2,
            output_voltage_v: 230.0,
            output_frequency_hz: 50.0,
            warranty_years: 10,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_is_populated() {
        let store = CatalogStore::demo();
        assert_eq!(store.panels().len(), 6);
        assert_eq!(store.inverters().len(), 5);
    }

    #[test]
    fn demo_intelligence_coverage_is_partial() {
        let store = CatalogStore::demo();
        assert!(store.intelligence("Helios HS-350M").is_some());
        assert!(store.intelligence("Meridian M-330P").is_none());
        assert!(store.intelligence("Vertex VX-3000").is_none());
    }

    #[test]
    fn demo_compatibility_lookup() {
        let store = CatalogStore::demo();
        let rec = store.compatibility("Helios HS-350M", "Vertex VX-5000");
        assert!(rec.is_some());
        assert_eq!(rec.map(|r| r.overall_score), Some(92.0));
        assert!(store.compatibility("Meridian M-330P", "Vertex VX-10K").is_none());
    }

    #[test]
    fn panels_csv_round_trip() {
        let csv = "\
maker,model,power_w,voc_v,isc_a,vmp_v,imp_a,temp_coeff_voc_pct_per_c,temp_coeff_isc_pct_per_c,efficiency_pct,width_mm,height_mm,weight_kg,warranty_years
Helios,HS-350M,350.0,45.0,8.0,37.0,9.46,-0.30,0.05,19.8,1046.0,1690.0,19.5,25
Altena,AP-450B,450.0,41.5,13.9,34.6,13.0,-0.25,0.046,20.8,1134.0,1909.0,24.0,30
";
        let mut store = CatalogStore::new();
        let result = store.load_panels_csv(csv.as_bytes(), "panels.csv");
        assert!(result.is_ok(), "load should succeed: {:?}", result.err());
        assert_eq!(store.panels().len(), 2);
        assert_eq!(store.panels()[1].key(), "Altena AP-450B");
    }

    #[test]
    fn panels_csv_rejects_bad_row_with_row_number() {
        let csv = "\
maker,model,power_w,voc_v,isc_a,vmp_v,imp_a,temp_coeff_voc_pct_per_c,temp_coeff_isc_pct_per_c,efficiency_pct,width_mm,height_mm,weight_kg,warranty_years
Helios,HS-350M,0.0,45.0,8.0,37.0,9.46,-0.30,0.05,19.8,1046.0,1690.0,19.5,25
";
        let mut store = CatalogStore::new();
        let err = store
            .load_panels_csv(csv.as_bytes(), "panels.csv")
            .expect_err("zero power must be rejected");
        assert!(err.context.contains("row 2"), "context: {}", err.context);
        assert!(err.message.contains("power_w"));
    }

    #[test]
    fn inverters_csv_rejects_inverted_mppt_window() {
        let csv = "\
maker,model,max_ac_power_w,max_dc_voltage_v,mppt_min_v,mppt_max_v,max_input_current_a,max_short_circuit_current_a,mppt_count,output_voltage_v,output_frequency_hz,warranty_years
Vertex,VX-5000,5000.0,600.0,550.0,150.0,15.0,20.0,2,230.0,50.0,10
";
        let mut store = CatalogStore::new();
        let err = store
            .load_inverters_csv(csv.as_bytes(), "inverters.csv")
            .expect_err("inverted MPPT window must be rejected");
        assert!(err.message.contains("mppt_min_v"));
    }

    #[test]
    fn demo_records_pass_csv_validation_rules() {
        for panel in CatalogStore::demo().panels() {
            assert!(validate_panel(panel).is_ok(), "panel {}", panel.key());
        }
        for inverter in CatalogStore::demo().inverters() {
            assert!(
                validate_inverter(inverter).is_ok(),
                "inverter {}",
                inverter.key()
            );
        }
    }
}
