//! Shared fixtures for integration tests.

use pv_design::catalog::inverter::InverterSpec;
use pv_design::catalog::panel::PanelSpec;
use pv_design::catalog::store::CatalogStore;
use pv_design::config::DesignRequirements;

/// The worked-example panel: 350 W, 45 V Voc, 8 A Isc, −0.3 %/°C.
pub fn example_panel() -> PanelSpec {
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

/// The worked-example inverter: 5 kW, 600 V DC, 150 V MPPT floor, 20 A.
pub fn example_inverter() -> InverterSpec {
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

/// A catalog holding only the worked-example pair.
pub fn single_pair_store() -> CatalogStore {
    let mut store = CatalogStore::new();
    store.push_panel(example_panel());
    store.push_inverter(example_inverter());
    store
}

/// A catalog where every pair is electrically incompatible: the lone
/// inverter's voltage window admits no string from any demo panel.
pub fn incompatible_store() -> CatalogStore {
    let mut store = CatalogStore::new();
    for panel in CatalogStore::demo().panels() {
        store.push_panel(panel.clone());
    }
    let mut inverter = example_inverter();
    inverter.max_dc_voltage_v = 100.0;
    inverter.mppt_min_v = 90.0;
    inverter.max_ac_power_w = 400.0;
    store.push_inverter(inverter);
    store
}

/// Baseline requirements with an overridden target power.
pub fn requirements_with_target(target_power_w: f64) -> DesignRequirements {
    let mut req = DesignRequirements::baseline();
    req.design.target_power_w = target_power_w;
    req
}
