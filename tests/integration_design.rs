//! End-to-end tests for the design pipeline.

mod common;

use pv_design::catalog::store::CatalogStore;
use pv_design::config::{DesignRequirements, OptimizationPriority};
use pv_design::engine::designer::{DesignError, Designer};
use pv_design::report;
use pv_design::simulation::{
    ProductionSimulator, SimulationRequest, SimulationResponse,
};

struct StubSimulator {
    response: SimulationResponse,
}

impl ProductionSimulator for StubSimulator {
    fn simulate(&self, _request: &SimulationRequest) -> SimulationResponse {
        self.response.clone()
    }
}

#[test]
fn baseline_run_produces_a_complete_outcome() {
    let store = CatalogStore::demo();
    let designer = Designer::new(&store);
    let outcome = designer
        .run(&DesignRequirements::baseline())
        .expect("baseline run should succeed");

    let array = &outcome.selection.array;
    assert!(array.compatible);
    assert!(array.panels_per_string >= 1);
    assert!(array.string_count >= 1);
    assert!(array.power_ratio >= 0.9 && array.power_ratio <= 1.3);
    assert!(array.total_power_w >= 5000.0);
    assert!(outcome.selection.score > 0.0);
    assert!(outcome.compliance.score > 0.0);
    assert!(outcome.financial.total_cost > 0.0);
    assert!(outcome.production.is_none());
}

#[test]
fn all_presets_are_designable() {
    let store = CatalogStore::demo();
    let designer = Designer::new(&store);
    for name in DesignRequirements::PRESETS {
        let req = DesignRequirements::from_preset(name).expect("preset should load");
        let outcome = designer.run(&req);
        assert!(outcome.is_ok(), "preset \"{name}\" should be designable");
    }
}

#[test]
fn every_priority_finds_a_design() {
    let store = CatalogStore::demo();
    let designer = Designer::new(&store);
    for priority in [
        OptimizationPriority::Cost,
        OptimizationPriority::Efficiency,
        OptimizationPriority::Reliability,
        OptimizationPriority::Space,
    ] {
        let mut req = DesignRequirements::baseline();
        req.design.priority = priority;
        let outcome = designer.run(&req);
        assert!(outcome.is_ok(), "priority {priority:?} should be designable");
    }
}

#[test]
fn determinism_two_identical_runs_produce_identical_json() {
    let store = CatalogStore::demo();
    let designer = Designer::new(&store);
    let req = DesignRequirements::baseline();

    let json_a = report::to_json(&designer.run(&req).expect("first run should succeed"))
        .expect("first serialization should succeed");
    let json_b = report::to_json(&designer.run(&req).expect("second run should succeed"))
        .expect("second serialization should succeed");

    assert_eq!(json_a, json_b);
}

#[test]
fn incompatible_cross_product_is_a_fatal_no_solution() {
    let store = common::incompatible_store();
    let designer = Designer::new(&store);
    let err = designer
        .run(&DesignRequirements::baseline())
        .expect_err("incompatible catalog must fail");
    assert!(matches!(err, DesignError::NoCompatibleEquipment { .. }));
    assert!(err.to_string().contains("no compatible"));
}

#[test]
fn simulation_failure_is_distinct_from_no_solution() {
    let store = CatalogStore::demo();
    let simulator = StubSimulator {
        response: SimulationResponse::failure("irradiance backend offline"),
    };
    let designer = Designer::with_simulator(&store, &simulator);
    let err = designer
        .run(&DesignRequirements::baseline())
        .expect_err("failed simulation must abort the run");
    assert!(matches!(err, DesignError::SimulationUnavailable { .. }));
    assert!(err.to_string().contains("can be retried"));
}

#[test]
fn successful_simulation_is_carried_into_the_outcome() {
    let store = CatalogStore::demo();
    let simulator = StubSimulator {
        response: SimulationResponse {
            annual_energy_kwh: 6050.0,
            monthly_energy_kwh: [504.0; 12],
            capacity_factor: 0.13,
            performance_ratio: 0.81,
            peak_power_kw: 4.9,
            success: true,
            error_message: None,
        },
    };
    let designer = Designer::with_simulator(&store, &simulator);
    let outcome = designer
        .run(&DesignRequirements::baseline())
        .expect("run should succeed");
    let production = outcome.production.expect("production should be attached");
    assert_eq!(production.annual_energy_kwh, 6050.0);
    assert_eq!(production.monthly_energy_kwh.len(), 12);
}

#[test]
fn single_pair_catalog_selects_the_worked_example_topology() {
    let store = common::single_pair_store();
    let designer = Designer::new(&store);
    let outcome = designer
        .run(&common::requirements_with_target(5000.0))
        .expect("worked-example pair should be designable");

    let array = &outcome.selection.array;
    assert_eq!(outcome.selection.panel.key(), "Helios HS-350M");
    assert_eq!(outcome.selection.inverter.key(), "Vertex VX-5000");
    assert_eq!(array.panels_per_string, 8);
    assert_eq!(array.string_count, 2);
    assert_eq!(array.total_panels, 16);
    assert!((array.power_ratio - 1.12).abs() < 1e-9);
}

#[test]
fn tight_pair_limit_still_designs_from_shortlist_heads() {
    let store = CatalogStore::demo();
    let designer = Designer::new(&store);
    let mut req = DesignRequirements::baseline();
    req.tuning.pair_limit = 1;
    let outcome = designer.run(&req);
    // The top-ranked panel and inverter of the demo catalog pair up.
    assert!(outcome.is_ok(), "pair_limit 1 should still design: {:?}", outcome.err());
}
