//! Pipeline entry point: rank, select, check, estimate.

use std::error::Error;
use std::fmt;

use crate::catalog::store::CatalogStore;
use crate::config::DesignRequirements;
use crate::engine::compliance::ComplianceChecker;
use crate::engine::financial::FinancialEstimator;
use crate::engine::location::LocationFactorCalculator;
use crate::engine::ranking::CandidateRanker;
use crate::engine::scoring::CompatibilityScorer;
use crate::engine::selector::CombinationSelector;
use crate::engine::types::{DesignOutcome, EquipmentSelection};
use crate::simulation::{
    ProductionSimulator, SimulatedProduction, SimulationArray, SimulationInverter,
    SimulationPanel, SimulationRequest, SimulationSite,
};

/// Weather year requested from the production simulator.
const SIMULATION_YEAR: i32 = 2025;

/// Fatal design-run failures.
///
/// Data absence and per-pair incompatibility are handled inside the
/// pipeline; only these two conditions abort a run, and each carries
/// enough context for a human to adjust the request.
#[derive(Debug)]
pub enum DesignError {
    /// Every pair in the shortlist cross-product was electrically
    /// incompatible with the request.
    NoCompatibleEquipment {
        /// Requested DC power (W).
        target_power_w: f64,
        /// Requested optimization priority.
        priority: String,
        /// Panels that reached the cross-product.
        panels_considered: usize,
        /// Inverters that reached the cross-product.
        inverters_considered: usize,
    },
    /// The external production simulator reported failure; the run can
    /// be retried without changing the requirements.
    SimulationUnavailable {
        /// Diagnostic from the simulator.
        message: String,
    },
}

impl fmt::Display for DesignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCompatibleEquipment {
                target_power_w,
                priority,
                panels_considered,
                inverters_considered,
            } => write!(
                f,
                "equipment selection failed: no compatible panel/inverter combination for \
                 {target_power_w:.0} W with priority \"{priority}\" \
                 ({panels_considered} panels × {inverters_considered} inverters tried); \
                 adjust the target power or widen the catalog"
            ),
            Self::SimulationUnavailable { message } => write!(
                f,
                "production simulation failed: {message}; the design request itself is \
                 valid and can be retried"
            ),
        }
    }
}

impl Error for DesignError {}

/// Runs the complete selection pipeline over a catalog snapshot.
///
/// Borrows the catalog immutably and holds no mutable state, so callers
/// may run independent design requests in parallel against one store.
pub struct Designer<'a> {
    store: &'a CatalogStore,
    simulator: Option<&'a dyn ProductionSimulator>,
}

impl<'a> Designer<'a> {
    /// Creates a designer without a production simulator; the outcome's
    /// production field stays `None`.
    pub fn new(store: &'a CatalogStore) -> Self {
        Self {
            store,
            simulator: None,
        }
    }

    /// Creates a designer that verifies the winning design through an
    /// hourly production simulation.
    pub fn with_simulator(store: &'a CatalogStore, simulator: &'a dyn ProductionSimulator) -> Self {
        Self {
            store,
            simulator: Some(simulator),
        }
    }

    /// Executes one design run.
    ///
    /// # Errors
    ///
    /// [`DesignError::NoCompatibleEquipment`] when the shortlist
    /// cross-product contains no electrically admissible pair, and
    /// [`DesignError::SimulationUnavailable`] when an attached simulator
    /// reports failure.
    pub fn run(&self, requirements: &DesignRequirements) -> Result<DesignOutcome, DesignError> {
        let location = LocationFactorCalculator::derive(&requirements.site);

        let ranker = CandidateRanker::new(requirements.tuning.shortlist_size);
        let panels = ranker.shortlist_panels(self.store, requirements);
        let inverters = ranker.shortlist_inverters(self.store, requirements);

        let scorer = CompatibilityScorer::new(self.store);
        let selector = CombinationSelector::new(requirements.tuning.pair_limit);
        let selection = selector
            .select(&panels, &inverters, requirements, &location, &scorer)
            .ok_or_else(|| DesignError::NoCompatibleEquipment {
                target_power_w: requirements.design.target_power_w,
                priority: requirements.design.priority.to_string(),
                panels_considered: panels.len().min(requirements.tuning.pair_limit),
                inverters_considered: inverters.len().min(requirements.tuning.pair_limit),
            })?;

        let production = match self.simulator {
            Some(simulator) => {
                let request = build_simulation_request(&selection, requirements);
                let response = simulator.simulate(&request);
                if !response.success {
                    return Err(DesignError::SimulationUnavailable {
                        message: response
                            .error_message
                            .unwrap_or_else(|| "simulator returned no diagnostic".to_string()),
                    });
                }
                Some(SimulatedProduction::from_response(&response))
            }
            None => None,
        };

        let compliance = ComplianceChecker::check(&selection, requirements);
        let financial = FinancialEstimator::estimate(&selection, &location, requirements);

        Ok(DesignOutcome {
            requirements: requirements.clone(),
            location,
            selection,
            compliance,
            financial,
            production,
        })
    }
}

fn build_simulation_request(
    selection: &EquipmentSelection,
    requirements: &DesignRequirements,
) -> SimulationRequest {
    SimulationRequest {
        site: SimulationSite {
            latitude: requirements.site.latitude,
            longitude: requirements.site.longitude,
            altitude_m: requirements.site.altitude_m,
            timezone: requirements.site.timezone.clone(),
            albedo: requirements.site.albedo,
        },
        panel: SimulationPanel {
            power_w: selection.panel.power_w,
            voc_v: selection.panel.voc_v,
            isc_a: selection.panel.isc_a,
            vmp_v: selection.panel.vmp_v,
            imp_a: selection.panel.imp_a,
            temp_coeff_voc_pct_per_c: selection.panel.temp_coeff_voc_pct_per_c,
        },
        array: SimulationArray {
            panels_per_string: selection.array.panels_per_string,
            string_count: selection.array.string_count,
            tilt_deg: requirements.roof.tilt_deg,
            azimuth_deg: requirements.roof.orientation_deg,
        },
        inverter: SimulationInverter {
            max_ac_power_w: selection.inverter.max_ac_power_w,
            mppt_min_v: selection.inverter.mppt_min_v,
            mppt_max_v: selection.inverter.mppt_max_v,
        },
        year: SIMULATION_YEAR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulationResponse;

    struct StubSimulator {
        response: SimulationResponse,
    }

    impl ProductionSimulator for StubSimulator {
        fn simulate(&self, _request: &SimulationRequest) -> SimulationResponse {
            self.response.clone()
        }
    }

    fn ok_response() -> SimulationResponse {
        SimulationResponse {
            annual_energy_kwh: 6100.0,
            monthly_energy_kwh: [508.0; 12],
            capacity_factor: 0.13,
            performance_ratio: 0.81,
            peak_power_kw: 4.8,
            success: true,
            error_message: None,
        }
    }

    #[test]
    fn run_without_simulator_completes() {
        let store = CatalogStore::demo();
        let designer = Designer::new(&store);
        let outcome = designer
            .run(&DesignRequirements::baseline())
            .expect("baseline run should succeed");
        assert!(outcome.production.is_none());
        assert!(outcome.selection.array.compatible);
    }

    #[test]
    fn empty_catalog_is_no_compatible_equipment() {
        let store = CatalogStore::new();
        let designer = Designer::new(&store);
        let err = designer
            .run(&DesignRequirements::baseline())
            .expect_err("empty catalog cannot produce a design");
        match err {
            DesignError::NoCompatibleEquipment {
                panels_considered,
                inverters_considered,
                ..
            } => {
                assert_eq!(panels_considered, 0);
                assert_eq!(inverters_considered, 0);
            }
            other => panic!("expected NoCompatibleEquipment, got {other}"),
        }
    }

    #[test]
    fn error_message_echoes_request_context() {
        let store = CatalogStore::new();
        let designer = Designer::new(&store);
        let err = designer
            .run(&DesignRequirements::baseline())
            .expect_err("must fail");
        let text = err.to_string();
        assert!(text.contains("5000 W"));
        assert!(text.contains("cost"));
    }

    #[test]
    fn successful_simulation_attaches_production() {
        let store = CatalogStore::demo();
        let simulator = StubSimulator {
            response: ok_response(),
        };
        let designer = Designer::with_simulator(&store, &simulator);
        let outcome = designer
            .run(&DesignRequirements::baseline())
            .expect("run should succeed");
        let production = outcome.production.expect("production should be attached");
        assert_eq!(production.annual_energy_kwh, 6100.0);
    }

    #[test]
    fn failed_simulation_aborts_the_run() {
        let store = CatalogStore::demo();
        let simulator = StubSimulator {
            response: SimulationResponse::failure("weather service timeout"),
        };
        let designer = Designer::with_simulator(&store, &simulator);
        let err = designer
            .run(&DesignRequirements::baseline())
            .expect_err("failed simulation must abort");
        match err {
            DesignError::SimulationUnavailable { message } => {
                assert!(message.contains("timeout"));
            }
            other => panic!("expected SimulationUnavailable, got {other}"),
        }
    }
}
