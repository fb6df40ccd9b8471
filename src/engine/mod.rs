//! Selection pipeline stages, leaves first: location factors, candidate
//! ranking, array topology search, compatibility scoring, combination
//! selection, compliance checking, financial estimation, and the
//! [`designer::Designer`] entry point tying them together.

/// Series/parallel array topology search.
pub mod array;
pub mod compliance;
/// Pipeline entry point and fatal error taxonomy.
pub mod designer;
pub mod financial;
/// Climate-zone irradiance and adjustment lookup.
pub mod location;
pub mod ranking;
/// Compatibility table lookup with local fallback heuristic.
pub mod scoring;
pub mod selector;
pub mod types;

// Re-export the main types for convenience
pub use array::ArrayConfigurator;
pub use compliance::{ComplianceChecker, ComplianceResult};
pub use designer::{DesignError, Designer};
pub use financial::{FinancialEstimates, FinancialEstimator};
pub use location::{LocationFactorCalculator, LocationFactors};
pub use ranking::CandidateRanker;
pub use scoring::CompatibilityScorer;
pub use selector::CombinationSelector;
pub use types::{ArrayConfiguration, DesignOutcome, EquipmentSelection};
