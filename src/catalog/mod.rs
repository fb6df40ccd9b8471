//! Equipment catalog records and the read-only catalog store.

/// Pairwise panel/inverter compatibility records.
pub mod compatibility;
/// Derived quality signals with documented defaults.
pub mod intelligence;
/// Inverter catalog record.
pub mod inverter;
/// Panel catalog record and temperature-corrected electrical figures.
pub mod panel;
pub mod store;

// Re-export the main types for convenience
pub use compatibility::CompatibilityRecord;
pub use intelligence::IntelligenceProfile;
pub use intelligence::QualitySignals;
pub use inverter::InverterSpec;
pub use panel::PanelSpec;
pub use store::CatalogStore;
