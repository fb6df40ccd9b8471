use serde::{Deserialize, Serialize};

/// Pairwise panel/inverter compatibility assessment.
///
/// Either a precomputed table entry (`precomputed = true`) or the local
/// fallback heuristic's output. Scores are on a 0–100 scale; sub-scores
/// break the overall figure down by check family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityRecord {
    /// Panel catalog key (`"<maker> <model>"`).
    pub panel_key: String,
    /// Inverter catalog key (`"<maker> <model>"`).
    pub inverter_key: String,
    /// Overall compatibility score (0–100).
    pub overall_score: f64,
    /// Voltage-window sub-score (0–100).
    pub voltage_score: f64,
    /// Current-limit sub-score (0–100).
    pub current_score: f64,
    /// Power-ratio sub-score (0–100).
    pub power_score: f64,
    /// Temperature-behavior sub-score (0–100).
    pub temperature_score: f64,
    /// Known limitations of the pairing.
    pub limitations: Vec<String>,
    /// Pairing recommendations.
    pub recommendations: Vec<String>,
    /// True for table entries, false for fallback assessments.
    pub precomputed: bool,
}

impl CompatibilityRecord {
    /// A neutral full-score record for a pair with no violated checks.
    pub fn clean_fallback(panel_key: String, inverter_key: String) -> Self {
        Self {
            panel_key,
            inverter_key,
            overall_score: 100.0,
            voltage_score: 100.0,
            current_score: 100.0,
            power_score: 100.0,
            temperature_score: 100.0,
            limitations: Vec::new(),
            recommendations: Vec::new(),
            precomputed: false,
        }
    }
}
