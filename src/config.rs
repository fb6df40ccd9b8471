//! TOML-based design requirements and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level design requirements parsed from TOML.
///
/// All fields have defaults matching the baseline request. Load from
/// TOML with [`DesignRequirements::from_toml_file`] or use
/// [`DesignRequirements::baseline`] for the built-in default. Supplied
/// once per design run and never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignRequirements {
    /// Target power, budget, and optimization priority.
    #[serde(default)]
    pub design: DesignGoals,
    /// Site coordinates and climate.
    #[serde(default)]
    pub site: SiteConditions,
    /// Roof geometry and shading.
    #[serde(default)]
    pub roof: RoofProfile,
    /// Engine search-space tuning.
    #[serde(default)]
    pub tuning: EngineTuning,
}

/// Target power, budget, and optimization priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignGoals {
    /// Target DC power of the array (W, must be > 0).
    pub target_power_w: f64,
    /// Customer budget for the full installation (currency units).
    pub budget: f64,
    /// Which catalog factor the ranking favors.
    pub priority: OptimizationPriority,
}

impl Default for DesignGoals {
    fn default() -> Self {
        Self {
            target_power_w: 5000.0,
            budget: 15_000.0,
            priority: OptimizationPriority::Cost,
        }
    }
}

/// Site coordinates and climate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConditions {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Altitude above sea level (m).
    pub altitude_m: f64,
    /// IANA timezone name, forwarded to the production simulator.
    pub timezone: String,
    /// Ground albedo (0.0 to 1.0), forwarded to the production simulator.
    pub albedo: f64,
    /// Climate zone driving irradiance and loss factors.
    pub climate_zone: ClimateZone,
}

impl Default for SiteConditions {
    fn default() -> Self {
        Self {
            latitude: 43.6,
            longitude: 3.88,
            altitude_m: 50.0,
            timezone: "Europe/Paris".to_string(),
            albedo: 0.2,
            climate_zone: ClimateZone::Mediterranean,
        }
    }
}

/// Roof geometry and shading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoofProfile {
    /// Mounting surface kind.
    pub kind: RoofKind,
    /// Azimuth offset from due south in degrees (-180 to 180).
    pub orientation_deg: f64,
    /// Panel tilt from horizontal in degrees (0 to 90).
    pub tilt_deg: f64,
    /// Shading severity tag.
    pub shading: Shading,
}

impl Default for RoofProfile {
    fn default() -> Self {
        Self {
            kind: RoofKind::Tile,
            orientation_deg: 0.0,
            tilt_deg: 30.0,
            shading: Shading::None,
        }
    }
}

/// Engine search-space tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineTuning {
    /// Shortlist length kept per component family (must be > 0).
    pub shortlist_size: usize,
    /// Panels and inverters taken from each shortlist into the
    /// cross-product (must be > 0 and <= shortlist_size).
    pub pair_limit: usize,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            shortlist_size: 10,
            pair_limit: 5,
        }
    }
}

/// Which catalog factor the ranking favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationPriority {
    /// Lowest price per watt.
    Cost,
    /// Highest module efficiency.
    Efficiency,
    /// Highest reliability signal.
    Reliability,
    /// Highest power density (constrained roofs).
    Space,
}

impl fmt::Display for OptimizationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cost => "cost",
            Self::Efficiency => "efficiency",
            Self::Reliability => "reliability",
            Self::Space => "space",
        };
        f.write_str(label)
    }
}

/// Climate zone driving irradiance and loss factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateZone {
    Mediterranean,
    Oceanic,
    Continental,
    Mountain,
    Tropical,
    SemiArid,
    /// Unrecognized zone; falls back to the documented default irradiance.
    Unknown,
}

impl ClimateZone {
    /// Zones where high cell temperatures dominate the loss profile.
    pub fn is_hot(self) -> bool {
        matches!(self, Self::Mediterranean | Self::Tropical | Self::SemiArid)
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Mediterranean => "mediterranean",
            Self::Oceanic => "oceanic",
            Self::Continental => "continental",
            Self::Mountain => "mountain",
            Self::Tropical => "tropical",
            Self::SemiArid => "semi_arid",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Mounting surface kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofKind {
    Tile,
    Metal,
    Flat,
    Ground,
}

impl fmt::Display for RoofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Tile => "tile",
            Self::Metal => "metal",
            Self::Flat => "flat",
            Self::Ground => "ground",
        };
        f.write_str(label)
    }
}

/// Shading severity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shading {
    None,
    Light,
    Heavy,
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"design.target_power_w"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl DesignRequirements {
    /// Returns the baseline request: 5 kW, cost priority, Mediterranean site.
    pub fn baseline() -> Self {
        Self {
            design: DesignGoals::default(),
            site: SiteConditions::default(),
            roof: RoofProfile::default(),
            tuning: EngineTuning::default(),
        }
    }

    /// Returns the premium preset: 9 kW, efficiency priority, continental site.
    pub fn premium() -> Self {
        Self {
            design: DesignGoals {
                target_power_w: 9000.0,
                budget: 30_000.0,
                priority: OptimizationPriority::Efficiency,
            },
            site: SiteConditions {
                latitude: 48.86,
                longitude: 2.35,
                climate_zone: ClimateZone::Continental,
                ..SiteConditions::default()
            },
            roof: RoofProfile {
                tilt_deg: 35.0,
                ..RoofProfile::default()
            },
            tuning: EngineTuning::default(),
        }
    }

    /// Returns the budget preset: 3 kW, cost priority, oceanic site.
    pub fn budget() -> Self {
        Self {
            design: DesignGoals {
                target_power_w: 3000.0,
                budget: 6000.0,
                priority: OptimizationPriority::Cost,
            },
            site: SiteConditions {
                latitude: 47.22,
                longitude: -1.55,
                climate_zone: ClimateZone::Oceanic,
                ..SiteConditions::default()
            },
            roof: RoofProfile::default(),
            tuning: EngineTuning::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "premium", "budget"];

    /// Loads a request from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "premium" => Ok(Self::premium()),
            "budget" => Ok(Self::budget()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a request from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "requirements".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a request from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the request is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let d = &self.design;

        if d.target_power_w <= 0.0 {
            errors.push(ConfigError {
                field: "design.target_power_w".into(),
                message: "must be > 0".into(),
            });
        }
        if d.budget <= 0.0 {
            errors.push(ConfigError {
                field: "design.budget".into(),
                message: "must be > 0".into(),
            });
        }

        let s = &self.site;
        if !(-90.0..=90.0).contains(&s.latitude) {
            errors.push(ConfigError {
                field: "site.latitude".into(),
                message: "must be in [-90, 90]".into(),
            });
        }
        if !(-180.0..=180.0).contains(&s.longitude) {
            errors.push(ConfigError {
                field: "site.longitude".into(),
                message: "must be in [-180, 180]".into(),
            });
        }
        if !(-500.0..=9000.0).contains(&s.altitude_m) {
            errors.push(ConfigError {
                field: "site.altitude_m".into(),
                message: "must be in [-500, 9000]".into(),
            });
        }
        if !(0.0..=1.0).contains(&s.albedo) {
            errors.push(ConfigError {
                field: "site.albedo".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let r = &self.roof;
        if !(0.0..=90.0).contains(&r.tilt_deg) {
            errors.push(ConfigError {
                field: "roof.tilt_deg".into(),
                message: "must be in [0, 90]".into(),
            });
        }
        if !(-180.0..=180.0).contains(&r.orientation_deg) {
            errors.push(ConfigError {
                field: "roof.orientation_deg".into(),
                message: "must be in [-180, 180]".into(),
            });
        }

        let t = &self.tuning;
        if t.shortlist_size == 0 {
            errors.push(ConfigError {
                field: "tuning.shortlist_size".into(),
                message: "must be > 0".into(),
            });
        }
        if t.pair_limit == 0 {
            errors.push(ConfigError {
                field: "tuning.pair_limit".into(),
                message: "must be > 0".into(),
            });
        }
        if t.pair_limit > t.shortlist_size && t.shortlist_size > 0 {
            errors.push(ConfigError {
                field: "tuning.pair_limit".into(),
                message: "must be <= tuning.shortlist_size".into(),
            });
        }

        errors
    }
}
