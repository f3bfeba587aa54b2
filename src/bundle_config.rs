// bundle_config.rs
// Loads and saves bundle descriptions (parameters, wire list, batch settings) as TOML

use crate::batch::BatchConfig;
use crate::config::PackingParams;
use crate::error::{BundleError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct BundleConfig {
    #[serde(default)]
    pub params: PackingParams,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub wires: Vec<WireEntry>,
}

/// `count` identical wires given by radius or diameter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WireEntry {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    /// Free-form name, e.g. a gauge or part number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_count() -> usize {
    1
}

impl WireEntry {
    pub fn with_radius(count: usize, radius: f64) -> Self {
        Self {
            count,
            radius: Some(radius),
            diameter: None,
            label: None,
        }
    }

    pub fn with_diameter(count: usize, diameter: f64) -> Self {
        Self {
            count,
            radius: None,
            diameter: Some(diameter),
            label: None,
        }
    }

    fn resolved_radius(&self, index: usize) -> Result<f64> {
        let radius = match (self.radius, self.diameter) {
            (Some(r), None) => r,
            (None, Some(d)) => d / 2.0,
            (Some(_), Some(_)) => {
                return Err(BundleError::InvalidWire {
                    index,
                    reason: "give either radius or diameter, not both".to_string(),
                })
            }
            (None, None) => {
                return Err(BundleError::InvalidWire {
                    index,
                    reason: "missing radius or diameter".to_string(),
                })
            }
        };
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BundleError::InvalidWire {
                index,
                reason: format!("radius must be finite and positive, got {}", radius),
            });
        }
        Ok(radius)
    }
}

impl BundleConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BundleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.batch.validate()?;
        for (index, entry) in self.wires.iter().enumerate() {
            entry.resolved_radius(index)?;
        }
        Ok(())
    }

    /// Flat radius list, each entry repeated `count` times in file order.
    pub fn radii(&self) -> Result<Vec<f64>> {
        let mut radii = Vec::new();
        for (index, entry) in self.wires.iter().enumerate() {
            let r = entry.resolved_radius(index)?;
            radii.extend(std::iter::repeat(r).take(entry.count));
        }
        if radii.is_empty() {
            return Err(BundleError::EmptyBundle);
        }
        Ok(radii)
    }

    /// Small mixed bundle used by `wire_bundle generate`.
    pub fn sample() -> Self {
        let mut thick = WireEntry::with_diameter(2, 2.4);
        thick.label = Some("power".to_string());
        let mut thin = WireEntry::with_diameter(7, 1.3);
        thin.label = Some("signal".to_string());
        Self {
            params: PackingParams::default(),
            batch: BatchConfig {
                runs: 20,
                wrap_thickness: 0.2,
                tolerance_factor: 1.05,
                ..BatchConfig::default()
            },
            wires: vec![thick, thin, WireEntry::with_radius(4, 0.5)],
        }
    }
}
