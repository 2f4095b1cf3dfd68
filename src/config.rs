use crate::trail::variants::Variant;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Distance (px) the raw pointer must travel past the last activation.
pub const DEFAULT_THRESHOLD: f64 = 80.0;
pub const DEFAULT_VARIANT: &str = "1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-container trail settings, read once at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailConfig {
    /// Variant selector: "1".."8" or a variant name. Numbers are accepted too.
    #[serde(default = "default_variant", deserialize_with = "variant_selector")]
    pub variant: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_variant() -> String {
    DEFAULT_VARIANT.to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Selector {
    Number(u64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

fn variant_selector<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Selector::deserialize(deserializer)? {
        Selector::Number(n) => n.to_string(),
        // `7.0` displays as "7"; fractions and negatives keep their digits
        // and resolve to no variant.
        Selector::Float(f) => f.to_string(),
        Selector::Text(s) => s,
        Selector::Other(value) => value.to_string(),
    })
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl TrailConfig {
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        log::debug!("TrailConfig::load: {} -> {config:?}", path.display());
        Ok(config)
    }

    /// The selected variant, `None` (with a warning) when the selector
    /// names no known variant.
    pub fn resolve_variant(&self) -> Option<Variant> {
        match self.variant.parse::<Variant>() {
            Ok(variant) => Some(variant),
            Err(e) => {
                log::warn!("TrailConfig::resolve_variant: {e}, trail stays inert");
                None
            }
        }
    }

    /// Threshold to use, falling back to the default for values that cannot
    /// be compared against a distance.
    pub fn effective_threshold(&self) -> f64 {
        if self.threshold.is_finite() && self.threshold >= 0.0 {
            self.threshold
        } else {
            log::warn!(
                "TrailConfig::effective_threshold: invalid threshold {}, using {DEFAULT_THRESHOLD}",
                self.threshold
            );
            DEFAULT_THRESHOLD
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TrailConfig::from_json("{}").unwrap();
        assert_eq!(config, TrailConfig::default());
        assert_eq!(config.resolve_variant(), Some(Variant::Drift));
        assert_eq!(config.effective_threshold(), 80.0);
    }

    #[test]
    fn test_variant_as_number_or_string() {
        let config = TrailConfig::from_json(r#"{"variant": 7, "threshold": 40}"#).unwrap();
        assert_eq!(config.variant, "7");
        assert_eq!(config.resolve_variant(), Some(Variant::Stacked));
        assert_eq!(config.effective_threshold(), 40.0);

        let config = TrailConfig::from_json(r#"{"variant": "depth"}"#).unwrap();
        assert_eq!(config.resolve_variant(), Some(Variant::Depth));
    }

    #[test]
    fn test_unknown_variant_is_not_an_error() {
        let config = TrailConfig::from_json(r#"{"variant": "12"}"#).unwrap();
        assert_eq!(config.resolve_variant(), None);
    }

    #[test]
    fn test_odd_selector_values_do_not_fail_loading() {
        let config = TrailConfig::from_json(r#"{"variant": 7.0}"#).unwrap();
        assert_eq!(config.variant, "7");
        assert_eq!(config.resolve_variant(), Some(Variant::Stacked));

        for json in [
            r#"{"variant": -1}"#,
            r#"{"variant": 2.5}"#,
            r#"{"variant": null}"#,
            r#"{"variant": [3]}"#,
        ] {
            let config = TrailConfig::from_json(json).unwrap();
            assert_eq!(config.resolve_variant(), None, "{json}");
        }
    }

    #[test]
    fn test_invalid_threshold_falls_back() {
        assert_eq!(
            TrailConfig::default()
                .with_threshold(-5.0)
                .effective_threshold(),
            DEFAULT_THRESHOLD
        );
        assert_eq!(
            TrailConfig::default()
                .with_threshold(f64::NAN)
                .effective_threshold(),
            DEFAULT_THRESHOLD
        );
        assert_eq!(
            TrailConfig::default().with_threshold(0.0).effective_threshold(),
            0.0
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"variant": "5", "threshold": 120.5}}"#).unwrap();
        let config = TrailConfig::load(file.path()).unwrap();
        assert_eq!(config.resolve_variant(), Some(Variant::Rotating));
        assert_eq!(config.threshold, 120.5);

        assert!(matches!(
            TrailConfig::from_json("{\"threshold\": \"far\"}"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            TrailConfig::load(Path::new("/nonexistent/trail.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
