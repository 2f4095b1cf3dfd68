//! Fade-in-on-visibility component: content starts transparent (optionally
//! blurred) and is revealed once enough of it scrolls into view. The stage
//! feeds it `intersection` host events.

use crate::animation::timeline::Style;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_DURATION_MS: u64 = 1000;
const DEFAULT_EASING: &str = "ease-out";
const DEFAULT_THRESHOLD: f64 = 0.1;
const HIDDEN_BLUR: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    pub blur: bool,
    #[serde(alias = "duration")]
    pub duration_ms: u64,
    /// CSS timing function name.
    pub easing: String,
    #[serde(alias = "delay")]
    pub delay_ms: u64,
    /// Visible fraction of the element that triggers the reveal.
    pub threshold: f64,
    #[serde(alias = "initialOpacity")]
    pub initial_opacity: f64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            blur: false,
            duration_ms: DEFAULT_DURATION_MS,
            easing: DEFAULT_EASING.to_string(),
            delay_ms: 0,
            threshold: DEFAULT_THRESHOLD,
            initial_opacity: 0.0,
        }
    }
}

impl FadeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        log::debug!("FadeConfig::load: {} -> {config:?}", path.display());
        Ok(config)
    }

    /// Replaces unusable values with defaults: a zero duration, an empty
    /// easing and a zero or non-finite threshold fall back, the threshold and
    /// opacity are clamped to `[0, 1]`.
    pub fn normalized(mut self) -> Self {
        if self.duration_ms == 0 {
            self.duration_ms = DEFAULT_DURATION_MS;
        }
        if self.easing.trim().is_empty() {
            self.easing = DEFAULT_EASING.to_string();
        }
        self.threshold = if self.threshold.is_finite() && self.threshold > 0.0 {
            self.threshold.min(1.0)
        } else {
            DEFAULT_THRESHOLD
        };
        self.initial_opacity = if self.initial_opacity.is_finite() {
            self.initial_opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

/// Transition to start once the element became visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    pub delay: Duration,
    pub duration: Duration,
    pub easing: String,
    pub style: Style,
}

#[derive(Debug)]
pub struct FadeReveal {
    config: FadeConfig,
    observing: bool,
}

impl FadeReveal {
    pub fn new(config: FadeConfig) -> Self {
        Self {
            config: config.normalized(),
            observing: true,
        }
    }

    pub fn config(&self) -> &FadeConfig {
        &self.config
    }

    pub fn initial_style(&self) -> Style {
        let style = Style::new().opacity(self.config.initial_opacity);
        if self.config.blur {
            style.blur(HIDDEN_BLUR)
        } else {
            style
        }
    }

    /// Visibility notification with the element's visible fraction. Returns
    /// the reveal the first time the threshold is met; the element is no
    /// longer observed afterwards.
    pub fn on_intersection(&mut self, ratio: f64) -> Option<Reveal> {
        if !self.observing || !(ratio > 0.0 && ratio >= self.config.threshold) {
            return None;
        }
        self.observing = false;
        log::debug!("FadeReveal::on_intersection: revealing at ratio {ratio}");

        let mut style = Style::new().opacity(1.0);
        if self.config.blur {
            style = style.blur(0.0);
        }
        Some(Reveal {
            delay: Duration::from_millis(self.config.delay_ms),
            duration: Duration::from_millis(self.config.duration_ms),
            easing: self.config.easing.clone(),
            style,
        })
    }

    pub fn disconnect(&mut self) {
        self.observing = false;
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }
}
