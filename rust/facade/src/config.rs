// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::spatial::IndexBackend;

/// Default margin added to half the segment length along the path.
pub const DEFAULT_MARGIN_WIDTH: f64 = 10.0;
/// Default reach perpendicular to the path.
pub const DEFAULT_MARGIN_HEIGHT: f64 = 100.0;

/// Settings for a visibility run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Extra search distance beyond each end of a segment.
    pub margin_width: f64,
    /// Search distance perpendicular to a segment.
    pub margin_height: f64,
    /// Point index implementation.
    pub backend: IndexBackend,
    /// Sweep segments on the rayon pool.
    pub parallel: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            margin_width: DEFAULT_MARGIN_WIDTH,
            margin_height: DEFAULT_MARGIN_HEIGHT,
            backend: IndexBackend::default(),
            parallel: false,
        }
    }
}

impl VisibilityConfig {
    pub fn new(margin_width: f64, margin_height: f64) -> Self {
        Self {
            margin_width,
            margin_height,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            margin_width: std::env::var("FACADE_MARGIN_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.margin_width),
            margin_height: std::env::var("FACADE_MARGIN_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.margin_height),
            backend: std::env::var("FACADE_INDEX_BACKEND")
                .ok()
                .and_then(|v| IndexBackend::parse(&v))
                .unwrap_or(defaults.backend),
            parallel: std::env::var("FACADE_PARALLEL")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(defaults.parallel),
        }
    }

    pub fn with_backend(mut self, backend: IndexBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("margin_width", self.margin_width),
            ("margin_height", self.margin_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Radius around a segment center that covers every edge able to affect
    /// visibility along it.
    pub fn search_radius(&self, segment_length: f64) -> f64 {
        let search_width = segment_length / 2.0 + self.margin_width;
        (search_width * search_width + self.margin_height * self.margin_height).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_search_radius() {
        let config = VisibilityConfig::new(10.0, 100.0);
        // (20/2 + 10)^2 + 100^2
        assert_relative_eq!(config.search_radius(20.0), (400.0f64 + 10_000.0).sqrt());

        let tight = VisibilityConfig::new(0.0, 0.0);
        assert_relative_eq!(tight.search_radius(8.0), 4.0);
    }

    #[test]
    fn test_validate() {
        assert!(VisibilityConfig::default().validate().is_ok());
        assert!(VisibilityConfig::new(-1.0, 5.0).validate().is_err());
        assert!(VisibilityConfig::new(1.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: VisibilityConfig =
            serde_json::from_str(r#"{ "margin_width": 4.5, "backend": "rtree" }"#).unwrap();

        assert_eq!(config.margin_width, 4.5);
        assert_eq!(config.margin_height, DEFAULT_MARGIN_HEIGHT);
        assert_eq!(config.backend, IndexBackend::RTree);
        assert!(!config.parallel);
    }
}
