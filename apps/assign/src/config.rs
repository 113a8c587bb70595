// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.
//!
//! Command-line flags are applied on top in `main`.

use ifc_lite_spaces::{AssignConfig, LengthUnit};

/// Tool configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Length unit of the model coordinates.
    pub unit: LengthUnit,
    /// Exclusion marker for void window types.
    pub exclusion_marker: Option<String>,
    /// Scan all rooms when the index lookup misses.
    pub fallback_scan: bool,
    /// Index cell size in model units; unit default when unset.
    pub cell_size: Option<f64>,
    /// Number of worker threads for parallel resolution.
    pub worker_threads: usize,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            unit: std::env::var("WINDOW_ROOMS_UNIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            exclusion_marker: std::env::var("WINDOW_ROOMS_EXCLUDE").ok(),
            fallback_scan: std::env::var("WINDOW_ROOMS_FALLBACK")
                .map(|s| parse_flag(&s))
                .unwrap_or(true),
            cell_size: std::env::var("WINDOW_ROOMS_CELL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok()),
            worker_threads: std::env::var("WORKER_THREADS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
            json_logs: std::env::var("WINDOW_ROOMS_LOG_FORMAT")
                .map(|s| s.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Library configuration for this tool configuration.
    pub fn assign_config(&self) -> AssignConfig {
        let mut config = AssignConfig::for_unit(self.unit);
        config.resolver.fallback_scan = self.fallback_scan;
        if let Some(marker) = &self.exclusion_marker {
            config.exclusion_marker = marker.clone();
        }
        if let Some(cell_size) = self.cell_size {
            config.cell_size = cell_size;
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// `0`, `false`, `no` and `off` disable; anything else enables.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(unit: LengthUnit) -> Config {
        Config {
            unit,
            exclusion_marker: None,
            fallback_scan: true,
            cell_size: None,
            worker_threads: 1,
            json_logs: false,
        }
    }

    #[test]
    fn flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag(" Off "));
        assert!(!parse_flag("FALSE"));
    }

    #[test]
    fn overrides_reach_the_library_config() {
        let mut cfg = config(LengthUnit::Feet);
        cfg.exclusion_marker = Some("hueco".into());
        cfg.fallback_scan = false;
        cfg.cell_size = Some(10.0);

        let assign = cfg.assign_config();
        assert_eq!(assign.exclusion_marker, "hueco");
        assert!(!assign.resolver.fallback_scan);
        assert_eq!(assign.cell_size, 10.0);
        assert_eq!(
            assign.resolver.offsets,
            AssignConfig::for_unit(LengthUnit::Feet).resolver.offsets
        );
    }

    #[test]
    fn unset_overrides_keep_unit_defaults() {
        let assign = config(LengthUnit::Meters).assign_config();
        assert_eq!(assign, AssignConfig::default());
    }
}
