// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assignment parameters.
//!
//! Probe distances are defined in metres and converted to the model's length
//! unit, so a model authored in feet probes the same physical distances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{DEFAULT_BALCONY_TERMS, DEFAULT_EXCLUSION_MARKER};

/// Probe offsets in metres, coarsest first.
pub const DEFAULT_OFFSETS_M: [f64; 3] = [1.0, 0.7, 0.4];

/// Height added to the sill elevation for the second probe height, in metres.
pub const DEFAULT_SILL_DELTA_M: f64 = 0.5;

/// Default index cell size in metres.
pub const DEFAULT_CELL_SIZE_M: f64 = 2.0;

const METRES_PER_FOOT: f64 = 0.3048;

/// Length unit of the model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Meters,
    Feet,
}

impl LengthUnit {
    /// Converts a length in metres to this unit.
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            LengthUnit::Meters => meters,
            LengthUnit::Feet => meters / METRES_PER_FOOT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LengthUnit::Meters => "meters",
            LengthUnit::Feet => "feet",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LengthUnit::Meters),
            "ft" | "foot" | "feet" => Ok(LengthUnit::Feet),
            other => Err(format!("unknown length unit: {}", other)),
        }
    }
}

/// Parameters of the per-window probe search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Probe distances in model units, tried in order.
    pub offsets: Vec<f64>,
    /// Added to the sill elevation to get the second probe height.
    pub sill_delta: f64,
    /// Name fragments marking balcony/terrace rooms.
    pub balcony_terms: Vec<String>,
    /// Scan all rooms when the primary lookup finds nothing.
    pub fallback_scan: bool,
}

impl ResolverConfig {
    /// Default probe parameters expressed in `unit`.
    pub fn for_unit(unit: LengthUnit) -> Self {
        Self {
            offsets: DEFAULT_OFFSETS_M
                .iter()
                .map(|&m| unit.from_meters(m))
                .collect(),
            sill_delta: unit.from_meters(DEFAULT_SILL_DELTA_M),
            balcony_terms: DEFAULT_BALCONY_TERMS.iter().map(|t| t.to_string()).collect(),
            fallback_scan: true,
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::for_unit(LengthUnit::Meters)
    }
}

/// Parameters of a full assignment run over a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignConfig {
    pub resolver: ResolverConfig,
    /// Windows whose type or family name contains this are skipped.
    pub exclusion_marker: String,
    /// Side of a spatial index cell, in model units.
    pub cell_size: f64,
}

impl AssignConfig {
    pub fn for_unit(unit: LengthUnit) -> Self {
        Self {
            resolver: ResolverConfig::for_unit(unit),
            exclusion_marker: DEFAULT_EXCLUSION_MARKER.to_string(),
            cell_size: unit.from_meters(DEFAULT_CELL_SIZE_M),
        }
    }
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self::for_unit(LengthUnit::Meters)
    }
}
