// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building model types: levels, rooms and windows.
//!
//! Every attribute the assignment reads is a typed field, so a missing value is
//! an explicit `None` rather than a failed string-keyed lookup. The model is
//! plain data and round-trips through JSON.

use std::fmt;

use nalgebra::{Point3, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::boundary::RoomBoundary;
use crate::error::{Error, Result};

/// Room code written for windows without an assigned room.
pub const UNASSIGNED_CODE: &str = "NA";

/// Name fragments that mark a room as a balcony or terrace.
pub const DEFAULT_BALCONY_TERMS: &[&str] = &["balcó", "terrassa", "terraza", "balcony", "terrace"];

/// Type/family marker for void placeholders that are not real windows.
pub const DEFAULT_EXCLUSION_MARKER: &str = "buit";

/// Tolerance used by [`Room::contains_point`]; points this close to a wall or
/// cap still count as inside.
pub const BOUNDARY_TOLERANCE: f64 = 1e-4;

/// Identity of a model element (level, room or window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A 3D coordinate triple (simplified for serialization).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3D,
    pub max: Point3D,
}

impl BoundingBox {
    pub fn new(min: Point3D, max: Point3D) -> Self {
        Self { min, max }
    }
}

/// A building storey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: ElementId,
    pub name: String,
    /// World elevation of the level datum.
    pub elevation: f64,
}

/// A window instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub id: ElementId,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    /// Outward facing direction; not necessarily unit length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<Point3D>,
    /// Sill height relative to the hosting level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sill_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Window {
    /// Returns true when the type or family name contains `marker`
    /// (case-insensitive). Such windows are voids, not glazing.
    pub fn is_excluded(&self, marker: &str) -> bool {
        let marker = marker.to_lowercase();
        if marker.is_empty() {
            return false;
        }
        format!("{} {}", self.type_name, self.family_name)
            .to_lowercase()
            .contains(&marker)
    }
}

/// A room (space) with a containment boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: ElementId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub level: Option<ElementId>,
    pub boundary: RoomBoundary,
}

impl Room {
    /// Trimmed room name, empty when unset.
    pub fn trimmed_name(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or("")
    }

    /// Name for log and report output.
    pub fn display_name(&self) -> &str {
        match self.trimmed_name() {
            "" => "(unnamed room)",
            name => name,
        }
    }

    /// Balcony-class rooms lose against ordinary rooms when a window sits
    /// between the two.
    pub fn is_balcony<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        is_balcony_name(self.trimmed_name(), terms)
    }

    /// Boundary containment test, inclusive within [`BOUNDARY_TOLERANCE`].
    pub fn contains_point(&self, point: &Point3<f64>) -> Result<bool> {
        self.boundary.contains(self.id, point, BOUNDARY_TOLERANCE)
    }
}

/// Case-insensitive substring match of `name` against balcony `terms`.
pub fn is_balcony_name<S: AsRef<str>>(name: &str, terms: &[S]) -> bool {
    let name = name.to_lowercase();
    terms.iter().any(|term| {
        let term = term.as_ref().to_lowercase();
        !term.is_empty() && name.contains(&term)
    })
}

/// Formats the code stored on a window: trimmed department followed by the
/// trimmed name, no separator. `None` yields [`UNASSIGNED_CODE`].
pub fn room_code(room: Option<&Room>) -> String {
    match room {
        None => UNASSIGNED_CODE.to_string(),
        Some(room) => {
            let department = room.department.as_deref().map(str::trim).unwrap_or("");
            format!("{}{}", department, room.trimmed_name())
        }
    }
}

/// Levels, rooms and windows of one building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingModel {
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub windows: Vec<Window>,
}

impl BuildingModel {
    /// Parses a model from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the model to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn level(&self, id: ElementId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn room(&self, id: ElementId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn window(&self, id: ElementId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Elevation of the window's hosting level, `0.0` when it has none or the
    /// reference is dangling.
    pub fn level_elevation(&self, window: &Window) -> f64 {
        window
            .level
            .and_then(|id| self.level(id))
            .map(|l| l.elevation)
            .unwrap_or(0.0)
    }

    /// Writes room codes into window comments as a single batch.
    ///
    /// The whole batch is validated first: an unknown window or a window listed
    /// twice rejects it and leaves every window untouched.
    ///
    /// Returns the number of windows written.
    pub fn apply_room_codes(&mut self, codes: &[(ElementId, String)]) -> Result<usize> {
        let positions: FxHashMap<ElementId, usize> = self
            .windows
            .iter()
            .enumerate()
            .map(|(i, w)| (w.id, i))
            .collect();

        let mut seen: FxHashSet<ElementId> = FxHashSet::default();
        let mut targets = Vec::with_capacity(codes.len());
        for (id, _) in codes {
            let pos = *positions.get(id).ok_or(Error::WindowNotFound(*id))?;
            if !seen.insert(*id) {
                return Err(Error::DuplicateWrite(*id));
            }
            targets.push(pos);
        }

        for (pos, (_, code)) in targets.into_iter().zip(codes) {
            self.windows[pos].comments = Some(code.clone());
        }

        Ok(codes.len())
    }
}
