// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Lite Spaces
//!
//! Assigns windows to the rooms they open into, using geometry only: the
//! window's bounding box, facing direction and sill height, and point
//! containment against room boundaries.
//!
//! For every window a pair of probe points is placed on either side of the
//! window along its facing normal, at decreasing offsets and at up to two
//! heights. The first probe pair that lands in exactly one room, or in two
//! rooms of which exactly one is a balcony or terrace, decides the room.
//!
//! ```rust,ignore
//! use ifc_lite_spaces::{assign_windows, AssignConfig, AssignmentReport, BuildingModel};
//!
//! let mut model = BuildingModel::from_json(&json)?;
//! let run = assign_windows(&model, &AssignConfig::default())?;
//! let report = AssignmentReport::build(&model, &run);
//! model.apply_room_codes(&run.room_codes(&model.rooms))?;
//! ```

pub mod assign;
pub mod boundary;
pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod locator;
pub mod model;
pub mod outcome;
pub mod report;
pub mod resolver;

pub use assign::{assign_windows, assign_with_query, AssignmentRun, WindowAssignment};
pub use boundary::RoomBoundary;
pub use config::{AssignConfig, LengthUnit, ResolverConfig};
pub use error::{Error, Result};
pub use index::SpaceIndex;
pub use locator::{RoomLocator, RoomQuery};
pub use model::{
    is_balcony_name, room_code, BoundingBox, BuildingModel, ElementId, Level, Point3D, Room,
    Window, UNASSIGNED_CODE,
};
pub use outcome::{AssignmentOutcome, DecisionRule, ProbeTier, UnassignedReason};
pub use report::{AssignmentReport, LevelHistogram, UnassignedWindow, WindowCountBucket};
pub use resolver::resolve;
