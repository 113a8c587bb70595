// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-window assignment results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ElementId;

/// Why a window could not be assigned to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnassignedReason {
    /// The window has no bounding box.
    #[serde(rename = "no_bbox")]
    NoBoundingBox,
    /// The window has no facing direction.
    #[serde(rename = "no_facing")]
    NoFacing,
    /// The facing direction is zero-length or not finite.
    #[serde(rename = "no_facing_normalizable")]
    NoFacingNormalizable,
    /// Every probe tier was inconclusive.
    #[serde(rename = "no_assigned")]
    NoAssignment,
    /// The room query failed while probing.
    #[serde(rename = "error")]
    LocatorError,
}

impl UnassignedReason {
    /// Stable tag used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            UnassignedReason::NoBoundingBox => "no_bbox",
            UnassignedReason::NoFacing => "no_facing",
            UnassignedReason::NoFacingNormalizable => "no_facing_normalizable",
            UnassignedReason::NoAssignment => "no_assigned",
            UnassignedReason::LocatorError => "error",
        }
    }
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which decision rule assigned the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Only one probe landed in a room.
    SingleSided,
    /// Two different rooms, exactly one of them a balcony; the other won.
    BalconyDisambiguated,
}

/// Offset and probe height at which a decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeTier {
    pub offset: f64,
    pub height: f64,
}

/// Result of resolving one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Assigned {
        room: ElementId,
        tier: ProbeTier,
        rule: DecisionRule,
    },
    Unassigned {
        reason: UnassignedReason,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        detail: String,
    },
}

impl AssignmentOutcome {
    pub fn unassigned(reason: UnassignedReason) -> Self {
        AssignmentOutcome::Unassigned {
            reason,
            detail: String::new(),
        }
    }

    /// Assigned room, if any.
    pub fn room(&self) -> Option<ElementId> {
        match self {
            AssignmentOutcome::Assigned { room, .. } => Some(*room),
            AssignmentOutcome::Unassigned { .. } => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentOutcome::Assigned { .. })
    }

    /// Unassigned reason, if any.
    pub fn reason(&self) -> Option<UnassignedReason> {
        match self {
            AssignmentOutcome::Assigned { .. } => None,
            AssignmentOutcome::Unassigned { reason, .. } => Some(*reason),
        }
    }
}
