// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Post-run aggregation: room → windows index, per-level histogram of window
//! counts, and the list of unassigned windows.
//!
//! Everything here is derived from a finished [`AssignmentRun`]; nothing is
//! collected while windows are being resolved.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::assign::AssignmentRun;
use crate::model::{BuildingModel, ElementId};
use crate::outcome::{AssignmentOutcome, UnassignedReason};

/// Label for rooms without a (resolvable) level.
pub const NO_LEVEL_NAME: &str = "(no level)";

/// Histogram bucket for the number of windows in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowCountBucket {
    Zero,
    One,
    Two,
    MoreThanTwo,
}

impl WindowCountBucket {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => WindowCountBucket::Zero,
            1 => WindowCountBucket::One,
            2 => WindowCountBucket::Two,
            _ => WindowCountBucket::MoreThanTwo,
        }
    }
}

/// Rooms of one level grouped by how many windows they received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelHistogram {
    pub level: Option<ElementId>,
    pub level_name: String,
    pub zero: Vec<ElementId>,
    pub one: Vec<ElementId>,
    pub two: Vec<ElementId>,
    pub more_than_two: Vec<ElementId>,
}

impl LevelHistogram {
    fn new(level: Option<ElementId>, level_name: String) -> Self {
        Self {
            level,
            level_name,
            zero: Vec::new(),
            one: Vec::new(),
            two: Vec::new(),
            more_than_two: Vec::new(),
        }
    }

    fn push(&mut self, room: ElementId, bucket: WindowCountBucket) {
        match bucket {
            WindowCountBucket::Zero => self.zero.push(room),
            WindowCountBucket::One => self.one.push(room),
            WindowCountBucket::Two => self.two.push(room),
            WindowCountBucket::MoreThanTwo => self.more_than_two.push(room),
        }
    }

    pub fn rooms(&self, bucket: WindowCountBucket) -> &[ElementId] {
        match bucket {
            WindowCountBucket::Zero => &self.zero,
            WindowCountBucket::One => &self.one,
            WindowCountBucket::Two => &self.two,
            WindowCountBucket::MoreThanTwo => &self.more_than_two,
        }
    }

    /// Room counts as `[0, 1, 2, >2]`.
    pub fn counts(&self) -> [usize; 4] {
        [
            self.zero.len(),
            self.one.len(),
            self.two.len(),
            self.more_than_two.len(),
        ]
    }
}

/// A window without a room, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedWindow {
    pub window: ElementId,
    pub type_name: String,
    pub reason: UnassignedReason,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

/// Aggregated view of an assignment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentReport {
    /// Windows per room, in model window order. Rooms without windows are absent.
    #[serde(default)]
    pub room_windows: FxHashMap<ElementId, Vec<ElementId>>,
    /// One histogram per level, ordered by first room appearance.
    pub levels: Vec<LevelHistogram>,
    pub unassigned: Vec<UnassignedWindow>,
    pub excluded: Vec<ElementId>,
    pub assigned_count: usize,
}

impl AssignmentReport {
    /// Folds the outcomes of `run` over the rooms and levels of `model`.
    pub fn build(model: &BuildingModel, run: &AssignmentRun) -> Self {
        let mut room_windows: FxHashMap<ElementId, Vec<ElementId>> = FxHashMap::default();
        let mut unassigned = Vec::new();

        for assignment in &run.assignments {
            match &assignment.outcome {
                AssignmentOutcome::Assigned { room, .. } => {
                    room_windows.entry(*room).or_default().push(assignment.window);
                }
                AssignmentOutcome::Unassigned { reason, detail } => {
                    unassigned.push(UnassignedWindow {
                        window: assignment.window,
                        type_name: model
                            .window(assignment.window)
                            .map(|w| w.type_name.clone())
                            .unwrap_or_default(),
                        reason: *reason,
                        detail: detail.clone(),
                    });
                }
            }
        }

        let mut levels: Vec<LevelHistogram> = Vec::new();
        let mut level_slots: FxHashMap<Option<ElementId>, usize> = FxHashMap::default();

        for room in &model.rooms {
            let level = room.level.and_then(|id| model.level(id));
            let key = level.map(|l| l.id);
            let slot = *level_slots.entry(key).or_insert_with(|| {
                let name = level
                    .map(|l| l.name.clone())
                    .unwrap_or_else(|| NO_LEVEL_NAME.to_string());
                levels.push(LevelHistogram::new(key, name));
                levels.len() - 1
            });

            let count = room_windows.get(&room.id).map_or(0, Vec::len);
            levels[slot].push(room.id, WindowCountBucket::from_count(count));
        }

        Self {
            room_windows,
            levels,
            unassigned,
            excluded: run.excluded.clone(),
            assigned_count: run.assigned_count(),
        }
    }

    /// Windows assigned to `room`.
    pub fn windows_in_room(&self, room: ElementId) -> &[ElementId] {
        self.room_windows
            .get(&room)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Unassigned windows with the given reason.
    pub fn unassigned_by_reason(
        &self,
        reason: UnassignedReason,
    ) -> impl Iterator<Item = &UnassignedWindow> {
        self.unassigned.iter().filter(move |u| u.reason == reason)
    }
}
