// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model-wide assignment with parallel per-window resolution.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::AssignConfig;
use crate::error::Result;
use crate::index::SpaceIndex;
use crate::locator::{RoomLocator, RoomQuery};
use crate::model::{room_code, BuildingModel, ElementId, Room};
use crate::outcome::AssignmentOutcome;
use crate::resolver::resolve;

/// Outcome for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAssignment {
    pub window: ElementId,
    pub outcome: AssignmentOutcome,
}

/// Result of an assignment run over a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRun {
    /// One entry per non-excluded window, in model order.
    pub assignments: Vec<WindowAssignment>,
    /// Windows skipped by the exclusion marker.
    pub excluded: Vec<ElementId>,
}

impl AssignmentRun {
    pub fn assigned_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.outcome.is_assigned())
            .count()
    }

    pub fn unassigned_count(&self) -> usize {
        self.assignments.len() - self.assigned_count()
    }

    /// Room code for every resolved window, ready for
    /// [`BuildingModel::apply_room_codes`].
    pub fn room_codes(&self, rooms: &[Room]) -> Vec<(ElementId, String)> {
        let by_id: FxHashMap<ElementId, &Room> = rooms.iter().map(|r| (r.id, r)).collect();
        self.assignments
            .iter()
            .map(|a| {
                let room = a.outcome.room().and_then(|id| by_id.get(&id).copied());
                (a.window, room_code(room))
            })
            .collect()
    }
}

/// Assigns every window of `model` using a [`SpaceIndex`] over its rooms.
pub fn assign_windows(model: &BuildingModel, config: &AssignConfig) -> Result<AssignmentRun> {
    let index = SpaceIndex::build(&model.rooms, config.cell_size)?;
    Ok(assign_with_query(model, &index, config))
}

/// Assigns every window of `model` using `query` as the primary room lookup.
///
/// Excluded windows are filtered out first; the rest are resolved in
/// parallel, each independently.
pub fn assign_with_query<Q: RoomQuery + Sync>(
    model: &BuildingModel,
    query: &Q,
    config: &AssignConfig,
) -> AssignmentRun {
    let start = std::time::Instant::now();

    let (excluded, included): (Vec<_>, Vec<_>) = model
        .windows
        .iter()
        .partition(|w| w.is_excluded(&config.exclusion_marker));

    let locator = RoomLocator::new(query, &model.rooms, config.resolver.fallback_scan);

    let assignments: Vec<WindowAssignment> = included
        .par_iter()
        .map(|window| WindowAssignment {
            window: window.id,
            outcome: resolve(
                window,
                model.level_elevation(window),
                &locator,
                &config.resolver,
            ),
        })
        .collect();

    let run = AssignmentRun {
        assignments,
        excluded: excluded.iter().map(|w| w.id).collect(),
    };

    tracing::info!(
        windows = model.windows.len(),
        excluded = run.excluded.len(),
        assigned = run.assigned_count(),
        unassigned = run.unassigned_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Window assignment complete"
    );

    run
}
