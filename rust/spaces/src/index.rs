// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial index for point-in-room queries.
//!
//! Uses a plan-view grid hash: each room is registered in every cell its
//! footprint bounds overlap, so a lookup only tests the rooms of one cell.
//! This is the primary query behind [`RoomLocator`](crate::RoomLocator).

use nalgebra::Point3;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::locator::RoomQuery;
use crate::model::{ElementId, Room};

/// Rooms covering more cells than this are kept in a separate list that every
/// lookup checks, instead of being copied into each cell.
const MAX_CELLS_PER_ROOM: i64 = 4096;

/// Grid-hashed room index over a borrowed room list.
///
/// Lookups test boundaries strictly (no tolerance). Rooms whose boundary is
/// degenerate are left out of the index at build time.
#[derive(Debug)]
pub struct SpaceIndex<'a> {
    rooms: &'a [Room],
    cell_size: f64,
    grid: FxHashMap<(i64, i64), Vec<usize>>,
    oversized: Vec<usize>,
    skipped: Vec<ElementId>,
}

impl<'a> SpaceIndex<'a> {
    /// Builds an index over `rooms` with square cells of side `cell_size`.
    pub fn build(rooms: &'a [Room], cell_size: f64) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::InvalidCellSize(cell_size));
        }

        let mut index = Self {
            rooms,
            cell_size,
            grid: FxHashMap::default(),
            oversized: Vec::new(),
            skipped: Vec::new(),
        };

        for (i, room) in rooms.iter().enumerate() {
            if let Err(err) = room.boundary.validate(room.id) {
                tracing::warn!(room = %room.id, error = %err, "Room left out of spatial index");
                index.skipped.push(room.id);
                continue;
            }
            // validate() guarantees a non-empty, finite footprint
            let Some((min, max)) = room.boundary.plan_bounds() else {
                index.skipped.push(room.id);
                continue;
            };

            let (x0, y0) = index.cell_coords(min.x, min.y);
            let (x1, y1) = index.cell_coords(max.x, max.y);
            let cells = cell_span(x0, x1)
                .zip(cell_span(y0, y1))
                .and_then(|(nx, ny)| nx.checked_mul(ny));
            if cells.map_or(true, |n| n > MAX_CELLS_PER_ROOM) {
                index.oversized.push(i);
                continue;
            }
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    index.grid.entry((cx, cy)).or_default().push(i);
                }
            }
        }

        tracing::debug!(
            rooms = rooms.len(),
            cells = index.grid.len(),
            oversized = index.oversized.len(),
            skipped = index.skipped.len(),
            "Built space index"
        );

        Ok(index)
    }

    /// Rooms that were left out because their boundary is unusable.
    pub fn skipped(&self) -> &[ElementId] {
        &self.skipped
    }

    /// Number of indexed rooms.
    pub fn len(&self) -> usize {
        self.rooms.len() - self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_coords(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }
}

/// Number of cells in `lo..=hi`, `None` on overflow.
fn cell_span(lo: i64, hi: i64) -> Option<i64> {
    hi.checked_sub(lo)?.checked_add(1)
}

impl RoomQuery for SpaceIndex<'_> {
    /// Returns the first room, in model order, whose boundary strictly
    /// contains `point`.
    fn room_at_point(&self, point: &Point3<f64>) -> Result<Option<&Room>> {
        if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
            return Err(Error::NonFinitePoint(point.x, point.y, point.z));
        }

        let cell = self.cell_coords(point.x, point.y);
        let candidates = self
            .grid
            .get(&cell)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .chain(self.oversized.iter());

        let mut best: Option<usize> = None;
        for &i in candidates {
            if best.is_some_and(|b| b < i) {
                continue;
            }
            let room = &self.rooms[i];
            if room.boundary.contains(room.id, point, 0.0)? {
                best = Some(i);
            }
        }

        Ok(best.map(|i| &self.rooms[i]))
    }
}
