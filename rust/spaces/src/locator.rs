// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-to-room lookup with a candidate-scan fallback.

use nalgebra::Point3;

use crate::error::Result;
use crate::model::Room;

/// Primary point-in-room query provided by the host model.
///
/// An `Err` is a hard failure of the query itself, distinct from `Ok(None)`
/// (the point is in no room).
pub trait RoomQuery {
    fn room_at_point(&self, point: &Point3<f64>) -> Result<Option<&Room>>;
}

/// Resolves the room containing a point.
///
/// The primary query is tried first. When it finds nothing and fallback is
/// enabled, the candidate rooms are scanned in order with their own boundary
/// test.
#[derive(Debug)]
pub struct RoomLocator<'a, Q> {
    query: &'a Q,
    candidates: &'a [Room],
    fallback: bool,
}

impl<'a, Q: RoomQuery> RoomLocator<'a, Q> {
    pub fn new(query: &'a Q, candidates: &'a [Room], fallback: bool) -> Self {
        Self {
            query,
            candidates,
            fallback,
        }
    }

    /// Returns the room containing `point`, if any.
    ///
    /// Errors from the primary query propagate. A candidate whose boundary test
    /// fails is treated as not containing the point and the scan continues.
    pub fn locate(&self, point: &Point3<f64>) -> Result<Option<&'a Room>> {
        let query: &'a Q = self.query;
        if let Some(room) = query.room_at_point(point)? {
            return Ok(Some(room));
        }

        if !self.fallback {
            return Ok(None);
        }

        for room in self.candidates {
            match room.contains_point(point) {
                Ok(true) => {
                    tracing::trace!(room = %room.id, "Fallback scan matched room");
                    return Ok(Some(room));
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::trace!(room = %room.id, error = %err, "Skipping room in fallback scan");
                }
            }
        }

        Ok(None)
    }
}
