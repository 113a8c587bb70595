// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room boundaries and point containment.
//!
//! A room volume is a footprint polygon (outer ring plus optional holes, in
//! plan) extruded between two world elevations. Containment is the even-odd
//! crossing test in plan combined with a vertical range check, which handles
//! concave footprints and courtyards without triangulating.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ElementId;

const AREA_EPSILON: f64 = 1e-12;

/// Containment boundary of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomBoundary {
    /// Vertical extrusion of a plan polygon.
    Prism {
        /// Outer ring, `[x, y]` pairs. Closing vertex optional.
        outer: Vec<[f64; 2]>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        holes: Vec<Vec<[f64; 2]>>,
        /// Bottom elevation (world Z).
        base: f64,
        /// Top elevation (world Z).
        top: f64,
    },
}

impl RoomBoundary {
    /// Axis-aligned box room, convenient for simple layouts.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64, base: f64, top: f64) -> Self {
        RoomBoundary::Prism {
            outer: vec![[min_x, min_y], [max_x, min_y], [max_x, max_y], [min_x, max_y]],
            holes: Vec::new(),
            base,
            top,
        }
    }

    /// Checks that the boundary can answer containment queries.
    pub fn validate(&self, room: ElementId) -> Result<()> {
        let degenerate = |reason: &str| Error::DegenerateBoundary {
            room,
            reason: reason.to_string(),
        };

        match self {
            RoomBoundary::Prism {
                outer,
                holes,
                base,
                top,
            } => {
                if !base.is_finite() || !top.is_finite() {
                    return Err(degenerate("non-finite elevation"));
                }
                if top <= base {
                    return Err(degenerate("top is not above base"));
                }
                let finite = |ring: &[[f64; 2]]| ring.iter().flatten().all(|c| c.is_finite());
                if !finite(outer.as_slice()) || !holes.iter().all(|h| finite(h.as_slice())) {
                    return Err(degenerate("non-finite footprint coordinate"));
                }
                if distinct_vertex_count(outer) < 3 {
                    return Err(degenerate("footprint has fewer than 3 vertices"));
                }
                if signed_area(outer).abs() < AREA_EPSILON {
                    return Err(degenerate("footprint has zero area"));
                }
                Ok(())
            }
        }
    }

    /// Plan-view bounds of the footprint as `(min, max)`.
    pub fn plan_bounds(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        match self {
            RoomBoundary::Prism { outer, .. } => {
                let first = outer.first()?;
                let mut min = Point2::new(first[0], first[1]);
                let mut max = min;
                for p in outer {
                    min.x = min.x.min(p[0]);
                    min.y = min.y.min(p[1]);
                    max.x = max.x.max(p[0]);
                    max.y = max.y.max(p[1]);
                }
                Some((min, max))
            }
        }
    }

    /// Tests whether `point` lies inside the room volume.
    ///
    /// With `tolerance > 0`, points within that distance of a wall or of the
    /// floor/ceiling planes count as inside. With zero tolerance, points exactly
    /// on the boundary may go either way.
    pub fn contains(&self, room: ElementId, point: &Point3<f64>, tolerance: f64) -> Result<bool> {
        if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
            return Err(Error::NonFinitePoint(point.x, point.y, point.z));
        }
        self.validate(room)?;

        match self {
            RoomBoundary::Prism {
                outer,
                holes,
                base,
                top,
            } => {
                if point.z < base - tolerance || point.z > top + tolerance {
                    return Ok(false);
                }

                let p = Point2::new(point.x, point.y);
                let rings = std::iter::once(outer.as_slice()).chain(holes.iter().map(Vec::as_slice));

                let mut inside = false;
                for ring in rings {
                    if tolerance > 0.0 && distance_to_ring(&p, ring) <= tolerance {
                        return Ok(true);
                    }
                    if ring_crossings(&p, ring) % 2 == 1 {
                        inside = !inside;
                    }
                }
                Ok(inside)
            }
        }
    }
}

/// Iterates the edges of a ring, closing it if the last vertex differs from
/// the first.
fn ring_edges(ring: &[[f64; 2]]) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        (Point2::new(a[0], a[1]), Point2::new(b[0], b[1]))
    })
}

/// Counts crossings of the +X ray from `p` with the ring edges.
fn ring_crossings(p: &Point2<f64>, ring: &[[f64; 2]]) -> usize {
    ring_edges(ring)
        .filter(|(a, b)| {
            // Half-open rule so a ray through a vertex counts once
            if (a.y > p.y) == (b.y > p.y) {
                return false;
            }
            let x_at = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            p.x < x_at
        })
        .count()
}

fn distance_to_ring(p: &Point2<f64>, ring: &[[f64; 2]]) -> f64 {
    ring_edges(ring)
        .map(|(a, b)| distance_to_segment(p, &a, &b))
        .fold(f64::INFINITY, f64::min)
}

fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < AREA_EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Shoelace area, positive for counter-clockwise rings.
fn signed_area(ring: &[[f64; 2]]) -> f64 {
    ring_edges(ring)
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        / 2.0
}

fn distinct_vertex_count(ring: &[[f64; 2]]) -> usize {
    let mut distinct: Vec<[f64; 2]> = Vec::with_capacity(ring.len());
    for p in ring {
        if !distinct.contains(p) {
            distinct.push(*p);
        }
    }
    distinct.len()
}
