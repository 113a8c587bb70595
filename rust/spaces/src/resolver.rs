// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adaptive-offset window resolution.
//!
//! For each window two probes are placed on either side of its bounding-box
//! center along the facing normal. Offsets are tried coarsest first and, for
//! each offset, the center height before the sill-based height. The first
//! probe pair that discriminates a room decides; there is no backtracking.
//!
//! Decision rules for one probe pair:
//!
//! | inside | outside | result |
//! |--------|---------|--------|
//! | room A | room A  | inconclusive (window on a thin partition) |
//! | room A | room B  | the non-balcony one if exactly one is a balcony, else inconclusive |
//! | room A | none    | A, even a balcony |
//! | none   | none    | inconclusive |

use nalgebra::Point3;

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::geometry::{center, normalize, probe_pair, sill_world_elevation};
use crate::locator::{RoomLocator, RoomQuery};
use crate::model::{Room, Window};
use crate::outcome::{AssignmentOutcome, DecisionRule, ProbeTier, UnassignedReason};

/// Verdict for a single probe pair.
#[derive(Debug, Clone, Copy)]
enum PairVerdict<'r> {
    SameRoom,
    Tied,
    Empty,
    Decided(&'r Room, DecisionRule),
}

/// Resolves the room of one window.
///
/// Never fails: every problem, including a failing room query, becomes an
/// [`AssignmentOutcome::Unassigned`] for this window only.
pub fn resolve<Q: RoomQuery>(
    window: &Window,
    level_elevation: f64,
    locator: &RoomLocator<'_, Q>,
    config: &ResolverConfig,
) -> AssignmentOutcome {
    match search(window, level_elevation, locator, config) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::debug!(window = %window.id, error = %err, "Room query failed while probing");
            AssignmentOutcome::Unassigned {
                reason: UnassignedReason::LocatorError,
                detail: err.to_string(),
            }
        }
    }
}

/// Probe heights: bounding-box center first, then sill + delta when known.
pub fn probe_heights(center_z: f64, sill_world: Option<f64>, sill_delta: f64) -> Vec<f64> {
    let mut heights = vec![center_z];
    if let Some(sill) = sill_world {
        heights.push(sill + sill_delta);
    }
    heights
}

fn search<Q: RoomQuery>(
    window: &Window,
    level_elevation: f64,
    locator: &RoomLocator<'_, Q>,
    config: &ResolverConfig,
) -> Result<AssignmentOutcome> {
    let Some(bbox) = window.bbox.as_ref() else {
        return Ok(AssignmentOutcome::unassigned(UnassignedReason::NoBoundingBox));
    };
    let Some(facing) = window.facing.as_ref() else {
        return Ok(AssignmentOutcome::unassigned(UnassignedReason::NoFacing));
    };
    let Some(normal) = normalize(&facing.to_vector()) else {
        return Ok(AssignmentOutcome::unassigned(
            UnassignedReason::NoFacingNormalizable,
        ));
    };

    let c = center(bbox);
    let heights = probe_heights(
        c.z,
        sill_world_elevation(window, level_elevation),
        config.sill_delta,
    );

    for &offset in &config.offsets {
        for &height in &heights {
            let origin = Point3::new(c.x, c.y, height);
            let (p_in, p_out) = probe_pair(&origin, &normal, offset);
            let inside = locator.locate(&p_in)?;
            let outside = locator.locate(&p_out)?;

            let verdict = judge(inside, outside, &config.balcony_terms);
            tracing::trace!(window = %window.id, offset, height, ?verdict, "Probe pair");

            if let PairVerdict::Decided(room, rule) = verdict {
                tracing::debug!(
                    window = %window.id,
                    room = %room.id,
                    room_name = room.display_name(),
                    offset,
                    height,
                    ?rule,
                    "Window assigned"
                );
                return Ok(AssignmentOutcome::Assigned {
                    room: room.id,
                    tier: ProbeTier { offset, height },
                    rule,
                });
            }
        }
    }

    Ok(AssignmentOutcome::unassigned(UnassignedReason::NoAssignment))
}

fn judge<'r>(
    inside: Option<&'r Room>,
    outside: Option<&'r Room>,
    balcony_terms: &[String],
) -> PairVerdict<'r> {
    match (inside, outside) {
        (Some(a), Some(b)) if a.id == b.id => PairVerdict::SameRoom,
        (Some(a), Some(b)) => match (a.is_balcony(balcony_terms), b.is_balcony(balcony_terms)) {
            (true, false) => PairVerdict::Decided(b, DecisionRule::BalconyDisambiguated),
            (false, true) => PairVerdict::Decided(a, DecisionRule::BalconyDisambiguated),
            _ => PairVerdict::Tied,
        },
        (Some(room), None) | (None, Some(room)) => {
            PairVerdict::Decided(room, DecisionRule::SingleSided)
        }
        (None, None) => PairVerdict::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::RoomBoundary;
    use crate::error::Error;
    use crate::model::{BoundingBox, ElementId, Point3D};
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    /// Window centered at the origin, 1.0 m wide, 1.0 m tall, center at z = 1.5,
    /// facing +Y. Inside probes land at y > 0, outside probes at y < 0.
    fn window(sill_height: Option<f64>) -> Window {
        Window {
            id: ElementId(100),
            type_name: "Finestra 100x100".into(),
            family_name: "Finestra".into(),
            bbox: Some(BoundingBox::new(
                Point3D::new(-0.5, -0.1, 1.0),
                Point3D::new(0.5, 0.1, 2.0),
            )),
            facing: Some(Point3D::new(0.0, 1.0, 0.0)),
            sill_height,
            level: None,
            comments: None,
        }
    }

    fn room(id: u32, name: &str) -> Room {
        Room {
            id: ElementId(id),
            name: Some(name.into()),
            department: None,
            level: None,
            boundary: RoomBoundary::rectangle(0.0, 0.0, 1.0, 1.0, 0.0, 1.0),
        }
    }

    /// Query answering from a closure over the probe point, recording every
    /// call.
    struct Scripted<F> {
        rooms: Vec<Room>,
        answer: F,
        calls: RefCell<Vec<Point3<f64>>>,
    }

    impl<F> Scripted<F> {
        fn new(rooms: Vec<Room>, answer: F) -> Self
        where
            F: Fn(&Point3<f64>) -> Option<usize>,
        {
            Self {
                rooms,
                answer,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl<F: Fn(&Point3<f64>) -> Option<usize>> RoomQuery for Scripted<F> {
        fn room_at_point(&self, point: &Point3<f64>) -> Result<Option<&Room>> {
            self.calls.borrow_mut().push(*point);
            Ok((self.answer)(point).map(|i| &self.rooms[i]))
        }
    }

    fn run<F: Fn(&Point3<f64>) -> Option<usize>>(
        window: &Window,
        query: &Scripted<F>,
    ) -> AssignmentOutcome {
        let locator = RoomLocator::new(query, &[], false);
        resolve(window, 0.0, &locator, &ResolverConfig::default())
    }

    #[test]
    fn single_sided_probe_assigns() {
        let query = Scripted::new(vec![room(1, "Sala")], |p| (p.y > 0.0).then_some(0));
        let outcome = run(&window(Some(0.9)), &query);

        assert_eq!(outcome.room(), Some(ElementId(1)));
        match outcome {
            AssignmentOutcome::Assigned { tier, rule, .. } => {
                assert_relative_eq!(tier.offset, 1.0);
                assert_relative_eq!(tier.height, 1.5);
                assert_eq!(rule, DecisionRule::SingleSided);
            }
            other => panic!("expected assignment, got {:?}", other),
        }
        assert_eq!(query.calls.borrow().len(), 2);
    }

    #[test]
    fn single_sided_balcony_is_accepted() {
        let query = Scripted::new(vec![room(1, "Balcó 3")], |p| (p.y < 0.0).then_some(0));
        assert_eq!(run(&window(None), &query).room(), Some(ElementId(1)));
    }

    #[test]
    fn balcony_loses_regardless_of_side() {
        let rooms = vec![room(1, "Dormitori"), room(2, "Balcony 3")];

        let query = Scripted::new(rooms.clone(), |p| Some(if p.y > 0.0 { 0 } else { 1 }));
        let outcome = run(&window(None), &query);
        assert_eq!(outcome.room(), Some(ElementId(1)));
        assert!(matches!(
            outcome,
            AssignmentOutcome::Assigned {
                rule: DecisionRule::BalconyDisambiguated,
                ..
            }
        ));

        let query = Scripted::new(rooms, |p| Some(if p.y > 0.0 { 1 } else { 0 }));
        assert_eq!(run(&window(None), &query).room(), Some(ElementId(1)));
    }

    #[test]
    fn two_ordinary_rooms_exhaust_all_tiers() {
        let rooms = vec![room(1, "Sala"), room(2, "Cuina")];
        let query = Scripted::new(rooms, |p| Some(if p.y > 0.0 { 0 } else { 1 }));
        let outcome = run(&window(Some(0.9)), &query);

        assert_eq!(outcome.reason(), Some(UnassignedReason::NoAssignment));
        // 3 offsets x 2 heights x 2 probes
        assert_eq!(query.calls.borrow().len(), 12);
    }

    #[test]
    fn two_balconies_are_tied() {
        let rooms = vec![room(1, "Terrassa"), room(2, "Balcó")];
        let query = Scripted::new(rooms, |p| Some(if p.y > 0.0 { 0 } else { 1 }));
        assert_eq!(
            run(&window(None), &query).reason(),
            Some(UnassignedReason::NoAssignment)
        );
    }

    #[test]
    fn same_room_on_both_sides_is_never_assigned() {
        let query = Scripted::new(vec![room(1, "Passadís")], |_| Some(0));
        assert_eq!(
            run(&window(Some(0.9)), &query).reason(),
            Some(UnassignedReason::NoAssignment)
        );
    }

    #[test]
    fn zero_facing_short_circuits_without_probing() {
        let mut w = window(Some(0.9));
        w.facing = Some(Point3D::new(0.0, 0.0, 0.0));
        let query = Scripted::new(vec![room(1, "Sala")], |_| Some(0));

        assert_eq!(
            run(&w, &query).reason(),
            Some(UnassignedReason::NoFacingNormalizable)
        );
        assert!(query.calls.borrow().is_empty());
    }

    #[test]
    fn missing_bbox_and_facing() {
        let query = Scripted::new(vec![room(1, "Sala")], |_| Some(0));

        let mut w = window(None);
        w.bbox = None;
        assert_eq!(run(&w, &query).reason(), Some(UnassignedReason::NoBoundingBox));

        let mut w = window(None);
        w.facing = None;
        assert_eq!(run(&w, &query).reason(), Some(UnassignedReason::NoFacing));
        assert!(query.calls.borrow().is_empty());
    }

    #[test]
    fn without_sill_only_center_height_is_probed() {
        let rooms = vec![room(1, "Sala"), room(2, "Cuina")];
        let query = Scripted::new(rooms, |p| Some(if p.y > 0.0 { 0 } else { 1 }));
        run(&window(None), &query);

        let calls = query.calls.borrow();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|p| (p.z - 1.5).abs() < 1e-12));
        let offsets: Vec<f64> = calls.iter().step_by(2).map(|p| p.y).collect();
        assert_eq!(offsets, vec![1.0, 0.7, 0.4]);
    }

    #[test]
    fn heights_are_exhausted_before_next_offset() {
        // Same room at center height everywhere; at the sill height (0.9 + 0.5)
        // only the inside probe of any offset finds a room.
        let rooms = vec![room(1, "Passadís"), room(2, "Sala")];
        let query = Scripted::new(rooms, |p| {
            if (p.z - 1.5).abs() < 1e-9 {
                Some(0)
            } else {
                (p.y > 0.0).then_some(1)
            }
        });
        let outcome = run(&window(Some(0.9)), &query);

        match outcome {
            AssignmentOutcome::Assigned { room, tier, .. } => {
                assert_eq!(room, ElementId(2));
                assert_relative_eq!(tier.offset, 1.0);
                assert_relative_eq!(tier.height, 1.4);
            }
            other => panic!("expected assignment, got {:?}", other),
        }
        assert_eq!(query.calls.borrow().len(), 4);
    }

    #[test]
    fn first_decision_wins() {
        // One-sided at the widest offset; a narrower offset would see a
        // different room, but is never probed.
        let rooms = vec![room(1, "Sala"), room(2, "Cuina")];
        let query = Scripted::new(rooms, |p| {
            if p.y.abs() > 0.9 {
                (p.y < 0.0).then_some(0)
            } else {
                Some(1)
            }
        });
        let outcome = run(&window(Some(0.9)), &query);
        assert_eq!(outcome.room(), Some(ElementId(1)));
        assert_eq!(query.calls.borrow().len(), 2);
    }

    #[test]
    fn sill_height_uses_level_elevation() {
        let rooms = vec![room(1, "Sala")];
        let query = Scripted::new(rooms, |p| {
            ((p.z - (3.0 + 0.9 + 0.5)).abs() < 1e-9 && p.y > 0.0).then_some(0)
        });
        let locator = RoomLocator::new(&query, &[], false);
        let outcome = resolve(&window(Some(0.9)), 3.0, &locator, &ResolverConfig::default());
        assert_eq!(outcome.room(), Some(ElementId(1)));
    }

    #[test]
    fn query_failure_becomes_locator_error() {
        struct Failing;
        impl RoomQuery for Failing {
            fn room_at_point(&self, point: &Point3<f64>) -> Result<Option<&Room>> {
                Err(Error::NonFinitePoint(point.x, point.y, point.z))
            }
        }

        let locator = RoomLocator::new(&Failing, &[], true);
        let outcome = resolve(&window(None), 0.0, &locator, &ResolverConfig::default());
        match outcome {
            AssignmentOutcome::Unassigned { reason, detail } => {
                assert_eq!(reason, UnassignedReason::LocatorError);
                assert!(detail.contains("not finite"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn probe_heights_order() {
        assert_eq!(probe_heights(1.5, None, 0.5), vec![1.5]);
        assert_eq!(probe_heights(1.5, Some(0.9), 0.5), vec![1.5, 1.4]);
    }
}
