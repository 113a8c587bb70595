// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric helpers for window probing.

use nalgebra::{Point3, Unit, Vector3};

use crate::model::{BoundingBox, Window};

/// Norms below this are treated as zero-length facing vectors.
const MIN_FACING_NORM: f64 = 1e-9;

/// Per-axis midpoint of a bounding box.
pub fn center(bbox: &BoundingBox) -> Point3<f64> {
    Point3::new(
        (bbox.min.x + bbox.max.x) * 0.5,
        (bbox.min.y + bbox.max.y) * 0.5,
        (bbox.min.z + bbox.max.z) * 0.5,
    )
}

/// Normalizes a facing vector.
///
/// Returns `None` for zero-length or non-finite vectors, which carry no usable
/// direction.
pub fn normalize(vector: &Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    if !vector.iter().all(|c| c.is_finite()) {
        return None;
    }
    Unit::try_new(*vector, MIN_FACING_NORM)
}

/// World elevation of the window sill: `level_elevation + sill_height`, or
/// `None` when the window has no sill height.
pub fn sill_world_elevation(window: &Window, level_elevation: f64) -> Option<f64> {
    window.sill_height.map(|sill| level_elevation + sill)
}

/// The two probe points `(inside, outside)` at `offset` along `normal` from
/// `origin`.
pub fn probe_pair(
    origin: &Point3<f64>,
    normal: &Unit<Vector3<f64>>,
    offset: f64,
) -> (Point3<f64>, Point3<f64>) {
    let step = normal.into_inner() * offset;
    (origin + step, origin - step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementId, Point3D};
    use approx::assert_relative_eq;

    #[test]
    fn center_is_axis_midpoint() {
        let bbox = BoundingBox::new(Point3D::new(1.0, -2.0, 0.9), Point3D::new(2.2, -1.8, 2.1));
        let c = center(&bbox);
        assert_relative_eq!(c.x, 1.6);
        assert_relative_eq!(c.y, -1.9);
        assert_relative_eq!(c.z, 1.5);
    }

    #[test]
    fn normalize_scales_to_unit_length() {
        let n = normalize(&Vector3::new(0.0, -3.0, 4.0)).unwrap();
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.y, -0.6, epsilon = 1e-12);
        assert_relative_eq!(n.z, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn normalize_rejects_degenerate_vectors() {
        assert!(normalize(&Vector3::zeros()).is_none());
        assert!(normalize(&Vector3::new(1e-12, 0.0, 0.0)).is_none());
        assert!(normalize(&Vector3::new(f64::NAN, 1.0, 0.0)).is_none());
        assert!(normalize(&Vector3::new(f64::INFINITY, 0.0, 0.0)).is_none());
    }

    #[test]
    fn sill_elevation_adds_level() {
        let mut window = Window {
            id: ElementId(1),
            type_name: String::new(),
            family_name: String::new(),
            bbox: None,
            facing: None,
            sill_height: Some(0.9),
            level: None,
            comments: None,
        };
        assert_relative_eq!(sill_world_elevation(&window, 6.0).unwrap(), 6.9);
        window.sill_height = None;
        assert!(sill_world_elevation(&window, 6.0).is_none());
    }

    #[test]
    fn probe_pair_is_symmetric() {
        let n = normalize(&Vector3::new(0.0, 2.0, 0.0)).unwrap();
        let (p_in, p_out) = probe_pair(&Point3::new(1.0, 1.0, 1.5), &n, 0.7);
        assert_relative_eq!(p_in.y, 1.7);
        assert_relative_eq!(p_out.y, 0.3);
        assert_relative_eq!(p_in.x, 1.0);
        assert_relative_eq!(p_out.z, 1.5);
    }
}
