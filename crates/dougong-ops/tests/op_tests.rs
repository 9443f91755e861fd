use approx::assert_relative_eq;
use proptest::prelude::*;

use dougong_kernel::{MockKernel, MockOp, ModelingKernel, Point3d, SolidHandle, TruckKernel, Vec3};
use dougong_ops::primitives::{add_box, extrude_along};
use dougong_ops::symmetry::{mirror_pair, quad_mirror_object, quad_rotate_object, quad_rotate_point};

/// Helper: an asymmetric L-shaped prism away from every symmetry plane.
fn make_l_prism(kernel: &mut MockKernel) -> SolidHandle {
    let curve = kernel
        .add_polyline(&[
            Point3d::new(3.0, 1.0, 0.0),
            Point3d::new(7.0, 1.0, 0.0),
            Point3d::new(7.0, 2.0, 0.0),
            Point3d::new(4.0, 2.0, 0.0),
            Point3d::new(4.0, 5.0, 0.0),
            Point3d::new(3.0, 5.0, 0.0),
            Point3d::new(3.0, 1.0, 0.0),
        ])
        .unwrap();
    let solid = extrude_along(kernel, &curve, Point3d::ORIGIN, Vec3::new(0.0, 0.0, 2.0)).unwrap();
    kernel.delete_curve(curve);
    solid
}

/// Probe points spread through the L, offset off the sampling lattice.
fn probes() -> Vec<Point3d> {
    let mut out = Vec::new();
    for &(x, y) in &[(3.3, 1.4), (6.6, 1.7), (3.6, 4.6), (5.1, 3.9), (3.9, 2.6)] {
        for &z in &[0.3, 1.7, 2.6] {
            out.push(Point3d::new(x, y, z));
        }
    }
    out
}

/// Two solids agree on membership at every mapped probe point.
fn assert_congruent(kernel: &MockKernel, a: &SolidHandle, b: &SolidHandle, map: impl Fn(Point3d) -> Point3d) {
    for p in probes() {
        assert_eq!(
            kernel.contains(a, map(p)).unwrap(),
            kernel.contains(b, map(p)).unwrap(),
            "membership differs at {:?}",
            map(p)
        );
    }
}

// ── Primitives ─────────────────────────────────────────────────────────────

#[test]
fn test_extrude_along_adds_one_net_object() {
    let mut kernel = MockKernel::new();
    let curve = kernel
        .add_polyline(&[
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(2.0, 3.0, 0.0),
            Point3d::new(0.0, 3.0, 0.0),
            Point3d::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
    let before = kernel.object_count();
    let _solid = extrude_along(&mut kernel, &curve, Point3d::ORIGIN, Vec3::new(0.0, 0.0, 4.0)).unwrap();
    assert_eq!(kernel.object_count(), before + 1);
}

#[test]
fn test_add_box_volume_and_corners() {
    let mut kernel = MockKernel::with_sample_step(0.25);
    let solid = add_box(
        &mut kernel,
        Point3d::new(6.25, 4.0, 75.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, -8.0, 0.0),
        Vec3::new(0.0, 0.0, 5.0),
    )
    .unwrap();

    assert_relative_eq!(kernel.volume(&solid).unwrap(), 40.0, max_relative = 0.05);
    let bounds = kernel.bounding_box(&solid).unwrap();
    assert_relative_eq!(bounds.min.x, 5.25, epsilon = 1e-9);
    assert_relative_eq!(bounds.min.y, -4.0, epsilon = 1e-9);
    assert_relative_eq!(bounds.max.z, 80.0, epsilon = 1e-9);
    assert_eq!(kernel.object_count(), 1);
    assert!(kernel
        .journal()
        .contains(&MockOp::SurfaceFromPoints { corners: 4 }));
}

#[test]
fn test_add_box_left_handed_edges_give_outward_solid() {
    let mut kernel = TruckKernel::new();
    let edges = (Vec3::X, Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 0.0, -2.0));
    let left = add_box(&mut kernel, Point3d::ORIGIN, edges.0, edges.1, edges.2).unwrap();
    let right = add_box(&mut kernel, Point3d::ORIGIN, edges.0, edges.1, -edges.2).unwrap();

    assert_relative_eq!(kernel.signed_volume(&left).unwrap(), 6.0, max_relative = 1e-6);
    assert_relative_eq!(kernel.signed_volume(&right).unwrap(), 6.0, max_relative = 1e-6);
    assert_relative_eq!(kernel.bounding_box(&left).unwrap().min.z, -2.0, epsilon = 1e-9);
    assert_eq!(kernel.object_count(), 2);
}

// ── Symmetry ───────────────────────────────────────────────────────────────

#[test]
fn test_quad_rotate_object_successive_quarter_turns() {
    let mut kernel = MockKernel::new();
    let solid = make_l_prism(&mut kernel);
    let set = quad_rotate_object(&mut kernel, solid, Point3d::ORIGIN, Vec3::Z).unwrap();
    assert_eq!(set.len(), 4);

    for i in 0..4 {
        let turned = kernel.rotate_copy(&set[i], Point3d::ORIGIN, 90.0, Vec3::Z).unwrap();
        let next = &set[(i + 1) % 4];
        // Probe in the frame of the next replica.
        let k = ((i + 1) % 4) as f64;
        assert_congruent(&kernel, &turned, next, |p| {
            p.rotated_about(Point3d::ORIGIN, 90.0 * k, Vec3::Z)
        });
        kernel.delete_solid(turned);
    }
    assert_eq!(kernel.object_count(), 4);
}

#[test]
fn test_quad_rotate_object_replicas_are_disjoint() {
    let mut kernel = MockKernel::new();
    let solid = make_l_prism(&mut kernel);
    let set = quad_rotate_object(&mut kernel, solid, Point3d::ORIGIN, Vec3::Z).unwrap();

    let p = Point3d::new(3.3, 1.4, 0.3);
    let hits: Vec<bool> = set
        .iter()
        .map(|s| kernel.contains(s, p).unwrap())
        .collect();
    assert_eq!(hits, vec![true, false, false, false]);
}

#[test]
fn test_quad_mirror_object_matches_reflections() {
    let mut kernel = MockKernel::new();
    let solid = make_l_prism(&mut kernel);
    let set = quad_mirror_object(&mut kernel, solid).unwrap();
    assert_eq!(set.len(), 4);

    let maps: [fn(Point3d) -> Point3d; 4] = [
        |p| p,
        |p| Point3d::new(-p.x, p.y, p.z),
        |p| Point3d::new(p.x, -p.y, p.z),
        |p| Point3d::new(-p.x, -p.y, p.z),
    ];
    for (solid, map) in set.iter().zip(maps) {
        for p in probes() {
            assert_eq!(
                kernel.contains(solid, map(p)).unwrap(),
                kernel.contains(&set[0], p).unwrap(),
                "replica disagrees at {:?}",
                map(p)
            );
        }
    }
}

#[test]
fn test_mirror_pair_across_diagonal() {
    let mut kernel = MockKernel::new();
    let solid = make_l_prism(&mut kernel);
    let pair = mirror_pair(&mut kernel, solid, Point3d::ORIGIN, Vec3::new(1.0, -1.0, 0.0)).unwrap();

    for p in probes() {
        let swapped = Point3d::new(p.y, p.x, p.z);
        assert_eq!(
            kernel.contains(&pair[1], swapped).unwrap(),
            kernel.contains(&pair[0], p).unwrap()
        );
    }
}

proptest! {
    #[test]
    fn quad_rotate_point_exact_order(
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        z in -100.0f64..100.0,
    ) {
        let pts = quad_rotate_point(Point3d::new(x, y, z), Point3d::ORIGIN, Vec3::Z);
        let expected = [(x, y), (-y, x), (-x, -y), (y, -x)];
        for (p, (ex, ey)) in pts.iter().zip(expected) {
            prop_assert!((p.x - ex).abs() < 1e-9);
            prop_assert!((p.y - ey).abs() < 1e-9);
            prop_assert!((p.z - z).abs() < 1e-9);
        }
    }

    #[test]
    fn quad_rotate_point_cycles_back(
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        cx in -10.0f64..10.0,
        cy in -10.0f64..10.0,
    ) {
        let center = Point3d::new(cx, cy, 0.0);
        let pts = quad_rotate_point(Point3d::new(x, y, 1.0), center, Vec3::Z);
        for i in 0..4 {
            let turned = pts[i].rotated_about(center, 90.0, Vec3::Z);
            prop_assert!(turned.distance_to(&pts[(i + 1) % 4]) < 1e-9);
        }
    }
}
