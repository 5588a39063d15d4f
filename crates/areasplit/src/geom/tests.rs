use super::*;
use crate::error::GeometryError;
use geo::{coord, polygon, Area, MultiPolygon, Polygon, Validation};

fn square(x0: f64, y0: f64, side: f64) -> Polygon<f64> {
    polygon![
        (x: x0, y: y0),
        (x: x0 + side, y: y0),
        (x: x0 + side, y: y0 + side),
        (x: x0, y: y0 + side),
        (x: x0, y: y0),
    ]
}

#[test]
fn split_axis_prefers_longer_side_and_ties_to_x() {
    let wide = Bounds {
        min: coord! { x: 0.0, y: 0.0 },
        max: coord! { x: 4.0, y: 1.0 },
    };
    assert_eq!(wide.split_axis(), Axis::X);
    let tall = Bounds {
        min: coord! { x: 0.0, y: 0.0 },
        max: coord! { x: 1.0, y: 3.0 },
    };
    assert_eq!(tall.split_axis(), Axis::Y);
    let sq = Bounds {
        min: coord! { x: -1.0, y: -1.0 },
        max: coord! { x: 1.0, y: 1.0 },
    };
    assert_eq!(sq.split_axis(), Axis::X);
}

#[test]
fn halves_partition_the_box() {
    let b = Bounds {
        min: coord! { x: 0.0, y: 0.0 },
        max: coord! { x: 1.0, y: 3.0 },
    };
    let (lo, hi) = b.halves();
    assert!((lo.unsigned_area() - 1.5).abs() < 1e-12);
    assert!((hi.unsigned_area() - 1.5).abs() < 1e-12);
    let lo_b = Bounds::of_polygon(&lo).unwrap();
    let hi_b = Bounds::of_polygon(&hi).unwrap();
    assert!((lo_b.max.y - 1.5).abs() < 1e-12);
    assert!((hi_b.min.y - 1.5).abs() < 1e-12);
}

#[test]
fn degenerate_bounds_detected() {
    let line = Bounds {
        min: coord! { x: 0.0, y: 2.0 },
        max: coord! { x: 5.0, y: 2.0 },
    };
    assert!(line.is_degenerate());
    let nan = Bounds {
        min: coord! { x: f64::NAN, y: 0.0 },
        max: coord! { x: 1.0, y: 1.0 },
    };
    assert!(nan.is_degenerate());
    assert!(!Bounds::of_polygon(&square(0.0, 0.0, 1.0))
        .unwrap()
        .is_degenerate());
}

#[test]
fn bounds_overlap_is_closed() {
    let a = Bounds::of_polygon(&square(0.0, 0.0, 1.0)).unwrap();
    let touching = Bounds::of_polygon(&square(1.0, 0.0, 1.0)).unwrap();
    let apart = Bounds::of_polygon(&square(1.5, 0.0, 1.0)).unwrap();
    assert!(a.overlaps(&touching));
    assert!(!a.overlaps(&apart));
}

#[test]
fn shape_classifies_part_counts() {
    assert!(Shape::from_multi(MultiPolygon::new(Vec::new())).is_none());
    let one = Shape::from_multi(MultiPolygon::new(vec![square(0.0, 0.0, 1.0)])).unwrap();
    assert!(matches!(one, Shape::Single(_)));
    let two = Shape::from_multi(MultiPolygon::new(vec![
        square(0.0, 0.0, 1.0),
        square(3.0, 0.0, 2.0),
    ]))
    .unwrap();
    assert_eq!(two.part_count(), 2);
    assert!((two.area() - 5.0).abs() < 1e-12);
    let b = two.bounds().unwrap();
    assert_eq!(b.max, coord! { x: 5.0, y: 2.0 });
    let flat = two.into_polygons();
    assert_eq!(flat.len(), 2);
    assert!((flat[1].unsigned_area() - 4.0).abs() < 1e-12);
}

#[test]
fn compactness_of_square_and_sliver() {
    let sq = square(0.0, 0.0, 10.0);
    assert!((compactness(&sq) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    let sliver = polygon![
        (x: 0.0, y: 0.0),
        (x: 100.0, y: 0.0),
        (x: 100.0, y: 0.01),
        (x: 0.0, y: 0.01),
        (x: 0.0, y: 0.0),
    ];
    assert!(compactness(&sliver) < 1e-3);
    assert_eq!(compactness_of(0.0, 0.0), 0.0);
}

#[test]
fn perimeter_counts_holes() {
    let outer = square(0.0, 0.0, 10.0);
    let hole = square(2.0, 2.0, 2.0);
    let p = Polygon::new(outer.exterior().clone(), vec![hole.exterior().clone()]);
    assert!((perimeter(&p) - 48.0).abs() < 1e-12);
}

#[test]
fn representative_point_lies_inside() {
    use geo::Contains;
    let l = polygon![
        (x: 0.0, y: 0.0),
        (x: 2.0, y: 0.0),
        (x: 2.0, y: 1.0),
        (x: 1.0, y: 1.0),
        (x: 1.0, y: 2.0),
        (x: 0.0, y: 2.0),
        (x: 0.0, y: 0.0),
    ];
    let pt = Shape::Single(l.clone()).representative_point().unwrap();
    assert!(l.contains(&geo::Point::from(pt)));
}

#[test]
fn kernel_intersection_and_union() {
    let a = square(0.0, 0.0, 2.0);
    let b = square(1.0, 1.0, 2.0);
    let i = intersection(&a, &b).unwrap();
    assert!((i.unsigned_area() - 1.0).abs() < 1e-9);
    let far = square(10.0, 10.0, 1.0);
    assert!(intersection(&a, &far).unwrap().0.is_empty());

    let u = union_all([&a, &b, &far]).unwrap();
    assert_eq!(u.0.len(), 2);
    assert!((u.unsigned_area() - 8.0).abs() < 1e-9);
}

#[test]
fn union_of_adjacent_squares_is_one_part() {
    let u = union(
        &MultiPolygon::new(vec![square(0.0, 0.0, 1.0)]),
        &MultiPolygon::new(vec![square(1.0, 0.0, 1.0)]),
    )
    .unwrap();
    assert_eq!(u.0.len(), 1);
    assert!((u.unsigned_area() - 2.0).abs() < 1e-9);
}

#[test]
fn repair_passes_valid_and_rejects_short_rings() {
    let sq = square(0.0, 0.0, 1.0);
    let (same, changed) = repair(&sq).unwrap();
    assert!(!changed);
    assert_eq!(same.0, vec![sq]);

    let stub = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 0.0)];
    assert!(matches!(
        repair(&stub),
        Err(GeometryError::InvalidInputGeometry { .. })
    ));
}

#[test]
fn repair_bowtie_keeps_area_or_reports() {
    let bowtie = polygon![
        (x: 0.0, y: 0.0),
        (x: 2.0, y: 2.0),
        (x: 2.0, y: 0.0),
        (x: 0.0, y: 2.0),
        (x: 0.0, y: 0.0),
    ];
    assert!(!bowtie.is_valid());
    match repair(&bowtie) {
        Ok((mp, changed)) => {
            assert!(changed);
            assert!(mp.is_valid());
            assert!((mp.unsigned_area() - 2.0).abs() < 1e-9);
        }
        Err(GeometryError::InvalidInputGeometry { reason }) => assert!(!reason.is_empty()),
    }
}
