use approx::assert_abs_diff_eq;
use nearthree::{BoundingBox, Coordinates, DistanceMetric, FindError, PointSet, WithinOptions};
use rand::Rng;
use std::collections::BTreeSet;

fn axis_points(n: usize) -> PointSet {
    let points: Vec<[f64; 3]> = (0..n).map(|x| [x as f64, 0.0, 0.0]).collect();
    PointSet::from_points(&points).unwrap()
}

fn brute_within(points: &PointSet, query: [f64; 3], limit: f64, metric: DistanceMetric) -> BTreeSet<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| metric.distance(&query, p) <= limit)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn test_find_within_simple() {
    let coords = Coordinates::new(axis_points(6));
    let find = PointSet::single([2.0, 0.0, 0.0]).unwrap();

    let result = coords.find_within(&find, &WithinOptions::new(1.0)).unwrap();
    assert_eq!(result.len(), 1);
    let found: BTreeSet<usize> = result.get(0).unwrap().iter().copied().collect();
    assert_eq!(found, BTreeSet::from([1, 2, 3]));

    // Sorted by distance, ties by index
    assert_eq!(result.get(0).unwrap(), &[2, 1, 3]);
    assert_eq!(result.distances(0).unwrap(), &[0.0, 1.0, 1.0]);
}

#[test]
fn test_find_within_zero_radius_on_member() {
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let points = PointSet::random(100, &bounds, 21).unwrap();
    let coords = Coordinates::new(points.clone());

    for i in [0, 17, 99] {
        let find = PointSet::single(points.point(i).unwrap()).unwrap();
        let result = coords.find_within(&find, &WithinOptions::new(0.0)).unwrap();
        assert!(result.get(0).unwrap().contains(&i));
    }
}

#[test]
fn test_find_within_matches_brute_force() {
    let mut rng = rand::thread_rng();
    let bounds = BoundingBox::new([-3.0; 3], [3.0; 3]);
    for _ in 0..10 {
        let n = rng.gen_range(1..200);
        let points = PointSet::random(n, &bounds, rng.r#gen()).unwrap();
        let coords = Coordinates::new(points.clone());
        let find = PointSet::random(10, &bounds, rng.r#gen()).unwrap();
        let radius = rng.gen_range(0.0..3.0);

        let result = coords.find_within(&find, &WithinOptions::new(radius)).unwrap();
        assert_eq!(result.len(), find.csize());
        for q in 0..find.csize() {
            let found: BTreeSet<usize> = result.get(q).unwrap().iter().copied().collect();
            assert_eq!(found, brute_within(&points, find.point(q).unwrap(), radius, DistanceMetric::Euclidean));
        }
    }
}

#[test]
fn test_find_within_is_monotonic() {
    let bounds = BoundingBox::new([0.0; 3], [10.0; 3]);
    let points = PointSet::random(400, &bounds, 8).unwrap();
    assert!(points.bounds().diagonal() <= bounds.diagonal());
    let coords = Coordinates::new(points);
    let find = PointSet::random(5, &bounds, 9).unwrap();

    let mut previous: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); 5];
    for radius in [0.0, 0.5, 1.0, 2.5, 4.0, bounds.diagonal()] {
        let result = coords.find_within(&find, &WithinOptions::new(radius)).unwrap();
        for (q, found) in result.iter().enumerate() {
            let found: BTreeSet<usize> = found.iter().copied().collect();
            assert!(previous[q].is_subset(&found), "radius {radius} lost points for query {q}");
            previous[q] = found;
        }
    }
    // The largest radius covers the whole box
    assert!(previous.iter().all(|found| found.len() == 400));
}

#[test]
fn test_find_within_sorted_and_unsorted() {
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let points = PointSet::random(300, &bounds, 31).unwrap();
    let coords = Coordinates::new(points);
    let find = PointSet::from_points(&[[0.5, 0.5, 0.5], [0.1, 0.9, 0.2]]).unwrap();

    let sorted = coords.find_within(&find, &WithinOptions::new(0.3)).unwrap();
    let unsorted = coords.find_within(&find, &WithinOptions::new(0.3).return_sorted(false)).unwrap();

    for q in 0..2 {
        let distances = sorted.distances(q).unwrap();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));

        let flat = unsorted.get(q).unwrap();
        assert!(flat.windows(2).all(|w| w[0] < w[1]));

        let a: BTreeSet<usize> = sorted.get(q).unwrap().iter().copied().collect();
        let b: BTreeSet<usize> = flat.iter().copied().collect();
        assert_eq!(a, b);
    }

    // Deterministic for identical inputs
    assert_eq!(unsorted, coords.find_within(&find, &WithinOptions::new(0.3).return_sorted(false)).unwrap());
}

#[test]
fn test_find_within_tolerance() {
    let coords = Coordinates::new(axis_points(6));
    let find = PointSet::single([2.0, 0.0, 0.0]).unwrap();

    let tight = coords.find_within(&find, &WithinOptions::new(0.9)).unwrap();
    assert_eq!(tight.get(0).unwrap(), &[2]);

    let loose = coords.find_within(&find, &WithinOptions::new(0.9).atol(0.1)).unwrap();
    assert_eq!(loose.get(0).unwrap(), &[2, 1, 3]);
}

#[test]
fn test_find_within_empty_result() {
    let coords = Coordinates::new(axis_points(6));
    let find = PointSet::from_points(&[[100.0, 0.0, 0.0], [2.5, 0.0, 0.0]]).unwrap();

    let result = coords.find_within(&find, &WithinOptions::new(0.1)).unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.get(0).unwrap().is_empty());
    assert!(result.get(1).unwrap().is_empty());
    assert_eq!(result.total(), 0);
}

#[test]
fn test_find_within_shaped_query() {
    let points = PointSet::new(
        (0..12).flat_map(|i| [i as f64, 0.0, 0.0]).collect(),
        &[3, 4],
    )
    .unwrap();
    let coords = Coordinates::new(points);
    let find = PointSet::new(vec![0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 11.0, 0.0, 0.0, 50.0, 0.0, 0.0], &[2, 2]).unwrap();

    let result = coords.find_within(&find, &WithinOptions::new(1.0)).unwrap();
    assert_eq!(result.len(), 4);
    assert_eq!(result.query_shape().dims(), &[2, 2]);
    assert_eq!(result.get_multi(&[0, 1]).unwrap(), &[5, 4, 6]);
    // Flat 5 in a (3, 4) point set is (1, 1)
    assert_eq!(result.multi_indices(1).unwrap()[0], vec![1, 1]);
    assert!(result.get_multi(&[1, 1]).unwrap().is_empty());
}

#[test]
fn test_find_within_spherical() {
    let mut rng = rand::thread_rng();
    // Random directions on a sphere of radius 3
    let points: Vec<[f64; 3]> = (0..300)
        .map(|_| {
            let z: f64 = rng.gen_range(-1.0..1.0);
            let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let r = (1.0 - z * z).sqrt();
            [3.0 * r * phi.cos(), 3.0 * r * phi.sin(), 3.0 * z]
        })
        .collect();
    let points = PointSet::from_points(&points).unwrap();
    assert!(points.common_radius(1e-9).is_some());
    let coords = Coordinates::new(points.clone());

    // Unit query direction, off the reference sphere
    let query = [0.0, 0.6, 0.8];
    let find = PointSet::single(query).unwrap();

    for (metric, radius) in [(DistanceMetric::SphericalRadians, 0.5), (DistanceMetric::SphericalMeter, 1.5)] {
        let result = coords.find_within(&find, &WithinOptions::new(radius).metric(metric)).unwrap();
        let found: BTreeSet<usize> = result.get(0).unwrap().iter().copied().collect();
        // Arc length is measured on the reference sphere
        let expected: BTreeSet<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| metric.reference_distance(&query, p) <= radius)
            .map(|(i, _)| i)
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(found, expected, "{metric}");

        for (&i, &d) in result.get(0).unwrap().iter().zip(result.distances(0).unwrap()) {
            assert_abs_diff_eq!(d, metric.reference_distance(&query, &points.point(i).unwrap()), epsilon = 1e-12);
        }
    }
}

#[test]
fn test_find_within_errors() {
    let coords = Coordinates::new(axis_points(6));
    let find = PointSet::single([2.0, 0.0, 0.0]).unwrap();

    let err = coords.find_within(&find, &WithinOptions::new(-1.0)).unwrap_err();
    assert!(matches!(err, FindError::InvalidRadius(_)));
    assert!(err.is_invalid_argument());

    assert!(matches!(coords.find_within(&find, &WithinOptions::new(f64::NAN)), Err(FindError::InvalidRadius(_))));

    let err = coords.find_within(&find, &WithinOptions::new(1.0).atol(-0.5)).unwrap_err();
    assert!(matches!(err, FindError::InvalidTolerance(_)));

    assert!(!coords.index_is_built());

    let empty = Coordinates::new(PointSet::new(Vec::new(), &[0]).unwrap());
    assert_eq!(empty.find_within(&find, &WithinOptions::new(1.0)).unwrap_err(), FindError::EmptyPointSet);
}
