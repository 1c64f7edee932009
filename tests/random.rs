use geonear::{GeoIndex, Metric, Neighbor, Point};
use ordered_float::OrderedFloat;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn planar(a: &Point, b: &Point) -> f64 {
    ((a.lat - b.lat).powi(2) + (a.lon - b.lon).powi(2)).sqrt()
}

fn random_points(rng: &mut StdRng, n: usize) -> Vec<Point> {
    (0..n)
        .map(|_| {
            Point::new(
                rng.gen_range(-90.0..=90.0),
                rng.gen_range(-180.0..180.0),
            )
        })
        .collect()
}

fn brute_knn<M: Metric>(points: &[Point], metric: &M, query: &Point, k: usize) -> Vec<Neighbor> {
    let mut all: Vec<Neighbor> = points
        .iter()
        .enumerate()
        .map(|(index, p)| Neighbor {
            index,
            distance: metric.distance(query, p),
        })
        .collect();
    all.sort_by_key(|n| (OrderedFloat(n.distance), n.index));
    all.truncate(k.min(points.len()));
    all
}

fn brute_radius<M: Metric>(points: &[Point], metric: &M, query: &Point, radius: f64) -> Vec<Neighbor> {
    let mut all: Vec<Neighbor> = points
        .iter()
        .enumerate()
        .map(|(index, p)| Neighbor {
            index,
            distance: metric.distance(query, p),
        })
        .filter(|n| n.distance <= radius)
        .collect();
    all.sort_by_key(|n| (OrderedFloat(n.distance), n.index));
    all
}

#[test]
fn test_random_planar() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..30 {
        let n = rng.gen_range(0..=300);
        let points = random_points(&mut rng, n);
        let index = GeoIndex::build_with_metric(points.clone(), planar).unwrap();

        for _ in 0..20 {
            let query = Point::new(
                rng.gen_range(-90.0..=90.0),
                rng.gen_range(-180.0..180.0),
            );

            let k = rng.gen_range(1..=n + 5);
            let actual = index.k_nearest(&query, k).unwrap();
            let expected = brute_knn(&points, &planar, &query, k);
            assert_eq!(actual, expected);

            let radius = rng.gen_range(0.0..200.0);
            let actual = index.within_radius(&query, radius).unwrap();
            let expected = brute_radius(&points, &planar, &query, radius);
            assert_eq!(actual, expected);
        }
    }
}

#[test]
fn test_random_geodesic() {
    let mut rng = StdRng::seed_from_u64(42);
    let points = random_points(&mut rng, 500);
    let index = GeoIndex::build(points.clone()).unwrap();

    for _ in 0..25 {
        let query = Point::new(
            rng.gen_range(-90.0..=90.0),
            rng.gen_range(-180.0..180.0),
        );

        let k = rng.gen_range(1..=25);
        let actual = index.k_nearest(&query, k).unwrap();
        let expected = brute_knn(&points, index.metric(), &query, k);
        assert_eq!(actual, expected);

        let radius = rng.gen_range(0.0..5_000_000.0);
        let actual = index.within_radius(&query, radius).unwrap();
        let expected = brute_radius(&points, index.metric(), &query, radius);
        assert_eq!(actual, expected);
    }
}

#[test]
fn infinite_radius_returns_all_points() {
    let mut rng = StdRng::seed_from_u64(23);
    let points = random_points(&mut rng, 120);
    let index = GeoIndex::build_with_metric(points.clone(), planar).unwrap();
    let query = Point::new(12.0, -34.0);

    // An unbounded radius degrades to a full scan, never to an error.
    let result = index.within_radius(&query, f64::INFINITY).unwrap();
    assert_eq!(result.len(), points.len());
    assert_eq!(result, brute_radius(&points, &planar, &query, f64::INFINITY));
}

#[test]
fn growing_k_keeps_a_stable_prefix() {
    let mut rng = StdRng::seed_from_u64(3);
    let points = random_points(&mut rng, 200);
    let index = GeoIndex::build_with_metric(points, planar).unwrap();
    let query = Point::new(10.0, 10.0);

    let mut previous = index.k_nearest(&query, 1).unwrap();
    for k in 2..=60 {
        let current = index.k_nearest(&query, k).unwrap();
        assert_eq!(&current[..previous.len()], &previous[..]);
        previous = current;
    }
}

#[test]
fn repeated_queries_are_identical() {
    let mut rng = StdRng::seed_from_u64(11);
    let points = random_points(&mut rng, 150);
    let index = GeoIndex::build(points).unwrap();
    let query = Point::new(45.0, 45.0);

    let first = index.k_nearest(&query, 10).unwrap();
    let second = index.k_nearest(&query, 10).unwrap();
    assert_eq!(first, second);

    let first = index.within_radius(&query, 2_000_000.0).unwrap();
    let second = index.within_radius(&query, 2_000_000.0).unwrap();
    assert_eq!(first, second);
}

#[test]
fn batch_matches_single_queries_in_order() {
    let mut rng = StdRng::seed_from_u64(19);
    let points = random_points(&mut rng, 250);
    let index = GeoIndex::build(points).unwrap();
    let queries = random_points(&mut rng, 40);

    let batched = index.batch_k_nearest(&queries, 5).unwrap();
    assert_eq!(batched.len(), queries.len());
    for (query, result) in queries.iter().zip(&batched) {
        assert_eq!(result, &index.k_nearest(query, 5).unwrap());
    }

    let batched = index.batch_within_radius(&queries, 1_500_000.0).unwrap();
    for (query, result) in queries.iter().zip(&batched) {
        assert_eq!(result, &index.within_radius(query, 1_500_000.0).unwrap());
    }
}

#[test]
fn duplicated_points_tie_break_on_index() {
    let mut points = vec![Point::new(10.0, 10.0); 20];
    points.push(Point::new(11.0, 10.0));
    let index = GeoIndex::build_with_metric(points, planar).unwrap();

    let nearest = index.k_nearest(&Point::new(10.0, 10.0), 5).unwrap();
    let indices: Vec<usize> = nearest.iter().map(|n| n.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    assert!(nearest.iter().all(|n| n.distance == 0.0));
}
