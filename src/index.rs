use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::{
    distance::{GeodesicDistance, Metric},
    error::Error,
    node::{Node, NO_NODE},
    point::{Ellipsoid, Point},
};

// Slices at most this long become leaf buckets and are scanned linearly.
const LEAF_SIZE: usize = 8;

/// One query result: a dataset position and its exact distance to the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// An exact nearest-neighbor index over a fixed set of geographic points.
///
/// Built once, immutable afterwards; queries are read-only and may run
/// concurrently. The structure is a vantage-point tree and relies only on
/// the metric's triangle inequality, never on a planar embedding.
pub struct GeoIndex<M = GeodesicDistance> {
    metric: M,
    points: Vec<Point>,
    nodes: Vec<Node>,
    root: usize,
}

impl GeoIndex<GeodesicDistance> {
    /// Build an index using WGS84 geodesic distance (meters).
    pub fn build(points: Vec<Point>) -> Result<Self, Error> {
        Self::build_on(points, Ellipsoid::WGS84)
    }

    /// Build an index using geodesic distance on the given ellipsoid.
    pub fn build_on(points: Vec<Point>, ellipsoid: Ellipsoid) -> Result<Self, Error> {
        Self::build_with_metric(points, GeodesicDistance::new(ellipsoid))
    }
}

impl<M: Metric> GeoIndex<M> {
    /// Build an index over `points` with a caller-supplied metric.
    ///
    /// Validation is eager: a NaN coordinate at position `i` fails with
    /// [`Error::MissingDatasetPoint`], an out-of-domain coordinate with
    /// [`Error::InvalidDatasetPoint`]. An empty dataset is valid; every
    /// query on it returns an empty result.
    pub fn build_with_metric(points: Vec<Point>, metric: M) -> Result<Self, Error> {
        for (index, point) in points.iter().enumerate() {
            if point.is_missing() {
                return Err(Error::MissingDatasetPoint { index });
            }
            if !point.in_domain() {
                return Err(Error::InvalidDatasetPoint {
                    index,
                    lat: point.lat,
                    lon: point.lon,
                });
            }
        }

        let mut index = GeoIndex {
            metric,
            points,
            nodes: Vec::new(),
            root: NO_NODE,
        };
        if !index.points.is_empty() {
            let mut ids: Vec<usize> = (0..index.points.len()).collect();
            index.root = index.build_subtree(&mut ids, None);
        }
        Ok(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The indexed points, in dataset order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// The `min(k, n)` nearest dataset points to `query`, ascending by
    /// distance; equal distances are ordered by ascending dataset index.
    ///
    /// A missing (NaN) query yields `Ok` with an empty result. `k == 0`
    /// and out-of-domain queries fail before any traversal.
    pub fn k_nearest(&self, query: &Point, k: usize) -> Result<Vec<Neighbor>, Error> {
        if k == 0 {
            return Err(Error::ZeroK);
        }
        if query.is_missing() {
            return Ok(Vec::new());
        }
        if !query.in_domain() {
            return Err(Error::InvalidQuery {
                lat: query.lat,
                lon: query.lon,
            });
        }
        Ok(self.k_nearest_unchecked(query, k))
    }

    /// All dataset points within `radius` of `query`, ascending by distance;
    /// equal distances are ordered by ascending dataset index.
    ///
    /// A missing (NaN) query yields `Ok` with an empty result. A negative or
    /// NaN radius and out-of-domain queries fail before any traversal.
    pub fn within_radius(&self, query: &Point, radius: f64) -> Result<Vec<Neighbor>, Error> {
        if radius.is_nan() || radius < 0.0 {
            return Err(Error::InvalidRadius(radius));
        }
        if query.is_missing() {
            return Ok(Vec::new());
        }
        if !query.in_domain() {
            return Err(Error::InvalidQuery {
                lat: query.lat,
                lon: query.lon,
            });
        }
        Ok(self.within_radius_unchecked(query, radius))
    }

    /// [`Self::k_nearest`] over many independent queries, results in input
    /// order. A missing or malformed query at slot `i` yields an empty
    /// result at slot `i` without aborting the batch; an invalid `k` fails
    /// the whole batch eagerly.
    pub fn batch_k_nearest(&self, queries: &[Point], k: usize) -> Result<Vec<Vec<Neighbor>>, Error>
    where
        M: Sync,
    {
        if k == 0 {
            return Err(Error::ZeroK);
        }
        Ok(queries
            .par_iter()
            .map(|query| {
                if query.is_missing() || !query.in_domain() {
                    Vec::new()
                } else {
                    self.k_nearest_unchecked(query, k)
                }
            })
            .collect())
    }

    /// [`Self::within_radius`] over many independent queries, results in
    /// input order, with the same per-slot isolation as
    /// [`Self::batch_k_nearest`].
    pub fn batch_within_radius(
        &self,
        queries: &[Point],
        radius: f64,
    ) -> Result<Vec<Vec<Neighbor>>, Error>
    where
        M: Sync,
    {
        if radius.is_nan() || radius < 0.0 {
            return Err(Error::InvalidRadius(radius));
        }
        Ok(queries
            .par_iter()
            .map(|query| {
                if query.is_missing() || !query.in_domain() {
                    Vec::new()
                } else {
                    self.within_radius_unchecked(query, radius)
                }
            })
            .collect())
    }

    fn k_nearest_unchecked(&self, query: &Point, k: usize) -> Vec<Neighbor> {
        if self.points.is_empty() {
            return Vec::new();
        }
        let k = k.min(self.points.len());
        let mut neighbors = BinaryHeap::with_capacity(k + 1);
        self.knn_recursive(self.root, query, k, &mut neighbors);

        let mut result: Vec<Neighbor> = neighbors
            .into_iter()
            .map(|(distance, index)| Neighbor {
                index,
                distance: distance.into_inner(),
            })
            .collect();
        result.sort_by_key(|n| (OrderedFloat(n.distance), n.index));
        result
    }

    fn knn_recursive(
        &self,
        slot: usize,
        query: &Point,
        k: usize,
        neighbors: &mut BinaryHeap<(OrderedFloat<f64>, usize)>,
    ) {
        match &self.nodes[slot] {
            Node::Leaf(bucket) => {
                for &id in bucket {
                    let distance = self.metric.distance(query, &self.points[id]);
                    Self::offer(neighbors, k, distance, id);
                }
            }
            Node::Branch {
                vantage,
                inner,
                outer,
                inner_band,
                outer_band,
            } => {
                let d = self.metric.distance(query, &self.points[*vantage]);
                Self::offer(neighbors, k, d, *vantage);

                // Descend into the nearer side first so the k-th best
                // distance tightens before the farther side is considered.
                let mut sides = [
                    (*inner, min_distance(d, inner_band)),
                    (*outer, min_distance(d, outer_band)),
                ];
                if sides[1].1 < sides[0].1 {
                    sides.swap(0, 1);
                }
                for (child, bound) in sides {
                    if neighbors.len() == k {
                        let kth = neighbors
                            .peek()
                            .map_or(f64::INFINITY, |worst| worst.0.into_inner());
                        // Strictly greater: a candidate at exactly the k-th
                        // distance may still win its tie on a smaller index.
                        if bound > kth {
                            continue;
                        }
                    }
                    self.knn_recursive(child, query, k, neighbors);
                }
            }
        }
    }

    // Keep the k smallest (distance, index) pairs in a max-heap.
    fn offer(
        neighbors: &mut BinaryHeap<(OrderedFloat<f64>, usize)>,
        k: usize,
        distance: f64,
        id: usize,
    ) {
        let candidate = (OrderedFloat(distance), id);
        if neighbors.len() < k {
            neighbors.push(candidate);
        } else if let Some(worst) = neighbors.peek() {
            if candidate < *worst {
                neighbors.push(candidate);
                neighbors.pop();
            }
        }
    }

    fn within_radius_unchecked(&self, query: &Point, radius: f64) -> Vec<Neighbor> {
        let mut result = Vec::new();
        if self.points.is_empty() {
            return result;
        }
        let mut stack = vec![self.root];
        while let Some(slot) = stack.pop() {
            match &self.nodes[slot] {
                Node::Leaf(bucket) => {
                    for &id in bucket {
                        let distance = self.metric.distance(query, &self.points[id]);
                        if distance <= radius {
                            result.push(Neighbor {
                                index: id,
                                distance,
                            });
                        }
                    }
                }
                Node::Branch {
                    vantage,
                    inner,
                    outer,
                    inner_band,
                    outer_band,
                } => {
                    let d = self.metric.distance(query, &self.points[*vantage]);
                    if d <= radius {
                        result.push(Neighbor {
                            index: *vantage,
                            distance: d,
                        });
                    }
                    if min_distance(d, inner_band) <= radius {
                        stack.push(*inner);
                    }
                    if min_distance(d, outer_band) <= radius {
                        stack.push(*outer);
                    }
                }
            }
        }
        result.sort_by_key(|n| (OrderedFloat(n.distance), n.index));
        result
    }

    // Recursively partition `ids` into a subtree and return its slot.
    fn build_subtree(&mut self, ids: &mut [usize], parent_vantage: Option<usize>) -> usize {
        if ids.len() <= LEAF_SIZE {
            return self.add_node(Node::Leaf(ids.to_vec()));
        }

        // The point farthest from the parent's vantage spreads the partition;
        // the root has no parent, so its first point serves. Selection is
        // deterministic, which keeps rebuilds of the same dataset identical.
        if let Some(parent) = parent_vantage {
            let farthest = ids
                .iter()
                .enumerate()
                .max_by_key(|&(_, &id)| OrderedFloat(self.pair_distance(parent, id)))
                .map_or(0, |(pos, _)| pos);
            ids.swap(0, farthest);
        }
        let vantage = ids[0];
        let rest = &mut ids[1..];

        // Split the remaining points at the median distance to the vantage.
        let mut by_dist: Vec<(OrderedFloat<f64>, usize)> = rest
            .iter()
            .map(|&id| (OrderedFloat(self.pair_distance(vantage, id)), id))
            .collect();
        let mid = by_dist.len() / 2;
        by_dist.select_nth_unstable(mid);

        let inner_band = band(&by_dist[..mid]);
        let outer_band = band(&by_dist[mid..]);
        for (pos, &(_, id)) in by_dist.iter().enumerate() {
            rest[pos] = id;
        }

        let (inner_ids, outer_ids) = rest.split_at_mut(mid);
        let inner = self.build_subtree(inner_ids, Some(vantage));
        let outer = self.build_subtree(outer_ids, Some(vantage));

        self.add_node(Node::Branch {
            vantage,
            inner,
            outer,
            inner_band,
            outer_band,
        })
    }

    fn pair_distance(&self, a: usize, b: usize) -> f64 {
        self.metric.distance(&self.points[a], &self.points[b])
    }

    fn add_node(&mut self, node: Node) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(node);
        slot
    }
}

// Lower bound, by the triangle inequality, on the distance from the query to
// any point whose distance to the vantage lies within `band`. `d` is the
// query-to-vantage distance.
fn min_distance(d: f64, band: &[f64; 2]) -> f64 {
    (d - band[1]).max(band[0] - d).max(0.0)
}

fn band(entries: &[(OrderedFloat<f64>, usize)]) -> [f64; 2] {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (d, _) in entries {
        lo = lo.min(d.into_inner());
        hi = hi.max(d.into_inner());
    }
    [lo, hi]
}
