// Slot value for "no node"; only the root of an empty index carries it.
pub(crate) const NO_NODE: usize = usize::MAX;

/// A vantage-point tree node, addressed by its slot in the index's node arena.
///
/// Every dataset point appears exactly once: as the vantage of one branch or
/// inside one leaf bucket.
pub(crate) enum Node {
    /// Bucket of dataset indices, scanned linearly.
    Leaf(Vec<usize>),
    /// A vantage point with the remaining points split at the median distance.
    Branch {
        /// Dataset index of the vantage point.
        vantage: usize,
        /// Slot of the subtree holding points nearer the vantage.
        inner: usize,
        /// Slot of the subtree holding the rest.
        outer: usize,
        /// [min, max] distance from the vantage over the inner points.
        inner_band: [f64; 2],
        /// [min, max] distance from the vantage over the outer points.
        outer_band: [f64; 2],
    },
}
