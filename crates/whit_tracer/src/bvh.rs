//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over the world's surfaces. The tree stores surface indices
//! only; every query takes the surface slice it was built from.

use crate::intersection::SurfaceId;
use crate::surface::{Surface, SurfaceHit};
use whit_math::{Aabb, Interval, Ray, Vec3};

/// Maximum primitives per leaf node before splitting.
pub const LEAF_MAX_SIZE: usize = 4;

/// Subtrees at least this large are built on the rayon pool.
const PARALLEL_BUILD_THRESHOLD: usize = 4096;

/// BVH node - either a branch with two children or a leaf with surfaces.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of surfaces.
    Leaf { surfaces: Vec<SurfaceId>, bbox: Aabb },
    /// Tree over an empty surface list.
    Empty,
}

impl BvhNode {
    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

/// Shape of a built tree, logged when a world is finalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
    pub surfaces: usize,
}

/// Per-surface data cached while building.
#[derive(Debug, Clone, Copy)]
struct BuildItem {
    id: SurfaceId,
    bbox: Aabb,
    centroid: Vec3,
}

/// Static BVH over a surface list.
#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
}

impl Bvh {
    /// Build a BVH over every surface in `surfaces`.
    ///
    /// Construction is deterministic: equal centroids are ordered by index.
    pub fn build(surfaces: &[Box<dyn Surface>]) -> Self {
        let items: Vec<BuildItem> = surfaces
            .iter()
            .enumerate()
            .map(|(id, surface)| BuildItem {
                id,
                bbox: surface.bounding_box(),
                centroid: surface.centroid(),
            })
            .collect();

        let root = if items.is_empty() {
            BvhNode::Empty
        } else {
            build_node(items)
        };
        Self { root }
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }

    /// Nearest hit with t inside `ray_t`, as (surface, hit).
    pub fn closest_hit(
        &self,
        surfaces: &[Box<dyn Surface>],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<(SurfaceId, SurfaceHit)> {
        self.root.bounding_box().hit_distance(ray, ray_t)?;

        let mut best = None;
        closest_rec(&self.root, surfaces, ray, ray_t, &mut best);
        best
    }

    /// True if anything is hit with 0 < t < `max_distance`.
    ///
    /// Stops at the first hit found, which is not necessarily the nearest.
    pub fn any_hit(&self, surfaces: &[Box<dyn Surface>], ray: &Ray, max_distance: f32) -> bool {
        let ray_t = Interval::forward(max_distance);
        self.root.bounding_box().hit(ray, ray_t) && any_rec(&self.root, surfaces, ray, ray_t)
    }

    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats::default();
        if !matches!(self.root, BvhNode::Empty) {
            collect_stats(&self.root, 1, &mut stats);
        }
        stats
    }
}

/// Recursive BVH construction.
///
/// Median split: sort items by centroid on the longest axis of the centroid
/// bounds and cut the list in half. Splitting by count always leaves both
/// halves non-empty, even when every centroid coincides.
fn build_node(mut items: Vec<BuildItem>) -> BvhNode {
    let n = items.len();

    let bounds = items
        .iter()
        .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bbox));

    if n <= LEAF_MAX_SIZE {
        return BvhNode::Leaf {
            surfaces: items.iter().map(|item| item.id).collect(),
            bbox: bounds,
        };
    }

    let centroid_bounds = items.iter().fold(Aabb::EMPTY, |acc, item| {
        Aabb::surrounding(&acc, &Aabb::from_points(item.centroid, item.centroid))
    });
    let axis = centroid_bounds.longest_axis();

    items.sort_unstable_by(|a, b| {
        a.centroid[axis]
            .total_cmp(&b.centroid[axis])
            .then(a.id.cmp(&b.id))
    });

    let right_items = items.split_off(n / 2);
    let left_items = items;

    let (left, right) = if n >= PARALLEL_BUILD_THRESHOLD {
        rayon::join(|| build_node(left_items), || build_node(right_items))
    } else {
        (build_node(left_items), build_node(right_items))
    };

    BvhNode::Branch {
        left: Box::new(left),
        right: Box::new(right),
        bbox: bounds,
    }
}

/// Depth-first closest-hit search. `best` tightens the interval as hits are found.
fn closest_rec(
    node: &BvhNode,
    surfaces: &[Box<dyn Surface>],
    ray: &Ray,
    ray_t: Interval,
    best: &mut Option<(SurfaceId, SurfaceHit)>,
) {
    match node {
        BvhNode::Empty => {}

        BvhNode::Leaf { surfaces: ids, .. } => {
            for &id in ids {
                if let Some(hit) = surfaces[id].intersect(ray, ray_t.with_max(best_t(best, ray_t.max))) {
                    *best = Some((id, hit));
                }
            }
        }

        BvhNode::Branch { left, right, .. } => {
            let current = ray_t.with_max(best_t(best, ray_t.max));
            let left_t = left.bounding_box().hit_distance(ray, current);
            let right_t = right.bounding_box().hit_distance(ray, current);

            // Visit near-to-far so the far child can be pruned
            let (near, near_t, far, far_t) = match (left_t, right_t) {
                (Some(l), Some(r)) if r < l => (right, right_t, left, left_t),
                _ => (left, left_t, right, right_t),
            };

            if near_t.is_some() {
                closest_rec(near, surfaces, ray, ray_t, best);
            }
            if let Some(entry) = far_t {
                if entry < best_t(best, ray_t.max) {
                    closest_rec(far, surfaces, ray, ray_t, best);
                }
            }
        }
    }
}

#[inline]
fn best_t(best: &Option<(SurfaceId, SurfaceHit)>, fallback: f32) -> f32 {
    best.map_or(fallback, |(_, hit)| hit.t)
}

fn any_rec(node: &BvhNode, surfaces: &[Box<dyn Surface>], ray: &Ray, ray_t: Interval) -> bool {
    match node {
        BvhNode::Empty => false,

        BvhNode::Leaf { surfaces: ids, .. } => ids
            .iter()
            .any(|&id| surfaces[id].intersect(ray, ray_t).is_some()),

        BvhNode::Branch { left, right, .. } => [left, right]
            .into_iter()
            .any(|child| child.bounding_box().hit(ray, ray_t) && any_rec(child, surfaces, ray, ray_t)),
    }
}

fn collect_stats(node: &BvhNode, depth: usize, stats: &mut BvhStats) {
    stats.nodes += 1;
    stats.max_depth = stats.max_depth.max(depth);
    match node {
        BvhNode::Empty => {}
        BvhNode::Leaf { surfaces, .. } => {
            stats.leaves += 1;
            stats.surfaces += surfaces.len();
        }
        BvhNode::Branch { left, right, .. } => {
            collect_stats(left, depth + 1, stats);
            collect_stats(right, depth + 1, stats);
        }
    }
}
