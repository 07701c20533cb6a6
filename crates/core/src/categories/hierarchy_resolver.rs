//! Bounded-depth ancestor walk over the flat category relation.

use log::{debug, warn};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::constants::MAX_HIERARCHY_HOPS;

use super::{CategoryEdge, CategoryPath};

/// Owned adjacency mapping `category_id -> parent_category_id`.
pub type ParentIndex = HashMap<i64, Option<i64>>;

/// Category path lookup consumed by the event enricher.
pub type CategoryPathIndex = HashMap<i64, CategoryPath>;

/// Result of walking one category relation.
#[derive(Debug, Clone, Default)]
pub struct CategoryHierarchy {
    /// One path per distinct category id, sorted by id.
    pub paths: Vec<CategoryPath>,
    /// Category ids that occurred on more than one row.
    pub duplicate_categories: usize,
}

impl CategoryHierarchy {
    pub fn index(&self) -> CategoryPathIndex {
        self.paths
            .iter()
            .map(|path| (path.category_id, path.clone()))
            .collect()
    }
}

/// Computes the ancestor chain of every category, up to a fixed number of hops.
///
/// Only the static parent relation decides whether a path grows, so a cyclic
/// chain keeps re-appending ids until the hop cap is reached. Cycles are not
/// reported.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyPathResolver {
    max_hops: usize,
}

impl Default for HierarchyPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyPathResolver {
    pub fn new() -> Self {
        Self {
            max_hops: MAX_HIERARCHY_HOPS,
        }
    }

    pub fn resolve(&self, edges: &[CategoryEdge]) -> CategoryHierarchy {
        let (parents, duplicate_categories) = build_parent_index(edges);
        if duplicate_categories > 0 {
            warn!(
                "{} categories appear on more than one row; keeping the smallest recorded parent",
                duplicate_categories
            );
        }

        let mut paths: Vec<CategoryPath> = parents.keys().map(|id| CategoryPath::new(*id)).collect();
        paths.par_sort_unstable_by_key(|path| path.category_id);

        // Frontier of paths that can still grow. A path whose terminal node has
        // no recorded parent never grows again, so it leaves the frontier.
        let mut frontier: Vec<usize> = (0..paths.len()).collect();
        for hop in 1..=self.max_hops {
            if frontier.is_empty() {
                debug!("Hierarchy walk settled after {} hops", hop - 1);
                break;
            }
            // Every pass reads only the static relation and the previous pass's
            // terminal nodes.
            let extensions: Vec<(usize, Option<i64>)> = frontier
                .par_iter()
                .map(|&slot| (slot, parent_of(&parents, paths[slot].terminal())))
                .collect();

            frontier.clear();
            for (slot, parent) in extensions {
                if let Some(parent) = parent {
                    paths[slot].path.push(parent);
                    frontier.push(slot);
                }
            }
            debug!("Hierarchy hop {}: {} paths extended", hop, frontier.len());
        }

        CategoryHierarchy {
            paths,
            duplicate_categories,
        }
    }
}

fn parent_of(parents: &ParentIndex, category_id: i64) -> Option<i64> {
    parents.get(&category_id).copied().flatten()
}

/// Builds the adjacency mapping, collapsing duplicate rows deterministically:
/// a recorded parent beats an absent one and the smallest recorded parent wins.
///
/// Returns the mapping and the number of category ids seen more than once.
pub fn build_parent_index(edges: &[CategoryEdge]) -> (ParentIndex, usize) {
    let mut parents = ParentIndex::with_capacity(edges.len());
    let mut duplicates = HashSet::new();
    for edge in edges {
        match parents.get_mut(&edge.category_id) {
            None => {
                parents.insert(edge.category_id, edge.parent_category_id);
            }
            Some(current) => {
                duplicates.insert(edge.category_id);
                *current = match (*current, edge.parent_category_id) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (Some(a), None) | (None, Some(a)) => Some(a),
                    (None, None) => None,
                };
            }
        }
    }
    (parents, duplicates.len())
}
