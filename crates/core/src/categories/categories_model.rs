//! Domain models for the category hierarchy.

use serde::{Deserialize, Serialize};

/// One row of the flat parent relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryEdge {
    pub category_id: i64,
    pub parent_category_id: Option<i64>,
}

impl CategoryEdge {
    pub fn new(category_id: i64, parent_category_id: Option<i64>) -> Self {
        Self {
            category_id,
            parent_category_id,
        }
    }

    pub fn root(category_id: i64) -> Self {
        Self::new(category_id, None)
    }
}

/// Ancestor chain of a category: `path[0]` is the category itself and each
/// following element is the parent of the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPath {
    pub category_id: i64,
    pub path: Vec<i64>,
}

impl CategoryPath {
    pub fn new(category_id: i64) -> Self {
        Self {
            category_id,
            path: vec![category_id],
        }
    }

    /// Last node reached by the walk.
    pub fn terminal(&self) -> i64 {
        self.path.last().copied().unwrap_or(self.category_id)
    }
}
