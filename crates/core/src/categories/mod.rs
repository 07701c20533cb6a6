//! Categories module - parent relation models and the hierarchy path resolver.

mod categories_model;
mod hierarchy_resolver;

pub use categories_model::{CategoryEdge, CategoryPath};
pub use hierarchy_resolver::{
    build_parent_index, CategoryHierarchy, CategoryPathIndex, HierarchyPathResolver, ParentIndex,
};
