//! Result trees for clusterq
//!
//! Hierarchical query results mirroring the sub-resource selection, plus
//! their JSON rendering.

mod render;
mod tree;

pub use render::{render_resource, render_row, render_tree};
pub use tree::{ResultRow, ResultTree, IS_COLLECTION};
