pub mod error;
mod primitives;
mod tree;

pub use error::Error;
pub use primitives::{Point, Rect};
pub use tree::{RTree, RTreeItem};
