// Lazily flattened tree over a provider-supplied object graph.
//
// The visible rows live in a flat vector tagged with depth levels; expand
// and collapse splice that vector in place, so nothing is ever walked or
// stored beyond what is on screen or has been opened.

pub mod model;
pub mod node;
pub mod view;

pub use model::{ExpandHook, ExpandPhase, ObjectTree};
pub use node::{Node, NodeKey};
pub use view::{TreeView, ViewOptions};
