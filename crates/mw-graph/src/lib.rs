//! Knowledge graph over records, tags and sources, with a force-directed
//! layout for the rendering collaborator.

pub mod builder;
pub mod layout;
pub mod model;
pub mod quadtree;
pub mod queries;

pub use builder::{add_similarity_edges, add_similarity_edges_with_text, build_graph, GraphBuilder};
pub use layout::{layout, layout_with, ForceLayout, LayoutParams, StepOutcome};
pub use model::{EdgeKind, Graph, GraphEdge, GraphNode, GraphStats, NodeKind, Point};
pub use quadtree::Quadtree;
pub use queries::{find_bridges, find_orphans};
