//! Card co-occurrence graph
//!
//! [`GraphBuilder`] projects an aggregation into a [`CardGraph`];
//! [`Louvain`] and [`ForceLayout`] add optional structure on top of it.

mod builder;
mod community;
mod database;
mod layout;

pub use builder::{GraphBuilder, DEFAULT_EDGE_THRESHOLD};
pub use community::{modularity, CommunityAssignment, Louvain};
pub use database::CardGraph;
pub use layout::{ForceLayout, LayoutBounds, LayoutResult, Position};
