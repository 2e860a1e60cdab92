//! Tree-structured annotations keyed to a container axis.
//!
//! This module provides:
//! - [`TreeGraph`], a directed forest with insertion-ordered nodes and edges
//!   and per-node/per-edge attribute dictionaries,
//! - [`Value`], the primitive attribute value type.
//!
//! Most users will build a `TreeGraph` from edges and hand it to a container;
//! reads and attribute edits then go through a
//! [`GraphHandle`](crate::container::GraphHandle).

pub mod tree;
pub mod value;

pub use tree::TreeGraph;
pub use value::{AttrMap, Value};
