//! Process dependency graph
//!
//! Builds a directed graph from a [`Declaration`](crate::declaration::Declaration)
//! and proves it acyclic before any unit files are touched.

mod cycle;
mod deps;

pub use cycle::{detect, Witness};
pub use deps::{DepGraph, Node, NodeId};
