//! Dependency graph construction
//!
//! Nodes live in an arena and edges are arena indices, so cycles in the
//! input are representable without shared ownership.

use std::collections::HashMap;
use std::fmt;

use crate::declaration::{Declaration, Process};

/// Index of a node in the graph arena
pub type NodeId = usize;

/// A process in the graph
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Nodes this one requires, in declaration order
    pub requires: Vec<NodeId>,
    /// False for base dependencies (docker, network, ...) that are only
    /// referenced and never declared themselves
    pub declared: bool,
}

/// Directed graph: process -> processes it depends on
#[derive(Debug, Default)]
pub struct DepGraph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every declared process
    pub fn build(declaration: &Declaration) -> Self {
        let mut graph = Self::new();
        for process in &declaration.processes {
            graph.add_process(process);
        }
        log::debug!(
            "Built dependency graph: {} nodes, {} edges",
            graph.len(),
            graph.edge_count()
        );
        graph
    }

    /// Add a process and link it to its dependencies
    ///
    /// A process added twice keeps one node and accumulates both edge lists.
    pub fn add_process(&mut self, process: &Process) {
        let id = self.get_or_insert(&process.name);
        self.nodes[id].declared = true;

        for dep in &process.dependencies {
            // Unknown names are base dependencies, materialize them so the edge resolves
            let dep_id = self.get_or_insert(dep);
            self.nodes[id].requires.push(dep_id);
        }
    }

    fn get_or_insert(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            requires: Vec::new(),
            declared: false,
        });
        self.index.insert(name.to_string(), id);
        id
    }

    /// Look up a node id by name
    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.id(name).map(|id| &self.nodes[id])
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Names of the nodes `name` requires
    pub fn dependencies(&self, name: &str) -> impl Iterator<Item = &str> {
        self.get(name)
            .into_iter()
            .flat_map(|node| node.requires.iter())
            .map(|&id| self.nodes[id].name.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.requires.len()).sum()
    }
}

impl fmt::Display for DepGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            let requires: Vec<&str> = node
                .requires
                .iter()
                .map(|&id| self.nodes[id].name.as_str())
                .collect();
            writeln!(f, "Unit: {}", node.name)?;
            writeln!(f, "    Requires: [{}]", requires.join(" "))?;
        }
        Ok(())
    }
}
