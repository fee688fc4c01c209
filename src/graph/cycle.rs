//! Cycle detection
//!
//! Three-state depth-first search run from every node, so disconnected
//! subgraphs are covered. Iterative, with the same visit order as the
//! recursive formulation.

use std::fmt;

use super::{DepGraph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Back edge proving a cycle: `start` requires `end`, and `end` is
/// still being explored when the edge is seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub start: String,
    pub end: String,
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// Return a witness edge if the graph contains any directed cycle
///
/// The sweep never stops early: when several cycles exist the last back
/// edge found (in node insertion order) is reported.
pub fn detect(graph: &DepGraph) -> Option<Witness> {
    let mut state = vec![VisitState::Unvisited; graph.len()];
    let mut witness = None;

    for root in 0..graph.len() {
        if state[root] == VisitState::Done {
            continue;
        }
        visit(graph, root, &mut state, &mut witness);
    }

    if let Some(ref w) = witness {
        log::debug!("Dependency cycle found: {}", w);
    }
    witness
}

fn visit(
    graph: &DepGraph,
    root: NodeId,
    state: &mut [VisitState],
    witness: &mut Option<Witness>,
) {
    // (node, index of the next edge to follow)
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    state[root] = VisitState::InProgress;

    while let Some(frame) = stack.last_mut() {
        let (id, next) = *frame;
        let requires = &graph.node(id).requires;

        if next == requires.len() {
            state[id] = VisitState::Done;
            stack.pop();
            continue;
        }
        frame.1 += 1;

        let target = requires[next];
        match state[target] {
            VisitState::Unvisited => {
                state[target] = VisitState::InProgress;
                stack.push((target, 0));
            }
            VisitState::InProgress => {
                *witness = Some(Witness {
                    start: graph.node(id).name.clone(),
                    end: graph.node(target).name.clone(),
                });
            }
            VisitState::Done => {}
        }
    }
}
