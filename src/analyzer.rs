//! Decides which scene nodes survive as output joints.
//!
//! Skin joints always survive. Mesh nodes survive when something above them
//! (or they themselves) moves. In both cases every animated ancestor
//! survives too, so its motion can still be expressed in the flattened
//! skeleton. Everything else is folded into a pre-transform later.

use log::{debug, log_enabled, warn, Level};

use crate::classifier::NodeClassifier;
use crate::scene::SceneGraph;

/// Per-node analysis state. `parent` mirrors the scene hierarchy as an index
/// into the same arena.
#[derive(Clone, Debug)]
pub struct AnalyzerNode {
    pub node: usize,
    pub parent: Option<usize>,
    pub is_joint: bool,
    pub is_animated: bool,
    pub is_mesh: bool,
    pub is_represented: bool,
}

/// One analyzer node per scene node, in scene order.
pub fn create_analyzer_nodes(scene: &SceneGraph) -> Vec<AnalyzerNode> {
    let classifier = NodeClassifier::new(scene);
    scene
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| AnalyzerNode {
            node: idx,
            parent: node.parent,
            is_joint: classifier.is_joint(idx),
            is_animated: classifier.is_animated(idx),
            is_mesh: classifier.is_mesh(idx),
            is_represented: false,
        })
        .collect()
}

/// Flags `is_represented` on every node that needs an output joint. Visits
/// every node; the result does not depend on visiting order.
pub fn analyze_nodes(nodes: &mut [AnalyzerNode]) {
    for idx in 0..nodes.len() {
        if nodes[idx].is_joint {
            if nodes[idx].is_mesh {
                warn!(
                    "node {} is both a skin joint and a mesh, treating it as a joint",
                    nodes[idx].node
                );
            }
            analyze_joint_node(nodes, idx);
        } else if nodes[idx].is_mesh {
            analyze_mesh_node(nodes, idx);
        }
    }
}

fn analyze_joint_node(nodes: &mut [AnalyzerNode], idx: usize) {
    nodes[idx].is_represented = true;
    represent_animated_ancestors(nodes, idx);
}

fn analyze_mesh_node(nodes: &mut [AnalyzerNode], idx: usize) {
    let mut is_dynamic = false;
    let mut current = Some(idx);
    while let Some(n) = current {
        if nodes[n].is_joint || nodes[n].is_animated {
            is_dynamic = true;
            break;
        }
        current = nodes[n].parent;
    }

    // static meshes are baked into vertex positions instead
    if !is_dynamic {
        return;
    }

    nodes[idx].is_represented = true;
    represent_animated_ancestors(nodes, idx);
}

fn represent_animated_ancestors(nodes: &mut [AnalyzerNode], idx: usize) {
    let mut current = nodes[idx].parent;
    while let Some(n) = current {
        if nodes[n].is_animated {
            nodes[n].is_represented = true;
        }
        current = nodes[n].parent;
    }
}

/// Depth-first pre-order over the node forest. Roots and siblings come in
/// node-index order, so every parent precedes its children.
pub fn traversal_order(nodes: &[AnalyzerNode]) -> Vec<usize> {
    let mut children: Vec<Vec<usize>> = vec![vec![]; nodes.len()];
    let mut roots = vec![];
    for node in nodes {
        match node.parent {
            Some(parent) => children[parent].push(node.node),
            None => roots.push(node.node),
        }
    }

    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(children[idx].iter().rev());
    }
    order
}

pub fn flag_tags(node: &AnalyzerNode) -> String {
    let mut tags = String::new();
    if node.is_joint {
        tags.push_str(" [J]");
    }
    if node.is_animated {
        tags.push_str(" [A]");
    }
    if node.is_mesh {
        tags.push_str(" [M]");
    }
    tags
}

pub fn tree_prefix(depth: usize) -> String {
    let mut prefix = "| ".repeat(depth.saturating_sub(1));
    if depth > 0 {
        prefix.push_str("|-");
    }
    prefix
}

/// Logs the classified node forest at debug level.
pub fn log_node_tree(scene: &SceneGraph, nodes: &[AnalyzerNode]) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    debug!("{} scene nodes:", nodes.len());
    for idx in traversal_order(nodes) {
        let mut depth = 0;
        let mut current = nodes[idx].parent;
        while let Some(parent) = current {
            depth += 1;
            current = nodes[parent].parent;
        }
        debug!(
            "{}\"{}\"{}",
            tree_prefix(depth),
            scene.node_name(idx),
            flag_tags(&nodes[idx])
        );
    }
}
