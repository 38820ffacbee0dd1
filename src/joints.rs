//! Builds the flattened output skeleton from the represented nodes.

use glam::Mat4;
use log::{debug, log_enabled, Level};

use crate::analyzer::{flag_tags, traversal_order, tree_prefix, AnalyzerNode};
use crate::classifier::NodeClassifier;
use crate::errors::{BakeError, Result};
use crate::scene::SceneGraph;
use crate::transform::global_node_transform;

#[derive(Clone, Debug)]
pub struct Joint {
    /// Index of the analyzer node (and scene node) this joint represents.
    pub node: usize,
    /// Index of the parent joint, -1 for roots.
    pub parent_index: i32,
    /// Model space to joint space at rest pose.
    pub inverse_bind_matrix: Mat4,
    /// Combined local transform of the skipped ancestors between this joint
    /// and its parent joint.
    pub pre_transform: Mat4,
}

/// Turns the represented analyzer nodes into joints. `nodes` must already
/// have been through [`crate::analyzer::analyze_nodes`].
pub fn build_joints(scene: &SceneGraph, nodes: &[AnalyzerNode]) -> Result<Vec<Joint>> {
    let mut joints: Vec<Joint> = traversal_order(nodes)
        .into_iter()
        .filter(|&idx| nodes[idx].is_represented)
        .map(|idx| Joint {
            node: idx,
            parent_index: -1,
            inverse_bind_matrix: Mat4::IDENTITY,
            pre_transform: Mat4::IDENTITY,
        })
        .collect();

    let node_to_joint = node_to_joint_map(nodes.len(), &joints);
    calculate_parent_indices(&mut joints, nodes, &node_to_joint);
    calculate_inverse_bind_matrices(scene, &mut joints, nodes)?;
    calculate_pre_transforms(scene, &mut joints, nodes);

    Ok(joints)
}

/// `map[node]` is the output joint index of `node`, if it has one.
pub fn node_to_joint_map(node_count: usize, joints: &[Joint]) -> Vec<Option<u32>> {
    let mut map = vec![None; node_count];
    for (joint_idx, joint) in joints.iter().enumerate() {
        map[joint.node] = Some(joint_idx as u32);
    }
    map
}

fn calculate_parent_indices(
    joints: &mut [Joint],
    nodes: &[AnalyzerNode],
    node_to_joint: &[Option<u32>],
) {
    for joint in joints.iter_mut() {
        joint.parent_index = -1;
        let mut current = nodes[joint.node].parent;
        while let Some(n) = current {
            if let Some(parent_joint) = node_to_joint[n] {
                joint.parent_index = parent_joint as i32;
                break;
            }
            current = nodes[n].parent;
        }
    }
}

fn calculate_inverse_bind_matrices(
    scene: &SceneGraph,
    joints: &mut [Joint],
    nodes: &[AnalyzerNode],
) -> Result<()> {
    let classifier = NodeClassifier::new(scene);
    for joint in joints.iter_mut() {
        let node = &nodes[joint.node];
        joint.inverse_bind_matrix = if node.is_joint {
            skin_joint_inverse_bind_matrix(scene, &classifier, joint.node)?
        } else if node.is_mesh {
            // the mesh's vertices are already in its own local space
            global_node_transform(scene, joint.node)?.inverse()
        } else {
            Mat4::IDENTITY
        };
    }
    Ok(())
}

fn skin_joint_inverse_bind_matrix(
    scene: &SceneGraph,
    classifier: &NodeClassifier,
    node: usize,
) -> Result<Mat4> {
    let skin_idx = classifier
        .skin_for_node(node)
        .ok_or(BakeError::MissingSkinForJoint { node })?;
    let skin = &scene.skins[skin_idx];

    let skin_root = classifier.skeleton_root(skin_idx)?;
    let skin_root_to_model = global_node_transform(scene, skin_root)?.inverse();

    let joint_to_skin = match &skin.inverse_bind_matrices {
        Some(matrices) => {
            let index_in_skin = skin
                .joints
                .iter()
                .position(|&j| j == node)
                .ok_or(BakeError::MissingSkinForJoint { node })?;
            matrices[index_in_skin]
        }
        None => Mat4::IDENTITY,
    };

    Ok(joint_to_skin * skin_root_to_model)
}

fn calculate_pre_transforms(scene: &SceneGraph, joints: &mut [Joint], nodes: &[AnalyzerNode]) {
    for joint in joints.iter_mut() {
        let mut pre_transform = Mat4::IDENTITY;
        let mut current = nodes[joint.node].parent;
        while let Some(n) = current {
            if nodes[n].is_represented {
                break;
            }
            pre_transform = scene.nodes[n].transform.to_matrix() * pre_transform;
            current = nodes[n].parent;
        }
        joint.pre_transform = pre_transform;
    }
}

/// Logs the output joint forest at debug level.
pub fn log_joint_tree(scene: &SceneGraph, joints: &[Joint], nodes: &[AnalyzerNode]) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    debug!("{} joints:", joints.len());
    log_joint_children(scene, joints, nodes, -1, 0);
}

fn log_joint_children(
    scene: &SceneGraph,
    joints: &[Joint],
    nodes: &[AnalyzerNode],
    parent_index: i32,
    depth: usize,
) {
    for (joint_idx, joint) in joints.iter().enumerate() {
        if joint.parent_index != parent_index {
            continue;
        }
        debug!(
            "{}#{}: \"{}\"{}",
            tree_prefix(depth),
            joint_idx,
            scene.node_name(joint.node),
            flag_tags(&nodes[joint.node])
        );
        log_joint_children(scene, joints, nodes, joint_idx as i32, depth + 1);
    }
}
