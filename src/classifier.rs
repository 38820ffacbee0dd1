//! Pure queries over the raw scene: which nodes are skin joints, which are
//! animated, which carry a mesh.

use crate::errors::{BakeError, Result};
use crate::scene::SceneGraph;

pub struct NodeClassifier<'a> {
    scene: &'a SceneGraph,
}

impl<'a> NodeClassifier<'a> {
    pub fn new(scene: &'a SceneGraph) -> Self {
        Self { scene }
    }

    /// True iff any skin lists `node` as a joint.
    pub fn is_joint(&self, node: usize) -> bool {
        self.scene
            .skins
            .iter()
            .any(|skin| skin.joints.contains(&node))
    }

    /// True iff any channel of any animation targets `node`.
    pub fn is_animated(&self, node: usize) -> bool {
        self.scene.animations.iter().any(|animation| {
            animation
                .channels
                .iter()
                .any(|channel| channel.target_node == node)
        })
    }

    pub fn is_mesh(&self, node: usize) -> bool {
        self.scene
            .nodes
            .get(node)
            .is_some_and(|n| n.mesh.is_some())
    }

    /// The first skin that lists `node` as a joint.
    pub fn skin_for_node(&self, node: usize) -> Option<usize> {
        self.scene
            .skins
            .iter()
            .position(|skin| skin.joints.contains(&node))
    }

    /// The skin's explicit skeleton root, or else the joint with the fewest
    /// ancestors (first one wins on ties).
    pub fn skeleton_root(&self, skin: usize) -> Result<usize> {
        let s = &self.scene.skins[skin];
        if let Some(root) = s.skeleton {
            return Ok(root);
        }

        let mut root: Option<(usize, usize)> = None;
        for &joint in &s.joints {
            let depth = self.depth(joint);
            match root {
                Some((_, min_depth)) if depth >= min_depth => {}
                _ => root = Some((joint, depth)),
            }
        }
        root.map(|(joint, _)| joint)
            .ok_or(BakeError::MissingSkeletonRoot { skin })
    }

    fn depth(&self, node: usize) -> usize {
        let mut depth = 0;
        let mut current = self.scene.nodes[node].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.scene.nodes[parent].parent;
        }
        depth
    }
}

/// Checks every node reference in the scene and rejects parent cycles. Runs
/// before any classification so later stages can index and walk freely.
pub fn validate_scene(scene: &SceneGraph) -> Result<()> {
    let node_count = scene.nodes.len();
    let check = |context: &dyn Fn() -> String, node: usize| -> Result<()> {
        if node < node_count {
            Ok(())
        } else {
            Err(BakeError::UnknownNode {
                context: context(),
                node,
                node_count,
            })
        }
    };

    for (idx, node) in scene.nodes.iter().enumerate() {
        if let Some(parent) = node.parent {
            check(&|| format!("parent of node {}", idx), parent)?;
        }
    }

    for idx in 0..node_count {
        let mut current = scene.nodes[idx].parent;
        let mut steps = 0;
        while let Some(parent) = current {
            steps += 1;
            if steps > node_count {
                return Err(BakeError::CyclicHierarchy { node: idx });
            }
            current = scene.nodes[parent].parent;
        }
    }

    for (skin_idx, skin) in scene.skins.iter().enumerate() {
        for &joint in &skin.joints {
            check(&|| format!("joint list of skin {}", skin_idx), joint)?;
        }
        if let Some(root) = skin.skeleton {
            check(&|| format!("skeleton root of skin {}", skin_idx), root)?;
        }
        if let Some(matrices) = &skin.inverse_bind_matrices {
            if matrices.len() != skin.joints.len() {
                return Err(BakeError::InverseBindMatrixCount {
                    skin: skin_idx,
                    matrices: matrices.len(),
                    joints: skin.joints.len(),
                });
            }
        }
    }

    for (anim_idx, animation) in scene.animations.iter().enumerate() {
        for (channel_idx, channel) in animation.channels.iter().enumerate() {
            check(
                &|| format!("animation {} channel {}", anim_idx, channel_idx),
                channel.target_node,
            )?;
            if channel.sampler >= animation.samplers.len() {
                return Err(BakeError::UnknownSampler {
                    animation: anim_idx,
                    channel: channel_idx,
                    sampler: channel.sampler,
                });
            }
        }
    }

    Ok(())
}
