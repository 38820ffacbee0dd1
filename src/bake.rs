use log::{info, log_enabled, trace, Level};

use crate::analyzer::{analyze_nodes, create_analyzer_nodes, log_node_tree, AnalyzerNode};
use crate::animations::{build_animation_catalog, AnimationEntry};
use crate::classifier::validate_scene;
use crate::config::BakeConfig;
use crate::errors::Result;
use crate::joints::{build_joints, log_joint_tree, node_to_joint_map, Joint};
use crate::keyframes::{
    bake_joint_keyframes, keyframe_count, resolve_channels, Keyframe, Sequence,
};
use crate::scene::SceneGraph;

/// Everything one bake run produces. Owned by the caller; nothing is shared
/// between runs.
#[derive(Clone, Debug)]
pub struct BakeContext {
    pub analyzer_nodes: Vec<AnalyzerNode>,
    pub joints: Vec<Joint>,
    pub animations: Vec<AnimationEntry>,
    /// `animation * joint_count + joint`.
    pub sequences: Vec<Sequence>,
    /// Animation-major, then joint-major, then translation / rotation / scale.
    pub keyframes: Vec<Keyframe>,
    node_to_joint: Vec<Option<u32>>,
}

impl BakeContext {
    pub fn bake(scene: &SceneGraph) -> Result<Self> {
        Self::bake_with_config(scene, &BakeConfig::default())
    }

    pub fn bake_with_config(scene: &SceneGraph, config: &BakeConfig) -> Result<Self> {
        validate_scene(scene)?;

        let mut analyzer_nodes = create_analyzer_nodes(scene);
        log_node_tree(scene, &analyzer_nodes);
        analyze_nodes(&mut analyzer_nodes);

        let joints = build_joints(scene, &analyzer_nodes)?;
        let node_to_joint = node_to_joint_map(analyzer_nodes.len(), &joints);
        info!(
            "{} of {} nodes are represented as joints",
            joints.len(),
            scene.nodes.len()
        );
        log_joint_tree(scene, &joints, &analyzer_nodes);

        let animations = build_animation_catalog(scene, joints.len());
        for animation in &animations {
            info!(
                "animation #{} \"{}\": {:.3}s",
                animation.animation, animation.name, animation.duration
            );
        }

        let mut sequences = Vec::with_capacity(animations.len() * joints.len());
        let mut keyframes = vec![];
        for (animation_idx, animation) in scene.animations.iter().enumerate() {
            let channels = resolve_channels(animation_idx, animation, scene.nodes.len())?;

            let total: u32 = joints
                .iter()
                .map(|joint| {
                    let c = &channels[joint.node];
                    keyframe_count(c.translation) + keyframe_count(c.rotation) + keyframe_count(c.scale)
                })
                .sum();
            keyframes.reserve(total as usize);

            for joint in &joints {
                let sequence =
                    bake_joint_keyframes(scene, joint, &channels[joint.node], &mut keyframes);
                sequences.push(sequence);
            }
        }
        info!(
            "baked {} tracks with {} keyframes",
            sequences.len(),
            keyframes.len()
        );

        let context = Self {
            analyzer_nodes,
            joints,
            animations,
            sequences,
            keyframes,
            node_to_joint,
        };
        context.log_tracks(config);
        Ok(context)
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Output joint of `node`, if the node survived.
    pub fn joint_index_for_node(&self, node: usize) -> Option<u32> {
        self.node_to_joint.get(node).copied().flatten()
    }

    pub fn has_joint_for_node(&self, node: usize) -> bool {
        self.joint_index_for_node(node).is_some()
    }

    /// Translates a skin-local joint index (as stored in vertex data) into an
    /// output joint index.
    pub fn skin_joint_to_output_joint(
        &self,
        scene: &SceneGraph,
        skin: usize,
        skin_joint: usize,
    ) -> Option<u32> {
        let node = *scene.skins.get(skin)?.joints.get(skin_joint)?;
        self.joint_index_for_node(node)
    }

    /// The sequence of `joint` in `animation`.
    pub fn sequence(&self, animation: usize, joint: usize) -> Option<&Sequence> {
        let entry = self.animations.get(animation)?;
        if joint >= self.joints.len() {
            return None;
        }
        self.sequences.get(entry.sequence_index as usize + joint)
    }

    fn log_tracks(&self, config: &BakeConfig) {
        if !log_enabled!(Level::Trace) {
            return;
        }
        for (idx, sequence) in self.sequences.iter().enumerate() {
            if !BakeConfig::within(config.track_log_limit, idx) {
                break;
            }
            trace!(
                "track #{}: T {:?}, R {:?}, S {:?}",
                idx,
                sequence.translation,
                sequence.rotation,
                sequence.scale
            );
        }
        for (idx, keyframe) in self.keyframes.iter().enumerate() {
            if !BakeConfig::within(config.keyframe_log_limit, idx) {
                break;
            }
            trace!(
                "keyframe #{}: {:?} @ {}s",
                idx,
                keyframe.data,
                keyframe.time
            );
        }
    }
}
