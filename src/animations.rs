use crate::scene::{Animation, SceneGraph};

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationEntry {
    /// Index of the source animation.
    pub animation: usize,
    pub name: String,
    /// Seconds.
    pub duration: f32,
    /// First track of this animation in the flattened `animation * joint` table.
    pub sequence_index: u32,
}

/// Latest key time over all samplers. Samplers without keys are ignored.
pub fn calculate_animation_duration(animation: &Animation) -> f32 {
    animation
        .samplers
        .iter()
        .filter_map(|sampler| sampler.input.last().copied())
        .fold(0.0, f32::max)
}

pub fn sequence_index(animation_index: usize, joint_count: usize) -> u32 {
    (animation_index * joint_count) as u32
}

pub fn build_animation_catalog(scene: &SceneGraph, joint_count: usize) -> Vec<AnimationEntry> {
    scene
        .animations
        .iter()
        .enumerate()
        .map(|(idx, animation)| AnimationEntry {
            animation: idx,
            name: animation
                .name
                .clone()
                .unwrap_or_else(|| format!("animation_{}", idx)),
            duration: calculate_animation_duration(animation),
            sequence_index: sequence_index(idx, joint_count),
        })
        .collect()
}
