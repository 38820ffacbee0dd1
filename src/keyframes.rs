//! Per-joint keyframe streams with skipped ancestors folded in.
//!
//! Each TRS component keeps its own key times. To correct a key of one
//! component, the other two are sampled at that key's time, the full local
//! matrix is built and prefixed with the joint's pre-transform, and the
//! result is decomposed again. Only the component being baked is kept, so
//! the pose at every authored key time matches the source hierarchy.

use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use log::warn;

use crate::errors::{BakeError, Result};
use crate::joints::Joint;
use crate::sampler::{expected_output_count, Interpolate, Track};
use crate::scene::{Animation, SamplerOutput, SceneGraph, TargetPath};
use crate::transform::{align_hemisphere, Trs};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Keyframe {
    /// Seconds.
    pub time: f32,
    /// xyz for translation and scale (w = 0), xyzw for rotation.
    pub data: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct KeyframeRange {
    pub first_index: u32,
    pub count: u32,
}

/// The three keyframe ranges of one (animation, joint) pair.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Sequence {
    pub translation: KeyframeRange,
    pub rotation: KeyframeRange,
    pub scale: KeyframeRange,
}

/// The TRS channels of an animation that drive one node.
#[derive(Clone, Copy, Default)]
pub struct NodeChannels<'a> {
    pub translation: Option<Track<'a, Vec3>>,
    pub rotation: Option<Track<'a, Quat>>,
    pub scale: Option<Track<'a, Vec3>>,
}

impl NodeChannels<'_> {
    fn sample(&self, rest: &Trs, time: f32) -> Trs {
        Trs {
            translation: self
                .translation
                .map_or(rest.translation, |track| track.sample(time)),
            rotation: self
                .rotation
                .map_or(rest.rotation, |track| track.sample(time).normalize()),
            scale: self.scale.map_or(rest.scale, |track| track.sample(time)),
        }
    }
}

/// Validates every channel of `animation` and groups the TRS ones by target
/// node. Channels whose sampler has no keys are treated as absent.
pub fn resolve_channels<'a>(
    animation_index: usize,
    animation: &'a Animation,
    node_count: usize,
) -> Result<Vec<NodeChannels<'a>>> {
    let mut channels = vec![NodeChannels::default(); node_count];
    let mut seen = HashSet::new();

    for (channel_idx, channel) in animation.channels.iter().enumerate() {
        let node = channel.target_node;
        if !seen.insert((node, channel.target_path)) {
            return Err(BakeError::DuplicateChannel {
                animation: animation_index,
                node,
                path: channel.target_path,
            });
        }

        let sampler = animation
            .samplers
            .get(channel.sampler)
            .ok_or(BakeError::UnknownSampler {
                animation: animation_index,
                channel: channel_idx,
                sampler: channel.sampler,
            })?;

        if channel.target_path == TargetPath::Weights {
            warn!(
                "animation {} channel {}: morph weight channels are not baked",
                animation_index, channel_idx
            );
            continue;
        }

        let expected = expected_output_count(sampler.input.len(), sampler.interpolation);
        if sampler.output.len() != expected {
            return Err(BakeError::SamplerCountMismatch {
                animation: animation_index,
                sampler: channel.sampler,
                inputs: sampler.input.len(),
                outputs: sampler.output.len(),
                expected,
            });
        }
        if sampler.input.is_empty() {
            continue;
        }
        // NaN times fail the comparison too
        if sampler.input.windows(2).any(|pair| !(pair[0] < pair[1])) {
            return Err(BakeError::UnsortedKeyTimes {
                animation: animation_index,
                sampler: channel.sampler,
            });
        }

        let mismatch = || BakeError::ChannelOutputMismatch {
            animation: animation_index,
            channel: channel_idx,
            path: channel.target_path,
            found: sampler.output.kind(),
        };
        let target = &mut channels[node];
        match (channel.target_path, &sampler.output) {
            (TargetPath::Translation, SamplerOutput::Vec3(values)) => {
                target.translation = Track::new(&sampler.input, values, sampler.interpolation);
            }
            (TargetPath::Rotation, SamplerOutput::Quat(values)) => {
                target.rotation = Track::new(&sampler.input, values, sampler.interpolation);
            }
            (TargetPath::Scale, SamplerOutput::Vec3(values)) => {
                target.scale = Track::new(&sampler.input, values, sampler.interpolation);
            }
            _ => return Err(mismatch()),
        }
    }

    Ok(channels)
}

/// Number of keyframes a stream will get: one per key, or one synthesized.
pub fn keyframe_count<T: Interpolate>(track: Option<Track<'_, T>>) -> u32 {
    track.map_or(1, |track| track.len() as u32)
}

/// Appends the translation, rotation and scale streams of `joint` for one
/// animation to `keyframes`, and returns where they landed.
pub fn bake_joint_keyframes(
    scene: &SceneGraph,
    joint: &Joint,
    channels: &NodeChannels,
    keyframes: &mut Vec<Keyframe>,
) -> Sequence {
    let rest = scene.nodes[joint.node].transform.to_trs();
    let pre_rotation = Trs::from_matrix(&joint.pre_transform).rotation;
    let correct = |local: Trs| Trs::from_matrix(&(joint.pre_transform * local.to_matrix()));

    // translation
    let translation = begin_range(keyframes);
    let keys: Vec<(f32, Vec3)> = match channels.translation {
        Some(track) => (0..track.len()).map(|k| track.key(k)).collect(),
        None => vec![(0.0, rest.translation)],
    };
    for (time, value) in keys {
        let local = Trs {
            translation: value,
            ..channels.sample(&rest, time)
        };
        let t = correct(local).translation;
        keyframes.push(Keyframe {
            time,
            data: [t.x, t.y, t.z, 0.0],
        });
    }
    let translation = end_range(translation, keyframes);

    // rotation
    let rotation = begin_range(keyframes);
    let keys: Vec<(f32, Quat)> = match channels.rotation {
        Some(track) => (0..track.len()).map(|k| track.key(k)).collect(),
        None => vec![(0.0, rest.rotation)],
    };
    for (time, value) in keys {
        let value = value.normalize();
        let local = Trs {
            rotation: value,
            ..channels.sample(&rest, time)
        };
        let r = align_hemisphere(correct(local).rotation.normalize(), pre_rotation * value);
        keyframes.push(Keyframe {
            time,
            data: r.to_array(),
        });
    }
    let rotation = end_range(rotation, keyframes);

    // scale
    let scale = begin_range(keyframes);
    let keys: Vec<(f32, Vec3)> = match channels.scale {
        Some(track) => (0..track.len()).map(|k| track.key(k)).collect(),
        None => vec![(0.0, rest.scale)],
    };
    for (time, value) in keys {
        let local = Trs {
            scale: value,
            ..channels.sample(&rest, time)
        };
        let s = correct(local).scale;
        keyframes.push(Keyframe {
            time,
            data: [s.x, s.y, s.z, 0.0],
        });
    }
    let scale = end_range(scale, keyframes);

    Sequence {
        translation,
        rotation,
        scale,
    }
}

fn begin_range(keyframes: &[Keyframe]) -> u32 {
    keyframes.len() as u32
}

fn end_range(first_index: u32, keyframes: &[Keyframe]) -> KeyframeRange {
    KeyframeRange {
        first_index,
        count: keyframes.len() as u32 - first_index,
    }
}
