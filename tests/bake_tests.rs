//! Bake Pipeline Tests
//!
//! Tests for:
//! - Node classification and joint selection (skin joints, animated
//!   ancestors, dynamic vs static meshes)
//! - Joint ordering, parent indices and pre-transforms
//! - Inverse bind matrices for skin joints and mesh attachments
//! - Keyframe baking, including synthesized static streams, value
//!   correction against the source hierarchy and flattened matrix nodes
//! - Animation catalog durations and sequence indices
//! - Rejection of malformed scenes

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6};

use glam::{Mat4, Quat, Vec3, Vec4};

use skeleton_bake::animations::calculate_animation_duration;
use skeleton_bake::keyframes::KeyframeRange;
use skeleton_bake::scene::{
    Animation, Channel, Interpolation, LocalTransform, Sampler, SamplerOutput, SceneGraph, Skin,
    TargetPath,
};
use skeleton_bake::{BakeConfig, BakeContext, BakeError, Keyframe};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn trs(translation: Vec3, rotation: Quat, scale: Vec3) -> LocalTransform {
    LocalTransform::Trs {
        translation,
        rotation,
        scale,
    }
}

fn skin(joints: Vec<usize>) -> Skin {
    Skin {
        joints,
        ..Default::default()
    }
}

fn vec3_sampler(input: Vec<f32>, output: Vec<Vec3>) -> Sampler {
    Sampler {
        input,
        output: SamplerOutput::Vec3(output),
        interpolation: Interpolation::Linear,
    }
}

fn quat_sampler(input: Vec<f32>, output: Vec<Quat>) -> Sampler {
    Sampler {
        input,
        output: SamplerOutput::Quat(output),
        interpolation: Interpolation::Linear,
    }
}

fn channel(sampler: usize, target_node: usize, target_path: TargetPath) -> Channel {
    Channel {
        sampler,
        target_node,
        target_path,
    }
}

fn stream<'a>(context: &'a BakeContext, range: KeyframeRange) -> &'a [Keyframe] {
    let first = range.first_index as usize;
    &context.keyframes[first..first + range.count as usize]
}

/// A -> B -> C where only C is a skin joint and C's translation is animated.
fn chain_scene() -> SceneGraph {
    let mut scene = SceneGraph::default();
    let a = scene.add_node(
        "A",
        None,
        trs(Vec3::X, Quat::from_rotation_z(FRAC_PI_2), Vec3::splat(2.0)),
    );
    let b = scene.add_node("B", Some(a), LocalTransform::from_translation(Vec3::Y));
    let c = scene.add_node(
        "C",
        Some(b),
        trs(Vec3::Z, Quat::from_rotation_x(FRAC_PI_6), Vec3::ONE),
    );
    scene.skins.push(skin(vec![c]));
    scene.animations.push(Animation {
        name: Some("Walk".to_string()),
        samplers: vec![vec3_sampler(
            vec![0.0, 1.0],
            vec![Vec3::Z, Vec3::new(0.0, 0.0, 3.0)],
        )],
        channels: vec![channel(0, c, TargetPath::Translation)],
    });
    scene
}

// ============================================================================
// Joint selection
// ============================================================================

#[test]
fn skipped_ancestors_fold_into_pre_transform() {
    let scene = chain_scene();
    let context = BakeContext::bake(&scene).unwrap();

    assert_eq!(context.joint_count(), 1);
    let joint = &context.joints[0];
    assert_eq!(joint.node, 2);
    assert_eq!(joint.parent_index, -1);

    let expected = scene.nodes[0].transform.to_matrix() * scene.nodes[1].transform.to_matrix();
    assert!(joint.pre_transform.abs_diff_eq(expected, EPSILON));
}

#[test]
fn animated_ancestor_is_represented() {
    let mut scene = SceneGraph::default();
    let g = scene.add_node("G", None, LocalTransform::default());
    let x = scene.add_node("X", Some(g), LocalTransform::from_translation(Vec3::Y));
    let j = scene.add_node("J", Some(x), LocalTransform::default());
    scene.skins.push(skin(vec![j]));
    scene.animations.push(Animation {
        name: None,
        samplers: vec![quat_sampler(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
        )],
        channels: vec![channel(0, g, TargetPath::Rotation)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    let nodes: Vec<usize> = context.joints.iter().map(|joint| joint.node).collect();
    assert_eq!(nodes, vec![g, j]);
    assert!(!context.has_joint_for_node(x));
    assert_eq!(context.joints[1].parent_index, 0);
    assert!(context.joints[1]
        .pre_transform
        .abs_diff_eq(Mat4::from_translation(Vec3::Y), EPSILON));
}

#[test]
fn static_mesh_is_not_represented() {
    let mut scene = SceneGraph::default();
    let root = scene.add_node("root", None, LocalTransform::from_translation(Vec3::X));
    let mesh = scene.add_node("mesh", Some(root), LocalTransform::default());
    scene.nodes[mesh].mesh = Some(0);

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_count(), 0);
    assert!(context.analyzer_nodes[mesh].is_mesh);
    assert!(!context.analyzer_nodes[mesh].is_represented);
}

#[test]
fn morph_weight_channel_marks_node_animated() {
    let mut scene = SceneGraph::default();
    let mesh = scene.add_node("face", None, LocalTransform::from_translation(Vec3::Y));
    scene.nodes[mesh].mesh = Some(0);
    scene.animations.push(Animation {
        name: Some("Blink".to_string()),
        samplers: vec![Sampler {
            input: vec![0.0, 0.5],
            output: SamplerOutput::Scalar(vec![0.0, 1.0]),
            interpolation: Interpolation::Linear,
        }],
        channels: vec![channel(0, mesh, TargetPath::Weights)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_count(), 1);
    let sequence = context.sequence(0, 0).unwrap();
    assert_eq!(sequence.translation.count, 1);
    assert_eq!(sequence.rotation.count, 1);
    assert_eq!(sequence.scale.count, 1);
    assert!(approx(context.animations[0].duration, 0.5));
}

// ============================================================================
// Ordering and lookups
// ============================================================================

#[test]
fn parents_come_before_children() {
    // node 0 is a child of node 1
    let mut scene = SceneGraph::default();
    scene.add_node("hand", Some(1), LocalTransform::from_translation(Vec3::X));
    scene.add_node("arm", None, LocalTransform::default());
    scene.add_node("other", None, LocalTransform::default());
    scene.skins.push(skin(vec![0, 1, 2]));

    let context = BakeContext::bake(&scene).unwrap();
    assert!(context.joint_count() <= scene.nodes.len());
    let nodes: Vec<usize> = context.joints.iter().map(|joint| joint.node).collect();
    assert_eq!(nodes, vec![1, 0, 2]);
    for (idx, joint) in context.joints.iter().enumerate() {
        assert!(joint.parent_index < idx as i32);
    }
    assert_eq!(context.joints[1].parent_index, 0);
    assert_eq!(context.joints[2].parent_index, -1);
}

#[test]
fn node_and_skin_joint_lookups() {
    let mut scene = SceneGraph::default();
    scene.add_node("hand", Some(1), LocalTransform::default());
    scene.add_node("arm", None, LocalTransform::default());
    scene.add_node("prop", None, LocalTransform::default());
    scene.skins.push(skin(vec![0, 1]));

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_index_for_node(1), Some(0));
    assert_eq!(context.joint_index_for_node(0), Some(1));
    assert_eq!(context.joint_index_for_node(2), None);
    assert_eq!(context.joint_index_for_node(99), None);
    assert!(context.has_joint_for_node(0));
    assert!(!context.has_joint_for_node(2));

    assert_eq!(context.skin_joint_to_output_joint(&scene, 0, 0), Some(1));
    assert_eq!(context.skin_joint_to_output_joint(&scene, 0, 1), Some(0));
    assert_eq!(context.skin_joint_to_output_joint(&scene, 0, 2), None);
    assert_eq!(context.skin_joint_to_output_joint(&scene, 1, 0), None);
}

// ============================================================================
// Inverse bind matrices
// ============================================================================

#[test]
fn skin_joint_bind_matrix_is_relative_to_skeleton_root() {
    let t = Vec3::new(3.0, 4.0, 5.0);
    let mut scene = SceneGraph::default();
    let root = scene.add_node("R", None, LocalTransform::from_translation(t));
    let joint = scene.add_node("J", Some(root), LocalTransform::default());
    scene.skins.push(Skin {
        name: None,
        skeleton: Some(root),
        joints: vec![joint],
        inverse_bind_matrices: Some(vec![Mat4::IDENTITY]),
    });

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_count(), 1);
    let expected = Mat4::from_translation(t).inverse();
    assert!(context.joints[0]
        .inverse_bind_matrix
        .abs_diff_eq(expected, EPSILON));
}

#[test]
fn skin_without_bind_matrices_uses_shallowest_joint_as_root() {
    let mut scene = SceneGraph::default();
    let hip = scene.add_node("hip", None, LocalTransform::from_translation(Vec3::Y));
    let knee = scene.add_node("knee", Some(hip), LocalTransform::from_translation(Vec3::X));
    scene.skins.push(skin(vec![knee, hip]));

    let context = BakeContext::bake(&scene).unwrap();
    let expected = Mat4::from_translation(Vec3::Y).inverse();
    for joint in &context.joints {
        assert!(joint.inverse_bind_matrix.abs_diff_eq(expected, EPSILON));
    }
}

#[test]
fn mesh_attachment_bind_matrix_is_inverse_global() {
    let mut scene = SceneGraph::default();
    let pivot = scene.add_node("pivot", None, LocalTransform::from_translation(Vec3::X));
    let mesh = scene.add_node(
        "sword",
        Some(pivot),
        LocalTransform::from_translation(Vec3::new(0.0, 2.0, 0.0)),
    );
    scene.nodes[mesh].mesh = Some(0);
    scene.animations.push(Animation {
        name: None,
        samplers: vec![quat_sampler(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)],
        )],
        channels: vec![channel(0, pivot, TargetPath::Rotation)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_count(), 2);
    assert!(context.joints[0]
        .inverse_bind_matrix
        .abs_diff_eq(Mat4::IDENTITY, EPSILON));
    assert_eq!(context.joints[1].node, mesh);
    assert_eq!(context.joints[1].parent_index, 0);
    let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)).inverse();
    assert!(context.joints[1]
        .inverse_bind_matrix
        .abs_diff_eq(expected, EPSILON));
}

#[test]
fn mesh_under_skin_joint_is_represented() {
    let mut scene = SceneGraph::default();
    let joint = scene.add_node("J", None, LocalTransform::from_translation(Vec3::X));
    let mesh = scene.add_node(
        "M",
        Some(joint),
        LocalTransform::from_translation(Vec3::new(0.0, 2.0, 0.0)),
    );
    scene.nodes[mesh].mesh = Some(0);
    scene.skins.push(skin(vec![joint]));

    let context = BakeContext::bake(&scene).unwrap();
    let nodes: Vec<usize> = context.joints.iter().map(|joint| joint.node).collect();
    assert_eq!(nodes, vec![joint, mesh]);
    assert!(context.analyzer_nodes[mesh].is_represented);
    assert_eq!(context.joints[1].parent_index, 0);
    let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)).inverse();
    assert!(context.joints[1]
        .inverse_bind_matrix
        .abs_diff_eq(expected, EPSILON));
}

// ============================================================================
// Keyframes
// ============================================================================

#[test]
fn unanimated_streams_get_one_static_keyframe() {
    let scene = chain_scene();
    let context = BakeContext::bake(&scene).unwrap();
    let sequence = context.sequence(0, 0).unwrap();

    assert_eq!(sequence.translation.count, 2);
    assert_eq!(sequence.rotation.count, 1);
    assert_eq!(sequence.scale.count, 1);

    let rotation = stream(&context, sequence.rotation)[0];
    assert!(approx(rotation.time, 0.0));
    let expected = Quat::from_rotation_z(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_6);
    let baked = Quat::from_array(rotation.data);
    assert!(approx(baked.dot(expected).abs(), 1.0), "{:?} != {:?}", baked, expected);

    let scale = stream(&context, sequence.scale)[0];
    assert!(approx(scale.time, 0.0));
    assert!(Vec3::new(scale.data[0], scale.data[1], scale.data[2]).abs_diff_eq(Vec3::splat(2.0), 1e-4));
    assert_eq!(scale.data[3], 0.0);
}

#[test]
fn baked_pose_matches_source_hierarchy_at_key_times() {
    let scene = chain_scene();
    let context = BakeContext::bake(&scene).unwrap();
    let sequence = context.sequence(0, 0).unwrap();

    let rotation = Quat::from_array(stream(&context, sequence.rotation)[0].data);
    let scale = stream(&context, sequence.scale)[0].data;
    let scale = Vec3::new(scale[0], scale[1], scale[2]);

    let authored = [Vec3::Z, Vec3::new(0.0, 0.0, 3.0)];
    let source_local = |translation: Vec3| {
        scene.nodes[0].transform.to_matrix()
            * scene.nodes[1].transform.to_matrix()
            * Mat4::from_rotation_translation(Quat::from_rotation_x(FRAC_PI_6), translation)
    };

    for (keyframe, translation) in stream(&context, sequence.translation).iter().zip(authored) {
        let baked = Mat4::from_scale_rotation_translation(
            scale,
            rotation,
            Vec3::new(keyframe.data[0], keyframe.data[1], keyframe.data[2]),
        );
        assert!(
            baked.abs_diff_eq(source_local(translation), 1e-4),
            "pose mismatch at t={}",
            keyframe.time
        );
    }
}

#[test]
fn rotation_keyframes_are_unit_quaternions() {
    let mut scene = SceneGraph::default();
    let root = scene.add_node(
        "root",
        None,
        trs(Vec3::ZERO, Quat::from_rotation_x(0.3), Vec3::splat(0.5)),
    );
    let joint = scene.add_node("joint", Some(root), LocalTransform::default());
    scene.skins.push(skin(vec![joint]));
    scene.animations.push(Animation {
        name: None,
        samplers: vec![quat_sampler(
            vec![0.0, 0.4, 0.8],
            vec![
                Quat::IDENTITY,
                // deliberately not normalized
                Quat::from_xyzw(0.0, 0.0, 2.0, 2.0),
                Quat::from_rotation_y(-2.5),
            ],
        )],
        channels: vec![channel(0, joint, TargetPath::Rotation)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    let sequence = context.sequence(0, 0).unwrap();
    assert_eq!(sequence.rotation.count, 3);
    for keyframe in stream(&context, sequence.rotation) {
        let q = Quat::from_array(keyframe.data);
        assert!(approx(q.length(), 1.0), "{:?} is not normalized", q);
    }
}

#[test]
fn rotation_and_scale_keys_match_source_hierarchy() {
    let mut scene = SceneGraph::default();
    let parent = scene.add_node(
        "P",
        None,
        trs(Vec3::Y, Quat::from_rotation_z(FRAC_PI_2), Vec3::splat(2.0)),
    );
    let joint = scene.add_node("J", Some(parent), LocalTransform::from_translation(Vec3::X));
    scene.skins.push(skin(vec![joint]));
    let rotations = vec![Quat::from_rotation_x(0.3), Quat::from_rotation_y(1.2)];
    let authored_scale = Vec3::new(1.0, 2.0, 3.0);
    scene.animations.push(Animation {
        name: None,
        samplers: vec![
            quat_sampler(vec![0.0, 1.0], rotations.clone()),
            vec3_sampler(vec![0.5], vec![authored_scale]),
        ],
        channels: vec![
            channel(0, joint, TargetPath::Rotation),
            channel(1, joint, TargetPath::Scale),
        ],
    });

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_count(), 1);
    let sequence = context.sequence(0, 0).unwrap();
    assert_eq!(sequence.rotation.count, 2);
    assert_eq!(sequence.scale.count, 1);

    let scale = stream(&context, sequence.scale)[0];
    assert!(approx(scale.time, 0.5));
    let scale = Vec3::new(scale.data[0], scale.data[1], scale.data[2]);
    assert!(scale.abs_diff_eq(Vec3::new(2.0, 4.0, 6.0), 1e-4), "{:?}", scale);
    let translation = stream(&context, sequence.translation)[0].data;
    let translation = Vec3::new(translation[0], translation[1], translation[2]);

    let pre = scene.nodes[parent].transform.to_matrix();
    for (keyframe, rotation) in stream(&context, sequence.rotation).iter().zip(rotations) {
        let baked =
            Mat4::from_scale_rotation_translation(scale, Quat::from_array(keyframe.data), translation);
        let source = pre * Mat4::from_scale_rotation_translation(authored_scale, rotation, Vec3::X);
        assert!(
            baked.abs_diff_eq(source, 1e-4),
            "pose mismatch at t={}",
            keyframe.time
        );
    }
}

#[test]
fn rotation_keys_keep_authored_hemisphere() {
    let mut scene = SceneGraph::default();
    let parent = scene.add_node(
        "P",
        None,
        trs(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2), Vec3::ONE),
    );
    let joint = scene.add_node("J", Some(parent), LocalTransform::default());
    scene.skins.push(skin(vec![joint]));
    let authored = vec![-Quat::from_rotation_z(0.5), -Quat::from_rotation_z(0.7)];
    scene.animations.push(Animation {
        name: None,
        samplers: vec![quat_sampler(vec![0.0, 1.0], authored.clone())],
        channels: vec![channel(0, joint, TargetPath::Rotation)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    let sequence = context.sequence(0, 0).unwrap();
    for (keyframe, q) in stream(&context, sequence.rotation).iter().zip(authored) {
        let expected = Quat::from_rotation_z(FRAC_PI_2) * q;
        let baked = Quat::from_array(keyframe.data);
        assert!(baked.w < 0.0);
        assert!(baked.abs_diff_eq(expected, 1e-4), "{:?} != {:?}", baked, expected);
    }
}

#[test]
fn flattened_matrix_nodes_bake_finite_values() {
    // x axis collapsed to zero
    let flat = Mat4::from_cols(Vec4::ZERO, Vec4::Y, Vec4::Z, Vec4::new(0.0, 1.0, 0.0, 1.0));
    let mut scene = SceneGraph::default();
    let parent = scene.add_node("flat", None, LocalTransform::Matrix(flat));
    let joint = scene.add_node("J", Some(parent), LocalTransform::from_translation(Vec3::X));
    let flat_joint = scene.add_node("K", Some(joint), LocalTransform::Matrix(flat));
    scene.skins.push(skin(vec![joint, flat_joint]));
    scene.animations.push(Animation {
        name: None,
        samplers: vec![quat_sampler(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
        )],
        channels: vec![channel(0, joint, TargetPath::Rotation)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_count(), 2);
    for joint in &context.joints {
        assert!(joint.inverse_bind_matrix.is_finite());
        assert!(joint.pre_transform.is_finite());
    }
    for keyframe in &context.keyframes {
        assert!(keyframe.time.is_finite());
        assert!(keyframe.data.iter().all(|v| v.is_finite()), "{:?}", keyframe);
    }
    for sequence in &context.sequences {
        for keyframe in stream(&context, sequence.rotation) {
            assert!(approx(Quat::from_array(keyframe.data).length(), 1.0));
        }
    }
}

#[test]
fn cubic_spline_bakes_middle_values() {
    let mut scene = SceneGraph::default();
    let joint = scene.add_node("joint", None, LocalTransform::default());
    scene.skins.push(skin(vec![joint]));
    scene.animations.push(Animation {
        name: None,
        samplers: vec![Sampler {
            input: vec![0.0, 1.0],
            output: SamplerOutput::Vec3(vec![
                Vec3::splat(9.0),
                Vec3::X,
                Vec3::splat(9.0),
                Vec3::splat(9.0),
                Vec3::Y,
                Vec3::splat(9.0),
            ]),
            interpolation: Interpolation::CubicSpline,
        }],
        channels: vec![channel(0, joint, TargetPath::Translation)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    let sequence = context.sequence(0, 0).unwrap();
    let keys = stream(&context, sequence.translation);
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].data, [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(keys[1].data, [0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn empty_sampler_is_treated_as_missing_channel() {
    let mut scene = SceneGraph::default();
    let joint = scene.add_node("joint", None, LocalTransform::from_translation(Vec3::X));
    scene.skins.push(skin(vec![joint]));
    scene.animations.push(Animation {
        name: None,
        samplers: vec![vec3_sampler(vec![], vec![])],
        channels: vec![channel(0, joint, TargetPath::Translation)],
    });

    let context = BakeContext::bake(&scene).unwrap();
    let sequence = context.sequence(0, 0).unwrap();
    let keys = stream(&context, sequence.translation);
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].time, 0.0);
    assert_eq!(keys[0].data, [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(context.animations[0].duration, 0.0);
}

#[test]
fn baking_is_deterministic() {
    let scene = chain_scene();
    let first = BakeContext::bake(&scene).unwrap();
    let second = BakeContext::bake_with_config(
        &scene,
        &BakeConfig {
            track_log_limit: 0,
            keyframe_log_limit: 1,
        },
    )
    .unwrap();

    let first_bytes: &[u8] = bytemuck::cast_slice(&first.keyframes);
    let second_bytes: &[u8] = bytemuck::cast_slice(&second.keyframes);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.sequences, second.sequences);
}

// ============================================================================
// Animation catalog
// ============================================================================

#[test]
fn duration_is_latest_sampler_time() {
    let animation = Animation {
        name: None,
        samplers: vec![
            vec3_sampler(vec![0.0, 1.0], vec![Vec3::ZERO; 2]),
            vec3_sampler(vec![0.0, 2.5], vec![Vec3::ZERO; 2]),
            vec3_sampler(vec![0.3], vec![Vec3::ZERO]),
        ],
        channels: vec![],
    };
    assert!(approx(calculate_animation_duration(&animation), 2.5));
}

#[test]
fn sequences_are_laid_out_animation_major() {
    let mut scene = chain_scene();
    let extra = scene.add_node("extra", None, LocalTransform::default());
    scene.skins[0].joints.push(extra);
    let second = scene.animations[0].clone();
    scene.animations.push(Animation {
        name: None,
        ..second
    });

    let context = BakeContext::bake(&scene).unwrap();
    assert_eq!(context.joint_count(), 2);
    assert_eq!(context.sequences.len(), 4);
    assert_eq!(context.animations[0].sequence_index, 0);
    assert_eq!(context.animations[1].sequence_index, 2);
    assert_eq!(context.animations[0].name, "Walk");
    assert_eq!(context.animations[1].name, "animation_1");
    assert_eq!(context.sequence(1, 1), Some(&context.sequences[3]));
    assert_eq!(context.sequence(1, 2), None);
    assert_eq!(context.sequence(2, 0), None);
}

#[test]
fn empty_scene_bakes_nothing() {
    let context = BakeContext::bake(&SceneGraph::default()).unwrap();
    assert_eq!(context.joint_count(), 0);
    assert!(context.animations.is_empty());
    assert!(context.sequences.is_empty());
    assert!(context.keyframes.is_empty());
}

// ============================================================================
// Malformed scenes
// ============================================================================

#[test]
fn rejects_sampler_count_mismatch() {
    let mut scene = chain_scene();
    scene.animations[0].samplers[0] = vec3_sampler(vec![0.0, 1.0], vec![Vec3::ZERO]);
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::SamplerCountMismatch {
            inputs: 2,
            outputs: 1,
            expected: 2,
            ..
        })
    ));
}

#[test]
fn rejects_duplicate_channel() {
    let mut scene = chain_scene();
    scene.animations[0]
        .channels
        .push(channel(0, 2, TargetPath::Translation));
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::DuplicateChannel {
            node: 2,
            path: TargetPath::Translation,
            ..
        })
    ));
}

#[test]
fn rejects_wrong_output_kind() {
    let mut scene = chain_scene();
    scene.animations[0].channels[0].target_path = TargetPath::Rotation;
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::ChannelOutputMismatch {
            path: TargetPath::Rotation,
            found: "vec3",
            ..
        })
    ));
}

#[test]
fn rejects_unsorted_key_times() {
    let mut scene = chain_scene();
    scene.animations[0].samplers[0] = vec3_sampler(vec![0.0, 1.0, 1.0], vec![Vec3::Z; 3]);
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::UnsortedKeyTimes {
            animation: 0,
            sampler: 0,
        })
    ));
}

#[test]
fn rejects_unknown_sampler() {
    let mut scene = chain_scene();
    scene.animations[0].channels[0].sampler = 4;
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::UnknownSampler { sampler: 4, .. })
    ));
}

#[test]
fn rejects_unknown_node() {
    let mut scene = chain_scene();
    scene.skins[0].joints.push(7);
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::UnknownNode {
            node: 7,
            node_count: 3,
            ..
        })
    ));
}

#[test]
fn rejects_parent_cycle() {
    let mut scene = chain_scene();
    scene.nodes[0].parent = Some(2);
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::CyclicHierarchy { .. })
    ));
}

#[test]
fn rejects_bind_matrix_count_mismatch() {
    let mut scene = chain_scene();
    scene.skins[0].inverse_bind_matrices = Some(vec![Mat4::IDENTITY; 2]);
    assert!(matches!(
        BakeContext::bake(&scene),
        Err(BakeError::InverseBindMatrixCount {
            matrices: 2,
            joints: 1,
            ..
        })
    ));
}
