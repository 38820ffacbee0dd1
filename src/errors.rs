//! Error types for the bake pipeline.
//!
//! Every failure here means the input scene is malformed. Nothing is retried
//! and nothing is silently corrected: a broken skeleton would end up baked
//! into the asset.

use thiserror::Error;

use crate::scene::TargetPath;

#[derive(Error, Debug)]
pub enum BakeError {
    // ========================================================================
    // Hierarchy
    // ========================================================================
    /// A node reference (parent, skin joint, skeleton root, channel target)
    /// points outside the node list.
    #[error("{context} references node {node}, but the scene only has {node_count} nodes")]
    UnknownNode {
        context: String,
        node: usize,
        node_count: usize,
    },

    /// Walking up the parent chain from `node` never reaches a root.
    #[error("node {node} is part of a parent cycle")]
    CyclicHierarchy { node: usize },

    // ========================================================================
    // Skins
    // ========================================================================
    #[error("node {node} is flagged as a joint but no skin lists it")]
    MissingSkinForJoint { node: usize },

    #[error("skin {skin} has no joints and no skeleton root")]
    MissingSkeletonRoot { skin: usize },

    #[error("skin {skin} has {matrices} inverse bind matrices for {joints} joints")]
    InverseBindMatrixCount {
        skin: usize,
        matrices: usize,
        joints: usize,
    },

    // ========================================================================
    // Animations
    // ========================================================================
    #[error("animation {animation} channel {channel} uses sampler {sampler}, which does not exist")]
    UnknownSampler {
        animation: usize,
        channel: usize,
        sampler: usize,
    },

    #[error("animation {animation} has more than one {path:?} channel for node {node}")]
    DuplicateChannel {
        animation: usize,
        node: usize,
        path: TargetPath,
    },

    #[error(
        "animation {animation} sampler {sampler} has {inputs} inputs but {outputs} outputs (expected {expected})"
    )]
    SamplerCountMismatch {
        animation: usize,
        sampler: usize,
        inputs: usize,
        outputs: usize,
        expected: usize,
    },

    #[error("animation {animation} sampler {sampler} has key times that are not strictly increasing")]
    UnsortedKeyTimes { animation: usize, sampler: usize },

    #[error("animation {animation} channel {channel} targets {path:?} but its sampler holds {found} values")]
    ChannelOutputMismatch {
        animation: usize,
        channel: usize,
        path: TargetPath,
        found: &'static str,
    },

    // ========================================================================
    // Input reading
    // ========================================================================
    #[error("accessor {accessor}: expected {expected}, found {found}")]
    UnsupportedAccessor {
        accessor: usize,
        expected: &'static str,
        found: String,
    },

    #[error("accessor {accessor}: {reason}")]
    AccessorRead { accessor: usize, reason: String },

    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    // ========================================================================
    // Output
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BakeError>;
