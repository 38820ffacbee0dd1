//! Bakes the joint skeleton and keyframe animations of a glTF scene into a
//! compact runtime form.
//!
//! Only nodes a runtime needs to evaluate (skinning joints, animated nodes
//! and the dynamic mesh attachments) survive as joints. Transforms of the
//! nodes that are dropped are folded into each surviving joint's
//! pre-transform, bind matrix and keyframes.

pub mod analyzer;
pub mod animations;
pub mod bake;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod file_formats;
pub mod gltf_import;
pub mod joints;
pub mod keyframes;
pub mod sampler;
pub mod scene;
pub mod transform;

pub use bake::BakeContext;
pub use config::BakeConfig;
pub use errors::{BakeError, Result};
pub use keyframes::{Keyframe, KeyframeRange, Sequence};
pub use scene::SceneGraph;
