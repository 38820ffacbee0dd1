//! Read-only scene description consumed by the bake.
//!
//! This is the shape a format importer (see [`crate::gltf_import`]) hands
//! over: a flat node list with parent links, skins and keyframe animations.
//! Nodes are referenced by their index in [`SceneGraph::nodes`].

use glam::{Mat4, Quat, Vec3};

/// A node's transform relative to its parent. Either an explicit matrix or
/// separate TRS components, never both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalTransform {
    Matrix(Mat4),
    Trs {
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
}

impl Default for LocalTransform {
    fn default() -> Self {
        LocalTransform::Trs {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        LocalTransform::Trs {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: Option<String>,
    pub parent: Option<usize>,
    pub transform: LocalTransform,
    /// Index of the attached mesh, if any. Only its presence matters here.
    pub mesh: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct Skin {
    pub name: Option<String>,
    /// Explicit skeleton root. When absent the shallowest joint is used.
    pub skeleton: Option<usize>,
    pub joints: Vec<usize>,
    /// One joint-to-skin bind matrix per entry of `joints`. `None` means
    /// identity for every joint.
    pub inverse_bind_matrices: Option<Vec<Mat4>>,
}

/// Which property of the target node a channel drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    /// Morph target weights. Makes the node count as animated, otherwise ignored.
    Weights,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    /// Outputs are stored as `(in_tangent, value, out_tangent)` triples.
    CubicSpline,
}

#[derive(Clone, Debug)]
pub enum SamplerOutput {
    Vec3(Vec<Vec3>),
    Quat(Vec<Quat>),
    Scalar(Vec<f32>),
}

impl SamplerOutput {
    pub fn len(&self) -> usize {
        match self {
            SamplerOutput::Vec3(values) => values.len(),
            SamplerOutput::Quat(values) => values.len(),
            SamplerOutput::Scalar(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SamplerOutput::Vec3(_) => "vec3",
            SamplerOutput::Quat(_) => "quaternion",
            SamplerOutput::Scalar(_) => "scalar",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Sampler {
    /// Keyframe times in seconds, ascending.
    pub input: Vec<f32>,
    pub output: SamplerOutput,
    pub interpolation: Interpolation,
}

#[derive(Clone, Copy, Debug)]
pub struct Channel {
    pub sampler: usize,
    pub target_node: usize,
    pub target_path: TargetPath,
}

#[derive(Clone, Debug, Default)]
pub struct Animation {
    pub name: Option<String>,
    pub samplers: Vec<Sampler>,
    pub channels: Vec<Channel>,
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    pub nodes: Vec<SceneNode>,
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
}

impl SceneGraph {
    /// Appends a node and returns its index.
    pub fn add_node(
        &mut self,
        name: &str,
        parent: Option<usize>,
        transform: LocalTransform,
    ) -> usize {
        self.nodes.push(SceneNode {
            name: Some(name.to_string()),
            parent,
            transform,
            mesh: None,
        });
        self.nodes.len() - 1
    }

    /// Children of `node` in node-index order, derived from the parent links.
    pub fn children(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(node))
            .map(|(idx, _)| idx)
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(idx, _)| idx)
    }

    pub fn node_name(&self, node: usize) -> String {
        self.nodes
            .get(node)
            .and_then(|n| n.name.clone())
            .unwrap_or_else(|| format!("node_{}", node))
    }
}
