use glam::{Mat3, Mat4, Quat, Vec3};

use crate::errors::{BakeError, Result};
use crate::scene::{LocalTransform, SceneGraph};

/// Scale components closer to zero than this are clamped so that every
/// composed transform stays invertible.
pub const MIN_SCALE: f32 = 1e-4;

/// Decomposed translation / rotation / scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Trs {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Trs {
    /// `T * R * S`, with near-zero scale clamped to [`MIN_SCALE`].
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            clamp_scale(self.scale),
            self.rotation,
            self.translation,
        )
    }

    /// Decomposes `matrix`. Axes of zero length keep a zero scale and get a
    /// direction completed from the remaining axes, so the rotation is always
    /// a finite unit quaternion.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let axes = matrix_axes(matrix);
        let units = axes.map(|axis| axis.try_normalize());
        if units.iter().all(Option::is_some) {
            let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
            return Trs {
                translation,
                rotation: rotation.normalize(),
                scale,
            };
        }

        let rotation = complete_basis(units)
            .map_or(Quat::IDENTITY, |[x, y, z]| {
                Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
            });
        Trs {
            translation: matrix.w_axis.truncate(),
            rotation,
            scale: Vec3::new(axes[0].length(), axes[1].length(), axes[2].length()),
        }
    }
}

fn matrix_axes(matrix: &Mat4) -> [Vec3; 3] {
    [
        matrix.x_axis.truncate(),
        matrix.y_axis.truncate(),
        matrix.z_axis.truncate(),
    ]
}

/// Fills the missing axes of a right-handed basis. `None` when every axis is
/// missing.
fn complete_basis(units: [Option<Vec3>; 3]) -> Option<[Vec3; 3]> {
    let k = units.iter().position(Option::is_some)?;
    let a = units[k]?;
    let (i1, i2) = ((k + 1) % 3, (k + 2) % 3);

    // e[k+1] = e[k+2] x e[k], e[k+2] = e[k] x e[k+1]
    let b = units[i1].unwrap_or_else(|| match units[i2] {
        Some(c) => c.cross(a).try_normalize().unwrap_or_else(|| a.any_orthonormal_vector()),
        None => a.any_orthonormal_vector(),
    });
    let c = units[i2].unwrap_or_else(|| a.cross(b).normalize_or_zero());

    let mut basis = [Vec3::ZERO; 3];
    basis[k] = a;
    basis[i1] = b;
    basis[i2] = c;
    Some(basis)
}

pub fn clamp_scale(scale: Vec3) -> Vec3 {
    Vec3::from_array(scale.to_array().map(|s| if s.abs() < MIN_SCALE { MIN_SCALE } else { s }))
}

impl LocalTransform {
    /// Matrix nodes with an axis shorter than [`MIN_SCALE`] are rebuilt from
    /// their clamped decomposition; any other matrix is used as authored.
    pub fn to_matrix(&self) -> Mat4 {
        match self {
            LocalTransform::Matrix(matrix) => {
                if matrix_axes(matrix)
                    .iter()
                    .all(|axis| axis.length() >= MIN_SCALE)
                {
                    *matrix
                } else {
                    self.to_trs().to_matrix()
                }
            }
            LocalTransform::Trs {
                translation,
                rotation,
                scale,
            } => Trs {
                translation: *translation,
                rotation: *rotation,
                scale: *scale,
            }
            .to_matrix(),
        }
    }

    /// The rest pose as TRS. Matrix nodes are decomposed, with the scale
    /// clamped.
    pub fn to_trs(&self) -> Trs {
        match self {
            LocalTransform::Matrix(matrix) => {
                let trs = Trs::from_matrix(matrix);
                Trs {
                    scale: clamp_scale(trs.scale),
                    ..trs
                }
            }
            LocalTransform::Trs {
                translation,
                rotation,
                scale,
            } => Trs {
                translation: *translation,
                rotation: *rotation,
                scale: *scale,
            },
        }
    }
}

/// Model-space transform of `node`: the product of all local transforms from
/// the root down to the node itself.
pub fn global_node_transform(scene: &SceneGraph, node: usize) -> Result<Mat4> {
    let node_count = scene.nodes.len();
    let mut transform = Mat4::IDENTITY;
    let mut current = Some(node);
    let mut steps = 0;
    while let Some(idx) = current {
        let n = scene.nodes.get(idx).ok_or_else(|| BakeError::UnknownNode {
            context: format!("global transform of node {}", node),
            node: idx,
            node_count,
        })?;
        transform = n.transform.to_matrix() * transform;
        current = n.parent;

        steps += 1;
        if steps > node_count {
            return Err(BakeError::CyclicHierarchy { node });
        }
    }
    Ok(transform)
}

/// Keeps `rotation` on the same hemisphere as `reference`.
pub fn align_hemisphere(rotation: Quat, reference: Quat) -> Quat {
    if rotation.dot(reference) < 0.0 {
        -rotation
    } else {
        rotation
    }
}
