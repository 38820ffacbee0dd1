//! Converts a glTF document into a [`SceneGraph`].
//!
//! Accessor data is read straight from the buffers, including sparse
//! substitution. Rotation and weight outputs may also be normalized integers;
//! everything else must be float.

use glam::{Mat4, Quat, Vec3};
use gltf::accessor::{sparse::IndexType, DataType, Dimensions};
use gltf::Document;
use log::{info, warn};

use crate::errors::{BakeError, Result};
use crate::scene::{
    Animation, Channel, Interpolation, LocalTransform, Sampler, SamplerOutput, SceneGraph,
    SceneNode, Skin, TargetPath,
};

pub fn transform_to_local(transform: gltf::scene::Transform) -> LocalTransform {
    match transform {
        gltf::scene::Transform::Matrix { matrix } => {
            LocalTransform::Matrix(Mat4::from_cols_array_2d(&matrix))
        }
        gltf::scene::Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => LocalTransform::Trs {
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
        },
    }
}

pub fn scene_from_gltf(gltf: &Document, buffers: &[gltf::buffer::Data]) -> Result<SceneGraph> {
    let mut nodes: Vec<SceneNode> = gltf
        .nodes()
        .map(|node| SceneNode {
            name: node.name().map(|name| name.to_string()),
            parent: None,
            transform: transform_to_local(node.transform()),
            mesh: node.mesh().map(|mesh| mesh.index()),
        })
        .collect();
    for node in gltf.nodes() {
        for child in node.children() {
            nodes[child.index()].parent = Some(node.index());
        }
    }

    let mut skins = vec![];
    for skin in gltf.skins() {
        let inverse_bind_matrices = match skin.inverse_bind_matrices() {
            Some(accessor) => Some(
                read_mat4(&accessor, buffers)?
                    .iter()
                    .map(Mat4::from_cols_array_2d)
                    .collect(),
            ),
            None => {
                warn!(
                    "skin {} has no inverseBindMatrices, using identity",
                    skin.index()
                );
                None
            }
        };
        skins.push(Skin {
            name: skin.name().map(|name| name.to_string()),
            skeleton: skin.skeleton().map(|node| node.index()),
            joints: skin.joints().map(|joint| joint.index()).collect(),
            inverse_bind_matrices,
        });
    }

    let mut animations = vec![];
    for animation in gltf.animations() {
        let mut samplers = vec![];
        for sampler in animation.samplers() {
            samplers.push(Sampler {
                input: readf32(&sampler.input(), buffers)?,
                output: read_sampler_output(&sampler.output(), buffers)?,
                interpolation: match sampler.interpolation() {
                    gltf::animation::Interpolation::Linear => Interpolation::Linear,
                    gltf::animation::Interpolation::Step => Interpolation::Step,
                    gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
                },
            });
        }
        let channels = animation
            .channels()
            .map(|channel| {
                let target = channel.target();
                Channel {
                    sampler: channel.sampler().index(),
                    target_node: target.node().index(),
                    target_path: match target.property() {
                        gltf::animation::Property::Translation => TargetPath::Translation,
                        gltf::animation::Property::Rotation => TargetPath::Rotation,
                        gltf::animation::Property::Scale => TargetPath::Scale,
                        gltf::animation::Property::MorphTargetWeights => TargetPath::Weights,
                    },
                }
            })
            .collect();
        animations.push(Animation {
            name: animation.name().map(|name| name.to_string()),
            samplers,
            channels,
        });
    }

    info!(
        "imported {} nodes, {} skins, {} animations",
        nodes.len(),
        skins.len(),
        animations.len()
    );

    Ok(SceneGraph {
        nodes,
        skins,
        animations,
    })
}

fn read_sampler_output(
    accessor: &gltf::Accessor,
    buffers: &[gltf::buffer::Data],
) -> Result<SamplerOutput> {
    Ok(match accessor.dimensions() {
        Dimensions::Vec3 => SamplerOutput::Vec3(
            read3f32(accessor, buffers)?
                .into_iter()
                .map(Vec3::from)
                .collect(),
        ),
        Dimensions::Vec4 => {
            check_sampler_layout(accessor, Dimensions::Vec4, "f32 or normalized vec4")?;
            SamplerOutput::Quat(
                read_components::<4>(accessor, buffers)?
                    .into_iter()
                    .map(Quat::from_array)
                    .collect(),
            )
        }
        _ => {
            check_sampler_layout(accessor, Dimensions::Scalar, "f32 or normalized scalar")?;
            SamplerOutput::Scalar(
                read_components::<1>(accessor, buffers)?
                    .into_iter()
                    .map(|[v]| v)
                    .collect(),
            )
        }
    })
}

fn unsupported(accessor: &gltf::Accessor, expected: &'static str) -> BakeError {
    BakeError::UnsupportedAccessor {
        accessor: accessor.index(),
        expected,
        found: format!("{:?} {:?}", accessor.data_type(), accessor.dimensions()),
    }
}

fn check_layout(
    accessor: &gltf::Accessor,
    dimensions: Dimensions,
    expected: &'static str,
) -> Result<()> {
    if accessor.data_type() != DataType::F32 || accessor.dimensions() != dimensions {
        return Err(unsupported(accessor, expected));
    }
    Ok(())
}

/// Rotation and weight outputs: float, or a normalized 8/16 bit integer.
fn check_sampler_layout(
    accessor: &gltf::Accessor,
    dimensions: Dimensions,
    expected: &'static str,
) -> Result<()> {
    let normalized_int = accessor.normalized()
        && matches!(
            accessor.data_type(),
            DataType::I8 | DataType::U8 | DataType::I16 | DataType::U16
        );
    if (accessor.data_type() != DataType::F32 && !normalized_int)
        || accessor.dimensions() != dimensions
    {
        return Err(unsupported(accessor, expected));
    }
    Ok(())
}

fn read_error(accessor: &gltf::Accessor, reason: &str) -> BakeError {
    BakeError::AccessorRead {
        accessor: accessor.index(),
        reason: reason.to_string(),
    }
}

fn buffer_bytes<'b>(
    accessor: &gltf::Accessor,
    buffers: &'b [gltf::buffer::Data],
    buffer_index: usize,
) -> Result<&'b [u8]> {
    buffers
        .get(buffer_index)
        .map(|data| data.0.as_slice())
        .ok_or_else(|| read_error(accessor, "buffer is not loaded"))
}

fn copy_range(
    accessor: &gltf::Accessor,
    dst: &mut [u8],
    src: &[u8],
    start: usize,
) -> Result<()> {
    let bytes = src
        .get(start..start + dst.len())
        .ok_or_else(|| read_error(accessor, "reads past the end of its buffer"))?;
    dst.copy_from_slice(bytes);
    Ok(())
}

fn read_accessor_data(accessor: &gltf::Accessor, buffers: &[gltf::buffer::Data]) -> Result<Vec<u8>> {
    let count = accessor.count();
    let elem_size = accessor.size();

    let mut data = vec![0u8; count * elem_size];

    if let Some(view) = accessor.view() {
        let buffer = buffer_bytes(accessor, buffers, view.buffer().index())?;
        let stride = view.stride().unwrap_or(elem_size);
        let base = view.offset() + accessor.offset();

        for i in 0..count {
            let dst = i * elem_size;
            copy_range(accessor, &mut data[dst..dst + elem_size], buffer, base + i * stride)?;
        }
    } else if accessor.sparse().is_none() {
        return Err(read_error(accessor, "has no buffer view and is not sparse"));
    }

    if let Some(sparse) = accessor.sparse() {
        let indices = sparse.indices();
        let indices_view = indices.view();
        let indices_buffer = buffer_bytes(accessor, buffers, indices_view.buffer().index())?;
        let indices_offset = indices_view.offset() + indices.offset() as usize;
        let index_size = match indices.index_type() {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        };
        let indices_stride = indices_view.stride().unwrap_or(index_size);

        let values = sparse.values();
        let values_view = values.view();
        let values_buffer = buffer_bytes(accessor, buffers, values_view.buffer().index())?;
        let values_offset = values_view.offset() + values.offset() as usize;
        let values_stride = values_view.stride().unwrap_or(elem_size);

        for i in 0..sparse.count() {
            let mut raw = [0u8; 4];
            copy_range(
                accessor,
                &mut raw[..index_size],
                indices_buffer,
                indices_offset + i * indices_stride,
            )?;
            let index = u32::from_le_bytes(raw) as usize;
            if index >= count {
                return Err(read_error(accessor, "sparse index out of range"));
            }

            let dst = index * elem_size;
            copy_range(
                accessor,
                &mut data[dst..dst + elem_size],
                values_buffer,
                values_offset + i * values_stride,
            )?;
        }
    }

    Ok(data)
}

/// Signed values clamp at -1 so the most negative integer still maps to -1.
fn normalized_component(data_type: DataType, bytes: &[u8]) -> f32 {
    match data_type {
        DataType::I8 => (bytemuck::pod_read_unaligned::<i8>(bytes) as f32 / 127.0).max(-1.0),
        DataType::U8 => bytes[0] as f32 / 255.0,
        DataType::I16 => (bytemuck::pod_read_unaligned::<i16>(bytes) as f32 / 32767.0).max(-1.0),
        DataType::U16 => bytemuck::pod_read_unaligned::<u16>(bytes) as f32 / 65535.0,
        DataType::U32 => bytemuck::pod_read_unaligned::<u32>(bytes) as f32 / u32::MAX as f32,
        DataType::F32 => bytemuck::pod_read_unaligned(bytes),
    }
}

fn read_components<const N: usize>(
    accessor: &gltf::Accessor,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<[f32; N]>> {
    let data_type = accessor.data_type();
    let size = data_type.size();
    let data = read_accessor_data(accessor, buffers)?;
    Ok(data
        .chunks_exact(N * size)
        .map(|element| {
            std::array::from_fn(|c| normalized_component(data_type, &element[c * size..(c + 1) * size]))
        })
        .collect())
}

pub fn readf32(accessor: &gltf::Accessor, buffers: &[gltf::buffer::Data]) -> Result<Vec<f32>> {
    check_layout(accessor, Dimensions::Scalar, "f32 scalar")?;
    Ok(read_components::<1>(accessor, buffers)?
        .into_iter()
        .map(|[v]| v)
        .collect())
}

pub fn read3f32(accessor: &gltf::Accessor, buffers: &[gltf::buffer::Data]) -> Result<Vec<[f32; 3]>> {
    check_layout(accessor, Dimensions::Vec3, "f32 vec3")?;
    read_components::<3>(accessor, buffers)
}

/// Column-major, as stored in glTF.
pub fn read_mat4(
    accessor: &gltf::Accessor,
    buffers: &[gltf::buffer::Data],
) -> Result<Vec<[[f32; 4]; 4]>> {
    check_layout(accessor, Dimensions::Mat4, "f32 mat4")?;
    Ok(read_components::<16>(accessor, buffers)?
        .into_iter()
        .map(|m| std::array::from_fn(|col| std::array::from_fn(|row| m[col * 4 + row])))
        .collect())
}
