use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bake::BakeContext;
use crate::errors::Result;
use crate::keyframes::{Keyframe, Sequence};
use crate::scene::SceneGraph;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// column-major
    pub inverse_bind_matrix: [[f32; 4]; 4],
    /// -1 for roots
    pub parent_index: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub duration: f32,
    /// first entry of this animation in the sequence table
    pub sequence_index: u32,
}

/// Byte range in the binary buffer, plus the number of records in it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinRef {
    pub offset: u32,
    pub count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub joints: Vec<Joint>,
    pub animations: Vec<Animation>,
    /// `Sequence` records, `animation * joints.len() + joint`
    pub sequences: BinRef,
    /// `Keyframe` records
    pub keyframes: BinRef,
    pub buffer: String,
}

impl Skeleton {
    pub fn from_bake(scene: &SceneGraph, context: &BakeContext, buffer: &str) -> Self {
        let joints = context
            .joints
            .iter()
            .map(|joint| Joint {
                name: scene.node_name(joint.node),
                inverse_bind_matrix: joint.inverse_bind_matrix.to_cols_array_2d(),
                parent_index: joint.parent_index,
            })
            .collect();
        let animations = context
            .animations
            .iter()
            .map(|animation| Animation {
                name: animation.name.clone(),
                duration: animation.duration,
                sequence_index: animation.sequence_index,
            })
            .collect();

        let sequence_bytes = std::mem::size_of_val(context.sequences.as_slice());
        Skeleton {
            joints,
            animations,
            sequences: BinRef {
                offset: 0,
                count: context.sequences.len() as u32,
            },
            // sequence records are 4-byte aligned, so keyframes stay aligned too
            keyframes: BinRef {
                offset: sequence_bytes as u32,
                count: context.keyframes.len() as u32,
            },
            buffer: buffer.to_string(),
        }
    }
}

/// Sequence records followed by keyframe records, as raw bytes.
pub fn binary_buffer(context: &BakeContext) -> Vec<u8> {
    let sequences: &[u8] = bytemuck::cast_slice(&context.sequences);
    let keyframes: &[u8] = bytemuck::cast_slice(&context.keyframes);
    sequences.iter().chain(keyframes.iter()).copied().collect()
}

/// Reads back the records a [`Skeleton`] references.
pub fn read_binary_buffer(skeleton: &Skeleton, bytes: &[u8]) -> Option<(Vec<Sequence>, Vec<Keyframe>)> {
    let sequences = bin_slice(bytes, skeleton.sequences, std::mem::size_of::<Sequence>())?;
    let keyframes = bin_slice(bytes, skeleton.keyframes, std::mem::size_of::<Keyframe>())?;
    Some((
        sequences
            .chunks_exact(std::mem::size_of::<Sequence>())
            .map(bytemuck::pod_read_unaligned)
            .collect(),
        keyframes
            .chunks_exact(std::mem::size_of::<Keyframe>())
            .map(bytemuck::pod_read_unaligned)
            .collect(),
    ))
}

fn bin_slice(bytes: &[u8], bin_ref: BinRef, record_size: usize) -> Option<&[u8]> {
    let start = bin_ref.offset as usize;
    bytes.get(start..start + bin_ref.count as usize * record_size)
}

/// Writes `<dir>/<model>.skeleton.json` and `<dir>/<model>.keyframes.bin`,
/// returning the JSON path.
pub fn bake_skeletonfile(
    scene: &SceneGraph,
    context: &BakeContext,
    output_dir: &Path,
    model_name: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let json_path = output_dir.join(format!("{}.skeleton.json", model_name));
    let binary_path = output_dir.join(format!("{}.keyframes.bin", model_name));

    let skeleton = Skeleton::from_bake(scene, context, &binary_path.to_string_lossy());

    let mut binary_file = File::create(&binary_path)?;
    binary_file.write_all(&binary_buffer(context))?;

    let json = serde_json::to_string_pretty(&skeleton)?;
    fs::write(&json_path, json)?;

    Ok(json_path)
}
