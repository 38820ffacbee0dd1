use std::env;
use std::path::Path;

use log::info;
use skeleton_bake::file_formats::skeletonfile::bake_skeletonfile;
use skeleton_bake::gltf_import::scene_from_gltf;
use skeleton_bake::BakeContext;

fn filename_without_extension(path: &str) -> Option<&str> {
    Path::new(path).file_stem().and_then(|s| s.to_str())
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("assets/Fox.glb");
    let output_root = args.get(2).map(String::as_str).unwrap_or("assets/local");
    let model_name = filename_without_extension(path).unwrap_or("model");

    let (gltf, buffers, _) = gltf::import(path)?;
    let scene = scene_from_gltf(&gltf, &buffers)?;
    let context = BakeContext::bake(&scene)?;

    let output_dir = Path::new(output_root).join(model_name);
    let json_path = bake_skeletonfile(&scene, &context, &output_dir, model_name)?;
    info!("wrote {}", json_path.display());

    Ok(())
}
