//! Impostor bake command
//!
//! Usage: `bake_impostor [config.toml|config.ron]`
//!
//! Loads the configuration (defaults when no path is given), loads the OBJ
//! model it names or builds a sample tree, bakes it and writes the bundle to
//! the output directory.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use impostor_baker::foundation::logging;
use impostor_baker::prelude::*;

/// Settings of the bake command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct BakeAppConfig {
    /// OBJ model to bake; the sample tree when unset
    model_path: Option<String>,
    /// Directory the bundle is written to
    output_dir: String,
    /// Base name of every written asset
    asset_name: String,
    /// Bake settings
    bake: BakeConfiguration,
}

impl Default for BakeAppConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            output_dir: "baked".to_string(),
            asset_name: "impostor".to_string(),
            bake: BakeConfiguration::default(),
        }
    }
}

impl Config for BakeAppConfig {}

/// Trunk plus a two-tier canopy, offset from the origin so the pivot matters
fn sample_tree() -> SourceNode {
    let bark = Material::lit("bark", Vec4::new(0.45, 0.3, 0.15, 1.0));
    let leaves = Material::lit("leaves", Vec4::new(0.2, 0.55, 0.2, 1.0));

    SourceNode::new("sample_tree")
        .with_position(Vec3::new(12.0, 0.0, -4.0))
        .with_child(
            SourceNode::new("trunk")
                .with_position(Vec3::new(0.0, 1.5, 0.0))
                .with_drawable(Drawable::single(
                    Arc::new(Mesh::cuboid(Vec3::new(0.25, 1.5, 0.25))),
                    bark,
                )),
        )
        .with_child(
            SourceNode::new("canopy")
                .with_position(Vec3::new(0.0, 3.5, 0.0))
                .with_drawable(Drawable::single(
                    Arc::new(Mesh::cuboid(Vec3::new(1.5, 1.0, 1.2))),
                    leaves.clone(),
                ))
                .with_child(
                    SourceNode::new("crown")
                        .with_transform(Transform::from_position_rotation(
                            Vec3::new(0.3, 1.4, 0.0),
                            Quat::from_axis_angle(&Vec3::y_axis(), 0.6),
                        ))
                        .with_drawable(Drawable::single(
                            Arc::new(Mesh::cuboid(Vec3::new(0.8, 0.6, 0.8))),
                            leaves,
                        )),
                ),
        )
}

/// Source object for the configured model, falling back to the sample tree
fn load_source(config: &BakeAppConfig) -> SourceNode {
    let Some(model_path) = &config.model_path else {
        log::info!("No model configured, baking the sample tree");
        return sample_tree();
    };

    match ObjLoader::load_model(model_path) {
        Ok(model) => {
            let materials = model
                .material_names
                .iter()
                .map(|name| Material::lit(name.clone(), Vec4::new(0.8, 0.8, 0.8, 1.0)))
                .collect();
            log::info!(
                "Loaded {} with {} vertices in {} material groups",
                model_path,
                model.mesh.vertices.len(),
                model.material_names.len()
            );
            SourceNode::new(config.asset_name.clone())
                .with_drawable(Drawable::new(Arc::new(model.mesh), materials))
        }
        Err(e) => {
            log::warn!("Failed to load {}: {}, using the sample tree", model_path, e);
            sample_tree()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            BakeAppConfig::load_from_file(&path)?
        }
        None => BakeAppConfig::default(),
    };
    log::debug!("Configuration: {:?}", config);

    let source = load_source(&config);
    let mut pipeline = BakePipeline::new(SoftwareRasterizer::new());
    let output = match pipeline.bake(Some(&source), &config.bake) {
        Ok(output) => output,
        Err(e) => {
            log::error!("Bake failed: {}", e);
            return Err(e.into());
        }
    };
    log::info!(
        "Billboard {:.3} wide, {:.3} high, bottom at {:.3}",
        output.parameters.width,
        output.parameters.height,
        output.parameters.bottom
    );

    let mut store = DirectoryAssetStore::new(Path::new(&config.output_dir))?;
    let bundle = persist_bundle(output, &config.bake, &config.asset_name, &mut store)?;
    if let Some(path) = store.path_of(bundle.asset) {
        log::info!("Impostor written to {:?}", path);
    }

    Ok(())
}
