//! Bake output persistence
//!
//! The pipeline hands its bundle to an [`AssetPersistence`] implementation and
//! owns nothing afterwards. [`persist_bundle`] applies the packing policy of a
//! [`BakeConfiguration`]:
//!
//! - packed: one [`BillboardAsset`] embedding both atlases and the material
//! - separate: atlases and material stored on their own, plus an asset that
//!   references them; with `export_as_encoded_file` the atlases are also
//!   written as `<name>_color.png` and `<name>_normal.png`
//!
//! Two stores ship with the crate: [`MemoryAssetStore`] keeps everything in
//! slot maps, [`DirectoryAssetStore`] writes PNG and RON files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::assets::image_io;
use crate::bake::atlas::AtlasImage;
use crate::bake::geometry::{BillboardGeometry, BillboardParameters};
use crate::bake::pipeline::{BakeOutput, BillboardMaterialDescriptor};
use crate::config::BakeConfiguration;
use crate::foundation::collections::{HandleMap, TypedHandle};

/// Handle to a stored asset
pub type AssetHandle<T> = TypedHandle<T>;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding failed
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Asset serialization failed
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A handle does not belong to this store
    #[error("Unknown asset handle: {0}")]
    UnknownHandle(String),
}

/// A part of a billboard asset, either inline or stored separately
#[derive(Debug, Clone, PartialEq)]
pub enum AssetRef<T> {
    /// Stored inside the container asset
    Embedded(T),
    /// Stored as its own asset
    Stored(AssetHandle<T>),
}

impl<T> AssetRef<T> {
    /// True for inline parts
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

/// Billboard container asset
#[derive(Debug, Clone, PartialEq)]
pub struct BillboardAsset {
    /// Asset name
    pub name: String,
    /// Color atlas
    pub color_atlas: AssetRef<AtlasImage>,
    /// Normal atlas
    pub normal_atlas: AssetRef<AtlasImage>,
    /// Billboard material
    pub material: AssetRef<BillboardMaterialDescriptor>,
    /// Quad topology and UV rectangles
    pub geometry: BillboardGeometry,
    /// Quad size and offset
    pub parameters: BillboardParameters,
}

/// Storage backend for bake results
pub trait AssetPersistence {
    /// Store an atlas image
    fn store_image(
        &mut self,
        name: &str,
        image: &AtlasImage,
    ) -> Result<AssetHandle<AtlasImage>, PersistenceError>;

    /// Store a billboard material
    fn store_material(
        &mut self,
        name: &str,
        material: &BillboardMaterialDescriptor,
    ) -> Result<AssetHandle<BillboardMaterialDescriptor>, PersistenceError>;

    /// Store a billboard asset, taking ownership
    fn store_asset(
        &mut self,
        asset: BillboardAsset,
    ) -> Result<AssetHandle<BillboardAsset>, PersistenceError>;

    /// Write an atlas as an encoded image file
    fn export_encoded(&mut self, image: &AtlasImage, path: &Path) -> Result<(), PersistenceError>;
}

/// Handles produced by [`persist_bundle`]
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedBundle {
    /// The billboard asset
    pub asset: AssetHandle<BillboardAsset>,
    /// Separately stored color atlas
    pub color_atlas: Option<AssetHandle<AtlasImage>>,
    /// Separately stored normal atlas
    pub normal_atlas: Option<AssetHandle<AtlasImage>>,
    /// Separately stored material
    pub material: Option<AssetHandle<BillboardMaterialDescriptor>>,
    /// Encoded image files written
    pub exported: Vec<PathBuf>,
}

/// Hand a bake bundle to `persistence` following the configured policy
pub fn persist_bundle<P: AssetPersistence + ?Sized>(
    output: BakeOutput,
    config: &BakeConfiguration,
    name: &str,
    persistence: &mut P,
) -> Result<PersistedBundle, PersistenceError> {
    if config.pack_assets {
        let asset = persistence.store_asset(BillboardAsset {
            name: name.to_string(),
            color_atlas: AssetRef::Embedded(output.color_atlas),
            normal_atlas: AssetRef::Embedded(output.normal_atlas),
            material: AssetRef::Embedded(output.material),
            geometry: output.geometry,
            parameters: output.parameters,
        })?;
        log::info!("Stored packed billboard asset '{}'", name);
        return Ok(PersistedBundle {
            asset,
            color_atlas: None,
            normal_atlas: None,
            material: None,
            exported: Vec::new(),
        });
    }

    let color = persistence.store_image(&format!("{name}_color_atlas"), &output.color_atlas)?;
    let normal = persistence.store_image(&format!("{name}_normal_atlas"), &output.normal_atlas)?;

    let mut exported = Vec::new();
    if config.wants_encoded_export() {
        for (image, suffix) in [(&output.color_atlas, "color"), (&output.normal_atlas, "normal")] {
            let path = PathBuf::from(format!("{name}_{suffix}.png"));
            persistence.export_encoded(image, &path)?;
            exported.push(path);
        }
    }

    let material = persistence.store_material(&format!("{name}_material"), &output.material)?;
    let asset = persistence.store_asset(BillboardAsset {
        name: name.to_string(),
        color_atlas: AssetRef::Stored(color),
        normal_atlas: AssetRef::Stored(normal),
        material: AssetRef::Stored(material),
        geometry: output.geometry,
        parameters: output.parameters,
    })?;
    log::info!(
        "Stored billboard asset '{}' with separate atlases ({} exported files)",
        name,
        exported.len()
    );

    Ok(PersistedBundle {
        asset,
        color_atlas: Some(color),
        normal_atlas: Some(normal),
        material: Some(material),
        exported,
    })
}

/// In-memory asset store
#[derive(Default)]
pub struct MemoryAssetStore {
    images: HandleMap<(String, AtlasImage)>,
    materials: HandleMap<(String, BillboardMaterialDescriptor)>,
    assets: HandleMap<BillboardAsset>,
    exports: Vec<(PathBuf, Vec<u8>)>,
}

impl MemoryAssetStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored image by handle
    pub fn image(&self, handle: AssetHandle<AtlasImage>) -> Option<&AtlasImage> {
        self.images.get(handle.key()).map(|(_, image)| image)
    }

    /// Stored material by handle
    pub fn material(
        &self,
        handle: AssetHandle<BillboardMaterialDescriptor>,
    ) -> Option<&BillboardMaterialDescriptor> {
        self.materials.get(handle.key()).map(|(_, material)| material)
    }

    /// Stored asset by handle
    pub fn asset(&self, handle: AssetHandle<BillboardAsset>) -> Option<&BillboardAsset> {
        self.assets.get(handle.key())
    }

    /// Number of separately stored images
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Number of separately stored materials
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Number of stored billboard assets
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Encoded exports as `(path, PNG bytes)`, in export order
    pub fn exports(&self) -> &[(PathBuf, Vec<u8>)] {
        &self.exports
    }
}

impl AssetPersistence for MemoryAssetStore {
    fn store_image(
        &mut self,
        name: &str,
        image: &AtlasImage,
    ) -> Result<AssetHandle<AtlasImage>, PersistenceError> {
        Ok(TypedHandle::new(self.images.insert((name.to_string(), image.clone()))))
    }

    fn store_material(
        &mut self,
        name: &str,
        material: &BillboardMaterialDescriptor,
    ) -> Result<AssetHandle<BillboardMaterialDescriptor>, PersistenceError> {
        Ok(TypedHandle::new(self.materials.insert((name.to_string(), material.clone()))))
    }

    fn store_asset(
        &mut self,
        asset: BillboardAsset,
    ) -> Result<AssetHandle<BillboardAsset>, PersistenceError> {
        for atlas in [&asset.color_atlas, &asset.normal_atlas] {
            if let AssetRef::Stored(handle) = atlas {
                if !self.images.contains_key(handle.key()) {
                    return Err(PersistenceError::UnknownHandle(format!("{:?}", handle)));
                }
            }
        }
        if let AssetRef::Stored(handle) = &asset.material {
            if !self.materials.contains_key(handle.key()) {
                return Err(PersistenceError::UnknownHandle(format!("{:?}", handle)));
            }
        }
        Ok(TypedHandle::new(self.assets.insert(asset)))
    }

    fn export_encoded(&mut self, image: &AtlasImage, path: &Path) -> Result<(), PersistenceError> {
        let bytes = image_io::encode_png(image.pixels())?;
        self.exports.push((path.to_path_buf(), bytes));
        Ok(())
    }
}

/// Serialized form of an inline atlas
#[derive(Serialize)]
struct EmbeddedImageRecord {
    tile_width: u32,
    tile_height: u32,
    png: Vec<u8>,
}

/// Serialized form of an asset part
#[derive(Serialize)]
enum RecordRef<T> {
    Embedded(T),
    File(String),
}

/// Serialized form of a [`BillboardAsset`]
#[derive(Serialize)]
struct BillboardAssetRecord {
    name: String,
    color_atlas: RecordRef<EmbeddedImageRecord>,
    normal_atlas: RecordRef<EmbeddedImageRecord>,
    material: RecordRef<BillboardMaterialDescriptor>,
    geometry: BillboardGeometry,
    parameters: BillboardParameters,
}

/// Asset store writing files under a root directory
///
/// Images become `<name>.png`, materials `<name>.material.ron` and billboard
/// assets `<name>.impostor.ron`. Packed assets embed their atlases as PNG
/// bytes inside the RON file.
pub struct DirectoryAssetStore {
    root: PathBuf,
    files: HandleMap<PathBuf>,
}

impl DirectoryAssetStore {
    /// Store rooted at `root`, created if missing
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, PersistenceError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            files: HandleMap::new(),
        })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File written for a handle
    pub fn path_of<T>(&self, handle: AssetHandle<T>) -> Option<&Path> {
        self.files.get(handle.key()).map(PathBuf::as_path)
    }

    fn record<T>(&mut self, path: PathBuf) -> AssetHandle<T> {
        TypedHandle::new(self.files.insert(path))
    }

    fn file_name_of<T>(&self, handle: AssetHandle<T>) -> Result<String, PersistenceError> {
        self.path_of(handle)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| PersistenceError::UnknownHandle(format!("{:?}", handle)))
    }

    fn image_record(
        &self,
        atlas: &AssetRef<AtlasImage>,
    ) -> Result<RecordRef<EmbeddedImageRecord>, PersistenceError> {
        Ok(match atlas {
            AssetRef::Embedded(image) => RecordRef::Embedded(EmbeddedImageRecord {
                tile_width: image.tile_size().width,
                tile_height: image.tile_size().height,
                png: image_io::encode_png(image.pixels())?,
            }),
            AssetRef::Stored(handle) => RecordRef::File(self.file_name_of(*handle)?),
        })
    }

    fn write_ron<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), PersistenceError> {
        let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        std::fs::write(path, text)?;
        log::debug!("Wrote {:?}", path);
        Ok(())
    }
}

impl AssetPersistence for DirectoryAssetStore {
    fn store_image(
        &mut self,
        name: &str,
        image: &AtlasImage,
    ) -> Result<AssetHandle<AtlasImage>, PersistenceError> {
        let path = self.root.join(format!("{name}.png"));
        image_io::save_png(image.pixels(), &path)?;
        Ok(self.record(path))
    }

    fn store_material(
        &mut self,
        name: &str,
        material: &BillboardMaterialDescriptor,
    ) -> Result<AssetHandle<BillboardMaterialDescriptor>, PersistenceError> {
        let path = self.root.join(format!("{name}.material.ron"));
        self.write_ron(&path, material)?;
        Ok(self.record(path))
    }

    fn store_asset(
        &mut self,
        asset: BillboardAsset,
    ) -> Result<AssetHandle<BillboardAsset>, PersistenceError> {
        let record = BillboardAssetRecord {
            color_atlas: self.image_record(&asset.color_atlas)?,
            normal_atlas: self.image_record(&asset.normal_atlas)?,
            material: match &asset.material {
                AssetRef::Embedded(material) => RecordRef::Embedded(material.clone()),
                AssetRef::Stored(handle) => RecordRef::File(self.file_name_of(*handle)?),
            },
            geometry: asset.geometry,
            parameters: asset.parameters,
            name: asset.name,
        };

        let path = self.root.join(format!("{}.impostor.ron", record.name));
        self.write_ron(&path, &record)?;
        Ok(self.record(path))
    }

    fn export_encoded(&mut self, image: &AtlasImage, path: &Path) -> Result<(), PersistenceError> {
        let path = self.root.join(path);
        image_io::save_png(image.pixels(), &path)?;
        log::info!("Exported {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::pipeline::BakePipeline;
    use crate::render::rasterizer::SoftwareRasterizer;
    use crate::scene::SourceNode;

    fn output() -> BakeOutput {
        let config = BakeConfiguration::default().with_tile_size(32, 32);
        BakePipeline::new(SoftwareRasterizer::new())
            .bake(Some(&SourceNode::new("empty")), &config)
            .unwrap()
    }

    #[test]
    fn test_packed_policy_stores_one_asset() {
        let mut store = MemoryAssetStore::new();
        let config = BakeConfiguration::default().with_encoded_export(true);

        let bundle = persist_bundle(output(), &config, "tree", &mut store).unwrap();

        assert_eq!(store.asset_count(), 1);
        assert_eq!(store.image_count(), 0);
        assert_eq!(store.material_count(), 0);
        assert!(store.exports().is_empty());
        let asset = store.asset(bundle.asset).unwrap();
        assert!(asset.color_atlas.is_embedded());
        assert!(asset.material.is_embedded());
    }

    #[test]
    fn test_separate_policy_references_stored_parts() {
        let mut store = MemoryAssetStore::new();
        let config = BakeConfiguration::default().with_packed_assets(false);

        let bundle = persist_bundle(output(), &config, "tree", &mut store).unwrap();

        assert_eq!(store.image_count(), 2);
        assert_eq!(store.material_count(), 1);
        assert!(bundle.exported.is_empty());
        let asset = store.asset(bundle.asset).unwrap();
        assert_eq!(asset.color_atlas, AssetRef::Stored(bundle.color_atlas.unwrap()));
        assert_eq!(store.image(bundle.normal_atlas.unwrap()).unwrap().width(), 128);
    }

    #[test]
    fn test_separate_policy_exports_when_asked() {
        let mut store = MemoryAssetStore::new();
        let config = BakeConfiguration::default()
            .with_packed_assets(false)
            .with_encoded_export(true);

        let bundle = persist_bundle(output(), &config, "tree", &mut store).unwrap();

        let paths: Vec<&Path> = store.exports().iter().map(|(path, _)| path.as_path()).collect();
        assert_eq!(paths, vec![Path::new("tree_color.png"), Path::new("tree_normal.png")]);
        assert_eq!(bundle.exported.len(), 2);
        let decoded = image_io::decode_png(&store.exports()[0].1).unwrap();
        assert_eq!(decoded.width(), 128);
    }

    #[test]
    fn test_dangling_handle_is_rejected() {
        let mut other = MemoryAssetStore::new();
        let foreign = other.store_image("x", &output().color_atlas).unwrap();

        let result = MemoryAssetStore::new().store_asset(BillboardAsset {
            name: "dangling".to_string(),
            color_atlas: AssetRef::Stored(foreign),
            normal_atlas: AssetRef::Stored(foreign),
            material: AssetRef::Embedded(BillboardMaterialDescriptor::default()),
            geometry: BillboardGeometry::standard(),
            parameters: BillboardParameters::default(),
        });
        assert!(matches!(result, Err(PersistenceError::UnknownHandle(_))));
    }

    #[test]
    fn test_directory_store_writes_files() {
        let root = std::env::temp_dir().join(format!("impostor_store_{}", std::process::id()));
        let mut store = DirectoryAssetStore::new(&root).unwrap();
        let config = BakeConfiguration::default()
            .with_packed_assets(false)
            .with_encoded_export(true);

        let bundle = persist_bundle(output(), &config, "tree", &mut store).unwrap();

        let asset_path = store.path_of(bundle.asset).unwrap().to_path_buf();
        let asset_text = std::fs::read_to_string(&asset_path).unwrap();
        assert!(asset_text.contains("tree_color_atlas.png"));
        assert!(root.join("tree_color.png").exists());
        assert!(root.join("tree_material.material.ron").exists());
        let atlas = image_io::load_png(root.join("tree_normal_atlas.png")).unwrap();
        assert_eq!((atlas.width(), atlas.height()), (128, 64));

        let _ = std::fs::remove_dir_all(&root);
    }
}
