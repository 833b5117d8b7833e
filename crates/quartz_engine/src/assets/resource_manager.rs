//! Central manager for models and textures
//!
//! Owns every realized model and uploaded texture, keyed by string
//! identifier. Lookups never fail: unknown identifiers resolve to
//! pre-registered placeholder defaults, so a missing asset shows up as a
//! gray cube or white surface instead of a crash.

use crate::assets::image_loader::ImageData;
use crate::assets::model::{Model, ModelDesc, ModelPart};
use crate::assets::AssetError;
use crate::foundation::collections::{DefaultKey, HandleMap};
use crate::foundation::math::Mat4;
use crate::render::api::{
    RenderDevice, ShaderResourceView, TextureDesc, TextureFormat, TextureId, TextureUsage,
};

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

/// Identifier of the pre-registered unit plane
pub const DEFAULT_PLANE: &str = "plane";
/// Identifier of the pre-registered unit cube
pub const DEFAULT_CUBE: &str = "cube";
/// Identifier of the pre-registered unit sphere
pub const DEFAULT_SPHERE: &str = "sphere";
/// Identifier of the pre-registered 1x1 white texture
pub const DEFAULT_TEXTURE: &str = "white";

struct TextureSlot {
    #[allow(dead_code)]
    texture: TextureId,
    srv: ShaderResourceView,
}

/// Owns all loaded models and textures
///
/// Resources live in slot maps; the string identifiers level files and
/// instances use resolve through a name index.
pub struct ResourceManager {
    models: HandleMap<Model>,
    model_ids: HashMap<String, DefaultKey>,
    textures: HandleMap<TextureSlot>,
    texture_ids: HashMap<String, DefaultKey>,
}

impl ResourceManager {
    /// Create the manager and register the placeholder defaults
    pub fn new(device: &mut dyn RenderDevice) -> Result<Self, AssetError> {
        let mut manager = Self {
            models: HandleMap::default(),
            model_ids: HashMap::new(),
            textures: HandleMap::default(),
            texture_ids: HashMap::new(),
        };

        manager.register_primitive(device, DEFAULT_PLANE, &crate::render::Mesh::plane(1.0, 1.0, 1.0))?;
        manager.register_primitive(device, DEFAULT_CUBE, &crate::render::Mesh::cube(1.0, 1.0, 1.0))?;
        manager.register_primitive(device, DEFAULT_SPHERE, &crate::render::Mesh::sphere(0.5, 20, 20))?;

        let white = ImageData {
            data: vec![255, 255, 255, 255],
            width: 1,
            height: 1,
            channels: 4,
        };
        manager.register_texture(device, DEFAULT_TEXTURE, &white)?;

        Ok(manager)
    }

    fn register_primitive(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        mesh: &crate::render::Mesh,
    ) -> Result<(), AssetError> {
        let handle = device.create_mesh(&mesh.vertices, &mesh.indices)?;
        self.insert_model(
            name,
            Model {
                parts: vec![ModelPart {
                    mesh: handle,
                    material: crate::render::Material::default(),
                    diffuse_map: None,
                    normal_map: None,
                }],
                axis_correction: Mat4::identity(),
            },
        );
        Ok(())
    }

    fn insert_model(&mut self, name: &str, model: Model) {
        let key = self.models.insert(model);
        if let Some(displaced) = self.model_ids.insert(name.to_string(), key) {
            self.models.remove(displaced);
        }
    }

    /// Upload a texture from decoded image data
    pub fn register_texture(
        &mut self,
        device: &mut dyn RenderDevice,
        name: &str,
        image: &ImageData,
    ) -> Result<(), AssetError> {
        let desc = TextureDesc {
            width: image.width,
            height: image.height,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::SHADER_RESOURCE,
        };
        let texture = device.create_texture_with_data(&desc, &image.data)?;
        let srv = device.create_shader_resource_view(texture)?;
        let key = self.textures.insert(TextureSlot { texture, srv });
        if let Some(displaced) = self.texture_ids.insert(name.to_string(), key) {
            self.textures.remove(displaced);
        }
        Ok(())
    }

    /// Realize a model descriptor: build and upload each part's mesh
    pub fn create_model(
        &mut self,
        device: &mut dyn RenderDevice,
        desc: &ModelDesc,
    ) -> Result<(), AssetError> {
        let mut parts = Vec::with_capacity(desc.parts.len());
        for part in &desc.parts {
            let mesh = part.shape.build();
            let handle = device.create_mesh(&mesh.vertices, &mesh.indices)?;
            parts.push(ModelPart {
                mesh: handle,
                material: part.material,
                diffuse_map: part.diffuse_map.clone(),
                normal_map: part.normal_map.clone(),
            });
        }
        self.insert_model(
            &desc.name,
            Model {
                parts,
                axis_correction: desc.axis_correction(),
            },
        );
        Ok(())
    }

    /// Load every model descriptor (`.ron`) in a directory
    ///
    /// A file that fails to parse or upload is skipped with a warning; a
    /// missing directory is an error. Returns the number of models loaded.
    pub fn load_model_folder(
        &mut self,
        device: &mut dyn RenderDevice,
        dir: &Path,
    ) -> Result<usize, AssetError> {
        if !dir.is_dir() {
            return Err(AssetError::MissingDirectory(dir.to_path_buf()));
        }

        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
                continue;
            }
            match self.load_model_file(device, &path) {
                Ok(name) => {
                    debug!("Loaded model '{}' from {}", name, path.display());
                    loaded += 1;
                }
                Err(err) => warn!("Skipping model {}: {}", path.display(), err),
            }
        }
        info!("Loaded {} models from {}", loaded, dir.display());
        Ok(loaded)
    }

    fn load_model_file(
        &mut self,
        device: &mut dyn RenderDevice,
        path: &Path,
    ) -> Result<String, AssetError> {
        let text = std::fs::read_to_string(path)?;
        let desc: ModelDesc = ron::from_str(&text)?;
        let name = desc.name.clone();
        self.create_model(device, &desc)?;
        Ok(name)
    }

    /// Load every texture (`.png`) in a directory, keyed by file stem
    ///
    /// Same failure policy as [`Self::load_model_folder`].
    pub fn load_texture_folder(
        &mut self,
        device: &mut dyn RenderDevice,
        dir: &Path,
    ) -> Result<usize, AssetError> {
        if !dir.is_dir() {
            return Err(AssetError::MissingDirectory(dir.to_path_buf()));
        }

        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match ImageData::from_file(&path) {
                Ok(image) => {
                    let name = stem.to_string();
                    self.register_texture(device, &name, &image)?;
                    debug!("Loaded texture '{}' from {}", name, path.display());
                    loaded += 1;
                }
                Err(err) => warn!("Skipping texture {}: {}", path.display(), err),
            }
        }
        info!("Loaded {} textures from {}", loaded, dir.display());
        Ok(loaded)
    }

    /// Look up a model, falling back to the placeholder cube
    #[must_use]
    pub fn model(&self, id: &str) -> &Model {
        if let Some(model) = self
            .model_ids
            .get(id)
            .and_then(|key| self.models.get(*key))
        {
            return model;
        }
        debug!("Unknown model '{}', using placeholder", id);
        &self.models[self.model_ids[DEFAULT_CUBE]]
    }

    /// Look up a texture view, falling back to the white placeholder
    #[must_use]
    pub fn texture(&self, id: &str) -> ShaderResourceView {
        if let Some(slot) = self
            .texture_ids
            .get(id)
            .and_then(|key| self.textures.get(*key))
        {
            return slot.srv;
        }
        debug!("Unknown texture '{}', using placeholder", id);
        self.textures[self.texture_ids[DEFAULT_TEXTURE]].srv
    }

    /// Resolve an optional texture identifier, defaulting to white
    #[must_use]
    pub fn texture_or_default(&self, id: Option<&str>) -> ShaderResourceView {
        self.texture(id.unwrap_or(DEFAULT_TEXTURE))
    }

    /// Whether a model with this identifier is registered
    #[must_use]
    pub fn has_model(&self, id: &str) -> bool {
        self.model_ids.contains_key(id)
    }

    /// Number of registered models
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Number of registered textures
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}
