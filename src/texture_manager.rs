use std::sync::Arc;

use ahash::AHashMap;

use crate::error::GalleryError;
use crate::id::{TextureId, TextureIdAllocator};

struct TextureEntry {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    dimensions: (u32, u32),
}

/// Owns every image and label texture of a renderer.
///
/// Each texture gets its bind group when it is allocated, so drawing only has to look it up.
/// Unknown ids resolve to a 1x1 transparent placeholder.
///
/// # Examples
///
/// ```rust,no_run
/// # use futures::executor::block_on;
/// # use circular_gallery::GalleryRenderer;
/// let mut renderer = block_on(GalleryRenderer::new_headless((256, 256), 1.0)).unwrap();
/// let texture_manager = renderer.texture_manager_mut();
///
/// let data = vec![255u8; 64 * 64 * 4];
/// let texture_id = texture_manager.allocate_texture_with_data((64, 64), &data);
/// texture_manager
///     .load_data_into_texture(texture_id, (64, 64), &data)
///     .unwrap();
/// assert!(texture_manager.is_texture_loaded(texture_id));
/// ```
pub struct TextureManager {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    textures: AHashMap<TextureId, TextureEntry>,
    ids: TextureIdAllocator,
    placeholder: wgpu::BindGroup,
}

impl TextureManager {
    pub(crate) fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        bind_group_layout: wgpu::BindGroupLayout,
    ) -> Self {
        let sampler = Self::create_sampler(&device);
        let placeholder_texture = Self::create_texture(&device, (1, 1));
        Self::write_image_bytes_to_texture(&queue, &placeholder_texture, (1, 1), &[0, 0, 0, 0]);
        let placeholder = Self::create_bind_group(
            &device,
            &bind_group_layout,
            &sampler,
            &placeholder_texture,
        );

        Self {
            device,
            queue,
            sampler,
            bind_group_layout,
            textures: AHashMap::new(),
            ids: TextureIdAllocator::new(),
            placeholder,
        }
    }

    fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        })
    }

    fn create_texture(device: &wgpu::Device, dimensions: (u32, u32)) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: None,
            size: wgpu::Extent3d {
                width: dimensions.0.max(1),
                height: dimensions.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Decoded images and rasterized labels are sRGB encoded
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture: &wgpu::Texture,
    ) -> wgpu::BindGroup {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("texture_bind_group"),
        })
    }

    fn write_image_bytes_to_texture(
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        dimensions: (u32, u32),
        data: &[u8],
    ) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            wgpu::Extent3d {
                width: dimensions.0,
                height: dimensions.1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Allocates an RGBA8 texture without contents.
    pub fn allocate_texture(&mut self, dimensions: (u32, u32)) -> TextureId {
        let id = self.ids.allocate();
        let texture = Self::create_texture(&self.device, dimensions);
        let bind_group = Self::create_bind_group(
            &self.device,
            &self.bind_group_layout,
            &self.sampler,
            &texture,
        );
        self.textures.insert(
            id,
            TextureEntry {
                texture,
                bind_group,
                dimensions,
            },
        );
        id
    }

    /// Allocates a texture and uploads `data`, which must hold `width * height` RGBA8
    /// texels with straight alpha.
    pub fn allocate_texture_with_data(&mut self, dimensions: (u32, u32), data: &[u8]) -> TextureId {
        let id = self.allocate_texture(dimensions);
        if let Some(entry) = self.textures.get(&id) {
            Self::write_image_bytes_to_texture(&self.queue, &entry.texture, dimensions, data);
        }
        id
    }

    /// Replaces the contents of an allocated texture of the same size.
    pub fn load_data_into_texture(
        &self,
        texture_id: TextureId,
        dimensions: (u32, u32),
        data: &[u8],
    ) -> Result<(), GalleryError> {
        let entry = self
            .textures
            .get(&texture_id)
            .ok_or(GalleryError::TextureNotFound(texture_id))?;
        Self::write_image_bytes_to_texture(&self.queue, &entry.texture, dimensions, data);
        Ok(())
    }

    pub fn is_texture_loaded(&self, texture_id: TextureId) -> bool {
        self.textures.contains_key(&texture_id)
    }

    pub fn dimensions(&self, texture_id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture_id).map(|entry| entry.dimensions)
    }

    pub fn remove_texture(&mut self, texture_id: TextureId) -> bool {
        self.textures.remove(&texture_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Bind group for `texture_id`, or the transparent placeholder.
    pub(crate) fn bind_group(&self, texture_id: Option<TextureId>) -> &wgpu::BindGroup {
        texture_id
            .and_then(|id| self.textures.get(&id))
            .map(|entry| &entry.bind_group)
            .unwrap_or(&self.placeholder)
    }
}
