//! wgpu renderer for the gallery.
//!
//! The renderer knows nothing about scrolling or tiles beyond what a [`DrawTile`] carries:
//! a plane's uniforms, its image texture and an optional caption. Each frame the tile
//! planes and labels are drawn in sequence order with straight-alpha blending and no depth
//! test.
//!
//! # Examples
//!
//! Rendering one tile offscreen:
//!
//! ```rust,no_run
//! use futures::executor::block_on;
//! use circular_gallery::{DrawTile, GalleryRenderer, TileUniforms};
//!
//! let mut renderer = block_on(GalleryRenderer::new_headless((320, 240), 1.0)).unwrap();
//! let draw = DrawTile {
//!     uniforms: TileUniforms {
//!         mvp: [
//!             1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
//!         ],
//!         plane_sizes: [1.0, 1.0],
//!         image_sizes: [0.0, 0.0],
//!         time: 0.0,
//!         speed: 0.0,
//!         border_radius: 0.05,
//!         _pad: 0.0,
//!     },
//!     texture: None,
//!     label: None,
//! };
//!
//! let mut pixels = Vec::new();
//! renderer.render_to_buffer(&[draw], &mut pixels).unwrap();
//! assert_eq!(pixels.len(), 320 * 240 * 4);
//! ```

use std::sync::Arc;

use wgpu::{CompositeAlphaMode, InstanceDescriptor, SurfaceTarget};

use crate::color::Color;
use crate::error::GalleryError;
use crate::geometry::{PlaneMesh, LABEL_SEGMENTS, TILE_SEGMENTS};
use crate::pipeline::{
    create_label_pipeline, create_offscreen_color_texture, create_readback_buffer,
    create_texture_bind_group_layout, create_tile_pipeline, create_uniform_bind_group_layout,
    encode_copy_texture_to_buffer, LabelUniforms, TileUniforms, UniformPool,
};
use crate::texture_manager::TextureManager;
use crate::util::{compute_padded_bytes_per_row, to_logical};

mod construction;
mod readback;
mod rendering;
mod surface;
pub(crate) mod types;

pub use types::{DrawLabel, DrawTile};

/// Initial number of uniform slots per pool.
const INITIAL_UNIFORM_SLOTS: usize = 64;

/// Surface options chosen at mount time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererOptions {
    pub vsync: bool,
    /// Clear color. A translucent background asks the compositor for a transparent surface.
    pub background: Color,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            vsync: true,
            background: Color::TRANSPARENT,
        }
    }
}

pub struct GalleryRenderer<'a> {
    instance: wgpu::Instance,
    /// `None` for headless renderers.
    surface: Option<wgpu::Surface<'a>>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,

    /// Size of the surface in physical pixels
    physical_size: (u32, u32),
    /// Scale factor of the window
    scale_factor: f64,
    background: Color,

    tile_pipeline: wgpu::RenderPipeline,
    label_pipeline: wgpu::RenderPipeline,
    tile_uniform_layout: wgpu::BindGroupLayout,
    label_uniform_layout: wgpu::BindGroupLayout,
    tile_uniforms: UniformPool,
    label_uniforms: UniformPool,
    tile_mesh: PlaneMesh,
    label_mesh: PlaneMesh,

    texture_manager: TextureManager,

    offscreen_texture: Option<wgpu::Texture>,
    readback_buffer: Option<wgpu::Buffer>,
    readback_bytes: Vec<u8>,
}
