//! An infinitely scrolling image gallery whose tiles ride a bent arc, rendered with `wgpu`.
//!
//! [`Gallery`] is the entry point for an application window. The pieces it is built from
//! are public too: [`GalleryController`] runs scrolling, wraparound and the scene graph
//! without touching the GPU, [`GalleryRenderer`] draws a list of [`DrawTile`]s, and
//! [`FallbackGallery`] renders a plain card row on the CPU when no GPU is available.
//!
//! ```rust
//! use std::time::Instant;
//! use circular_gallery::{GalleryConfig, GalleryController, GalleryItem, InputEvent, Screen};
//!
//! let config = GalleryConfig::default()
//!     .with_items(vec![
//!         GalleryItem::new("a.jpg", "A"),
//!         GalleryItem::new("b.jpg", "B"),
//!     ])
//!     .with_bend(0.0);
//! let mut controller = GalleryController::new(config, Screen::new(1280, 720));
//!
//! controller.handle_input(InputEvent::Wheel { delta_y: 1.0 }, Instant::now());
//! controller.tick(Instant::now());
//! assert_eq!(controller.draw_list().len(), 4);
//! ```

pub use wgpu;

mod cache;
mod color;
mod config;
mod controller;
mod error;
mod fallback;
mod gallery;
mod geometry;
mod id;
mod image_loader;
mod input;
mod item;
#[cfg(feature = "render_metrics")]
mod metrics;
mod pipeline;
mod renderer;
mod scene;
mod scroll;
mod text;
mod texture_manager;
mod tile;
mod util;
mod viewport;

pub use cache::LabelCache;
pub use color::Color;
pub use config::{FontFamily, FontSpec, GalleryConfig};
pub use controller::{AnimationLoop, FrameReport, GalleryController, LoopHandle, TileDraw};
pub use error::GalleryError;
pub use fallback::{CardRect, FallbackCard, FallbackGallery, FallbackPresenter};
pub use gallery::Gallery;
pub use geometry::{plane_geometry, Vertex};
pub use id::{NodeId, TextureId};
pub use image_loader::{load_image, ImageLoad, ImageLoader};
pub use input::{InputEvent, InputOutcome, InputSettings, InputTracker, PointerId, SnapTimer};
pub use item::{arrange_sequence, cyclic_conflicts, default_items, GalleryItem};
#[cfg(feature = "render_metrics")]
pub use metrics::FrameMetrics;
pub use pipeline::{LabelUniforms, TileUniforms};
pub use renderer::{DrawLabel, DrawTile, GalleryRenderer, RendererOptions};
pub use scene::{SceneGraph, SceneNode, SceneNodeKind};
pub use scroll::{snap_to_grid, Direction, ScrollState};
pub use text::{label_canvas_size, LabelBitmap, LabelStyle, TextRasterizer};
pub use texture_manager::TextureManager;
pub use tile::{bend_placement, Tile, TileLayout};
pub use viewport::{Camera, Screen, Viewport};

/// Card layout constants of the CPU fallback.
pub mod fallback_layout {
    pub use crate::fallback::{
        CARD_GAP, CARD_HEIGHT, CARD_WIDTH, HOVER_SCALE, IMAGE_HEIGHT, ROW_PADDING, WHEEL_STEP_PX,
    };
}
