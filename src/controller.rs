//! Scroll physics, tile bookkeeping and input for one gallery, independent of any GPU.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::GalleryConfig;
use crate::input::{InputEvent, InputOutcome, InputSettings, InputTracker, SnapTimer};
use crate::item::{arrange_sequence, GalleryItem};
use crate::scene::{SceneGraph, SceneNode, SceneNodeKind};
use crate::scroll::{Direction, ScrollState};
use crate::tile::{Tile, TileLayout};
use crate::viewport::{Camera, Screen, Viewport};

/// Cancellation token shared between a controller and whoever schedules its frames.
#[derive(Debug, Clone)]
pub struct LoopHandle(Arc<AtomicBool>);

impl LoopHandle {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-controller animation loop state.
#[derive(Debug)]
pub struct AnimationLoop {
    handle: LoopHandle,
    frames: u64,
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self {
            handle: LoopHandle(Arc::new(AtomicBool::new(true))),
            frames: 0,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of one `begin_frame` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub direction: Direction,
    pub teleports: usize,
    /// Whether the debounced snap ran this frame.
    pub snapped: bool,
}

/// Everything the renderer needs to draw one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDraw {
    /// Index of the tile in the arranged sequence.
    pub tile: usize,
    /// Column-major model-view-projection matrix of the image plane.
    pub plane_mvp: [f32; 16],
    pub plane_size: [f32; 2],
    /// Pixel size of the image, zero while it is not loaded.
    pub image_size: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub border_radius: f32,
    /// Present once the caption has been rasterized.
    pub label_mvp: Option<[f32; 16]>,
}

pub struct GalleryController {
    config: GalleryConfig,
    sequence: Vec<GalleryItem>,
    tiles: Vec<Tile>,
    scene: SceneGraph,
    scroll: ScrollState,
    input: InputTracker,
    snap_timer: SnapTimer,
    camera: Camera,
    screen: Screen,
    viewport: Viewport,
    animation: AnimationLoop,
}

impl GalleryController {
    pub fn new(config: GalleryConfig, screen: Screen) -> Self {
        let camera = Camera::new(config.camera_fov_degrees, config.camera_distance, screen);
        let viewport = camera.viewport();
        let items = config.resolved_items();

        let mut controller = Self {
            scroll: ScrollState::new(config.scroll_ease),
            snap_timer: SnapTimer::new(config.snap_delay),
            config,
            sequence: Vec::new(),
            tiles: Vec::new(),
            scene: SceneGraph::new(),
            input: InputTracker::new(),
            camera,
            screen,
            viewport,
            animation: AnimationLoop::new(),
        };
        controller.set_items(items);
        controller
    }

    /// Replaces the displayed items. An empty list selects the built-in projects.
    pub fn set_items(&mut self, items: Vec<GalleryItem>) {
        let items = if items.is_empty() {
            crate::item::default_items()
        } else {
            items
        };

        self.sequence = arrange_sequence(&items);
        self.scene.clear();
        self.scroll = ScrollState::new(self.config.scroll_ease);
        self.snap_timer.cancel();
        self.input.reset();

        let len = self.sequence.len();
        let root = self.scene.root();
        self.tiles = self
            .sequence
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let plane = self
                    .scene
                    .add(root, SceneNode::new(SceneNodeKind::Plane { tile: index }));
                let mut label = SceneNode::new(SceneNodeKind::Label { tile: index });
                label.visible = false;
                let label = self.scene.add(plane, label);
                Tile::new(
                    index,
                    item.clone(),
                    len,
                    self.screen,
                    self.viewport,
                    plane,
                    label,
                )
            })
            .collect();

        tracing::debug!(
            items = items.len(),
            tiles = self.tiles.len(),
            "gallery items replaced"
        );
        self.sync_scene();
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        if !self.animation.is_running() {
            return;
        }

        let settings = InputSettings {
            wheel_step: self.config.wheel_step,
            drag_sensitivity: self.config.drag_sensitivity,
        };
        match self.input.apply(&event, &mut self.scroll, settings) {
            InputOutcome::Ignored => {}
            InputOutcome::Handled => self.snap_timer.cancel(),
            InputOutcome::Settled => self.snap_timer.arm(now),
        }
    }

    /// Applies a new surface size. Takes effect for the next `begin_frame`.
    pub fn resize(&mut self, screen: Screen) {
        self.screen = screen;
        self.camera.set_aspect(screen);
        self.viewport = self.camera.viewport();
        for tile in &mut self.tiles {
            tile.on_resize(screen, self.viewport);
        }
        self.sync_scene();
    }

    /// Advances scroll and tiles for a frame that is about to be rendered. Returns `None`
    /// once the controller has been destroyed.
    pub fn begin_frame(&mut self, now: Instant) -> Option<FrameReport> {
        if !self.animation.is_running() {
            return None;
        }

        let snapped = self.snap_timer.poll(now);
        if snapped {
            let tile_width = self.tile_width();
            self.scroll.snap(tile_width);
            tracing::debug!(
                scroll_target = self.scroll.target,
                "scroll target snapped to tile"
            );
        }

        self.scroll.ease_step();
        let direction = self.scroll.direction();
        let bend = self.config.bend;
        let mut teleports = 0;
        for tile in &mut self.tiles {
            if tile.update(&self.scroll, direction, self.viewport, bend) {
                teleports += 1;
            }
        }
        self.sync_scene();

        Some(FrameReport {
            direction,
            teleports,
            snapped,
        })
    }

    /// Records the rendered position. Must follow the render of the frame.
    pub fn end_frame(&mut self) {
        self.scroll.commit_frame();
        self.animation.frames += 1;
    }

    /// A full frame without rendering.
    pub fn tick(&mut self, now: Instant) -> Option<FrameReport> {
        let report = self.begin_frame(now)?;
        self.end_frame();
        Some(report)
    }

    pub fn draw_list(&self) -> Vec<TileDraw> {
        let view_projection = self.camera.view_projection();

        self.tiles
            .iter()
            .filter_map(|tile| {
                let plane = self.scene.world_matrix(tile.plane)?;
                let label_mvp = if self.scene.is_visible(tile.label) {
                    self.scene
                        .world_matrix(tile.label)
                        .map(|label| label.then(&view_projection).to_array())
                } else {
                    None
                };

                Some(TileDraw {
                    tile: tile.index,
                    plane_mvp: plane.then(&view_projection).to_array(),
                    plane_size: [tile.layout.plane_width, tile.layout.plane_height],
                    image_size: tile.image_size,
                    time: tile.time,
                    speed: tile.speed,
                    border_radius: self.config.border_radius,
                    label_mvp,
                })
            })
            .collect()
    }

    /// Sets the rasterized caption size of one tile, which makes its label drawable.
    pub fn set_label_size(&mut self, tile: usize, width: u32, height: u32) {
        let Some(tile) = self.tiles.get_mut(tile) else {
            return;
        };
        if width == 0 || height == 0 {
            tile.label_aspect = None;
        } else {
            tile.label_aspect = Some(width as f32 / height as f32);
        }
        self.sync_scene();
    }

    /// Records the pixel size of a loaded image on every tile showing it. Returns the number
    /// of tiles updated.
    pub fn set_image_size(&mut self, image: &str, width: u32, height: u32) -> usize {
        let mut updated = 0;
        for tile in self.tiles.iter_mut().filter(|tile| tile.item.image == image) {
            tile.image_size = [width as f32, height as f32];
            updated += 1;
        }
        updated
    }

    /// Stops the frame loop and forgets any gesture in progress.
    pub fn destroy(&mut self) {
        self.animation.cancel();
        self.snap_timer.cancel();
        self.input.reset();
    }

    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    pub fn loop_handle(&self) -> LoopHandle {
        self.animation.handle()
    }

    pub fn frames(&self) -> u64 {
        self.animation.frames()
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn sequence(&self) -> &[GalleryItem] {
        &self.sequence
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn snap_timer(&self) -> &SnapTimer {
        &self.snap_timer
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Width of one tile including padding, in world units.
    pub fn tile_width(&self) -> f32 {
        match self.tiles.first() {
            Some(tile) => tile.layout.tile_width,
            None => TileLayout::compute(self.screen, self.viewport, 0, 0).tile_width,
        }
    }

    fn sync_scene(&mut self) {
        for tile in &self.tiles {
            let layout = tile.layout;
            if let Some(plane) = self.scene.get_mut(tile.plane) {
                plane.position = [tile.x, tile.y, 0.0];
                plane.rotation_z = tile.rotation_z;
                plane.scale = [layout.plane_width, layout.plane_height];
            }
            if let Some(label) = self.scene.get_mut(tile.label) {
                match tile.label_width() {
                    Some(width) => {
                        label.position = [0.0, layout.label_offset_y(), 0.0];
                        label.scale = [width, layout.label_height()];
                        label.visible = true;
                    }
                    None => label.visible = false,
                }
            }
        }
    }
}
