//! One image plane and its caption, placed along the bend arc.

use crate::id::NodeId;
use crate::item::GalleryItem;
use crate::scroll::{Direction, ScrollState};
use crate::viewport::{Screen, Viewport};

/// Screen height the tile proportions are authored for.
const REFERENCE_HEIGHT: f32 = 1500.0;
const PLANE_HEIGHT_PX: f32 = 900.0;
const PLANE_WIDTH_PX: f32 = 700.0;
/// World-space gap between neighbouring tiles.
const TILE_PADDING: f32 = 2.0;
const LABEL_HEIGHT_RATIO: f32 = 0.15;
const LABEL_GAP: f32 = 0.05;
const TIME_STEP: f32 = 0.04;

/// Resize-dependent tile dimensions, all in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    pub scale: f32,
    pub plane_width: f32,
    pub plane_height: f32,
    pub tile_width: f32,
    pub base_x: f32,
    pub width_total: f32,
}

impl TileLayout {
    pub fn compute(screen: Screen, viewport: Viewport, index: usize, sequence_len: usize) -> Self {
        let scale = screen.height / REFERENCE_HEIGHT;
        let plane_height = viewport.height * (PLANE_HEIGHT_PX * scale) / screen.height;
        let plane_width = viewport.width * (PLANE_WIDTH_PX * scale) / screen.width;
        let tile_width = plane_width + TILE_PADDING;

        Self {
            scale,
            plane_width,
            plane_height,
            tile_width,
            base_x: tile_width * index as f32,
            width_total: tile_width * sequence_len as f32,
        }
    }

    pub fn label_height(&self) -> f32 {
        self.plane_height * LABEL_HEIGHT_RATIO
    }

    /// Vertical offset of the label centre relative to the plane centre.
    pub fn label_offset_y(&self) -> f32 {
        -self.plane_height / 2.0 - self.label_height() / 2.0 - LABEL_GAP
    }
}

/// Vertical offset and z-rotation of a tile centred at `x`.
///
/// `half_width` and `|bend|` define a circle of radius `(H² + B²) / 2|B|` whose lowest (or,
/// for negative bends, highest) point sits at the origin. Positions past `half_width` are
/// clamped so tiles outside the viewport keep the edge placement.
pub fn bend_placement(x: f32, half_width: f32, bend: f32) -> (f32, f32) {
    if bend == 0.0 {
        return (0.0, 0.0);
    }

    let bend_abs = bend.abs();
    let radius = (half_width * half_width + bend_abs * bend_abs) / (2.0 * bend_abs);
    let effective_x = x.abs().min(half_width);
    let arc = radius - (radius * radius - effective_x * effective_x).max(0.0).sqrt();
    let angle = (effective_x / radius).clamp(-1.0, 1.0).asin();

    if bend > 0.0 {
        (-arc, -x.signum() * angle)
    } else {
        (arc, x.signum() * angle)
    }
}

/// A tile of the doubled sequence.
#[derive(Debug, Clone)]
pub struct Tile {
    pub index: usize,
    pub item: GalleryItem,
    pub layout: TileLayout,
    /// Net number of full-sequence teleports. Negative after scrolling right.
    pub wraps: i64,
    pub x: f32,
    pub y: f32,
    pub rotation_z: f32,
    pub is_before: bool,
    pub is_after: bool,
    pub time: f32,
    pub speed: f32,
    pub plane: NodeId,
    pub label: NodeId,
    /// Pixel size of the loaded image, zero until it arrives.
    pub image_size: [f32; 2],
    /// Width over height of the rasterized caption, once available.
    pub label_aspect: Option<f32>,
    sequence_len: usize,
}

impl Tile {
    pub fn new(
        index: usize,
        item: GalleryItem,
        sequence_len: usize,
        screen: Screen,
        viewport: Viewport,
        plane: NodeId,
        label: NodeId,
    ) -> Self {
        let layout = TileLayout::compute(screen, viewport, index, sequence_len);
        Self {
            index,
            item,
            layout,
            wraps: 0,
            x: layout.base_x,
            y: 0.0,
            rotation_z: 0.0,
            is_before: false,
            is_after: false,
            time: initial_phase(index),
            speed: 0.0,
            plane,
            label,
            image_size: [0.0, 0.0],
            label_aspect: None,
            sequence_len,
        }
    }

    /// Accumulated teleport correction.
    pub fn extra_offset(&self) -> f32 {
        self.wraps as f32 * self.layout.width_total
    }

    /// Places the tile for the current scroll position and wraps it around when it has
    /// left the viewport on the trailing side. Returns `true` if the tile teleported.
    pub fn update(
        &mut self,
        scroll: &ScrollState,
        direction: Direction,
        viewport: Viewport,
        bend: f32,
    ) -> bool {
        let half_viewport = viewport.half_width();
        self.x = self.layout.base_x - scroll.current - self.extra_offset();
        (self.y, self.rotation_z) = bend_placement(self.x, half_viewport, bend);

        self.speed = scroll.velocity();
        self.time += TIME_STEP;

        let half_plane = self.layout.plane_width / 2.0;
        self.is_before = self.x + half_plane < -half_viewport;
        self.is_after = self.x - half_plane > half_viewport;

        let teleport = match direction {
            Direction::Right if self.is_before => -1,
            Direction::Left if self.is_after => 1,
            _ => 0,
        };
        if teleport == 0 {
            return false;
        }

        self.wraps += teleport;
        self.is_before = false;
        self.is_after = false;
        tracing::trace!(
            tile = self.index,
            wraps = self.wraps,
            "tile wrapped around the sequence"
        );
        true
    }

    /// Recomputes the layout. Calling it again with the same sizes is a no-op.
    pub fn on_resize(&mut self, screen: Screen, viewport: Viewport) {
        self.layout = TileLayout::compute(screen, viewport, self.index, self.sequence_len);
    }

    pub fn label_width(&self) -> Option<f32> {
        self.label_aspect
            .map(|aspect| self.layout.label_height() * aspect)
    }
}

/// Starting shader time, spread per index so neighbouring ripples are out of phase.
fn initial_phase(index: usize) -> f32 {
    (index as f32 * 61.803_4) % 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Screen {
        Screen::new(1500, 1000)
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 24.0,
            height: 16.0,
        }
    }

    fn tile(index: usize, len: usize) -> Tile {
        Tile::new(
            index,
            GalleryItem::new("a.jpg", "A"),
            len,
            screen(),
            viewport(),
            NodeId(1),
            NodeId(2),
        )
    }

    #[test]
    fn layout_follows_reference_proportions() {
        let layout = TileLayout::compute(screen(), viewport(), 3, 10);
        let scale = 1000.0 / 1500.0;
        assert!((layout.plane_height - 16.0 * 900.0 * scale / 1000.0).abs() < 1e-5);
        assert!((layout.plane_width - 24.0 * 700.0 * scale / 1500.0).abs() < 1e-5);
        assert!((layout.tile_width - layout.plane_width - 2.0).abs() < 1e-5);
        assert!((layout.base_x - layout.tile_width * 3.0).abs() < 1e-5);
        assert!((layout.width_total - layout.tile_width * 10.0).abs() < 1e-4);
    }

    #[test]
    fn flat_bend_has_no_offset() {
        for x in [-30.0, -3.0, 0.0, 7.5, 100.0] {
            assert_eq!(bend_placement(x, 12.0, 0.0), (0.0, 0.0));
        }
    }

    #[test]
    fn positive_bend_sags_and_tilts_outward() {
        let (y, rotation) = bend_placement(6.0, 12.0, 3.0);
        assert!(y < 0.0);
        assert!(rotation < 0.0);

        let (mirrored_y, mirrored_rotation) = bend_placement(-6.0, 12.0, 3.0);
        assert!((mirrored_y - y).abs() < 1e-6);
        assert!((mirrored_rotation + rotation).abs() < 1e-6);

        // The arc reaches exactly |bend| at the viewport edge and stays there.
        let (edge_y, _) = bend_placement(12.0, 12.0, 3.0);
        let (far_y, _) = bend_placement(40.0, 12.0, 3.0);
        assert!((edge_y + 3.0).abs() < 1e-4);
        assert!((far_y - edge_y).abs() < 1e-6);
    }

    #[test]
    fn negative_bend_arches() {
        let (y, rotation) = bend_placement(6.0, 12.0, -3.0);
        assert!(y > 0.0);
        assert!(rotation > 0.0);
    }

    #[test]
    fn tile_leaving_left_while_scrolling_right_wraps_forward() {
        let mut tile = tile(0, 4);
        let mut scroll = ScrollState::new(0.05);
        scroll.current = 20.0;
        scroll.last = 19.0;

        assert!(tile.update(&scroll, Direction::Right, viewport(), 0.0));
        assert_eq!(tile.wraps, -1);
        assert!((tile.extra_offset() + tile.layout.width_total).abs() < 1e-5);
        assert!(!tile.is_before);

        // Next frame the tile sits a full sequence further right.
        tile.update(&scroll, Direction::Right, viewport(), 0.0);
        assert!((tile.x - (tile.layout.width_total - 20.0)).abs() < 1e-4);
    }

    #[test]
    fn hidden_tile_does_not_wrap_against_scroll_direction() {
        let mut tile = tile(0, 4);
        let mut scroll = ScrollState::new(0.05);
        scroll.current = 20.0;

        assert!(!tile.update(&scroll, Direction::Left, viewport(), 0.0));
        assert!(tile.is_before);
        assert_eq!(tile.wraps, 0);
    }

    #[test]
    fn update_advances_time_and_speed() {
        let mut tile = tile(2, 4);
        let start = tile.time;
        let mut scroll = ScrollState::new(0.05);
        scroll.current = 0.25;
        tile.update(&scroll, Direction::Right, viewport(), 3.0);
        assert!((tile.time - start - 0.04).abs() < 1e-5);
        assert!((tile.speed - 0.25).abs() < 1e-6);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut tile = tile(5, 8);
        let bigger = Screen::new(2000, 1200);
        let wide = Viewport {
            width: 30.0,
            height: 18.0,
        };
        tile.on_resize(bigger, wide);
        let once = tile.layout;
        tile.on_resize(bigger, wide);
        assert_eq!(tile.layout, once);
    }
}
