use crate::controller::TileDraw;
use crate::id::TextureId;
use crate::pipeline::{LabelUniforms, TileUniforms};

/// One tile plane, ready for the GPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTile {
    pub uniforms: TileUniforms,
    /// `None` while the image is still loading; the plane is then fully transparent.
    pub texture: Option<TextureId>,
    pub label: Option<DrawLabel>,
}

/// Caption drawn right after its tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawLabel {
    pub uniforms: LabelUniforms,
    pub texture: TextureId,
}

impl DrawTile {
    /// Resolves a controller draw against the textures uploaded so far.
    ///
    /// The caption is dropped unless both its placement and its texture are known.
    pub fn from_tile_draw(
        draw: &TileDraw,
        texture: Option<TextureId>,
        label_texture: Option<TextureId>,
    ) -> Self {
        let label = match (draw.label_mvp, label_texture) {
            (Some(mvp), Some(texture)) => Some(DrawLabel {
                uniforms: LabelUniforms { mvp },
                texture,
            }),
            _ => None,
        };

        Self {
            uniforms: TileUniforms {
                mvp: draw.plane_mvp,
                plane_sizes: draw.plane_size,
                image_sizes: draw.image_size,
                time: draw.time,
                speed: draw.speed,
                border_radius: draw.border_radius,
                _pad: 0.0,
            },
            texture,
            label,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BufferSizingDecision {
    pub(crate) should_reallocate: bool,
}

pub(crate) fn decide_buffer_sizing(
    existing_size: Option<u64>,
    required_size: usize,
) -> BufferSizingDecision {
    let required_size = required_size as u64;
    let should_reallocate = existing_size
        .map(|size| size < required_size)
        .unwrap_or(true);

    BufferSizingDecision { should_reallocate }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_draw(label_mvp: Option<[f32; 16]>) -> TileDraw {
        TileDraw {
            tile: 3,
            plane_mvp: [0.5; 16],
            plane_size: [4.0, 5.0],
            image_size: [800.0, 600.0],
            time: 1.2,
            speed: -0.3,
            border_radius: 0.05,
            label_mvp,
        }
    }

    #[test]
    fn decide_buffer_sizing_reallocates_when_missing() {
        let decision = decide_buffer_sizing(None, 128);
        assert!(decision.should_reallocate);
    }

    #[test]
    fn decide_buffer_sizing_reallocates_when_too_small() {
        let decision = decide_buffer_sizing(Some(64), 128);
        assert!(decision.should_reallocate);
    }

    #[test]
    fn decide_buffer_sizing_keeps_buffer_when_large_enough() {
        let decision = decide_buffer_sizing(Some(512), 128);
        assert!(!decision.should_reallocate);
    }

    #[test]
    fn tile_draw_carries_uniforms_through() {
        let draw = DrawTile::from_tile_draw(&tile_draw(None), Some(TextureId(7)), None);
        assert_eq!(draw.texture, Some(TextureId(7)));
        assert_eq!(draw.uniforms.plane_sizes, [4.0, 5.0]);
        assert_eq!(draw.uniforms.image_sizes, [800.0, 600.0]);
        assert_eq!(draw.uniforms.speed, -0.3);
        assert!(draw.label.is_none());
    }

    #[test]
    fn label_needs_both_placement_and_texture() {
        let placed = tile_draw(Some([1.0; 16]));
        assert!(DrawTile::from_tile_draw(&placed, None, None).label.is_none());

        let unplaced = tile_draw(None);
        assert!(DrawTile::from_tile_draw(&unplaced, None, Some(TextureId(2)))
            .label
            .is_none());

        let label = DrawTile::from_tile_draw(&placed, None, Some(TextureId(2)))
            .label
            .map(|label| label.texture);
        assert_eq!(label, Some(TextureId(2)));
    }
}
