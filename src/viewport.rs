//! Pixel and world-space dimensions of the gallery, and the camera relating them.

use lyon::geom::euclid::default::Transform3D;

/// Size of the drawing surface in physical pixels. Never smaller than 1x1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Visible area at `z = 0`, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }
}

/// Perspective camera on the +z axis looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_degrees: f32,
    pub distance: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32, distance: f32, screen: Screen) -> Self {
        Self {
            fov_degrees,
            distance,
            aspect: screen.aspect(),
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn set_aspect(&mut self, screen: Screen) {
        self.aspect = screen.aspect();
    }

    /// World-space size of the plane `z = 0` as seen through the camera.
    pub fn viewport(&self) -> Viewport {
        let fov = self.fov_degrees.to_radians();
        let height = 2.0 * (fov / 2.0).tan() * self.distance;
        Viewport {
            width: height * self.aspect,
            height,
        }
    }

    /// Right-handed view-projection producing wgpu clip space (depth in 0..1).
    ///
    /// The matrix follows euclid's row-vector convention, so its `to_array()` output can be
    /// uploaded as a column-major WGSL `mat4x4` and applied as `matrix * position`.
    pub fn view_projection(&self) -> Transform3D<f32> {
        let f = 1.0 / (self.fov_degrees.to_radians() / 2.0).tan();
        let depth = self.near - self.far;

        #[rustfmt::skip]
        let projection = Transform3D::new(
            f / self.aspect, 0.0, 0.0,                            0.0,
            0.0,             f,   0.0,                            0.0,
            0.0,             0.0, self.far / depth,              -1.0,
            0.0,             0.0, self.near * self.far / depth,   0.0,
        );

        Transform3D::translation(0.0, 0.0, -self.distance).then(&projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::geom::euclid::default::Point3D;

    #[test]
    fn zero_sized_screen_is_clamped() {
        let screen = Screen::new(0, 0);
        assert_eq!(screen.width, 1.0);
        assert_eq!(screen.aspect(), 1.0);
    }

    #[test]
    fn viewport_matches_field_of_view() {
        let camera = Camera::new(45.0, 20.0, Screen::new(1600, 800));
        let viewport = camera.viewport();
        let expected_height = 2.0 * (22.5f32.to_radians()).tan() * 20.0;
        assert!((viewport.height - expected_height).abs() < 1e-4);
        assert!((viewport.width - expected_height * 2.0).abs() < 1e-4);
    }

    #[test]
    fn viewport_edges_project_to_clip_edges() {
        let camera = Camera::new(45.0, 20.0, Screen::new(1600, 800));
        let viewport = camera.viewport();
        let matrix = camera.view_projection();

        let corner = matrix
            .transform_point3d(Point3D::new(viewport.half_width(), viewport.height / 2.0, 0.0))
            .unwrap();
        assert!((corner.x - 1.0).abs() < 1e-4);
        assert!((corner.y - 1.0).abs() < 1e-4);
        assert!(corner.z > 0.0 && corner.z < 1.0);
    }
}
