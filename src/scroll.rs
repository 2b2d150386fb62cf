/// Horizontal scroll direction of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Eased scroll position of one gallery, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub current: f32,
    pub target: f32,
    /// `current` as of the previous rendered frame.
    pub last: f32,
    pub ease: f32,
}

impl ScrollState {
    pub fn new(ease: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            last: 0.0,
            ease,
        }
    }

    /// Moves `current` a fixed fraction of the way toward `target`.
    pub fn ease_step(&mut self) {
        self.current += (self.target - self.current) * self.ease;
    }

    pub fn direction(&self) -> Direction {
        if self.current > self.last {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    pub fn velocity(&self) -> f32 {
        self.current - self.last
    }

    /// Must run after the frame is rendered.
    pub fn commit_frame(&mut self) {
        self.last = self.current;
    }

    /// Rounds `target` to the nearest tile boundary.
    pub fn snap(&mut self, tile_width: f32) {
        self.target = snap_to_grid(self.target, tile_width);
    }
}

/// Rounds the magnitude of `target` to a multiple of `tile_width`, keeping its sign.
pub fn snap_to_grid(target: f32, tile_width: f32) -> f32 {
    if tile_width <= 0.0 || !tile_width.is_finite() {
        return target;
    }
    let steps = (target.abs() / tile_width).round();
    steps * tile_width * target.signum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_step_covers_fraction_of_distance() {
        let mut scroll = ScrollState::new(0.05);
        scroll.target = 10.0;
        scroll.ease_step();
        assert!((scroll.current - 0.5).abs() < 1e-6);
        assert_eq!(scroll.direction(), Direction::Right);
        assert!((scroll.velocity() - 0.5).abs() < 1e-6);
        scroll.commit_frame();
        assert_eq!(scroll.velocity(), 0.0);
    }

    #[test]
    fn standing_still_reads_as_left() {
        let scroll = ScrollState::new(0.05);
        assert_eq!(scroll.direction(), Direction::Left);
    }

    #[test]
    fn snapping_keeps_sign() {
        assert_eq!(snap_to_grid(7.4, 3.0), 6.0);
        assert_eq!(snap_to_grid(-7.6, 3.0), -9.0);
        assert_eq!(snap_to_grid(1.0, 0.0), 1.0);
        assert_eq!(snap_to_grid(0.0, 3.0), 0.0);
    }
}
