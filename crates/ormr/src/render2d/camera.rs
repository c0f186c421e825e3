//! 2D camera: world position, shake offset and zoom.
//!
//! The camera's position is the world point shown at the center of the
//! display. `scale` is display pixels per world unit.

use crate::math::{IVec2, Mat4, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2d {
    pub pos: Vec2,
    /// Transient offset added to `pos` (screen shake).
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for Camera2d {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera2d {
    pub fn new(pos: Vec2, scale: f32) -> Self {
        assert!(scale > 0.0, "camera scale must be positive");
        Self {
            pos,
            offset: Vec2::ZERO,
            scale,
        }
    }

    /// Position including the shake offset.
    pub fn effective_pos(&self) -> Vec2 {
        self.pos + self.offset
    }

    /// Visible world-space size.
    pub fn size(&self, display_size: IVec2) -> Vec2 {
        debug_assert!(display_size.x > 0 && display_size.y > 0);
        display_size.as_vec2() / self.scale
    }

    /// World position of the display's top-left corner.
    pub fn top_left(&self, display_size: IVec2) -> Vec2 {
        self.effective_pos() - self.size(display_size) / 2.0
    }

    /// World → display pixels.
    pub fn to_display_pos(&self, pos: Vec2, display_size: IVec2) -> Vec2 {
        (pos - self.top_left(display_size)) * self.scale
    }

    /// Display pixels → world (e.g. the mouse cursor).
    pub fn to_camera_pos(&self, pos: Vec2, display_size: IVec2) -> Vec2 {
        self.top_left(display_size) + pos / self.scale
    }

    /// View matrix mapping world units to display pixels.
    pub fn view_matrix(&self, display_size: IVec2) -> Mat4 {
        debug_assert!(display_size.x > 0 && display_size.y > 0);

        let half = display_size.as_vec2() / 2.0;
        let translation = -self.effective_pos() * self.scale + half;
        Mat4::from_translation(Vec3::new(translation.x, translation.y, 0.0))
            * Mat4::from_scale(Vec3::new(self.scale, self.scale, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY: IVec2 = IVec2::new(320, 240);

    #[test]
    fn centered_on_position() {
        let cam = Camera2d::new(Vec2::new(100.0, 50.0), 2.0);
        assert_eq!(cam.size(DISPLAY), Vec2::new(160.0, 120.0));
        assert_eq!(cam.top_left(DISPLAY), Vec2::new(20.0, -10.0));
        assert_eq!(cam.to_display_pos(cam.pos, DISPLAY), Vec2::new(160.0, 120.0));
    }

    #[test]
    fn display_and_camera_positions_invert() {
        let mut cam = Camera2d::new(Vec2::new(-40.0, 12.0), 3.0);
        cam.offset = Vec2::new(1.5, -2.0);

        let world = Vec2::new(7.0, 9.0);
        let back = cam.to_camera_pos(cam.to_display_pos(world, DISPLAY), DISPLAY);
        assert!(back.distance(world) < 1e-4, "{back} != {world}");
    }

    #[test]
    fn view_matrix_agrees_with_to_display_pos() {
        let cam = Camera2d::new(Vec2::new(64.0, 32.0), 2.0);
        let world = Vec2::new(80.0, 10.0);

        let by_matrix = cam.view_matrix(DISPLAY).transform_point3(Vec3::new(world.x, world.y, 0.0));
        let by_fn = cam.to_display_pos(world, DISPLAY);
        assert!((by_matrix.x - by_fn.x).abs() < 1e-4);
        assert!((by_matrix.y - by_fn.y).abs() < 1e-4);
    }
}
