//! Camera for primary ray generation.

use whit_math::Vec3;

/// Source of one primary ray per pixel.
pub trait RayGenerator: Send + Sync {
    /// Shared origin of every primary ray.
    fn origin(&self) -> Vec3;

    /// Direction through the center of pixel (x, y), row 0 at the top.
    /// Not necessarily unit length.
    fn ray_direction(&self, x: u32, y: u32) -> Vec3;

    /// Recompute the pixel grid for a new viewport size.
    fn resize_viewport(&mut self, width: u32, height: u32);
}

/// Pinhole camera with a vertical field of view.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32, // degrees

    width: u32,
    height: u32,

    // Cached by update()
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl PinholeCamera {
    /// Camera at the origin looking down -Z.
    pub fn new(width: u32, height: u32, vfov: f32) -> Self {
        Self::looking_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, width, height, vfov)
    }

    pub fn looking_at(look_from: Vec3, look_at: Vec3, vup: Vec3, width: u32, height: u32, vfov: f32) -> Self {
        let mut camera = Self {
            look_from,
            look_at,
            vup,
            vfov,
            width: width.max(1),
            height: height.max(1),
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        };
        camera.update();
        camera
    }

    pub fn vfov(&self) -> f32 {
        self.vfov
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn update(&mut self) {
        // Image plane one unit in front of the eye
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.width as f32 / self.height as f32);

        let w = (self.look_from - self.look_at).normalize_or_zero();
        let u = self.vup.cross(w).normalize_or_zero();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / self.width as f32;
        self.pixel_delta_v = viewport_v / self.height as f32;

        let upper_left = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }
}

impl RayGenerator for PinholeCamera {
    fn origin(&self) -> Vec3 {
        self.look_from
    }

    fn ray_direction(&self, x: u32, y: u32) -> Vec3 {
        let pixel = self.pixel00_loc + x as f32 * self.pixel_delta_u + y as f32 * self.pixel_delta_v;
        pixel - self.look_from
    }

    fn resize_viewport(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_forward() {
        let camera = PinholeCamera::new(101, 101, 90.0);
        let dir = camera.ray_direction(50, 50).normalize();
        assert!((dir - Vec3::NEG_Z).length() < 1e-4);
        assert_eq!(camera.origin(), Vec3::ZERO);
    }

    #[test]
    fn test_corners_span_fov() {
        let camera = PinholeCamera::new(100, 100, 90.0);

        // Top-left pixel is up and to the left
        let tl = camera.ray_direction(0, 0);
        assert!(tl.x < 0.0 && tl.y > 0.0);
        let br = camera.ray_direction(99, 99);
        assert!(br.x > 0.0 && br.y < 0.0);

        // 90 degree vertical fov: the image plane edge sits at y = 1 at unit distance
        let top_edge = tl.y + camera.pixel_delta_v.y * -0.5;
        assert!((top_edge - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_resize_keeps_center() {
        let mut camera = PinholeCamera::new(64, 64, 60.0);
        camera.resize_viewport(201, 101);
        assert_eq!(camera.viewport(), (201, 101));
        let dir = camera.ray_direction(100, 50).normalize();
        assert!((dir - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_looking_at_target() {
        let target = Vec3::new(3.0, 1.0, -4.0);
        let camera = PinholeCamera::looking_at(Vec3::new(0.0, 1.0, 0.0), target, Vec3::Y, 11, 11, 45.0);
        let dir = camera.ray_direction(5, 5).normalize();
        let expected = (target - camera.origin()).normalize();
        assert!((dir - expected).length() < 1e-4);
    }
}
