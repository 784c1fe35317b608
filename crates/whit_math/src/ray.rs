use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// The direction is not required to be unit length. A zero direction is the
/// terminated-ray sentinel: it is produced when refraction is impossible and
/// every consumer treats it as "no light travels along this ray".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// True for the zero-direction sentinel.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.direction == Vec3::ZERO
    }

    /// Same ray with a unit-length direction.
    ///
    /// Terminated rays are returned unchanged.
    pub fn normalized(&self) -> Ray {
        Ray::new(self.origin, self.direction.normalize_or_zero())
    }
}
