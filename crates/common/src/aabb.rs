use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding volume described by a center and full extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    pub size: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        debug_assert!(
            size.x > 0.0 && size.y > 0.0 && size.z > 0.0,
            "Aabb extents must be strictly positive"
        );
        Self { center, size }
    }

    /// Unit cube centered on `center`.
    pub fn unit(center: Vec3) -> Self {
        Self::new(center, Vec3::ONE)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Two volumes intersect iff their intervals overlap on all three axes.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x
            && a_max.x > b_min.x
            && a_min.y < b_max.y
            && a_max.y > b_min.y
            && a_min.z < b_max.z
            && a_max.z > b_min.z
    }

    /// True if `other` lies entirely inside this volume.
    pub fn contains(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        b_min.x >= a_min.x
            && b_max.x <= a_max.x
            && b_min.y >= a_min.y
            && b_max.y <= a_max.y
            && b_min.z >= a_min.z
            && b_max.z <= a_max.z
    }

    /// True if the point lies inside the volume (inclusive of the min face).
    pub fn contains_point(&self, p: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y && p.z >= min.z && p.z < max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_volumes_intersect() {
        let a = Aabb::unit(Vec3::ZERO);
        let b = Aabb::unit(Vec3::new(0.5, 0.0, 0.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_faces_do_not_intersect() {
        let a = Aabb::unit(Vec3::ZERO);
        let b = Aabb::unit(Vec3::new(1.0, 0.0, 0.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn separation_on_one_axis_is_enough() {
        let a = Aabb::unit(Vec3::ZERO);
        let b = Aabb::unit(Vec3::new(0.2, 3.0, 0.2));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn containment() {
        let world = Aabb::new(Vec3::ZERO, Vec3::splat(32.0));
        let cube = Aabb::unit(Vec3::new(4.0, 4.0, 4.0));
        assert!(world.contains(&cube));

        let outside = Aabb::unit(Vec3::new(16.5, 0.0, 0.0));
        assert!(!world.contains(&outside));
    }
}
