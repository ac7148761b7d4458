use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

/// View frustum as six inward-facing planes, extracted from a
/// view-projection matrix (Gribb/Hartmann).
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near (0..1 depth range)
            r3 - r2, // far
        ];
        for plane in &mut planes {
            let len = plane.xyz().length();
            if len > 0.0 {
                *plane /= len;
            }
        }
        Self { planes }
    }

    /// Conservative sphere test: true unless the sphere is fully outside
    /// at least one plane.
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.xyz().dot(center) + p.w >= -radius)
    }
}

/// Discrete level-of-detail representation selected by camera distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodLevel {
    /// Full detail, close to the camera.
    Near,
    /// Reduced detail.
    Mid,
    /// Coarsest representation.
    Far,
}

impl LodLevel {
    pub const ALL: [LodLevel; 3] = [LodLevel::Near, LodLevel::Mid, LodLevel::Far];
}

/// Camera-distance bands mapping each distance to exactly one LOD level.
///
/// Selection is total: any distance (including non-finite garbage) maps to
/// one and only one level, never zero and never more than one.
#[derive(Debug, Clone, Copy)]
pub struct LodBands {
    /// Distances below this render at `Near`.
    pub near_max: f32,
    /// Distances at or above this render at `Far`.
    pub far_min: f32,
}

impl Default for LodBands {
    fn default() -> Self {
        Self {
            near_max: 30.0,
            far_min: 80.0,
        }
    }
}

impl LodBands {
    pub fn select(&self, distance: f32) -> LodLevel {
        if distance < self.near_max {
            LodLevel::Near
        } else if distance < self.far_min {
            LodLevel::Mid
        } else {
            LodLevel::Far
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderView;

    fn frustum_looking_down_neg_z() -> Frustum {
        let view = RenderView {
            eye: Vec3::new(0.0, 0.0, 20.0),
            target: Vec3::ZERO,
            ..RenderView::default()
        };
        Frustum::from_view_projection(&view.view_projection())
    }

    #[test]
    fn sphere_at_focus_is_visible() {
        let frustum = frustum_looking_down_neg_z();
        assert!(frustum.contains_sphere(Vec3::ZERO, 1.0));
    }

    #[test]
    fn sphere_behind_camera_is_culled() {
        let frustum = frustum_looking_down_neg_z();
        assert!(!frustum.contains_sphere(Vec3::new(0.0, 0.0, 40.0), 1.0));
    }

    #[test]
    fn sphere_far_off_axis_is_culled() {
        let frustum = frustum_looking_down_neg_z();
        assert!(!frustum.contains_sphere(Vec3::new(500.0, 0.0, 0.0), 1.0));
    }

    #[test]
    fn sphere_beyond_far_plane_is_culled() {
        let frustum = frustum_looking_down_neg_z();
        assert!(!frustum.contains_sphere(Vec3::new(0.0, 0.0, -2000.0), 1.0));
    }

    #[test]
    fn large_sphere_straddling_a_plane_is_visible() {
        let frustum = frustum_looking_down_neg_z();
        // Center outside the left plane, radius reaches back in.
        assert!(frustum.contains_sphere(Vec3::new(-30.0, 0.0, 0.0), 40.0));
    }

    #[test]
    fn lod_selection_is_total_and_exclusive() {
        let bands = LodBands::default();
        let mut step = 0.0_f32;
        while step < 200.0 {
            let level = bands.select(step);
            // `select` returns exactly one level; check the bands agree
            // with their documentation.
            match level {
                LodLevel::Near => assert!(step < bands.near_max),
                LodLevel::Mid => assert!(step >= bands.near_max && step < bands.far_min),
                LodLevel::Far => assert!(step >= bands.far_min),
            }
            step += 0.5;
        }
    }

    #[test]
    fn lod_boundaries_are_deterministic() {
        let bands = LodBands::default();
        assert_eq!(bands.select(bands.near_max), LodLevel::Mid);
        assert_eq!(bands.select(bands.far_min), LodLevel::Far);
        assert_eq!(bands.select(f32::NAN), LodLevel::Far);
    }
}
