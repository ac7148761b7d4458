use glam::Vec3;
use synapse_render::RenderView;

/// Orbit camera circling the scene origin.
/// Camera motion is cosmetic and lives outside the animation clock.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            distance: 26.0,
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.15,
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
            sensitivity: 0.005,
        }
    }
}

impl OrbitCamera {
    /// Camera position derived from the orbit parameters.
    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        ) * self.distance
    }

    /// Rotate the orbit by a mouse delta.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-1.4, 1.4);
    }

    /// Move toward/away from the scene, clamped to a sane range.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(8.0, 120.0);
    }

    /// Snapshot as a renderer-agnostic view.
    pub fn view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: Vec3::ZERO,
            fov_degrees: self.fov_degrees,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_produces_valid_matrix() {
        let cam = OrbitCamera::default();
        let vp = cam.view().view_projection();
        assert!(!vp.col(0).x.is_nan());
        assert!(cam.eye().length() > 0.0);
    }

    #[test]
    fn eye_sits_at_orbit_distance() {
        let cam = OrbitCamera::default();
        assert!((cam.eye().length() - cam.distance).abs() < 1e-4);
    }

    #[test]
    fn rotate_moves_the_eye() {
        let mut cam = OrbitCamera::default();
        let before = cam.eye();
        cam.rotate(100.0, 0.0);
        assert_ne!(cam.eye(), before);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 1e6);
        assert!(cam.pitch <= 1.4);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1e6);
        assert!(cam.distance >= 8.0);
        cam.zoom(-1e6);
        assert!(cam.distance <= 120.0);
    }
}
