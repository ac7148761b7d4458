use glam::{Mat4, Vec3};
use synapse_scene::{AnimationParams, SceneGraph};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Surface aspect ratio (width / height).
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 4.0, 26.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

impl RenderView {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a view configuration, then produces
/// output. It never mutates the scene — animation truth is scene-owned.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene state and view.
    fn render(
        &mut self,
        scene: &SceneGraph,
        view: &RenderView,
        params: &AnimationParams,
    ) -> Self::Output;
}

/// Debug text renderer — workaround for the wgpu GPU backend.
///
/// Produces a human-readable string representation of the scene state.
/// Useful for CLI output, the low-end fallback surface, and testing the
/// render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(
        &mut self,
        scene: &SceneGraph,
        view: &RenderView,
        params: &AnimationParams,
    ) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (tier={}, clock={:.2}s) ===\n",
            scene.tier(),
            scene.clock()
        ));
        out.push_str(&format!(
            "Nodes: {} ({} active)  Edges: {} ({} active)\n",
            scene.node_count(),
            scene.nodes().iter().filter(|n| n.active).count(),
            scene.edge_count(),
            scene.edges().iter().filter(|e| e.active).count(),
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0}  glow={}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.fov_degrees,
            scene.tier().glow_enabled()
        ));

        let (dx, dy) = scene.drift_angles();
        out.push_str(&format!("Drift: ({dx:.3}, {dy:.3}) rad\n"));

        for (i, node) in scene.nodes().iter().enumerate().take(8) {
            let p = node.position;
            out.push_str(&format!(
                "  [{i:3}] pos=({:.2}, {:.2}, {:.2}) size={:.3} pulse={:.2}\n",
                p.x,
                p.y,
                p.z,
                scene.node_render_size(i, params),
                scene.node_pulse(i, params),
            ));
        }

        out
    }
}
