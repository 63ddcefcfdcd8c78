//! The orb scene and its renderer.
//!
//! [`SceneRenderer`] owns every scene object and the drawing backend. The page
//! shell talks to it only through `on_theme_changed`, `on_pointer_move`,
//! `on_resize` and `render_frame`; GPU calls stay behind [`RenderBackend`].

use glam::{Mat4, Vec3};

use crate::animation::{ColorTransition, FrameClock, OrbMotion};
use crate::color::Color;
use crate::config::{CameraConfig, Palette, SceneConfig};
use crate::error::SceneError;
use crate::geometry::MeshData;
use crate::particles::{ParticleField, PARTICLE_STRIDE};
use crate::random::RandomSource;
use crate::theme::Theme;
use crate::view::ViewState;

/// Width/height ratio with both sides clamped to at least one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKind {
    Core,
    Glow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub face: Face,
    /// Unlit materials ignore every light and draw their flat color.
    pub lit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshNode {
    pub kind: MeshKind,
    pub material: Material,
}

/// Geometry shown only while its theme is active.
#[derive(Clone, Debug)]
pub struct ThemedGroup {
    pub theme: Theme,
    pub visible: bool,
    pub meshes: Vec<MeshNode>,
}

impl ThemedGroup {
    fn new(theme: Theme, palette: &Palette, visible: bool) -> Self {
        ThemedGroup {
            theme,
            visible,
            meshes: vec![
                MeshNode {
                    kind: MeshKind::Core,
                    material: Material {
                        color: palette.orb,
                        emissive: palette.orb,
                        emissive_intensity: palette.orb_emissive_intensity,
                        opacity: palette.orb_opacity,
                        face: Face::Front,
                        lit: true,
                    },
                },
                MeshNode {
                    kind: MeshKind::Glow,
                    material: Material {
                        color: palette.glow,
                        emissive: Color::TRANSPARENT,
                        emissive_intensity: 0.0,
                        opacity: palette.glow_opacity,
                        face: Face::Back,
                        lit: false,
                    },
                },
            ],
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub position: Vec3,
    pub color: ColorTransition,
    pub intensity: f32,
    /// Distance at which the light's contribution reaches zero.
    pub range: f32,
}

#[derive(Clone, Debug)]
pub struct Lights {
    pub ambient: Color,
    pub ambient_intensity: f32,
    pub directional: Color,
    pub directional_position: Vec3,
    pub points: [PointLight; 2],
}

impl Lights {
    fn new(palette: &Palette, frames: u32) -> Self {
        let [p1, p2] = palette.point_lights;
        Lights {
            ambient: palette.ambient,
            ambient_intensity: palette.ambient_intensity,
            directional: palette.directional,
            directional_position: Vec3::new(5.0, 5.0, 5.0),
            points: [
                PointLight {
                    position: Vec3::new(2.0, 2.0, 2.0),
                    color: ColorTransition::settled(p1, frames),
                    intensity: 1.0,
                    range: 10.0,
                },
                PointLight {
                    position: Vec3::new(-2.0, -2.0, 2.0),
                    color: ColorTransition::settled(p2, frames),
                    intensity: 1.0,
                    range: 10.0,
                },
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Camera {
    fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        Camera {
            fov_y: config.fov_degrees.to_radians(),
            aspect: aspect_ratio(width, height),
            near: config.near,
            far: config.far,
            position: Vec3::new(0.0, 0.0, config.distance),
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Light values resolved for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug)]
pub struct FrameData<'a> {
    pub view_projection: Mat4,
    pub model: Mat4,
    pub camera_position: Vec3,
    /// Meshes of the visible themed group, in draw order.
    pub meshes: &'a [MeshNode],
    pub ambient: Color,
    pub directional: Color,
    pub directional_position: Vec3,
    pub point_lights: [FrameLight; 2],
    /// Seconds of animated time, for shader motion.
    pub time: f32,
    pub pulse: f32,
    /// Interleaved particle vertices, see [`PARTICLE_STRIDE`].
    pub particle_vertices: &'a [f32],
    pub particle_colors: [Color; 2],
    /// Surface size in CSS pixels.
    pub surface_size: (u32, u32),
}

impl FrameData<'_> {
    pub fn particle_count(&self) -> usize {
        self.particle_vertices.len() / PARTICLE_STRIDE
    }
}

/// Static meshes uploaded once when the backend is created.
pub struct SceneGeometry {
    pub core: MeshData,
    pub glow: MeshData,
}

/// GPU side of the renderer.
pub trait RenderBackend {
    /// Match the drawing buffer to a surface of `width` x `height` CSS pixels.
    /// Both are at least 1. Must reuse existing buffers.
    fn resize(&mut self, width: u32, height: u32);

    /// Issue the draw calls for one frame.
    fn draw(&mut self, frame: &FrameData<'_>);

    /// Number of GPU buffers currently allocated.
    fn buffer_count(&self) -> usize;
}

/// Something that can be drawn on: reports its size and creates a backend.
pub trait RenderSurface {
    type Backend: RenderBackend;

    /// Size in CSS pixels. May be zero while hidden.
    fn size(&self) -> (u32, u32);

    fn create_backend(&self, geometry: &SceneGeometry) -> Result<Self::Backend, SceneError>;
}

pub struct SceneRenderer<B: RenderBackend> {
    config: SceneConfig,
    backend: B,
    theme: Theme,
    camera: Camera,
    lights: Lights,
    groups: Vec<ThemedGroup>,
    particles: ParticleField,
    particle_colors: [ColorTransition; 2],
    motion: OrbMotion,
    view: ViewState,
    clock: FrameClock,
    rng: Box<dyn RandomSource>,
    vertex_scratch: Vec<f32>,
    size: (u32, u32),
}

impl<B: RenderBackend> SceneRenderer<B> {
    /// Build the scene on `surface` with colors and visibility for
    /// `initial_theme`. Fails when the surface cannot provide a backend.
    pub fn initialize<S>(
        surface: &S,
        initial_theme: Theme,
        config: SceneConfig,
        mut rng: Box<dyn RandomSource>,
    ) -> Result<Self, SceneError>
    where
        S: RenderSurface<Backend = B>,
    {
        config.validate()?;

        let (raw_w, raw_h) = surface.size();
        let (width, height) = (raw_w.max(1), raw_h.max(1));

        let geometry = SceneGeometry {
            core: MeshData::sphere(config.orb.radius, config.orb.segments, config.orb.segments),
            glow: MeshData::sphere(
                config.orb.glow_radius,
                config.orb.glow_segments,
                config.orb.glow_segments,
            ),
        };
        let mut backend = surface.create_backend(&geometry)?;
        backend.resize(width, height);

        let palette = config.palette(initial_theme);
        let frames = config.transition_frames;
        let groups = Theme::ALL
            .iter()
            .map(|&theme| ThemedGroup::new(theme, config.palette(theme), theme == initial_theme))
            .collect();
        let [c1, c2] = palette.particle_colors();
        let particles = ParticleField::generate(width, height, &config.particles, rng.as_mut());

        log::info!(
            "orb scene ready: {width}x{height}, {} particles, theme {initial_theme}",
            particles.len()
        );

        Ok(SceneRenderer {
            camera: Camera::new(&config.camera, width, height),
            lights: Lights::new(palette, frames),
            particle_colors: [
                ColorTransition::settled(c1, frames),
                ColorTransition::settled(c2, frames),
            ],
            config,
            backend,
            theme: initial_theme,
            groups,
            particles,
            motion: OrbMotion::default(),
            view: ViewState::default(),
            clock: FrameClock::default(),
            rng,
            vertex_scratch: Vec::new(),
            size: (width, height),
        })
    }

    /// Show the group for `theme` and retarget light and particle colors.
    /// Geometry is untouched; colors ease over the configured frames.
    pub fn on_theme_changed(&mut self, theme: Theme) {
        self.theme = theme;
        for group in &mut self.groups {
            group.visible = group.theme == theme;
        }

        let palette = self.config.palette(theme);
        self.lights.ambient = palette.ambient;
        self.lights.ambient_intensity = palette.ambient_intensity;
        self.lights.directional = palette.directional;
        for (light, color) in self.lights.points.iter_mut().zip(palette.point_lights) {
            light.color.retarget(color);
        }
        for (transition, color) in self.particle_colors.iter_mut().zip(palette.particle_colors()) {
            transition.retarget(color);
        }
        log::debug!("orb scene switched to {theme}");
    }

    /// Record the pointer for the next frame's rotation. Draws nothing.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.view.set_pointer(x, y);
    }

    /// Resize to `width` x `height` CSS pixels. Zero dimensions are treated
    /// as one pixel. The particle field is scattered afresh over the new area.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.size = (width, height);
        self.camera.aspect = aspect_ratio(width, height);
        self.backend.resize(width, height);
        self.particles =
            ParticleField::generate(width, height, &self.config.particles, self.rng.as_mut());
        log::debug!("orb surface resized to {width}x{height}");
    }

    /// Advance animation state by one frame and draw it.
    pub fn render_frame(&mut self, timestamp_ms: f64) {
        self.clock.tick(timestamp_ms);
        self.motion.step(self.view.pointer(), &self.config.motion);
        for light in &mut self.lights.points {
            light.color.step();
        }
        for transition in &mut self.particle_colors {
            transition.step();
        }

        let elapsed = self.clock.elapsed();
        self.particles.write_vertices(elapsed, &mut self.vertex_scratch);

        let meshes = self
            .groups
            .iter()
            .find(|g| g.visible)
            .map(|g| g.meshes.as_slice())
            .unwrap_or(&[]);
        let resolve = |light: &PointLight| FrameLight {
            position: light.position,
            color: light.color.current(),
            intensity: light.intensity,
            range: light.range,
        };
        let frame = FrameData {
            view_projection: self.camera.view_projection(),
            model: self.motion.model_matrix(),
            camera_position: self.camera.position,
            meshes,
            ambient: self.lights.ambient.scaled(self.lights.ambient_intensity),
            directional: self.lights.directional,
            directional_position: self.lights.directional_position,
            point_lights: [resolve(&self.lights.points[0]), resolve(&self.lights.points[1])],
            time: elapsed as f32,
            pulse: self.config.orb.pulse,
            particle_vertices: &self.vertex_scratch,
            particle_colors: [self.particle_colors[0].current(), self.particle_colors[1].current()],
            surface_size: self.size,
        };
        self.backend.draw(&frame);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn groups(&self) -> &[ThemedGroup] {
        &self.groups
    }

    /// Themes whose group is currently visible.
    pub fn visible_themes(&self) -> Vec<Theme> {
        self.groups.iter().filter(|g| g.visible).map(|g| g.theme).collect()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn particle_colors(&self) -> [&ColorTransition; 2] {
        [&self.particle_colors[0], &self.particle_colors[1]]
    }

    pub fn motion(&self) -> &OrbMotion {
        &self.motion
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
