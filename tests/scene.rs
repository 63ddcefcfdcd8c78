use glam::Vec2;

use orb_viz::animation::OrbMotion;
use orb_viz::config::Palette;
use orb_viz::random::SequenceSource;
use orb_viz::scene::{FrameData, MeshKind, MeshNode, SceneGeometry};
use orb_viz::{RenderBackend, RenderSurface, SceneConfig, SceneError, SceneRenderer, Theme};

#[derive(Default)]
struct RecordingBackend {
    buffers: usize,
    resizes: Vec<(u32, u32)>,
    draws: usize,
    last_meshes: Vec<MeshNode>,
    last_particles: usize,
    last_time: f32,
}

impl RenderBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn draw(&mut self, frame: &FrameData<'_>) {
        self.draws += 1;
        self.last_meshes = frame.meshes.to_vec();
        self.last_particles = frame.particle_count();
        self.last_time = frame.time;
    }

    fn buffer_count(&self) -> usize {
        self.buffers
    }
}

struct TestSurface {
    width: u32,
    height: u32,
    has_context: bool,
}

impl TestSurface {
    fn new(width: u32, height: u32) -> Self {
        TestSurface {
            width,
            height,
            has_context: true,
        }
    }
}

impl RenderSurface for TestSurface {
    type Backend = RecordingBackend;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_backend(&self, geometry: &SceneGeometry) -> Result<RecordingBackend, SceneError> {
        if !self.has_context {
            return Err(SceneError::context("no webgl2"));
        }
        assert!(geometry.core.triangle_count() > 0);
        assert!(geometry.glow.triangle_count() > 0);
        Ok(RecordingBackend {
            buffers: 5,
            ..Default::default()
        })
    }
}

fn renderer(theme: Theme) -> SceneRenderer<RecordingBackend> {
    renderer_on(TestSurface::new(1280, 720), theme, SceneConfig::default())
}

fn renderer_on(
    surface: TestSurface,
    theme: Theme,
    config: SceneConfig,
) -> SceneRenderer<RecordingBackend> {
    SceneRenderer::initialize(&surface, theme, config, Box::new(fastrand::Rng::with_seed(7)))
        .expect("initialize")
}

#[test]
fn initialize_shows_only_the_dark_group() {
    let r = renderer(Theme::Dark);
    assert_eq!(r.visible_themes(), vec![Theme::Dark]);
    assert_eq!(r.groups().len(), 2);
    assert_eq!(r.theme(), Theme::Dark);
}

#[test]
fn theme_change_flips_visibility_exactly_once() {
    let mut r = renderer(Theme::Dark);
    r.on_theme_changed(Theme::Light);
    assert_eq!(r.visible_themes(), vec![Theme::Light]);

    r.render_frame(0.0);
    let palette = Palette::light();
    let core = r.backend().last_meshes[0];
    assert_eq!(core.kind, MeshKind::Core);
    assert_eq!(core.material.color, palette.orb);
    assert_eq!(r.backend().last_meshes[1].material.color, palette.glow);

    r.on_theme_changed(Theme::Dark);
    assert_eq!(r.visible_themes(), vec![Theme::Dark]);
}

#[test]
fn theme_change_keeps_groups_in_place() {
    let mut r = renderer(Theme::Dark);
    let before: Vec<_> = r.groups().iter().map(|g| (g.meshes.as_ptr(), g.meshes.clone())).collect();
    r.on_theme_changed(Theme::Light);
    r.on_theme_changed(Theme::Dark);
    r.on_theme_changed(Theme::Light);
    for (group, (ptr, meshes)) in r.groups().iter().zip(before) {
        assert_eq!(group.meshes.as_ptr(), ptr);
        assert_eq!(group.meshes, meshes);
        assert_eq!(group.visible, group.theme == Theme::Light);
    }
}

#[test]
fn theme_change_sets_targets_now_and_eases_over_frames() {
    let config = SceneConfig::default();
    let frames = config.transition_frames;
    let mut r = renderer_on(TestSurface::new(1280, 720), Theme::Dark, config);
    let light = Palette::light();

    r.on_theme_changed(Theme::Light);
    let point = &r.lights().points[0].color;
    assert_eq!(point.target(), light.point_lights[0]);
    assert_ne!(point.current(), light.point_lights[0]);
    assert_eq!(r.particle_colors()[0].target(), light.particle_colors()[0]);

    for _ in 0..frames {
        r.render_frame(0.0);
    }
    for (light_state, expected) in r.lights().points.iter().zip(light.point_lights) {
        assert!(light_state.color.is_settled());
        assert_eq!(light_state.color.current(), expected);
    }
    assert_eq!(r.particle_colors()[1].current(), light.particle_colors()[1]);
}

#[test]
fn initialize_reports_missing_context() {
    let surface = TestSurface {
        has_context: false,
        ..TestSurface::new(800, 600)
    };
    let result = SceneRenderer::initialize(
        &surface,
        Theme::Dark,
        SceneConfig::default(),
        Box::new(fastrand::Rng::with_seed(1)),
    );
    assert!(matches!(result, Err(SceneError::ContextUnavailable(_))));
}

#[test]
fn initialize_rejects_invalid_config() {
    let mut config = SceneConfig::default();
    config.motion.ease_factor = 0.0;
    let result = SceneRenderer::initialize(
        &TestSurface::new(800, 600),
        Theme::Dark,
        config,
        Box::new(fastrand::Rng::with_seed(1)),
    );
    assert!(matches!(result, Err(SceneError::Config(_))));
}

#[test]
fn zero_sized_resize_clamps_to_one_pixel() {
    let mut r = renderer(Theme::Dark);
    r.on_resize(0, 0);
    assert_eq!(r.surface_size(), (1, 1));
    assert_eq!(r.camera().aspect, 1.0);
    assert!(r.camera().projection().is_finite());
    assert_eq!(r.backend().resizes.last(), Some(&(1, 1)));

    r.on_resize(0, 400);
    assert_eq!(r.camera().aspect, 1.0 / 400.0);
    r.render_frame(16.0);
    assert_eq!(r.backend().draws, 1);
}

#[test]
fn zero_sized_surface_initializes() {
    let r = renderer_on(TestSurface::new(0, 0), Theme::Light, SceneConfig::default());
    assert_eq!(r.surface_size(), (1, 1));
    assert!(r.camera().aspect.is_finite());
}

#[test]
fn repeated_resizes_reuse_buffers() {
    let mut r = renderer(Theme::Dark);
    let before = r.backend().buffer_count();
    for i in 0..20 {
        r.on_resize(300 + i * 50, 200 + i * 10);
    }
    assert_eq!(r.backend().buffer_count(), before);
    assert_eq!(r.backend().resizes.len(), 21);
    assert_eq!(r.camera().aspect, 1250.0 / 390.0);
}

#[test]
fn deterministic_particles_fill_exactly_the_surface() {
    let n = 40;
    let mut config = SceneConfig::default();
    config.particles.count = n;
    let rng = SequenceSource::new(vec![0.0, 0.999_999, 0.5, 0.25, 0.75, 0.123, 0.9, 0.01]);
    let surface = TestSurface::new(1024, 600);
    let r = SceneRenderer::initialize(&surface, Theme::Dark, config, Box::new(rng))
        .expect("initialize");

    let particles = r.particles().particles();
    assert_eq!(particles.len(), n);
    for p in particles {
        assert!((0.0..=1024.0).contains(&p.x), "x = {}", p.x);
        assert!((0.0..=600.0).contains(&p.y), "y = {}", p.y);
        assert!((1.0..=4.0).contains(&p.size));
        assert!((0.1..=0.6).contains(&p.opacity));
        assert!((10.0..=30.0).contains(&p.period));
    }
}

#[test]
fn narrow_surfaces_get_half_the_particles() {
    let r = renderer_on(TestSurface::new(600, 800), Theme::Dark, SceneConfig::default());
    assert_eq!(r.particles().len(), 30);

    let mut r = renderer(Theme::Dark);
    assert_eq!(r.particles().len(), 60);
    r.on_resize(500, 900);
    assert_eq!(r.particles().len(), 30);
    for p in r.particles().particles() {
        assert!(p.x <= 500.0 && p.y <= 900.0);
    }
}

#[test]
fn pointer_move_has_no_render_side_effect() {
    let mut r = renderer(Theme::Dark);
    r.on_pointer_move(0.5, -0.5);
    r.on_pointer_move(4.0, -9.0);
    assert_eq!(r.backend().draws, 0);
    assert_eq!(r.view().pointer(), Vec2::new(1.0, -1.0));
    assert_eq!(*r.motion(), OrbMotion::default());
}

#[test]
fn each_frame_issues_one_draw_of_the_visible_group() {
    let mut r = renderer(Theme::Dark);
    for i in 0..5 {
        r.render_frame(i as f64 * 16.0);
    }
    let backend = r.backend();
    assert_eq!(backend.draws, 5);
    let kinds: Vec<_> = backend.last_meshes.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MeshKind::Core, MeshKind::Glow]);
    assert_eq!(backend.last_meshes[0].material.color, Palette::dark().orb);
    assert_eq!(backend.last_particles, 60);
    assert!((backend.last_time - 0.064).abs() < 1e-5);
}

fn assert_monotonic_approach(pointer: (f32, f32), frames: usize) {
    let mut r = renderer(Theme::Dark);
    r.on_pointer_move(pointer.0, pointer.1);
    let target = OrbMotion::tilt_target(r.view().pointer(), &r.config().motion);

    let mut previous = r.motion().tilt();
    for k in 0..frames {
        r.render_frame(k as f64 * 16.0);
        let tilt = r.motion().tilt();
        for axis in 0..2 {
            let (t, before, now) = (target[axis], previous[axis], tilt[axis]);
            if before == t {
                assert_eq!(now, t);
                continue;
            }
            assert!(
                (t - now).abs() < (t - before).abs(),
                "axis {axis} frame {k}: {before} -> {now}, target {t}"
            );
            // never crosses to the other side of the target
            assert!(
                (t - now).signum() == (t - before).signum(),
                "overshoot on axis {axis} at frame {k}"
            );
        }
        previous = tilt;
    }
}

#[test]
fn rotation_eases_toward_pointer_without_overshoot() {
    assert_monotonic_approach((1.0, 1.0), 120);
    assert_monotonic_approach((-0.4, 0.8), 120);
}

#[test]
fn rotation_with_full_ease_lands_on_target() {
    let mut config = SceneConfig::default();
    config.motion.ease_factor = 1.0;
    let mut r = renderer_on(TestSurface::new(1280, 720), Theme::Dark, config);
    r.on_pointer_move(0.2, -0.6);
    r.render_frame(0.0);
    let target = OrbMotion::tilt_target(r.view().pointer(), &r.config().motion);
    assert_eq!(r.motion().tilt(), target);
}

#[test]
fn spin_keeps_advancing_with_a_still_pointer() {
    let mut r = renderer(Theme::Dark);
    for k in 0..10 {
        r.render_frame(k as f64 * 16.0);
    }
    let spin = r.motion().spin();
    assert!((spin.x - 0.01).abs() < 1e-6);
    assert!((spin.y - 0.03).abs() < 1e-6);
    assert_eq!(r.motion().tilt(), Vec2::ZERO);
}
