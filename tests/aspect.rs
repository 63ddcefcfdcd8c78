use glam::Vec3;

use orb_viz::config::PageConfig;
use orb_viz::scene::aspect_ratio;

fn approx_eq2(a: (f32, f32), b: (f32, f32), eps: f32) -> bool {
    (a.0 - b.0).abs() < eps && (a.1 - b.1).abs() < eps
}

fn project(aspect: f32, p: Vec3) -> (f32, f32) {
    let proj = glam::Mat4::perspective_rh_gl(75f32.to_radians(), aspect, 0.1, 1000.0);
    let view = glam::Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let clip = proj * view * p.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    (ndc.x, ndc.y)
}

#[test]
fn degenerate_sizes_clamp_to_one_pixel() {
    assert_eq!(aspect_ratio(0, 0), 1.0);
    assert_eq!(aspect_ratio(0, 200), 1.0 / 200.0);
    assert_eq!(aspect_ratio(300, 0), 300.0);
    assert_eq!(aspect_ratio(1920, 1080), 1920.0 / 1080.0);
}

#[test]
fn orb_keeps_its_shape_across_aspects() {
    // A point on the orb's equator and one on its meridian project to the
    // same pixel distance from centre whatever the surface shape.
    let sizes = [(1920u32, 1080u32), (1080, 1920), (960, 960), (1, 1)];
    for (w, h) in sizes {
        let aspect = aspect_ratio(w, h);
        let (ex, _) = project(aspect, Vec3::new(2.0, 0.0, 0.0));
        let (_, my) = project(aspect, Vec3::new(0.0, 2.0, 0.0));
        let px = (ex * w as f32 / 2.0, my * h as f32 / 2.0);
        assert!(approx_eq2(px, (px.1, px.0), 1e-2), "{w}x{h}: {px:?}");
    }
}

#[test]
fn orb_takes_half_the_viewport_on_wide_screens() {
    let page = PageConfig::default();
    assert_eq!(page.orb_surface_size(1440.0, 900.0), (720, 900));
    assert_eq!(page.orb_surface_size(993.0, 700.0), (496, 700));
    assert_eq!(page.orb_surface_size(992.0, 700.0), (992, 700));
    assert_eq!(page.orb_surface_size(375.0, 812.0), (375, 812));
    assert_eq!(page.orb_surface_size(-5.0, f64::NAN), (0, 0));
}
