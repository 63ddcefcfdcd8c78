//! Tunable scene parameters.
//!
//! Defaults reproduce the portfolio page's look. Sections can be overridden
//! from JSON and missing fields keep their defaults, except palettes, which are
//! replaced whole.

use serde::Deserialize;

use crate::color::Color;
use crate::error::ConfigError;
use crate::geometry::MAX_SPHERE_SEGMENTS;
use crate::theme::Theme;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub dark: Palette,
    pub light: Palette,
    pub particles: ParticleConfig,
    pub motion: MotionConfig,
    pub camera: CameraConfig,
    pub orb: OrbConfig,
    /// Frames over which light and particle colors ease to a new theme.
    pub transition_frames: u32,
    pub starfield: StarfieldConfig,
    pub page: PageConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dark: Palette::dark(),
            light: Palette::light(),
            particles: ParticleConfig::default(),
            motion: MotionConfig::default(),
            camera: CameraConfig::default(),
            orb: OrbConfig::default(),
            transition_frames: 24,
            starfield: StarfieldConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn palette(&self, theme: Theme) -> &Palette {
        match theme {
            Theme::Dark => &self.dark,
            Theme::Light => &self.light,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ease = self.motion.ease_factor;
        if !(ease > 0.0 && ease <= 1.0) {
            return Err(out_of_range("motion.ease_factor", "in (0, 1]", ease));
        }

        let camera = &self.camera;
        positive("camera.fov_degrees", camera.fov_degrees)?;
        if camera.fov_degrees >= 180.0 {
            return Err(out_of_range("camera.fov_degrees", "below 180", camera.fov_degrees));
        }
        positive("camera.near", camera.near)?;
        if !(camera.far > camera.near && camera.far.is_finite()) {
            return Err(out_of_range("camera.far", "greater than camera.near", camera.far));
        }
        positive("camera.distance", camera.distance)?;

        let orb = &self.orb;
        positive("orb.radius", orb.radius)?;
        positive("orb.glow_radius", orb.glow_radius)?;
        segments("orb.segments", orb.segments)?;
        segments("orb.glow_segments", orb.glow_segments)?;

        let particles = &self.particles;
        positive("particles.min_size", particles.min_size)?;
        not_below("particles.max_size", particles.max_size, particles.min_size)?;
        if !(0.0..=1.0).contains(&particles.min_opacity) {
            return Err(out_of_range("particles.min_opacity", "in [0, 1]", particles.min_opacity));
        }
        not_below("particles.max_opacity", particles.max_opacity, particles.min_opacity)?;
        positive("particles.min_period", particles.min_period)?;
        not_below("particles.max_period", particles.max_period, particles.min_period)?;
        Ok(())
    }
}

fn out_of_range(field: &'static str, expected: &'static str, value: f32) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        expected,
        value: value as f64,
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(out_of_range(field, "a positive number", value))
    }
}

fn not_below(field: &'static str, value: f32, min: f32) -> Result<(), ConfigError> {
    if value >= min && value.is_finite() {
        Ok(())
    } else {
        Err(out_of_range(field, "at least its matching minimum", value))
    }
}

fn segments(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if (3..=MAX_SPHERE_SEGMENTS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "between 3 and 512",
            value: value as f64,
        })
    }
}

/// Colors for one theme.
#[derive(Clone, Debug, Deserialize)]
pub struct Palette {
    pub orb: Color,
    pub orb_emissive_intensity: f32,
    pub orb_opacity: f32,
    pub glow: Color,
    pub glow_opacity: f32,
    pub ambient: Color,
    pub ambient_intensity: f32,
    pub directional: Color,
    pub point_lights: [Color; 2],
    /// Particle hues in degrees; each particle picks one.
    pub particle_hues: [f32; 2],
    pub particle_lightness: f32,
    pub star: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Palette {
            orb: Color::from_hex(0x00b4d8),
            orb_emissive_intensity: 0.2,
            orb_opacity: 0.9,
            glow: Color::from_hex(0x00b4d8),
            glow_opacity: 0.1,
            ambient: Color::WHITE,
            ambient_intensity: 0.5,
            directional: Color::WHITE,
            point_lights: [Color::from_hex(0x00b4d8), Color::from_hex(0x90e0ef)],
            particle_hues: [271.0, 342.0],
            particle_lightness: 0.7,
            star: Color::from_hex(0x00b4d8),
        }
    }

    pub fn light() -> Self {
        Palette {
            orb: Color::from_hex(0x4361ee),
            orb_emissive_intensity: 0.2,
            orb_opacity: 0.9,
            glow: Color::from_hex(0x3a0ca3),
            glow_opacity: 0.1,
            ambient: Color::WHITE,
            ambient_intensity: 0.5,
            directional: Color::WHITE,
            point_lights: [Color::from_hex(0x4361ee), Color::from_hex(0x3a0ca3)],
            particle_hues: [248.0, 351.0],
            particle_lightness: 0.6,
            star: Color::from_hex(0x4361ee),
        }
    }

    /// The two particle colors, fully saturated at the palette's lightness.
    pub fn particle_colors(&self) -> [Color; 2] {
        self.particle_hues
            .map(|hue| Color::from_hsl(hue, 1.0, self.particle_lightness))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Surfaces narrower than this get half the particles.
    pub narrow_breakpoint: u32,
    pub min_size: f32,
    pub max_size: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
    /// Seconds per drift cycle.
    pub min_period: f32,
    pub max_period: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 60,
            narrow_breakpoint: 768,
            min_size: 1.0,
            max_size: 4.0,
            min_opacity: 0.1,
            max_opacity: 0.6,
            min_period: 10.0,
            max_period: 30.0,
        }
    }
}

impl ParticleConfig {
    pub fn count_for_width(&self, width: u32) -> usize {
        if width < self.narrow_breakpoint {
            self.count / 2
        } else {
            self.count
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Per-frame spin increment around x and y, radians.
    pub base_spin: [f32; 2],
    pub ease_factor: f32,
    /// Tilt in radians at the edge of the pointer range.
    pub pointer_influence: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            base_spin: [0.001, 0.003],
            ease_factor: 0.05,
            pointer_influence: 0.5,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 5.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub radius: f32,
    pub segments: u32,
    pub glow_radius: f32,
    pub glow_segments: u32,
    /// Amplitude of the emissive pulse driven by shader time.
    pub pulse: f32,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            segments: 64,
            glow_radius: 2.2,
            glow_segments: 32,
            pulse: 0.08,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
}

impl Skill {
    fn new(name: &str, description: &str) -> Self {
        Skill {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub skills: Vec<Skill>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            skills: vec![
                Skill::new(
                    "AutoCAD",
                    "Designed 3D infrastructure models with parametric components",
                ),
                Skill::new(
                    "Python",
                    "Built data analysis tools for structural engineering applications",
                ),
                Skill::new("UI/UX Design", "Created intuitive interfaces for engineering software"),
                Skill::new(
                    "Data Science",
                    "Applied machine learning to predict structural integrity",
                ),
                Skill::new("Civil Engineering", "Specialized in sustainable infrastructure design"),
                Skill::new("Figma", "Prototyped digital solutions for construction management"),
                Skill::new(
                    "JavaScript",
                    "Developed interactive web applications for project visualization",
                ),
                Skill::new(
                    "BIM",
                    "Building Information Modeling for collaborative construction projects",
                ),
            ],
        }
    }
}

/// Element ids and layout rules of the hosting page.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub orb_canvas_id: String,
    pub starfield_canvas_id: String,
    pub starfield_container_id: String,
    pub toggle_id: String,
    /// Theme selected while the toggle checkbox is checked.
    pub toggle_checked: Theme,
    /// Theme used when neither storage nor the system expresses a preference.
    pub fallback_theme: Theme,
    /// Viewports at most this wide give the orb the full width, wider ones half.
    pub split_breakpoint: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            orb_canvas_id: "orb-canvas".to_string(),
            starfield_canvas_id: "starfield".to_string(),
            starfield_container_id: "starfield-container".to_string(),
            toggle_id: "theme-toggle-checkbox".to_string(),
            toggle_checked: Theme::Dark,
            fallback_theme: Theme::Dark,
            split_breakpoint: 992,
        }
    }
}

impl PageConfig {
    /// Orb surface size for a viewport, in CSS pixels.
    pub fn orb_surface_size(&self, viewport_width: f64, viewport_height: f64) -> (u32, u32) {
        let width = viewport_width.max(0.0) as u32;
        let height = viewport_height.max(0.0) as u32;
        if width <= self.split_breakpoint {
            (width, height)
        } else {
            (width / 2, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_surfaces_halve_particles() {
        let cfg = ParticleConfig::default();
        assert_eq!(cfg.count_for_width(1280), 60);
        assert_eq!(cfg.count_for_width(768), 60);
        assert_eq!(cfg.count_for_width(767), 30);
    }

    #[test]
    fn orb_takes_half_of_wide_viewports() {
        let page = PageConfig::default();
        assert_eq!(page.orb_surface_size(1600.0, 900.0), (800, 900));
        assert_eq!(page.orb_surface_size(992.0, 700.0), (992, 700));
    }
}
