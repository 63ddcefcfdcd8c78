use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use super::dom;
use crate::color::Color;
use crate::config::{PageConfig, StarfieldConfig};
use crate::error::SceneError;
use crate::starfield::{Star, Starfield};

/// Glow halo radius in star radii.
const GLOW_FACTOR: f64 = 4.0;

struct SkillPopup {
    root: HtmlElement,
    title: HtmlElement,
    description: HtmlElement,
}

impl SkillPopup {
    fn find(document: &Document) -> Option<Self> {
        Some(SkillPopup {
            root: dom::element(document, "skill-popup")?,
            title: dom::element(document, "popup-title")?,
            description: dom::element(document, "popup-description")?,
        })
    }

    fn show(&self, star: &Star, name: &str, description: &str) {
        self.title.set_text_content(Some(name));
        self.description.set_text_content(Some(description));
        let style = self.root.style();
        style.set_property("left", &format!("{}px", star.x)).ok();
        style.set_property("top", &format!("{}px", star.y)).ok();
        style.set_property("display", "block").ok();
    }

    fn hide(&self) {
        self.root.style().set_property("display", "none").ok();
    }
}

/// The skill starfield drawn on a 2D canvas sized to its container.
pub struct StarfieldCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    container: HtmlElement,
    field: Starfield,
    rng: fastrand::Rng,
    popup: Option<SkillPopup>,
}

impl StarfieldCanvas {
    pub fn mount(
        document: &Document,
        page: &PageConfig,
        config: &StarfieldConfig,
    ) -> Result<Self, SceneError> {
        let canvas: HtmlCanvasElement = dom::require(document, &page.starfield_canvas_id)?;
        let container: HtmlElement = dom::require(document, &page.starfield_container_id)?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| SceneError::context("2d canvas context unavailable"))?
            .dyn_into()
            .map_err(|_| SceneError::context("2d context has unexpected type"))?;

        let (width, height) = container_size(&container);
        canvas.set_width(width);
        canvas.set_height(height);
        let mut rng = crate::random::from_entropy();
        let field = Starfield::generate(config.skills.clone(), width, height, &mut rng);
        log::info!("starfield ready: {} stars", field.stars().len());

        Ok(StarfieldCanvas {
            canvas,
            ctx,
            container,
            field,
            rng,
            popup: SkillPopup::find(document),
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn resize(&mut self) {
        let (width, height) = container_size(&self.container);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.field.resize(width, height, &mut self.rng);
    }

    /// Show the popup for the star under a click at client coordinates.
    pub fn click(&self, client_x: f64, client_y: f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let x = (client_x - rect.left()) as f32;
        let y = (client_y - rect.top()) as f32;
        let Some(star) = self.field.hit_test(x, y) else {
            return;
        };
        let (Some(popup), Some(skill)) = (&self.popup, self.field.skill(star)) else {
            return;
        };
        popup.show(star, &skill.name, &skill.description);
    }

    pub fn close_popup(&self) {
        if let Some(popup) = &self.popup {
            popup.hide();
        }
    }

    pub fn draw(&self, color: Color) {
        let ctx = &self.ctx;
        let (w, h) = self.field.size();
        ctx.clear_rect(0.0, 0.0, w as f64, h as f64);

        let stars = self.field.stars();
        ctx.set_line_width(1.0);
        for link in self.field.connections() {
            let (from, to) = (&stars[link.from], &stars[link.to]);
            ctx.begin_path();
            ctx.move_to(from.x as f64, from.y as f64);
            ctx.line_to(to.x as f64, to.y as f64);
            ctx.set_stroke_style_str(&color.css_rgba(link.opacity));
            ctx.stroke();
        }

        for star in stars {
            let (x, y, r) = (star.x as f64, star.y as f64, star.size as f64);
            ctx.begin_path();
            if ctx.arc(x, y, r, 0.0, TAU).is_ok() {
                ctx.set_fill_style_str(&color.css_rgba(star.brightness));
                ctx.fill();
            }

            let Ok(gradient) = ctx.create_radial_gradient(x, y, r, x, y, r * GLOW_FACTOR) else {
                continue;
            };
            gradient.add_color_stop(0.0, &color.css_rgba(0.3)).ok();
            gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)").ok();
            ctx.begin_path();
            if ctx.arc(x, y, r * GLOW_FACTOR, 0.0, TAU).is_ok() {
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.fill();
            }
        }
    }
}

fn container_size(container: &HtmlElement) -> (u32, u32) {
    (
        container.offset_width().max(0) as u32,
        container.offset_height().max(0) as u32,
    )
}
