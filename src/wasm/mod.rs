use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Event, HtmlCanvasElement, HtmlInputElement, MouseEvent, PageTransitionEvent, Window,
};

pub mod dom;
pub mod frame_loop;
pub mod render;
mod shaders;
mod starfield_canvas;

use self::dom::{EventListener, LocalStorage};
use self::frame_loop::FrameLoopHandle;
use self::render::{CanvasSurface, WebGlBackend};
use self::starfield_canvas::StarfieldCanvas;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::scene::SceneRenderer;
use crate::theme::{MemoryStore, PreferenceStore, Subscription, Theme, ThemeDefault, ThemeState};
use crate::view::normalize_pointer;

/// Attribute on `<html>` that may carry a JSON scene config.
const CONFIG_ATTRIBUTE: &str = "data-scene-config";

thread_local! {
    static PAGE: RefCell<Option<Page>> = const { RefCell::new(None) };
}

type SharedRenderer = Rc<RefCell<SceneRenderer<WebGlBackend>>>;
type SharedStarfield = Rc<RefCell<StarfieldCanvas>>;

/// Everything mounted on the page. Dropping it stops the frame loop and
/// detaches every listener.
struct Page {
    theme: Rc<ThemeState>,
    frame_loop: Option<FrameLoopHandle>,
    subscriptions: Vec<Subscription>,
    _listeners: Vec<EventListener>,
}

impl Drop for Page {
    fn drop(&mut self) {
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
        for sub in self.subscriptions.drain(..) {
            sub.unsubscribe();
        }
    }
}

impl Page {
    fn mount(config: SceneConfig) -> Result<Page, SceneError> {
        let window = web_sys::window().ok_or_else(|| SceneError::missing("window"))?;
        let document = window.document().ok_or_else(|| SceneError::missing("document"))?;
        let page = config.page.clone();

        let store: Box<dyn PreferenceStore> = match LocalStorage::open(&window) {
            Some(storage) => Box::new(storage),
            None => {
                log::warn!("localStorage unavailable, theme preference will not persist");
                Box::new(MemoryStore::new())
            }
        };
        let theme = Rc::new(ThemeState::new(
            store,
            ThemeDefault::System {
                detected: dom::system_theme(&window),
                fallback: page.fallback_theme,
            },
        ));
        let initial = theme.current();
        dom::apply_theme(&document, initial, &page);

        let mut subscriptions = Vec::new();
        let mut listeners = Vec::new();

        {
            let document = document.clone();
            let page = page.clone();
            subscriptions.push(theme.subscribe(move |t| dom::apply_theme(&document, t, &page)));
        }
        if let Some(toggle) = dom::element::<HtmlInputElement>(&document, &page.toggle_id) {
            let theme = theme.clone();
            let checked_theme = page.toggle_checked;
            let input = toggle.clone();
            listeners.push(EventListener::new(&toggle, "change", move |_| {
                let next = if input.checked() { checked_theme } else { checked_theme.toggled() };
                theme.set(next);
            })?);
        } else {
            log::debug!("no #{} on page, theme toggle not wired", page.toggle_id);
        }

        let star_colors = [config.light.star, config.dark.star];
        let renderer = match mount_orb(&window, &document, &config, initial) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::error!("orb disabled: {e}");
                None
            }
        };
        let mounted = StarfieldCanvas::mount(&document, &page, &config.starfield);
        let starfield: Option<SharedStarfield> = match mounted {
            Ok(starfield) => Some(Rc::new(RefCell::new(starfield))),
            Err(SceneError::MissingElement(id)) => {
                log::debug!("no starfield on page ({id})");
                None
            }
            Err(e) => {
                log::error!("starfield disabled: {e}");
                None
            }
        };

        if let Some(renderer) = &renderer {
            let r = renderer.clone();
            subscriptions.push(theme.subscribe(move |t| r.borrow_mut().on_theme_changed(t)));

            let r = renderer.clone();
            let w = window.clone();
            listeners.push(EventListener::new(&document, "mousemove", move |event: Event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let (vw, vh) = viewport(&w);
                let (cx, cy) = (event.client_x() as f64, event.client_y() as f64);
                let (x, y) = normalize_pointer(cx, cy, vw, vh);
                r.borrow_mut().on_pointer_move(x, y);
            })?);
        }

        if let Some(starfield) = &starfield {
            let s = starfield.clone();
            let canvas = starfield.borrow().canvas().clone();
            listeners.push(EventListener::new(&canvas, "click", move |event: Event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    s.borrow().click(event.client_x() as f64, event.client_y() as f64);
                }
            })?);
            if let Some(close) = document.query_selector(".close-popup").ok().flatten() {
                let s = starfield.clone();
                listeners.push(EventListener::new(&close, "click", move |_| {
                    s.borrow().close_popup()
                })?);
            }
        }

        {
            let r = renderer.clone();
            let s = starfield.clone();
            let w = window.clone();
            let layout = page.clone();
            listeners.push(EventListener::new(&window, "resize", move |_| {
                if let Some(r) = &r {
                    let (vw, vh) = viewport(&w);
                    let (width, height) = layout.orb_surface_size(vw, vh);
                    r.borrow_mut().on_resize(width, height);
                }
                if let Some(s) = &s {
                    s.borrow_mut().resize();
                }
            })?);
        }
        // A page kept in the back/forward cache comes back with its listeners
        // and loop intact, so only a real unload detaches.
        listeners.push(EventListener::new(&window, "pagehide", |event: Event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .is_some_and(|e| e.persisted());
            if !persisted {
                stop();
            }
        })?);

        let frame_loop = if renderer.is_some() || starfield.is_some() {
            let theme = theme.clone();
            Some(frame_loop::start(move |timestamp| {
                if let Some(r) = &renderer {
                    r.borrow_mut().render_frame(timestamp);
                }
                if let Some(s) = &starfield {
                    let color = star_colors[theme.current().is_dark() as usize];
                    s.borrow().draw(color);
                }
            })?)
        } else {
            None
        };

        if let Some(body) = document.body() {
            body.class_list().add_1("loaded").ok();
        }

        Ok(Page {
            theme,
            frame_loop,
            subscriptions,
            _listeners: listeners,
        })
    }
}

fn mount_orb(
    window: &Window,
    document: &Document,
    config: &SceneConfig,
    theme: Theme,
) -> Result<SharedRenderer, SceneError> {
    let canvas: HtmlCanvasElement = dom::require(document, &config.page.orb_canvas_id)?;
    let (vw, vh) = viewport(window);
    let (width, height) = config.page.orb_surface_size(vw, vh);
    let surface = CanvasSurface { canvas, width, height };
    let rng = Box::new(crate::random::from_entropy());
    let renderer = SceneRenderer::initialize(&surface, theme, config.clone(), rng)?;
    Ok(Rc::new(RefCell::new(renderer)))
}

fn viewport(window: &Window) -> (f64, f64) {
    let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (read(window.inner_width()), read(window.inner_height()))
}

fn read_config_attribute() -> SceneConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .and_then(|root| root.get_attribute(CONFIG_ATTRIBUTE));
    match raw {
        Some(json) => SceneConfig::from_json(&json).unwrap_or_else(|e| {
            log::error!("ignoring {CONFIG_ATTRIBUTE}: {e}");
            SceneConfig::default()
        }),
        None => SceneConfig::default(),
    }
}

fn mount(config: SceneConfig) {
    stop();
    match Page::mount(config) {
        Ok(page) => PAGE.with(|p| *p.borrow_mut() = Some(page)),
        Err(e) => log::error!("visual layer unavailable: {e}"),
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    mount(read_config_attribute());
    Ok(())
}

/// Remount with a JSON config. An invalid config is logged and the current
/// page is left as it is.
#[wasm_bindgen]
pub fn start_with_config(json: &str) {
    match SceneConfig::from_json(json) {
        Ok(config) => mount(config),
        Err(e) => log::error!("scene config rejected: {e}"),
    }
}

/// Set the theme by name (`"light"` or `"dark"`).
#[wasm_bindgen]
pub fn set_theme(name: &str) {
    let theme = match name.parse::<Theme>() {
        Ok(theme) => theme,
        Err(e) => {
            log::warn!("set_theme: {e}");
            return;
        }
    };
    // Clone out of the page so subscribers run without PAGE borrowed.
    let state = PAGE.with(|p| p.borrow().as_ref().map(|page| page.theme.clone()));
    if let Some(state) = state {
        state.set(theme);
    }
}

#[wasm_bindgen]
pub fn current_theme() -> Option<String> {
    PAGE.with(|p| p.borrow().as_ref().map(|page| page.theme.current().to_string()))
}

/// Stop the frame loop and detach from the page.
#[wasm_bindgen]
pub fn stop() {
    let page = PAGE.with(|p| p.borrow_mut().take());
    drop(page);
}
