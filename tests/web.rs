#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

use orb_viz::theme::THEME_KEY;
use orb_viz::wasm::dom::LocalStorage;
use orb_viz::wasm::frame_loop;
use orb_viz::wasm::render::CanvasSurface;
use orb_viz::{
    RenderBackend, SceneConfig, SceneError, SceneRenderer, Theme, ThemeDefault, ThemeState,
};

wasm_bindgen_test_configure!(run_in_browser);

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn theme_persists_in_local_storage() {
    let window = web_sys::window().unwrap();
    let storage = window.local_storage().unwrap().unwrap();
    storage.remove_item(THEME_KEY).unwrap();

    let state = ThemeState::new(
        Box::new(LocalStorage::open(&window).unwrap()),
        ThemeDefault::Fixed(Theme::Dark),
    );
    assert_eq!(state.current(), Theme::Dark);
    state.set(Theme::Light);
    assert_eq!(storage.get_item(THEME_KEY).unwrap().as_deref(), Some("light"));

    let reloaded = ThemeState::new(
        Box::new(LocalStorage::open(&window).unwrap()),
        ThemeDefault::Fixed(Theme::Dark),
    );
    assert_eq!(reloaded.current(), Theme::Light);

    storage.set_item(THEME_KEY, "sepia").unwrap();
    assert_eq!(reloaded.load(), Theme::Dark);
    storage.remove_item(THEME_KEY).unwrap();
}

#[wasm_bindgen_test(async)]
async fn frame_loop_ticks_until_cancelled() {
    let ticks = Rc::new(Cell::new(0u32));
    let counter = ticks.clone();
    let handle = frame_loop::start(move |_| counter.set(counter.get() + 1)).unwrap();

    for _ in 0..50 {
        if ticks.get() >= 3 {
            break;
        }
        sleep(20).await;
    }
    assert!(ticks.get() >= 3, "only {} frames", ticks.get());

    handle.cancel();
    assert!(!handle.is_running());
    let stopped_at = ticks.get();
    sleep(100).await;
    assert_eq!(ticks.get(), stopped_at);
}

#[wasm_bindgen_test]
fn canvas_renderer_draws_or_reports_missing_context() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: web_sys::HtmlCanvasElement =
        document.create_element("canvas").unwrap().dyn_into().unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();

    let surface = CanvasSurface {
        canvas: canvas.clone(),
        width: 320,
        height: 240,
    };
    let result = SceneRenderer::initialize(
        &surface,
        Theme::Dark,
        SceneConfig::default(),
        Box::new(fastrand::Rng::with_seed(9)),
    );
    match result {
        Ok(mut renderer) => {
            // vertices and indices for two meshes, plus the particle buffer
            assert_eq!(renderer.backend().buffer_count(), 5);
            renderer.render_frame(0.0);
            renderer.on_theme_changed(Theme::Light);
            let sizes = [(0, 0), (1600, 900), (500, 500), (2400, 1200)];
            for (i, (w, h)) in sizes.into_iter().enumerate() {
                renderer.on_resize(w, h);
                renderer.render_frame(16.0 * (i + 1) as f64);
            }
            assert_eq!(renderer.surface_size(), (2400, 1200));
            assert_eq!(renderer.backend().buffer_count(), 5);
        }
        Err(SceneError::ContextUnavailable(_)) => {}
        Err(e) => panic!("unexpected error: {e}"),
    }
    canvas.remove();
}

fn page_hide(persisted: bool) {
    let init = web_sys::PageTransitionEventInit::new();
    init.set_persisted(persisted);
    let event = web_sys::PageTransitionEvent::new_with_event_init_dict("pagehide", &init).unwrap();
    web_sys::window().unwrap().dispatch_event(&event).unwrap();
}

#[wasm_bindgen_test]
fn cached_page_stays_mounted_until_unloaded() {
    orb_viz::wasm::start_with_config("{}");
    assert!(orb_viz::wasm::current_theme().is_some());

    page_hide(true);
    assert!(orb_viz::wasm::current_theme().is_some());

    page_hide(false);
    assert_eq!(orb_viz::wasm::current_theme(), None);
}
