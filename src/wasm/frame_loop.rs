use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

use crate::error::SceneError;

type FrameCallback = Closure<dyn FnMut(f64)>;

struct LoopState {
    // The closure re-requests itself, so it lives here rather than on the
    // stack of whoever started the loop.
    callback: RefCell<Option<FrameCallback>>,
    pending: Cell<Option<i32>>,
    running: Cell<bool>,
}

/// Owner of a running `requestAnimationFrame` loop. Cancelling or dropping it
/// stops the loop and releases the callback.
pub struct FrameLoopHandle {
    state: Rc<LoopState>,
    window: Window,
}

impl FrameLoopHandle {
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn cancel(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let Some(id) = self.state.pending.take() {
            self.window.cancel_animation_frame(id).ok();
        }
        self.state.callback.borrow_mut().take();
        log::debug!("frame loop stopped");
    }
}

impl Drop for FrameLoopHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Call `tick` with the frame timestamp once per display refresh until the
/// returned handle is cancelled or dropped. Each frame requests the next one
/// before running `tick`, so invocations never overlap.
pub fn start(mut tick: impl FnMut(f64) + 'static) -> Result<FrameLoopHandle, SceneError> {
    let window = web_sys::window().ok_or_else(|| SceneError::missing("window"))?;
    let state = Rc::new(LoopState {
        callback: RefCell::new(None),
        pending: Cell::new(None),
        running: Cell::new(true),
    });

    let weak = Rc::downgrade(&state);
    let frame_window = window.clone();
    let callback = Closure::wrap(Box::new(move |timestamp: f64| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        if !state.running.get() {
            return;
        }
        state.pending.set(None);
        if let Some(cb) = state.callback.borrow().as_ref() {
            match frame_window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(id) => state.pending.set(Some(id)),
                Err(e) => {
                    log::error!("frame loop halted, requestAnimationFrame failed: {e:?}");
                    state.running.set(false);
                }
            }
        }
        tick(timestamp);
    }) as Box<dyn FnMut(f64)>);

    let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    state.pending.set(Some(id));
    *state.callback.borrow_mut() = Some(callback);

    Ok(FrameLoopHandle { state, window })
}
