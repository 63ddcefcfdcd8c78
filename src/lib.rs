#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Visual core of the portfolio page: a theme-aware WebGL orb with a drifting
//! particle field, a skill starfield, and the persisted light/dark preference.
//!
//! Everything except the browser wiring is platform independent and tested on
//! the host; the wiring only compiles for `wasm32`.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod particles;
pub mod random;
pub mod scene;
pub mod starfield;
pub mod theme;
pub mod view;

pub use config::SceneConfig;
pub use error::{ConfigError, SceneError};
pub use scene::{RenderBackend, RenderSurface, SceneRenderer};
pub use theme::{Theme, ThemeDefault, ThemeState};

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;
