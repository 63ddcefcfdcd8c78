//! Error types shared by the scene, theme and configuration layers.

/// Failure while building or driving the orb scene.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("shader compile failed: {0}")]
    ShaderCompile(String),

    #[error("program link failed: {0}")]
    ProgramLink(String),

    #[error("gpu resource allocation failed: {0}")]
    Resource(String),

    #[error("missing page element: {0}")]
    MissingElement(String),

    #[error("browser call failed: {0}")]
    Browser(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SceneError {
    pub fn context<T: ToString>(msg: T) -> Self {
        SceneError::ContextUnavailable(msg.to_string())
    }

    pub fn resource<T: ToString>(msg: T) -> Self {
        SceneError::Resource(msg.to_string())
    }

    pub fn missing<T: ToString>(id: T) -> Self {
        SceneError::MissingElement(id.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for SceneError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        SceneError::Browser(format!("{value:?}"))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SceneError> for wasm_bindgen::JsValue {
    fn from(err: SceneError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

/// Rejected scene configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("invalid color {0:?}, expected #rrggbb")]
    Color(String),
}

/// Preference storage write failure.
#[derive(thiserror::Error, Debug)]
#[error("preference storage unavailable: {0}")]
pub struct StorageError(pub String);

/// A persisted string that is neither `"light"` nor `"dark"`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown theme {0:?}")]
pub struct ParseThemeError(pub String);
