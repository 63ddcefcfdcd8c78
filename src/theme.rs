//! Process-wide light/dark theme with a persisted preference and synchronous
//! change notification.
//!
//! The state lives on the main thread only, so subscribers are plain `Rc`
//! callbacks. A subscriber must not call [`ThemeState::set`] from inside its
//! own notification.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ParseThemeError, StorageError};

/// Storage key holding the persisted theme.
pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseThemeError;

    /// Exact match only: `"Dark"` or `" dark"` are not themes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// Key-value storage for the theme preference.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, used when the browser denies `localStorage` and in tests.
#[derive(Default, Clone)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.values.borrow_mut().insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// What to use when nothing valid is persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeDefault {
    Fixed(Theme),
    /// Follow the host's color-scheme signal when it reports one.
    System {
        detected: Option<Theme>,
        fallback: Theme,
    },
}

impl ThemeDefault {
    pub fn resolve(self) -> Theme {
        match self {
            ThemeDefault::Fixed(theme) => theme,
            ThemeDefault::System { detected, fallback } => detected.unwrap_or(fallback),
        }
    }
}

type Handler = Rc<dyn Fn(Theme)>;

struct Subscriber {
    id: u64,
    active: Rc<Cell<bool>>,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber>>,
}

/// Handle returned by [`ThemeState::subscribe`].
///
/// Dropping it leaves the handler registered; call [`Subscription::unsubscribe`]
/// to detach.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    active: Rc<Cell<bool>>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.active.set(false);
        if let Some(registry) = self.registry.upgrade() {
            // A broadcast in progress holds its own snapshot; the flag above
            // stops delivery to this handler for the remainder of it.
            if let Ok(mut subs) = registry.subscribers.try_borrow_mut() {
                subs.retain(|s| s.id != self.id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

pub struct ThemeState {
    store: Box<dyn PreferenceStore>,
    default: ThemeDefault,
    current: Cell<Theme>,
    registry: Rc<Registry>,
}

impl ThemeState {
    /// Create the state and load the initial theme from `store`.
    pub fn new(store: Box<dyn PreferenceStore>, default: ThemeDefault) -> Self {
        let state = ThemeState {
            store,
            default,
            current: Cell::new(default.resolve()),
            registry: Rc::new(Registry::default()),
        };
        state.current.set(state.load());
        state
    }

    /// Read the persisted preference, falling back to the default policy.
    pub fn load(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Some(raw) => match raw.parse::<Theme>() {
                Ok(theme) => theme,
                Err(e) => {
                    log::debug!("ignoring persisted preference: {e}");
                    self.default.resolve()
                }
            },
            None => self.default.resolve(),
        }
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    /// Persist `theme` and notify every live subscriber in registration order.
    pub fn set(&self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            log::warn!("theme {theme} not persisted: {e}");
        }
        self.current.set(theme);
        log::debug!("theme set to {theme}");

        let snapshot: Vec<(Rc<Cell<bool>>, Handler)> = self
            .registry
            .subscribers
            .borrow()
            .iter()
            .map(|s| (s.active.clone(), s.handler.clone()))
            .collect();
        for (active, handler) in snapshot {
            if active.get() {
                handler(theme);
            }
        }
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    pub fn subscribe(&self, handler: impl Fn(Theme) + 'static) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        let active = Rc::new(Cell::new(true));
        self.registry.subscribers.borrow_mut().push(Subscriber {
            id,
            active: active.clone(),
            handler: Rc::new(handler),
        });
        Subscription {
            id,
            active,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.active.get())
            .count()
    }
}
