//! Browser glue: localStorage, the color-scheme media query, theme markers on
//! the document, and owned event listeners.

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Document, Event, EventTarget, HtmlInputElement, Storage, Window};

use crate::config::PageConfig;
use crate::error::{SceneError, StorageError};
use crate::theme::{PreferenceStore, Theme};

pub struct LocalStorage(Storage);

impl LocalStorage {
    pub fn open(window: &Window) -> Option<Self> {
        window.local_storage().ok().flatten().map(LocalStorage)
    }
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0
            .set_item(key, value)
            .map_err(|e| StorageError(format!("{e:?}")))
    }
}

/// The `prefers-color-scheme` answer, or `None` when media queries are
/// unavailable.
pub fn system_theme(window: &Window) -> Option<Theme> {
    let query = window.match_media("(prefers-color-scheme: dark)").ok().flatten()?;
    Some(if query.matches() { Theme::Dark } else { Theme::Light })
}

/// Mark the document for `theme` so the stylesheet follows, and sync the
/// toggle checkbox.
pub fn apply_theme(document: &Document, theme: Theme, page: &PageConfig) {
    if let Some(root) = document.document_element() {
        root.set_attribute("data-theme", theme.as_str()).ok();
    }
    if let Some(body) = document.body() {
        let classes = body.class_list();
        classes.remove_1(&format!("{}-mode", theme.toggled())).ok();
        classes.add_1(&format!("{theme}-mode")).ok();
    }
    if let Some(toggle) = element::<HtmlInputElement>(document, &page.toggle_id) {
        toggle.set_checked(theme == page.toggle_checked);
    }
}

pub fn element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub fn require<T: JsCast>(document: &Document, id: &str) -> Result<T, SceneError> {
    element(document, id).ok_or_else(|| SceneError::missing(format!("#{id}")))
}

/// An event listener that is removed when dropped.
pub struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, SceneError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(EventListener {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref())
            .ok();
    }
}
