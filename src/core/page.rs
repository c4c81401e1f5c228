//! Element access for the conversion form.
//!
//! The form bridge never reaches for a global document. It is handed a [`Page`] that
//! resolves element ids to [`Element`] handles, which keeps it usable without a browser.

use crate::core::config::FormSelectors;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// A form control or container the bridge reads from or writes to.
pub trait Element: Send + Sync {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn inner_html(&self) -> String;
    fn set_inner_html(&self, markup: &str);
}

/// Resolves element ids.
pub trait Page: Send + Sync {
    fn element(&self, id: &str) -> Option<Arc<dyn Element>>;
}

#[derive(Debug, Default)]
pub struct MemoryElement {
    value: RwLock<String>,
    inner_html: RwLock<String>,
}

impl MemoryElement {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Element for MemoryElement {
    fn value(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value.to_string();
    }

    fn inner_html(&self) -> String {
        self.inner_html
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_inner_html(&self, markup: &str) {
        *self.inner_html.write().unwrap_or_else(PoisonError::into_inner) = markup.to_string();
    }
}

/// In-memory page holding [`MemoryElement`]s by id.
#[derive(Debug, Default)]
pub struct MemoryPage {
    elements: RwLock<HashMap<String, Arc<MemoryElement>>>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a page containing every element the conversion form needs.
    pub fn conversion_form(selectors: &FormSelectors) -> Self {
        let page = Self::new();
        for id in selectors.ids() {
            page.insert(id);
        }
        page
    }

    /// Adds an empty element, or returns the existing one with that id.
    pub fn insert(&self, id: &str) -> Arc<MemoryElement> {
        let mut elements = self.elements.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(elements.entry(id.to_string()).or_insert_with(|| {
            debug!(id, "Adding element to page");
            Arc::new(MemoryElement::new())
        }))
    }

    pub fn get(&self, id: &str) -> Option<Arc<MemoryElement>> {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> bool {
        self.elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Sets the value of `id`. Returns `false` if the page has no such element.
    pub fn set_value(&self, id: &str, value: &str) -> bool {
        self.get(id).map(|el| el.set_value(value)).is_some()
    }

    pub fn value(&self, id: &str) -> Option<String> {
        self.get(id).map(|el| el.value())
    }

    pub fn inner_html(&self, id: &str) -> Option<String> {
        self.get(id).map(|el| el.inner_html())
    }
}

impl Page for MemoryPage {
    fn element(&self, id: &str) -> Option<Arc<dyn Element>> {
        self.get(id).map(|el| el as Arc<dyn Element>)
    }
}
