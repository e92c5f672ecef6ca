#![forbid(unsafe_code)]

//! Type-indexed render dispatch.
//!
//! The engine knows content types only as tags. Hosts populate a
//! [`RenderTable`] once with one function per type (plus an optional
//! fallback); the engine then calls by tag for each surviving leaf.

use std::collections::BTreeMap;
use std::fmt;

use crate::id::PaneId;
use crate::registry::{ContentDescriptor, ContentType};

/// Render function for one content type.
pub type RenderFn<R> = Box<dyn Fn(&PaneId, &ContentDescriptor) -> R>;

/// Dispatch table from content type to render function.
pub struct RenderTable<R> {
    renderers: BTreeMap<ContentType, RenderFn<R>>,
    fallback: Option<RenderFn<R>>,
}

impl<R> Default for RenderTable<R> {
    fn default() -> Self {
        Self {
            renderers: BTreeMap::new(),
            fallback: None,
        }
    }
}

impl<R> RenderTable<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the renderer for `content_type`.
    pub fn register(
        &mut self,
        content_type: ContentType,
        render: impl Fn(&PaneId, &ContentDescriptor) -> R + 'static,
    ) -> &mut Self {
        self.renderers.insert(content_type, Box::new(render));
        self
    }

    /// Builder form of [`RenderTable::register`].
    #[must_use]
    pub fn with(
        mut self,
        content_type: ContentType,
        render: impl Fn(&PaneId, &ContentDescriptor) -> R + 'static,
    ) -> Self {
        self.register(content_type, render);
        self
    }

    /// Renderer used for types without a registered entry.
    #[must_use]
    pub fn with_fallback(mut self, render: impl Fn(&PaneId, &ContentDescriptor) -> R + 'static) -> Self {
        self.fallback = Some(Box::new(render));
        self
    }

    #[must_use]
    pub fn handles(&self, content_type: &ContentType) -> bool {
        self.fallback.is_some() || self.renderers.contains_key(content_type)
    }

    /// Render one leaf by its descriptor's content type.
    ///
    /// Returns `None` if neither a typed renderer nor a fallback exists.
    pub fn dispatch(&self, leaf_id: &PaneId, descriptor: &ContentDescriptor) -> Option<R> {
        self.renderers
            .get(&descriptor.content_type)
            .or(self.fallback.as_ref())
            .map(|render| render(leaf_id, descriptor))
    }
}

impl<R> fmt::Debug for RenderTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTable")
            .field("types", &self.renderers.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RenderTable<String> {
        RenderTable::new()
            .with(ContentType::Chat, |id, _| format!("chat:{id}"))
            .with(ContentType::Editor, |_, d| {
                format!("editor:{}", d.content_id.as_deref().unwrap_or("-"))
            })
    }

    #[test]
    fn dispatches_by_tag() {
        let table = table();
        let id = PaneId::new("pane-1");
        let chat = ContentDescriptor::new(ContentType::Chat, Some("c".into()));
        let editor = ContentDescriptor::new(ContentType::Editor, Some("a.rs".into()));
        assert_eq!(table.dispatch(&id, &chat).as_deref(), Some("chat:pane-1"));
        assert_eq!(table.dispatch(&id, &editor).as_deref(), Some("editor:a.rs"));
    }

    #[test]
    fn missing_type_uses_fallback_or_none() {
        let id = PaneId::new("pane-1");
        let pdf = ContentDescriptor::new(ContentType::Pdf, Some("x.pdf".into()));
        assert_eq!(table().dispatch(&id, &pdf), None);
        assert!(!table().handles(&ContentType::Pdf));
        let with_fallback = table().with_fallback(|_, d| format!("generic:{}", d.content_type));
        assert_eq!(
            with_fallback.dispatch(&id, &pdf).as_deref(),
            Some("generic:pdf")
        );
    }
}
