#![forbid(unsafe_code)]

//! Content registry: leaf id to content state.
//!
//! The registry lives beside the layout tree. Keys with a defined content
//! type must match the tree's leaf set exactly after every synchronizer
//! pass; keys still waiting for their type are `Pending` and tolerated for a
//! bounded number of passes (see [`crate::sync`]).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::{PaneId, TabId};

/// Type tag selecting how a pane's content is rendered and hydrated.
///
/// Serialized as its lowercase tag; unknown tags round-trip through
/// [`ContentType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentType {
    Chat,
    Editor,
    Terminal,
    Browser,
    Pdf,
    Csv,
    Docx,
    Pptx,
    Latex,
    Image,
    Diff,
    DbTool,
    Folder,
    /// A pane with nothing in it yet.
    Empty,
    Custom(String),
}

impl ContentType {
    /// Stable tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chat => "chat",
            Self::Editor => "editor",
            Self::Terminal => "terminal",
            Self::Browser => "browser",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Latex => "latex",
            Self::Image => "image",
            Self::Diff => "diff",
            Self::DbTool => "dbtool",
            Self::Folder => "folder",
            Self::Empty => "empty",
            Self::Custom(tag) => tag,
        }
    }

    /// Parse a tag; anything unrecognized becomes `Custom`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "chat" => Self::Chat,
            "editor" => Self::Editor,
            "terminal" => Self::Terminal,
            "browser" => Self::Browser,
            "pdf" => Self::Pdf,
            "csv" => Self::Csv,
            "docx" => Self::Docx,
            "pptx" => Self::Pptx,
            "latex" => Self::Latex,
            "image" => Self::Image,
            "diff" => Self::Diff,
            "dbtool" => Self::DbTool,
            "folder" => Self::Folder,
            "empty" => Self::Empty,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// Whether a freshly created pane needs an async load before it is
    /// usable: editors read their file, chats fetch their history.
    #[must_use]
    pub const fn needs_hydration(&self) -> bool {
        matches!(self, Self::Editor | Self::Chat)
    }

    /// Infer the viewer for a dropped file from its extension.
    #[must_use]
    pub fn from_file_path(path: &str) -> Self {
        let name = basename(path);
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Self::Pdf,
            "csv" | "xlsx" | "xls" => Self::Csv,
            "docx" | "doc" => Self::Docx,
            "pptx" => Self::Pptx,
            "tex" => Self::Latex,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" => Self::Image,
            _ => Self::Editor,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Transient, type-specific view state.
///
/// Used both as a pane's live payload and as a tab's snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentState {
    /// Text buffer for editors and similar text views.
    pub buffer: Option<String>,
    /// Unsaved edits present.
    pub dirty: bool,
    /// Vertical scroll offset in logical pixels.
    pub scroll: f64,
    pub url: Option<String>,
    pub title: Option<String>,
    /// Load status of this content.
    pub hydration: HydrationState,
    /// Last hydration failure, if any.
    pub load_error: Option<String>,
    /// Opaque per-type extras owned by the renderer.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl ContentState {
    /// Fold a hydration result into this state.
    pub(crate) fn absorb(&mut self, loaded: ContentState) {
        if loaded.buffer.is_some() {
            self.buffer = loaded.buffer;
            self.dirty = false;
        }
        if loaded.url.is_some() {
            self.url = loaded.url;
        }
        if loaded.title.is_some() {
            self.title = loaded.title;
        }
        self.extras.extend(loaded.extras);
        self.load_error = None;
        self.hydration = HydrationState::Ready;
    }

    /// Record a failed hydration.
    pub(crate) fn fail(&mut self, message: String) {
        self.load_error = Some(message);
        self.hydration = HydrationState::Failed;
    }
}

/// Load status of one piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationState {
    #[default]
    Ready,
    Loading,
    Failed,
}

/// One tab inside a pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabDescriptor {
    pub id: TabId,
    pub content_type: ContentType,
    pub content_id: Option<String>,
    #[serde(default)]
    pub snapshot: ContentState,
}

/// Registry value for a pane with a defined content type.
///
/// An empty `tabs` list means single-content mode: the pane shows
/// `content_type`/`content_id` directly. Once tabs exist, those fields and
/// `payload` mirror the active tab.
///
/// Hydration status lives in [`ContentState::hydration`], so it follows
/// its tab through switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    pub content_type: ContentType,
    pub content_id: Option<String>,
    /// Live view state of the active content.
    #[serde(default)]
    pub payload: ContentState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<TabDescriptor>,
    #[serde(default)]
    pub active_tab_index: usize,
}

impl ContentDescriptor {
    /// A single-content descriptor.
    #[must_use]
    pub fn new(content_type: ContentType, content_id: Option<String>) -> Self {
        let mut payload = ContentState::default();
        if content_type == ContentType::Browser {
            payload.url.clone_from(&content_id);
        }
        Self {
            content_type,
            content_id,
            payload,
            tabs: Vec::new(),
            active_tab_index: 0,
        }
    }

    /// A blank pane.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(ContentType::Empty, None)
    }

    #[must_use]
    pub fn is_empty_pane(&self) -> bool {
        self.content_type == ContentType::Empty
    }

    /// Number of tabs, counting single-content mode as one.
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.tabs.len().max(1)
    }

    /// Human-readable title for pane headers and listings.
    #[must_use]
    pub fn title(&self) -> String {
        let id = self.content_id.as_deref();
        match (&self.content_type, id) {
            (ContentType::Empty, _) => "Empty Pane".to_owned(),
            (ContentType::Chat, id) => {
                let tail = id.map_or("None", |id| {
                    let start = id
                        .char_indices()
                        .rev()
                        .nth(7)
                        .map_or(0, |(index, _)| index);
                    &id[start..]
                });
                format!("Conversation: {tail}")
            }
            (ContentType::Browser, _) => self
                .payload
                .title
                .clone()
                .or_else(|| self.payload.url.clone())
                .unwrap_or_else(|| "Web Browser".to_owned()),
            (ContentType::Terminal, _) => "Terminal".to_owned(),
            (ContentType::Image, None) => "Image Viewer".to_owned(),
            (_, Some(id)) => basename(id).to_owned(),
            (_, None) => "Empty Pane".to_owned(),
        }
    }
}

/// Registry value: either a typed descriptor or a pending reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegistryEntry {
    /// Reserved before its content type is known.
    Pending {
        /// Synchronizer passes survived while absent from the tree.
        #[serde(default)]
        passes_seen: u32,
        #[serde(default)]
        cancelled: bool,
    },
    Content(ContentDescriptor),
}

impl RegistryEntry {
    #[must_use]
    pub fn content(&self) -> Option<&ContentDescriptor> {
        match self {
            Self::Content(descriptor) => Some(descriptor),
            Self::Pending { .. } => None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Map from leaf id to [`RegistryEntry`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: BTreeMap<PaneId, RegistryEntry>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a typed entry, returning the previous one.
    pub fn insert_content(
        &mut self,
        id: PaneId,
        descriptor: ContentDescriptor,
    ) -> Option<RegistryEntry> {
        self.entries.insert(id, RegistryEntry::Content(descriptor))
    }

    /// Reserve `id` as pending. Returns `false` if the id is taken.
    pub fn reserve_pending(&mut self, id: PaneId) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(
            id,
            RegistryEntry::Pending {
                passes_seen: 0,
                cancelled: false,
            },
        );
        true
    }

    /// Mark a pending entry cancelled; the next sync pass removes it.
    pub fn cancel_pending(&mut self, id: &str) -> bool {
        match self.entries.get_mut(id) {
            Some(RegistryEntry::Pending { cancelled, .. }) => {
                *cancelled = true;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut RegistryEntry> {
        self.entries.get_mut(id)
    }

    /// Typed descriptor for `id`.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<&ContentDescriptor> {
        self.entries.get(id).and_then(RegistryEntry::content)
    }

    pub fn content_mut(&mut self, id: &str) -> Option<&mut ContentDescriptor> {
        match self.entries.get_mut(id) {
            Some(RegistryEntry::Content(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry> {
        self.entries.remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Ids whose content type is defined.
    #[must_use]
    pub fn typed_ids(&self) -> BTreeSet<PaneId> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_pending())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Ids still waiting for a content type.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<PaneId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_pending())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PaneId, &RegistryEntry)> {
        self.entries.iter()
    }

    /// Typed descriptors, mutably.
    pub(crate) fn contents_mut(&mut self) -> impl Iterator<Item = (&PaneId, &mut ContentDescriptor)> {
        self.entries
            .iter_mut()
            .filter_map(|(id, entry)| match entry {
                RegistryEntry::Content(descriptor) => Some((id, descriptor)),
                RegistryEntry::Pending { .. } => None,
            })
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&PaneId, &mut RegistryEntry) -> bool) {
        self.entries.retain(keep);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
