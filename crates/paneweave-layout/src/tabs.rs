#![forbid(unsafe_code)]

//! Tab multiplexing inside one pane.
//!
//! A pane's live payload always belongs to the active tab. Switching away
//! flushes the payload into the outgoing tab's snapshot; switching in
//! mirrors the incoming snapshot back into the payload. Content type and id
//! on the descriptor follow the active tab.

use std::fmt;

use crate::id::IdAllocator;
use crate::registry::{ContentDescriptor, ContentState, ContentType, TabDescriptor};

/// A tab index outside `0..len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabRangeError {
    pub index: usize,
    pub len: usize,
}

impl fmt::Display for TabRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab {} out of range ({} tabs)", self.index, self.len)
    }
}

impl std::error::Error for TabRangeError {}

/// Result of closing a tab.
#[derive(Debug, Clone, PartialEq)]
pub enum TabCloseOutcome {
    /// The tab was removed and other tabs remain.
    Closed { removed: TabDescriptor },
    /// The last tab was closed; the owning pane must be closed too.
    PaneEmptied,
}

impl ContentDescriptor {
    /// Materialize single-content mode as a one-tab list.
    pub fn ensure_tabs(&mut self, ids: &mut IdAllocator) {
        if !self.tabs.is_empty() {
            return;
        }
        self.tabs.push(TabDescriptor {
            id: ids.next_tab(),
            content_type: self.content_type.clone(),
            content_id: self.content_id.clone(),
            snapshot: self.payload.clone(),
        });
        self.active_tab_index = 0;
    }

    /// Active tab, if the pane is in tab mode.
    #[must_use]
    pub fn active_tab(&self) -> Option<&TabDescriptor> {
        self.tabs.get(self.active_tab_index)
    }

    /// Copy the live payload into the active tab's snapshot.
    pub fn flush_active(&mut self) {
        if let Some(tab) = self.tabs.get_mut(self.active_tab_index) {
            tab.snapshot.clone_from(&self.payload);
        }
    }

    /// Load the active tab's snapshot into the live payload.
    pub fn mirror_active(&mut self) {
        if let Some(tab) = self.tabs.get(self.active_tab_index) {
            self.payload.clone_from(&tab.snapshot);
            self.content_type.clone_from(&tab.content_type);
            self.content_id.clone_from(&tab.content_id);
        }
    }

    /// Switch the active tab, preserving the outgoing tab's state.
    pub fn select(&mut self, index: usize) -> Result<(), TabRangeError> {
        let len = self.tab_count();
        if index >= len {
            return Err(TabRangeError { index, len });
        }
        if self.tabs.is_empty() || index == self.active_tab_index {
            return Ok(());
        }
        self.flush_active();
        self.active_tab_index = index;
        self.mirror_active();
        Ok(())
    }

    /// Close the tab at `index`.
    ///
    /// Closing the active tab activates the tab now at its position (or the
    /// new last tab) and mirrors it in; the closed tab's state is discarded.
    pub fn close(&mut self, index: usize) -> Result<TabCloseOutcome, TabRangeError> {
        let len = self.tab_count();
        if index >= len {
            return Err(TabRangeError { index, len });
        }
        if self.tabs.len() <= 1 {
            return Ok(TabCloseOutcome::PaneEmptied);
        }
        let was_active = index == self.active_tab_index;
        let removed = self.tabs.remove(index);
        if index < self.active_tab_index {
            self.active_tab_index -= 1;
        } else if was_active {
            self.active_tab_index = self.active_tab_index.min(self.tabs.len() - 1);
            self.mirror_active();
        }
        Ok(TabCloseOutcome::Closed { removed })
    }

    /// Move a tab, keeping the active index on the same logical tab.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), TabRangeError> {
        let len = self.tab_count();
        for index in [from, to] {
            if index >= len {
                return Err(TabRangeError { index, len });
            }
        }
        if from == to || self.tabs.is_empty() {
            return Ok(());
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);

        let active = self.active_tab_index;
        self.active_tab_index = if active == from {
            to
        } else if from < active && to >= active {
            active - 1
        } else if from > active && to <= active {
            active + 1
        } else {
            active
        };
        Ok(())
    }

    /// Append a tab and make it active.
    pub fn push_tab(&mut self, tab: TabDescriptor, ids: &mut IdAllocator) {
        self.ensure_tabs(ids);
        self.flush_active();
        self.tabs.push(tab);
        self.active_tab_index = self.tabs.len() - 1;
        self.mirror_active();
    }

    /// Drain this pane's tabs for merging elsewhere, flushing the live
    /// payload first so the active tab's latest state travels with it.
    pub(crate) fn take_tabs(&mut self, ids: &mut IdAllocator) -> Vec<TabDescriptor> {
        self.ensure_tabs(ids);
        self.flush_active();
        std::mem::take(&mut self.tabs)
    }
}

/// Content id and starting snapshot for a freshly added tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabSeed {
    pub content_id: Option<String>,
    pub snapshot: ContentState,
}

impl TabSeed {
    /// Synthesize a fresh content id suited to `content_type`.
    ///
    /// Browsers open `default_url`, terminals get a new session id and the
    /// configured shell, chats a new conversation id, editors an untitled
    /// buffer. Other types start without an id.
    pub fn for_type(
        content_type: &ContentType,
        ids: &mut IdAllocator,
        default_url: &str,
        default_shell: Option<&str>,
    ) -> Self {
        let mut snapshot = ContentState::default();
        let content_id = match content_type {
            ContentType::Browser => {
                snapshot.url = Some(default_url.to_owned());
                Some(default_url.to_owned())
            }
            ContentType::Terminal => {
                if let Some(shell) = default_shell {
                    snapshot
                        .extras
                        .insert("shell".to_owned(), serde_json::Value::from(shell));
                }
                Some(ids.next_content("terminal"))
            }
            ContentType::Chat => Some(ids.next_content("conv")),
            ContentType::Editor => {
                snapshot.buffer = Some(String::new());
                Some(ids.next_content("untitled"))
            }
            _ => None,
        };
        Self {
            content_id,
            snapshot,
        }
    }
}
