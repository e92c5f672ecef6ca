#![forbid(unsafe_code)]

//! Pane, split, and tab identifiers plus a deterministic allocator.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for a layout node (leaf or split).
///
/// Leaf ids double as registry keys and stay stable for the pane's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(String);

impl PaneId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PaneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PaneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of one tab inside a pane.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Largest suffix [`IdAllocator::observe`] will adopt. Larger suffixes are
/// unreachable by counting and are ignored.
pub const MAX_OBSERVED_SUFFIX: u64 = u64::MAX >> 1;

/// Issues `pane-N`, `split-N`, `tab-N`, and `{prefix}-N` content ids.
///
/// Counters are monotonic. After restoring a snapshot, feed every existing id
/// through [`IdAllocator::observe`] so new ids never collide with old ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    last_pane: u64,
    last_split: u64,
    last_tab: u64,
    last_content: u64,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next leaf id.
    pub fn next_pane(&mut self) -> PaneId {
        self.last_pane = self.last_pane.saturating_add(1);
        PaneId(format!("pane-{}", self.last_pane))
    }

    /// Next split id.
    pub fn next_split(&mut self) -> PaneId {
        self.last_split = self.last_split.saturating_add(1);
        PaneId(format!("split-{}", self.last_split))
    }

    /// Next tab id.
    pub fn next_tab(&mut self) -> TabId {
        self.last_tab = self.last_tab.saturating_add(1);
        TabId(format!("tab-{}", self.last_tab))
    }

    /// Next synthesized content id, e.g. `conv-3` or `terminal-4`.
    pub fn next_content(&mut self, prefix: &str) -> String {
        self.last_content = self.last_content.saturating_add(1);
        format!("{prefix}-{}", self.last_content)
    }

    /// Advance counters past an id seen elsewhere (e.g. in a snapshot).
    ///
    /// Ids without a numeric `-N` suffix, or with one above
    /// [`MAX_OBSERVED_SUFFIX`], are ignored.
    pub fn observe(&mut self, id: &str) {
        let Some((prefix, suffix)) = id.rsplit_once('-') else {
            return;
        };
        let Ok(n) = suffix.parse::<u64>() else {
            return;
        };
        if n > MAX_OBSERVED_SUFFIX {
            return;
        }
        let slot = match prefix {
            "pane" => &mut self.last_pane,
            "split" => &mut self.last_split,
            "tab" => &mut self.last_tab,
            _ => &mut self.last_content,
        };
        *slot = (*slot).max(n);
    }
}
