#![forbid(unsafe_code)]

//! Async hydration plumbing.
//!
//! Heavy payloads (file contents, chat history) load off the event thread.
//! The engine hands out a [`HydrationRequest`]; the host performs the load
//! and posts a [`HydrationResult`] through a [`HydrationSender`]. The event
//! thread then drains the [`HydrationInbox`] into the workspace, so every
//! write-back lands after the mutations that preceded it.
//!
//! Each result carries the ticket it was issued with. A ticket whose pane
//! was pruned, or whose tab or content id changed meanwhile, is stale and
//! discarded without touching the registry.

use std::sync::mpsc;

use crate::id::{PaneId, TabId};
use crate::registry::{ContentState, ContentType};
use crate::workspace::Workspace;

/// Identifies the content a load was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HydrationTicket {
    pub pane_id: PaneId,
    /// `None` for a pane in single-content mode.
    pub tab_id: Option<TabId>,
    pub content_id: String,
}

/// What the host must load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationKind {
    /// Read a file into an editor buffer.
    ReadFile { path: String },
    /// Fetch a conversation's message history.
    FetchHistory { conversation_id: String },
}

/// A load the host should perform off-thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationRequest {
    pub ticket: HydrationTicket,
    pub kind: HydrationKind,
}

/// Result of a host load.
#[derive(Debug, Clone, PartialEq)]
pub enum HydrationResult {
    Loaded(ContentState),
    Failed(String),
}

/// What happened to a posted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    Applied,
    /// The ticket no longer matches live state; nothing was written.
    Stale,
}

#[derive(Debug)]
struct Completion {
    ticket: HydrationTicket,
    result: HydrationResult,
}

/// Cloneable handle workers use to post results.
#[derive(Debug, Clone)]
pub struct HydrationSender {
    tx: mpsc::Sender<Completion>,
}

impl HydrationSender {
    /// Post a finished load. Returns `false` if the inbox is gone.
    pub fn complete(&self, ticket: HydrationTicket, result: HydrationResult) -> bool {
        self.tx.send(Completion { ticket, result }).is_ok()
    }
}

/// Event-thread side of the hydration channel.
#[derive(Debug)]
pub struct HydrationInbox {
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
}

impl Default for HydrationInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl HydrationInbox {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A sender for off-thread workers.
    #[must_use]
    pub fn sender(&self) -> HydrationSender {
        HydrationSender {
            tx: self.tx.clone(),
        }
    }

    /// Apply every queued result to `workspace`, in arrival order.
    pub fn drain(&self, workspace: &mut Workspace) -> Vec<(HydrationTicket, HydrationOutcome)> {
        let mut applied = Vec::new();
        while let Ok(Completion { ticket, result }) = self.rx.try_recv() {
            let outcome = workspace.apply_hydration(&ticket, result);
            applied.push((ticket, outcome));
        }
        applied
    }
}

impl HydrationRequest {
    /// Build the request a freshly created content needs, if any.
    pub(crate) fn for_content(
        pane_id: &PaneId,
        tab_id: Option<TabId>,
        content_type: &ContentType,
        content_id: Option<&str>,
    ) -> Option<Self> {
        let content_id = content_id?;
        let kind = match content_type {
            ContentType::Editor => HydrationKind::ReadFile {
                path: content_id.to_owned(),
            },
            ContentType::Chat => HydrationKind::FetchHistory {
                conversation_id: content_id.to_owned(),
            },
            _ => return None,
        };
        Some(Self {
            ticket: HydrationTicket {
                pane_id: pane_id.clone(),
                tab_id,
                content_id: content_id.to_owned(),
            },
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_only_for_hydrating_types() {
        let pane = PaneId::new("pane-1");
        let editor =
            HydrationRequest::for_content(&pane, None, &ContentType::Editor, Some("/tmp/a.rs"))
                .unwrap();
        assert_eq!(
            editor.kind,
            HydrationKind::ReadFile {
                path: "/tmp/a.rs".into()
            }
        );
        let chat = HydrationRequest::for_content(
            &pane,
            Some(TabId::new("tab-2")),
            &ContentType::Chat,
            Some("conv-9"),
        )
        .unwrap();
        assert_eq!(chat.ticket.tab_id, Some(TabId::new("tab-2")));
        assert!(
            HydrationRequest::for_content(&pane, None, &ContentType::Browser, Some("https://x"))
                .is_none()
        );
        assert!(HydrationRequest::for_content(&pane, None, &ContentType::Editor, None).is_none());
    }

    #[test]
    fn sender_reports_closed_inbox() {
        let inbox = HydrationInbox::new();
        let sender = inbox.sender();
        let ticket = HydrationTicket {
            pane_id: PaneId::new("pane-1"),
            tab_id: None,
            content_id: "a".into(),
        };
        assert!(sender.complete(ticket.clone(), HydrationResult::Failed("x".into())));
        drop(inbox);
        assert!(!sender.complete(ticket, HydrationResult::Failed("x".into())));
    }
}
