#![forbid(unsafe_code)]

//! Drag/drop coordination.
//!
//! The coordinator tracks one in-flight drag (a pane, or an item dragged in
//! from outside the layout) and the drop target currently under the
//! pointer. On drop it turns the pair into one workspace mutation:
//!
//! | dragged | side | effect |
//! |---|---|---|
//! | pane | center | merge all its tabs into the target |
//! | pane | edge | move it beside the target |
//! | external | center, target empty | replace the target's content |
//! | external | center, target has content | append as a tab |
//! | external | edge | split the target with a new pane |
//!
//! Every drop and every cancel clears both descriptors and releases the
//! gesture's listener guard, whatever the outcome.

use paneweave_core::logging::targets;
use paneweave_core::{DropSide, GestureEnd, ListenerGuard, Point};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::LayoutError;
use crate::hydrate::HydrationRequest;
use crate::id::PaneId;
use crate::layout::PaneLayout;
use crate::registry::ContentType;
use crate::tree::{MoveOutcome, TreePath};
use crate::workspace::{Merged, TabAdded, Workspace};

/// Kind of item dragged in from outside the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalKind {
    Conversation,
    File,
    Browser,
    Terminal,
}

/// An item dragged in from a sidebar, file tree, or similar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalItem {
    pub kind: ExternalKind,
    /// Conversation id, file path, URL, or terminal session id.
    pub id: String,
}

impl ExternalItem {
    #[must_use]
    pub fn new(kind: ExternalKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Content type a pane showing this item gets.
    ///
    /// Files pick their viewer from the extension.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self.kind {
            ExternalKind::Conversation => ContentType::Chat,
            ExternalKind::File => ContentType::from_file_path(&self.id),
            ExternalKind::Browser => ContentType::Browser,
            ExternalKind::Terminal => ContentType::Terminal,
        }
    }
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragItem {
    Pane,
    External(ExternalItem),
}

/// The in-flight drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragDescriptor {
    pub item: DragItem,
    /// Dragged pane, for pane drags.
    pub source_id: Option<PaneId>,
    /// Where the dragged pane sat when the drag began.
    pub source_path: Option<TreePath>,
}

/// The drop region currently under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub target_path: TreePath,
    pub side: DropSide,
}

/// Why a drop did nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum DropNoopReason {
    /// No drag was in flight.
    NoDrag,
    /// The pointer was not over any pane.
    NoTarget,
    /// A pane was dropped onto itself.
    SelfDrop,
    /// The dragged pane closed while the drag was in flight.
    SourceClosed,
    /// The target path no longer resolves to a pane.
    TargetMissing,
    /// The workspace refused the mutation.
    Rejected(LayoutError),
}

/// Result of [`DragCoordinator::drop_on`].
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// A new pane was split off the target.
    Split {
        pane_id: PaneId,
        hydration: Option<HydrationRequest>,
    },
    /// The dragged pane moved beside the target.
    Moved,
    /// The dragged pane's tabs were merged into the target.
    MergedAsTab(Merged),
    /// An external item opened as a new tab on the target.
    TabAppended(TabAdded),
    /// An external item replaced the target's empty content.
    ContentReplaced {
        pane_id: PaneId,
        hydration: Option<HydrationRequest>,
    },
    Ignored(DropNoopReason),
}

impl DropOutcome {
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

/// Pointer-gesture state machine for pane and external drags.
#[derive(Debug)]
pub struct DragCoordinator {
    drag: Option<DragDescriptor>,
    target: Option<DropTarget>,
    guard: Option<ListenerGuard>,
    edge_band: f64,
}

impl Default for DragCoordinator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl DragCoordinator {
    #[must_use]
    pub fn new(edge_band: f64) -> Self {
        Self {
            drag: None,
            target: None,
            guard: None,
            edge_band,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.drop_edge_band)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    #[must_use]
    pub fn drag(&self) -> Option<&DragDescriptor> {
        self.drag.as_ref()
    }

    #[must_use]
    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    fn start(&mut self, drag: DragDescriptor, guard: ListenerGuard) {
        self.cancel();
        self.drag = Some(drag);
        self.guard = Some(guard);
    }

    /// Start dragging an existing pane. A drag already in flight is
    /// cancelled first.
    pub fn begin_pane_drag(
        &mut self,
        workspace: &Workspace,
        pane_id: &str,
        guard: ListenerGuard,
    ) -> Result<(), LayoutError> {
        let path = workspace
            .path_of(pane_id)
            .filter(|_| workspace.content(pane_id).is_some())
            .ok_or_else(|| LayoutError::PaneNotFound {
                pane_id: PaneId::new(pane_id),
            })?;
        debug!(target: targets::DND, pane_id, path = ?path, "pane drag started");
        self.start(
            DragDescriptor {
                item: DragItem::Pane,
                source_id: Some(PaneId::new(pane_id)),
                source_path: Some(path),
            },
            guard,
        );
        Ok(())
    }

    /// Start dragging an item from outside the layout.
    pub fn begin_external_drag(&mut self, item: ExternalItem, guard: ListenerGuard) {
        debug!(target: targets::DND, kind = ?item.kind, id = item.id.as_str(), "external drag started");
        self.start(
            DragDescriptor {
                item: DragItem::External(item),
                source_id: None,
                source_path: None,
            },
            guard,
        );
    }

    /// Set (or clear) the drop target directly.
    pub fn hover(&mut self, target: Option<DropTarget>) {
        if self.drag.is_some() {
            self.target = target;
        }
    }

    /// Resolve the drop target under `point` against a solved layout.
    pub fn hover_at(&mut self, layout: &PaneLayout, point: Point) -> Option<&DropTarget> {
        let target = layout
            .hit_leaf(point, self.edge_band)
            .map(|hit| DropTarget {
                target_path: hit.path,
                side: hit.side,
            });
        self.hover(target);
        self.target.as_ref()
    }

    /// Abort the drag without mutating anything.
    pub fn cancel(&mut self) {
        let had_drag = self.drag.take().is_some();
        self.target = None;
        if let Some(guard) = self.guard.take() {
            guard.finish(GestureEnd::Canceled);
        }
        if had_drag {
            debug!(target: targets::DND, "drag cancelled");
        }
    }

    /// Apply the drop. Always clears the drag state.
    pub fn drop_on(&mut self, workspace: &mut Workspace) -> DropOutcome {
        let drag = self.drag.take();
        let target = self.target.take();
        let guard = self.guard.take();

        let outcome = resolve_drop(workspace, drag, target);
        if let Some(guard) = guard {
            guard.finish(if outcome.is_ignored() {
                GestureEnd::Canceled
            } else {
                GestureEnd::Committed
            });
        }
        debug!(target: targets::DND, outcome = ?outcome, "drop resolved");
        outcome
    }
}

fn resolve_drop(
    workspace: &mut Workspace,
    drag: Option<DragDescriptor>,
    target: Option<DropTarget>,
) -> DropOutcome {
    let Some(drag) = drag else {
        return DropOutcome::Ignored(DropNoopReason::NoDrag);
    };
    let Some(target) = target else {
        return DropOutcome::Ignored(DropNoopReason::NoTarget);
    };
    let Some(target_id) = workspace
        .root()
        .and_then(|root| root.resolve(&target.target_path))
        .map(|node| node.id().clone())
    else {
        return DropOutcome::Ignored(DropNoopReason::TargetMissing);
    };

    match drag.item {
        DragItem::Pane => drop_pane(workspace, drag.source_id, &target, &target_id),
        DragItem::External(item) => drop_external(workspace, item, &target, &target_id),
    }
}

fn drop_pane(
    workspace: &mut Workspace,
    source_id: Option<PaneId>,
    target: &DropTarget,
    target_id: &PaneId,
) -> DropOutcome {
    let Some(source_id) = source_id else {
        return DropOutcome::Ignored(DropNoopReason::NoDrag);
    };
    // The recorded source path may be stale; look the pane up again.
    let Some(source_path) = workspace
        .path_of(source_id.as_str())
        .filter(|_| workspace.content(source_id.as_str()).is_some())
    else {
        return DropOutcome::Ignored(DropNoopReason::SourceClosed);
    };
    if &source_id == target_id {
        return DropOutcome::Ignored(DropNoopReason::SelfDrop);
    }

    if target.side == DropSide::Center {
        match workspace.merge_as_tab(source_id.as_str(), target_id.as_str()) {
            Ok(merged) => DropOutcome::MergedAsTab(merged),
            Err(err) => DropOutcome::Ignored(DropNoopReason::Rejected(err)),
        }
    } else {
        match workspace.move_existing(&source_path, &target.target_path, target.side) {
            Ok(MoveOutcome::Moved) => DropOutcome::Moved,
            Ok(MoveOutcome::Unchanged) => DropOutcome::Ignored(DropNoopReason::SelfDrop),
            Err(err) => DropOutcome::Ignored(DropNoopReason::Rejected(err)),
        }
    }
}

fn drop_external(
    workspace: &mut Workspace,
    item: ExternalItem,
    target: &DropTarget,
    target_id: &PaneId,
) -> DropOutcome {
    let content_type = item.content_type();
    let content_id = Some(item.id);

    if target.side != DropSide::Center {
        return match workspace.split(&target.target_path, target.side, content_type, content_id) {
            Ok(spawned) => DropOutcome::Split {
                pane_id: spawned.pane_id,
                hydration: spawned.hydration,
            },
            Err(err) => DropOutcome::Ignored(DropNoopReason::Rejected(err)),
        };
    }

    let Some(is_empty) = workspace
        .content(target_id.as_str())
        .map(|descriptor| descriptor.is_empty_pane() && descriptor.tabs.is_empty())
    else {
        return DropOutcome::Ignored(DropNoopReason::TargetMissing);
    };
    if is_empty {
        match workspace.replace_content(target_id.as_str(), content_type, content_id) {
            Ok(hydration) => DropOutcome::ContentReplaced {
                pane_id: target_id.clone(),
                hydration,
            },
            Err(err) => DropOutcome::Ignored(DropNoopReason::Rejected(err)),
        }
    } else {
        match workspace.append_tab(target_id.as_str(), content_type, content_id) {
            Ok(added) => DropOutcome::TabAppended(added),
            Err(err) => DropOutcome::Ignored(DropNoopReason::Rejected(err)),
        }
    }
}
