#![forbid(unsafe_code)]

//! The owned layout store.
//!
//! [`Workspace`] owns the layout tree, the content registry, the id
//! allocator, and the active-pane cursor. It exposes only transactional
//! operations: each one validates its inputs before touching anything,
//! applies its mutation, and then runs one synchronizer pass. A failing
//! operation leaves the store exactly as it was and logs why.

use paneweave_core::logging::targets;
use paneweave_core::{DropSide, Rect};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{ErrorClass, LayoutError};
use crate::hydrate::{HydrationOutcome, HydrationRequest, HydrationResult, HydrationTicket};
use crate::id::{IdAllocator, PaneId, TabId};
use crate::layout::{PaneLayout, solve_layout};
use crate::registry::{
    ContentDescriptor, ContentState, ContentType, HydrationState, Registry, RegistryEntry,
    TabDescriptor,
};
use crate::render::RenderTable;
use crate::resize::normalize_with_floor;
use crate::sync::{SyncReport, synchronize};
use crate::tabs::{TabCloseOutcome, TabRangeError, TabSeed};
use crate::tree::{InvariantReport, LayoutNode, MoveOutcome, TreePath, add_leaf};

/// A pane created by [`Workspace::add_pane`], [`Workspace::split`], or
/// [`Workspace::place_reserved`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawned {
    pub pane_id: PaneId,
    /// Load the host must perform, if the content needs one.
    pub hydration: Option<HydrationRequest>,
}

/// A tab created by [`Workspace::add_tab`] or [`Workspace::append_tab`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabAdded {
    pub pane_id: PaneId,
    pub tab_id: TabId,
    pub hydration: Option<HydrationRequest>,
}

/// Result of [`Workspace::merge_as_tab`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Merged {
    /// Tabs moved into the target pane.
    pub appended: usize,
    /// Loads re-issued for moved tabs that were still loading.
    pub hydration: Vec<HydrationRequest>,
}

/// Where [`Workspace::place_reserved`] puts a reserved pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Append to the balanced grid.
    Grid,
    /// Split the node at `path` on `side`.
    Beside { path: TreePath, side: DropSide },
}

/// Flattened view of one pane for listings and headers.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneInfo {
    pub id: PaneId,
    pub path: TreePath,
    pub content_type: ContentType,
    pub content_id: Option<String>,
    pub title: String,
    pub tab_count: usize,
    pub active_tab_index: usize,
    pub hydration: HydrationState,
    pub is_active: bool,
}

/// Layout tree plus content registry, kept consistent.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub(crate) root: Option<LayoutNode>,
    pub(crate) registry: Registry,
    pub(crate) active: Option<PaneId>,
    pub(crate) ids: IdAllocator,
    pub(crate) config: EngineConfig,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn rejected(op: &'static str, err: LayoutError) -> LayoutError {
    match err.class() {
        ErrorClass::RaceStaleWrite => {
            debug!(target: targets::LAYOUT, op, error = %err, "discarded stale write");
        }
        _ => {
            warn!(target: targets::LAYOUT, op, error = %err, "layout operation rejected");
        }
    }
    err
}

fn tab_error(pane_id: &str) -> impl FnOnce(TabRangeError) -> LayoutError + '_ {
    move |err| LayoutError::TabOutOfRange {
        pane_id: PaneId::new(pane_id),
        index: err.index,
        len: err.len,
    }
}

impl Workspace {
    /// An empty workspace. Out-of-range config values are clamped.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            root: None,
            registry: Registry::new(),
            active: None,
            ids: IdAllocator::new(),
            config: config.validated(),
        }
    }

    #[must_use]
    pub fn root(&self) -> Option<&LayoutNode> {
        self.root.as_ref()
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pane that last received focus.
    #[must_use]
    pub fn active_pane(&self) -> Option<&PaneId> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn content(&self, pane_id: &str) -> Option<&ContentDescriptor> {
        self.registry.content(pane_id)
    }

    /// Leaf ids in pre-order.
    #[must_use]
    pub fn leaf_ids(&self) -> Vec<PaneId> {
        self.root
            .as_ref()
            .map(LayoutNode::collect_leaf_ids)
            .unwrap_or_default()
    }

    /// Tree path of a node.
    #[must_use]
    pub fn path_of(&self, node_id: &str) -> Option<TreePath> {
        self.root.as_ref()?.find_path(node_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Solve the current tree inside `area`.
    #[must_use]
    pub fn layout(&self, area: Rect) -> Option<PaneLayout> {
        self.root.as_ref().map(|root| solve_layout(root, area))
    }

    #[must_use]
    pub fn invariant_report(&self) -> InvariantReport {
        self.root
            .as_ref()
            .map(|root| root.invariant_report(self.config.size_epsilon))
            .unwrap_or_default()
    }

    fn require_pane(&self, pane_id: &str) -> Result<(), LayoutError> {
        let in_tree = self
            .root
            .as_ref()
            .is_some_and(|root| root.contains_leaf(pane_id));
        if in_tree && self.registry.content(pane_id).is_some() {
            Ok(())
        } else {
            Err(LayoutError::PaneNotFound {
                pane_id: PaneId::new(pane_id),
            })
        }
    }

    fn install_content(
        &mut self,
        pane_id: &PaneId,
        content_type: ContentType,
        content_id: Option<String>,
    ) -> Option<HydrationRequest> {
        let mut descriptor = ContentDescriptor::new(content_type, content_id);
        let request = HydrationRequest::for_content(
            pane_id,
            None,
            &descriptor.content_type,
            descriptor.content_id.as_deref(),
        );
        if request.is_some() {
            descriptor.payload.hydration = HydrationState::Loading;
        }
        self.registry.insert_content(pane_id.clone(), descriptor);
        request
    }

    /// Run one synchronizer pass and repair the active-pane cursor.
    fn commit(&mut self) -> SyncReport {
        let report = synchronize(
            &mut self.root,
            &mut self.registry,
            self.config.pending_grace_passes,
        );
        let active_alive = match (&self.active, &self.root) {
            (Some(active), Some(root)) => root.contains_leaf(active.as_str()),
            _ => false,
        };
        if !active_alive {
            self.active = self.root.as_ref().map(|root| root.first_leaf().clone());
        }
        report
    }

    /// Run a synchronizer pass without any other mutation.
    pub fn prune(&mut self) -> SyncReport {
        self.commit()
    }

    /// Add a pane to the balanced grid and focus it.
    ///
    /// Every add rebuilds the grid from scratch; manual proportions are lost.
    pub fn add_pane(&mut self, content_type: ContentType, content_id: Option<String>) -> Spawned {
        let pane_id = self.ids.next_pane();
        let hydration = self.install_content(&pane_id, content_type, content_id);
        self.root = Some(add_leaf(self.root.as_ref(), pane_id.clone(), &mut self.ids));
        self.active = Some(pane_id.clone());
        debug!(
            target: targets::LAYOUT,
            pane_id = %pane_id,
            leaves = self.root.as_ref().map_or(0, LayoutNode::leaf_count),
            "added pane to grid"
        );
        self.commit();
        Spawned { pane_id, hydration }
    }

    /// Split the node at `path`, placing a new pane on `side`.
    pub fn split(
        &mut self,
        path: &[usize],
        side: DropSide,
        content_type: ContentType,
        content_id: Option<String>,
    ) -> Result<Spawned, LayoutError> {
        if side == DropSide::Center {
            return Err(rejected("split", LayoutError::CenterIsNotASplit));
        }
        let Some(root) = self.root.as_ref() else {
            return Err(rejected("split", LayoutError::EmptyLayout));
        };
        if root.resolve(path).is_none() {
            return Err(rejected(
                "split",
                LayoutError::PathNotFound {
                    path: path.to_vec(),
                },
            ));
        }

        let pane_id = self.ids.next_pane();
        let split_id = self.ids.next_split();
        // Registry first, then tree.
        let hydration = self.install_content(&pane_id, content_type, content_id);
        if let Some(root) = self.root.as_mut()
            && let Err(err) = root.split_at(path, side, pane_id.clone(), split_id)
        {
            self.registry.remove(pane_id.as_str());
            return Err(rejected("split", err));
        }
        self.active = Some(pane_id.clone());
        debug!(
            target: targets::LAYOUT,
            pane_id = %pane_id,
            path = ?path,
            side = side.as_str(),
            "split pane"
        );
        self.commit();
        Ok(Spawned { pane_id, hydration })
    }

    /// Move the node at `source` beside the node at `target`.
    ///
    /// Dropping a node onto itself is a no-op.
    pub fn move_existing(
        &mut self,
        source: &[usize],
        target: &[usize],
        side: DropSide,
    ) -> Result<MoveOutcome, LayoutError> {
        let Some(root) = self.root.as_mut() else {
            return Err(rejected("move_existing", LayoutError::EmptyLayout));
        };
        let split_id = self.ids.next_split();
        match root.move_node(source, target, side, split_id) {
            Ok(outcome) => {
                debug!(
                    target: targets::LAYOUT,
                    source = ?source,
                    target_path = ?target,
                    side = side.as_str(),
                    outcome = ?outcome,
                    "moved pane"
                );
                self.commit();
                Ok(outcome)
            }
            Err(err) => Err(rejected("move_existing", err)),
        }
    }

    /// Append all of `source_id`'s tabs to `target_id` and close the source.
    ///
    /// The last appended tab becomes active. Never creates a split.
    pub fn merge_as_tab(&mut self, source_id: &str, target_id: &str) -> Result<Merged, LayoutError> {
        if source_id == target_id {
            return Ok(Merged::default());
        }
        self.require_pane(source_id)
            .and_then(|()| self.require_pane(target_id))
            .map_err(|err| rejected("merge_as_tab", err))?;

        let Some(RegistryEntry::Content(mut source)) = self.registry.remove(source_id) else {
            return Err(rejected(
                "merge_as_tab",
                LayoutError::PaneNotFound {
                    pane_id: PaneId::new(source_id),
                },
            ));
        };
        let Some(target) = self.registry.content_mut(target_id) else {
            self.registry.insert_content(PaneId::new(source_id), source);
            return Err(rejected(
                "merge_as_tab",
                LayoutError::PaneNotFound {
                    pane_id: PaneId::new(target_id),
                },
            ));
        };

        let moved = source.take_tabs(&mut self.ids);
        let appended = moved.len();
        let target_pane = PaneId::new(target_id);
        let hydration: Vec<HydrationRequest> = moved
            .iter()
            .filter(|tab| tab.snapshot.hydration == HydrationState::Loading)
            .filter_map(|tab| {
                HydrationRequest::for_content(
                    &target_pane,
                    Some(tab.id.clone()),
                    &tab.content_type,
                    tab.content_id.as_deref(),
                )
            })
            .collect();

        target.ensure_tabs(&mut self.ids);
        target.flush_active();
        target.tabs.extend(moved);
        target.active_tab_index = target.tabs.len() - 1;
        target.mirror_active();

        if self.active.as_ref().is_some_and(|id| id.as_str() == source_id) {
            self.active = Some(target_pane);
        }
        debug!(
            target: targets::TABS,
            from = source_id,
            into = target_id,
            appended,
            "merged pane into tabs"
        );
        self.commit();
        Ok(Merged {
            appended,
            hydration,
        })
    }

    /// Replace the sizes of the split at `split_path`.
    ///
    /// Sizes are rescaled to sum to 100 with every entry at or above the
    /// configured floor. Returns the sizes actually stored.
    pub fn resize(&mut self, split_path: &[usize], sizes: &[f64]) -> Result<Vec<f64>, LayoutError> {
        let Some(root) = self.root.as_ref() else {
            return Err(rejected("resize", LayoutError::EmptyLayout));
        };
        let Some(node) = root.resolve(split_path) else {
            return Err(rejected(
                "resize",
                LayoutError::PathNotFound {
                    path: split_path.to_vec(),
                },
            ));
        };
        let LayoutNode::Split { id, children, .. } = node else {
            return Err(rejected(
                "resize",
                LayoutError::NotASplit {
                    path: split_path.to_vec(),
                },
            ));
        };
        if sizes.len() != children.len() {
            return Err(rejected(
                "resize",
                LayoutError::SizesLengthMismatch {
                    split_id: id.clone(),
                    expected: children.len(),
                    actual: sizes.len(),
                },
            ));
        }
        let total: f64 = sizes.iter().sum();
        if sizes.iter().any(|size| !size.is_finite() || *size < 0.0) || total <= 0.0 {
            return Err(rejected(
                "resize",
                LayoutError::InvalidSizes {
                    split_id: id.clone(),
                },
            ));
        }
        let split_id = id.clone();

        let normalized = normalize_with_floor(sizes, self.config.resize_floor);
        if let Some(root) = self.root.as_mut() {
            root.set_sizes(split_path, normalized.clone())
                .map_err(|err| rejected("resize", err))?;
        }
        debug!(
            target: targets::RESIZE,
            split_id = %split_id,
            sizes = ?normalized,
            "committed split sizes"
        );
        self.commit();
        Ok(normalized)
    }

    /// [`Workspace::resize`] addressed by split id.
    pub fn resize_split(&mut self, split_id: &str, sizes: &[f64]) -> Result<Vec<f64>, LayoutError> {
        let Some(path) = self.path_of(split_id) else {
            return Err(rejected(
                "resize",
                LayoutError::PaneNotFound {
                    pane_id: PaneId::new(split_id),
                },
            ));
        };
        self.resize(&path, sizes)
    }

    /// Close a pane and all its tabs.
    pub fn close_pane(&mut self, pane_id: &str) -> Result<(), LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("close_pane", err))?;
        self.registry.remove(pane_id);
        debug!(target: targets::LAYOUT, pane_id, "closed pane");
        self.commit();
        Ok(())
    }

    /// Replace what a pane shows (its active tab, in tab mode).
    pub fn replace_content(
        &mut self,
        pane_id: &str,
        content_type: ContentType,
        content_id: Option<String>,
    ) -> Result<Option<HydrationRequest>, LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("replace_content", err))?;
        let Some(descriptor) = self.registry.content_mut(pane_id) else {
            return Ok(None);
        };

        let fresh = ContentDescriptor::new(content_type, content_id);
        let tab_id = descriptor
            .active_tab()
            .map(|tab| tab.id.clone());
        let request = HydrationRequest::for_content(
            &PaneId::new(pane_id),
            tab_id,
            &fresh.content_type,
            fresh.content_id.as_deref(),
        );
        descriptor.content_type = fresh.content_type;
        descriptor.content_id = fresh.content_id;
        descriptor.payload = fresh.payload;
        if request.is_some() {
            descriptor.payload.hydration = HydrationState::Loading;
        }
        let active_index = descriptor.active_tab_index;
        if let Some(tab) = descriptor.tabs.get_mut(active_index) {
            tab.content_type.clone_from(&descriptor.content_type);
            tab.content_id.clone_from(&descriptor.content_id);
        }
        descriptor.flush_active();
        debug!(
            target: targets::LAYOUT,
            pane_id,
            content_type = %descriptor.content_type,
            "replaced pane content"
        );
        self.commit();
        Ok(request)
    }

    /// Switch a pane's active tab.
    pub fn select_tab(&mut self, pane_id: &str, index: usize) -> Result<(), LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("select_tab", err))?;
        if let Some(descriptor) = self.registry.content_mut(pane_id) {
            descriptor
                .select(index)
                .map_err(tab_error(pane_id))
                .map_err(|err| rejected("select_tab", err))?;
        }
        debug!(target: targets::TABS, pane_id, index, "selected tab");
        self.commit();
        Ok(())
    }

    /// Close one tab; closing the last tab closes the pane.
    pub fn close_tab(&mut self, pane_id: &str, index: usize) -> Result<TabCloseOutcome, LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("close_tab", err))?;
        let Some(descriptor) = self.registry.content_mut(pane_id) else {
            return Err(LayoutError::PaneNotFound {
                pane_id: PaneId::new(pane_id),
            });
        };
        let outcome = descriptor
            .close(index)
            .map_err(tab_error(pane_id))
            .map_err(|err| rejected("close_tab", err))?;
        if outcome == TabCloseOutcome::PaneEmptied {
            self.registry.remove(pane_id);
        }
        debug!(target: targets::TABS, pane_id, index, outcome = ?outcome, "closed tab");
        self.commit();
        Ok(outcome)
    }

    /// Move a tab within its pane.
    pub fn reorder_tab(&mut self, pane_id: &str, from: usize, to: usize) -> Result<(), LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("reorder_tab", err))?;
        if let Some(descriptor) = self.registry.content_mut(pane_id) {
            descriptor
                .reorder(from, to)
                .map_err(tab_error(pane_id))
                .map_err(|err| rejected("reorder_tab", err))?;
        }
        debug!(target: targets::TABS, pane_id, from, to, "reordered tab");
        self.commit();
        Ok(())
    }

    /// Open a new tab of `content_type` with a synthesized content id.
    pub fn add_tab(&mut self, pane_id: &str, content_type: ContentType) -> Result<TabAdded, LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("add_tab", err))?;
        let seed = TabSeed::for_type(
            &content_type,
            &mut self.ids,
            &self.config.default_browser_url,
            self.config.default_shell.as_deref(),
        );
        // Synthesized buffers start local; nothing to load.
        let hydrate = seed.snapshot.buffer.is_none();
        self.attach_tab(pane_id, content_type, seed.content_id, seed.snapshot, hydrate)
    }

    /// Open an existing item (file, conversation, page) as a new tab.
    pub fn append_tab(
        &mut self,
        pane_id: &str,
        content_type: ContentType,
        content_id: Option<String>,
    ) -> Result<TabAdded, LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("append_tab", err))?;
        let snapshot = ContentDescriptor::new(content_type.clone(), content_id.clone()).payload;
        self.attach_tab(pane_id, content_type, content_id, snapshot, true)
    }

    fn attach_tab(
        &mut self,
        pane_id: &str,
        content_type: ContentType,
        content_id: Option<String>,
        mut snapshot: ContentState,
        hydrate: bool,
    ) -> Result<TabAdded, LayoutError> {
        let pane = PaneId::new(pane_id);
        let tab_id = self.ids.next_tab();
        let hydration = if hydrate {
            HydrationRequest::for_content(
                &pane,
                Some(tab_id.clone()),
                &content_type,
                content_id.as_deref(),
            )
        } else {
            None
        };
        if hydration.is_some() {
            snapshot.hydration = HydrationState::Loading;
        }
        let Some(descriptor) = self.registry.content_mut(pane_id) else {
            return Err(rejected("add_tab", LayoutError::PaneNotFound { pane_id: pane }));
        };
        descriptor.push_tab(
            TabDescriptor {
                id: tab_id.clone(),
                content_type,
                content_id,
                snapshot,
            },
            &mut self.ids,
        );
        debug!(
            target: targets::TABS,
            pane_id,
            tab_id = %tab_id,
            tabs = descriptor.tabs.len(),
            "added tab"
        );
        self.commit();
        Ok(TabAdded {
            pane_id: pane,
            tab_id,
            hydration,
        })
    }

    /// Reserve a pane id before its content type is known.
    ///
    /// The reservation is pending: it is not in the tree and survives only
    /// the configured number of sync passes unless placed.
    pub fn reserve_pane(&mut self) -> PaneId {
        let pane_id = self.ids.next_pane();
        self.registry.reserve_pending(pane_id.clone());
        debug!(target: targets::LAYOUT, pane_id = %pane_id, "reserved pending pane");
        pane_id
    }

    /// Give a reserved pane its content and place it in the tree.
    pub fn place_reserved(
        &mut self,
        pane_id: &str,
        placement: Placement,
        content_type: ContentType,
        content_id: Option<String>,
    ) -> Result<Spawned, LayoutError> {
        let reserved = matches!(
            self.registry.get(pane_id),
            Some(RegistryEntry::Pending {
                cancelled: false,
                ..
            })
        );
        if !reserved {
            return Err(rejected(
                "place_reserved",
                LayoutError::NotPending {
                    pane_id: PaneId::new(pane_id),
                },
            ));
        }
        if let Placement::Beside { path, side } = &placement {
            if *side == DropSide::Center {
                return Err(rejected("place_reserved", LayoutError::CenterIsNotASplit));
            }
            match self.root.as_ref() {
                None => return Err(rejected("place_reserved", LayoutError::EmptyLayout)),
                Some(root) if root.resolve(path).is_none() => {
                    return Err(rejected(
                        "place_reserved",
                        LayoutError::PathNotFound { path: path.clone() },
                    ));
                }
                Some(_) => {}
            }
        }

        let id = PaneId::new(pane_id);
        let hydration = self.install_content(&id, content_type, content_id);
        match placement {
            Placement::Grid => {
                self.root = Some(add_leaf(self.root.as_ref(), id.clone(), &mut self.ids));
            }
            Placement::Beside { path, side } => {
                let split_id = self.ids.next_split();
                if let Some(root) = self.root.as_mut() {
                    root.split_at(&path, side, id.clone(), split_id)
                        .map_err(|err| rejected("place_reserved", err))?;
                }
            }
        }
        self.active = Some(id.clone());
        debug!(target: targets::LAYOUT, pane_id, "placed reserved pane");
        self.commit();
        Ok(Spawned {
            pane_id: id,
            hydration,
        })
    }

    /// Cancel a pending reservation; the next sync pass removes it.
    pub fn cancel_pending(&mut self, pane_id: &str) -> bool {
        let cancelled = self.registry.cancel_pending(pane_id);
        if cancelled {
            debug!(target: targets::LAYOUT, pane_id, "cancelled pending pane");
        }
        cancelled
    }

    /// Focus a pane.
    pub fn set_active(&mut self, pane_id: &str) -> Result<(), LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("set_active", err))?;
        self.active = Some(PaneId::new(pane_id));
        Ok(())
    }

    /// Edit the live payload of a pane's visible content (typing, scrolling,
    /// navigation). Background tabs keep their snapshots.
    pub fn edit_payload(
        &mut self,
        pane_id: &str,
        edit: impl FnOnce(&mut ContentState),
    ) -> Result<(), LayoutError> {
        self.require_pane(pane_id)
            .map_err(|err| rejected("edit_payload", err))?;
        if let Some(descriptor) = self.registry.content_mut(pane_id) {
            edit(&mut descriptor.payload);
        }
        Ok(())
    }

    /// Write a finished load back into the registry.
    ///
    /// The ticket must still match live state: the pane must exist, and the
    /// tab (or single content) must still hold the same content id.
    /// Otherwise nothing is written and [`HydrationOutcome::Stale`] is
    /// returned.
    pub fn apply_hydration(
        &mut self,
        ticket: &HydrationTicket,
        result: HydrationResult,
    ) -> HydrationOutcome {
        let pane_id = ticket.pane_id.as_str();
        let in_tree = self
            .root
            .as_ref()
            .is_some_and(|root| root.contains_leaf(pane_id));
        let target = if in_tree {
            self.registry
                .content_mut(pane_id)
                .and_then(|descriptor| hydration_target(descriptor, ticket))
        } else {
            None
        };
        let Some(target) = target else {
            debug!(
                target: targets::HYDRATE,
                pane_id,
                content_id = ticket.content_id.as_str(),
                "discarded stale hydration"
            );
            return HydrationOutcome::Stale;
        };
        match result {
            HydrationResult::Loaded(state) => target.absorb(state),
            HydrationResult::Failed(message) => target.fail(message),
        }
        debug!(
            target: targets::HYDRATE,
            pane_id,
            content_id = ticket.content_id.as_str(),
            "applied hydration"
        );
        HydrationOutcome::Applied
    }

    /// One entry per surviving leaf, in pre-order.
    #[must_use]
    pub fn pane_infos(&self) -> Vec<PaneInfo> {
        let Some(root) = self.root.as_ref() else {
            return Vec::new();
        };
        root.collect_leaf_ids()
            .into_iter()
            .filter_map(|id| {
                let descriptor = self.registry.content(id.as_str())?;
                Some(PaneInfo {
                    path: root.find_path(id.as_str()).unwrap_or_default(),
                    content_type: descriptor.content_type.clone(),
                    content_id: descriptor.content_id.clone(),
                    title: descriptor.title(),
                    tab_count: descriptor.tab_count(),
                    active_tab_index: descriptor.active_tab_index,
                    hydration: descriptor.payload.hydration,
                    is_active: self.active.as_ref() == Some(&id),
                    id,
                })
            })
            .collect()
    }

    /// Render every surviving leaf in pre-order through `table`.
    ///
    /// Leaves whose type has no renderer (and no fallback) are skipped.
    pub fn render_with<R>(&self, table: &RenderTable<R>) -> Vec<(PaneId, R)> {
        self.leaf_ids()
            .into_iter()
            .filter_map(|id| {
                let descriptor = self.registry.content(id.as_str())?;
                let rendered = table.dispatch(&id, descriptor)?;
                Some((id, rendered))
            })
            .collect()
    }
}

fn hydration_target<'a>(
    descriptor: &'a mut ContentDescriptor,
    ticket: &HydrationTicket,
) -> Option<&'a mut ContentState> {
    let content_id = Some(ticket.content_id.as_str());
    let index = match &ticket.tab_id {
        Some(tab_id) => descriptor
            .tabs
            .iter()
            .position(|tab| &tab.id == tab_id && tab.content_id.as_deref() == content_id)?,
        None if descriptor.tabs.is_empty() => {
            return (descriptor.content_id.as_deref() == content_id)
                .then_some(&mut descriptor.payload);
        }
        // Issued before the pane grew tabs; the content now lives in one.
        // With the same content open twice, the tab still loading wins.
        None => {
            let active = descriptor.active_tab_index;
            let loading = |index: usize, tab: &TabDescriptor| {
                let state = if index == active {
                    &descriptor.payload
                } else {
                    &tab.snapshot
                };
                state.hydration == HydrationState::Loading
            };
            let matches = |tab: &TabDescriptor| tab.content_id.as_deref() == content_id;
            let first = descriptor.tabs.iter().position(matches)?;
            descriptor
                .tabs
                .iter()
                .enumerate()
                .position(|(index, tab)| matches(tab) && loading(index, tab))
                .unwrap_or(first)
        }
    };
    if index == descriptor.active_tab_index {
        Some(&mut descriptor.payload)
    } else {
        descriptor.tabs.get_mut(index).map(|tab| &mut tab.snapshot)
    }
}
