#![forbid(unsafe_code)]

//! Serializable workspace snapshot.
//!
//! The engine owns no storage. Hosts that persist layouts serialize a
//! [`WorkspaceSnapshot`] however they like and hand it back to
//! [`Workspace::from_snapshot`], which cleans it up before use: panes that
//! never received a content type are dropped, malformed splits are
//! repaired, and the tree and registry are resynchronized.

use std::collections::BTreeMap;
use std::fmt;

use paneweave_core::logging::targets;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::hydrate::HydrationRequest;
use crate::id::{IdAllocator, PaneId};
use crate::registry::{HydrationState, Registry, RegistryEntry};
use crate::sync::{SyncReport, synchronize};
use crate::tree::{InvariantReport, LayoutNode, RepairAction, repair};
use crate::workspace::Workspace;

/// Current snapshot schema version.
pub const WORKSPACE_SNAPSHOT_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    WORKSPACE_SNAPSHOT_SCHEMA_VERSION
}

/// Tree, registry, and focus of one workspace.
///
/// `extensions` is reserved for host-defined, forward-compatible fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub root: Option<LayoutNode>,
    #[serde(default)]
    pub registry: Registry,
    #[serde(default)]
    pub active_pane: Option<PaneId>,
    #[serde(default)]
    pub extensions: BTreeMap<String, String>,
}

/// Snapshot rejected on restore or validation.
#[derive(Debug)]
pub enum SnapshotError {
    UnsupportedSchemaVersion { version: u16 },
    /// The tree has findings [`repair`] cannot fix (duplicate ids).
    Unrepairable { report: InvariantReport },
    /// `active_pane` names no leaf of the tree.
    ActivePaneMissing { pane_id: PaneId },
    /// A tabbed pane's `active_tab_index` points past its tabs.
    ActiveTabOutOfRange {
        pane_id: PaneId,
        index: usize,
        tabs: usize,
    },
    Json(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedSchemaVersion { version } => write!(
                f,
                "unsupported snapshot schema version {version} (expected {WORKSPACE_SNAPSHOT_SCHEMA_VERSION})"
            ),
            Self::Unrepairable { report } => write!(
                f,
                "snapshot tree has {} unrepairable invariant issue(s)",
                report.issues.iter().filter(|issue| !issue.repairable).count()
            ),
            Self::ActivePaneMissing { pane_id } => {
                write!(f, "active pane {pane_id} is not in the tree")
            }
            Self::ActiveTabOutOfRange {
                pane_id,
                index,
                tabs,
            } => write!(
                f,
                "pane {pane_id} selects tab {index} but has {tabs} tab(s)"
            ),
            Self::Json(err) => write!(f, "snapshot JSON error: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl WorkspaceSnapshot {
    /// Check schema version, tree invariants, the active pane, and each
    /// pane's active tab.
    ///
    /// Repairable tree findings pass; restore fixes them.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        self.check_restorable()?;
        for (pane_id, entry) in self.registry.iter() {
            let RegistryEntry::Content(descriptor) = entry else {
                continue;
            };
            let tabs = descriptor.tabs.len();
            if tabs > 0 && descriptor.active_tab_index >= tabs {
                return Err(SnapshotError::ActiveTabOutOfRange {
                    pane_id: pane_id.clone(),
                    index: descriptor.active_tab_index,
                    tabs,
                });
            }
        }
        if let Some(active) = &self.active_pane {
            let present = self
                .root
                .as_ref()
                .is_some_and(|root| root.contains_leaf(active.as_str()));
            if !present {
                return Err(SnapshotError::ActivePaneMissing {
                    pane_id: active.clone(),
                });
            }
        }
        Ok(())
    }

    fn check_restorable(&self) -> Result<(), SnapshotError> {
        if self.schema_version != WORKSPACE_SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedSchemaVersion {
                version: self.schema_version,
            });
        }
        if let Some(root) = &self.root {
            let report = root.invariant_report(EngineConfig::default().size_epsilon);
            if report.has_unrepairable_errors() {
                return Err(SnapshotError::Unrepairable { report });
            }
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Json)
    }

    pub fn from_json_str(s: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(s).map_err(SnapshotError::Json)
    }
}

/// A workspace rebuilt from a snapshot plus what restore changed.
#[derive(Debug)]
pub struct Restored {
    pub workspace: Workspace,
    /// Repairs applied to the tree.
    pub repairs: Vec<RepairAction>,
    /// Pending reservations dropped.
    pub dropped_pending: Vec<PaneId>,
    /// Tabbed panes whose active tab index was out of range and got clamped.
    pub clamped_tabs: Vec<PaneId>,
    pub sync: SyncReport,
    /// Loads that were in flight when the snapshot was taken.
    pub hydration: Vec<HydrationRequest>,
}

impl Workspace {
    /// Capture the current state.
    ///
    /// Each tabbed pane's live payload is flushed into its active tab first.
    #[must_use]
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let mut registry = self.registry.clone();
        for (_, descriptor) in registry.contents_mut() {
            descriptor.flush_active();
        }
        WorkspaceSnapshot {
            schema_version: WORKSPACE_SNAPSHOT_SCHEMA_VERSION,
            root: self.root.clone(),
            registry,
            active_pane: self.active.clone(),
            extensions: BTreeMap::new(),
        }
    }

    /// Rebuild a workspace from `snapshot`.
    ///
    /// Pending entries are dropped (their reservations died with the
    /// process), repairable tree defects are fixed, and one synchronizer
    /// pass removes leaves without content and content without leaves.
    /// Each tabbed pane's active tab index is clamped into range and its
    /// active tab is mirrored into the live payload. Content still marked
    /// loading gets a fresh hydration request.
    pub fn from_snapshot(
        snapshot: WorkspaceSnapshot,
        config: EngineConfig,
    ) -> Result<Restored, SnapshotError> {
        snapshot.check_restorable()?;
        let WorkspaceSnapshot {
            root,
            mut registry,
            active_pane,
            ..
        } = snapshot;
        let config = config.validated();

        let (mut root, repairs) = match root {
            Some(root) => {
                let repaired = repair(root, config.size_epsilon);
                (repaired.root, repaired.actions)
            }
            None => (None, Vec::new()),
        };
        if !repairs.is_empty() {
            warn!(
                target: targets::LAYOUT,
                repairs = repairs.len(),
                "repaired snapshot tree"
            );
        }

        let dropped_pending = registry.pending_ids();
        for id in &dropped_pending {
            registry.remove(id.as_str());
        }
        let sync = synchronize(&mut root, &mut registry, config.pending_grace_passes);

        let clamped_tabs = restore_active_tabs(&mut registry);
        if !clamped_tabs.is_empty() {
            warn!(
                target: targets::LAYOUT,
                panes = clamped_tabs.len(),
                "clamped out-of-range active tab index"
            );
        }

        let mut ids = IdAllocator::new();
        observe_ids(&mut ids, root.as_ref(), &registry);
        let hydration = reissue_loads(&mut registry);

        let active = active_pane
            .filter(|id| {
                root.as_ref()
                    .is_some_and(|root| root.contains_leaf(id.as_str()))
            })
            .or_else(|| root.as_ref().map(|root| root.first_leaf().clone()));

        debug!(
            target: targets::LAYOUT,
            panes = registry.len(),
            repairs = repairs.len(),
            dropped_pending = dropped_pending.len(),
            reissued = hydration.len(),
            "restored workspace snapshot"
        );
        Ok(Restored {
            workspace: Workspace {
                root,
                registry,
                active,
                ids,
                config,
            },
            repairs,
            dropped_pending,
            clamped_tabs,
            sync,
            hydration,
        })
    }
}

fn observe_ids(ids: &mut IdAllocator, root: Option<&LayoutNode>, registry: &Registry) {
    fn walk(ids: &mut IdAllocator, node: &LayoutNode) {
        ids.observe(node.id().as_str());
        for child in node.children() {
            walk(ids, child);
        }
    }
    if let Some(root) = root {
        walk(ids, root);
    }
    for (_, entry) in registry.iter() {
        let RegistryEntry::Content(descriptor) = entry else {
            continue;
        };
        if let Some(content_id) = &descriptor.content_id {
            ids.observe(content_id);
        }
        for tab in &descriptor.tabs {
            ids.observe(tab.id.as_str());
            if let Some(content_id) = &tab.content_id {
                ids.observe(content_id);
            }
        }
    }
}

fn restore_active_tabs(registry: &mut Registry) -> Vec<PaneId> {
    let mut clamped = Vec::new();
    for (pane_id, descriptor) in registry.contents_mut() {
        if descriptor.tabs.is_empty() {
            continue;
        }
        let last = descriptor.tabs.len() - 1;
        if descriptor.active_tab_index > last {
            descriptor.active_tab_index = last;
            clamped.push(pane_id.clone());
        }
        descriptor.mirror_active();
    }
    clamped
}

fn reissue_loads(registry: &mut Registry) -> Vec<HydrationRequest> {
    let mut requests = Vec::new();
    for (pane_id, descriptor) in registry.contents_mut() {
        if descriptor.tabs.is_empty() {
            if descriptor.payload.hydration == HydrationState::Loading {
                requests.extend(HydrationRequest::for_content(
                    pane_id,
                    None,
                    &descriptor.content_type,
                    descriptor.content_id.as_deref(),
                ));
            }
            continue;
        }
        requests.extend(
            descriptor
                .tabs
                .iter()
                .filter(|tab| tab.snapshot.hydration == HydrationState::Loading)
                .filter_map(|tab| {
                    HydrationRequest::for_content(
                        pane_id,
                        Some(tab.id.clone()),
                        &tab.content_type,
                        tab.content_id.as_deref(),
                    )
                }),
        );
    }
    requests
}
