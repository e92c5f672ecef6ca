#![forbid(unsafe_code)]

//! Tree/registry reconciliation.
//!
//! Runs after every mutation that can orphan state:
//!
//! 1. `V` = registry ids with a defined content type.
//! 2. Prune the tree down to leaves in `V`.
//! 3. `S` = surviving leaf ids.
//! 4. Typed entries outside `S` are deleted. Pending entries outside `S`
//!    age by one pass and are deleted once cancelled or past the grace
//!    window.
//!
//! Pane creation writes the registry before the tree, so the registry is
//! consulted first and the tree is trimmed to it, never the other way round.

use std::collections::BTreeSet;

use paneweave_core::logging::targets;
use tracing::debug;

use crate::id::PaneId;
use crate::registry::{Registry, RegistryEntry};
use crate::tree::{LayoutNode, prune};

/// What one synchronizer pass changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Tree leaves removed for lacking a typed registry entry.
    pub pruned: Vec<PaneId>,
    /// Splits collapsed or dropped while pruning.
    pub collapsed_splits: usize,
    /// Typed registry entries removed for lacking a leaf.
    pub dropped_content: Vec<PaneId>,
    /// Pending entries removed (cancelled or out of grace).
    pub dropped_pending: Vec<PaneId>,
    /// Pending entries kept for another pass.
    pub retained_pending: Vec<PaneId>,
}

impl SyncReport {
    /// True if the pass changed nothing except pending ages.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.pruned.is_empty()
            && self.collapsed_splits == 0
            && self.dropped_content.is_empty()
            && self.dropped_pending.is_empty()
    }
}

/// Reconcile `root` and `registry`.
///
/// `grace` is the number of passes a tree-absent pending entry survives.
pub fn synchronize(root: &mut Option<LayoutNode>, registry: &mut Registry, grace: u32) -> SyncReport {
    let span = tracing::debug_span!(
        "layout.sync",
        pruned = tracing::field::Empty,
        dropped = tracing::field::Empty,
        retained_pending = tracing::field::Empty,
    );
    let _guard = span.enter();

    let mut report = SyncReport::default();
    let typed = registry.typed_ids();
    if let Some(tree) = root.take() {
        let pruned = prune(tree, |id| typed.contains(id));
        *root = pruned.root;
        report.pruned = pruned.removed;
        report.collapsed_splits = pruned.collapsed;
    }

    let surviving: BTreeSet<PaneId> = root
        .as_ref()
        .map(LayoutNode::collect_leaf_ids)
        .unwrap_or_default()
        .into_iter()
        .collect();

    registry.retain(|id, entry| {
        if surviving.contains(id) {
            return true;
        }
        match entry {
            RegistryEntry::Content(_) => {
                report.dropped_content.push(id.clone());
                false
            }
            RegistryEntry::Pending {
                passes_seen,
                cancelled,
            } => {
                if *cancelled || *passes_seen >= grace {
                    report.dropped_pending.push(id.clone());
                    false
                } else {
                    *passes_seen += 1;
                    report.retained_pending.push(id.clone());
                    true
                }
            }
        }
    });

    span.record("pruned", report.pruned.len());
    span.record(
        "dropped",
        report.dropped_content.len() + report.dropped_pending.len(),
    );
    span.record("retained_pending", report.retained_pending.len());
    if !report.is_noop() {
        debug!(
            target: targets::SYNC,
            pruned = ?report.pruned,
            dropped_content = ?report.dropped_content,
            dropped_pending = ?report.dropped_pending,
            collapsed = report.collapsed_splits,
            "synchronized layout and registry"
        );
    }
    report
}
