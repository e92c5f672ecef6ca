#![forbid(unsafe_code)]

//! Recursive split/leaf layout tree.
//!
//! A [`LayoutNode`] is either a `Leaf` holding one pane or a `Split` that
//! partitions its area among ordered children along one axis. The tree is an
//! owned recursive value; nodes are never shared between subtrees, so cycles
//! are unrepresentable and structural edits happen in place through
//! [`LayoutNode::resolve_mut`].
//!
//! # Invariants
//!
//! 1. A split has at least two children.
//! 2. `sizes.len() == children.len()` and the sizes sum to 100.
//! 3. Node ids are unique across the whole tree.
//!
//! Public operations preserve all three. [`LayoutNode::invariant_report`]
//! and [`repair`] exist for trees that arrive from outside (snapshots).

use std::collections::BTreeSet;

use paneweave_core::grid::{grid_rows, sizes_are_normalized, uniform_sizes};
use paneweave_core::{DropSide, SplitAxis};
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::id::{IdAllocator, PaneId};

/// Child-index path from the root to a node. The empty path is the root.
pub type TreePath = Vec<usize>;

/// Initial share of each side of a fresh split.
const HALF_SHARE: f64 = 50.0;

/// One node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutNode {
    Leaf {
        id: PaneId,
    },
    Split {
        id: PaneId,
        axis: SplitAxis,
        children: Vec<LayoutNode>,
        /// Percentage share per child.
        sizes: Vec<f64>,
    },
}

/// Result of [`LayoutNode::move_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Source and target were the same node.
    Unchanged,
}

impl LayoutNode {
    /// A leaf node.
    #[must_use]
    pub fn leaf(id: impl Into<PaneId>) -> Self {
        Self::Leaf { id: id.into() }
    }

    /// A split with uniform sizes.
    #[must_use]
    pub fn new_split(id: impl Into<PaneId>, axis: SplitAxis, children: Vec<LayoutNode>) -> Self {
        let sizes = uniform_sizes(children.len());
        Self::Split {
            id: id.into(),
            axis,
            children,
            sizes,
        }
    }

    /// Node id.
    #[must_use]
    pub fn id(&self) -> &PaneId {
        match self {
            Self::Leaf { id } | Self::Split { id, .. } => id,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Children of a split; empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[LayoutNode] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Split { children, .. } => children,
        }
    }

    /// Leaf ids in pre-order.
    #[must_use]
    pub fn collect_leaf_ids(&self) -> Vec<PaneId> {
        let mut out = Vec::new();
        self.visit_leaves(&mut |id| out.push(id.clone()));
        out
    }

    fn visit_leaves<'a>(&'a self, visit: &mut impl FnMut(&'a PaneId)) {
        match self {
            Self::Leaf { id } => visit(id),
            Self::Split { children, .. } => {
                for child in children {
                    child.visit_leaves(visit);
                }
            }
        }
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit_leaves(&mut |_| count += 1);
        count
    }

    /// First leaf in pre-order.
    #[must_use]
    pub fn first_leaf(&self) -> &PaneId {
        match self {
            Self::Leaf { id } => id,
            Self::Split { id, children, .. } => children.first().map_or(id, Self::first_leaf),
        }
    }

    /// True if a leaf with `id` exists.
    #[must_use]
    pub fn contains_leaf(&self, id: &str) -> bool {
        match self {
            Self::Leaf { id: leaf } => leaf.as_str() == id,
            Self::Split { children, .. } => children.iter().any(|child| child.contains_leaf(id)),
        }
    }

    /// Path to the node (leaf or split) with `id`, if any.
    #[must_use]
    pub fn find_path(&self, id: &str) -> Option<TreePath> {
        let mut path = Vec::new();
        self.find_path_into(id, &mut path).then_some(path)
    }

    fn find_path_into(&self, id: &str, path: &mut TreePath) -> bool {
        if self.id().as_str() == id {
            return true;
        }
        if let Self::Split { children, .. } = self {
            for (index, child) in children.iter().enumerate() {
                path.push(index);
                if child.find_path_into(id, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    /// Node at `path`, or `None` if the path leaves the tree.
    #[must_use]
    pub fn resolve(&self, path: &[usize]) -> Option<&LayoutNode> {
        let mut node = self;
        for &index in path {
            node = match node {
                Self::Split { children, .. } => children.get(index)?,
                Self::Leaf { .. } => return None,
            };
        }
        Some(node)
    }

    /// Mutable node at `path`.
    pub fn resolve_mut(&mut self, path: &[usize]) -> Option<&mut LayoutNode> {
        let mut node = self;
        for &index in path {
            node = match node {
                Self::Split { children, .. } => children.get_mut(index)?,
                Self::Leaf { .. } => return None,
            };
        }
        Some(node)
    }

    /// Wrap the node at `path` in a new two-way split with `new_leaf`.
    ///
    /// Left/right produce a horizontal split, top/bottom a vertical one. The
    /// new leaf goes first for left/top. Splits always nest; a same-axis
    /// parent is never extended.
    pub fn split_at(
        &mut self,
        path: &[usize],
        side: DropSide,
        new_leaf: PaneId,
        split_id: PaneId,
    ) -> Result<(), LayoutError> {
        let axis = side.axis().ok_or(LayoutError::CenterIsNotASplit)?;
        let target = self
            .resolve_mut(path)
            .ok_or_else(|| LayoutError::PathNotFound {
                path: path.to_vec(),
            })?;
        wrap(
            target,
            split_id,
            axis,
            Self::leaf(new_leaf),
            side.inserts_before(),
        );
        Ok(())
    }

    /// Overwrite the sizes of the split at `path`.
    ///
    /// Only the length is checked here; callers normalize first.
    pub fn set_sizes(&mut self, path: &[usize], new_sizes: Vec<f64>) -> Result<(), LayoutError> {
        let node = self
            .resolve_mut(path)
            .ok_or_else(|| LayoutError::PathNotFound {
                path: path.to_vec(),
            })?;
        let Self::Split {
            id,
            children,
            sizes,
            ..
        } = node
        else {
            return Err(LayoutError::NotASplit {
                path: path.to_vec(),
            });
        };
        if new_sizes.len() != children.len() {
            return Err(LayoutError::SizesLengthMismatch {
                split_id: id.clone(),
                expected: children.len(),
                actual: new_sizes.len(),
            });
        }
        *sizes = new_sizes;
        Ok(())
    }

    /// Remove the non-root node at `path` from its parent.
    ///
    /// A parent left with one child is replaced by that child; otherwise the
    /// remaining siblings get uniform sizes.
    fn detach(&mut self, path: &[usize]) -> Result<LayoutNode, LayoutError> {
        let Some((&index, parent_path)) = path.split_last() else {
            return Err(LayoutError::PathNotFound { path: Vec::new() });
        };
        let parent = self
            .resolve_mut(parent_path)
            .ok_or_else(|| LayoutError::PathNotFound {
                path: parent_path.to_vec(),
            })?;
        let Self::Split {
            children, sizes, ..
        } = &mut *parent
        else {
            return Err(LayoutError::NotASplit {
                path: parent_path.to_vec(),
            });
        };
        if index >= children.len() {
            return Err(LayoutError::PathNotFound {
                path: path.to_vec(),
            });
        }
        let detached = children.remove(index);
        if children.len() == 1 {
            let only = children.pop();
            if let Some(only) = only {
                *parent = only;
            }
        } else {
            *sizes = uniform_sizes(children.len());
        }
        Ok(detached)
    }

    /// Move the node at `source` next to the node at `target`.
    ///
    /// The source is detached first (collapsing its parent if needed), the
    /// target is then re-found by id in the rewritten tree and wrapped in a
    /// new split. Moving a node onto itself is a no-op.
    pub fn move_node(
        &mut self,
        source: &[usize],
        target: &[usize],
        side: DropSide,
        split_id: PaneId,
    ) -> Result<MoveOutcome, LayoutError> {
        let source_id = self
            .resolve(source)
            .ok_or_else(|| LayoutError::PathNotFound {
                path: source.to_vec(),
            })?
            .id()
            .clone();
        let target_id = self
            .resolve(target)
            .ok_or_else(|| LayoutError::PathNotFound {
                path: target.to_vec(),
            })?
            .id()
            .clone();
        if source == target {
            return Ok(MoveOutcome::Unchanged);
        }
        if target.starts_with(source) {
            return Err(LayoutError::WouldCycle {
                source: source_id,
                target: target_id,
            });
        }
        let axis = side.axis().ok_or(LayoutError::CenterIsNotASplit)?;

        let moved = self.detach(source)?;
        // Detaching collapses the source's parent; when that parent was the
        // target, its sole survivor now sits at the same path.
        let target_path = self
            .find_path(target_id.as_str())
            .or_else(|| source.starts_with(target).then(|| target.to_vec()))
            .ok_or_else(|| LayoutError::PaneNotFound {
                pane_id: target_id.clone(),
            })?;
        let target_node = self
            .resolve_mut(&target_path)
            .ok_or(LayoutError::PathNotFound { path: target_path })?;
        wrap(target_node, split_id, axis, moved, side.inserts_before());
        Ok(MoveOutcome::Moved)
    }

    /// Check the structural invariants without modifying anything.
    #[must_use]
    pub fn invariant_report(&self, epsilon: f64) -> InvariantReport {
        let mut report = InvariantReport::default();
        let mut seen = BTreeSet::new();
        self.collect_issues(epsilon, &mut seen, &mut report.issues);
        report
    }

    fn collect_issues<'a>(
        &'a self,
        epsilon: f64,
        seen: &mut BTreeSet<&'a str>,
        issues: &mut Vec<InvariantIssue>,
    ) {
        let id = self.id();
        if !seen.insert(id.as_str()) {
            issues.push(InvariantIssue {
                code: InvariantCode::DuplicateId,
                node_id: id.clone(),
                repairable: false,
                message: format!("id {id} appears more than once"),
            });
        }
        let Self::Split {
            children, sizes, ..
        } = self
        else {
            return;
        };
        if children.len() < 2 {
            issues.push(InvariantIssue {
                code: InvariantCode::UnderpopulatedSplit,
                node_id: id.clone(),
                repairable: true,
                message: format!("split {id} has {} children", children.len()),
            });
        }
        if sizes.len() != children.len() {
            issues.push(InvariantIssue {
                code: InvariantCode::SizesLengthMismatch,
                node_id: id.clone(),
                repairable: true,
                message: format!(
                    "split {id} has {} children but {} sizes",
                    children.len(),
                    sizes.len()
                ),
            });
        } else if !children.is_empty() && !sizes_are_normalized(sizes, epsilon) {
            issues.push(InvariantIssue {
                code: InvariantCode::SizesNotNormalized,
                node_id: id.clone(),
                repairable: true,
                message: format!("split {id} sizes {sizes:?} do not sum to 100"),
            });
        }
        for child in children {
            child.collect_issues(epsilon, seen, issues);
        }
    }
}

fn wrap(target: &mut LayoutNode, split_id: PaneId, axis: SplitAxis, incoming: LayoutNode, before: bool) {
    let existing = std::mem::replace(target, LayoutNode::leaf(String::new()));
    let children = if before {
        vec![incoming, existing]
    } else {
        vec![existing, incoming]
    };
    *target = LayoutNode::Split {
        id: split_id,
        axis,
        children,
        sizes: vec![HALF_SHARE, HALF_SHARE],
    };
}

/// Deterministic row-major grid over `ids`.
///
/// Each row becomes a horizontal split (or a bare leaf when it holds one
/// pane) and rows stack in one vertical split. Sizes are uniform at every
/// level. No ids yields `None`; one id yields a bare leaf.
#[must_use]
pub fn build_balanced_grid(ids: &[PaneId], alloc: &mut IdAllocator) -> Option<LayoutNode> {
    match ids {
        [] => None,
        [only] => Some(LayoutNode::leaf(only.clone())),
        _ => {
            let mut rest = ids;
            let mut rows: Vec<LayoutNode> = grid_rows(ids.len())
                .into_iter()
                .map(|len| {
                    let (row, tail) = rest.split_at(len);
                    rest = tail;
                    row_node(row, alloc)
                })
                .collect();
            if rows.len() == 1 {
                rows.pop()
            } else {
                Some(LayoutNode::new_split(
                    alloc.next_split(),
                    SplitAxis::Vertical,
                    rows,
                ))
            }
        }
    }
}

fn row_node(row: &[PaneId], alloc: &mut IdAllocator) -> LayoutNode {
    match row {
        [only] => LayoutNode::leaf(only.clone()),
        _ => LayoutNode::new_split(
            alloc.next_split(),
            SplitAxis::Horizontal,
            row.iter().cloned().map(LayoutNode::leaf).collect(),
        ),
    }
}

/// Rebuild the grid with `id` appended to the existing leaves.
///
/// Manual proportions are discarded on every add. Adding an id that is
/// already present just rebalances.
#[must_use]
pub fn add_leaf(root: Option<&LayoutNode>, id: PaneId, alloc: &mut IdAllocator) -> LayoutNode {
    let mut ids = root.map(LayoutNode::collect_leaf_ids).unwrap_or_default();
    let fallback = id.clone();
    if !ids.contains(&id) {
        ids.push(id);
    }
    build_balanced_grid(&ids, alloc).unwrap_or_else(|| LayoutNode::leaf(fallback))
}

/// Result of [`prune`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pruned {
    /// Rewritten tree; `None` when nothing survived.
    pub root: Option<LayoutNode>,
    /// Leaf ids removed, in pre-order.
    pub removed: Vec<PaneId>,
    /// Splits dropped or replaced by their only surviving child.
    pub collapsed: usize,
}

/// Post-order rewrite keeping only leaves accepted by `keep`.
///
/// A split with no surviving children is dropped; with one it is replaced by
/// that child. A split that lost children gets uniform sizes; untouched
/// splits keep their proportions.
pub fn prune(root: LayoutNode, mut keep: impl FnMut(&PaneId) -> bool) -> Pruned {
    let mut removed = Vec::new();
    let mut collapsed = 0;
    let root = prune_node(root, &mut keep, &mut removed, &mut collapsed);
    Pruned {
        root,
        removed,
        collapsed,
    }
}

fn prune_node(
    node: LayoutNode,
    keep: &mut impl FnMut(&PaneId) -> bool,
    removed: &mut Vec<PaneId>,
    collapsed: &mut usize,
) -> Option<LayoutNode> {
    match node {
        LayoutNode::Leaf { id } => {
            if keep(&id) {
                Some(LayoutNode::Leaf { id })
            } else {
                removed.push(id);
                None
            }
        }
        LayoutNode::Split {
            id,
            axis,
            children,
            sizes,
        } => {
            let before = children.len();
            let mut kept: Vec<LayoutNode> = children
                .into_iter()
                .filter_map(|child| prune_node(child, keep, removed, collapsed))
                .collect();
            match kept.len() {
                0 => {
                    *collapsed += 1;
                    None
                }
                1 => {
                    *collapsed += 1;
                    kept.pop()
                }
                n => {
                    let sizes = if n == before && sizes.len() == n {
                        sizes
                    } else {
                        uniform_sizes(n)
                    };
                    Some(LayoutNode::Split {
                        id,
                        axis,
                        children: kept,
                        sizes,
                    })
                }
            }
        }
    }
}

/// Stable code for an invariant finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantCode {
    DuplicateId,
    UnderpopulatedSplit,
    SizesLengthMismatch,
    SizesNotNormalized,
}

/// One invariant finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantIssue {
    pub code: InvariantCode,
    pub node_id: PaneId,
    pub repairable: bool,
    pub message: String,
}

/// All invariant findings for one tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvariantReport {
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// True if some finding cannot be fixed by [`repair`].
    #[must_use]
    pub fn has_unrepairable_errors(&self) -> bool {
        self.issues.iter().any(|issue| !issue.repairable)
    }

    #[must_use]
    pub fn codes(&self) -> Vec<InvariantCode> {
        self.issues.iter().map(|issue| issue.code).collect()
    }
}

/// One deterministic repair step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RepairAction {
    NormalizeSizes { node_id: PaneId, before: Vec<f64> },
    CollapseSplit { node_id: PaneId },
    DropEmptySplit { node_id: PaneId },
}

/// Result of [`repair`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Repaired {
    pub root: Option<LayoutNode>,
    pub actions: Vec<RepairAction>,
}

/// Fix repairable invariant violations bottom-up.
///
/// Splits with mismatched or non-normalized sizes get uniform sizes; splits
/// with fewer than two children are collapsed or dropped. Duplicate ids are
/// left alone; check [`InvariantReport::has_unrepairable_errors`] first.
#[must_use]
pub fn repair(root: LayoutNode, epsilon: f64) -> Repaired {
    let mut actions = Vec::new();
    let root = repair_node(root, epsilon, &mut actions);
    Repaired { root, actions }
}

fn repair_node(node: LayoutNode, epsilon: f64, actions: &mut Vec<RepairAction>) -> Option<LayoutNode> {
    let (id, axis, children, sizes) = match node {
        LayoutNode::Leaf { .. } => return Some(node),
        LayoutNode::Split {
            id,
            axis,
            children,
            sizes,
        } => (id, axis, children, sizes),
    };
    let before = children.len();
    let mut children: Vec<LayoutNode> = children
        .into_iter()
        .filter_map(|child| repair_node(child, epsilon, actions))
        .collect();
    match children.len() {
        0 => {
            actions.push(RepairAction::DropEmptySplit { node_id: id });
            None
        }
        1 => {
            actions.push(RepairAction::CollapseSplit { node_id: id });
            children.pop()
        }
        n => {
            let sizes = if n == before && sizes.len() == n && sizes_are_normalized(&sizes, epsilon) {
                sizes
            } else {
                actions.push(RepairAction::NormalizeSizes {
                    node_id: id.clone(),
                    before: sizes,
                });
                uniform_sizes(n)
            };
            Some(LayoutNode::Split {
                id,
                axis,
                children,
                sizes,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn ids(names: &[&str]) -> Vec<PaneId> {
        names.iter().map(|name| PaneId::new(*name)).collect()
    }

    fn sample() -> LayoutNode {
        // split-a(h)[A, split-b(v)[B, C], D]
        LayoutNode::Split {
            id: PaneId::new("split-a"),
            axis: SplitAxis::Horizontal,
            children: vec![
                LayoutNode::leaf("A"),
                LayoutNode::Split {
                    id: PaneId::new("split-b"),
                    axis: SplitAxis::Vertical,
                    children: vec![LayoutNode::leaf("B"), LayoutNode::leaf("C")],
                    sizes: vec![70.0, 30.0],
                },
                LayoutNode::leaf("D"),
            ],
            sizes: vec![20.0, 50.0, 30.0],
        }
    }

    #[test]
    fn collect_is_pre_order() {
        assert_eq!(sample().collect_leaf_ids(), ids(&["A", "B", "C", "D"]));
        assert_eq!(sample().leaf_count(), 4);
        assert_eq!(sample().first_leaf().as_str(), "A");
    }

    #[test]
    fn find_and_resolve_are_inverse() {
        let tree = sample();
        for id in ["A", "B", "C", "D", "split-a", "split-b"] {
            let path = tree.find_path(id).expect("present");
            assert_eq!(tree.resolve(&path).map(|n| n.id().as_str()), Some(id));
        }
        assert_eq!(tree.find_path("C"), Some(vec![1, 1]));
    }

    #[test]
    fn bad_lookups_return_none() {
        let tree = sample();
        assert_eq!(tree.find_path("nope"), None);
        assert!(tree.resolve(&[7]).is_none());
        assert!(tree.resolve(&[0, 0]).is_none());
    }

    #[test]
    fn split_right_of_single_leaf() {
        let mut tree = LayoutNode::leaf("A");
        tree.split_at(&[], DropSide::Right, PaneId::new("B"), PaneId::new("split-1"))
            .unwrap();
        assert_eq!(
            tree,
            LayoutNode::Split {
                id: PaneId::new("split-1"),
                axis: SplitAxis::Horizontal,
                children: vec![LayoutNode::leaf("A"), LayoutNode::leaf("B")],
                sizes: vec![50.0, 50.0],
            }
        );
    }

    #[test]
    fn split_top_inserts_before_and_nests() {
        let mut tree = sample();
        tree.split_at(&[1, 0], DropSide::Top, PaneId::new("N"), PaneId::new("split-n"))
            .unwrap();
        let wrapped = tree.resolve(&[1, 0]).unwrap();
        let LayoutNode::Split { axis, children, .. } = wrapped else {
            panic!("expected split");
        };
        assert_eq!(*axis, SplitAxis::Vertical);
        assert_eq!(children[0].id().as_str(), "N");
        assert_eq!(children[1].id().as_str(), "B");
        // Same-axis parent is not extended.
        assert_eq!(tree.resolve(&[1]).unwrap().children().len(), 2);
    }

    #[test]
    fn split_rejects_center_and_bad_path() {
        let mut tree = sample();
        assert_eq!(
            tree.split_at(&[0], DropSide::Center, PaneId::new("X"), PaneId::new("s")),
            Err(LayoutError::CenterIsNotASplit)
        );
        assert_eq!(
            tree.split_at(&[9], DropSide::Left, PaneId::new("X"), PaneId::new("s")),
            Err(LayoutError::PathNotFound { path: vec![9] })
        );
        assert_eq!(tree, sample());
    }

    #[test]
    fn balanced_grid_of_five() {
        let mut alloc = IdAllocator::new();
        let leaves = ids(&["l0", "l1", "l2", "l3", "l4"]);
        let grid = build_balanced_grid(&leaves, &mut alloc).unwrap();
        let LayoutNode::Split {
            axis,
            children,
            sizes,
            ..
        } = &grid
        else {
            panic!("expected split");
        };
        assert_eq!(*axis, SplitAxis::Vertical);
        assert_eq!(sizes, &vec![50.0, 50.0]);
        let LayoutNode::Split {
            axis: row_axis,
            children: row0,
            sizes: row0_sizes,
            ..
        } = &children[0]
        else {
            panic!("expected row split");
        };
        assert_eq!(*row_axis, SplitAxis::Horizontal);
        assert_eq!(row0.len(), 3);
        assert!(row0_sizes.iter().all(|s| (s - 100.0 / 3.0).abs() < EPS));
        assert_eq!(children[1].children().len(), 2);
        assert_eq!(grid.collect_leaf_ids(), leaves);
    }

    #[test]
    fn balanced_grid_small_cases() {
        let mut alloc = IdAllocator::new();
        assert_eq!(build_balanced_grid(&[], &mut alloc), None);
        assert_eq!(
            build_balanced_grid(&ids(&["A"]), &mut alloc),
            Some(LayoutNode::leaf("A"))
        );
        let two = build_balanced_grid(&ids(&["A", "B"]), &mut alloc).unwrap();
        let LayoutNode::Split { axis, .. } = two else {
            panic!("expected split");
        };
        assert_eq!(axis, SplitAxis::Horizontal);
        // 3 panes: a full row of two, then a bare leaf.
        let three = build_balanced_grid(&ids(&["A", "B", "C"]), &mut alloc).unwrap();
        assert_eq!(three.children().len(), 2);
        assert!(three.children()[1].is_leaf());
    }

    #[test]
    fn add_leaf_rebalances_and_is_set_idempotent() {
        let mut alloc = IdAllocator::new();
        let tree = add_leaf(Some(&sample()), PaneId::new("E"), &mut alloc);
        assert_eq!(tree.collect_leaf_ids(), ids(&["A", "B", "C", "D", "E"]));
        let again = add_leaf(Some(&tree), PaneId::new("E"), &mut alloc);
        assert_eq!(again.collect_leaf_ids(), tree.collect_leaf_ids());
        assert_eq!(
            add_leaf(None, PaneId::new("A"), &mut alloc),
            LayoutNode::leaf("A")
        );
    }

    #[test]
    fn prune_keep_all_is_identity() {
        let out = prune(sample(), |_| true);
        assert_eq!(out.root, Some(sample()));
        assert!(out.removed.is_empty());
        assert_eq!(out.collapsed, 0);
    }

    #[test]
    fn prune_collapses_single_child_splits() {
        let out = prune(sample(), |id| id.as_str() != "C");
        let root = out.root.unwrap();
        assert_eq!(root.collect_leaf_ids(), ids(&["A", "B", "D"]));
        // split-b collapsed into B; split-a kept its three children and sizes.
        assert!(root.children()[1].is_leaf());
        let LayoutNode::Split { sizes, .. } = &root else {
            panic!("expected split");
        };
        assert_eq!(sizes, &vec![20.0, 50.0, 30.0]);
        assert_eq!(out.removed, ids(&["C"]));
        assert_eq!(out.collapsed, 1);
    }

    #[test]
    fn prune_renormalizes_splits_that_lost_children() {
        let out = prune(sample(), |id| id.as_str() != "D");
        let LayoutNode::Split { sizes, .. } = out.root.unwrap() else {
            panic!("expected split");
        };
        assert_eq!(sizes, vec![50.0, 50.0]);
    }

    #[test]
    fn prune_everything_yields_empty() {
        let out = prune(sample(), |_| false);
        assert_eq!(out.root, None);
        assert_eq!(out.removed.len(), 4);
    }

    #[test]
    fn set_sizes_checks_length_and_kind() {
        let mut tree = sample();
        tree.set_sizes(&[1], vec![40.0, 60.0]).unwrap();
        assert!(matches!(
            tree.set_sizes(&[1], vec![100.0]),
            Err(LayoutError::SizesLengthMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        assert_eq!(
            tree.set_sizes(&[0], vec![100.0]),
            Err(LayoutError::NotASplit { path: vec![0] })
        );
    }

    #[test]
    fn move_onto_self_is_noop() {
        let mut tree = sample();
        for side in DropSide::ALL {
            assert_eq!(
                tree.move_node(&[1, 0], &[1, 0], side, PaneId::new("split-x")),
                Ok(MoveOutcome::Unchanged)
            );
        }
        assert_eq!(tree, sample());
    }

    #[test]
    fn move_leaf_collapses_source_parent_and_wraps_target() {
        let mut tree = sample();
        // Move C to the left of A; split-b collapses to B.
        tree.move_node(&[1, 1], &[0], DropSide::Left, PaneId::new("split-x"))
            .unwrap();
        assert_eq!(tree.collect_leaf_ids(), ids(&["C", "A", "B", "D"]));
        let wrapped = tree.resolve(&[0]).unwrap();
        assert_eq!(wrapped.id().as_str(), "split-x");
        assert!(tree.resolve(&[1]).unwrap().is_leaf());
        assert!(tree.invariant_report(EPS).is_clean());
    }

    #[test]
    fn move_refinds_target_after_detach() {
        let mut tree = sample();
        // Detaching A shifts D from index 2 to 1 before wrapping.
        tree.move_node(&[0], &[2], DropSide::Bottom, PaneId::new("split-x"))
            .unwrap();
        assert_eq!(tree.collect_leaf_ids(), ids(&["B", "C", "D", "A"]));
        let path = tree.find_path("split-x").unwrap();
        assert_eq!(path, vec![1]);
    }

    #[test]
    fn move_beside_collapsing_parent() {
        let mut tree = sample();
        // C moves below its own parent; split-b collapses to B first.
        tree.move_node(&[1, 1], &[1], DropSide::Bottom, PaneId::new("split-x"))
            .unwrap();
        assert_eq!(tree.collect_leaf_ids(), ids(&["A", "B", "C", "D"]));
        let wrapped = tree.resolve(&[1]).unwrap();
        assert_eq!(wrapped.id().as_str(), "split-x");
        assert_eq!(wrapped.children()[0].id().as_str(), "B");
        assert!(tree.find_path("split-b").is_none());
        assert!(tree.invariant_report(EPS).is_clean());
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let mut tree = sample();
        let err = tree
            .move_node(&[1], &[1, 0], DropSide::Left, PaneId::new("split-x"))
            .unwrap_err();
        assert!(matches!(err, LayoutError::WouldCycle { .. }));
        assert_eq!(tree, sample());
    }

    #[test]
    fn report_and_repair_malformed_tree() {
        let malformed = LayoutNode::Split {
            id: PaneId::new("root"),
            axis: SplitAxis::Horizontal,
            children: vec![
                LayoutNode::Split {
                    id: PaneId::new("lonely"),
                    axis: SplitAxis::Vertical,
                    children: vec![LayoutNode::leaf("A")],
                    sizes: vec![100.0],
                },
                LayoutNode::leaf("B"),
            ],
            sizes: vec![10.0, 10.0, 10.0],
        };
        let report = malformed.invariant_report(EPS);
        assert_eq!(
            report.codes(),
            vec![
                InvariantCode::SizesLengthMismatch,
                InvariantCode::UnderpopulatedSplit
            ]
        );
        assert!(!report.has_unrepairable_errors());

        let repaired = repair(malformed, EPS);
        let root = repaired.root.unwrap();
        assert!(root.invariant_report(EPS).is_clean());
        assert_eq!(root.collect_leaf_ids(), ids(&["A", "B"]));
        assert_eq!(repaired.actions.len(), 2);
    }

    #[test]
    fn duplicate_ids_are_unrepairable() {
        let tree = LayoutNode::new_split(
            "s",
            SplitAxis::Horizontal,
            vec![LayoutNode::leaf("A"), LayoutNode::leaf("A")],
        );
        let report = tree.invariant_report(EPS);
        assert_eq!(report.codes(), vec![InvariantCode::DuplicateId]);
        assert!(report.has_unrepairable_errors());
    }

    #[test]
    fn serde_shape_is_tagged() {
        let tree = LayoutNode::new_split(
            "s",
            SplitAxis::Vertical,
            vec![LayoutNode::leaf("A"), LayoutNode::leaf("B")],
        );
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["kind"], "split");
        assert_eq!(json["axis"], "vertical");
        assert_eq!(json["children"][0]["kind"], "leaf");
        assert_eq!(json["children"][0]["id"], "A");
        let back: LayoutNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }
}
