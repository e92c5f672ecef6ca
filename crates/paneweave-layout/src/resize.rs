#![forbid(unsafe_code)]

//! Interactive divider resizing.
//!
//! A [`ResizeGesture`] starts on pointer-down over the divider between
//! children `i` and `i + 1` of a split. Pointer moves only update a
//! gesture-local preview; the tree is written once, on
//! [`ResizeGesture::commit`]. [`ResizeGesture::cancel`] hands back the
//! starting sizes and writes nothing.
//!
//! The gesture owns the [`ListenerGuard`] for its move/up/cancel
//! listeners. Commit and cancel finish it explicitly; dropping an unfinished
//! gesture releases it as abandoned.

use paneweave_core::grid::{FULL_SHARE, uniform_sizes};
use paneweave_core::logging::targets;
use paneweave_core::{GestureEnd, ListenerGuard, Point, Rect, SplitAxis};
use tracing::{debug, trace};

use crate::error::LayoutError;
use crate::id::PaneId;
use crate::layout::Divider;
use crate::tree::{LayoutNode, TreePath};
use crate::workspace::Workspace;

/// Clamp a divider move so neither neighbour drops below `floor`.
///
/// `delta` is in share units (of 100) and is added to `sizes[index]` and
/// subtracted from `sizes[index + 1]`. Non-finite deltas and out-of-range
/// indices yield zero.
#[must_use]
pub fn clamp_delta(sizes: &[f64], index: usize, delta: f64, floor: f64) -> f64 {
    let (Some(&before), Some(&after)) = (sizes.get(index), sizes.get(index + 1)) else {
        return 0.0;
    };
    if !delta.is_finite() {
        return 0.0;
    }
    let min = -(before - floor).max(0.0);
    let max = (after - floor).max(0.0);
    delta.clamp(min, max)
}

/// Rescale `sizes` to sum to 100 with every entry at least `floor`.
///
/// Entries below the floor are pinned to it and the rest share what is
/// left in proportion. Non-finite or negative entries count as zero. If
/// the floor cannot be honoured for every entry, or nothing positive
/// remains, the result is uniform.
#[must_use]
pub fn normalize_with_floor(sizes: &[f64], floor: f64) -> Vec<f64> {
    let n = sizes.len();
    if n == 0 {
        return Vec::new();
    }
    let clean: Vec<f64> = sizes
        .iter()
        .map(|size| if size.is_finite() && *size > 0.0 { *size } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    let floor = if floor.is_finite() { floor.max(0.0) } else { 0.0 };
    if total <= 0.0 || floor * n as f64 >= FULL_SHARE {
        return uniform_sizes(n);
    }

    let scale = FULL_SHARE / total;
    let mut out: Vec<f64> = clean.iter().map(|size| size * scale).collect();
    let mut pinned = vec![false; n];
    loop {
        let mut changed = false;
        for (value, pin) in out.iter().zip(pinned.iter_mut()) {
            if !*pin && *value < floor {
                *pin = true;
                changed = true;
            }
        }
        if !changed {
            return out;
        }
        let pinned_count = pinned.iter().filter(|pin| **pin).count();
        let remaining = FULL_SHARE - floor * pinned_count as f64;
        let free_total: f64 = out
            .iter()
            .zip(&pinned)
            .filter(|(_, pin)| !**pin)
            .map(|(value, _)| *value)
            .sum();
        if free_total <= 0.0 {
            return uniform_sizes(n);
        }
        let scale = remaining / free_total;
        for (value, pin) in out.iter_mut().zip(&pinned) {
            *value = if *pin { floor } else { *value * scale };
        }
    }
}

/// One in-flight divider drag.
#[derive(Debug)]
pub struct ResizeGesture {
    split_id: PaneId,
    split_path: TreePath,
    index: usize,
    axis: SplitAxis,
    extent: f64,
    start_pointer: f64,
    floor: f64,
    start_sizes: Vec<f64>,
    preview: Vec<f64>,
    guard: ListenerGuard,
}

impl ResizeGesture {
    /// Start dragging divider `divider_index` of the split at `split_path`.
    ///
    /// `container` is the split's on-screen area; its extent along the
    /// split axis converts pointer travel into share units.
    pub fn begin(
        workspace: &Workspace,
        split_path: &[usize],
        divider_index: usize,
        container: Rect,
        pointer: Point,
        guard: ListenerGuard,
    ) -> Result<Self, LayoutError> {
        let root = workspace.root().ok_or(LayoutError::EmptyLayout)?;
        let node = root
            .resolve(split_path)
            .ok_or_else(|| LayoutError::PathNotFound {
                path: split_path.to_vec(),
            })?;
        let LayoutNode::Split {
            id,
            axis,
            children,
            sizes,
        } = node
        else {
            return Err(LayoutError::NotASplit {
                path: split_path.to_vec(),
            });
        };
        if divider_index + 1 >= children.len() {
            return Err(LayoutError::DividerOutOfRange {
                split_id: id.clone(),
                index: divider_index,
                dividers: children.len().saturating_sub(1),
            });
        }
        debug!(
            target: targets::RESIZE,
            split_id = %id,
            divider = divider_index,
            gesture = %guard.id(),
            "resize gesture started"
        );
        Ok(Self {
            split_id: id.clone(),
            split_path: split_path.to_vec(),
            index: divider_index,
            axis: *axis,
            extent: container.extent(*axis),
            start_pointer: pointer.along(*axis),
            floor: workspace.config().resize_floor,
            start_sizes: sizes.clone(),
            preview: sizes.clone(),
            guard,
        })
    }

    /// Start from a divider returned by [`crate::PaneLayout::hit_divider`].
    pub fn begin_from_divider(
        workspace: &Workspace,
        divider: &Divider,
        pointer: Point,
        guard: ListenerGuard,
    ) -> Result<Self, LayoutError> {
        Self::begin(
            workspace,
            &divider.split_path,
            divider.index,
            divider.container,
            pointer,
            guard,
        )
    }

    #[must_use]
    pub fn split_id(&self) -> &PaneId {
        &self.split_id
    }

    #[must_use]
    pub fn split_path(&self) -> &[usize] {
        &self.split_path
    }

    #[must_use]
    pub fn start_sizes(&self) -> &[f64] {
        &self.start_sizes
    }

    /// Current transient sizes.
    #[must_use]
    pub fn preview(&self) -> &[f64] {
        &self.preview
    }

    /// Recompute the preview for a new pointer position.
    pub fn update(&mut self, pointer: Point) -> &[f64] {
        if self.extent <= 0.0 {
            return &self.preview;
        }
        let raw = (pointer.along(self.axis) - self.start_pointer) / self.extent * FULL_SHARE;
        let delta = clamp_delta(&self.start_sizes, self.index, raw, self.floor);
        self.preview.clone_from(&self.start_sizes);
        if let Some(size) = self.preview.get_mut(self.index) {
            *size += delta;
        }
        if let Some(size) = self.preview.get_mut(self.index + 1) {
            *size -= delta;
        }
        trace!(
            target: targets::RESIZE,
            split_id = %self.split_id,
            delta,
            "resize preview"
        );
        &self.preview
    }

    /// Write the preview into the tree in one mutation.
    ///
    /// The split is looked up by id, so the commit still lands if other
    /// mutations moved it meanwhile. Returns the sizes stored.
    pub fn commit(self, workspace: &mut Workspace) -> Result<Vec<f64>, LayoutError> {
        let Self {
            split_id,
            preview,
            guard,
            ..
        } = self;
        let result = workspace.resize_split(split_id.as_str(), &preview);
        let end = if result.is_ok() {
            GestureEnd::Committed
        } else {
            GestureEnd::Canceled
        };
        guard.finish(end);
        result
    }

    /// Abort and return the starting sizes. The tree is not touched.
    pub fn cancel(self) -> Vec<f64> {
        let Self {
            split_id,
            start_sizes,
            guard,
            ..
        } = self;
        debug!(target: targets::RESIZE, split_id = %split_id, "resize gesture cancelled");
        guard.finish(GestureEnd::Canceled);
        start_sizes
    }
}
