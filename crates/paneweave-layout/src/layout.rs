#![forbid(unsafe_code)]

//! Layout solving and pointer hit testing.
//!
//! [`solve_layout`] turns a tree and a window area into concrete rectangles
//! for every node plus one divider handle between each pair of adjacent
//! split children. The drag/drop coordinator uses [`PaneLayout::hit_leaf`]
//! to resolve drop targets, and the resize controller takes container
//! extents and divider positions from here.

use rustc_hash::FxHashMap;

use paneweave_core::{DropSide, Point, Rect, SplitAxis, classify_drop_side};

use crate::id::PaneId;
use crate::tree::{LayoutNode, TreePath};

/// Grab handle between children `index` and `index + 1` of a split.
#[derive(Debug, Clone, PartialEq)]
pub struct Divider {
    pub split_id: PaneId,
    pub split_path: TreePath,
    pub index: usize,
    pub axis: SplitAxis,
    /// Position along the split axis.
    pub position: f64,
    /// Area of the owning split.
    pub container: Rect,
}

impl Divider {
    /// Distance from `point` to the handle, or `None` if the point lies
    /// outside the split's cross-axis span.
    #[must_use]
    pub fn distance(&self, point: Point) -> Option<f64> {
        let (along, cross, cross_start, cross_len) = match self.axis {
            SplitAxis::Horizontal => (
                point.x,
                point.y,
                self.container.y,
                self.container.height,
            ),
            SplitAxis::Vertical => (point.y, point.x, self.container.x, self.container.width),
        };
        (cross >= cross_start && cross < cross_start + cross_len)
            .then(|| (along - self.position).abs())
    }
}

/// A leaf hit by the pointer and the drop region under it.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafHit {
    pub pane_id: PaneId,
    pub path: TreePath,
    pub side: DropSide,
}

/// Concrete geometry for one solved tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaneLayout {
    pub area: Rect,
    rects: FxHashMap<PaneId, Rect>,
    paths: FxHashMap<PaneId, TreePath>,
    leaves: Vec<PaneId>,
    dividers: Vec<Divider>,
}

impl PaneLayout {
    /// Rectangle for a node.
    #[must_use]
    pub fn rect(&self, node_id: &str) -> Option<Rect> {
        self.rects.get(node_id).copied()
    }

    /// Tree path recorded for a node.
    #[must_use]
    pub fn path(&self, node_id: &str) -> Option<&TreePath> {
        self.paths.get(node_id)
    }

    /// Leaf rectangles in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = (&PaneId, Rect)> + '_ {
        self.leaves
            .iter()
            .filter_map(|id| self.rects.get(id).map(|rect| (id, *rect)))
    }

    #[must_use]
    pub fn dividers(&self) -> &[Divider] {
        &self.dividers
    }

    /// Leaf under `point` and the drop side it resolves to.
    #[must_use]
    pub fn hit_leaf(&self, point: Point, edge_band: f64) -> Option<LeafHit> {
        self.leaves().find_map(|(id, rect)| {
            let side = classify_drop_side(rect, point, edge_band)?;
            Some(LeafHit {
                pane_id: id.clone(),
                path: self.paths.get(id)?.clone(),
                side,
            })
        })
    }

    /// Closest divider within `tolerance` of `point`.
    ///
    /// On ties the later (deeper) divider wins.
    #[must_use]
    pub fn hit_divider(&self, point: Point, tolerance: f64) -> Option<&Divider> {
        self.dividers
            .iter()
            .filter_map(|divider| {
                let distance = divider.distance(point)?;
                (distance <= tolerance).then_some((divider, distance))
            })
            .fold(None, |best: Option<(&Divider, f64)>, (divider, distance)| match best {
                Some((_, best_distance)) if best_distance < distance => best,
                _ => Some((divider, distance)),
            })
            .map(|(divider, _)| divider)
    }
}

/// Solve rectangles for `root` inside `area`.
#[must_use]
pub fn solve_layout(root: &LayoutNode, area: Rect) -> PaneLayout {
    let mut layout = PaneLayout {
        area,
        ..PaneLayout::default()
    };
    let mut path = Vec::new();
    solve_node(root, area, &mut path, &mut layout);
    layout
}

fn solve_node(node: &LayoutNode, area: Rect, path: &mut TreePath, layout: &mut PaneLayout) {
    let _ = layout.rects.insert(node.id().clone(), area);
    let _ = layout.paths.insert(node.id().clone(), path.clone());

    let LayoutNode::Split {
        id,
        axis,
        children,
        sizes,
    } = node
    else {
        layout.leaves.push(node.id().clone());
        return;
    };

    let shares: Vec<f64> = (0..children.len())
        .map(|index| sizes.get(index).copied().unwrap_or(0.0))
        .collect();
    let child_rects = area.split_along(*axis, &shares);

    for (index, (child, rect)) in children.iter().zip(&child_rects).enumerate() {
        if index > 0 {
            let position = match axis {
                SplitAxis::Horizontal => rect.x,
                SplitAxis::Vertical => rect.y,
            };
            layout.dividers.push(Divider {
                split_id: id.clone(),
                split_path: path.clone(),
                index: index - 1,
                axis: *axis,
                position,
                container: area,
            });
        }
        path.push(index);
        solve_node(child, *rect, path, layout);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> LayoutNode {
        // split-a(h, 25/75)[A, split-b(v)[B, C]]
        LayoutNode::Split {
            id: PaneId::new("split-a"),
            axis: SplitAxis::Horizontal,
            children: vec![
                LayoutNode::leaf("A"),
                LayoutNode::new_split(
                    "split-b",
                    SplitAxis::Vertical,
                    vec![LayoutNode::leaf("B"), LayoutNode::leaf("C")],
                ),
            ],
            sizes: vec![25.0, 75.0],
        }
    }

    #[test]
    fn rects_follow_sizes() {
        let layout = solve_layout(&tree(), Rect::from_size(400.0, 200.0));
        assert_eq!(layout.rect("A"), Some(Rect::new(0.0, 0.0, 100.0, 200.0)));
        assert_eq!(layout.rect("B"), Some(Rect::new(100.0, 0.0, 300.0, 100.0)));
        assert_eq!(layout.rect("C"), Some(Rect::new(100.0, 100.0, 300.0, 100.0)));
        assert_eq!(layout.path("C"), Some(&vec![1, 1]));
        let order: Vec<_> = layout.leaves().map(|(id, _)| id.as_str().to_owned()).collect();
        assert_eq!(order, ["A", "B", "C"]);
    }

    #[test]
    fn dividers_sit_between_children() {
        let layout = solve_layout(&tree(), Rect::from_size(400.0, 200.0));
        let dividers = layout.dividers();
        assert_eq!(dividers.len(), 2);
        assert_eq!(dividers[0].split_id.as_str(), "split-a");
        assert_eq!(dividers[0].position, 100.0);
        assert_eq!(dividers[1].split_path, vec![1]);
        assert_eq!(dividers[1].position, 100.0);
        assert_eq!(dividers[1].axis, SplitAxis::Vertical);
    }

    #[test]
    fn hit_divider_respects_tolerance_and_span() {
        let layout = solve_layout(&tree(), Rect::from_size(400.0, 200.0));
        let vertical = layout.hit_divider(Point::new(102.0, 40.0), 3.0).unwrap();
        assert_eq!(vertical.split_id.as_str(), "split-a");
        let horizontal = layout.hit_divider(Point::new(250.0, 99.0), 3.0).unwrap();
        assert_eq!(horizontal.split_id.as_str(), "split-b");
        assert!(layout.hit_divider(Point::new(250.0, 40.0), 3.0).is_none());
        // The split-b handle does not extend over A.
        assert!(layout.hit_divider(Point::new(50.0, 100.0), 3.0).is_none());
    }

    #[test]
    fn hit_leaf_resolves_side() {
        let layout = solve_layout(&tree(), Rect::from_size(400.0, 200.0));
        let hit = layout.hit_leaf(Point::new(50.0, 100.0), 0.25).unwrap();
        assert_eq!(hit.pane_id.as_str(), "A");
        assert_eq!(hit.side, DropSide::Center);
        let hit = layout.hit_leaf(Point::new(390.0, 150.0), 0.25).unwrap();
        assert_eq!(hit.pane_id.as_str(), "C");
        assert_eq!(hit.path, vec![1, 1]);
        assert_eq!(hit.side, DropSide::Right);
        assert!(layout.hit_leaf(Point::new(500.0, 10.0), 0.25).is_none());
    }

    #[test]
    fn single_leaf_fills_area() {
        let layout = solve_layout(&LayoutNode::leaf("A"), Rect::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(layout.rect("A"), Some(Rect::new(10.0, 10.0, 50.0, 50.0)));
        assert!(layout.dividers().is_empty());
    }
}
