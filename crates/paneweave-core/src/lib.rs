#![forbid(unsafe_code)]

//! Core primitives for the paneweave layout engine.
//!
//! This crate knows nothing about layout trees or content. It provides the
//! geometry used for drop-zone detection and layout solving, the balanced
//! grid partition math, RAII guards for pointer-gesture listeners, and the
//! logging targets shared by the rest of the workspace.

pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod logging;

pub use geometry::{DropSide, Point, Rect, SplitAxis, classify_drop_side};
pub use gesture::{GestureEnd, GestureId, ListenerGuard};
pub use grid::{FULL_SHARE, GridShape, grid_rows, grid_shape, uniform_sizes};
