#![forbid(unsafe_code)]

//! Split/tab pane layout engine.
//!
//! A [`Workspace`] owns a recursive [`LayoutNode`] tree and a [`Registry`]
//! mapping each leaf to its content. Every public mutation goes through the
//! workspace, validates first, and ends with a synchronizer pass, so after
//! any call the typed registry keys equal the tree's leaf set.
//!
//! Pointer gestures live in [`DragCoordinator`] and [`ResizeGesture`]; both
//! resolve against a [`PaneLayout`] from [`Workspace::layout`] and hold a
//! listener guard for the gesture's lifetime.
//!
//! ```
//! use paneweave_core::DropSide;
//! use paneweave_layout::{ContentType, Workspace};
//!
//! let mut ws = Workspace::default();
//! let a = ws.add_pane(ContentType::Terminal, Some("terminal-1".into()));
//! let b = ws.split(&[], DropSide::Right, ContentType::Editor, Some("notes.md".into()))?;
//! assert_eq!(ws.leaf_ids(), vec![a.pane_id, b.pane_id]);
//! # Ok::<(), paneweave_layout::LayoutError>(())
//! ```

pub mod config;
pub mod dnd;
pub mod error;
pub mod hydrate;
pub mod id;
pub mod layout;
pub mod registry;
pub mod render;
pub mod resize;
pub mod snapshot;
pub mod sync;
pub mod tabs;
pub mod tree;
pub mod workspace;

pub use config::EngineConfig;
pub use dnd::{
    DragCoordinator, DragDescriptor, DragItem, DropNoopReason, DropOutcome, DropTarget,
    ExternalItem, ExternalKind,
};
pub use error::{ConfigError, ErrorClass, LayoutError};
pub use hydrate::{
    HydrationInbox, HydrationKind, HydrationOutcome, HydrationRequest, HydrationResult,
    HydrationSender, HydrationTicket,
};
pub use id::{IdAllocator, PaneId, TabId};
pub use layout::{Divider, LeafHit, PaneLayout, solve_layout};
pub use registry::{
    ContentDescriptor, ContentState, ContentType, HydrationState, Registry, RegistryEntry,
    TabDescriptor,
};
pub use render::{RenderFn, RenderTable};
pub use resize::{ResizeGesture, clamp_delta, normalize_with_floor};
pub use snapshot::{Restored, SnapshotError, WORKSPACE_SNAPSHOT_SCHEMA_VERSION, WorkspaceSnapshot};
pub use sync::{SyncReport, synchronize};
pub use tabs::{TabCloseOutcome, TabRangeError, TabSeed};
pub use tree::{
    InvariantCode, InvariantIssue, InvariantReport, LayoutNode, MoveOutcome, Pruned, RepairAction,
    Repaired, TreePath, add_leaf, build_balanced_grid, prune, repair,
};
pub use workspace::{Merged, PaneInfo, Placement, Spawned, TabAdded, Workspace};
