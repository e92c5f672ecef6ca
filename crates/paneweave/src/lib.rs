#![forbid(unsafe_code)]

//! paneweave public facade.
//!
//! Re-exports the layout engine and its geometry primitives behind one
//! crate, with a unified [`Error`] and a prelude for hosts.
//!
//! ```
//! use paneweave::prelude::*;
//!
//! let mut ws = Workspace::new(EngineConfig::default());
//! let chat = ws.add_pane(ContentType::Chat, Some("conv-1".into()));
//! assert!(chat.hydration.is_some());
//!
//! let layout = ws.layout(Rect::from_size(800.0, 600.0)).unwrap();
//! assert_eq!(layout.leaves().count(), 1);
//! # Ok::<(), paneweave::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use paneweave_core::{
    DropSide, GestureEnd, GestureId, ListenerGuard, Point, Rect, SplitAxis, classify_drop_side,
};

// --- Layout re-exports -----------------------------------------------------

pub use paneweave_layout::{
    ContentDescriptor, ContentState, ContentType, DragCoordinator, DragItem, DropOutcome,
    DropTarget, EngineConfig, ErrorClass, ExternalItem, ExternalKind, HydrationInbox,
    HydrationOutcome, HydrationRequest, HydrationResult, HydrationSender, HydrationState,
    HydrationTicket, LayoutNode, PaneId, PaneInfo, PaneLayout, Placement, RenderTable,
    ResizeGesture, TabId, TreePath, Workspace, WorkspaceSnapshot,
};
pub use paneweave_layout::{ConfigError, LayoutError, SnapshotError};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for paneweave hosts.
#[derive(Debug)]
pub enum Error {
    /// A layout operation was rejected.
    Layout(LayoutError),
    /// Configuration could not be loaded or validated.
    Config(ConfigError),
    /// A snapshot could not be parsed or restored.
    Snapshot(SnapshotError),
}

impl Error {
    /// Taxonomy class of the underlying error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Layout(err) => err.class(),
            Self::Config(err) => err.class(),
            Self::Snapshot(SnapshotError::Unrepairable { .. }) => ErrorClass::InvariantViolation,
            Self::Snapshot(_) => ErrorClass::Structural,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SnapshotError> for Error {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

/// Standard result type for paneweave APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    //! Common imports for hosts.

    pub use crate::{
        ContentType, DragCoordinator, DropSide, DropTarget, EngineConfig, Error, ExternalItem,
        ExternalKind, HydrationInbox, HydrationResult, ListenerGuard, Placement, Point, Rect,
        ResizeGesture, Result, Workspace,
    };

    pub use crate::{core, layout};
}

pub use paneweave_core as core;
pub use paneweave_layout as layout;
