#![forbid(unsafe_code)]

//! Error types for layout operations.
//!
//! Every failing [`Workspace`](crate::Workspace) operation leaves the store
//! untouched and reports one of these variants. [`LayoutError::class`] maps a
//! variant onto the engine's failure taxonomy so hosts can decide whether to
//! surface, log, or ignore it.

use std::fmt;

use crate::id::PaneId;
use crate::tree::TreePath;

/// Failure taxonomy for layout operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// A path or id resolves to nothing; treated as a no-op.
    Structural,
    /// An async write-back arrived after its pane was pruned.
    RaceStaleWrite,
    /// Malformed sizes, under-populated splits, or an attempted cycle.
    InvariantViolation,
    /// Rejected configuration or snapshot input.
    Config,
}

/// Errors from layout tree, registry, and tab operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The layout has no root yet.
    EmptyLayout,
    /// No node exists at `path`.
    PathNotFound { path: TreePath },
    /// No leaf with this id exists in the tree or registry.
    PaneNotFound { pane_id: PaneId },
    /// The node at `path` is a leaf where a split was required.
    NotASplit { path: TreePath },
    /// The node at `path` is a split where a leaf was required.
    NotALeaf { path: TreePath },
    /// `Center` was passed to an operation that needs an edge side.
    CenterIsNotASplit,
    /// Divider index past the end of a split's children.
    DividerOutOfRange {
        split_id: PaneId,
        index: usize,
        dividers: usize,
    },
    /// Tab index past the end of a pane's tab list.
    TabOutOfRange {
        pane_id: PaneId,
        index: usize,
        len: usize,
    },
    /// Supplied sizes do not match the split's child count.
    SizesLengthMismatch {
        split_id: PaneId,
        expected: usize,
        actual: usize,
    },
    /// Supplied sizes contain NaN, infinities, or a non-positive total.
    InvalidSizes { split_id: PaneId },
    /// Moving a node into its own subtree.
    WouldCycle { source: PaneId, target: PaneId },
    /// The id is already in use.
    DuplicateId { id: PaneId },
    /// The registry entry is not a pending reservation.
    NotPending { pane_id: PaneId },
}

impl LayoutError {
    /// Taxonomy class for this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyLayout
            | Self::PathNotFound { .. }
            | Self::PaneNotFound { .. }
            | Self::NotASplit { .. }
            | Self::NotALeaf { .. }
            | Self::CenterIsNotASplit
            | Self::DividerOutOfRange { .. }
            | Self::TabOutOfRange { .. } => ErrorClass::Structural,
            Self::NotPending { .. } => ErrorClass::RaceStaleWrite,
            Self::SizesLengthMismatch { .. }
            | Self::InvalidSizes { .. }
            | Self::WouldCycle { .. }
            | Self::DuplicateId { .. } => ErrorClass::InvariantViolation,
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLayout => write!(f, "layout has no panes"),
            Self::PathNotFound { path } => write!(f, "no node at path {path:?}"),
            Self::PaneNotFound { pane_id } => write!(f, "pane {pane_id} not found"),
            Self::NotASplit { path } => write!(f, "node at path {path:?} is not a split"),
            Self::NotALeaf { path } => write!(f, "node at path {path:?} is not a leaf"),
            Self::CenterIsNotASplit => write!(f, "center drop side cannot split a pane"),
            Self::DividerOutOfRange {
                split_id,
                index,
                dividers,
            } => write!(
                f,
                "divider {index} out of range for split {split_id} ({dividers} dividers)"
            ),
            Self::TabOutOfRange {
                pane_id,
                index,
                len,
            } => write!(f, "tab {index} out of range for pane {pane_id} ({len} tabs)"),
            Self::SizesLengthMismatch {
                split_id,
                expected,
                actual,
            } => write!(
                f,
                "split {split_id} has {expected} children but {actual} sizes were given"
            ),
            Self::InvalidSizes { split_id } => {
                write!(f, "split {split_id} sizes must be finite with a positive total")
            }
            Self::WouldCycle { source, target } => {
                write!(f, "cannot move {source} into its own subtree at {target}")
            }
            Self::DuplicateId { id } => write!(f, "id {id} is already in use"),
            Self::NotPending { pane_id } => {
                write!(f, "pane {pane_id} is not a pending reservation")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Errors loading or validating [`EngineConfig`](crate::EngineConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl ConfigError {
    /// Taxonomy class; always [`ErrorClass::Config`].
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_taxonomy() {
        assert_eq!(
            LayoutError::PathNotFound { path: vec![0, 3] }.class(),
            ErrorClass::Structural
        );
        assert_eq!(
            LayoutError::NotPending {
                pane_id: PaneId::new("pane-1")
            }
            .class(),
            ErrorClass::RaceStaleWrite
        );
        assert_eq!(
            LayoutError::WouldCycle {
                source: PaneId::new("split-1"),
                target: PaneId::new("pane-2"),
            }
            .class(),
            ErrorClass::InvariantViolation
        );
        assert_eq!(
            ConfigError::Validation(vec!["bad".into()]).class(),
            ErrorClass::Config
        );
    }

    #[test]
    fn display_names_the_pane() {
        let err = LayoutError::TabOutOfRange {
            pane_id: PaneId::new("pane-4"),
            index: 3,
            len: 2,
        };
        assert_eq!(err.to_string(), "tab 3 out of range for pane pane-4 (2 tabs)");
    }

    #[test]
    fn validation_errors_join() {
        let err = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation errors: a; b");
        assert!(std::error::Error::source(&err).is_none());
    }
}
