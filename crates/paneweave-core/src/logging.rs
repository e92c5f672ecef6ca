#![forbid(unsafe_code)]

//! Logging targets and optional subscriber bootstrap.
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! host's call. With the `subscriber` feature enabled, [`init`] installs a
//! `fmt` subscriber filtered by the `PANEWEAVE_LOG` environment variable
//! (falling back to `info`). The `tracing-json` feature adds [`init_json`]
//! for line-delimited JSON output.

pub use tracing::{Level, debug, debug_span, info, trace, warn};

/// Environment variable consulted for the log filter directive.
pub const LOG_ENV: &str = "PANEWEAVE_LOG";

/// Filter directive used when [`LOG_ENV`] is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Event targets used across the workspace.
pub mod targets {
    /// Tree mutations (split, add, move, resize commit).
    pub const LAYOUT: &str = "paneweave.layout";
    /// Synchronizer passes.
    pub const SYNC: &str = "paneweave.sync";
    /// Drag/drop coordination.
    pub const DND: &str = "paneweave.dnd";
    /// Divider resize gestures.
    pub const RESIZE: &str = "paneweave.resize";
    /// Tab multiplexing.
    pub const TABS: &str = "paneweave.tabs";
    /// Async hydration write-backs.
    pub const HYDRATE: &str = "paneweave.hydrate";
    /// Listener guards.
    pub const GESTURE: &str = "paneweave.gesture";
}

#[cfg(feature = "subscriber")]
fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a human-readable global subscriber.
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "subscriber")]
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
}

/// Install a JSON global subscriber.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(true)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_share_prefix() {
        for target in [
            targets::LAYOUT,
            targets::SYNC,
            targets::DND,
            targets::RESIZE,
            targets::TABS,
            targets::HYDRATE,
            targets::GESTURE,
        ] {
            assert!(target.starts_with("paneweave."), "{target}");
        }
    }
}
