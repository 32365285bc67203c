//! # mydocs-client
//!
//! The layer the screens call into. It keeps the in-memory working set of
//! documents, applies the form rules from `mydocs-shared`, and persists
//! through a [`mydocs_store::LocalStore`] after every change.
//!
//! Commands are plain functions over a [`state::SharedState`] and report
//! failures as display strings.

pub mod commands;
pub mod config;
pub mod state;

use std::sync::{Arc, Mutex};

use mydocs_store::LocalStore;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ClientConfig;
use crate::state::{AppState, SharedState};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter; calling this twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mydocs_client=debug,mydocs_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Open the store described by `config` and load the working set.
pub fn open(config: &ClientConfig) -> Result<SharedState, String> {
    let store_config = config
        .store_config()
        .map_err(|e| format!("Failed to resolve data directory: {e}"))?;
    let store = LocalStore::open(store_config).map_err(|e| format!("Failed to open store: {e}"))?;

    let state = AppState::open(store);
    tracing::info!(
        root = %state.store.root().display(),
        documents = state.documents.len(),
        "my-documents client ready"
    );

    Ok(Arc::new(Mutex::new(state)))
}
