//! Usage: Application layer (Tauri-managed state, logging, startup and exit wiring).

pub(crate) mod app_state;
pub(crate) mod cleanup;
pub(crate) mod launch;
pub(crate) mod logging;
pub(crate) mod startup;
