//! Usage: Infrastructure adapters (filesystem paths, persisted settings, network probes).

pub(crate) mod app_paths;
pub(crate) mod probe;
pub(crate) mod settings;
