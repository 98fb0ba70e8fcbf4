//! Usage: Tauri command handlers grouped by feature area.

pub(crate) mod app;
pub(crate) mod backend;
pub(crate) mod settings;

pub(crate) use app::*;
pub(crate) use backend::*;
pub(crate) use settings::*;
