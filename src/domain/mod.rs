//! Usage: Pure domain logic (no Tauri handles, no IO).

pub(crate) mod launch_plan;
