//! Usage: Persisted application settings (schema + read/write helpers).
//!
//! Stored as `settings.json` under the app dot-dir. Reads repair what they
//! can (missing fields, out-of-range tuning); writes reject invalid input.

use crate::app_paths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SCHEMA_VERSION: u32 = 2;
const SCHEMA_VERSION_ADD_LAUNCH_TUNING: u32 = 2;

pub const DEFAULT_BACKEND_PORT: u16 = 8501;
pub const DEFAULT_READY_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_READY_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_HANDOFF_DELAY_MS: u64 = 250;
const MAX_READY_MAX_ATTEMPTS: u32 = 600;
const MIN_READY_POLL_INTERVAL_MS: u64 = 50;
const MAX_READY_POLL_INTERVAL_MS: u64 = 10_000;
const MAX_HANDOFF_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub schema_version: u32,
    pub backend_port: u16,
    // Absolute path to the analysis service executable; empty = bundled
    // binary next to the app executable.
    pub backend_program: String,
    pub ready_max_attempts: u32,
    pub ready_poll_interval_ms: u64,
    pub handoff_delay_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            backend_port: DEFAULT_BACKEND_PORT,
            backend_program: String::new(),
            ready_max_attempts: DEFAULT_READY_MAX_ATTEMPTS,
            ready_poll_interval_ms: DEFAULT_READY_POLL_INTERVAL_MS,
            handoff_delay_ms: DEFAULT_HANDOFF_DELAY_MS,
        }
    }
}

fn sanitize_launch_tuning(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    if settings.ready_max_attempts == 0 {
        settings.ready_max_attempts = DEFAULT_READY_MAX_ATTEMPTS;
        changed = true;
    }
    if settings.ready_max_attempts > MAX_READY_MAX_ATTEMPTS {
        settings.ready_max_attempts = MAX_READY_MAX_ATTEMPTS;
        changed = true;
    }

    if settings.ready_poll_interval_ms < MIN_READY_POLL_INTERVAL_MS {
        settings.ready_poll_interval_ms = MIN_READY_POLL_INTERVAL_MS;
        changed = true;
    }
    if settings.ready_poll_interval_ms > MAX_READY_POLL_INTERVAL_MS {
        settings.ready_poll_interval_ms = MAX_READY_POLL_INTERVAL_MS;
        changed = true;
    }

    if settings.handoff_delay_ms > MAX_HANDOFF_DELAY_MS {
        settings.handoff_delay_ms = MAX_HANDOFF_DELAY_MS;
        changed = true;
    }

    changed
}

fn migrate_add_launch_tuning(settings: &mut AppSettings, schema_version_present: bool) -> bool {
    // v2: Add readiness/handoff tuning fields (defaults match the previous
    // hard-coded launch behavior).
    if schema_version_present && settings.schema_version >= SCHEMA_VERSION_ADD_LAUNCH_TUNING {
        return false;
    }

    let mut changed = false;

    // If schema_version is missing, force a write to persist it so we don't
    // keep "migrating" on every startup.
    if !schema_version_present {
        changed = true;
    }

    if settings.schema_version != SCHEMA_VERSION_ADD_LAUNCH_TUNING {
        settings.schema_version = SCHEMA_VERSION_ADD_LAUNCH_TUNING;
        changed = true;
    }

    changed
}

fn validate_for_write(settings: &AppSettings) -> Result<(), String> {
    if settings.backend_port < 1024 {
        return Err("backend_port must be between 1024 and 65535".to_string());
    }
    if settings.ready_max_attempts == 0 {
        return Err("ready_max_attempts must be >= 1".to_string());
    }
    if settings.ready_max_attempts > MAX_READY_MAX_ATTEMPTS {
        return Err(format!(
            "ready_max_attempts must be <= {MAX_READY_MAX_ATTEMPTS}"
        ));
    }
    if settings.ready_poll_interval_ms < MIN_READY_POLL_INTERVAL_MS {
        return Err(format!(
            "ready_poll_interval_ms must be >= {MIN_READY_POLL_INTERVAL_MS}"
        ));
    }
    if settings.ready_poll_interval_ms > MAX_READY_POLL_INTERVAL_MS {
        return Err(format!(
            "ready_poll_interval_ms must be <= {MAX_READY_POLL_INTERVAL_MS}"
        ));
    }
    if settings.handoff_delay_ms > MAX_HANDOFF_DELAY_MS {
        return Err(format!("handoff_delay_ms must be <= {MAX_HANDOFF_DELAY_MS}"));
    }
    Ok(())
}

fn settings_path(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    Ok(app_paths::app_data_dir(app)?.join("settings.json"))
}

fn parse_settings_json(content: &str) -> Result<(AppSettings, bool), String> {
    let raw: serde_json::Value =
        serde_json::from_str(content).map_err(|e| format!("failed to parse settings.json: {e}"))?;
    let schema_version_present = raw.get("schema_version").is_some();
    let settings: AppSettings =
        serde_json::from_value(raw).map_err(|e| format!("failed to parse settings.json: {e}"))?;
    Ok((settings, schema_version_present))
}

pub fn read(app: &tauri::AppHandle) -> Result<AppSettings, String> {
    let path = settings_path(app)?;

    if !path.exists() {
        let settings = AppSettings::default();
        // Best-effort: create settings.json on first read so the config is
        // discoverable and editable.
        let _ = write(app, &settings);
        return Ok(settings);
    }

    let content =
        std::fs::read_to_string(&path).map_err(|e| format!("failed to read settings: {e}"))?;
    let (mut settings, schema_version_present) = parse_settings_json(&content)?;

    if settings.backend_port < 1024 {
        return Err(
            "invalid settings.json: backend_port must be between 1024 and 65535".to_string(),
        );
    }

    let mut repaired = false;
    repaired |= migrate_add_launch_tuning(&mut settings, schema_version_present);
    repaired |= sanitize_launch_tuning(&mut settings);
    if repaired {
        // Best-effort: persist repaired values while keeping read semantics.
        let _ = write(app, &settings);
    }

    Ok(settings)
}

pub fn write(app: &tauri::AppHandle, settings: &AppSettings) -> Result<AppSettings, String> {
    validate_for_write(settings)?;

    let path = settings_path(app)?;
    let tmp_path = path.with_file_name("settings.json.tmp");
    let backup_path = path.with_file_name("settings.json.bak");

    let content = serde_json::to_vec_pretty(settings)
        .map_err(|e| format!("failed to serialize settings: {e}"))?;

    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("failed to write temp settings file: {e}"))?;

    if backup_path.exists() {
        let _ = std::fs::remove_file(&backup_path);
    }

    if path.exists() {
        std::fs::rename(&path, &backup_path)
            .map_err(|e| format!("failed to create settings backup: {e}"))?;
    }

    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::rename(&backup_path, &path);
        return Err(format!("failed to finalize settings: {e}"));
    }

    if backup_path.exists() {
        let _ = std::fs::remove_file(&backup_path);
    }

    Ok(settings.clone())
}
