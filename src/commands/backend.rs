//! Usage: Analysis service status / probe / lifecycle commands.

use crate::app_state::BackendState;
use crate::shared::mutex_ext::MutexExt;
use crate::{backend, probe};
use tauri::Manager;

#[tauri::command]
pub(crate) fn backend_status(state: tauri::State<'_, BackendState>) -> backend::BackendStatus {
    let mut manager = state.manager.lock_or_recover();
    manager.status()
}

#[tauri::command]
pub(crate) fn backend_check_port_available(port: u16) -> bool {
    if port < 1024 {
        return false;
    }
    backend::port_available(port)
}

#[tauri::command]
pub(crate) async fn backend_ping_ms(base_url: String) -> Result<u64, String> {
    let client = reqwest::Client::builder()
        .user_agent(format!(
            "score-analyzer-desktop-ping/{}",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .map_err(|e| format!("PING_HTTP_CLIENT_INIT: {e}"))?;
    probe::probe_backend_ms(&client, &base_url, std::time::Duration::from_secs(3)).await
}

/// Stop the service, then re-run the launch sequence in the background.
/// Progress is reported through `backend:status` events.
#[tauri::command]
pub(crate) async fn backend_restart(app: tauri::AppHandle) -> Result<bool, String> {
    // Refuse instead of stopping the service under a running sequence; the
    // launch slot would block the relaunch and leave the service down.
    if app.state::<BackendState>().launch_in_progress() {
        return Err("BACKEND_RESTART_BUSY: launch sequence already running".to_string());
    }

    crate::app::cleanup::stop_backend_best_effort(&app).await;

    let app_for_launch = app.clone();
    tauri::async_runtime::spawn(async move {
        crate::app::launch::run_launch_sequence(app_for_launch).await;
    });

    Ok(true)
}
