//! Usage: Best-effort cleanup hooks for app lifecycle events (window close, exit, restart).

use crate::app_state::BackendState;
use crate::shared::mutex_ext::MutexExt;
use crate::{backend, blocking};
use std::sync::atomic::{AtomicBool, Ordering};
use tauri::Manager;

static CLEANUP_STARTED: AtomicBool = AtomicBool::new(false);

pub(crate) async fn cleanup_before_exit(app: &tauri::AppHandle) {
    if CLEANUP_STARTED.swap(true, Ordering::SeqCst) {
        return;
    }

    stop_backend_best_effort(app).await;

    // The service may have spawned children of its own; the port is the
    // observable contract, so report when it is still taken.
    let port = {
        let state = app.state::<BackendState>();
        let mut manager = state.manager.lock_or_recover();
        manager.status().port
    };
    if let Some(port) = port {
        if !backend::port_available(port) {
            tracing::warn!("退出清理：端口 {} 仍被占用，分析服务可能未完全退出", port);
        }
    }
}

pub(crate) async fn stop_backend_best_effort(app: &tauri::AppHandle) {
    let app_for_stop = app.clone();
    match blocking::run("cleanup_backend_stop", move || {
        let state = app_for_stop.state::<BackendState>();
        let mut manager = state.manager.lock_or_recover();
        manager.stop()
    })
    .await
    {
        Ok(true) => tracing::info!("退出清理：分析服务已停止"),
        Ok(false) => {}
        Err(err) => tracing::warn!("退出清理：停止分析服务失败: {}", err),
    }
}

// A close gesture on either window must end the app: the counterpart window
// is hidden at handoff, not closed, so the runtime never sees "last window
// closed" on its own.
fn close_gesture_ends_app(label: &str, event: &tauri::WindowEvent) -> bool {
    match event {
        tauri::WindowEvent::Destroyed => label == "main",
        tauri::WindowEvent::CloseRequested { .. } => label == "splashscreen",
        _ => false,
    }
}

pub(crate) fn on_window_event(window: &tauri::Window, event: &tauri::WindowEvent) {
    if close_gesture_ends_app(window.label(), event) {
        tracing::info!("窗口 {} 已关闭，退出应用", window.label());
        // Lands in the run loop's ExitRequested handler, which stops the
        // backend through `cleanup_before_exit`.
        window.app_handle().exit(0);
    }
}
