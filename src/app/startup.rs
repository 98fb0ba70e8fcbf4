//! Usage: One-shot startup notification fired when the main window's document is ready.
//!
//! The boot page invokes `frontend_ready` once its document has loaded; the
//! handler funnels into [`notify_frontend_ready`]. The notification happens
//! at most once per launch no matter how often the page fires.

use std::sync::atomic::{AtomicBool, Ordering};
use tauri::{Emitter, Manager};

pub(crate) const BRIDGE_PROBE_EVENT: &str = "bridge:probe";

/// Per-launch gate for the startup notification, held in managed state.
#[derive(Default)]
pub(crate) struct StartupState {
    notified: AtomicBool,
}

impl StartupState {
    /// `true` exactly once; later calls mean the notification already ran.
    pub(crate) fn try_begin(&self) -> bool {
        !self.notified.swap(true, Ordering::SeqCst)
    }
}

/// Outcome of one startup notification. The probe result is kept as data so
/// the warning path stays decoupled from the probe itself.
pub(crate) struct StartupReport {
    pub probe: Result<(), String>,
}

impl StartupReport {
    pub(crate) fn warning_detail(&self) -> Option<&str> {
        self.probe.as_ref().err().map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, serde::Serialize)]
struct BridgeProbePayload {
    app_version: String,
}

// Best-effort check that the shell can still talk to the webview: look the
// main window up at call time and emit an event through it. Success is the
// absence of an error.
fn probe_bridge(app: &tauri::AppHandle) -> Result<(), String> {
    let window = app
        .get_webview_window("main")
        .ok_or_else(|| "BRIDGE_PROBE: main window not found".to_string())?;

    window
        .emit(
            BRIDGE_PROBE_EVENT,
            BridgeProbePayload {
                app_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        )
        .map_err(|e| format!("BRIDGE_PROBE: {e}"))?;

    Ok(())
}

/// Runs the startup notification: one info log, then a best-effort bridge
/// probe whose failure is downgraded to a single warning. Returns whether
/// this call performed the notification.
pub(crate) fn notify_frontend_ready(app: &tauri::AppHandle, state: &StartupState) -> bool {
    if !state.try_begin() {
        return false;
    }

    tracing::info!("成绩分析桌面端已启动");

    let report = StartupReport {
        probe: probe_bridge(app),
    };
    match report.warning_detail() {
        None => tracing::debug!("桥接探测正常"),
        Some(detail) => tracing::warn!("桥接探测失败: {detail}"),
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_admits_exactly_one_notification() {
        let state = StartupState::default();
        assert!(state.try_begin());
        assert!(!state.try_begin());
        assert!(!state.try_begin());
    }

    #[test]
    fn fresh_gates_are_independent_per_launch() {
        let first = StartupState::default();
        let second = StartupState::default();
        assert!(first.try_begin());
        assert!(second.try_begin());
    }

    #[test]
    fn report_with_ok_probe_has_no_warning_detail() {
        let report = StartupReport { probe: Ok(()) };
        assert!(report.warning_detail().is_none());
    }

    #[test]
    fn report_with_failed_probe_exposes_failure_detail() {
        let report = StartupReport {
            probe: Err("BRIDGE_PROBE: unreachable".to_string()),
        };
        let detail = report.warning_detail().expect("warning detail");
        assert!(detail.contains("unreachable"));
    }
}
