//! Usage: Startup sequence that brings the analysis service online and hands the UI to it.

use crate::app_state::BackendState;
use crate::launch_plan::{self, LaunchPlan};
use crate::shared::mutex_ext::MutexExt;
use crate::{backend, blocking, settings};
use std::time::{Duration, Instant};
use tauri::{Emitter, Manager};

// The service answers its first 2xx slightly before all routes are usable.
const READY_SETTLE: Duration = Duration::from_millis(500);

pub(crate) async fn run_launch_sequence(app: tauri::AppHandle) {
    if !app.state::<BackendState>().try_begin_launch() {
        tracing::warn!("启动流程已在进行中，忽略重复触发");
        return;
    }
    launch_once(&app).await;
    app.state::<BackendState>().finish_launch();
}

async fn launch_once(app: &tauri::AppHandle) {
    let cfg = match blocking::run("launch_read_settings", {
        let app = app.clone();
        move || {
            Ok(settings::read(&app).unwrap_or_else(|err| {
                tracing::warn!("配置读取失败，使用默认值: {}", err);
                settings::AppSettings::default()
            }))
        }
    })
    .await
    {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!("配置读取任务失败，使用默认值: {}", err);
            settings::AppSettings::default()
        }
    };

    let plan = LaunchPlan::from_settings(&cfg);
    let base_url = backend::base_url_for_port(cfg.backend_port);

    let start_result = blocking::run("launch_backend_start", {
        let app = app.clone();
        move || {
            let spec = backend::resolve_launch_spec(&cfg)?;
            let state = app.state::<BackendState>();
            let mut manager = state.manager.lock_or_recover();
            manager.start(spec)
        }
    })
    .await;

    if let Err(err) = start_result {
        tracing::error!("分析服务启动失败: {}", err);
        set_phase_and_emit(app, backend::BackendPhase::Failed { message: err });
        return;
    }

    tracing::info!("等待分析服务启动...");
    let waited_ms = match wait_until_ready(app, &base_url, &plan).await {
        Ok(waited_ms) => waited_ms,
        Err(err) => {
            tracing::error!("分析服务启动超时，请检查应用程序");
            set_phase_and_emit(app, backend::BackendPhase::Failed { message: err });
            return;
        }
    };

    tracing::info!(waited_ms, "分析服务已就绪!");
    set_phase_and_emit(app, backend::BackendPhase::Ready { waited_ms });
    tokio::time::sleep(READY_SETTLE).await;

    if let Err(err) = hand_off_to_backend(app, &base_url, plan.handoff_delay).await {
        tracing::error!("切换主窗口到分析服务失败: {}", err);
    }
}

async fn wait_until_ready(
    app: &tauri::AppHandle,
    base_url: &str,
    plan: &LaunchPlan,
) -> Result<u64, String> {
    let client = reqwest::Client::new();
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        set_phase_and_emit(app, backend::BackendPhase::Starting { attempt });

        match client.get(base_url).send().await {
            Ok(response) if launch_plan::is_ready_response(response.status().as_u16()) => {
                return Ok(started.elapsed().as_millis() as u64);
            }
            Ok(response) => {
                tracing::debug!(
                    attempt,
                    max_attempts = plan.max_attempts,
                    status = %response.status(),
                    "分析服务尚未就绪，重试中"
                );
            }
            Err(err) => {
                tracing::debug!(
                    attempt,
                    max_attempts = plan.max_attempts,
                    "分析服务尚未就绪，重试中: {}",
                    err
                );
            }
        }

        match plan.delay_after(attempt) {
            Some(delay) => tokio::time::sleep(delay).await,
            None => {
                return Err(format!(
                    "BACKEND_READY_TIMEOUT: no 2xx from {base_url} after {} attempts",
                    plan.max_attempts
                ));
            }
        }
    }
}

async fn hand_off_to_backend(
    app: &tauri::AppHandle,
    base_url: &str,
    handoff_delay: Duration,
) -> Result<(), String> {
    let main_window = app
        .get_webview_window("main")
        .ok_or_else(|| "HANDOFF: main window not found".to_string())?;

    main_window
        .eval(&format!("window.location.replace('{base_url}');"))
        .map_err(|e| format!("HANDOFF: failed to navigate main window: {e}"))?;

    tokio::time::sleep(handoff_delay).await;

    if let Some(splash_window) = app.get_webview_window("splashscreen") {
        if let Err(err) = splash_window.hide() {
            tracing::warn!("隐藏启动画面失败: {}", err);
        }
    }
    main_window
        .show()
        .map_err(|e| format!("HANDOFF: failed to show main window: {e}"))?;

    tracing::info!("主窗口已切换至分析服务");
    Ok(())
}

fn set_phase_and_emit(app: &tauri::AppHandle, phase: backend::BackendPhase) {
    let status = {
        let state = app.state::<BackendState>();
        let mut manager = state.manager.lock_or_recover();
        manager.set_phase(phase);
        manager.status()
    };
    let _ = app.emit(backend::BACKEND_STATUS_EVENT, status);
}

pub(crate) fn focus_main_window(app: &tauri::AppHandle) {
    let Some(window) = app.get_webview_window("main") else {
        return;
    };
    let _ = window.show();
    let _ = window.unminimize();
    let _ = window.set_focus();
}
