mod app;
mod backend;
mod commands;
mod domain;
mod infra;
mod shared;

pub(crate) use app::app_state;
pub(crate) use domain::launch_plan;
pub(crate) use infra::{app_paths, probe, settings};
pub(crate) use shared::blocking;

use app::startup::StartupState;
use app_state::BackendState;
use commands::*;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = tauri::Builder::default()
        .manage(BackendState::default())
        .manage(StartupState::default());

    #[cfg(desktop)]
    let builder = builder.plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
        crate::app::launch::focus_main_window(app);
    }));

    let app = builder
        .on_window_event(crate::app::cleanup::on_window_event)
        .setup(|app| {
            crate::app::logging::init(app.handle());

            let app_handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                crate::app::launch::run_launch_sequence(app_handle).await;
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            frontend_ready,
            app_about_get,
            app_exit,
            app_restart,
            backend_status,
            backend_check_port_available,
            backend_ping_ms,
            backend_restart,
            settings_get,
            settings_set
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        if let tauri::RunEvent::ExitRequested { api, code, .. } = &event {
            // `prevent_exit` does not apply to restart requests; `app_restart`
            // runs cleanup itself before requesting the restart.
            if *code != Some(tauri::RESTART_EXIT_CODE) {
                tracing::info!("收到退出请求，开始清理...");
                api.prevent_exit();

                let app_handle = app_handle.clone();
                tauri::async_runtime::spawn(async move {
                    crate::app::cleanup::cleanup_before_exit(&app_handle).await;
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    std::process::exit(0);
                });
            }
        }
    });
}
