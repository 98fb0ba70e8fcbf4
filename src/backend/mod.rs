//! Usage: Local analysis service supervision (resolve, spawn, status, stop).
//!
//! The analysis service is an external executable that serves HTTP on a
//! loopback port once ready. This module owns the child process; readiness
//! polling and window handoff live in `app::launch`.

use serde::Serialize;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

pub(crate) const BACKEND_STATUS_EVENT: &str = "backend:status";
pub(crate) const BACKEND_PORT_ENV: &str = "SCORE_ANALYZER_BACKEND_PORT";
const DEFAULT_BACKEND_PROGRAM: &str = "st_score_analyzer";
const STOP_TIMEOUT: Duration = Duration::from_secs(3);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub(crate) enum BackendPhase {
    Idle,
    Starting { attempt: u32 },
    Ready { waited_ms: u64 },
    Failed { message: String },
    Stopped,
}

impl Default for BackendPhase {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BackendStatus {
    pub running: bool,
    pub pid: Option<u32>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
    #[serde(flatten)]
    pub phase: BackendPhase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BackendLaunchSpec {
    pub program: PathBuf,
    pub port: u16,
}

pub(crate) fn base_url_for_port(port: u16) -> String {
    format!("http://127.0.0.1:{port}")
}

pub(crate) fn port_available(port: u16) -> bool {
    std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Pick the analysis service executable: explicit path from settings when
/// set, otherwise the bundled binary sitting next to the app executable.
pub(crate) fn resolve_launch_spec(
    settings: &crate::settings::AppSettings,
) -> Result<BackendLaunchSpec, String> {
    let explicit = settings.backend_program.trim();
    let program = if explicit.is_empty() {
        bundled_backend_path()?
    } else {
        PathBuf::from(explicit)
    };

    if !program.exists() {
        return Err(format!(
            "BACKEND_NOT_FOUND: analysis service executable missing: {}",
            program.display()
        ));
    }

    Ok(BackendLaunchSpec {
        program,
        port: settings.backend_port,
    })
}

fn bundled_backend_path() -> Result<PathBuf, String> {
    let exe = std::env::current_exe()
        .map_err(|e| format!("BACKEND_RESOLVE: failed to locate app executable: {e}"))?;
    let dir = exe
        .parent()
        .ok_or_else(|| "BACKEND_RESOLVE: app executable has no parent dir".to_string())?;
    Ok(dir.join(format!(
        "{DEFAULT_BACKEND_PROGRAM}{}",
        std::env::consts::EXE_SUFFIX
    )))
}

#[derive(Default)]
pub(crate) struct BackendManager {
    child: Option<Child>,
    port: Option<u16>,
    phase: BackendPhase,
}

impl BackendManager {
    /// Spawn the analysis service. Idempotent while a child is running.
    pub(crate) fn start(&mut self, spec: BackendLaunchSpec) -> Result<BackendStatus, String> {
        if self.is_running() {
            return Ok(self.status());
        }

        let child = Command::new(&spec.program)
            .env(BACKEND_PORT_ENV, spec.port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                format!(
                    "BACKEND_SPAWN: failed to start {}: {e}",
                    spec.program.display()
                )
            })?;

        tracing::info!(pid = child.id(), port = spec.port, "分析服务进程已启动");
        self.child = Some(child);
        self.port = Some(spec.port);
        self.phase = BackendPhase::Starting { attempt: 0 };
        Ok(self.status())
    }

    pub(crate) fn is_running(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(_)) | Err(_) => {
                self.child = None;
                false
            }
        }
    }

    pub(crate) fn set_phase(&mut self, phase: BackendPhase) {
        self.phase = phase;
    }

    pub(crate) fn status(&mut self) -> BackendStatus {
        let running = self.is_running();
        BackendStatus {
            running,
            pid: self.child.as_ref().map(|c| c.id()),
            port: self.port,
            base_url: self.port.map(base_url_for_port),
            phase: self.phase.clone(),
        }
    }

    /// Kill the child and wait for it to exit (bounded). `Ok(true)` means a
    /// running process was actually stopped.
    pub(crate) fn stop(&mut self) -> Result<bool, String> {
        let Some(mut child) = self.child.take() else {
            return Ok(false);
        };

        if let Ok(Some(_)) = child.try_wait() {
            self.phase = BackendPhase::Stopped;
            return Ok(false);
        }

        let pid = child.id();
        child
            .kill()
            .map_err(|e| format!("BACKEND_STOP: failed to kill pid {pid}: {e}"))?;

        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if started.elapsed() >= STOP_TIMEOUT {
                        return Err(format!(
                            "BACKEND_STOP: pid {pid} did not exit within {}ms",
                            STOP_TIMEOUT.as_millis()
                        ));
                    }
                    std::thread::sleep(STOP_POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(format!("BACKEND_STOP: failed to wait for pid {pid}: {e}"));
                }
            }
        }

        self.phase = BackendPhase::Stopped;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TMP_DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn unique_tmp_dir() -> PathBuf {
        let seq = TMP_DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push(format!(
            "score_analyzer_backend_test_{nanos}_{}_{}",
            std::process::id(),
            seq
        ));
        std::fs::create_dir_all(&dir).expect("create tmp dir");
        dir
    }

    #[test]
    fn base_url_uses_loopback_host() {
        assert_eq!(base_url_for_port(8501), "http://127.0.0.1:8501");
    }

    #[test]
    fn port_available_reflects_bound_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let port = listener.local_addr().expect("listener addr").port();
        assert!(!port_available(port));
        drop(listener);
        assert!(port_available(port));
    }

    #[test]
    fn status_serializes_with_flattened_phase() {
        let mut manager = BackendManager::default();
        manager.set_phase(BackendPhase::Starting { attempt: 3 });
        let value = serde_json::to_value(manager.status()).expect("serialize status");
        assert_eq!(value["phase"], "starting");
        assert_eq!(value["attempt"], 3);
        assert_eq!(value["running"], false);
    }

    #[test]
    fn resolve_launch_spec_prefers_explicit_program() {
        let dir = unique_tmp_dir();
        let program = dir.join("custom_backend");
        std::fs::write(&program, b"").expect("create program file");

        let mut cfg = crate::settings::AppSettings::default();
        cfg.backend_program = program.display().to_string();
        cfg.backend_port = 9100;

        let spec = resolve_launch_spec(&cfg).expect("resolve explicit program");
        assert_eq!(spec.program, program);
        assert_eq!(spec.port, 9100);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn resolve_launch_spec_rejects_missing_program() {
        let dir = unique_tmp_dir();
        let mut cfg = crate::settings::AppSettings::default();
        cfg.backend_program = dir.join("does_not_exist").display().to_string();

        let err = resolve_launch_spec(&cfg).expect_err("missing program must fail");
        assert!(err.starts_with("BACKEND_NOT_FOUND:"), "unexpected: {err}");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn stop_without_child_is_a_no_op() {
        let mut manager = BackendManager::default();
        assert!(!manager.stop().expect("stop"));
        assert_eq!(manager.status().phase, BackendPhase::Idle);
    }

    #[cfg(unix)]
    #[test]
    fn manager_start_status_stop_round_trip() {
        use std::os::unix::fs::PermissionsExt;

        let dir = unique_tmp_dir();
        let script = dir.join("fake_backend.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").expect("write script");
        let mut perms = std::fs::metadata(&script).expect("script metadata").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).expect("chmod script");

        let mut manager = BackendManager::default();
        let spec = BackendLaunchSpec {
            program: script,
            port: 9102,
        };

        let status = manager.start(spec.clone()).expect("start fake backend");
        assert!(status.running);
        assert_eq!(status.port, Some(9102));
        assert!(matches!(status.phase, BackendPhase::Starting { .. }));

        // Second start while running is a no-op on the same child.
        let again = manager.start(spec).expect("start again");
        assert_eq!(again.pid, status.pid);

        assert!(manager.stop().expect("stop fake backend"));
        let stopped = manager.status();
        assert!(!stopped.running);
        assert_eq!(stopped.phase, BackendPhase::Stopped);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
