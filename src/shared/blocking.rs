//! Usage: Run blocking work off the async runtime, labeled for diagnostics.

pub(crate) async fn run<T, F>(label: &str, task: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    match tauri::async_runtime::spawn_blocking(task).await {
        Ok(result) => result,
        Err(e) => Err(format!("BLOCKING_JOIN: {label}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_returns_task_result() {
        let out = run("test_ok", || Ok(41 + 1)).await.expect("run");
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn run_propagates_task_error() {
        let err = run::<u32, _>("test_err", || Err("boom".to_string()))
            .await
            .expect_err("task error must propagate");
        assert_eq!(err, "boom");
    }
}
