//! Usage: Mutex helpers for Tauri-managed state (poison recovery).

use std::sync::{Mutex, MutexGuard};

pub(crate) trait MutexExt<T> {
    fn lock_or_recover(&self) -> MutexGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_or_recover(&self) -> MutexGuard<'_, T> {
        match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn lock_or_recover_returns_guard_after_poison() {
        let mutex = Arc::new(Mutex::new(1u32));

        let poisoner = Arc::clone(&mutex);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().expect("lock before panic");
            panic!("poison the mutex");
        })
        .join();

        *mutex.lock_or_recover() = 2;
        assert_eq!(*mutex.lock_or_recover(), 2);
    }
}
