//! Runtime Bridge Manager
//!
//! Owns the engine lifecycle: `Uninitialized -> Running -> ShutDown`.
//! `ShutDown` is terminal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, ValidatorError};

use super::engine::{Engine, EngineFault, EngineLauncher};

/// Lifecycle state of a runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    Running,
    ShutDown,
}

/// A started engine shared by every validation call.
///
/// The engine sits behind a mutex so only the call step is serialized;
/// marshaling and normalization run outside it.
pub struct RuntimeHandle {
    engine: Mutex<Option<Box<dyn Engine>>>,
}

impl RuntimeHandle {
    pub fn new(engine: Box<dyn Engine>) -> Self {
        Self {
            engine: Mutex::new(Some(engine)),
        }
    }

    /// Run `f` against the engine while holding the invocation lock
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut dyn Engine) -> R) -> Result<R> {
        let mut slot = self.lock();
        let engine = slot.as_mut().ok_or(ValidatorError::RuntimeUnavailable)?;
        Ok(f(&mut **engine))
    }

    fn close(&self) -> std::result::Result<(), EngineFault> {
        match self.lock().take() {
            Some(mut engine) => engine.shutdown(),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Engine>>> {
        // A panic inside an engine call leaves the slot itself intact
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Slot {
    Uninitialized,
    Running(Arc<RuntimeHandle>),
    ShutDown,
}

/// Starts the engine lazily, at most once, and tears it down on request
pub struct RuntimeManager {
    launcher: Box<dyn EngineLauncher>,
    slot: Mutex<Slot>,
}

impl RuntimeManager {
    pub fn new(launcher: impl EngineLauncher + 'static) -> Self {
        Self {
            launcher: Box::new(launcher),
            slot: Mutex::new(Slot::Uninitialized),
        }
    }

    /// Start the engine if needed and return the shared handle.
    ///
    /// Concurrent first callers wait on the slot lock while one of them
    /// launches; the rest reuse the result.
    pub fn start(&self) -> Result<Arc<RuntimeHandle>> {
        let mut slot = self.lock();
        match &*slot {
            Slot::Running(handle) => Ok(Arc::clone(handle)),
            Slot::ShutDown => Err(ValidatorError::RuntimeUnavailable),
            Slot::Uninitialized => {
                log::debug!("Starting validation engine");
                let engine = self.launcher.launch()?;
                let handle = Arc::new(RuntimeHandle::new(engine));
                *slot = Slot::Running(Arc::clone(&handle));
                log::info!("Validation engine started");
                Ok(handle)
            }
        }
    }

    /// Tear the engine down. Idempotent; the runtime cannot be restarted.
    ///
    /// Callers must quiesce in-flight validations first.
    pub fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.lock(), Slot::ShutDown);
        if let Slot::Running(handle) = previous {
            match handle.close() {
                Ok(()) => log::info!("Validation engine shut down"),
                Err(e) => log::warn!("Validation engine did not shut down cleanly: {}", e),
            }
        }
    }

    pub fn state(&self) -> RuntimeState {
        match &*self.lock() {
            Slot::Uninitialized => RuntimeState::Uninitialized,
            Slot::Running(_) => RuntimeState::Running,
            Slot::ShutDown => RuntimeState::ShutDown,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RawIssue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullEngine {
        shutdowns: Arc<AtomicUsize>,
    }

    impl Engine for NullEngine {
        fn check(&mut self, _: &str) -> std::result::Result<Vec<RawIssue>, EngineFault> {
            Ok(Vec::new())
        }

        fn shutdown(&mut self) -> std::result::Result<(), EngineFault> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counting_manager() -> (RuntimeManager, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let launches = Arc::new(AtomicUsize::new(0));
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let (l, s) = (Arc::clone(&launches), Arc::clone(&shutdowns));
        let manager = RuntimeManager::new(move || -> Result<Box<dyn Engine>> {
            l.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(NullEngine {
                shutdowns: Arc::clone(&s),
            }))
        });
        (manager, launches, shutdowns)
    }

    #[test]
    fn start_is_lazy_and_reused() {
        let (manager, launches, _) = counting_manager();
        assert_eq!(manager.state(), RuntimeState::Uninitialized);
        assert_eq!(launches.load(Ordering::SeqCst), 0);

        let first = manager.start().expect("start");
        let second = manager.start().expect("start again");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(launches.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state(), RuntimeState::Running);
    }

    #[test]
    fn shutdown_is_terminal_and_idempotent() {
        let (manager, _, shutdowns) = counting_manager();
        manager.start().expect("start");

        manager.shutdown();
        manager.shutdown();
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state(), RuntimeState::ShutDown);
        assert!(matches!(
            manager.start(),
            Err(ValidatorError::RuntimeUnavailable)
        ));
    }

    #[test]
    fn shutdown_before_start_still_terminal() {
        let (manager, launches, shutdowns) = counting_manager();
        manager.shutdown();
        assert_eq!(manager.state(), RuntimeState::ShutDown);
        assert!(manager.start().is_err());
        assert_eq!(launches.load(Ordering::SeqCst), 0);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stale_handle_fails_after_shutdown() {
        let (manager, _, _) = counting_manager();
        let handle = manager.start().expect("start");
        manager.shutdown();
        assert!(matches!(
            handle.with_engine(|engine| engine.check("{}")),
            Err(ValidatorError::RuntimeUnavailable)
        ));
    }

    #[test]
    fn failed_launch_leaves_runtime_uninitialized() {
        let manager = RuntimeManager::new(|| -> Result<Box<dyn Engine>> {
            Err(ValidatorError::configuration(
                "/missing/circe.jar",
                "engine jar not found",
                "build it",
            ))
        });
        assert!(matches!(
            manager.start(),
            Err(ValidatorError::Configuration { .. })
        ));
        assert_eq!(manager.state(), RuntimeState::Uninitialized);
    }
}
