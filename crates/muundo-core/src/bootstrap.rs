//! Loader bootstrap signals
//!
//! The 3D runtime polls whether the page template finished loading and
//! announces when all models are loaded. `LoaderState` is owned by whatever
//! hosts the runtime and is shared by reference; there is no global flag.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

type ModelsLoadedHook = Box<dyn FnOnce() + Send>;

/// Template/model loading state shared between the host and the runtime.
#[derive(Default)]
pub struct LoaderState {
    template_loaded: AtomicBool,
    models_loaded: AtomicBool,
    hooks: Mutex<Vec<ModelsLoadedHook>>,
}

impl LoaderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the page template finished loading.
    pub fn mark_template_loaded(&self) {
        self.template_loaded.store(true, Ordering::Release);
    }

    /// Queried by the runtime before it starts.
    pub fn is_template_loaded(&self) -> bool {
        self.template_loaded.load(Ordering::Acquire)
    }

    pub fn are_models_loaded(&self) -> bool {
        self.models_loaded.load(Ordering::Acquire)
    }

    /// Register a hook to run when the runtime reports its models loaded.
    ///
    /// Registering after the notification has fired runs the hook immediately.
    pub fn on_models_loaded(&self, hook: impl FnOnce() + Send + 'static) {
        let mut hooks = self.hooks.lock();
        if self.are_models_loaded() {
            drop(hooks);
            hook();
        } else {
            hooks.push(Box::new(hook));
        }
    }

    /// Called by the runtime once every model is loaded. Hooks run once.
    pub fn notify_models_loaded(&self) {
        let hooks = {
            let mut hooks = self.hooks.lock();
            self.models_loaded.store(true, Ordering::Release);
            std::mem::take(&mut *hooks)
        };
        for hook in hooks {
            hook();
        }
    }
}

impl std::fmt::Debug for LoaderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderState")
            .field("template_loaded", &self.is_template_loaded())
            .field("models_loaded", &self.are_models_loaded())
            .field("pending_hooks", &self.hooks.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_template_flag() {
        let state = LoaderState::new();
        assert!(!state.is_template_loaded());
        state.mark_template_loaded();
        assert!(state.is_template_loaded());
    }

    #[test]
    fn test_hooks_run_once() {
        let state = LoaderState::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let c = calls.clone();
        state.on_models_loaded(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        state.notify_models_loaded();
        state.notify_models_loaded();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(state.are_models_loaded());
    }

    #[test]
    fn test_late_hook_runs_immediately() {
        let state = LoaderState::new();
        state.notify_models_loaded();

        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        state.on_models_loaded(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
