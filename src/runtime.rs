//! Runtime abstraction layer for async operations
//!
//! Background work (geolocation, reverse geocoding, tile downloads) is handed
//! to an [`AsyncSpawner`] so the UI thread never blocks and the library is not
//! tied to a particular executor.

use futures::future::BoxFuture;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;
}

/// Convenience wrapper that boxes the future for the spawner
pub fn spawn<F>(spawner: &dyn AsyncSpawner, future: F) -> Box<dyn AsyncHandle>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    spawner.spawn_boxed(Box::pin(future))
}

#[cfg(feature = "tokio-runtime")]
pub mod tokio_impl {
    use super::*;
    use ::tokio::runtime::Handle;
    use ::tokio::task::JoinHandle;

    /// Tokio-based async spawner bound to a runtime handle
    #[derive(Debug, Clone)]
    pub struct TokioSpawner {
        handle: Handle,
    }

    impl TokioSpawner {
        pub fn new(handle: Handle) -> Self {
            Self { handle }
        }

        /// Spawner for the runtime the caller is running in.
        ///
        /// Panics when called outside a tokio runtime, like `Handle::current`.
        pub fn current() -> Self {
            Self::new(Handle::current())
        }
    }

    impl AsyncSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
            Box::new(TokioHandle(self.handle.spawn(future)))
        }
    }

    struct TokioHandle(JoinHandle<()>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.is_finished()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        #[tokio::test]
        async fn test_spawned_future_runs() {
            let spawner = TokioSpawner::current();
            let ran = Arc::new(AtomicBool::new(false));
            let flag = ran.clone();
            let (tx, rx) = ::tokio::sync::oneshot::channel();

            let handle = spawn(&spawner, async move {
                flag.store(true, Ordering::SeqCst);
                let _ = tx.send(());
            });

            rx.await.unwrap();
            assert!(ran.load(Ordering::SeqCst));
            // The send happens before the task returns; give it a moment to finish.
            ::tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            assert!(handle.is_finished());
        }
    }
}

#[cfg(feature = "tokio-runtime")]
pub use tokio_impl::TokioSpawner;
