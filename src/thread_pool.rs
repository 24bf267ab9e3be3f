//! Shared worker pool for bootstrap loops.
//!
//! Resample iterations are independent, so they are spread over one lazily
//! built rayon pool instead of the global one, keeping a library caller's own
//! rayon configuration untouched.

use rayon::ThreadPool;
use std::sync::OnceLock;

static THREAD_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

fn get_thread_pool() -> Option<&'static ThreadPool> {
    THREAD_POOL
        .get_or_init(|| {
            rayon::ThreadPoolBuilder::new()
                .thread_name(|i| format!("observer-eval-bootstrap-{}", i))
                .build()
                .map_err(|e| tracing::warn!("falling back to global rayon pool: {}", e))
                .ok()
        })
        .as_ref()
}

/// Execute a parallel operation on the bootstrap pool.
///
/// Falls back to rayon's global pool if the dedicated pool could not be built.
pub fn install<OP, R>(op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match get_thread_pool() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
