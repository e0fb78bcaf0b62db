use rayon::ThreadPoolBuilder;

/// Runs `op` on a pool of `workers` threads, or on rayon's global pool when
/// `workers` is 0 or a dedicated pool cannot be created.
pub(crate) fn in_pool<R, F>(workers: usize, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    if workers == 0 {
        return op();
    }
    match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(op),
        Err(err) => {
            tracing::warn!(workers, %err, "falling back to the global thread pool");
            op()
        }
    }
}
