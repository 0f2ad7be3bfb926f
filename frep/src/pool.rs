//! Thread pool selection

/// Pool used to run meshing workers
pub enum ThreadPool {
    /// A pool built by the caller
    Custom(rayon::ThreadPool),
    /// Rayon's global pool
    Global,
}

impl ThreadPool {
    /// Runs `f` inside the pool, so that Rayon iterators in `f` use its
    /// threads
    pub fn run<V: Send>(&self, f: impl FnOnce() -> V + Send) -> V {
        match self {
            Self::Custom(pool) => pool.install(f),
            Self::Global => f(),
        }
    }

    /// Number of threads available to [`run`](Self::run)
    pub fn thread_count(&self) -> usize {
        self.run(rayon::current_num_threads)
    }
}
