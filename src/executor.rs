//! Execution strategies for spawned computations.
//!
//! The fan-in engine never schedules anything: it only reacts to completion
//! events. Executors matter only where a computation is turned into a cell,
//! via [`AsyncCell::spawn_on`](crate::cell::AsyncCell::spawn_on) with an
//! explicit strategy or [`AsyncCell::spawn`](crate::cell::AsyncCell::spawn)
//! with the process default.
//!
//! # Process default
//!
//! [`init`] installs the default executor and wait timeout exactly once. If
//! nothing was installed, [`default_executor`] builds them from
//! [`Config::from_env`] on first use.

use core::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::config::{Config, ExecutorConfig, ExecutorKind};
use crate::error::{Error, ErrorKind};
use crate::tracing_compat::{info, warn};

/// A unit of work handed to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks somewhere.
///
/// Implementations decide the thread; they must run every task exactly once.
pub trait Executor: Send + Sync {
    /// Submits `task` for execution.
    fn execute(&self, task: Task);
}

/// Runs each task immediately on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Executor for Inline {
    fn execute(&self, task: Task) {
        task();
    }
}

/// Runs tasks on rayon's process-wide pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalPool;

impl Executor for GlobalPool {
    fn execute(&self, task: Task) {
        rayon::spawn(task);
    }
}

impl Executor for rayon::ThreadPool {
    fn execute(&self, task: Task) {
        // FIFO keeps a one-thread pool running work in submission order.
        self.spawn_fifo(task);
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, task: Task) {
        (**self).execute(task);
    }
}

/// A cloneable, type-erased executor.
#[derive(Clone)]
pub struct ExecutorHandle {
    inner: Arc<dyn Executor>,
    kind: ExecutorKind,
}

impl ExecutorHandle {
    /// Wraps a custom executor.
    ///
    /// Custom strategies report [`ExecutorKind::Pool`] from [`kind`](Self::kind).
    pub fn new(executor: impl Executor + 'static) -> Self {
        Self {
            inner: Arc::new(executor),
            kind: ExecutorKind::Pool,
        }
    }

    /// The inline strategy.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            inner: Arc::new(Inline),
            kind: ExecutorKind::Inline,
        }
    }

    /// The rayon global pool.
    #[must_use]
    pub fn global() -> Self {
        Self {
            inner: Arc::new(GlobalPool),
            kind: ExecutorKind::Global,
        }
    }

    /// A single dedicated worker thread.
    pub fn single_thread(thread_name: &str) -> Result<Self, Error> {
        Self::dedicated(ExecutorKind::SingleThread, 1, thread_name)
    }

    /// A dedicated pool of `threads` workers.
    pub fn pool(threads: usize, thread_name: &str) -> Result<Self, Error> {
        Self::dedicated(ExecutorKind::Pool, threads, thread_name)
    }

    /// Builds the strategy described by `config`.
    pub fn from_config(config: &ExecutorConfig) -> Result<Self, Error> {
        config.validate()?;
        match config.kind {
            ExecutorKind::Inline => Ok(Self::inline()),
            ExecutorKind::Global => Ok(Self::global()),
            ExecutorKind::SingleThread => Self::single_thread(&config.thread_name),
            ExecutorKind::Pool => {
                let threads = config.threads.unwrap_or_else(|| {
                    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
                });
                Self::pool(threads, &config.thread_name)
            }
        }
    }

    fn dedicated(kind: ExecutorKind, threads: usize, thread_name: &str) -> Result<Self, Error> {
        let prefix = thread_name.to_string();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| Error::new(ErrorKind::Executor).with_context(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(pool),
            kind,
        })
    }

    /// Returns the strategy kind.
    #[must_use]
    pub const fn kind(&self) -> ExecutorKind {
        self.kind
    }
}

impl Executor for ExecutorHandle {
    fn execute(&self, task: Task) {
        self.inner.execute(task);
    }
}

impl fmt::Debug for ExecutorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorHandle")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

struct Defaults {
    executor: ExecutorHandle,
    timeout: Duration,
}

static DEFAULTS: OnceLock<Defaults> = OnceLock::new();

/// Installs the process defaults (executor and wait timeout) from `config`.
///
/// Fails with [`ErrorKind::AlreadyInitialized`] if defaults are already in
/// place, including ones installed lazily by [`default_executor`].
pub fn init(config: &Config) -> Result<(), Error> {
    config.validate()?;
    let executor = ExecutorHandle::from_config(&config.executor)?;
    let kind = executor.kind();
    DEFAULTS
        .set(Defaults {
            executor,
            timeout: config.default_timeout,
        })
        .map_err(|_| {
            Error::new(ErrorKind::AlreadyInitialized).with_context(format!(
                "refusing to replace default executor with {}",
                kind.as_str()
            ))
        })?;
    info!(kind = kind.as_str(), "default executor installed");
    Ok(())
}

fn defaults() -> &'static Defaults {
    DEFAULTS.get_or_init(|| {
        let config = Config::from_env().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring invalid environment configuration");
            Config::default()
        });
        let executor = ExecutorHandle::from_config(&config.executor).unwrap_or_else(|err| {
            warn!(error = %err, "falling back to global pool for default executor");
            ExecutorHandle::global()
        });
        info!(kind = executor.kind().as_str(), "default executor installed from environment");
        Defaults {
            executor,
            timeout: config.default_timeout,
        }
    })
}

/// Returns the process default executor, installing defaults from the
/// environment on first use.
///
/// A broken environment falls back to [`Config::default`], and a pool that
/// cannot be built falls back to the rayon global pool.
pub fn default_executor() -> ExecutorHandle {
    defaults().executor.clone()
}

/// Returns the process default wait timeout.
pub fn default_timeout() -> Duration {
    defaults().timeout
}
