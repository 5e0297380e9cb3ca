//! Shared helpers for unit and integration tests.
//!
//! - [`init_test_logging`] installs a `tracing-subscriber` writer that the
//!   test harness captures, once per process.
//! - `test_phase!`, `test_section!`, `test_complete!` and `assert_with_log!`
//!   mark test progress in the captured log.
//! - [`strategies`] yields the scheduling strategies every accumulation
//!   scenario runs under.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::executor::ExecutorHandle;

static INIT: Once = Once::new();

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_TEST_FILTER: &str = "accrete=trace";

/// Installs test logging at the default level. Safe to call from every test.
pub fn init_test_logging() {
    init_test_logging_with_filter(DEFAULT_TEST_FILTER);
}

/// Installs test logging with `filter`, unless `RUST_LOG` overrides it.
///
/// Only the first call in a process takes effect.
pub fn init_test_logging_with_filter(filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_names(true)
            .with_target(false)
            .try_init();
    });
}

/// The two canonical scheduling strategies: one dedicated thread, where
/// inputs complete strictly in submission order, and a shared pool, where
/// they complete in any order on any worker.
///
/// # Panics
///
/// Panics if a worker thread cannot be spawned.
#[must_use]
pub fn strategies() -> Vec<(&'static str, ExecutorHandle)> {
    vec![
        (
            "single_thread",
            ExecutorHandle::single_thread("accrete-test-single").expect("single-thread strategy"),
        ),
        (
            "shared_pool",
            ExecutorHandle::pool(4, "accrete-test-pool").expect("shared-pool strategy"),
        ),
    ]
}

/// Logs the start of a test.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        $crate::tracing_compat::info!(test = %$name, "==== test start ====");
    };
}

/// Logs a named section within a test.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        $crate::tracing_compat::info!(section = %$name, "---- section ----");
    };
}

/// Logs the successful end of a test.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        $crate::tracing_compat::info!(test = %$name, "==== test complete ====");
    };
}

/// Asserts `cond`, logging the expected and actual values first.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {{
        let expected = &$expected;
        let actual = &$actual;
        $crate::tracing_compat::debug!(expected = ?expected, actual = ?actual, "{}", $msg);
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, expected, actual);
    }};
}
