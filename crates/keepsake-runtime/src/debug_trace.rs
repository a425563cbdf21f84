#![forbid(unsafe_code)]

//! Zero-cost debug tracing controlled by environment variable.
//!
//! Set `KEEPSAKE_DEBUG_TRACE=1` to print timestamped runtime internals
//! (subscription starts/stops, timer firings, task completions) to stderr.
//! When disabled the check is a single static bool load.
//!
//! ```ignore
//! use keepsake_runtime::debug_trace;
//! debug_trace!("timer fired: id={}", id);
//! ```

use std::sync::LazyLock;
use std::time::Instant;

static DEBUG_TRACE_ENABLED: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("KEEPSAKE_DEBUG_TRACE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Whether debug tracing is enabled.
#[inline]
pub fn is_enabled() -> bool {
    *DEBUG_TRACE_ENABLED
}

/// Milliseconds since the first trace call, for correlating threads.
#[inline]
pub fn elapsed_ms() -> u64 {
    START_TIME.elapsed().as_millis() as u64
}

/// Print to stderr when `KEEPSAKE_DEBUG_TRACE=1`.
#[macro_export]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        if $crate::debug_trace::is_enabled() {
            eprintln!(
                "[KEEPSAKE {:>8}ms] {}",
                $crate::debug_trace::elapsed_ms(),
                format_args!($($arg)*)
            );
        }
    };
}
