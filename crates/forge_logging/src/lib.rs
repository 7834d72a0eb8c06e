#![deny(missing_docs)]
//! Shared logging utilities for the forge workspace.
//!
//! This crate provides the `forge_*` logging macros used across the codebase,
//! the per-thread frame counter that stamps every record, and a minimal test
//! initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Frame number of the dispatch loop running on this thread.
    static FRAME: Cell<u64> = const { Cell::new(0) };
}

/// Sets the frame number for the current thread.
/// The dispatch loop calls this once per `Msg::Tick`.
pub fn set_frame(frame: u64) {
    FRAME.with(|v| v.set(frame));
}

/// Retrieves the frame number for the current thread.
/// Returns 0 on threads that never ran a frame (engine workers, tests).
pub fn frame() -> u64 {
    FRAME.with(|v| v.get())
}

/// Logs a trace-level message prefixed with the current frame.
#[macro_export]
macro_rules! forge_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[f{}] {}", $crate::frame(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message prefixed with the current frame.
#[macro_export]
macro_rules! forge_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[f{}] {}", $crate::frame(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message prefixed with the current frame.
#[macro_export]
macro_rules! forge_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[f{}] {}", $crate::frame(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message prefixed with the current frame.
#[macro_export]
macro_rules! forge_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[f{}] {}", $crate::frame(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message prefixed with the current frame.
#[macro_export]
macro_rules! forge_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[f{}] {}", $crate::frame(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{frame, set_frame};

    #[test]
    fn frame_is_per_thread() {
        set_frame(42);
        assert_eq!(frame(), 42);

        let other = std::thread::spawn(frame).join().unwrap();
        assert_eq!(other, 0);
    }
}
