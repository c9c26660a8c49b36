// This file implements the application's logging system.
// It provides macros for different log levels (INFO, WARN, ERROR, DEBUG).
// Every message goes to stderr so that stdout stays reserved for command results
// (the version listing, the current version), which keeps `tfvm list` pipeable.

use std::sync::OnceLock; // Ensures the DEBUG_ENABLED flag is initialized exactly once.
use std::sync::atomic::{AtomicBool, Ordering}; // Thread-safe control of the debug flag.

// `log_info!` for general progress messages.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => ({
        use colored::Colorize as _;
        eprintln!("{} {}", "[INFO]".bright_green(), format!($($arg)*))
    });
}

// `log_warn!` for non-fatal conditions the user should know about.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => ({
        use colored::Colorize as _;
        eprintln!("{} {}", "[WARN]".bright_yellow(), format!($($arg)*))
    });
}

// `log_error!` for failures. The CLI renders every command error through this macro.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => ({
        use colored::Colorize as _;
        eprintln!("{} {}", "[ERROR]".bright_red(), format!($($arg)*))
    });
}

// `log_debug!` for detailed internal tracing of the install pipeline.
// Messages are only printed if debug mode is enabled via `is_debug_enabled()`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
            use colored::Colorize as _;
            eprintln!("{} {}", "[DEBUG]".dimmed(), format!($($arg)*));
        }
    };
}

// Global flag to control debug logging, initialized once.
static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Initializes the logger, setting the global debug mode.
/// Called once by `main` right after argument parsing.
///
/// # Arguments
/// * `debug`: If `true`, enables debug logging; otherwise only info, warn and error messages are printed.
pub fn init(debug: bool) {
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug))
        .store(debug, Ordering::Relaxed);

    log_debug!("[TFVM::Logger] Logger initialized in DEBUG mode");
}

/// Checks if debug logging is currently enabled.
/// Used by the `log_debug!` macro; defaults to `false` when `init` was never called
/// (library use, tests).
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get()
        .map(|f| f.load(Ordering::Relaxed))
        .unwrap_or(false)
}
