//! Logging setup shared by the binder crates.
//!
//! The level comes from the `BINDER_LOG` environment variable:
//! - `off` (default) - nothing is emitted
//! - `error`, `warn`, `info`, `debug` - minimum level written to stderr
//!
//! Binaries call [`init_diagnostics`] once at startup, or
//! [`init_with_level`] when a command-line flag overrides the environment.

use std::sync::Once;

// Re-export emit so the macros resolve from any crate
pub use emit;

static INIT: Once = Once::new();

/// Environment variable consulted by [`init_diagnostics`].
pub const LOG_ENV: &str = "BINDER_LOG";

/// Parse a level name. `None` means logging is switched off.
///
/// Unknown names fall back to `Info` and return `false` as the second element
/// so the caller can mention the typo.
pub fn parse_level(name: &str) -> (Option<emit::Level>, bool) {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "off" => (None, true),
        "debug" => (Some(emit::Level::Debug), true),
        "info" => (Some(emit::Level::Info), true),
        "warn" => (Some(emit::Level::Warn), true),
        "error" => (Some(emit::Level::Error), true),
        _ => (Some(emit::Level::Info), false),
    }
}

/// Initialize diagnostics from `BINDER_LOG`. Later calls are ignored.
pub fn init_diagnostics() {
    let name = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
    let (level, known) = parse_level(&name);
    if !known {
        // Runs before the emitter exists, so this is the only way to say it
        eprintln!("Warning: unknown {LOG_ENV} value '{name}', using 'info'");
    }
    if let Some(level) = level {
        init_with_level(level);
    }
}

/// Initialize diagnostics at an explicit minimum level. Later calls are ignored.
pub fn init_with_level(level: emit::Level) {
    INIT.call_once(|| {
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime must outlive every emitting thread
        std::mem::forget(rt);
    });
}

/// Operations a user would want to see: pages written, sections bound.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Detailed tracing: container lookups, resolved paths, fragment sizes.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable problems: skipped sections, unknown theme values.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures that abort an operation.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}
