//! Tracing initialization for applications and tests using the library.
//!
//! The subscriber is installed thread-locally so an application that already
//! owns a global subscriber keeps it.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Install a thread-local subscriber for motion logs.
///
/// Respects `RUST_LOG` (defaults to `info`) and prints compact lines
/// without target or source location. Keep the returned guard alive for as
/// long as logs should be collected.
///
/// # Example
/// ```no_run
/// use arm_motion_lib::init_tracing;
///
/// let _guard = init_tracing();
/// ```
pub fn init_tracing() -> DefaultGuard {
    init_tracing_with("info")
}

/// Like [`init_tracing`] with `default_directives` used when `RUST_LOG` is
/// unset, e.g. `"arm_motion_lib=debug"`.
pub fn init_tracing_with(default_directives: &str) -> DefaultGuard {
    use tracing_subscriber::layer::SubscriberExt;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_test_writer();

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(fmt_layer);

    tracing::subscriber::set_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_scopes_subscriber() {
        let guard = init_tracing();
        tracing::info!("tracing initialized");
        drop(guard);
    }

    #[test]
    fn test_default_directives() {
        let _guard = init_tracing_with("arm_motion_lib=debug");
        tracing::debug!(target: "arm_motion_lib", "debug enabled");
    }
}
