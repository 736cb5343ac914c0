//! Process-wide shutdown flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// A one-shot `build` exits immediately; `watch` polls [`is_shutdown`]
/// between rebuilds and leaves its loop on its own.
pub fn setup_shutdown_handler(watching: bool) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        SHUTDOWN.store(true, Ordering::SeqCst);
        if !watching {
            std::process::exit(130);
        }
        crate::log!("watch"; "shutting down...");
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
