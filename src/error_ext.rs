//! Logging conversions from `Result` to `Option`.
//!
//! Settings writes that must not surface to the user still leave a trace in
//! the log through these helpers instead of a bare `.ok()`.

use tracing::{error, warn};

pub trait ResultExt<T, E: std::fmt::Display> {
    /// Like `.ok()`, logging the error at error level.
    fn ok_logged(self, context: &str) -> Option<T>;

    /// Like `.ok()`, logging the error at warn level. Used for best-effort
    /// unsets.
    fn ok_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn ok_logged(self, context: &str) -> Option<T> {
        self.map_err(|e| error!(context = %context, error = %e, "Operation failed"))
            .ok()
    }

    fn ok_warn(self, context: &str) -> Option<T> {
        self.map_err(|e| warn!(context = %context, error = %e, "Operation failed, ignoring"))
            .ok()
    }
}
