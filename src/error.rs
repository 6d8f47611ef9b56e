//! Error codes shared by every error enum in the crate.
//!
//! DESIGN
//! ======
//! Each `thiserror` enum maps its variants to a stable, grepable `E_*` code
//! and declares whether retrying the same call can succeed. Callers log the
//! code next to the message; nothing here is ever fatal to the process.

/// Stable machine-readable classification for an error.
pub trait ErrorCode {
    /// Grepable code such as `E_DATABASE`.
    fn error_code(&self) -> &'static str;

    /// Whether the same call may succeed if issued again.
    fn retryable(&self) -> bool {
        false
    }
}
