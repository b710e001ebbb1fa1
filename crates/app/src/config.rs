use std::time::Duration;

/// Shelf categories offered by the screens.
pub const DEFAULT_CATEGORIES: [&str; 2] = ["Groceries", "Stationary"];

/// Runtime knobs of a client session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Upper bound on a single store round trip. Elapsing reports a
    /// retriable error to the user instead of hanging the screen.
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
        }
    }
}
