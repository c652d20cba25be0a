/// Host-side navigation sink.
///
/// The crate never drives a browser itself. Forced redirects (session
/// teardown, OAuth outcomes, provider hand-off) are delivered to the
/// embedding shell through this seam, which makes them observable in tests.
pub trait Navigator: Send + Sync {
    /// Send the host to `location`, either an app route (`/login`) or an
    /// absolute URL (the provider initiation endpoint).
    fn navigate(&self, location: &str);
}

/// Navigator for hosts without a navigation surface; requests are logged
/// and dropped.
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, location: &str) {
        tracing::debug!(location, "navigation requested but no navigator is installed");
    }
}
