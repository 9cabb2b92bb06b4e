//! Facade configuration.

use std::time::Duration;

/// Default interval between active-download probe cycles.
const DEFAULT_ACTIVE_DOWNLOADS_CHECK_INTERVAL: Duration = Duration::from_millis(300);

/// Configuration for creating a download facade.
///
/// Fixed at construction; there is no runtime reconfiguration.
#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// Name used to distinguish this facade instance in logs.
    pub namespace: String,
    /// Interval between active-download probe cycles, measured from the
    /// completion of the previous cycle.
    pub active_downloads_check_interval: Duration,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            namespace: "main".to_string(),
            active_downloads_check_interval: DEFAULT_ACTIVE_DOWNLOADS_CHECK_INTERVAL,
        }
    }
}

impl FacadeConfig {
    /// Create a config with the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Set the probe interval.
    #[must_use]
    pub const fn with_active_downloads_check_interval(mut self, interval: Duration) -> Self {
        self.active_downloads_check_interval = interval;
        self
    }
}
