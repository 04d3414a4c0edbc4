/// Dispatcher configuration.
///
/// Controls the global post-data cap applied on top of each service's own
/// admission limit.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Upper bound on post data for any service, in bytes. A service's own
    /// admission limit is clamped to this value.
    pub max_post_data_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_post_data_size: 1024 * 1024, // 1 MiB
        }
    }
}
