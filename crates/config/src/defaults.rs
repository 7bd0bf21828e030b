pub fn default_enabled() -> bool {
    true
}

pub fn default_service_name() -> String {
    "stockfeed".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_max_retries() -> u32 {
    3
}

pub fn default_retry_interval_ms() -> u64 {
    1000
}

pub fn default_poll_timeout_ms() -> u64 {
    1000
}

pub fn default_idle_threshold() -> u32 {
    10
}

pub fn default_window_capacity() -> usize {
    15
}

pub fn default_channel_capacity() -> usize {
    1024
}

pub fn default_batch_size() -> usize {
    5
}

pub fn default_batches() -> usize {
    10
}

pub fn default_interval_ms() -> u64 {
    1000
}

pub fn default_min_price() -> f64 {
    10.0
}

pub fn default_max_price() -> f64 {
    1000.0
}

pub fn default_max_quantity() -> u64 {
    100
}
