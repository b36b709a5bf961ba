pub mod change;
pub mod error;
pub mod event;
pub mod metric;
pub mod record;

/// Current Unix time in whole seconds.
pub fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
