/// Monotonic audio time reference.
///
/// `current_time` is in seconds and does not advance while suspended.
pub trait AudioClockPort: Send + Sync {
    fn current_time(&self) -> f64;
    fn suspend(&self);
    fn resume(&self);
}
