use std::thread;
use std::time::Duration;

/// Backoff before the retry that follows a failed `attempt` (0-indexed): `2^attempt` seconds
///
/// Saturates at `u64::MAX` seconds once the shift would overflow.
pub fn backoff_delay(attempt: usize) -> Duration {
    let secs = u32::try_from(attempt)
        .ok()
        .and_then(|shift| 1_u64.checked_shl(shift))
        .unwrap_or(u64::MAX);
    Duration::from_secs(secs)
}

/// Blocking wait between attempts, swappable so tests never really sleep
pub trait Delay {
    fn wait(&self, duration: Duration);
}

impl<T: Delay + ?Sized> Delay for &T {
    fn wait(&self, duration: Duration) {
        (**self).wait(duration)
    }
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn wait(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Returns immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn wait(&self, _duration: Duration) {}
}
