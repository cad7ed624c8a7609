use std::time::{Duration, Instant};

/// Enforces a minimum pause between the end of one request and the start of
/// the next by blocking the calling thread.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_done: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_done: None,
        }
    }

    /// Run `request` once `min_interval` has passed since the previous one
    /// finished.
    pub fn call<T>(&mut self, request: impl FnOnce() -> T) -> T {
        if let Some(last) = self.last_done {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }

        let result = request();
        self.last_done = Some(Instant::now());
        result
    }
}
