use std::time::{Duration, Instant};

/// Trailing-edge debounce helper.
///
/// Every `push` replaces the pending value and restarts the delay; the
/// value is only released by `poll` once the delay has passed without a
/// newer push. Time is passed in so callers can drive it from their own
/// event loop.
pub struct Debouncer<T> {
    pending: Option<T>,
    deadline: Option<Instant>,
    debounce_duration: Duration,
}

impl<T> Debouncer<T> {
    /// Create a new debouncer with the given quiet period
    pub fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: None,
            deadline: None,
            debounce_duration,
        }
    }

    /// Replace the pending value and restart the quiet period
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.debounce_duration);
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Take the pending value if its quiet period is over
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Drop the pending value without releasing it
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debouncer() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();

        debouncer.push(1, start);
        assert!(debouncer.is_pending());

        // Still in debounce period
        assert_eq!(debouncer.poll(start + Duration::from_millis(50)), None);

        assert_eq!(debouncer.poll(start + Duration::from_millis(100)), Some(1));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_millis(200)), None);
    }

    #[test]
    fn test_debouncer_keeps_latest() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let start = Instant::now();

        debouncer.push("first", start);
        debouncer.push("second", start + Duration::from_millis(80));
        debouncer.push("third", start + Duration::from_millis(160));

        // The first deadline has passed but every push restarted the window
        assert_eq!(debouncer.poll(start + Duration::from_millis(180)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(260))
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(260)), Some("third"));
    }

    #[test]
    fn test_debouncer_cancel() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        let start = Instant::now();

        debouncer.push(7, start);
        debouncer.cancel();

        assert!(debouncer.deadline().is_none());
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_debouncer_multiple_cycles() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let start = Instant::now();

        // Cycle 1
        debouncer.push(1, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(60)), Some(1));

        // Cycle 2
        debouncer.push(2, start + Duration::from_millis(70));
        assert_eq!(debouncer.poll(start + Duration::from_millis(100)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(120)), Some(2));
    }
}
