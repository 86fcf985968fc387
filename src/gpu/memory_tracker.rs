use std::sync::atomic::{AtomicU64, Ordering};

pub struct MemoryTracker {
    maximum: u64,
    current: AtomicU64,
}

// Doesn't require a mutable reference to update.
// Reserve first then check, rolling back on failure, so there is only one racing operation.

impl MemoryTracker {
    pub fn new(maximum: u64) -> Self {
        Self {
            maximum,
            current: AtomicU64::new(0),
        }
    }

    pub fn allocate(&self, size: u64) -> Result<(), String> {
        let prev = self.current.fetch_add(size, Ordering::AcqRel);
        let new = match prev.checked_add(size) {
            Some(v) => v,
            None => {
                self.current.fetch_sub(size, Ordering::AcqRel);
                return Err(format!(
                    "Memory allocation would overflow: current {} + size {}",
                    prev, size
                ));
            }
        };

        if new > self.maximum {
            self.current.fetch_sub(size, Ordering::AcqRel);
            return Err(format!(
                "Memory limit exceeded: tried to allocate {} bytes when {} of {} bytes are used",
                size, prev, self.maximum
            ));
        }

        Ok(())
    }

    pub fn deallocate(&self, size: u64) {
        self.current.fetch_sub(size, Ordering::AcqRel);
    }

    pub fn get_current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn get_available(&self) -> u64 {
        self.maximum.saturating_sub(self.get_current())
    }

    pub fn get_maximum(&self) -> u64 {
        self.maximum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_release_round_trip() {
        let tracker = MemoryTracker::new(100);
        tracker.allocate(60).unwrap();
        assert_eq!(tracker.get_current(), 60);
        assert_eq!(tracker.get_available(), 40);
        tracker.deallocate(60);
        assert_eq!(tracker.get_current(), 0);
    }

    #[test]
    fn over_limit_is_rejected_and_rolled_back() {
        let tracker = MemoryTracker::new(100);
        tracker.allocate(80).unwrap();
        assert!(tracker.allocate(21).is_err());
        assert_eq!(tracker.get_current(), 80);
    }
}
