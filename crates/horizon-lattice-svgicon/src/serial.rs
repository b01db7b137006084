//! Process-wide serial numbers for cache invalidation.
//!
//! Every icon engine holds a serial number that is part of each pixmap cache
//! key it produces. A new number is drawn whenever the engine is created,
//! cloned, or its sources change, so keys computed for old content can never
//! match again.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global allocator instance.
static SERIAL_ALLOCATOR: OnceLock<SerialAllocator> = OnceLock::new();

/// Monotonic allocator of unique serial numbers.
///
/// Use [`SerialAllocator::global`] for engine serials; separate instances
/// are only useful in isolation (tests).
#[derive(Debug)]
pub struct SerialAllocator {
    next: AtomicU64,
}

impl SerialAllocator {
    /// Create an allocator whose first number is `first`.
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Get the process-wide allocator.
    pub fn global() -> &'static SerialAllocator {
        SERIAL_ALLOCATOR.get_or_init(|| SerialAllocator::starting_at(1))
    }

    /// Allocate the next number. Never returns the same value twice.
    pub fn allocate_next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Allocate a serial from the global allocator.
pub(crate) fn next_serial() -> u64 {
    SerialAllocator::global().allocate_next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_allocate_is_monotonic() {
        let alloc = SerialAllocator::starting_at(10);
        assert_eq!(alloc.allocate_next(), 10);
        assert_eq!(alloc.allocate_next(), 11);
        assert_eq!(alloc.allocate_next(), 12);
    }

    #[test]
    fn test_global_never_repeats() {
        let a = next_serial();
        let b = next_serial();
        assert!(b > a);
    }

    #[test]
    fn test_unique_across_threads() {
        let alloc = Arc::new(SerialAllocator::starting_at(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let alloc = Arc::clone(&alloc);
                std::thread::spawn(move || {
                    (0..250)
                        .map(|_| alloc.allocate_next())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for serial in handle.join().unwrap() {
                assert!(seen.insert(serial), "serial {serial} allocated twice");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
