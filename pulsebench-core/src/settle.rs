//! Heap Settling
//!
//! Runs after every timed batch, outside the timed window, so allocation
//! pressure from one batch does not bleed into the next. The step is
//! blocking and never skipped. Rust has no tracing collector, so the default
//! is a no-op; environments with an arena or pooling allocator can plug a
//! reset hook in here.

/// Post-batch heap-settling hook.
pub trait HeapSettle {
    /// Settle the heap. Called once per batch, after the clock is stopped.
    fn settle(&mut self);
}

/// Default settler: does nothing.
#[derive(Debug, Default)]
pub struct NoopSettle;

impl HeapSettle for NoopSettle {
    fn settle(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSettle(u32);

    impl HeapSettle for CountingSettle {
        fn settle(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_custom_settler() {
        let mut settle = CountingSettle(0);
        settle.settle();
        settle.settle();
        assert_eq!(settle.0, 2);
    }
}
