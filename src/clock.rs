//! Monotonic time source consumed by the widget loops.

/// Millisecond tick source plus the blocking tick sleep.
///
/// The same timestamps feed the repeat-hold threshold, the live-clock
/// seconds advance, and the separator blink phase, so implementations must
/// be monotonic for the lifetime of a widget invocation.
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary epoch.
    fn ticks_ms(&mut self) -> u64;

    /// Block for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}
