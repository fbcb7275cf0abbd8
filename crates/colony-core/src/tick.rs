/// Explicit tick time, threaded through every call that needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TickContext {
    pub tick: u64,
}

impl TickContext {
    pub fn new(tick: u64) -> Self {
        Self { tick }
    }

    pub fn next(self) -> Self {
        Self {
            tick: self.tick + 1,
        }
    }

    /// True on ticks that are a multiple of `interval`. An interval of zero is treated as one.
    pub fn every(&self, interval: u64) -> bool {
        self.tick % interval.max(1) == 0
    }

    pub fn ticks_since(&self, earlier: u64) -> u64 {
        self.tick.saturating_sub(earlier)
    }
}
