use std::cell::Cell;
use std::time::Instant;

/// CPU accounting for the current tick.
///
/// Consulted once per agent slot, so implementations must be cheap.
pub trait CpuMeter {
    /// CPU consumed so far this tick.
    fn used(&self) -> f64;

    /// The platform's per-tick allowance.
    fn limit(&self) -> f64;
}

impl<T: CpuMeter + ?Sized> CpuMeter for &T {
    fn used(&self) -> f64 {
        (**self).used()
    }

    fn limit(&self) -> f64 {
        (**self).limit()
    }
}

/// A meter advanced explicitly by the caller.
///
/// Uses interior mutability so a shared reference can be handed to the scheduler
/// while the world (or a test) keeps charging it.
#[derive(Debug, Default)]
pub struct ManualCpu {
    used: Cell<f64>,
    limit: f64,
}

impl ManualCpu {
    pub fn new(limit: f64) -> Self {
        Self {
            used: Cell::new(0.0),
            limit,
        }
    }

    pub fn charge(&self, amount: f64) {
        self.used.set(self.used.get() + amount.max(0.0));
    }

    pub fn set_used(&self, used: f64) {
        self.used.set(used);
    }

    pub fn reset(&self) {
        self.used.set(0.0);
    }
}

impl CpuMeter for ManualCpu {
    fn used(&self) -> f64 {
        self.used.get()
    }

    fn limit(&self) -> f64 {
        self.limit
    }
}

/// Elapsed wall-clock milliseconds since the meter was (re)started.
#[derive(Debug, Clone, Copy)]
pub struct WallClockCpu {
    started: Instant,
    limit_ms: f64,
}

impl WallClockCpu {
    pub fn start(limit_ms: f64) -> Self {
        Self {
            started: Instant::now(),
            limit_ms,
        }
    }

    pub fn restart(&mut self) {
        self.started = Instant::now();
    }
}

impl CpuMeter for WallClockCpu {
    fn used(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn limit(&self) -> f64 {
        self.limit_ms
    }
}
