/// Performance measurement utilities
/// Draw calls and tessellation passes are timed and logged for analysis
pub mod profiling;

pub use profiling::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};

use std::time::{Duration, Instant};

pub struct PerfTimer {
    name: &'static str,
    start: Instant,
}

impl PerfTimer {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        log::debug!("[perf] {}: {}μs", self.name, self.elapsed().as_micros());
    }
}

/// Per-frame timing accumulator
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfStats {
    pub tessellation_us: f64,
    pub vertex_stage_us: f64,
    pub rasterization_us: f64,
    pub total_us: f64,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn share(&self, part: f64) -> f64 {
        if self.total_us > 0.0 {
            part / self.total_us * 100.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        log::info!("========== PERFORMANCE SUMMARY ==========");
        log::info!(
            "Tessellation:    {:8.2}μs ({:5.1}%)",
            self.tessellation_us,
            self.share(self.tessellation_us)
        );
        log::info!(
            "Vertex stages:   {:8.2}μs ({:5.1}%)",
            self.vertex_stage_us,
            self.share(self.vertex_stage_us)
        );
        log::info!(
            "Rasterization:   {:8.2}μs ({:5.1}%)",
            self.rasterization_us,
            self.share(self.rasterization_us)
        );
        log::info!("Total:           {:8.2}μs", self.total_us);
    }
}

/// Macro for easy performance measurement
#[macro_export]
macro_rules! perf_scope {
    ($name:expr) => {
        let _timer = $crate::perf::PerfTimer::new($name);
    };
}
