/// Pipeline counters for profiling builds.
/// Incremented through `count_call!`/`count_add!`, which compile to nothing
/// unless the `profiling` feature is enabled.
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters shared by every draw of the process.
pub struct FunctionCounters {
    // Vertex stages
    pub vertices_transformed: AtomicU64,
    pub disposed_vertices_skipped: AtomicU64,

    // Polyline tessellation
    pub polyline_near_clips: AtomicU64,
    pub polyline_degenerate_fallbacks: AtomicU64,
    pub polyline_bevels: AtomicU64,
    pub polyline_clamped_miters: AtomicU64,

    // Rasterization
    pub triangles_near_clipped: AtomicU64,
    pub triangles_culled: AtomicU64,
    pub fragments_written: AtomicU64,
    pub fragments_discarded: AtomicU64,

    pub framebuffer_clear_calls: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            vertices_transformed: AtomicU64::new(0),
            disposed_vertices_skipped: AtomicU64::new(0),
            polyline_near_clips: AtomicU64::new(0),
            polyline_degenerate_fallbacks: AtomicU64::new(0),
            polyline_bevels: AtomicU64::new(0),
            polyline_clamped_miters: AtomicU64::new(0),
            triangles_near_clipped: AtomicU64::new(0),
            triangles_culled: AtomicU64::new(0),
            fragments_written: AtomicU64::new(0),
            fragments_discarded: AtomicU64::new(0),
            framebuffer_clear_calls: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 11] {
        [
            &self.vertices_transformed,
            &self.disposed_vertices_skipped,
            &self.polyline_near_clips,
            &self.polyline_degenerate_fallbacks,
            &self.polyline_bevels,
            &self.polyline_clamped_miters,
            &self.triangles_near_clipped,
            &self.triangles_culled,
            &self.fragments_written,
            &self.fragments_discarded,
            &self.framebuffer_clear_calls,
        ]
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CounterSnapshot {
            vertices_transformed: load(&self.vertices_transformed),
            disposed_vertices_skipped: load(&self.disposed_vertices_skipped),
            polyline_near_clips: load(&self.polyline_near_clips),
            polyline_degenerate_fallbacks: load(&self.polyline_degenerate_fallbacks),
            polyline_bevels: load(&self.polyline_bevels),
            polyline_clamped_miters: load(&self.polyline_clamped_miters),
            triangles_near_clipped: load(&self.triangles_near_clipped),
            triangles_culled: load(&self.triangles_culled),
            fragments_written: load(&self.fragments_written),
            fragments_discarded: load(&self.fragments_discarded),
            framebuffer_clear_calls: load(&self.framebuffer_clear_calls),
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub vertices_transformed: u64,
    pub disposed_vertices_skipped: u64,
    pub polyline_near_clips: u64,
    pub polyline_degenerate_fallbacks: u64,
    pub polyline_bevels: u64,
    pub polyline_clamped_miters: u64,
    pub triangles_near_clipped: u64,
    pub triangles_culled: u64,
    pub fragments_written: u64,
    pub fragments_discarded: u64,
    pub framebuffer_clear_calls: u64,
}

impl CounterSnapshot {
    /// Log a formatted report at info level.
    pub fn log_report(&self) {
        log::info!("=== Performance Counters Report ===");
        log::info!("vertex stages:");
        log::info!("  vertices transformed:       {:12}", self.vertices_transformed);
        log::info!("  disposed vertices skipped:  {:12}", self.disposed_vertices_skipped);
        log::info!("polyline tessellation:");
        log::info!("  near-plane clips:           {:12}", self.polyline_near_clips);
        log::info!("  degenerate fallbacks:       {:12}", self.polyline_degenerate_fallbacks);
        log::info!("  bevel joins:                {:12}", self.polyline_bevels);
        log::info!("  clamped miters:             {:12}", self.polyline_clamped_miters);
        log::info!("rasterization:");
        log::info!("  triangles near-clipped:     {:12}", self.triangles_near_clipped);
        log::info!("  triangles culled:           {:12}", self.triangles_culled);
        log::info!("  fragments written:          {:12}", self.fragments_written);
        log::info!("  fragments discarded:        {:12}", self.fragments_discarded);
        if self.fragments_written + self.fragments_discarded > 0 {
            let discard_rate = self.fragments_discarded as f64
                / (self.fragments_written + self.fragments_discarded) as f64
                * 100.0;
            log::info!("  discard rate:               {:11.2}%", discard_rate);
        }
        log::info!("  framebuffer clear calls:    {:12}", self.framebuffer_clear_calls);
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_every_counter() {
        let counters = FunctionCounters::new();
        counters.fragments_written.fetch_add(3, Ordering::Relaxed);
        counters.polyline_bevels.fetch_add(1, Ordering::Relaxed);
        assert_eq!(counters.snapshot().fragments_written, 3);
        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
