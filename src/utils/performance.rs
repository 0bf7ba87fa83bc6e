//! Performance measurement utilities
//!
//! Timing for paint and layout calls. In the browser the clock is
//! `performance.now()`; elsewhere it is a monotonic clock started on first use.

use std::collections::HashMap;

/// Milliseconds on a monotonic clock
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map_or(0.0, |performance| performance.now())
}

/// Milliseconds on a monotonic clock
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use once_cell::sync::Lazy;
    use std::time::Instant;

    static START: Lazy<Instant> = Lazy::new(Instant::now);
    START.elapsed().as_secs_f64() * 1000.0
}

/// Running totals for one operation
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OperationStats {
    pub count: u64,
    pub total_ms: f64,
    pub max_ms: f64,
    pub last_ms: f64,
}

impl OperationStats {
    fn record(&mut self, duration_ms: f64) {
        self.count += 1;
        self.total_ms += duration_ms;
        self.max_ms = self.max_ms.max(duration_ms);
        self.last_ms = duration_ms;
    }

    pub fn average_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

/// Performance monitor for measuring operation times
///
/// Keeps constant-size totals per operation, so a long-lived view can
/// measure every paint without growing.
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    measurements: HashMap<String, OperationStats>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_measurement(&mut self, operation: &str, duration_ms: f64) {
        match self.measurements.get_mut(operation) {
            Some(stats) => stats.record(duration_ms),
            None => {
                let mut stats = OperationStats::default();
                stats.record(duration_ms);
                self.measurements.insert(operation.to_string(), stats);
            }
        }
    }

    /// Run `f`, recording its wall time under `operation`
    pub fn measure<R>(&mut self, operation: &str, f: impl FnOnce() -> R) -> R {
        let start = now_ms();
        let result = f();
        let elapsed = now_ms() - start;
        self.record_measurement(operation, elapsed);
        if elapsed > 16.0 {
            log::warn!("{} took {:.1} ms", operation, elapsed);
        }
        result
    }

    pub fn get_average_time(&self, operation: &str) -> Option<f64> {
        self.measurements.get(operation).map(OperationStats::average_ms)
    }

    pub fn stats(&self, operation: &str) -> Option<OperationStats> {
        self.measurements.get(operation).copied()
    }

    pub fn sample_count(&self, operation: &str) -> u64 {
        self.measurements.get(operation).map_or(0, |stats| stats.count)
    }
}
