//! Run-level counters.

/// Counters collected over one [`Run::execute`](crate::Run::execute).
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Origins whose walk completed.
    pub origins_processed: u64,
    /// Origins reported as failures.
    pub origins_failed: u64,
    /// Result rows emitted.
    pub rows_emitted: u64,
    /// Rows stopped by the threshold.
    pub threshold_stops: u64,
    /// Rows stopped at a headwater.
    pub headwater_stops: u64,
    /// Confluences where a failed split fell back to persist.
    pub split_fallbacks: u64,
    /// Worker threads used.
    pub workers: usize,
    /// Wall-clock time for the whole execution.
    pub total_us: u64,
}

impl RunMetrics {
    /// Origins seen, successful or not.
    pub fn origins_total(&self) -> u64 {
        self.origins_processed + self.origins_failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.origins_total(), 0);
        assert_eq!(m.rows_emitted, 0);
        assert_eq!(m.total_us, 0);
    }

    #[test]
    fn total_counts_failures() {
        let m = RunMetrics {
            origins_processed: 3,
            origins_failed: 2,
            ..RunMetrics::default()
        };
        assert_eq!(m.origins_total(), 5);
    }
}
