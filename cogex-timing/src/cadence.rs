use std::collections::VecDeque;
use std::time::Duration;

/// Statistics over the intervals between host polls
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceStats {
    pub samples: usize,
    pub mean_interval_ns: f64,
    pub jitter_ns: f64,
    pub min_interval_ns: u64,
    pub max_interval_ns: u64,
    pub polls_per_sec: f64,
}

/// Rolling record of how often the host re-invokes the engines. Trial
/// timeouts are only observed when a poll happens, so the worst interval
/// bounds how late a timeout can be recorded.
#[derive(Debug, Clone)]
pub struct CadenceMonitor {
    last_ns: Option<u64>,
    intervals: VecDeque<u64>,
    max_samples: usize,
}

impl CadenceMonitor {
    pub fn new(max_samples: usize) -> Self {
        Self {
            last_ns: None,
            intervals: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&mut self, now_ns: u64) {
        if let Some(last) = self.last_ns {
            if self.intervals.len() >= self.max_samples {
                self.intervals.pop_front();
            }
            self.intervals.push_back(now_ns.saturating_sub(last));
        }
        self.last_ns = Some(now_ns);
    }

    pub fn stats(&self) -> CadenceStats {
        let samples = self.intervals.len();
        if samples == 0 {
            return CadenceStats {
                samples: 0,
                mean_interval_ns: 0.0,
                jitter_ns: 0.0,
                min_interval_ns: 0,
                max_interval_ns: 0,
                polls_per_sec: 0.0,
            };
        }
        let avg = self.intervals.iter().map(|&ns| ns as f64).sum::<f64>() / samples as f64;
        let var = self
            .intervals
            .iter()
            .map(|&ns| (ns as f64 - avg).powi(2))
            .sum::<f64>()
            / samples as f64;
        CadenceStats {
            samples,
            mean_interval_ns: avg,
            jitter_ns: var.sqrt(),
            min_interval_ns: self.intervals.iter().copied().min().unwrap_or(0),
            max_interval_ns: self.intervals.iter().copied().max().unwrap_or(0),
            polls_per_sec: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }

    /// True if any recorded gap between polls was longer than `bound`.
    pub fn exceeds(&self, bound: Duration) -> bool {
        let bound = bound.as_nanos() as u64;
        self.intervals.iter().any(|&ns| ns > bound)
    }
}

impl Default for CadenceMonitor {
    fn default() -> Self {
        Self::new(1000)
    }
}
