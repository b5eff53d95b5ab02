//! Bounded rolling windows backing the charts.

use std::collections::VecDeque;
use std::fmt;

use crate::error::DashError;

/// Points kept per lane before the oldest is evicted.
pub const WINDOW_CAPACITY: usize = 100;

/// Append, then trim back to `cap` from the front.
pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    dq.push_back(v);
    if dq.len() > cap {
        dq.pop_front();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneId {
    Latency,
    Throughput,
    Power,
    Obstruction,
}

impl LaneId {
    pub fn name(self) -> &'static str {
        match self {
            LaneId::Latency => "latency",
            LaneId::Throughput => "throughput",
            LaneId::Power => "power",
            LaneId::Obstruction => "obstruction",
        }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One rolling series: a label sequence (the x axis) and one or more value
/// sequences of the same length.
#[derive(Debug, Clone)]
pub struct Lane {
    id: LaneId,
    cap: usize,
    labels: VecDeque<String>,
    series: Vec<VecDeque<f64>>,
}

impl Lane {
    pub fn new(id: LaneId, cap: usize, sub_series: usize) -> Self {
        let cap = cap.max(1);
        Self {
            id,
            cap,
            labels: VecDeque::with_capacity(cap + 1),
            series: (0..sub_series.max(1))
                .map(|_| VecDeque::with_capacity(cap + 1))
                .collect(),
        }
    }

    pub fn id(&self) -> LaneId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn sub_series(&self) -> usize {
        self.series.len()
    }

    pub fn labels(&self) -> &VecDeque<String> {
        &self.labels
    }

    pub fn series(&self, i: usize) -> Option<&VecDeque<f64>> {
        self.series.get(i)
    }

    pub fn latest(&self, i: usize) -> Option<f64> {
        self.series.get(i).and_then(|s| s.back().copied())
    }

    /// Append one point (one value per sub-series). A wrong value count is
    /// rejected before anything is touched so lengths never diverge.
    pub fn append(&mut self, label: &str, values: &[f64]) -> Result<(), DashError> {
        if values.len() != self.series.len() {
            return Err(DashError::ArityMismatch {
                lane: self.id,
                expected: self.series.len(),
                got: values.len(),
            });
        }
        push_capped(&mut self.labels, label.to_string(), self.cap);
        for (s, &v) in self.series.iter_mut().zip(values) {
            push_capped(s, v, self.cap);
        }
        Ok(())
    }
}
