use crate::record::ResponseRecord;
use crate::request::Resource;
use std::collections::BTreeMap;
use std::time::Duration;

/// Round trip times of one resource, in microseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RttSummary {
    pub count: u64,
    pub min_us: u128,
    pub max_us: u128,
    total_us: u128,
}

impl RttSummary {
    fn new() -> Self {
        Self {
            count: 0,
            min_us: u128::MAX,
            max_us: u128::MIN,
            total_us: 0,
        }
    }

    fn update(&mut self, rtt: Duration) {
        let cur = rtt.as_micros();
        if cur < self.min_us {
            self.min_us = cur;
        }
        if cur > self.max_us {
            self.max_us = cur;
        }
        self.total_us += cur;
        self.count += 1;
    }

    #[inline]
    #[must_use]
    pub fn mean_us(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_us as f64 / self.count as f64
    }
}

/// Per resource round trip summary of one awaited cycle.
#[derive(Debug, Default, Clone)]
pub struct CycleStatistics {
    per_resource: BTreeMap<Resource, RttSummary>,
}

impl CycleStatistics {
    pub fn record(&mut self, record: &ResponseRecord) {
        self.per_resource
            .entry(record.resource)
            .or_insert_with(RttSummary::new)
            .update(record.rtt);
    }

    #[must_use]
    pub fn get(&self, resource: Resource) -> Option<&RttSummary> {
        self.per_resource.get(&resource)
    }

    pub fn log(&self, cycle: u64) {
        for (resource, summary) in &self.per_resource {
            tracing::info!(
                cycle,
                resource = resource.label(),
                count = summary.count,
                min_us = u64::try_from(summary.min_us).unwrap_or(u64::MAX),
                mean_us = summary.mean_us(),
                max_us = u64::try_from(summary.max_us).unwrap_or(u64::MAX),
                "rtt [min, mean, max]"
            );
        }
    }
}
