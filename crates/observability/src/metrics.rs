//! Dispatch metric collection
//!
//! Prometheus recording helpers plus an in-memory aggregator used for the
//! end-of-run summary.

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

/// Record one inbound notification entering the dispatcher
pub fn record_notification_received(event_type: &str) {
    counter!(
        "notify_mcast_notifications_total",
        "event_type" => event_type.to_string()
    )
    .increment(1);
}

/// Record one event route matching an inbound notification
pub fn record_event_matched(event: &str) {
    counter!(
        "notify_mcast_events_matched_total",
        "event" => event.to_string()
    )
    .increment(1);
}

/// Record delivery outcome counters for one target
pub fn record_deliveries(topic: &str, delivered: u64, failed: u64) {
    counter!(
        "notify_mcast_deliveries_total",
        "topic" => topic.to_string(),
        "status" => "success"
    )
    .increment(delivered);
    counter!(
        "notify_mcast_deliveries_total",
        "topic" => topic.to_string(),
        "status" => "failure"
    )
    .increment(failed);
}

/// Record unsupported-priority skips for one target
pub fn record_unsupported(topic: &str, skipped: u64) {
    counter!(
        "notify_mcast_unsupported_total",
        "topic" => topic.to_string()
    )
    .increment(skipped);
}

/// Record queue-full drops for one target
pub fn record_dropped(topic: &str, dropped: u64) {
    counter!(
        "notify_mcast_dropped_total",
        "topic" => topic.to_string()
    )
    .increment(dropped);
}

/// Record a target queue depth
pub fn record_queue_depth(topic: &str, depth: usize) {
    gauge!(
        "notify_mcast_queue_depth",
        "topic" => topic.to_string()
    )
    .set(depth as f64);
}

/// Record the fan-out breadth of one dispatched notification
pub fn record_fanout_breadth(targets: usize) {
    histogram!("notify_mcast_fanout_breadth").record(targets as f64);
}

/// Dispatch metrics aggregator
///
/// Accumulates counters in memory for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct DispatchAggregator {
    /// Total notifications seen
    pub notifications: u64,

    /// Notifications that matched at least one event route
    pub matched: u64,

    /// Successful target deliveries
    pub delivered: u64,

    /// Failed target deliveries
    pub failed: u64,

    /// Deliveries dropped on full queues
    pub dropped: u64,

    /// Unsupported-priority skips
    pub unsupported: u64,

    /// Per-topic delivery counts
    pub topic_counts: HashMap<String, u64>,

    /// Fan-out breadth statistics (targets per matched notification)
    pub fanout_stats: RunningStats,
}

impl DispatchAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one dispatched notification and its fan-out breadth
    pub fn record_notification(&mut self, targets: usize) {
        self.notifications += 1;
        if targets > 0 {
            self.matched += 1;
            self.fanout_stats.push(targets as f64);
        }
        record_fanout_breadth(targets);
    }

    /// Absorb the final counters of one target
    pub fn record_target(
        &mut self,
        topic: &str,
        delivered: u64,
        failed: u64,
        dropped: u64,
        unsupported: u64,
    ) {
        self.delivered += delivered;
        self.failed += failed;
        self.dropped += dropped;
        self.unsupported += unsupported;
        *self.topic_counts.entry(topic.to_string()).or_insert(0) += delivered;
        record_deliveries(topic, delivered, failed);
        record_dropped(topic, dropped);
        record_unsupported(topic, unsupported);
    }

    /// Generate summary report
    pub fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            notifications: self.notifications,
            matched: self.matched,
            delivered: self.delivered,
            failed: self.failed,
            dropped: self.dropped,
            unsupported: self.unsupported,
            match_rate: if self.notifications > 0 {
                self.matched as f64 / self.notifications as f64 * 100.0
            } else {
                0.0
            },
            fanout: StatsSummary::from(&self.fanout_stats),
            topic_counts: self.topic_counts.clone(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Dispatch summary
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub notifications: u64,
    pub matched: u64,
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
    pub unsupported: u64,
    pub match_rate: f64,
    pub fanout: StatsSummary,
    pub topic_counts: HashMap<String, u64>,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Notifications: {}", self.notifications)?;
        writeln!(
            f,
            "Matched: {} ({:.2}%)",
            self.matched, self.match_rate
        )?;
        writeln!(f, "Deliveries: {}", self.delivered)?;
        writeln!(f, "Failures: {}", self.failed)?;
        writeln!(f, "Dropped (queue full): {}", self.dropped)?;
        writeln!(f, "Unsupported-priority skips: {}", self.unsupported)?;
        writeln!(f, "Fan-out breadth: {}", self.fanout)?;

        if !self.topic_counts.is_empty() {
            writeln!(f, "Deliveries per topic:")?;
            let mut topics: Vec<_> = self.topic_counts.iter().collect();
            topics.sort();
            for (topic, count) in topics {
                writeln!(f, "  {}: {}", topic, count)?;
            }
        }

        Ok(())
    }
}

/// Stats summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DispatchAggregator::new();

        aggregator.record_notification(2);
        aggregator.record_notification(0);
        aggregator.record_target("glance.repl.host1.image.upload", 2, 1, 0, 3);

        assert_eq!(aggregator.notifications, 2);
        assert_eq!(aggregator.matched, 1);
        assert_eq!(aggregator.delivered, 2);
        assert_eq!(aggregator.failed, 1);
        assert_eq!(aggregator.unsupported, 3);
        assert_eq!(
            aggregator
                .topic_counts
                .get("glance.repl.host1.image.upload"),
            Some(&2)
        );
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DispatchAggregator::new();
        aggregator.record_notification(2);
        aggregator.record_target("t1", 2, 0, 0, 0);

        let summary = aggregator.summary();
        let output = format!("{}", summary);
        assert!(output.contains("Notifications: 1"));
        assert!(output.contains("100.00%"));
        assert!(output.contains("t1: 2"));
    }

    #[test]
    fn test_aggregator_reset() {
        let mut aggregator = DispatchAggregator::new();
        aggregator.record_notification(1);
        aggregator.reset();
        assert_eq!(aggregator.notifications, 0);
        assert!(aggregator.topic_counts.is_empty());
    }
}
