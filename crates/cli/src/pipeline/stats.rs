//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::DispatchAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total notifications processed
    pub messages_processed: u64,

    /// Input lines skipped because they could not be parsed
    pub parse_errors: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of distinct publish targets
    pub target_count: usize,

    /// Dispatch metrics aggregator
    pub dispatch: DispatchAggregator,
}

impl PipelineStats {
    /// Calculate notifications per second throughput
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.messages_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Notifications: {}", self.messages_processed);
        println!("Parse errors: {}", self.parse_errors);
        println!("Rate: {:.2}/s", self.rate());
        println!("Targets: {}", self.target_count);
        println!();
        print!("{}", self.dispatch.summary());
        println!();
    }
}
