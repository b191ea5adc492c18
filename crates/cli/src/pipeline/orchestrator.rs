//! Pipeline orchestrator - coordinates config, registry, and dispatch.
//!
//! Streams JSON-lines notifications from a file or stdin, delivers each
//! through the dispatcher, and drains the registry on completion.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as AnyhowContext, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use contracts::{Context, MulticastBlueprint, Notification};
use dispatcher::{MulticastDispatcher, TargetRegistry, TracingPrimary};
use observability::metrics::{
    record_event_matched, record_notification_received, record_queue_depth,
};
use observability::DispatchAggregator;

use super::PipelineStats;

/// Where notification lines are read from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Standard input
    Stdin,
    /// JSON-lines file
    File(PathBuf),
}

impl InputSource {
    /// Interpret a CLI input argument ('-' means stdin)
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The multicast blueprint configuration
    pub blueprint: MulticastBlueprint,

    /// Notification input source
    pub input: InputSource,

    /// Maximum number of notifications to process (None = unlimited)
    pub max_messages: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build the routing table; construction failure aborts startup
        info!(
            events = blueprint.events.len(),
            transport = ?blueprint.transport.kind,
            "Building multicast registry..."
        );

        let registry = Arc::new(
            TargetRegistry::connect(blueprint)
                .await
                .context("Failed to build multicast registry")?,
        );

        info!(
            targets = registry.target_count(),
            publisher_id = %registry.publisher_id(),
            "Registry ready"
        );

        let dispatcher = MulticastDispatcher::new(
            TracingPrimary::new(),
            Arc::clone(&registry),
            blueprint.retry,
        );

        // Stream notifications
        let reader = self.open_input().await?;
        let (processed, parse_errors, mut aggregator) =
            Self::dispatch_stream(&dispatcher, reader, self.config.max_messages).await?;

        // Drain target queues and collect final per-target counters
        drop(dispatcher);
        let registry = Arc::try_unwrap(registry)
            .map_err(|_| anyhow::anyhow!("Registry still referenced at shutdown"))?;

        let target_metrics: Vec<_> = registry
            .targets()
            .map(|(topic, handle)| (topic.to_string(), Arc::clone(handle.metrics())))
            .collect();

        registry.shutdown().await;

        for (topic, metrics) in &target_metrics {
            let snapshot = metrics.snapshot();
            aggregator.record_target(
                topic,
                snapshot.delivered_count,
                snapshot.failed_count,
                snapshot.dropped_count,
                snapshot.unsupported_count,
            );
        }

        Ok(PipelineStats {
            messages_processed: processed,
            parse_errors,
            duration: start_time.elapsed(),
            target_count: target_metrics.len(),
            dispatch: aggregator,
        })
    }

    async fn open_input(&self) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
        match &self.config.input {
            InputSource::Stdin => {
                info!("Reading notifications from stdin");
                Ok(Box::new(BufReader::new(tokio::io::stdin())))
            }
            InputSource::File(path) => {
                info!(path = %path.display(), "Reading notifications from file");
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("Failed to open input file {}", path.display()))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }

    /// Dispatch every notification line; malformed lines are skipped
    async fn dispatch_stream(
        dispatcher: &MulticastDispatcher<TracingPrimary>,
        reader: Box<dyn AsyncBufRead + Send + Unpin>,
        max_messages: Option<u64>,
    ) -> Result<(u64, u64, DispatchAggregator)> {
        let mut aggregator = DispatchAggregator::new();
        let mut processed: u64 = 0;
        let mut parse_errors: u64 = 0;
        let ctxt = Context::default();

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let msg: Notification = match serde_json::from_str(line) {
                Ok(msg) => msg,
                Err(e) => {
                    parse_errors += 1;
                    warn!(error = %e, "Skipping malformed notification line");
                    continue;
                }
            };

            record_notification_received(&msg.event_type);
            let filter = msg.filter_keys();
            for event in dispatcher.registry().events() {
                if filter.iter().any(|key| key == event) {
                    record_event_matched(event);
                }
            }

            let breadth = dispatcher.matched_target_count(&msg, msg.priority);
            if let Err(e) = dispatcher.notify(&ctxt, &msg, msg.priority).await {
                warn!(message_id = %msg.message_id, error = %e, "Primary delivery failed");
            }

            aggregator.record_notification(breadth);
            processed += 1;

            if processed.is_multiple_of(100) {
                info!(notifications = processed, "Pipeline progress");
                for (topic, handle) in dispatcher.registry().targets() {
                    record_queue_depth(topic, handle.metrics().queue_len());
                }
            }

            if let Some(max) = max_messages {
                if processed >= max {
                    info!(max, "Reached message limit, stopping");
                    break;
                }
            }
        }

        Ok((processed, parse_errors, aggregator))
    }
}
