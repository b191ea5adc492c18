//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{InputSource, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref prefix) = args.topic_prefix {
        info!(prefix = %prefix, "Overriding topic prefix from CLI");
        blueprint.topic_prefix = prefix.clone();
    }
    if let Some(ref publisher_id) = args.publisher_id {
        info!(publisher_id = %publisher_id, "Overriding publisher identity from CLI");
        blueprint.publisher_id = Some(publisher_id.clone());
    }

    info!(
        publisher_id = %blueprint.resolved_publisher_id(),
        topic_prefix = %blueprint.topic_prefix,
        events = blueprint.events.len(),
        transport = ?blueprint.transport.kind,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        input: InputSource::from_arg(&args.input),
        max_messages: if args.max_messages == 0 {
            None
        } else {
            Some(args.max_messages)
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting dispatch pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        notifications = stats.messages_processed,
                        parse_errors = stats.parse_errors,
                        duration_secs = stats.duration.as_secs_f64(),
                        rate = format!("{:.2}/s", stats.rate()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Notify Mcast finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::MulticastBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Publisher: {}", blueprint.resolved_publisher_id());
    println!("Topic prefix: {:?}", blueprint.topic_prefix);
    println!("Transport: {:?}", blueprint.transport.kind);
    println!("\nEvents ({}):", blueprint.events.len());
    for (event, topics) in blueprint.resolved_routes() {
        println!("  - {} - {} topics", event, topics.len());
        for topic in topics {
            println!("      {}", topic);
        }
    }
    println!();
}
