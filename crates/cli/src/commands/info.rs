//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Routing table info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    publisher_id: String,
    topic_prefix: String,
    transport: TransportInfo,
    routes: Vec<RouteInfo>,
}

#[derive(Serialize)]
struct TransportInfo {
    kind: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct RouteInfo {
    event: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    topics: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let config_info = ConfigInfo {
        version: format!("{:?}", blueprint.version),
        publisher_id: blueprint.resolved_publisher_id(),
        topic_prefix: blueprint.topic_prefix.clone(),
        transport: TransportInfo {
            kind: format!("{:?}", blueprint.transport.kind).to_lowercase(),
            params: blueprint.transport.params.clone(),
        },
        routes: blueprint
            .resolved_routes()
            .into_iter()
            .map(|(event, topics)| RouteInfo { event, topics })
            .collect(),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&config_info).context("Failed to serialize info")?;
        println!("{}", json);
    } else {
        print_info(&config_info);
    }

    Ok(())
}

fn print_info(info: &ConfigInfo) {
    println!("\n=== Multicast Routing Table ===\n");
    println!("Version: {}", info.version);
    println!("Publisher: {}", info.publisher_id);
    println!("Topic prefix: {:?}", info.topic_prefix);
    println!("Transport: {}", info.transport.kind);
    if !info.transport.params.is_empty() {
        let mut params: Vec<_> = info.transport.params.iter().collect();
        params.sort();
        for (key, value) in params {
            println!("  {} = {}", key, value);
        }
    }

    println!("\nRoutes ({}):", info.routes.len());
    for route in &info.routes {
        if route.topics.is_empty() {
            println!("  {} -> (no topics)", route.event);
        } else {
            println!("  {} ->", route.event);
            for topic in &route.topics {
                println!("      {}", topic);
            }
        }
    }
    println!();
}
