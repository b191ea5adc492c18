//! `validate` command implementation.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::TransportKind;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    publisher_id: String,
    topic_prefix: String,
    transport: String,
    event_count: usize,
    target_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let target_count = distinct_target_count(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    publisher_id: blueprint.resolved_publisher_id(),
                    topic_prefix: blueprint.topic_prefix.clone(),
                    transport: format!("{:?}", blueprint.transport.kind),
                    event_count: blueprint.events.len(),
                    target_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Number of distinct fully-qualified topics (= publish targets)
fn distinct_target_count(blueprint: &contracts::MulticastBlueprint) -> usize {
    let mut topics = HashSet::new();
    for (_, route_topics) in blueprint.resolved_routes() {
        topics.extend(route_topics);
    }
    topics.len()
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::MulticastBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // Events without topics never multicast anything
    for route in &blueprint.events {
        if route.topics.is_empty() {
            warnings.push(format!(
                "Event '{}' has no topics configured - it will never multicast",
                route.event
            ));
        }
    }

    // UDP transport needs a target address at registry construction
    if blueprint.transport.kind == TransportKind::Udp
        && !blueprint.transport.params.contains_key("addr")
    {
        warnings.push(
            "Transport 'udp' has no 'addr' param - registry construction will fail".to_string(),
        );
    }

    if blueprint.topic_prefix.is_empty() {
        warnings.push("topic_prefix is empty - topics will not be namespaced".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Publisher: {}", summary.publisher_id);
            println!("  Topic prefix: {:?}", summary.topic_prefix);
            println!("  Transport: {}", summary.transport);
            println!("  Events: {}", summary.event_count);
            println!("  Distinct targets: {}", summary.target_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, EventRouteConfig, MulticastBlueprint, TransportConfig,
    };

    fn blueprint() -> MulticastBlueprint {
        MulticastBlueprint {
            version: ConfigVersion::V1,
            publisher_id: Some("svc".into()),
            topic_prefix: "repl.".into(),
            events: vec![
                EventRouteConfig {
                    event: "image.upload".into(),
                    topics: vec!["host1".into(), "host2".into(), "host1".into()],
                },
                EventRouteConfig {
                    event: "image.delete".into(),
                    topics: vec![],
                },
            ],
            transport: TransportConfig::default(),
            queue_capacity: 100,
            retry: None,
        }
    }

    #[test]
    fn test_distinct_target_count_collapses_duplicates() {
        assert_eq!(distinct_target_count(&blueprint()), 2);
    }

    #[test]
    fn test_warn_on_event_without_topics() {
        let warnings = collect_warnings(&blueprint());
        assert!(warnings
            .iter()
            .any(|w| w.contains("image.delete") && w.contains("no topics")));
    }

    #[test]
    fn test_warn_on_udp_without_addr() {
        let mut bp = blueprint();
        bp.transport.kind = TransportKind::Udp;
        let warnings = collect_warnings(&bp);
        assert!(warnings.iter().any(|w| w.contains("'addr'")));
    }
}
