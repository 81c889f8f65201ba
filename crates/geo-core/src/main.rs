use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use geo_core::{init_tracing, PipelineConfig, Preflight};
use geo_guardrail::GuardrailEngine;
use geo_location::{known_names, LocationResolver};
use geo_plan::{Location, PlanValidator};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

fn cli() -> Command {
    let plan_arg = || {
        Arg::new("plan")
            .required(true)
            .help("Path to a plan JSON file, or - for stdin")
    };

    Command::new("geo-analyst")
        .version(geo_core::VERSION)
        .about("Validate, fingerprint and inspect geospatial analysis plans")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Pipeline configuration TOML"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("check")
                .about("Validate a plan and evaluate guardrails")
                .arg(plan_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("keys")
                .about("Print the cache keys of a plan")
                .arg(plan_arg()),
        )
        .subcommand(Command::new("locations").about("List built-in location names"))
        .subcommand(
            Command::new("resolve")
                .about("Resolve a place name to a bounding box")
                .arg(Arg::new("name").required(true).help("Place name"))
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .action(ArgAction::SetTrue)
                        .help("Use only the built-in table"),
                ),
        )
}

fn read_plan(source: &str) -> Result<Value> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read plan from stdin")?;
        buf
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("failed to read plan file {source}"))?
    };
    serde_json::from_str(&text).context("plan is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    init_tracing(&config.telemetry);

    match matches.subcommand() {
        Some(("check", args)) => {
            let source = args.get_one::<String>("plan").context("missing plan")?;
            let preflight = Preflight::new(GuardrailEngine::new(config.guardrails.clone()));

            let check = match preflight.check(&read_plan(source)?) {
                Ok(check) => check,
                Err(e) => {
                    println!("INVALID: {e}");
                    std::process::exit(1);
                }
            };

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&check)?);
            } else {
                println!("Plan: {} / {}", check.plan.analysis_type(), check.plan.data_product());
                println!("  Time range: {}", check.plan.time_range());
                println!("  Location: {}", check.plan.location());
                println!("  Cache key: {}", check.cache_key);
                for warning in &check.guardrails.warnings {
                    println!("  Warning: {warning}");
                }
                for violation in check.guardrails.violations() {
                    println!("  Violation: {violation}");
                }
                println!(
                    "  Status: {}",
                    if check.guardrails.valid { "ACCEPTED" } else { "REJECTED" }
                );
            }

            std::process::exit(if check.guardrails.valid { 0 } else { 1 });
        }
        Some(("keys", args)) => {
            let source = args.get_one::<String>("plan").context("missing plan")?;
            let plan = PlanValidator::validate(&read_plan(source)?)?;

            println!("analysis:    {}", geo_cache::CacheKey::analysis(&plan));
            println!("explanation: {}", geo_cache::CacheKey::explanation(&plan));
        }
        Some(("locations", _)) => {
            for name in known_names() {
                println!("{name}");
            }
        }
        Some(("resolve", args)) => {
            let name = args.get_one::<String>("name").context("missing name")?;
            let resolver = if args.get_flag("offline") {
                LocationResolver::new()
            } else {
                LocationResolver::from_config(&config.geocoder)?
            };

            let bbox = resolver.resolve(&Location::Named(name.clone())).await?;
            println!("{bbox}");
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}
