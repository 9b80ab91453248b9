// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use recipe_engine::backends::local::LocalModuleFactory;
use recipe_engine::config::{
    load_and_validate_recipe, ModuleArgs, ModuleRegistry, PlaceholderResolver,
};
use recipe_engine::engine::{ModuleRunner, PublishCallback};
use recipe_engine::observability::InMemoryTelemetry;

#[derive(Parser)]
#[command(name = "recipe-engine", version, about = "Run container-passing module recipes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a recipe and run it
    Run {
        /// Recipe file (.yaml, .yml, .json or .toml)
        recipe: PathBuf,

        /// Running argument, `key=value`; values are parsed as JSON, falling back to a string
        #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_running_arg)]
        args: Vec<(String, Value)>,

        /// Maximum number of modules in their run phase at once
        #[arg(long)]
        max_concurrency: Option<usize>,

        /// Treat placeholders left after substitution as an error
        #[arg(long)]
        strict_args: bool,
    },
    /// List the modules a recipe can use
    Modules,
}

fn parse_running_arg(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut registry = ModuleRegistry::new();
    LocalModuleFactory::register_all(&mut registry)?;

    match cli.command {
        Command::Modules => {
            println!("📦 Available modules:");
            for name in registry.names() {
                println!("   • {name}");
            }
            Ok(())
        }
        Command::Run {
            recipe,
            args,
            max_concurrency,
            strict_args,
        } => {
            let succeeded =
                run_recipe(registry, &recipe, args, max_concurrency, strict_args).await?;
            if !succeeded {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn run_recipe(
    registry: ModuleRegistry,
    path: &Path,
    args: Vec<(String, Value)>,
    max_concurrency: Option<usize>,
    strict_args: bool,
) -> Result<bool> {
    let recipe = load_and_validate_recipe(path)
        .with_context(|| format!("Failed to load recipe {}", path.display()))?;

    println!("📋 Recipe: {}", recipe.name);
    if let Some(description) = &recipe.description {
        println!("📝 {description}");
    }
    println!(
        "🔢 Modules: {} preflight(s), {} module(s)",
        recipe.preflights.len(),
        recipe.modules.len()
    );

    let telemetry = Arc::new(InMemoryTelemetry::new());
    let publisher: PublishCallback = Arc::new(|source: &str, message: &str, is_error: bool| {
        if is_error {
            eprintln!("❌ [{source}] {message}");
        } else {
            println!("💬 [{source}] {message}");
        }
    });

    let mut runner = ModuleRunner::new(registry)
        .with_telemetry(telemetry.clone())
        .with_publisher(publisher);
    if let Some(limit) = max_concurrency {
        runner = runner.with_max_concurrency(limit);
    }
    if strict_args {
        runner = runner.with_resolver(Arc::new(PlaceholderResolver::strict()));
    }
    runner.load_recipe(recipe)?;

    let running_args: ModuleArgs = args.into_iter().collect();
    let started = Instant::now();
    let report = runner.run(&running_args).await?;

    println!("\n📊 Execution Results:");
    println!("⏱️  Execution Time: {:?}", started.elapsed());
    println!("{report}");
    println!("\n{}", telemetry.format_telemetry());

    if report.is_success() {
        println!("\n✅ Recipe completed");
    } else {
        println!("\n❌ Recipe failed");
    }
    Ok(report.is_success())
}
