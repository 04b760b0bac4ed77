// File: main.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use acprobe::cli::Cli;
use acprobe::config::RunConfig;
use acprobe::orchestrator::{load_inputs, AccessControl};
use acprobe::report::{render, write_output};
use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use log::{debug, error, info, LevelFilter};
use simple_logger::SimpleLogger;

fn init_logger(level: LevelFilter) {
    let logger = SimpleLogger::new()
        .with_level(level)
        .with_module_level("hyper", LevelFilter::Warn)
        .with_module_level("hyper_util", LevelFilter::Warn)
        .with_module_level("reqwest", LevelFilter::Warn)
        .with_module_level("html5ever", LevelFilter::Warn)
        .with_module_level("selectors", LevelFilter::Warn);
    if let Err(e) = logger.init() {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

async fn run(cli: &Cli, config: RunConfig) -> Result<()> {
    if cli.missing_required() {
        bail!("Arguments host, users, and urls are required if no configuration file is provided");
    }
    debug!("Arguments: {:?}", config);

    let mut access_control = AccessControl::new(&config).context("Invalid configuration")?;
    let (users, urls) = load_inputs(&config).context("Can't load or open users or URLs file")?;

    if !config.quiet {
        eprintln!(
            "{} {} users x {} URLs against {} ({} login)",
            "»".blue().bold(),
            users.len() + usize::from(!config.disable_unauth),
            urls.len(),
            config.host.as_deref().unwrap_or_default().bold(),
            access_control.strategy().name()
        );
    }

    let table = access_control.run(users, &urls).await;
    let content = render(&table, config.output_format())?;
    write_output(&content, config.out.as_deref())?;

    if !config.quiet {
        let stats = access_control.stats();
        eprintln!("{} {}", "✓".green().bold(), stats);
        for label in access_control.skipped_identities() {
            eprintln!("{} {} could not log in", "⚠".yellow().bold(), label);
        }
    }
    info!("Done");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = cli.to_config();
    let merged = match &cli.config {
        Some(path) => config
            .merge_file(path)
            .with_context(|| format!("Configuration file loading failed: {}", path.display())),
        None => Ok(()),
    };
    init_logger(config.log_level());

    let outcome = match merged {
        Ok(()) => run(&cli, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
