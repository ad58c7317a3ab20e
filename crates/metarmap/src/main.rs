//! `metarmap` - CLI for the METAR flight-category map
//!
//! This binary parses reports, summarizes the configured airports, and drives
//! the indicator strip.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use metarmap::cli::{Cli, Command, ConfigCommand, ParseCommand, RunCommand, StatusCommand};
use metarmap::{
    init_logging, parse_batch, parse_report, Config, FetchResult, FileFeed, Observation,
    ReportFeed, Runner, Summary,
};
use metarmap_term::TerminalStrip;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Parse(cmd) => handle_parse(&cmd),
        Command::Status(cmd) => handle_status(&load_config(cli.config)?, cmd).await,
        Command::Run(cmd) => handle_run(load_config(cli.config)?, cmd).await,
        Command::Config(cmd) => handle_config(cli.config, cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

fn handle_parse(cmd: &ParseCommand) -> anyhow::Result<()> {
    let observations: Vec<Observation> = if cmd.lines.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read reports from standard input")?;
        parse_batch(&input)
    } else {
        cmd.lines.iter().map(|line| parse_report(line)).collect()
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&observations)?);
        return Ok(());
    }

    for obs in &observations {
        println!("{}", describe(obs));
    }
    Ok(())
}

fn describe(obs: &Observation) -> String {
    let Some(station) = &obs.station else {
        return format!("(rejected) {}", obs.raw.trim());
    };

    let mut fields = vec![station.clone()];
    fields.push(obs.category.map_or("-".to_string(), |c| c.to_string()));
    if let Some(time) = obs.observed {
        fields.push(time.to_string());
    }
    match (obs.wind_direction_deg, obs.wind_speed_kt) {
        (Some(dir), Some(speed)) => fields.push(format!("wind {dir:03}@{speed}kt")),
        _ => fields.push("wind -".to_string()),
    }
    fields.push(obs.visibility_sm.map_or("vis -".to_string(), |v| format!("vis {v}SM")));
    fields.push(
        obs.ceiling_ft()
            .map_or("ceiling none".to_string(), |c| format!("ceiling {c}ft")),
    );
    if let (Some(temp), Some(dew)) = (obs.temperature_c, obs.dewpoint_c) {
        fields.push(format!("temp {temp}/{dew}C"));
    }
    if let Some(alt) = obs.altimeter_inhg {
        fields.push(format!("alt {alt:.2}"));
    }
    if !obs.clouds.is_empty() {
        let layers: Vec<String> = obs.clouds.iter().map(ToString::to_string).collect();
        fields.push(format!("clouds {}", layers.join(" ")));
    }
    if obs.thunderstorm {
        fields.push("TS".to_string());
    }
    fields.join("  ")
}

async fn handle_status(config: &Config, cmd: StatusCommand) -> anyhow::Result<()> {
    let path = cmd.reports.unwrap_or_else(|| config.reports_path());
    let mut registry = config.registry()?;
    let mut state = config.display_state();

    let mut feed = FileFeed::new(&path);
    let fetch_error = match feed.fetch().await {
        Ok(FetchResult::Updated(lines)) => {
            registry.merge(lines.iter().map(|line| parse_report(line)));
            state.last_fetch_ok = true;
            None
        }
        Ok(FetchResult::Unchanged) => {
            state.last_fetch_ok = true;
            None
        }
        Err(e) => Some(e.to_string()),
    };

    let now = Utc::now();
    let last_success = state.last_fetch_ok.then_some(now);
    let summary = Summary::collect(&registry, &state, last_success, now);

    if cmd.json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    println!("metarmap status");
    println!("---------------");
    println!("Report file:   {}", path.display());
    match &fetch_error {
        None => println!("Last fetch:    ok"),
        Some(e) => println!("Last fetch:    failed ({e})"),
    }
    println!(
        "Airports:      {} of {} positions bound, {} with data",
        summary.bound_slots, summary.total_slots, summary.valid
    );
    let counts: Vec<String> = summary
        .category_counts()
        .iter()
        .map(|(category, count)| format!("{category} {count}"))
        .collect();
    println!("Categories:    {}", counts.join("  "));
    println!();

    for slot in &summary.slots {
        let Some(identifier) = &slot.identifier else {
            println!("{:>3}  ----", slot.index);
            continue;
        };
        let category = slot.category.map_or("-".to_string(), |c| c.to_string());
        let age = slot.age_minutes.map_or("-".to_string(), |m| format!("{m}m"));
        let mut hazards = Vec::new();
        if slot.thunderstorm {
            hazards.push("thunderstorm");
        }
        if slot.wind {
            hazards.push("wind");
        }
        println!(
            "{:>3}  {identifier:<4}  {category:<4}  {age:>5}  {}",
            slot.index,
            hazards.join(",")
        );
    }
    Ok(())
}

async fn handle_run(config: Config, cmd: RunCommand) -> anyhow::Result<()> {
    let path = cmd.reports.unwrap_or_else(|| config.reports_path());
    let registry = config.registry()?;
    let feed = FileFeed::new(path);

    info!(
        reports = %feed.path().display(),
        airports = registry.bound_count(),
        "Starting metarmap"
    );

    let mut runner = Runner::new(
        feed,
        TerminalStrip::stdout(),
        registry,
        config.colors.clone(),
        config.display_state(),
    )
    .with_intervals(config.fetch_interval(), config.tick_interval());

    runner
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for interrupt");
            }
        })
        .await?;
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Display]");
                println!("  Brightness:         {}", config.display.brightness);
                println!("  Power:              {}", config.display.power);
                println!("  Max slots:          {}", config.display.max_slots);
                println!();
                println!("[Wind]");
                println!("  Enabled:            {}", config.wind.enabled);
                println!("  Threshold (kt):     {}", config.wind.threshold_kt);
                println!();
                println!("[Thunderstorm]");
                println!("  Enabled:            {}", config.thunderstorm.enabled);
                println!();
                println!("[Airports]");
                println!("  Positions:          {}", config.airports.identifiers.len());
                println!();
                println!("[Feed]");
                println!("  Reports path:       {}", config.reports_path().display());
                println!("  Fetch interval (s): {}", config.feed.fetch_interval_secs);
                println!();
                println!("[Animation]");
                println!("  Tick interval (ms): {}", config.animation.tick_interval_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
