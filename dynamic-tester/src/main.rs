mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dynamic_rules::{DynamicConfig, RulesetData};
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use common::{parse_player_counts, split_csv};
use logic::{
    DynamicSimulation, PlayerAggregate, SimulationRecord, SimulationSettings,
    aggregate_by_players, resolve_seed_inputs,
};

#[derive(Debug, Parser)]
#[command(name = "dynamic-tester", version = "0.1.0")]
#[command(about = "Seeded threat budgeting and ruleset drafting simulations")]
struct Args {
    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Player counts to simulate (comma-separated)
    #[arg(long, default_value = "40")]
    players: String,

    /// Concurrent round instances per seed
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Midround drafting passes after roundstart
    #[arg(long, default_value_t = 1)]
    midround_passes: u32,

    /// JSON config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON ruleset catalog; the bundled catalog is used when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Override the lowpop threshold
    #[arg(long)]
    lowpop: Option<f32>,

    /// Override the highpop threshold
    #[arg(long)]
    highpop: Option<f32>,

    /// Override the configured max threat
    #[arg(long)]
    max_threat: Option<f32>,

    /// Allow more than one high-impact ruleset per pass
    #[arg(long)]
    unforgiving: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output (per-pick draft trace)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let cfg = build_config(&args)?;
    let catalog = load_catalog(args.catalog.as_deref())?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let player_counts = parse_player_counts(&args.players)?;
    let settings = SimulationSettings {
        rounds: args.rounds,
        midround_passes: args.midround_passes,
    };

    log::info!(
        "running {} seeds x {} player counts ({} rounds, {} midround passes)",
        seeds.len(),
        player_counts.len(),
        settings.rounds,
        settings.midround_passes
    );

    let simulation = DynamicSimulation::new(&catalog, cfg, settings);
    let records = simulation
        .run_matrix(&seeds, &player_counts)
        .context("simulation failed")?;
    let aggregates = aggregate_by_players(&records);

    write_reports(&args, &records, &aggregates, start_time)
}

fn announce_banner() {
    println!("{}", "🎲 Dynamic Threat Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn build_config(args: &Args) -> Result<DynamicConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            DynamicConfig::from_json(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => DynamicConfig::default(),
    };

    if let Some(lowpop) = args.lowpop {
        cfg.lowpop_threshold = lowpop;
    }
    if let Some(highpop) = args.highpop {
        cfg.highpop_threshold = highpop;
    }
    if let Some(max_threat) = args.max_threat {
        cfg.max_threat = max_threat;
    }
    if args.unforgiving {
        cfg.unforgiving = true;
    }

    cfg.validate().context("invalid dynamic config")?;
    Ok(cfg)
}

fn load_catalog(path: Option<&Path>) -> Result<RulesetData> {
    let Some(path) = path else {
        return Ok(RulesetData::load_from_static());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    RulesetData::from_json(&raw)
        .with_context(|| format!("failed to parse catalog {}", path.display()))
}

fn write_reports(
    args: &Args,
    records: &[SimulationRecord],
    aggregates: &[PlayerAggregate],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, records)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, records, aggregates)?;
        }
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                records,
                aggregates,
                args.verbose,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
