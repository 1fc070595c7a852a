//! Dance card CLI.
//!
//! Commands:
//! - generate: Write a synthetic problem file from a preset
//! - assign: Build dance cards for a problem file

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dancecard::export::{ExportOptions, write_csv};
use dancecard::generator::{ProblemGenerator, ProblemGeneratorConfig};
use dancecard::problem::Problem;
use dancecard::report::{CoverageReport, RunRecord, format_duration};
use dancecard_engine::{DanceCardEngine, EvictionPolicy, Generation, ParticipantDanceCard};

#[derive(Parser)]
#[command(name = "dancecard")]
#[command(version)]
#[command(about = "Assign conference participants to topic sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic problem file.
    Generate {
        /// Preset: small, balanced, scarce
        #[arg(short, long, default_value = "balanced")]
        preset: String,
        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Where to write the problem (JSON). Prints to stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build dance cards for a problem file.
    Assign {
        /// Problem file (JSON)
        problem: PathBuf,
        /// Random seed, overrides the problem file
        #[arg(long, env = "DANCECARD_SEED")]
        seed: Option<u64>,
        /// Repair-pass iteration ceiling, overrides the problem file
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Eviction policy: first-seated, fewest-unvisited
        #[arg(long)]
        eviction: Option<String>,
        /// Evict instead of trading sessions between slots
        #[arg(long)]
        no_relocation: bool,
        /// Write the cards as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Append the missed-topics section to the CSV
        #[arg(long)]
        missed_topics: bool,
        /// Write a run record (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins unless --verbose asks for debug output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Generate {
            preset,
            seed,
            output,
        } => {
            let config = ProblemGeneratorConfig::preset(&preset).with_context(|| {
                format!("Unknown preset: {}. Valid: small, balanced, scarce", preset)
            })?;
            let problem = ProblemGenerator::new(config, seed).generate();

            match output {
                Some(path) => {
                    problem.save(&path)?;
                    info!(
                        path = %path.display(),
                        preset = %preset,
                        seed,
                        participants = problem.participants.len(),
                        events = problem.events.len(),
                        "Wrote problem"
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&problem)?),
            }
        }

        Commands::Assign {
            problem: problem_path,
            seed,
            max_iterations,
            eviction,
            no_relocation,
            csv,
            missed_topics,
            output,
        } => {
            let problem = Problem::load(&problem_path)?;

            let mut config = problem.engine_config();
            if let Some(seed) = seed {
                config.seed = Some(seed);
            }
            if let Some(max_iterations) = max_iterations {
                config.max_iterations = max_iterations;
            }
            if let Some(eviction) = eviction {
                config.eviction = parse_eviction(&eviction)?;
            }
            if no_relocation {
                config.relocation = false;
            }

            let engine = DanceCardEngine::new(config.clone());
            let started_at = Utc::now();
            let generation = engine.generate_detailed(
                &problem.participants,
                &problem.events,
                &problem.room_capacities,
            );
            let ended_at = Utc::now();

            let report = CoverageReport::measure(&generation.cards, &problem.room_capacities);
            let record = RunRecord {
                problem: Some(problem_path.display().to_string()),
                started_at,
                ended_at,
                seed: generation.seed,
                config,
                report,
                repair: generation.repair,
            };

            print_cards(&generation);
            print_summary(&record);

            if let Some(path) = csv {
                let options = ExportOptions {
                    include_missed_topics: missed_topics,
                };
                write_csv(&path, &generation.cards, &generation.time_slots, options)?;
                println!("CSV saved to: {}", path.display());
            }

            if let Some(path) = output {
                record.save(&path)?;
                println!("Run record saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

/// Width of the name column, in characters.
fn name_column_width(cards: &[ParticipantDanceCard]) -> usize {
    cards
        .iter()
        .map(|c| c.participant.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Participant".len())
}

fn print_cards(generation: &Generation) {
    let name_width = name_column_width(&generation.cards);

    println!("\n=== Dance Cards ===");
    print!("  {:<width$}", "Participant", width = name_width);
    for time in &generation.time_slots {
        print!("  {:<24}", time);
    }
    println!();

    for card in &generation.cards {
        print!("  {:<width$}", card.participant.name, width = name_width);
        for time in &generation.time_slots {
            let cell = card
                .assignment(time)
                .map(|a| a.to_string())
                .unwrap_or_else(|| "ERROR".to_string());
            print!("  {:<24}", cell);
        }
        println!();
    }

    let missing: Vec<_> = generation
        .cards
        .iter()
        .filter(|c| !c.missed_topics.is_empty())
        .collect();
    if !missing.is_empty() {
        println!("\nMissed Topics:");
        for card in missing {
            let topics: Vec<&str> = card.missed_topics.iter().map(String::as_str).collect();
            println!(
                "  {} ({}): {}",
                card.participant.name,
                card.participant.id,
                topics.join(", ")
            );
        }
    }
}

fn print_summary(record: &RunRecord) {
    let report = &record.report;
    let repair = &record.repair;

    println!("\n=== Run Summary ===");
    println!("Seed: {}", record.seed);
    println!("Duration: {}", format_duration(record.duration_ms()));
    println!("Participants: {}", report.participants);
    println!("Time slots: {}", report.time_slots);
    println!(
        "Assigned / free slots: {} / {}",
        report.assigned_slots, report.free_slots
    );
    println!("Coverage: {:.1}%", report.coverage_rate * 100.0);
    println!("Mean room utilization: {:.1}%", report.mean_utilization() * 100.0);
    println!(
        "Participants with missed topics: {} ({} topics total)",
        report.participants_with_missed_topics, report.missed_topics_total
    );

    println!("\nRepair Pass:");
    println!("  Iterations: {}", repair.iterations);
    println!("  Evictions: {}", repair.evictions);
    println!("  Relocations: {}", repair.relocations);
    println!(
        "  Missed topics: {} -> {}",
        repair.missed_before, repair.missed_after
    );
    if repair.exhausted {
        println!("  Stopped at iteration ceiling ({})", record.config.max_iterations);
    }

    if report.capacity_violations > 0 || report.double_topic_violations > 0 {
        println!(
            "\nViolations: {} capacity, {} repeated topic",
            report.capacity_violations, report.double_topic_violations
        );
    }
}

fn parse_eviction(s: &str) -> Result<EvictionPolicy> {
    match s.to_lowercase().as_str() {
        "first-seated" | "first_seated" | "first" => Ok(EvictionPolicy::FirstSeated),
        "fewest-unvisited" | "fewest_unvisited" | "fewest" => Ok(EvictionPolicy::FewestUnvisited),
        _ => bail!(
            "Unknown eviction policy: {}. Valid: first-seated, fewest-unvisited",
            s
        ),
    }
}
