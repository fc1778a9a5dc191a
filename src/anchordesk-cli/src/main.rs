//! AnchorDesk CLI - continuous news desk
//!
//! Runs broadcast cycles over a story feed and prints each segment's script.

use anchordesk_core::{
    Broadcast, BroadcastEvent, Config, CycleClock, DeskError, DraftProducer, Feed, LineProducer,
    OpenAiProducer, RandomSource, RenderedLine, Role, SeededRandom, StateStore, default_config,
    render_timeline,
};
use chrono::{Local, Timelike, Utc};
use clap::Parser;
use colored::Colorize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "anchordesk",
    version,
    about = "AnchorDesk - a never-ending multi-anchor news desk",
    long_about = "Decides what airs next, picks the anchors and writes the segment script, one cycle at a time."
)]
struct Cli {
    /// Story feed (JSON with `stories` and optional `breaking` arrays)
    #[arg(long, value_name = "FILE")]
    feed: PathBuf,

    /// Desk configuration (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where the director state is kept between cycles
    #[arg(long, default_value = "director_state.json", value_name = "FILE")]
    state: PathBuf,

    /// Number of cycles to run (0 runs until interrupted)
    #[arg(short, long, default_value = "1", value_name = "N")]
    cycles: u64,

    /// Seconds between cycles
    #[arg(long, default_value = "30", value_name = "SECS")]
    interval_secs: u64,

    /// Seed for the random source, for reproducible runs
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the local hour (0-23) used for dayparts
    #[arg(long, value_name = "HOUR", value_parser = clap::value_parser!(u32).range(0..24))]
    hour: Option<u32>,

    /// Rewrite lines through an OpenAI-compatible API
    #[arg(long)]
    remote: bool,

    /// Print one JSON document per cycle instead of the script
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => default_config(),
    };

    let feed_content = fs::read_to_string(&cli.feed)
        .map_err(|e| DeskError::Feed(format!("Failed to read {}: {}", cli.feed.display(), e)))?;
    let feed = Feed::from_json(&feed_content)?;

    let store = StateStore::new(&cli.state);
    let mut state = store.load_or_warm(Utc::now(), &config.director);
    for story in feed.breaking {
        state.push_breaking(story);
    }
    let mut queue = feed.stories;

    let producer: Box<dyn LineProducer> = if cli.remote {
        let mut producer_config = config.producer.clone();
        if let Ok(api_base) = env::var("OPENAI_API_BASE").or_else(|_| env::var("OPENAI_BASE_URL")) {
            producer_config.api_base = api_base;
        }
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
            eprintln!(
                "{}",
                "Warning: OPENAI_API_KEY not set. Lines will fall back to drafts.".yellow()
            );
            String::new()
        });
        Box::new(OpenAiProducer::new(&api_key, &producer_config)?)
    } else {
        Box::new(DraftProducer)
    };

    let rng: Box<dyn RandomSource> = match cli.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(SeededRandom::from_entropy()),
    };

    let timeout = Duration::from_secs(config.producer.timeout_secs.max(1));
    let mut broadcast = Broadcast::new(config, rng);
    if !cli.json {
        broadcast = broadcast.with_callback(create_console_callback());
        print_header(&cli, queue.len(), state.breaking_queue.len());
    }

    // A run without a cycle limit always waits between cycles.
    let period = if cli.cycles == 0 {
        cli.interval_secs.max(1)
    } else {
        cli.interval_secs
    };
    let mut ticker = tokio::time::interval(Duration::from_secs(period.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut completed = 0;
    while cli.cycles == 0 || completed < cli.cycles {
        if period > 0 {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted, stopping after {} cycles", completed);
                    break;
                }
            }
        }

        let hour = cli.hour.unwrap_or_else(|| Local::now().hour());
        let report = broadcast.run_cycle(&mut state, &queue, CycleClock::new(Utc::now(), hour));
        if let Some(aired) = &report.aired {
            if let Some(pos) = queue.iter().position(|s| s == aired) {
                queue.remove(pos);
            }
        }

        let lines = render_timeline(
            producer.as_ref(),
            &report.timeline,
            broadcast.directory(),
            &report.headline,
            &broadcast.config().assembly,
            timeout,
        )
        .await;

        if cli.json {
            let document = serde_json::json!({ "report": report, "lines": lines });
            println!("{}", serde_json::to_string(&document)?);
        } else {
            print_lines(&lines);
        }

        if let Err(e) = store.save(&state) {
            warn!(error = %e, "failed to persist director state");
        }
        completed += 1;
    }

    if !cli.json {
        println!();
        println!("{}", "═".repeat(70).bright_blue());
        println!(
            "{}",
            format!("  Off air after {} cycle(s).", completed)
                .bright_green()
                .bold()
        );
        println!("{}", "═".repeat(70).bright_blue());
        println!();
    }

    Ok(())
}

fn print_header(cli: &Cli, queued: usize, breaking: usize) {
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  {} - Token News", "AnchorDesk".bold())
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!("{} {}", "Feed:".bold(), cli.feed.display().to_string().bright_white());
    println!(
        "{} {} queued, {} breaking",
        "Stories:".bold(),
        queued.to_string().bright_white(),
        breaking.to_string().bright_red()
    );
    println!("{} {}", "State:".bold(), cli.state.display().to_string().dimmed());
    println!();
    println!("{}", "─".repeat(70).dimmed());
}

/// Create a callback that prints broadcast events to the console.
fn create_console_callback() -> Box<dyn Fn(BroadcastEvent) + Send + Sync> {
    Box::new(move |event| match event {
        BroadcastEvent::SegmentChosen {
            cycle,
            segment,
            escalation,
        } => {
            println!();
            println!("{}", "═".repeat(70).bright_magenta());
            println!(
                "{}",
                format!("  CYCLE {}: {}", cycle, segment.as_str().to_uppercase())
                    .bright_magenta()
                    .bold()
            );
            println!("  {}", format!("escalation {}", escalation).dimmed());
            println!("{}", "═".repeat(70).bright_magenta());
        }
        BroadcastEvent::AnchorsSelected { primary, duo } => {
            let duo = duo.map(|d| format!(" + {}", d)).unwrap_or_default();
            println!("  {} {}{}", "Anchors:".bold(), primary.bright_cyan(), duo.cyan());
        }
        BroadcastEvent::TimelineReady { entries, tragic } => {
            let note = if tragic { " (sensitive story, no hijinx)" } else { "" };
            println!("  {}", format!("{} lines{}", entries, note).dimmed());
            println!();
        }
    })
}

fn print_lines(lines: &[RenderedLine]) {
    for line in lines {
        let name = match line.role {
            Role::Lead => line.speaker_name.bright_white().bold(),
            Role::PrimaryAnchor => line.speaker_name.bright_cyan().bold(),
            Role::SecondaryAnchor => line.speaker_name.cyan().bold(),
            Role::Vibe => line.speaker_name.bright_magenta().bold(),
            Role::Meta => line.speaker_name.yellow().bold(),
        };
        let marker = if line.fallback { " *".dimmed() } else { "".normal() };
        println!(
            "{} {} {}{}",
            "▶".bright_cyan(),
            name,
            format!("[{}]", line.entry_type).dimmed(),
            marker
        );
        for wrapped in textwrap(&line.text, 66).lines() {
            println!("  {}", wrapped);
        }
    }
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}
