use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::fs;
use std::path::PathBuf;

use wvw_counterpick::display::output::{
    display_error, display_info, display_recommendation, display_status, display_success,
    display_warning,
};
use wvw_counterpick::{Composition, Config, CounterEngine, EngineError, FightContext, FightData};

#[derive(Parser, Debug)]
#[command(name = "wvw-counterpick")]
#[command(about = "Data-driven WvW counter-composition recommendations", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest one or more parsed fight JSON files
    Record {
        /// Paths to parsed fight files
        files: Vec<PathBuf>,

        /// Fight context override (zerg, guild_raid, roam); auto-detected when omitted
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Recommend a counter-composition against an enemy composition
    Counter {
        /// Enemy composition, e.g. "Firebrand:3,Scourge:4,Spellbreaker:2"
        #[arg(short, long)]
        enemy: String,

        /// Restrict evidence to one fight context (zerg, guild_raid, roam)
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Report whether a recommended counter worked out
    Feedback {
        /// Enemy composition the recommendation was generated against
        #[arg(short, long)]
        enemy: String,

        /// The counter worked
        #[arg(long, conflicts_with = "failed")]
        worked: bool,

        /// The counter failed
        #[arg(long)]
        failed: bool,

        /// Fight context (defaults to zerg)
        #[arg(short, long, default_value = "zerg")]
        context: String,
    },

    /// Show engine status and feedback summary
    Status,

    /// Prune expired fight fingerprints from the dedup index
    Cleanup,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let engine = CounterEngine::new(config)?;

    match args.command {
        Command::Record { files, context } => record_files(&engine, &files, context.as_deref()),
        Command::Counter { enemy, context } => {
            let enemy: Composition = enemy.parse()?;
            let context = context.as_deref().map(parse_context).transpose()?;
            let recommendation = engine.generate_counter(&enemy, context)?;
            display_recommendation(&recommendation, &enemy);
            Ok(())
        }
        Command::Feedback {
            enemy,
            worked,
            failed,
            context,
        } => {
            if worked == failed {
                anyhow::bail!("pass exactly one of --worked or --failed");
            }
            let enemy: Composition = enemy.parse()?;
            let context = parse_context(&context)?;
            engine.submit_feedback(&enemy, worked, context)?;
            display_success("Feedback recorded");
            Ok(())
        }
        Command::Status => {
            display_status(&engine.status(), &engine.feedback_summary());
            Ok(())
        }
        Command::Cleanup => {
            let removed = engine.cleanup_fingerprints()?;
            display_success(&format!("Pruned {} expired fingerprints", removed));
            Ok(())
        }
    }
}

fn parse_context(value: &str) -> anyhow::Result<FightContext> {
    match FightContext::from_string(value) {
        FightContext::Unknown if !value.eq_ignore_ascii_case("unknown") => {
            anyhow::bail!("unknown context: {} (use zerg, guild_raid or roam)", value)
        }
        context => Ok(context),
    }
}

fn record_files(
    engine: &CounterEngine,
    files: &[PathBuf],
    context: Option<&str>,
) -> anyhow::Result<()> {
    if files.is_empty() {
        anyhow::bail!("no fight files given");
    }
    let context = context.map(parse_context).transpose()?;

    display_info(&format!("Ingesting {} fight file(s)", files.len()));
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_message("Recording fights");

    let mut recorded = 0usize;
    let mut duplicates = 0usize;
    let mut skipped = 0usize;

    for path in files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut data: FightData = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if data.source_name.is_empty() {
            data.source_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        match engine.record_fight(&data, context) {
            Ok(_) => recorded += 1,
            Err(EngineError::DuplicateFight(_)) => duplicates += 1,
            Err(EngineError::ShortFight(_)) => skipped += 1,
            Err(e) => return Err(e).with_context(|| format!("recording {}", path.display())),
        }
        pb.inc(1);
    }
    pb.finish_with_message("✓ Ingestion complete");

    display_success(&format!("Recorded {} new fights", recorded));
    if duplicates > 0 {
        display_warning(&format!("Skipped {} duplicates", duplicates));
    }
    if skipped > 0 {
        display_warning(&format!("Skipped {} too-short fights", skipped));
    }
    Ok(())
}
