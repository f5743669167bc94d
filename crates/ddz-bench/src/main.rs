use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ddz_bench::config::{BenchmarkConfig, DealConfig, ResolvedOutputs};
use ddz_bench::logging::{init_console_logging, init_logging};
use ddz_bench::runner::EndgameRunner;
use ddz_bench::solve::solve_text;
use ddz_core::model::side::Side;

const ONE_SHOT_MAX_TURNS: usize = 256;

/// Exact two-hand endgame solver and batch harness.
#[derive(Debug, Parser)]
#[command(
    name = "ddz-bench",
    author,
    version,
    about = "Solve landlord-versus-peasant endgames and benchmark policies on them"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the RNG seed for random deals.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of random deals to play.
    #[arg(long, value_name = "COUNT")]
    deals: Option<usize>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,

    /// Solve a single position instead of running a configuration.
    #[arg(long, value_name = "HAND", requires = "peasant")]
    landlord: Option<String>,

    /// Peasant hand for a one-shot solve.
    #[arg(long, value_name = "HAND", requires = "landlord")]
    peasant: Option<String>,

    /// Combination the side on move has to beat, e.g. "3334".
    #[arg(long, value_name = "COMBO", requires = "landlord")]
    last: Option<String>,

    /// Side on move for a one-shot solve.
    #[arg(long, value_name = "SIDE", default_value = "landlord")]
    first: Side,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let (Some(landlord), Some(peasant)) = (cli.landlord.as_deref(), cli.peasant.as_deref()) {
        init_console_logging();
        let report = solve_text(
            landlord,
            peasant,
            cli.last.as_deref(),
            cli.first,
            ONE_SHOT_MAX_TURNS,
        )?;
        print!("{report}");
        return Ok(());
    }

    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        deals_block(&mut config).seed = Some(seed);
    }

    if let Some(count) = cli.deals {
        deals_block(&mut config).count = count;
    }

    config
        .validate()
        .with_context(|| format!("validating {}", cli.config.display()))?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let fixed = config.positions.len();
    let dealt = config.deals.as_ref().map_or(0, |deals| deals.count);

    println!(
        "Loaded configuration '{run_id}' with {fixed} fixed position{} and {dealt} random deal{}",
        if fixed == 1 { "" } else { "s" },
        if dealt == 1 { "" } else { "s" }
    );

    let logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = EndgameRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: no games played.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} games ({} landlord, {} peasant, {} unfinished), {} matched the solver's prediction",
        summary.games_played,
        summary.landlord_wins,
        summary.peasant_wins,
        summary.truncated,
        summary.prediction_matches
    );
    println!(
        "Game log: {} ({} rows)",
        summary.jsonl_path.display(),
        summary.rows_written
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(guard) = logging_guard.as_ref() {
        println!("Telemetry log: {}", guard.telemetry_path.display());
    }
    if !summary.expectation_failures.is_empty() {
        anyhow::bail!(
            "expected winner not reached in: {}",
            summary.expectation_failures.join(", ")
        );
    }

    Ok(())
}

/// The deals block, created with defaults when only CLI overrides ask for it.
fn deals_block(config: &mut BenchmarkConfig) -> &mut DealConfig {
    config.deals.get_or_insert_with(DealConfig::default)
}
