use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use diagchain::args::{parse_seed, AlignArgs};
use diagchain::chaining::DiagonalSegment;
use diagchain::diagnostics::{diagnostics_enabled, DiagnosticCounters};
use diagchain::pipeline::{align_batch, AlignTask, FrameSegment};
use diagchain::utils::matrix::encode;

#[derive(Parser)]
#[command(name = "diagchain")]
#[command(version = "0.1.0")]
#[command(about = "Chain seed diagonals and refine them into gapped alignments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align one query against one target from a set of seed segments
    Align(AlignArgs),
}

fn run_align(args: AlignArgs) -> Result<()> {
    let num_threads = if args.num_threads == 0 {
        num_cpus::get()
    } else {
        args.num_threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("Failed to build thread pool")?;

    let config = args.search_config();
    config.validate().context("Invalid alignment parameters")?;
    let matrix = config.scoring.build();

    let query = encode(config.scoring.matrix, args.query.as_bytes());
    let target = encode(config.scoring.matrix, args.target.as_bytes());

    let mut seeds = Vec::with_capacity(args.seeds.len());
    for s in &args.seeds {
        let (q, t, len, frame) = parse_seed(s).map_err(anyhow::Error::msg)?;
        if !DiagonalSegment::new(q, t, len, 0).lies_within(&query, &target) {
            bail!(
                "Seed {} lies outside the sequences or spans a delimiter (query {}, target {})",
                s,
                query.len(),
                target.len()
            );
        }
        let seg = DiagonalSegment::scored(&query, &target, q, t, len, &matrix);
        seeds.push(FrameSegment { frame, seg });
    }
    log::debug!(
        "{} seeds, query {} letters, target {} letters",
        seeds.len(),
        query.len(),
        target.len()
    );

    let task = AlignTask {
        id: 0,
        query,
        target,
        seeds,
        bias: None,
    };

    let diagnostics = diagnostics_enabled().then(DiagnosticCounters::default);
    let results = align_batch(
        std::slice::from_ref(&task),
        &matrix,
        &config,
        diagnostics.as_ref(),
    );

    for result in results {
        let result = result.with_context(|| format!("Task {} failed", task.id))?;
        for hsp in &result.hsps {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                hsp.frame,
                hsp.query_range.begin + 1,
                hsp.query_range.end,
                hsp.target_range.begin + 1,
                hsp.target_range.end,
                hsp.score,
                hsp.identities,
                hsp.mismatches,
                hsp.positives,
                hsp.gap_openings,
                hsp.gaps,
                if hsp.has_transcript() {
                    hsp.transcript.to_cigar()
                } else {
                    "*".to_string()
                }
            );
        }
    }

    if let Some(diag) = &diagnostics {
        diag.print_summary();
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Align(args) => run_align(args)?,
    }
    Ok(())
}
