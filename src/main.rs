//! CLI entry point for the citematch tool.

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use citematch::{
    ArchiveRetriever, CatalogCredentials, LinearModel, Partition, PipelineConfig, batch_io,
    get_match, read_citations, run_batch, write_matches,
};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::Match {
            citation,
            cap,
            all_rows,
            model,
        } => {
            let classifier = LinearModel::from_path(&model)
                .with_context(|| format!("loading classifier model from {}", model.display()))?;
            let retriever = build_retriever()?;
            let config = PipelineConfig::new().with_cap(cap).with_all_rows(all_rows);

            let results = get_match(&retriever, &classifier, &citation, &config).await?;
            match results {
                Some(results) => println!("{}", serde_json::to_string_pretty(&results)?),
                None => info!("No matches found for this citation"),
            }
        }

        Command::Batch {
            input,
            output,
            partition,
            of,
            cap,
            training,
            model,
        } => {
            let classifier = LinearModel::from_path(&model)
                .with_context(|| format!("loading classifier model from {}", model.display()))?;
            let retriever = build_retriever()?;
            let config = PipelineConfig::for_batch()
                .with_cap(cap)
                .with_all_rows(training.is_some());

            let records = read_citations(&input)
                .with_context(|| format!("reading citation table {}", input.display()))?;
            info!(citations = records.len(), "Citation table loaded");

            let partitions = Partition::split(records.len(), usize::try_from(of)?);
            let index = usize::try_from(partition)? - 1;
            let Some(part) = partitions.get(index).copied() else {
                bail!("partition {partition} of {of} does not exist");
            };
            info!(
                partition,
                of,
                start = part.start,
                end = part.end,
                "Running partition"
            );

            let bar = ProgressBar::new(part.len() as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {pos}/{len} citations ({eta} remaining)",
                )
                .context("invalid progress template")?,
            );

            let outcome =
                run_batch(&retriever, &classifier, &records, part, &config, Some(&bar)).await?;
            bar.finish_and_clear();

            write_matches(&output, &outcome.matches)
                .with_context(|| format!("writing match table {}", output.display()))?;
            info!(rows = outcome.matches.len(), output = %output.display(), "Match table written");

            if let Some(training_path) = training {
                batch_io::write_training_rows(&training_path, &outcome.training)
                    .with_context(|| format!("writing training table {}", training_path.display()))?;
                info!(rows = outcome.training.len(), output = %training_path.display(), "Training table written");
            }

            println!("{}", outcome.tally.summary());
        }

        Command::Concat { inputs, output } => {
            let rows = batch_io::concat_outputs(&inputs, &output)
                .with_context(|| format!("concatenating into {}", output.display()))?;
            info!(rows, inputs = inputs.len(), output = %output.display(), "Partitions combined");
        }
    }

    Ok(())
}

/// Builds the catalog retriever, with credentials from the environment
/// when present.
fn build_retriever() -> Result<ArchiveRetriever> {
    let credentials = CatalogCredentials::from_env();
    if credentials.is_none() {
        warn!("No catalog credentials in the environment; searching anonymously");
    }
    Ok(ArchiveRetriever::new(credentials.as_ref())?)
}
