//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use citematch::{DEFAULT_BATCH_CAP, DEFAULT_CAP};

/// Link encyclopedia book citations to digital-library catalog records.
///
/// Citematch looks up a book citation against a digital-library catalog,
/// scores every candidate record on a ten-feature similarity vector, and
/// classifies each pair with a pretrained model.
#[derive(Parser, Debug)]
#[command(name = "citematch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up a single citation template and print its matches as JSON
    Match {
        /// The raw citation template, e.g. "{{cite book |title=... |last=...}}"
        citation: String,

        /// Candidate cap; searches reporting at least this many hits are skipped
        #[arg(long, default_value_t = DEFAULT_CAP)]
        cap: u64,

        /// Report every scored candidate, not just classified matches
        #[arg(long)]
        all_rows: bool,

        /// Path to the pretrained classifier model (JSON)
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Run one partition of a citation table and write match rows as CSV
    Batch {
        /// Input citation table (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output match table (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Which partition to run, 1-based
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        partition: u64,

        /// How many partitions the table is split into
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        of: u64,

        /// Candidate cap; searches reporting at least this many hits are skipped
        #[arg(long, default_value_t = DEFAULT_BATCH_CAP)]
        cap: u64,

        /// Also write the full per-candidate feature table for model training
        #[arg(long)]
        training: Option<PathBuf>,

        /// Path to the pretrained classifier model (JSON)
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Concatenate per-partition match tables into one
    Concat {
        /// Partition output files, in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Combined output table (CSV)
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_match_parses_with_defaults() {
        let args = Args::try_parse_from([
            "citematch",
            "match",
            "{{cite book |title=The Eighth Land}}",
            "--model",
            "model.json",
        ])
        .unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        let Command::Match {
            citation,
            cap,
            all_rows,
            model,
        } = args.command
        else {
            panic!("expected match subcommand");
        };
        assert_eq!(citation, "{{cite book |title=The Eighth Land}}");
        assert_eq!(cap, DEFAULT_CAP);
        assert!(!all_rows);
        assert_eq!(model, PathBuf::from("model.json"));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args =
            Args::try_parse_from(["citematch", "-vv", "match", "x", "--model", "m.json"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args =
            Args::try_parse_from(["citematch", "--quiet", "match", "x", "--model", "m.json"])
                .unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_batch_parses_partition_and_caps() {
        let args = Args::try_parse_from([
            "citematch",
            "batch",
            "--input",
            "in.csv",
            "--output",
            "out.csv",
            "--partition",
            "3",
            "--of",
            "14",
            "--model",
            "m.json",
        ])
        .unwrap();
        let Command::Batch {
            partition,
            of,
            cap,
            training,
            ..
        } = args.command
        else {
            panic!("expected batch subcommand");
        };
        assert_eq!(partition, 3);
        assert_eq!(of, 14);
        assert_eq!(cap, DEFAULT_BATCH_CAP);
        assert!(training.is_none());
    }

    #[test]
    fn test_cli_batch_rejects_partition_zero() {
        let result = Args::try_parse_from([
            "citematch",
            "batch",
            "--input",
            "in.csv",
            "--output",
            "out.csv",
            "--partition",
            "0",
            "--model",
            "m.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_concat_requires_inputs() {
        let result = Args::try_parse_from(["citematch", "concat", "--output", "all.csv"]);
        assert!(result.is_err());

        let args = Args::try_parse_from([
            "citematch",
            "concat",
            "part1.csv",
            "part2.csv",
            "--output",
            "all.csv",
        ])
        .unwrap();
        let Command::Concat { inputs, output } = args.command else {
            panic!("expected concat subcommand");
        };
        assert_eq!(inputs.len(), 2);
        assert_eq!(output, PathBuf::from("all.csv"));
    }

    #[test]
    fn test_cli_missing_subcommand_returns_error() {
        let result = Args::try_parse_from(["citematch"]);
        assert!(result.is_err(), "a subcommand is required");
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["citematch", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["citematch", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["citematch", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
