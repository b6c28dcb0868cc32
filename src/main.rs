// Takeout Restore CLI binary

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use takeout_restore::batch;
use takeout_restore::constants::DEFAULT_BATCH_WORKERS;
use takeout_restore::merge::{self, MergeOptions};
use takeout_restore::pairing::{self, events::LogSink, PairingOptions};

#[derive(Parser)]
#[command(name = "takeout-restore")]
#[command(about = "Re-pairs exported media with sidecar metadata and merges it back", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair media files with their sidecar records and report the result
    Pair {
        /// Export directory to pair
        dir: PathBuf,
        /// Report unmatched entries instead of failing on them
        #[arg(long)]
        lenient: bool,
        /// Require media and record extensions to agree
        #[arg(long)]
        require_ext: bool,
    },

    /// Pair a directory, then merge metadata into copies of the media
    Merge {
        /// Export directory to process
        dir: PathBuf,
        /// Directory to write merged copies into
        #[arg(short, long)]
        out: PathBuf,
        /// Report unmatched entries instead of failing on them
        #[arg(long)]
        lenient: bool,
        /// Require media and record extensions to agree
        #[arg(long)]
        require_ext: bool,
        /// Replace GPS tags that already exist in the media file
        #[arg(long)]
        overwrite_geo: bool,
    },

    /// Process every subdirectory of an export root
    Batch {
        /// Export root containing one subdirectory per album/period
        root: PathBuf,
        /// Directory to write merged copies into (pair-only when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Worker threads for independent directories
        #[arg(long, default_value_t = DEFAULT_BATCH_WORKERS)]
        workers: usize,
        /// Report unmatched entries instead of failing each directory
        #[arg(long)]
        lenient: bool,
        /// Require media and record extensions to agree
        #[arg(long)]
        require_ext: bool,
        /// Replace GPS tags that already exist in media files
        #[arg(long)]
        overwrite_geo: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pair {
            dir,
            lenient,
            require_ext,
        } => cmd_pair(dir, lenient, require_ext),
        Commands::Merge {
            dir,
            out,
            lenient,
            require_ext,
            overwrite_geo,
        } => cmd_merge(dir, out, lenient, require_ext, overwrite_geo),
        Commands::Batch {
            root,
            out,
            workers,
            lenient,
            require_ext,
            overwrite_geo,
        } => cmd_batch(root, out, workers, lenient, require_ext, overwrite_geo),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn cmd_pair(dir: PathBuf, lenient: bool, require_ext: bool) -> Result<()> {
    let options = PairingOptions {
        lenient,
        require_ext,
    };
    let mut sink = LogSink;
    let outcome = pairing::pair_directory(&dir, &options, &mut sink)?;

    println!("Pairing complete:");
    println!("  Records:         {}", outcome.assignments.len());
    println!("  Media matched:   {}", outcome.assigned_count());
    println!("  Media unmatched: {}", outcome.unmatched_media.len());
    println!("  Empty records:   {}", outcome.unmatched_records.len());

    for assignment in &outcome.assignments {
        if assignment.media.is_empty() {
            continue;
        }
        println!();
        println!("{}", assignment.record.title);
        for descriptor in &assignment.media {
            let marker = if descriptor.is_edited() { " (edited)" } else { "" };
            println!("  {}{}", descriptor.path.display(), marker);
        }
    }

    if !outcome.unmatched_media.is_empty() {
        println!();
        println!("Unmatched media:");
        for descriptor in &outcome.unmatched_media {
            println!("  {}", descriptor.path.display());
        }
    }

    if !outcome.unmatched_records.is_empty() {
        println!();
        println!("Unmatched records:");
        for record in &outcome.unmatched_records {
            println!("  {}", record.path.display());
        }
    }

    Ok(())
}

fn cmd_merge(
    dir: PathBuf,
    out: PathBuf,
    lenient: bool,
    require_ext: bool,
    overwrite_geo: bool,
) -> Result<()> {
    let options = PairingOptions {
        lenient,
        require_ext,
    };
    let mut sink = LogSink;
    let outcome = pairing::pair_directory(&dir, &options, &mut sink)?;

    let merge_options = MergeOptions {
        target_dir: out,
        overwrite_geo,
    };
    let summary = merge::merge_outcome(&outcome, &merge_options)?;

    println!("Merge complete:");
    println!("  Merged: {}", summary.merged);
    println!("  Failed: {}", summary.failed);
    if lenient && !outcome.unmatched_media.is_empty() {
        println!("  Skipped (unmatched): {}", outcome.unmatched_media.len());
    }

    if summary.failed > 0 {
        anyhow::bail!("{} files failed to merge", summary.failed);
    }

    Ok(())
}

fn cmd_batch(
    root: PathBuf,
    out: Option<PathBuf>,
    workers: usize,
    lenient: bool,
    require_ext: bool,
    overwrite_geo: bool,
) -> Result<()> {
    let pairing_options = PairingOptions {
        lenient,
        require_ext,
    };
    let merge_options = out.map(|target_dir| MergeOptions {
        target_dir,
        overwrite_geo,
    });

    let summary = batch::run_batch(&root, &pairing_options, merge_options.as_ref(), workers)?;

    println!("Batch complete:");
    println!("  Directories:     {}", summary.directories);
    println!("  Succeeded:       {}", summary.succeeded);
    println!("  Failed:          {}", summary.failed);
    println!("  Media matched:   {}", summary.media_matched);
    println!("  Media unmatched: {}", summary.media_unmatched);

    if summary.failed > 0 {
        anyhow::bail!("{} directories failed", summary.failed);
    }

    Ok(())
}
