//! baps-align - grouped base counts for nucleotide alignments
//!
//! ## Usage
//!
//! ```bash
//! baps-align sample.fa --partition 0,1,1,1
//! baps-align sample.fa -P groups.txt --format tsv -o counts.tsv
//! baps-align sample.fa --shape-only
//! ```
//!
//! Without a partition every sequence is placed in group 0.

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use baps_align::fasta::{count_fasta, load_alignment};
use baps_align::aggregate::aggregate_alignment;
use baps_align::output::{write_alignment, write_shape, write_tally, TallyFormat};
use baps_align::partition::Partition;

/// Tally layout for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// One aligned block per group
    Text,
    /// Tab-separated, one line per group and column
    Tsv,
}

impl From<FormatArg> for TallyFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => TallyFormat::Text,
            FormatArg::Tsv => TallyFormat::Tsv,
        }
    }
}

/// baps-align - Count A/C/G/T per alignment column within groups of sequences
///
/// Reads an aligned FASTA file (all sequences the same length), encodes each
/// base as a bit flag and prints the headers, the encoded matrix and the
/// per-group base counts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Aligned FASTA file
    file: PathBuf,

    /// Group id of each sequence, in file order (e.g. "0,1,1,1")
    #[arg(short = 'p', long = "partition", conflicts_with = "partition_file")]
    partition: Option<String>,

    /// File with one group id per sequence (whitespace separated, '#' comments)
    #[arg(short = 'P', long = "partition-file")]
    partition_file: Option<PathBuf>,

    /// Output file. Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,

    /// Tally layout
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    format: FormatArg,

    /// Only report the number of sequences and the alignment length
    #[arg(long = "shape-only")]
    shape_only: bool,

    /// Skip printing the encoded alignment matrix
    #[arg(long = "no-matrix")]
    no_matrix: bool,

    /// Print the alignment as A/C/G/T/N letters instead of base codes
    #[arg(long = "letters")]
    letters: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Resolves the partition from the command line, defaulting to one group.
fn resolve_partition(args: &Args, rows: usize) -> Result<Partition> {
    if let Some(list) = &args.partition {
        return list
            .parse()
            .with_context(|| format!("Invalid --partition '{}'", list));
    }
    if let Some(path) = &args.partition_file {
        return Partition::from_file(path)
            .with_context(|| format!("Failed to load partition from {}", path.display()));
    }
    log::info!("No partition given, placing all {} sequences in group 0", rows);
    Ok(Partition::single_group(rows))
}

fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    if args.shape_only {
        let shape = count_fasta(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        write_shape(out, &shape)?;
        return Ok(());
    }

    let alignment = load_alignment(&args.file)
        .with_context(|| format!("Failed to load alignment from {}", args.file.display()))?;
    log::info!("Loaded {} from {}", alignment.shape(), args.file.display());

    let partition = resolve_partition(args, alignment.sequence_count())?;
    let tally = aggregate_alignment(&alignment, &partition)?;
    log::info!(
        "Tallied {} groups (sizes {:?})",
        tally.group_count(),
        tally.group_sizes()
    );

    writeln!(out, "# headers")?;
    for header in &alignment.headers {
        writeln!(out, "{}", header)?;
    }
    if !args.no_matrix {
        write_alignment(out, &alignment, args.letters)?;
    }
    write_tally(out, &tally, args.format.into())?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if args.output == "-" {
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());
        run(&args, &mut handle)?;
        handle.flush()?;
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("Failed to create {}", args.output))?;
        let mut writer = BufWriter::new(file);
        run(&args, &mut writer)?;
        writer.flush()?;
        log::info!("Wrote results to {}", args.output);
    }

    Ok(())
}
