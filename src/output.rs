//! Plain-text rendering of loaded alignments and group tallies.

use std::io::{self, Write};

use crate::model::{Alignment, AlignmentShape, GroupTally};

/// Layout used when writing a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TallyFormat {
    /// One block per group, aligned columns
    #[default]
    Text,
    /// One `group column A C G T` line per cell, tab-separated
    Tsv,
}

const BASE_LABELS: [&str; 4] = ["A", "C", "G", "T"];

/// Writes the shape reported by the counting pass.
pub fn write_shape<W: Write>(out: &mut W, shape: &AlignmentShape) -> io::Result<()> {
    writeln!(out, "sequences\t{}", shape.sequences)?;
    writeln!(out, "columns\t{}", shape.columns)
}

/// Writes every header followed by its row, either as base codes or, with
/// `letters`, decoded back to A/C/G/T/N.
pub fn write_alignment<W: Write>(out: &mut W, alignment: &Alignment, letters: bool) -> io::Result<()> {
    writeln!(out, "# alignment: {}", alignment.shape())?;
    for (index, (header, row)) in alignment.headers.iter().zip(alignment.matrix.rows()).enumerate() {
        write!(out, "{}\t", header)?;
        if letters {
            write!(out, "{}", alignment.decoded_row(index).unwrap_or_default())?;
        } else {
            for (i, code) in row.iter().enumerate() {
                if i > 0 {
                    write!(out, " ")?;
                }
                write!(out, "{}", code)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes a tally in the requested layout.
pub fn write_tally<W: Write>(out: &mut W, tally: &GroupTally, format: TallyFormat) -> io::Result<()> {
    match format {
        TallyFormat::Text => write_tally_text(out, tally),
        TallyFormat::Tsv => write_tally_tsv(out, tally),
    }
}

fn write_tally_text<W: Write>(out: &mut W, tally: &GroupTally) -> io::Result<()> {
    writeln!(
        out,
        "# tally: {} groups x {} columns",
        tally.group_count(),
        tally.column_count()
    )?;
    let width = tally.group_sizes().iter().max().copied().unwrap_or(0).to_string().len().max(1);

    for group in 0..tally.group_count() {
        writeln!(out, "group {} ({} sequences)", group, tally.group_sizes()[group])?;
        write!(out, "{:>8}", "column")?;
        for label in BASE_LABELS {
            write!(out, " {:>width$}", label, width = width)?;
        }
        writeln!(out)?;
        for column in 0..tally.column_count() {
            write!(out, "{:>8}", column)?;
            for count in tally.counts(group, column).unwrap_or_default() {
                write!(out, " {:>width$}", count, width = width)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_tally_tsv<W: Write>(out: &mut W, tally: &GroupTally) -> io::Result<()> {
    writeln!(out, "group\tcolumn\t{}", BASE_LABELS.join("\t"))?;
    for (group, lanes) in tally.as_array().outer_iter().enumerate() {
        for (column, lane) in lanes.outer_iter().enumerate() {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                group, column, lane[0], lane[1], lane[2], lane[3]
            )?;
        }
    }
    Ok(())
}
