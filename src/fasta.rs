//! FASTA alignment loader.
//!
//! This module reads a FASTA file into a fixed-size matrix of base codes.
//! Loading is done in two passes over the input:
//! 1. a counting pass that validates that every record body has the same
//!    length and reports the alignment shape,
//! 2. an encoding pass that walks the records again and writes each one
//!    into its row of a pre-allocated matrix.
//!
//! ## FASTA Format
//!
//! ```text
//! >first record header
//! ACGTACGTACGT...
//! ACGT
//! >second record header
//! TGCATGCATGCA...
//! ```
//!
//! A line whose first character is `>` starts a record; the rest of the line
//! (trimmed) is the header. The following lines, each trimmed, are
//! concatenated to form the body.

use std::fs::File;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use ndarray::{aview1, Array2};
use thiserror::Error;

use crate::bases::{encode_into, encode_sequence};
use crate::model::{Alignment, AlignmentShape, FastaRecord};

/// Errors that can occur while loading a FASTA alignment.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty FASTA file")]
    EmptyFile,

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),

    #[error(
        "Length of sequence {index} ({found}) is not the same as previous sequences ({expected})"
    )]
    LengthMismatch {
        /// 1-based ordinal of the offending record
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Sequence {index} changed between the counting and the loading pass")]
    InconsistentRecord { index: usize },
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Header and raw (trimmed, concatenated) body of one record.
///
/// The body holds one byte per character: ASCII characters as-is, anything
/// else as `0`, which never encodes to a base.
struct RawRecord {
    header: String,
    body: Vec<u8>,
}

/// Splits a byte stream into header/body blocks.
///
/// `\n`, `\r\n` and a bare `\r` all end a line.
struct RecordScanner<R> {
    chunks: std::io::Split<R>,
    queued: VecDeque<Vec<u8>>,
    pending_header: Option<String>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> RecordScanner<R> {
    fn new(reader: R) -> Self {
        Self {
            chunks: reader.split(b'\n'),
            queued: VecDeque::new(),
            pending_header: None,
            line_number: 0,
            done: false,
        }
    }

    fn next_line(&mut self) -> FastaResult<Option<Vec<u8>>> {
        loop {
            if let Some(line) = self.queued.pop_front() {
                self.line_number += 1;
                return Ok(Some(line));
            }
            let Some(chunk) = self.chunks.next() else {
                return Ok(None);
            };
            let bytes = chunk?;
            let bytes = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);
            self.queued
                .extend(bytes.split(|&b| b == b'\r').map(<[u8]>::to_vec));
        }
    }

    fn next_record(&mut self) -> FastaResult<Option<RawRecord>> {
        if self.done {
            return Ok(None);
        }

        let header = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                // Only reached before the first header: skip blank lines
                let Some(line) = self.next_line()? else {
                    self.done = true;
                    return Ok(None);
                };
                if let Some(header) = header_text(&line) {
                    break header;
                }
                if !String::from_utf8_lossy(&line).trim().is_empty() {
                    return Err(FastaError::SequenceWithoutHeader(self.line_number));
                }
            },
        };

        let mut body = Vec::new();
        while let Some(line) = self.next_line()? {
            if let Some(next_header) = header_text(&line) {
                self.pending_header = Some(next_header);
                break;
            }
            push_body_symbols(&mut body, &line);
        }

        Ok(Some(RawRecord { header, body }))
    }
}

impl<R: BufRead> Iterator for RecordScanner<R> {
    type Item = FastaResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Appends one symbol per character of the trimmed line.
///
/// Invalid UTF-8 is replaced by U+FFFD first, so each invalid sequence counts
/// as a single unknown character.
fn push_body_symbols(body: &mut Vec<u8>, line: &[u8]) {
    let text = String::from_utf8_lossy(line);
    body.extend(
        text.trim()
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { 0 }),
    );
}

/// Returns the trimmed header text if `line` is a header line.
fn header_text(line: &[u8]) -> Option<String> {
    match line.split_first() {
        Some((b'>', rest)) => Some(String::from_utf8_lossy(rest).trim().to_string()),
        _ => None,
    }
}

/// Lazy iterator over the encoded records of a FASTA stream.
///
/// Yields records in file order. The iterator is single-pass; re-open the
/// file (or rewind the reader) to iterate again.
pub struct FastaRecords<R> {
    scanner: RecordScanner<R>,
}

impl<R: BufRead> FastaRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            scanner: RecordScanner::new(reader),
        }
    }
}

impl<R: BufRead> Iterator for FastaRecords<R> {
    type Item = FastaResult<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scanner.next().map(|raw| {
            raw.map(|RawRecord { header, body }| FastaRecord::new(header, encode_sequence(&body)))
        })
    }
}

/// Opens a FASTA file and returns a lazy iterator over its encoded records.
pub fn fasta_records<P: AsRef<Path>>(path: P) -> FastaResult<FastaRecords<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(FastaRecords::new(BufReader::new(file)))
}

/// Counts records and validates that they all share the same body length.
///
/// # Returns
///
/// The alignment shape `(sequences, columns)`.
///
/// # Errors
///
/// `LengthMismatch` names the first record whose body length differs from
/// the first record's. `EmptyFile` if there is no record at all.
pub fn count_fasta_reader<R: BufRead>(reader: R) -> FastaResult<AlignmentShape> {
    let mut sequences = 0;
    let mut columns = 0;

    for record in RecordScanner::new(reader) {
        let record = record?;
        sequences += 1;
        if sequences == 1 {
            columns = record.body.len();
        } else if record.body.len() != columns {
            return Err(FastaError::LengthMismatch {
                index: sequences,
                expected: columns,
                found: record.body.len(),
            });
        }
    }

    if sequences == 0 {
        return Err(FastaError::EmptyFile);
    }
    Ok(AlignmentShape::new(sequences, columns))
}

/// Counts the sequences of a FASTA file and their common length.
///
/// # Examples
///
/// ```no_run
/// use baps_align::fasta::count_fasta;
///
/// let shape = count_fasta("sample.fa").unwrap();
/// println!("{} sequences, {} columns", shape.sequences, shape.columns);
/// ```
pub fn count_fasta<P: AsRef<Path>>(path: P) -> FastaResult<AlignmentShape> {
    let file = File::open(&path)?;
    let shape = count_fasta_reader(BufReader::new(file))?;
    log::debug!("Counted {} in {}", shape, path.as_ref().display());
    Ok(shape)
}

/// Encodes the records straight into a `shape`-sized matrix, in arrival order.
fn assemble<I>(shape: AlignmentShape, records: I) -> FastaResult<Alignment>
where
    I: Iterator<Item = FastaResult<RawRecord>>,
{
    let mut matrix = Array2::<u8>::zeros(shape.dim());
    let mut headers = Vec::with_capacity(shape.sequences);

    for (row, record) in records.enumerate() {
        let RawRecord { header, body } = record?;
        if row >= shape.sequences || body.len() != shape.columns {
            return Err(FastaError::InconsistentRecord { index: row + 1 });
        }
        let mut target = matrix.row_mut(row);
        match target.as_slice_mut() {
            Some(cells) => encode_into(&body, cells),
            None => target.assign(&aview1(&encode_sequence(&body))),
        }
        headers.push(header);
    }

    if headers.len() != shape.sequences {
        return Err(FastaError::InconsistentRecord {
            index: headers.len() + 1,
        });
    }
    Ok(Alignment::new(headers, matrix))
}

/// Loads a FASTA alignment from a seekable reader.
///
/// The reader is scanned once to validate the shape, rewound, then scanned
/// again to encode the records.
pub fn load_alignment_reader<R: BufRead + Seek>(mut reader: R) -> FastaResult<Alignment> {
    let shape = count_fasta_reader(&mut reader)?;
    reader.rewind()?;
    assemble(shape, RecordScanner::new(&mut reader))
}

/// Loads a FASTA alignment into headers and a matrix of base codes.
///
/// # Examples
///
/// ```no_run
/// use baps_align::fasta::load_alignment;
///
/// let alignment = load_alignment("sample.fa").unwrap();
/// println!("Loaded {} sequences", alignment.sequence_count());
/// ```
pub fn load_alignment<P: AsRef<Path>>(path: P) -> FastaResult<Alignment> {
    let shape = count_fasta(&path)?;
    let file = File::open(&path)?;
    let alignment = assemble(shape, RecordScanner::new(BufReader::new(file)))?;
    log::debug!("Loaded {} from {}", shape, path.as_ref().display());
    Ok(alignment)
}

/// Loads a FASTA alignment from a string.
///
/// Useful for testing or processing in-memory data.
pub fn load_alignment_str(content: &str) -> FastaResult<Alignment> {
    load_alignment_reader(Cursor::new(content.as_bytes()))
}
