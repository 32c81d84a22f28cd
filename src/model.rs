//! Data model for bit-coded alignments.
//!
//! This module contains the data structures shared by the loader and the
//! aggregator:
//! - Alignment shape reported by the counting pass
//! - Encoded FASTA records
//! - The alignment matrix (sequences x columns)
//! - The per-group base tally (groups x columns x 4)

use ndarray::{Array2, Array3, ArrayView1, Axis};

use crate::bases::decode_base;

/// Number of sequences and columns of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentShape {
    /// Number of FASTA records
    pub sequences: usize,
    /// Shared length of every record body
    pub columns: usize,
}

impl AlignmentShape {
    pub fn new(sequences: usize, columns: usize) -> Self {
        Self { sequences, columns }
    }

    /// Returns the shape as a `(rows, columns)` tuple.
    pub fn dim(&self) -> (usize, usize) {
        (self.sequences, self.columns)
    }
}

impl std::fmt::Display for AlignmentShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sequences x {} columns", self.sequences, self.columns)
    }
}

/// A single FASTA record with its body already bit-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Header line without the leading '>' (trimmed)
    pub header: String,
    /// Encoded bases, one code per alignment column
    pub codes: Vec<u8>,
}

impl FastaRecord {
    pub fn new(header: impl Into<String>, codes: Vec<u8>) -> Self {
        Self {
            header: header.into(),
            codes,
        }
    }
}

/// An alignment loaded as a fixed-size matrix of base codes.
///
/// Row `i` holds the `i`-th record of the file and `headers[i]` its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Headers in file order
    pub headers: Vec<String>,
    /// Base codes, shape `(sequences, columns)`
    pub matrix: Array2<u8>,
}

impl Alignment {
    /// Creates an alignment from headers and a matrix with one row per header.
    pub fn new(headers: Vec<String>, matrix: Array2<u8>) -> Self {
        debug_assert_eq!(headers.len(), matrix.nrows());
        Self { headers, matrix }
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.matrix.nrows()
    }

    /// Returns the number of alignment columns.
    pub fn alignment_length(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn shape(&self) -> AlignmentShape {
        AlignmentShape::new(self.sequence_count(), self.alignment_length())
    }

    /// Gets a header by row index.
    pub fn header(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str)
    }

    /// Gets the encoded row of a sequence.
    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, u8>> {
        (index < self.sequence_count()).then(|| self.matrix.row(index))
    }

    /// Gets one alignment column across all sequences.
    pub fn column(&self, index: usize) -> Option<ArrayView1<'_, u8>> {
        (index < self.alignment_length()).then(|| self.matrix.column(index))
    }

    /// Gets a header together with its row.
    pub fn get(&self, index: usize) -> Option<(&str, ArrayView1<'_, u8>)> {
        Some((self.header(index)?, self.row(index)?))
    }

    /// Decodes a row back into nucleotide letters (unknown codes become `N`).
    pub fn decoded_row(&self, index: usize) -> Option<String> {
        self.row(index)
            .map(|row| row.iter().map(|&code| decode_base(code)).collect())
    }
}

/// Per-group base counts, shape `(groups, columns, 4)`.
///
/// The last axis follows the fixed order `[A, C, G, T]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTally {
    counts: Array3<u32>,
    group_sizes: Vec<usize>,
}

impl GroupTally {
    /// Creates a zeroed tally.
    pub fn zeros(groups: usize, columns: usize) -> Self {
        Self {
            counts: Array3::zeros((groups, columns, 4)),
            group_sizes: vec![0; groups],
        }
    }

    pub(crate) fn counts_mut(&mut self) -> &mut Array3<u32> {
        &mut self.counts
    }

    pub(crate) fn set_group_size(&mut self, group: usize, size: usize) {
        self.group_sizes[group] = size;
    }

    /// Returns the number of groups.
    pub fn group_count(&self) -> usize {
        self.counts.len_of(Axis(0))
    }

    /// Returns the number of alignment columns.
    pub fn column_count(&self) -> usize {
        self.counts.len_of(Axis(1))
    }

    /// Returns the underlying `(groups, columns, 4)` array.
    pub fn as_array(&self) -> &Array3<u32> {
        &self.counts
    }

    /// Returns the `[A, C, G, T]` counts of a group at a column.
    pub fn counts(&self, group: usize, column: usize) -> Option<[u32; 4]> {
        if group >= self.group_count() || column >= self.column_count() {
            return None;
        }
        let lane = self.counts.slice(ndarray::s![group, column, ..]);
        Some([lane[0], lane[1], lane[2], lane[3]])
    }

    /// Number of sequences of a group carrying a canonical base at a column.
    pub fn called(&self, group: usize, column: usize) -> Option<u32> {
        self.counts(group, column).map(|c| c.iter().sum())
    }

    /// Number of sequences assigned to each group.
    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }
}
