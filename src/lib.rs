//! # baps-align - grouped base counts for nucleotide alignments
//!
//! Loads a multiple-sequence FASTA alignment into a matrix of bit-coded bases
//! and tallies, for user-defined groups of sequences, how many A, C, G and T
//! occur at each alignment column.
//!
//! ## Architecture
//!
//! Data flows one way: file -> loader -> matrix -> aggregator -> tally.
//! - `bases`: nucleotide bit encoding (A=1, C=2, G=4, T=8, other=0)
//! - `model`: alignment shape, records, alignment matrix and group tally
//! - `fasta`: two-pass FASTA loader with uniform-length validation
//! - `partition`: group assignments and their validation/parsing
//! - `aggregate`: per-group, per-column base counting
//! - `output`: text rendering used by the command-line driver
//!
//! ## Example
//!
//! ```no_run
//! use baps_align::{group_aggregate, load_alignment, Partition};
//!
//! let alignment = load_alignment("sample.fa")?;
//! let tally = group_aggregate(&alignment.matrix, &Partition::new(vec![0, 1, 1, 1]))?;
//! println!("{:?}", tally.counts(0, 0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod bases;
pub mod fasta;
pub mod model;
pub mod output;
pub mod partition;

pub use aggregate::{group_aggregate, AggregateError};
pub use fasta::{count_fasta, load_alignment, FastaError};
pub use model::{Alignment, AlignmentShape, GroupTally};
pub use partition::{Partition, PartitionError};
