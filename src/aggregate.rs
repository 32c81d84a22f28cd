//! Per-group base tallies.
//!
//! Rows of the alignment matrix are grouped by their partition id and, for
//! every column, the number of A, C, G and T codes in each group is counted.
//! Unknown codes (0, or anything that is not a single base bit) are skipped.

use ndarray::{Array2, Axis};
use thiserror::Error;

use crate::bases::bucket_index;
use crate::model::{Alignment, GroupTally};
use crate::partition::{Partition, PartitionError};

/// Errors that can occur during aggregation.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Invalid partition: {0}")]
    Partition(#[from] PartitionError),
}

/// Result type for aggregation.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Counts bases per group and column.
///
/// # Arguments
///
/// * `matrix` - Base codes, shape `(sequences, columns)`
/// * `partition` - Group id of every row
///
/// # Returns
///
/// A tally of shape `(groups, columns, 4)` with the last axis ordered
/// `[A, C, G, T]`.
///
/// # Errors
///
/// Fails if the partition length differs from the row count, or if the
/// group ids do not cover `0..n_groups` without gaps.
pub fn group_aggregate(matrix: &Array2<u8>, partition: &Partition) -> AggregateResult<GroupTally> {
    let n_groups = partition.validate_for(matrix.nrows())?;
    let groups = partition.as_slice();

    // Stable: rows of one group keep their original order
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by_key(|&row| groups[row]);

    let mut tally = GroupTally::zeros(n_groups, matrix.ncols());
    for run in order.chunk_by(|&a, &b| groups[a] == groups[b]) {
        let group = groups[run[0]];
        tally.set_group_size(group, run.len());

        let mut lanes = tally.counts_mut().index_axis_mut(Axis(0), group);
        for &row in run {
            for (column, &code) in matrix.row(row).iter().enumerate() {
                if let Some(bucket) = bucket_index(code) {
                    lanes[[column, bucket]] += 1;
                }
            }
        }
    }

    log::debug!(
        "Aggregated {} sequences into {} groups over {} columns",
        matrix.nrows(),
        n_groups,
        matrix.ncols()
    );
    Ok(tally)
}

/// Convenience wrapper taking a loaded alignment.
pub fn aggregate_alignment(alignment: &Alignment, partition: &Partition) -> AggregateResult<GroupTally> {
    group_aggregate(&alignment.matrix, partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_example_tally() {
        let matrix = array![[1, 2, 4, 8], [1, 2, 4, 1], [1, 2, 4, 1]];
        let tally = group_aggregate(&matrix, &Partition::new(vec![0, 1, 1])).unwrap();

        assert_eq!(tally.as_array().dim(), (2, 4, 4));
        assert_eq!(tally.counts(0, 3), Some([0, 0, 0, 1]));
        assert_eq!(tally.counts(1, 3), Some([2, 0, 0, 0]));
        assert_eq!(tally.counts(1, 0), Some([2, 0, 0, 0]));
        assert_eq!(tally.counts(0, 2), Some([0, 0, 1, 0]));
        assert_eq!(tally.group_sizes(), &[1, 2]);
    }

    #[test]
    fn test_unknown_codes_not_counted() {
        let matrix = array![[0, 1, 3], [8, 0, 15], [2, 2, 0]];
        let tally = group_aggregate(&matrix, &Partition::single_group(3)).unwrap();

        assert_eq!(tally.counts(0, 0), Some([0, 1, 0, 1]));
        assert_eq!(tally.counts(0, 1), Some([1, 1, 0, 0]));
        assert_eq!(tally.counts(0, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_bucket_sums_match_called_rows() {
        let matrix = array![
            [1, 0, 4, 8, 2],
            [2, 2, 0, 8, 1],
            [4, 1, 4, 0, 0],
            [8, 8, 2, 1, 4],
            [0, 4, 1, 2, 8],
        ];
        let partition = Partition::new(vec![1, 0, 2, 0, 1]);
        let tally = group_aggregate(&matrix, &partition).unwrap();

        for group in 0..tally.group_count() {
            for column in 0..tally.column_count() {
                let expected = partition
                    .as_slice()
                    .iter()
                    .enumerate()
                    .filter(|&(row, &g)| g == group && matrix[[row, column]] != 0)
                    .count() as u32;
                assert_eq!(tally.called(group, column), Some(expected));
            }
        }
        assert_eq!(tally.group_sizes(), &[2, 2, 1]);
    }

    #[test]
    fn test_unsorted_partition() {
        let matrix = array![[8, 8], [1, 1], [8, 2], [1, 4]];
        let tally = group_aggregate(&matrix, &Partition::new(vec![1, 0, 1, 0])).unwrap();

        assert_eq!(tally.counts(0, 0), Some([2, 0, 0, 0]));
        assert_eq!(tally.counts(1, 0), Some([0, 0, 0, 2]));
        assert_eq!(tally.counts(0, 1), Some([1, 0, 1, 0]));
        assert_eq!(tally.counts(1, 1), Some([0, 1, 0, 1]));
    }

    #[test]
    fn test_partition_with_two_groups_on_four_rows() {
        let matrix = Array2::<u8>::from_elem((4, 3), 4);
        let tally = group_aggregate(&matrix, &Partition::new(vec![0, 1, 1, 1])).unwrap();
        assert_eq!(tally.group_count(), 2);
        assert_eq!(tally.counts(1, 2), Some([0, 0, 3, 0]));
    }

    #[test]
    fn test_invalid_partitions() {
        let matrix = Array2::<u8>::zeros((2, 3));
        assert!(matches!(
            group_aggregate(&matrix, &Partition::new(vec![1, 2])),
            Err(AggregateError::Partition(PartitionError::OutOfRange { .. }))
        ));
        assert!(matches!(
            group_aggregate(&matrix, &Partition::new(vec![0, 2])),
            Err(AggregateError::Partition(PartitionError::OutOfRange { .. }))
        ));
        assert!(matches!(
            group_aggregate(&matrix, &Partition::new(vec![0, 1, 1])),
            Err(AggregateError::Partition(PartitionError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_inputs_unchanged() {
        let matrix = array![[1, 2], [4, 8]];
        let partition = Partition::new(vec![1, 0]);
        let before = (matrix.clone(), partition.clone());
        group_aggregate(&matrix, &partition).unwrap();
        assert_eq!((matrix, partition), before);
    }

    #[test]
    fn test_aggregate_loaded_alignment() {
        let alignment = Alignment::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            array![[1, 2], [1, 8], [4, 8]],
        );
        let tally = aggregate_alignment(&alignment, &Partition::new(vec![0, 0, 1])).unwrap();
        assert_eq!(tally.counts(0, 0), Some([2, 0, 0, 0]));
        assert_eq!(tally.counts(0, 1), Some([0, 1, 0, 1]));
        assert_eq!(tally.counts(1, 1), Some([0, 0, 0, 1]));
        assert_eq!(
            tally,
            group_aggregate(&alignment.matrix, &Partition::new(vec![0, 0, 1])).unwrap()
        );
    }
}
