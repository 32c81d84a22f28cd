//! Sample partitions.
//!
//! A partition assigns every sequence of an alignment to a group. Group ids
//! are small non-negative integers that must cover `0..n_groups` without
//! gaps. Partitions can be given inline (`0,1,1,1`) or read from a sidecar
//! file with one or more ids per line; `#` starts a comment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur while building or validating a partition.
#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("Failed to read partition file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty partition")]
    Empty,

    #[error("Invalid group id '{token}' at position {position}")]
    Parse { token: String, position: usize },

    #[error(
        "Group partition should be from 0 to {expected_max}, observed min={min} max={max}"
    )]
    OutOfRange {
        min: usize,
        max: usize,
        expected_max: usize,
    },

    #[error("Partition has {partition} entries but the alignment has {rows} sequences")]
    LengthMismatch { partition: usize, rows: usize },
}

/// Result type for partition operations.
pub type PartitionResult<T> = Result<T, PartitionError>;

/// One group id per alignment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<usize>,
}

impl Partition {
    /// Wraps a list of group ids. No validation is done here; see [`Partition::validate`].
    pub fn new(groups: Vec<usize>) -> Self {
        Self { groups }
    }

    /// A partition putting all `rows` sequences in group 0.
    pub fn single_group(rows: usize) -> Self {
        Self::new(vec![0; rows])
    }

    /// Reads a partition from a sidecar file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PartitionResult<Self> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.groups
    }

    /// Checks that the distinct group ids are exactly `0..=max`.
    ///
    /// # Returns
    ///
    /// The number of groups.
    pub fn validate(&self) -> PartitionResult<usize> {
        let mut distinct = self.groups.clone();
        distinct.sort_unstable();
        distinct.dedup();

        let (Some(&min), Some(&max)) = (distinct.first(), distinct.last()) else {
            return Err(PartitionError::Empty);
        };
        let expected_max = distinct.len() - 1;
        if min != 0 || max != expected_max {
            return Err(PartitionError::OutOfRange {
                min,
                max,
                expected_max,
            });
        }
        Ok(distinct.len())
    }

    /// Validates the partition against an alignment with `rows` sequences.
    pub fn validate_for(&self, rows: usize) -> PartitionResult<usize> {
        if self.groups.len() != rows {
            return Err(PartitionError::LengthMismatch {
                partition: self.groups.len(),
                rows,
            });
        }
        self.validate()
    }
}

impl FromStr for Partition {
    type Err = PartitionError;

    /// Parses group ids separated by commas and/or whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = s
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
            .filter(|token| !token.is_empty());

        let mut groups = Vec::new();
        for (position, token) in tokens.enumerate() {
            let id = token.parse::<usize>().map_err(|_| PartitionError::Parse {
                token: token.to_string(),
                position: position + 1,
            })?;
            groups.push(id);
        }

        if groups.is_empty() {
            return Err(PartitionError::Empty);
        }
        Ok(Self::new(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_contiguous() {
        assert_eq!(Partition::new(vec![0, 1, 1, 1]).validate().unwrap(), 2);
        assert_eq!(Partition::new(vec![2, 0, 1, 0]).validate().unwrap(), 3);
        assert_eq!(Partition::single_group(5).validate().unwrap(), 1);
    }

    #[test]
    fn test_validate_missing_zero() {
        let result = Partition::new(vec![1, 2]).validate();
        match result {
            Err(PartitionError::OutOfRange {
                min,
                max,
                expected_max,
            }) => {
                assert_eq!((min, max, expected_max), (1, 2, 1));
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_gap() {
        let result = Partition::new(vec![0, 2]).validate();
        assert!(matches!(
            result,
            Err(PartitionError::OutOfRange {
                min: 0,
                max: 2,
                expected_max: 1
            })
        ));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("from 0 to 1"), "{}", message);
    }

    #[test]
    fn test_validate_empty() {
        assert!(matches!(Partition::new(vec![]).validate(), Err(PartitionError::Empty)));
    }

    #[test]
    fn test_validate_for_row_count() {
        let partition = Partition::new(vec![0, 1, 1]);
        assert_eq!(partition.validate_for(3).unwrap(), 2);
        assert!(matches!(
            partition.validate_for(4),
            Err(PartitionError::LengthMismatch {
                partition: 3,
                rows: 4
            })
        ));
    }

    #[test]
    fn test_parse_inline() {
        let partition: Partition = "0,1, 1 1".parse().unwrap();
        assert_eq!(partition.as_slice(), &[0, 1, 1, 1]);
    }

    #[test]
    fn test_parse_with_comments_and_newlines() {
        let partition: Partition = "# groups\n0\n1 # outgroup\n\n1\n".parse().unwrap();
        assert_eq!(partition.as_slice(), &[0, 1, 1]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "0,x,1".parse::<Partition>(),
            Err(PartitionError::Parse { position: 2, .. })
        ));
        assert!(matches!(
            "0,-1".parse::<Partition>(),
            Err(PartitionError::Parse { position: 2, .. })
        ));
        assert!(matches!("  # nothing\n".parse::<Partition>(), Err(PartitionError::Empty)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0\n1\n1\n1").unwrap();
        let partition = Partition::from_file(file.path()).unwrap();
        assert_eq!(partition.as_slice(), &[0, 1, 1, 1]);
    }
}
