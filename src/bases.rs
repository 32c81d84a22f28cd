//! Nucleotide bit encoding.
//!
//! Each base is stored as a single bit so that ambiguity codes can later be
//! represented as the OR of their member bases:
//!
//! | Base | Code |
//! |------|------|
//! | A/a  | 1    |
//! | C/c  | 2    |
//! | G/g  | 4    |
//! | T/t  | 8    |
//!
//! Anything else (N, gaps, IUPAC ambiguity letters, ...) is encoded as 0.

/// Code for an unknown base or a gap.
pub const UNKNOWN: u8 = 0;
pub const A: u8 = 1;
pub const C: u8 = 2;
pub const G: u8 = 4;
pub const T: u8 = 8;

/// The four canonical base codes, in tally order `[A, C, G, T]`.
pub const BASE_CODES: [u8; 4] = [A, C, G, T];

/// Byte -> base code lookup table.
const ENCODE_TABLE: [u8; 256] = build_encode_table();

const fn build_encode_table() -> [u8; 256] {
    let mut table = [UNKNOWN; 256];
    table[b'A' as usize] = A;
    table[b'a' as usize] = A;
    table[b'C' as usize] = C;
    table[b'c' as usize] = C;
    table[b'G' as usize] = G;
    table[b'g' as usize] = G;
    table[b'T' as usize] = T;
    table[b't' as usize] = T;
    table
}

/// Encodes a single nucleotide character.
#[inline]
pub fn encode_base(byte: u8) -> u8 {
    ENCODE_TABLE[byte as usize]
}

/// Encodes a whole sequence; the output has the same length as the input.
pub fn encode_sequence(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| encode_base(b)).collect()
}

/// Encodes `seq` into an existing buffer of the same length.
pub fn encode_into(seq: &[u8], out: &mut [u8]) {
    debug_assert_eq!(seq.len(), out.len());
    for (dst, &src) in out.iter_mut().zip(seq) {
        *dst = encode_base(src);
    }
}

/// Maps a base code back to an uppercase letter; anything that is not a
/// single canonical bit becomes `N`.
pub fn decode_base(code: u8) -> char {
    match code {
        A => 'A',
        C => 'C',
        G => 'G',
        T => 'T',
        _ => 'N',
    }
}

/// Position of a code in the `[A, C, G, T]` tally axis.
#[inline]
pub fn bucket_index(code: u8) -> Option<usize> {
    match code {
        A => Some(0),
        C => Some(1),
        G => Some(2),
        T => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_case_insensitive() {
        assert_eq!(encode_sequence(b"AaCcGgTt"), vec![1, 1, 2, 2, 4, 4, 8, 8]);
    }

    #[test]
    fn test_encode_unknown_characters() {
        assert_eq!(encode_sequence(b"N-?RYuU *"), vec![0; 9]);
        for byte in 0..=255u8 {
            if !b"ACGTacgt".contains(&byte) {
                assert_eq!(encode_base(byte), UNKNOWN, "byte {}", byte);
            }
        }
    }

    #[test]
    fn test_encode_into_buffer() {
        let mut row = [0xffu8; 5];
        encode_into(b"ACNGT", &mut row);
        assert_eq!(row, [1, 2, 0, 4, 8]);
    }

    #[test]
    fn test_codes_are_distinct_bits() {
        let combined = BASE_CODES.iter().fold(0u8, |acc, &c| {
            assert_eq!(acc & c, 0);
            acc | c
        });
        assert_eq!(combined, 0b1111);
    }

    #[test]
    fn test_decode_and_bucket() {
        assert_eq!(decode_base(encode_base(b'g')), 'G');
        assert_eq!(decode_base(A | C), 'N');
        assert_eq!(bucket_index(T), Some(3));
        assert_eq!(bucket_index(UNKNOWN), None);
        assert_eq!(bucket_index(A | G), None);
    }
}
