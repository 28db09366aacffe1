use bio::alphabets::Alphabet;

/// The symbols a word can be built from, in enumeration order.
pub const BASES: [u8; 5] = [b'A', b'C', b'G', b'T', b'N'];

/// Mismatches every symbol, itself included.
pub const WILDCARD: u8 = b'N';

pub fn alphabet() -> Alphabet {
    Alphabet::new(&BASES)
}

// one mismatch if either base is the wildcard or the bases differ
#[inline(always)]
pub fn is_mismatch(a: u8, b: u8) -> bool {
    a == WILDCARD || b == WILDCARD || a != b
}

// Position and value of the first byte in seq that isn't in the alphabet
pub fn first_invalid(alphabet: &Alphabet, seq: &[u8]) -> Option<(usize, u8)> {
    seq.iter()
        .enumerate()
        .find(|(_, b)| !alphabet.is_word(std::iter::once(**b)))
        .map(|(i, b)| (i, *b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_mismatch() {
        assert!(!is_mismatch(b'A', b'A'));
        assert!(is_mismatch(b'A', b'C'));
        assert!(is_mismatch(b'N', b'A'));
        assert!(is_mismatch(b'G', b'N'));
        assert!(is_mismatch(b'N', b'N'));
    }

    #[test]
    fn test_first_invalid() {
        let a = alphabet();
        assert_eq!(first_invalid(&a, b"ACGTN"), None);
        assert_eq!(first_invalid(&a, b"ACxTN"), Some((2, b'x')));
        // case sensitive
        assert_eq!(first_invalid(&a, b"acgt"), Some((0, b'a')));
    }
}
