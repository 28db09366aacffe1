use bio::alphabets::Alphabet;

use crate::encoding::{alphabet, first_invalid};
use crate::error::EncoderError;
use crate::measures;
use crate::table::{Code, CodeTable, MismatchMatrix};

pub const DEFAULT_WORD_LENGTH: usize = 5;

/// Converts sequences into per-word codes and answers mismatch queries on
/// either form. Both tables are built up front and never change, so one
/// encoder can be shared between threads behind an `Arc`.
pub struct Encoder {
    alphabet: Alphabet,
    table: CodeTable,
    matrix: MismatchMatrix,
}

impl Encoder {
    pub fn new(word_length: usize) -> Result<Encoder, EncoderError> {
        let table = CodeTable::new(word_length)?;
        let matrix = MismatchMatrix::new(&table);
        Ok(Encoder {
            alphabet: alphabet(),
            table,
            matrix,
        })
    }

    pub fn word_length(&self) -> usize {
        self.table.word_length()
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    pub fn matrix(&self) -> &MismatchMatrix {
        &self.matrix
    }

    /// Splits `seq` into consecutive words and codes each of them, e.g. with a
    /// word length of 2, `"ACAA"` becomes `[1, 0]`.
    pub fn encode<S: AsRef<[u8]>>(&self, seq: S) -> Result<Vec<Code>, EncoderError> {
        let seq = seq.as_ref();
        let word_length = self.word_length();

        if seq.is_empty() || seq.len() % word_length != 0 {
            return Err(EncoderError::Encoding {
                length: seq.len(),
                word_length,
            });
        }

        if let Some((position, symbol)) = first_invalid(&self.alphabet, seq) {
            return Err(EncoderError::InvalidSymbol {
                symbol: symbol as char,
                position,
            });
        }

        let mut out: Vec<Code> = Vec::with_capacity(seq.len() / word_length);
        for word in seq.chunks_exact(word_length) {
            let code = self
                .table
                .code(word)
                .expect("every word over the alphabet has a code");
            out.push(code);
        }

        Ok(out)
    }

    pub fn decode(&self, codes: &[Code]) -> Result<String, EncoderError> {
        let mut out = String::with_capacity(codes.len() * self.word_length());
        for code in codes {
            let word = self.table.word(*code).ok_or(EncoderError::InvalidCode {
                code: *code,
                size: self.table.len(),
            })?;
            out.extend(word.iter().map(|b| *b as char));
        }
        Ok(out)
    }

    pub fn count_mismatches<Q, T>(&self, query: Q, target: T) -> Result<usize, EncoderError>
    where
        Q: AsRef<[u8]>,
        T: AsRef<[u8]>,
    {
        measures::count_mismatches(query, target)
    }

    pub fn within_k_mismatches<Q, T>(&self, query: Q, target: T, k: usize) -> Result<bool, EncoderError>
    where
        Q: AsRef<[u8]>,
        T: AsRef<[u8]>,
    {
        measures::within_k_mismatches(query, target, k)
    }

    /// Mismatch count between two encoded sequences, one table lookup per word.
    ///
    /// Both sequences must hold the same number of codes. This is only
    /// checked in debug builds; otherwise the extra codes of the longer one are
    /// ignored. Every code must come from [`Encoder::encode`] with this word
    /// length; a code outside the table panics.
    pub fn count_encoded_mismatches(&self, query: &[Code], target: &[Code]) -> usize {
        debug_assert_eq!(query.len(), target.len());
        query
            .iter()
            .zip(target)
            .map(|(q, t)| self.matrix.get(*q, *t) as usize)
            .sum()
    }

    /// Whether two encoded sequences are within `k` mismatches of each other.
    /// Stops as soon as the running count goes past `k`. Same length and
    /// code range preconditions as [`Encoder::count_encoded_mismatches`].
    pub fn within_k_encoded_mismatches(&self, query: &[Code], target: &[Code], k: usize) -> bool {
        debug_assert_eq!(query.len(), target.len());
        let mut d: usize = 0;
        for (q, t) in query.iter().zip(target) {
            d += self.matrix.get(*q, *t) as usize;
            if d > k {
                return false;
            }
        }
        true
    }
}

impl Default for Encoder {
    fn default() -> Encoder {
        Encoder::new(DEFAULT_WORD_LENGTH).expect("default word length is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let e = Encoder::new(2).unwrap();
        let codes = e.encode("ACAA").unwrap();
        assert_eq!(codes, vec![e.table().code(b"AC").unwrap(), e.table().code(b"AA").unwrap()]);
        assert_eq!(codes, vec![1, 0]);
        assert_eq!(e.encode(b"NN").unwrap(), vec![24]);
    }

    #[test]
    fn test_encode_errors() {
        let e = Encoder::new(2).unwrap();
        assert_eq!(
            e.encode("ACA"),
            Err(EncoderError::Encoding { length: 3, word_length: 2 })
        );
        assert_eq!(
            e.encode(""),
            Err(EncoderError::Encoding { length: 0, word_length: 2 })
        );
        assert_eq!(
            e.encode("ACgT"),
            Err(EncoderError::InvalidSymbol { symbol: 'g', position: 2 })
        );
    }

    #[test]
    fn test_encode_message() {
        let e = Encoder::new(2).unwrap();
        let err = e.encode("ACA").unwrap_err();
        assert_eq!(
            err.to_string(),
            "length of input sequence (3) not divisible by word length (2)"
        );
    }

    #[test]
    fn test_decode() {
        let e = Encoder::new(3).unwrap();
        let seq = "ACGTNNGATTAC";
        let codes = e.encode(seq).unwrap();
        assert_eq!(e.decode(&codes).unwrap(), seq);
        assert_eq!(
            e.decode(&[125]),
            Err(EncoderError::InvalidCode { code: 125, size: 125 })
        );
    }

    #[test]
    fn test_new_rejects_zero() {
        assert!(matches!(
            Encoder::new(0),
            Err(EncoderError::Configuration { word_length: 0, .. })
        ));
    }

    #[test]
    fn test_default() {
        let e = Encoder::default();
        assert_eq!(e.word_length(), 5);
        assert_eq!(e.table().len(), 3125);
    }

    #[test]
    fn test_raw_queries() {
        let e = Encoder::new(2).unwrap();
        assert_eq!(e.count_mismatches("AA", "GA"), Ok(1));
        assert_eq!(e.within_k_mismatches("AA", "AG", 1), Ok(true));
        assert_eq!(e.within_k_mismatches("AA", "AG", 0), Ok(false));
        assert_eq!(
            e.count_mismatches("AA", "AAA"),
            Err(EncoderError::Comparison { left: 2, right: 3 })
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_count_encoded_rejects_foreign_code() {
        let e = Encoder::new(2).unwrap();
        assert!(e.decode(&[25]).is_err());
        e.count_encoded_mismatches(&[0], &[25]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_within_k_encoded_rejects_foreign_code() {
        let e = Encoder::new(2).unwrap();
        e.within_k_encoded_mismatches(&[0], &[25], 0);
    }

    #[test]
    fn test_encode_long_sequence() {
        let e = Encoder::new(3).unwrap();
        let codes = e.encode("NNNAAAACGTTT").unwrap();
        assert_eq!(codes, vec![124, 0, 7, 93]);
    }

    #[test]
    fn test_encoded_queries() {
        let e = Encoder::new(2).unwrap();
        let a = e.encode("ATGATGNA").unwrap();
        let b = e.encode("ATTATTNA").unwrap();
        assert_eq!(e.count_encoded_mismatches(&a, &b), 3);
        assert!(e.within_k_encoded_mismatches(&a, &b, 3));
        assert!(!e.within_k_encoded_mismatches(&a, &b, 2));
        assert_eq!(
            e.count_encoded_mismatches(&a, &b),
            e.count_mismatches("ATGATGNA", "ATTATTNA").unwrap()
        );
    }
}
