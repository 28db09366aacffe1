use std::collections::HashMap;

use log::debug;

use crate::encoding::{is_mismatch, BASES};
use crate::error::EncoderError;

pub type Code = u32;

/// Longest word the tables are built for. The matrix holds 5^(2L) bytes, so
/// this is 244 MB; one more would need about 6 GB.
pub const MAX_WORD_LENGTH: usize = 6;

/// Walks every word of a fixed length over [`BASES`] as a mixed-radix counter,
/// last position fastest: AA, AC, AG, AT, AN, CA, ...
pub struct Odometer {
    digits: Vec<usize>,
    done: bool,
}

impl Odometer {
    pub fn new(word_length: usize) -> Odometer {
        Odometer {
            digits: vec![0; word_length],
            done: word_length == 0,
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.done {
            return None;
        }

        let word = self.digits.iter().map(|d| BASES[*d]).collect();

        // ripple the increment leftwards; if every digit rolls over we've wrapped
        // back to all zeros and the enumeration is complete
        self.done = true;
        for k in (0..self.digits.len()).rev() {
            if self.digits[k] == BASES.len() - 1 {
                self.digits[k] = 0;
            } else {
                self.digits[k] += 1;
                self.done = false;
                break;
            }
        }

        Some(word)
    }
}

/// The bijection between words of one length and the codes `0..5^L`.
#[derive(Clone, Debug)]
pub struct CodeTable {
    word_length: usize,
    codes: HashMap<Vec<u8>, Code>,
    words: Vec<Vec<u8>>,
}

impl CodeTable {
    pub fn new(word_length: usize) -> Result<CodeTable, EncoderError> {
        if word_length == 0 || word_length > MAX_WORD_LENGTH {
            return Err(EncoderError::Configuration {
                word_length,
                max: MAX_WORD_LENGTH,
            });
        }

        let n = BASES.len().pow(word_length as u32);
        let mut codes = HashMap::with_capacity(n);
        let mut words = Vec::with_capacity(n);

        for (i, word) in Odometer::new(word_length).enumerate() {
            codes.insert(word.clone(), i as Code);
            words.push(word);
        }

        debug_assert_eq!(words.len(), n);

        Ok(CodeTable {
            word_length,
            codes,
            words,
        })
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn code(&self, word: &[u8]) -> Option<Code> {
        self.codes.get(word).copied()
    }

    pub fn word(&self, code: Code) -> Option<&[u8]> {
        self.words.get(code as usize).map(|w| w.as_slice())
    }

    /// Words in code order.
    pub fn words(&self) -> impl Iterator<Item = &[u8]> {
        self.words.iter().map(|w| w.as_slice())
    }
}

/// Mismatch counts between every pair of words in a [`CodeTable`], indexed by
/// code. Stored row-major.
#[derive(Clone, Debug)]
pub struct MismatchMatrix {
    size: usize,
    cells: Vec<u8>,
}

impl MismatchMatrix {
    pub fn new(table: &CodeTable) -> MismatchMatrix {
        let size = table.len();
        debug!(
            "building {}x{} mismatch matrix for word length {}",
            size,
            size,
            table.word_length()
        );

        let mut cells: Vec<u8> = vec![0; size * size];

        for (i, w1) in table.words().enumerate() {
            let row = &mut cells[i * size..(i + 1) * size];
            for (j, w2) in table.words().enumerate() {
                // word_length <= MAX_WORD_LENGTH so this fits in a u8
                row[j] = w1.iter().zip(w2).filter(|(a, b)| is_mismatch(**a, **b)).count() as u8;
            }
        }

        MismatchMatrix { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Panics if either code is outside `0..size`.
    #[inline(always)]
    pub fn get(&self, i: Code, j: Code) -> u8 {
        let (i, j) = (i as usize, j as usize);
        assert!(
            i < self.size && j < self.size,
            "code pair ({}, {}) out of range for a {}x{} matrix",
            i,
            j,
            self.size,
            self.size
        );
        self.cells[i * self.size + j]
    }

    pub fn row(&self, i: Code) -> &[u8] {
        let start = i as usize * self.size;
        &self.cells[start..start + self.size]
    }
}
