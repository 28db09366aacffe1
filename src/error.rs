use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncoderError {
    /// Word length rejected at construction.
    #[error("invalid word length {word_length}: must be between 1 and {max}")]
    Configuration { word_length: usize, max: usize },

    /// Input length is not a positive multiple of the word length.
    #[error("length of input sequence ({length}) not divisible by word length ({word_length})")]
    Encoding { length: usize, word_length: usize },

    /// A byte outside of the ACGTN alphabet.
    #[error("invalid symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// A code that has no word in the table.
    #[error("code {code} out of range for a table of {size} words")]
    InvalidCode { code: u32, size: usize },

    /// The two sequences being compared differ in length.
    #[error("cannot compare sequences of different lengths ({left} and {right})")]
    Comparison { left: usize, right: usize },
}
