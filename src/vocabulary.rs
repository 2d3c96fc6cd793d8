//! Fixed bidirectional map between symbols and one-hot indices.

use crate::error::ModelError;
use ahash::AHashMap;

/// Reserved end-of-sequence symbol
pub const END: char = '\u{0}';

/// Symbol table with one designated END symbol.
///
/// The END symbol always takes the last index.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    symbols: Vec<char>,
    index: AHashMap<char, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from `symbols` in the given order and appends END.
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a symbol repeats or equals END
    pub fn new(symbols: &[char]) -> Result<Self, ModelError> {
        let mut index = AHashMap::with_capacity(symbols.len() + 1);
        for (i, &symbol) in symbols.iter().enumerate() {
            if symbol == END {
                return Err(ModelError::InputValidationError(
                    "the END symbol is reserved".to_string(),
                ));
            }
            if index.insert(symbol, i).is_some() {
                return Err(ModelError::InputValidationError(format!(
                    "symbol {:?} appears twice",
                    symbol
                )));
            }
        }
        let mut symbols = symbols.to_vec();
        index.insert(END, symbols.len());
        symbols.push(END);
        Ok(Self { symbols, index })
    }

    /// Builds a vocabulary of the distinct characters of `text`, sorted, with END last.
    ///
    /// Line breaks are skipped.
    pub fn from_text(text: &str) -> Self {
        let mut symbols: Vec<char> = text
            .chars()
            .filter(|&c| c != '\n' && c != '\r' && c != END)
            .collect();
        symbols.sort_unstable();
        symbols.dedup();

        let mut index: AHashMap<char, usize> =
            symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        index.insert(END, symbols.len());
        symbols.push(END);
        Self { symbols, index }
    }

    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.index.get(&symbol).copied()
    }

    pub fn symbol(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    pub fn end(&self) -> char {
        END
    }

    pub fn end_index(&self) -> usize {
        self.symbols.len() - 1
    }

    /// Number of symbols including END
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false, END is always present
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Maps every symbol of `sequence` to its index
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If a symbol is not in the vocabulary
    pub fn encode(&self, sequence: &[char]) -> Result<Vec<usize>, ModelError> {
        sequence
            .iter()
            .map(|&c| {
                self.index_of(c).ok_or_else(|| {
                    ModelError::InputValidationError(format!("unknown symbol {:?}", c))
                })
            })
            .collect()
    }

    /// Characters of `text` followed by END
    pub fn sequence_with_end(text: &str) -> Vec<char> {
        text.chars().chain(std::iter::once(END)).collect()
    }
}
