//! Fixed categorical alphabets and label encodings.
//!
//! Node labels, point labels, and voxel channels all derive from the same two
//! alphabets: the 20 standard single-letter residue codes and the 5 common
//! element symbols. Tokens are indices into the alphabet, so one-hot rows of
//! every item in a dataset line up channel-for-channel.

use super::models::resolution::Resolution;
use ndarray::Array2;
use phf::{Map, phf_map};
use thiserror::Error;

/// Residue type symbols, in token order.
pub const RESIDUE_ALPHABET: &str = "ARNDCEQGHILKMFPSTWYV";
/// Element symbols, in token order. Atom type symbols are keyed by their first
/// character (e.g. `CA` and `CB` both encode as carbon).
pub const ATOM_ALPHABET: &str = "NCOSH";

#[rustfmt::skip]
static RESIDUE_TOKENS: Map<&'static str, u32> = phf_map! {
    "A" => 0,  "R" => 1,  "N" => 2,  "D" => 3,  "C" => 4,
    "E" => 5,  "Q" => 6,  "G" => 7,  "H" => 8,  "I" => 9,
    "L" => 10, "K" => 11, "M" => 12, "F" => 13, "P" => 14,
    "S" => 15, "T" => 16, "W" => 17, "Y" => 18, "V" => 19,
};

#[rustfmt::skip]
static ATOM_TOKENS: Map<&'static str, u32> = phf_map! {
    "N" => 0, "C" => 1, "O" => 2, "S" => 3, "H" => 4,
};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EncodingError {
    #[error("unknown {resolution} type symbol '{symbol}'")]
    UnknownSymbol {
        resolution: Resolution,
        symbol: String,
    },
}

/// Number of label classes at the given resolution, i.e. the one-hot width.
pub fn alphabet_len(resolution: Resolution) -> usize {
    match resolution {
        Resolution::Residue => RESIDUE_ALPHABET.len(),
        Resolution::Atom => ATOM_ALPHABET.len(),
    }
}

/// Encodes one type symbol as its alphabet token.
///
/// Residue symbols must match a single-letter code exactly; atom symbols are
/// keyed by their first character. Unknown symbols are an error, never coerced.
pub fn token_of(symbol: &str, resolution: Resolution) -> Result<u32, EncodingError> {
    let token = match resolution {
        Resolution::Residue => RESIDUE_TOKENS.get(symbol),
        Resolution::Atom => symbol.get(..1).and_then(|head| ATOM_TOKENS.get(head)),
    };
    token.copied().ok_or_else(|| EncodingError::UnknownSymbol {
        resolution,
        symbol: symbol.to_string(),
    })
}

/// Encodes a type column as alphabet tokens, preserving order.
pub fn tokenize(types: &[String], resolution: Resolution) -> Result<Vec<u32>, EncodingError> {
    types
        .iter()
        .map(|symbol| token_of(symbol, resolution))
        .collect()
}

/// Expands tokens into a dense `(n, alphabet_len)` one-hot matrix.
pub fn one_hot(tokens: &[u32], resolution: Resolution) -> Array2<f32> {
    let width = alphabet_len(resolution);
    let mut rows = Array2::zeros((tokens.len(), width));
    for (i, &token) in tokens.iter().enumerate() {
        rows[[i, token as usize]] = 1.0;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn residue_tokens_follow_alphabet_order() {
        let tokens = tokenize(&symbols(&["A", "R", "V"]), Resolution::Residue).unwrap();
        assert_eq!(tokens, vec![0, 1, 19]);
    }

    #[test]
    fn atom_tokens_use_first_character() {
        let tokens = tokenize(&symbols(&["CA", "N", "OG1", "SD"]), Resolution::Atom).unwrap();
        assert_eq!(tokens, vec![1, 0, 2, 3]);
    }

    #[test]
    fn unknown_residue_symbol_is_an_error() {
        let err = token_of("B", Resolution::Residue).unwrap_err();
        assert_eq!(
            err,
            EncodingError::UnknownSymbol {
                resolution: Resolution::Residue,
                symbol: "B".to_string(),
            }
        );
        // Multi-letter residue names never match the single-letter alphabet.
        assert!(token_of("ALA", Resolution::Residue).is_err());
        assert!(token_of("", Resolution::Atom).is_err());
    }

    #[test]
    fn one_hot_rows_are_unit_vectors() {
        let rows = one_hot(&[0, 4], Resolution::Atom);
        assert_eq!(rows.dim(), (2, 5));
        assert_eq!(rows[[0, 0]], 1.0);
        assert_eq!(rows[[1, 4]], 1.0);
        assert_eq!(rows.sum(), 2.0);
    }

    #[test]
    fn one_hot_of_nothing_is_empty_but_wide() {
        let rows = one_hot(&[], Resolution::Residue);
        assert_eq!(rows.dim(), (0, 20));
    }
}
