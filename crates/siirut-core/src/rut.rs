//! RUT normalisation: strip a raw identifier down to digits and check
//! character, then reformat it as `BODY-DV`.

use std::fmt;

use thiserror::Error;

/// Canonical length the SII lookup accepts: an 8-digit body, a hyphen, and
/// the check character.
pub const CANONICAL_RUT_LEN: usize = 10;

/// Fewest stripped characters that still leave a body and a check character.
const MIN_STRIPPED_LEN: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RutError {
    #[error("invalid RUT input: {0:?}")]
    InvalidInput(String),
    #[error("normalised RUT must be {expected} characters, got {len}")]
    InvalidRutLength { len: usize, expected: usize },
}

/// A RUT reformatted as `<body>-<check>`.
///
/// The check character keeps the case it arrived with (`k` stays `k`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRut {
    body: String,
    check_digit: char,
}

impl NormalizedRut {
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn check_digit(&self) -> char {
        self.check_digit
    }

    /// Length of the `BODY-DV` form.
    pub fn formatted_len(&self) -> usize {
        self.body.len() + 2
    }

    /// Enforce the fixed 10-character business rule.
    pub fn require_canonical_length(self) -> Result<Self, RutError> {
        let len = self.formatted_len();
        if len != CANONICAL_RUT_LEN {
            return Err(RutError::InvalidRutLength {
                len,
                expected: CANONICAL_RUT_LEN,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for NormalizedRut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check_digit)
    }
}

/// Normalise a raw RUT string.
///
/// Every character other than `0-9`, `K` and `k` is dropped; the last
/// remaining character becomes the check digit. The minimum-length guard
/// runs on the stripped text, so `"1-2"` is rejected even though the raw
/// string is three characters long.
pub fn normalize(raw: &str) -> Result<NormalizedRut, RutError> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'K' | 'k'))
        .collect();

    if stripped.len() < MIN_STRIPPED_LEN {
        return Err(RutError::InvalidInput(raw.to_string()));
    }

    let mut body = stripped;
    let check_digit = match body.pop() {
        Some(c) => c,
        None => return Err(RutError::InvalidInput(raw.to_string())),
    };

    Ok(NormalizedRut { body, check_digit })
}
