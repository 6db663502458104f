//! Barcode validation
//!
//! Accepts EAN-8, UPC-A, EAN-13 and ITF-14 shaped codes: digit strings of
//! length 8, 12, 13 or 14. Check digits are not verified; the food database
//! is the authority on whether a code exists.

use std::fmt;

/// Accepted barcode lengths
pub const VALID_LENGTHS: [usize; 4] = [8, 12, 13, 14];

/// Reasons a barcode is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarcodeError {
    /// Input was empty after trimming
    Empty,
    /// Input contained a non-digit character
    NonNumeric(String),
    /// Digit count is not one of [`VALID_LENGTHS`]
    InvalidLength(usize),
}

impl fmt::Display for BarcodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarcodeError::Empty => write!(f, "barcode is empty"),
            BarcodeError::NonNumeric(code) => write!(f, "barcode '{}' must contain digits only", code),
            BarcodeError::InvalidLength(len) => write!(
                f,
                "barcode has {} digits (expected 8, 12, 13 or 14)",
                len
            ),
        }
    }
}

impl std::error::Error for BarcodeError {}

/// Validate a barcode, returning the trimmed code on success
///
/// # Examples
///
/// ```
/// use platewise_domain::validate_barcode;
///
/// assert!(validate_barcode("12345678").is_ok());
/// assert!(validate_barcode("1234567").is_err());
/// ```
pub fn validate_barcode(code: &str) -> Result<&str, BarcodeError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(BarcodeError::Empty);
    }
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(BarcodeError::NonNumeric(code.to_string()));
    }
    if !VALID_LENGTHS.contains(&code.len()) {
        return Err(BarcodeError::InvalidLength(code.len()));
    }
    Ok(code)
}
