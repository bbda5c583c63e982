//! Short code alphabet, random drawing, and custom code validation.
//!
//! Codes use the 62-character alphabet `a-zA-Z0-9`. Random characters come from
//! the OS CSPRNG and are drawn without modulo bias.

use crate::error::AppError;
use serde_json::json;

/// The 62 characters a short code may contain.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Shortest accepted code, generated or custom.
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest accepted code; also the ceiling for generator length growth.
pub const MAX_CODE_LENGTH: usize = 20;

/// First path segments taken by fixed routes. A link under one of these names
/// could never be reached through `GET /{code}`.
pub const RESERVED_CODES: &[&str] = &["api", "health"];

/// Largest multiple of 62 that fits in a byte. Bytes at or above it are redrawn.
const UNBIASED_BYTE_LIMIT: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// Draws a random code of exactly `length` characters.
///
/// Each character index is uniform over the 62 alphabet positions: random bytes
/// below 248 map to `byte % 62`, the rest are rejected and redrawn.
///
/// # Errors
///
/// Returns the underlying error if the OS random source fails.
pub fn random_code(length: usize) -> Result<String, getrandom::Error> {
    let mut code = String::with_capacity(length);
    // Rejection discards about 3% of bytes; a small surplus avoids most refills.
    let mut buffer = vec![0u8; length + length / 8 + 4];

    while code.len() < length {
        getrandom::fill(&mut buffer)?;

        for &byte in &buffer {
            if byte >= UNBIASED_BYTE_LIMIT {
                continue;
            }
            code.push(ALPHABET[(byte % ALPHABET.len() as u8) as usize] as char);
            if code.len() == length {
                break;
            }
        }
    }

    Ok(code)
}

/// Returns true if every character of `code` is in [`ALPHABET`].
pub fn is_alphabet_only(code: &str) -> bool {
    code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 4-20 characters
/// - Allowed characters: `a-z`, `A-Z`, `0-9`
/// - Not a [`RESERVED_CODES`] entry, ignoring case
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_code("Promo2025").is_ok());
/// assert!(validate_custom_code("abc").is_err());       // Too short
/// assert!(validate_custom_code("my-link").is_err());   // Hyphen
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    let length = code.chars().count();
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        return Err(AppError::bad_request(
            "Custom code must be 4-20 characters",
            json!({ "provided_length": length }),
        ));
    }

    if !is_alphabet_only(code) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters and digits",
            json!({ "code": code }),
        ));
    }

    if is_reserved(code) {
        return Err(AppError::bad_request(
            "Custom code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

/// Returns true if `code` collides with a fixed route segment.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}
