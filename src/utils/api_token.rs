//! Raw API token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Random bytes per token: 256 bits of entropy.
const TOKEN_BYTES: usize = 32;

/// Generates a new raw API token.
///
/// 32 bytes from the OS CSPRNG, encoded as unpadded URL-safe base64
/// (43 characters). Only its HMAC is ever stored.
///
/// # Errors
///
/// Returns the underlying error if the OS random source fails.
pub fn generate_api_token() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
