//! Base64 handling for Gmail body data.
//!
//! The API hands out `body.data` as URL-safe base64, but older payloads (and
//! some proxies) use the standard alphabet or drop the padding. Decoding here
//! accepts either alphabet with or without padding.

use crate::error::{Error, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// URL-safe alphabet, padding optional.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Standard alphabet, padding optional.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Encodes data as padded URL-safe base64, the form `messages.send` expects.
#[must_use]
pub fn encode_url_safe(data: &[u8]) -> String {
    URL_SAFE.encode(data)
}

/// Decodes base64 bytes, trying the URL-safe alphabet first and the standard
/// alphabet second.
///
/// # Errors
///
/// Returns [`Error::DecodeFallback`] if neither alphabet accepts the input.
fn decode_bytes(data: &str) -> Result<Vec<u8>> {
    let cleaned = strip_whitespace(data);

    URL_SAFE_LENIENT
        .decode(cleaned.as_bytes())
        .or_else(|_| STANDARD_LENIENT.decode(cleaned.as_bytes()))
        .map_err(|_| Error::DecodeFallback)
}

/// Decodes base64 text.
///
/// Bytes that are not valid UTF-8 (Latin-1 or Windows-1252 bodies, which
/// Gmail hands out without transcoding) are decoded lossily rather than
/// rejected.
///
/// # Errors
///
/// Returns [`Error::DecodeFallback`] if neither alphabet accepts the input.
pub fn decode_text(data: &str) -> Result<String> {
    decode_bytes(data).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Decodes base64 text, returning the input unchanged when it cannot be
/// decoded.
///
/// Rendering must never fail on a bad body, so this is what the resolver uses.
#[must_use]
pub fn decode_text_lossy(data: &str) -> String {
    match decode_text(data) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("{e}; passing {} bytes through undecoded", data.len());
            data.to_string()
        }
    }
}

fn strip_whitespace(data: &str) -> String {
    data.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_url_safe() {
        assert_eq!(encode_url_safe(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
        // 0xfb 0xff encodes to '-' and '_' in the URL-safe alphabet
        assert_eq!(encode_url_safe(&[0xfb, 0xff]), "-_8=");
    }

    #[test]
    fn test_decode_url_safe_round_trip() {
        let text = "<p>Héllo? ~~~ >>> wörld</p>";
        let encoded = encode_url_safe(text.as_bytes());
        assert_eq!(decode_text(&encoded).unwrap(), text);
    }

    #[test]
    fn test_decode_without_padding() {
        assert_eq!(decode_text("SGVsbG8sIFdvcmxkIQ").unwrap(), "Hello, World!");
    }

    #[test]
    fn test_decode_standard_alphabet() {
        // '+' and '/' only exist in the standard alphabet
        assert_eq!(decode_bytes("-_8=").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_bytes("+/8=").unwrap(), vec![0xfb, 0xff]);

        let text = "subjects?>>";
        let standard = base64::engine::general_purpose::STANDARD.encode(text);
        assert!(standard.contains('+') || standard.contains('/'));
        assert_eq!(decode_text(&standard).unwrap(), text);
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        assert_eq!(
            decode_text("SGVsbG8s\r\nIFdvcmxk\nIQ==").unwrap(),
            "Hello, World!"
        );
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        assert!(matches!(
            decode_text("not base64 at all!"),
            Err(Error::DecodeFallback)
        ));
    }

    #[test]
    fn test_decode_latin1_is_lossy_text() {
        let encoded = encode_url_safe(b"<p>caf\xe9 ol\xe9</p>");
        assert_eq!(decode_bytes(&encoded).unwrap(), b"<p>caf\xe9 ol\xe9</p>");
        assert_eq!(decode_text(&encoded).unwrap(), "<p>caf\u{FFFD} ol\u{FFFD}</p>");
        assert_eq!(decode_text_lossy(&encoded), "<p>caf\u{FFFD} ol\u{FFFD}</p>");
    }

    #[test]
    fn test_decode_lossy_passes_through() {
        let raw = "Hello there, this is already text.";
        assert_eq!(decode_text_lossy(raw), raw);
        assert_eq!(decode_text_lossy("SGk="), "Hi");
    }
}
